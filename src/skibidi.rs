use crate::scheduler::{Scheduler, TaskHandle};
use crate::utils;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use wasm_bindgen::JsValue;

pub const LINE_INTERVAL_MS: u32 = 150;
pub const CONFETTI_INTERVAL_MS: u32 = 600;
pub const STREAM_SOFT_CAP: usize = 220;
pub const WARMUP_LINES: usize = 22;
pub const CONFETTI_PER_BURST: usize = 6;
pub const CONFETTI_LIFETIME_MS: u32 = 5000;

const PHRASES: [&str; 13] = [
    "SKIBIDI", "TOILET", "RIZZ", "GYATT", "OHIO", "SIGMA", "MEWING", "NPC", "AURA", "GOONER",
    "SKULL", "GOOFY", "MEME",
];
const EMOJIS: [&str; 14] = [
    "🚽", "🔥", "⚡", "🌀", "💥", "👻", "🛸", "🧠", "💫", "🪽", "🥶", "🎯", "🎲", "🪩",
];
const EMOJI_CHANCE: f64 = 0.6;

/// Uniform samples in `[0, 1)`.
pub type RandomSource = Box<dyn FnMut() -> f64>;

#[derive(Debug, Clone, PartialEq)]
pub struct SkibidiLine {
    pub text: String,
    pub rotation_deg: f64,
    pub hue: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfettiParticle {
    pub size_px: f64,
    pub left_pct: f64,
    pub fall_secs: f64,
    pub drift_px: f64,
    pub hue: u32,
}

/// Where the engine draws. The returned closure removes a particle.
pub trait SkibidiCanvas {
    fn push_line(&self, line: &SkibidiLine) -> Result<(), JsValue>;
    fn evict_oldest_line(&self) -> Result<(), JsValue>;
    fn spawn_confetti(&self, particle: &ConfettiParticle) -> Result<Box<dyn FnOnce()>, JsValue>;
}

#[derive(Default)]
struct SkibidiState {
    active: bool,
    line_task: Option<TaskHandle>,
    confetti_task: Option<TaskHandle>,
    stream: VecDeque<SkibidiLine>,
    canvas: Option<Rc<dyn SkibidiCanvas>>,
}

struct EngineInner {
    scheduler: Rc<dyn Scheduler>,
    random: RefCell<RandomSource>,
    state: RefCell<SkibidiState>,
}

pub struct SkibidiEngine {
    inner: Rc<EngineInner>,
}

impl SkibidiEngine {
    pub fn new(scheduler: Rc<dyn Scheduler>, random: RandomSource) -> Self {
        Self {
            inner: Rc::new(EngineInner {
                scheduler,
                random: RefCell::new(random),
                state: RefCell::new(SkibidiState::default()),
            }),
        }
    }

    pub fn is_active(&self) -> bool {
        self.inner.state.borrow().active
    }

    #[cfg(test)]
    pub fn stream_len(&self) -> usize {
        self.inner.state.borrow().stream.len()
    }

    /// Starts both spawners on `canvas`. Returns `false` when already running.
    pub fn start(&self, canvas: Rc<dyn SkibidiCanvas>) -> bool {
        {
            let mut state = self.inner.state.borrow_mut();
            if state.active {
                return false;
            }
            state.active = true;
            state.stream.clear();
            state.canvas = Some(canvas);
        }

        for _ in 0..WARMUP_LINES {
            self.inner.spawn_line();
        }

        let line_engine = Rc::downgrade(&self.inner);
        let line_task = self.inner.scheduler.every(
            LINE_INTERVAL_MS,
            Box::new(move || {
                if let Some(engine) = line_engine.upgrade() {
                    engine.spawn_line();
                }
            }),
        );

        let confetti_engine = Rc::downgrade(&self.inner);
        let confetti_task = self.inner.scheduler.every(
            CONFETTI_INTERVAL_MS,
            Box::new(move || {
                if let Some(engine) = confetti_engine.upgrade() {
                    engine.spawn_confetti_burst();
                }
            }),
        );

        let mut state = self.inner.state.borrow_mut();
        state.line_task = Some(line_task);
        state.confetti_task = Some(confetti_task);
        true
    }

    /// Cancels both spawners. Lines and particles already drawn stay put.
    pub fn stop(&self) -> bool {
        let (was_active, line_task, confetti_task) = {
            let mut state = self.inner.state.borrow_mut();
            let was_active = state.active;
            state.active = false;
            state.canvas = None;
            (was_active, state.line_task.take(), state.confetti_task.take())
        };
        drop(line_task);
        drop(confetti_task);
        was_active
    }
}

impl Drop for SkibidiEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

impl EngineInner {
    fn canvas(&self) -> Option<Rc<dyn SkibidiCanvas>> {
        let state = self.state.borrow();
        if state.active {
            state.canvas.clone()
        } else {
            None
        }
    }

    fn spawn_line(&self) {
        let Some(canvas) = self.canvas() else {
            return;
        };
        let line = {
            let mut random = self.random.borrow_mut();
            compose_line(&mut **random)
        };
        if let Err(err) = canvas.push_line(&line) {
            utils::log(&format!("Failed to draw skibidi line: {:?}", err));
            return;
        }

        let evict = {
            let mut state = self.state.borrow_mut();
            state.stream.push_back(line);
            if state.stream.len() > STREAM_SOFT_CAP {
                state.stream.pop_front();
                true
            } else {
                false
            }
        };
        if evict {
            if let Err(err) = canvas.evict_oldest_line() {
                utils::log(&format!("Failed to prune skibidi stream: {:?}", err));
            }
        }
    }

    fn spawn_confetti_burst(&self) {
        let Some(canvas) = self.canvas() else {
            return;
        };
        for _ in 0..CONFETTI_PER_BURST {
            let particle = {
                let mut random = self.random.borrow_mut();
                compose_confetti(&mut **random)
            };
            match canvas.spawn_confetti(&particle) {
                Ok(remove) => self.scheduler.after(CONFETTI_LIFETIME_MS, remove),
                Err(err) => {
                    utils::log(&format!("Failed to spawn confetti: {:?}", err));
                    return;
                }
            }
        }
    }
}

fn pick(random: &mut dyn FnMut() -> f64, len: usize) -> usize {
    ((random() * len as f64) as usize).min(len.saturating_sub(1))
}

pub fn compose_line(random: &mut dyn FnMut() -> f64) -> SkibidiLine {
    let selection_count = 3 + pick(random, 4);

    // Partial Fisher-Yates: the first `selection_count` slots end up distinct.
    let mut pool = PHRASES;
    for slot in 0..selection_count {
        let swap_with = slot + pick(random, pool.len() - slot);
        pool.swap(slot, swap_with);
    }

    let parts: Vec<String> = pool[..selection_count]
        .iter()
        .map(|word| {
            if random() >= EMOJI_CHANCE {
                return word.to_string();
            }
            let emoji_count = 1 + pick(random, 3);
            let emoji = EMOJIS[pick(random, EMOJIS.len())].repeat(emoji_count);
            format!("{word} {emoji}")
        })
        .collect();

    SkibidiLine {
        text: parts.join(" "),
        rotation_deg: random() * 16.0 - 8.0,
        hue: pick(random, 360) as u32,
    }
}

pub fn compose_confetti(random: &mut dyn FnMut() -> f64) -> ConfettiParticle {
    ConfettiParticle {
        size_px: random() * 8.0 + 6.0,
        left_pct: random() * 100.0,
        fall_secs: random() * 3.0 + 3.0,
        drift_px: random() * 40.0 - 20.0,
        hue: pick(random, 360) as u32,
    }
}
