//! Test doubles for the browser-facing seams.

use crate::commands::BlockKind;
use crate::pages::PageFetcher;
use crate::renderer::TerminalView;
use crate::scheduler::{Scheduler, TaskHandle};
use crate::skibidi::{ConfettiParticle, RandomSource, SkibidiCanvas, SkibidiLine};
use futures::channel::oneshot;
use futures::executor::{LocalPool, LocalSpawner};
use futures::future::{self, LocalBoxFuture};
use futures::task::LocalSpawnExt;
use futures::FutureExt;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use wasm_bindgen::JsValue;

pub fn seeded_random(seed: u64) -> RandomSource {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    Box::new(move || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (state >> 11) as f64 / (1u64 << 53) as f64
    })
}

struct CancelOnDrop(Rc<Cell<bool>>);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

struct ManualInterval {
    period_ms: u32,
    live: Rc<Cell<bool>>,
    tick: Rc<RefCell<Box<dyn FnMut()>>>,
}

/// Runs timers and spawned futures only when a test asks it to.
pub struct ManualScheduler {
    intervals: RefCell<Vec<ManualInterval>>,
    delayed: RefCell<Vec<(u32, Box<dyn FnOnce()>)>>,
    pool: RefCell<LocalPool>,
    spawner: LocalSpawner,
}

impl ManualScheduler {
    pub fn new() -> Self {
        let pool = LocalPool::new();
        let spawner = pool.spawner();
        Self {
            intervals: RefCell::new(Vec::new()),
            delayed: RefCell::new(Vec::new()),
            pool: RefCell::new(pool),
            spawner,
        }
    }

    pub fn live_intervals(&self) -> usize {
        self.intervals
            .borrow()
            .iter()
            .filter(|interval| interval.live.get())
            .count()
    }

    pub fn interval_periods(&self) -> Vec<u32> {
        self.intervals
            .borrow()
            .iter()
            .filter(|interval| interval.live.get())
            .map(|interval| interval.period_ms)
            .collect()
    }

    pub fn tick_period(&self, period_ms: u32) {
        let ticks: Vec<_> = self
            .intervals
            .borrow()
            .iter()
            .filter(|interval| interval.live.get() && interval.period_ms == period_ms)
            .map(|interval| Rc::clone(&interval.tick))
            .collect();
        for tick in ticks {
            let mut tick = tick.borrow_mut();
            (&mut **tick)();
        }
    }

    pub fn pending_delays(&self) -> Vec<u32> {
        self.delayed.borrow().iter().map(|(delay, _)| *delay).collect()
    }

    pub fn run_delayed(&self) {
        let due = std::mem::take(&mut *self.delayed.borrow_mut());
        for (_, run) in due {
            run();
        }
    }

    pub fn run_until_stalled(&self) {
        self.pool.borrow_mut().run_until_stalled();
    }
}

impl Scheduler for ManualScheduler {
    fn every(&self, period_ms: u32, tick: Box<dyn FnMut()>) -> TaskHandle {
        let live = Rc::new(Cell::new(true));
        self.intervals.borrow_mut().push(ManualInterval {
            period_ms,
            live: Rc::clone(&live),
            tick: Rc::new(RefCell::new(tick)),
        });
        TaskHandle::new(CancelOnDrop(live))
    }

    fn after(&self, delay_ms: u32, run: Box<dyn FnOnce()>) {
        self.delayed.borrow_mut().push((delay_ms, run));
    }

    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        if let Err(err) = self.spawner.spawn_local(task) {
            panic!("manual scheduler could not spawn: {err:?}");
        }
    }
}

/// Serves canned pages and counts retrievals.
#[derive(Default)]
pub struct StubFetcher {
    pages: HashMap<String, Result<String, String>>,
    calls: Cell<usize>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, path: &str, body: &str) -> Self {
        self.pages.insert(path.to_string(), Ok(body.to_string()));
        self
    }

    pub fn with_failure(mut self, path: &str, message: &str) -> Self {
        self.pages
            .insert(path.to_string(), Err(message.to_string()));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl PageFetcher for StubFetcher {
    fn fetch_text<'a>(&'a self, path: &'a str) -> LocalBoxFuture<'a, Result<String, String>> {
        self.calls.set(self.calls.get() + 1);
        let result = self
            .pages
            .get(path)
            .cloned()
            .unwrap_or_else(|| Err(format!("Failed to fetch {path} (status 404)")));
        future::ready(result).boxed_local()
    }
}

pub struct Gate(oneshot::Sender<Result<String, String>>);

impl Gate {
    pub fn open(self, result: Result<String, String>) {
        let _ = self.0.send(result);
    }
}

/// Fetches stay pending until the test opens their gate, in request order.
#[derive(Default)]
pub struct GatedFetcher {
    gates: RefCell<HashMap<String, VecDeque<oneshot::Receiver<Result<String, String>>>>>,
}

impl GatedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gate(&self, path: &str) -> Gate {
        let (sender, receiver) = oneshot::channel();
        self.gates
            .borrow_mut()
            .entry(path.to_string())
            .or_default()
            .push_back(receiver);
        Gate(sender)
    }
}

impl PageFetcher for GatedFetcher {
    fn fetch_text<'a>(&'a self, path: &'a str) -> LocalBoxFuture<'a, Result<String, String>> {
        let receiver = self
            .gates
            .borrow_mut()
            .get_mut(path)
            .and_then(|queue| queue.pop_front());
        async move {
            match receiver {
                Some(receiver) => receiver
                    .await
                    .unwrap_or_else(|_| Err("gate dropped".to_string())),
                None => Err(format!("no gate for {path}")),
            }
        }
        .boxed_local()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Prompt(String),
    Block { html: String, kind: BlockKind },
    Skibidi,
}

/// In-memory transcript with a persistent header.
#[derive(Default)]
pub struct RecordingView {
    pub entries: RefCell<Vec<Entry>>,
    pub input: RefCell<String>,
    pub opened: RefCell<Vec<String>>,
    pub clears: Cell<usize>,
    pub scrolls: Cell<usize>,
    pub skibidi_active: Cell<bool>,
    pub refuse_skibidi_class: Cell<bool>,
    pub refuse_mount: Cell<bool>,
    pub canvases: RefCell<Vec<Rc<RecordingCanvas>>>,
}

impl RecordingView {
    pub fn blocks(&self) -> Vec<(String, BlockKind)> {
        self.entries
            .borrow()
            .iter()
            .filter_map(|entry| match entry {
                Entry::Block { html, kind } => Some((html.clone(), *kind)),
                _ => None,
            })
            .collect()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .filter_map(|entry| match entry {
                Entry::Prompt(command) => Some(command.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }
}

impl TerminalView for RecordingView {
    fn update_input(&self, buffer: &str) {
        *self.input.borrow_mut() = buffer.to_string();
    }

    fn focus_input(&self) {}

    fn append_prompt(&self, command: &str) -> Result<(), JsValue> {
        self.entries
            .borrow_mut()
            .push(Entry::Prompt(command.to_string()));
        Ok(())
    }

    fn append_block(&self, html: &str, kind: BlockKind) -> Result<(), JsValue> {
        self.entries.borrow_mut().push(Entry::Block {
            html: html.to_string(),
            kind,
        });
        Ok(())
    }

    fn clear_output(&self) -> Result<(), JsValue> {
        self.entries.borrow_mut().clear();
        self.clears.set(self.clears.get() + 1);
        Ok(())
    }

    fn scroll_to_bottom(&self) {
        self.scrolls.set(self.scrolls.get() + 1);
    }

    fn open_external(&self, url: &str) {
        self.opened.borrow_mut().push(url.to_string());
    }

    fn set_skibidi_active(&self, active: bool) -> Result<(), JsValue> {
        if active && self.refuse_skibidi_class.get() {
            return Err(JsValue::NULL);
        }
        self.skibidi_active.set(active);
        Ok(())
    }

    fn mount_skibidi(&self) -> Result<Rc<dyn SkibidiCanvas>, JsValue> {
        if self.refuse_mount.get() {
            return Err(JsValue::NULL);
        }
        let canvas = Rc::new(RecordingCanvas::default());
        self.canvases.borrow_mut().push(Rc::clone(&canvas));
        self.entries.borrow_mut().push(Entry::Skibidi);
        Ok(canvas)
    }
}

#[derive(Default)]
pub struct RecordingCanvas {
    lines: Cell<usize>,
    evictions: Cell<usize>,
    confetti: Rc<Cell<usize>>,
}

impl RecordingCanvas {
    pub fn line_count(&self) -> usize {
        self.lines.get()
    }

    pub fn evictions(&self) -> usize {
        self.evictions.get()
    }

    pub fn live_confetti(&self) -> usize {
        self.confetti.get()
    }
}

impl SkibidiCanvas for RecordingCanvas {
    fn push_line(&self, _line: &SkibidiLine) -> Result<(), JsValue> {
        self.lines.set(self.lines.get() + 1);
        Ok(())
    }

    fn evict_oldest_line(&self) -> Result<(), JsValue> {
        self.lines.set(self.lines.get().saturating_sub(1));
        self.evictions.set(self.evictions.get() + 1);
        Ok(())
    }

    fn spawn_confetti(&self, _particle: &ConfettiParticle) -> Result<Box<dyn FnOnce()>, JsValue> {
        self.confetti.set(self.confetti.get() + 1);
        let live = Rc::clone(&self.confetti);
        Ok(Box::new(move || live.set(live.get().saturating_sub(1))))
    }
}
