use futures::future::LocalBoxFuture;
use gloo_timers::callback::Interval;
use gloo_timers::future::TimeoutFuture;
use std::any::Any;
use wasm_bindgen_futures::spawn_local;

/// Owns a periodic task; dropping the handle cancels it.
pub struct TaskHandle {
    _guard: Box<dyn Any>,
}

impl TaskHandle {
    pub fn new<G: 'static>(guard: G) -> Self {
        Self {
            _guard: Box::new(guard),
        }
    }
}

/// Everything the terminal does on the event loop rather than inline.
pub trait Scheduler {
    fn every(&self, period_ms: u32, tick: Box<dyn FnMut()>) -> TaskHandle;
    fn after(&self, delay_ms: u32, run: Box<dyn FnOnce()>);
    fn spawn(&self, task: LocalBoxFuture<'static, ()>);
}

pub struct BrowserScheduler;

impl Scheduler for BrowserScheduler {
    fn every(&self, period_ms: u32, tick: Box<dyn FnMut()>) -> TaskHandle {
        TaskHandle::new(Interval::new(period_ms, tick))
    }

    fn after(&self, delay_ms: u32, run: Box<dyn FnOnce()>) {
        spawn_local(async move {
            TimeoutFuture::new(delay_ms).await;
            run();
        });
    }

    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        spawn_local(task);
    }
}
