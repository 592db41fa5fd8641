//! Cancellable deferred tasks for text-field commits.
//!
//! A [`Debouncer`] keeps at most one pending task. Scheduling a new one drops
//! the previous handle first, and dropping a handle cancels its task.

use gloo_timers::callback::Timeout;

/// Something that can run a callback later and hand back a cancel-on-drop
/// handle.
pub trait TaskScheduler {
    type Handle;

    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> Self::Handle;
}

/// Browser timers via `setTimeout`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeoutScheduler;

impl TaskScheduler for TimeoutScheduler {
    type Handle = Timeout;

    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> Timeout {
        Timeout::new(delay_ms, task)
    }
}

pub struct Debouncer<S: TaskScheduler = TimeoutScheduler> {
    scheduler: S,
    delay_ms: u32,
    pending: Option<S::Handle>,
}

impl<S: TaskScheduler> Debouncer<S> {
    pub fn new(scheduler: S, delay_ms: u32) -> Self {
        Self {
            scheduler,
            delay_ms,
            pending: None,
        }
    }

    /// Run `task` after the delay unless another call comes first.
    pub fn schedule(&mut self, task: impl FnOnce() + 'static) {
        self.cancel();
        self.pending = Some(self.scheduler.schedule(self.delay_ms, Box::new(task)));
    }

    /// Drop the pending task, if any. Returns whether one was held.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn delay_ms(&self) -> u32 {
        self.delay_ms
    }
}

impl Debouncer<TimeoutScheduler> {
    pub fn with_timeout(delay_ms: u32) -> Self {
        Self::new(TimeoutScheduler, delay_ms)
    }
}
