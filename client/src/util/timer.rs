//! Deferred callbacks.
//!
//! `Scheduler` abstracts `setTimeout` so code that must fire "a little later"
//! (the fallback auth subscription) can be tested without a browser clock.

use std::cell::RefCell;
use std::time::Duration;

/// A one-shot deferred task.
pub type Task = Box<dyn FnOnce()>;

pub trait Scheduler {
    /// Run `task` once after `delay`.
    fn defer(&self, delay: Duration, task: Task);
}

/// Browser timer (`setTimeout`). Outside the browser the task runs inline.
#[derive(Clone, Copy, Debug, Default)]
pub struct TimerScheduler;

impl Scheduler for TimerScheduler {
    fn defer(&self, delay: Duration, task: Task) {
        #[cfg(feature = "csr")]
        {
            let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
            gloo_timers::callback::Timeout::new(millis, task).forget();
        }
        #[cfg(not(feature = "csr"))]
        {
            let _ = delay;
            task();
        }
    }
}

/// Queues tasks until [`ManualScheduler::run_pending`] is called.
#[derive(Default)]
pub struct ManualScheduler {
    queue: RefCell<Vec<(Duration, Task)>>,
}

impl ManualScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays of the queued tasks, in submission order.
    #[must_use]
    pub fn pending_delays(&self) -> Vec<Duration> {
        self.queue.borrow().iter().map(|(d, _)| *d).collect()
    }

    /// Run every queued task and return how many ran.
    pub fn run_pending(&self) -> usize {
        let tasks = std::mem::take(&mut *self.queue.borrow_mut());
        let count = tasks.len();
        for (_, task) in tasks {
            task();
        }
        count
    }
}

impl Scheduler for ManualScheduler {
    fn defer(&self, delay: Duration, task: Task) {
        self.queue.borrow_mut().push((delay, task));
    }
}
