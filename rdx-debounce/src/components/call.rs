//! Trailing-edge debouncing of function calls.

use crate::time::{PendingTimer, Scheduler, TokioScheduler};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;

/// Wraps `callback` so that a burst of calls collapses into one.
///
/// Shorthand for [`CallDebouncer::new`]. Must be called from within a tokio runtime.
///
/// ```rust,no_run
/// use debounce::prelude::*;
/// use std::time::Duration;
///
/// # #[tokio::main] async fn main() {
/// let save = debounce(|(doc, rev): (String, u32)| println!("saving {doc}@{rev}"), Duration::from_millis(250));
/// save.call(("notes.md".into(), 1));
/// save.call(("notes.md".into(), 2)); // only this one is saved
/// # }
/// ```
pub fn debounce<A, F>(callback: F, delay: Duration) -> CallDebouncer<A>
where
    A: Send + 'static,
    F: Fn(A) + Send + Sync + 'static,
{
    CallDebouncer::new(callback, delay)
}

/// A debounced wrapper around a callback taking arguments of type `A`.
///
/// Every [`call`](CallDebouncer::call) restarts the delay. When the delay
/// elapses without another call, the callback runs once with the arguments of
/// the most recent call. Multi-argument callbacks take a tuple.
///
/// Clones share the same pending call. Dropping the last clone cancels it.
pub struct CallDebouncer<A, S: Scheduler = TokioScheduler> {
    callback: Arc<dyn Fn(A) + Send + Sync>,
    delay: Duration,
    timer: PendingTimer<S>,
}

impl<A: Send + 'static> CallDebouncer<A, TokioScheduler> {
    /// Creates a debouncer on the current tokio runtime.
    ///
    /// # Panics
    /// Panics when called outside of a tokio runtime.
    pub fn new<F>(callback: F, delay: Duration) -> Self
    where
        F: Fn(A) + Send + Sync + 'static,
    {
        Self::with_scheduler(callback, delay, TokioScheduler::current())
    }
}

impl<A: Send + 'static, S: Scheduler> CallDebouncer<A, S> {
    /// Creates a debouncer whose timers are driven by `scheduler`.
    pub fn with_scheduler<F>(callback: F, delay: Duration, scheduler: S) -> Self
    where
        F: Fn(A) + Send + Sync + 'static,
    {
        Self {
            callback: Arc::new(callback),
            delay,
            timer: PendingTimer::new(scheduler),
        }
    }

    /// Records a call. Any call still waiting is discarded and the delay restarts.
    pub fn call(&self, args: A) {
        let callback = Arc::clone(&self.callback);
        trace!(delay_ms = self.delay.as_millis() as u64, "Debounced call (re)scheduled.");
        self.timer.schedule(self.delay, move || callback(args));
    }

    /// Drops the waiting call without running it. Returns `true` if one was waiting.
    pub fn cancel(&self) -> bool {
        self.timer.cancel()
    }

    pub fn is_pending(&self) -> bool {
        self.timer.is_pending()
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Turns the debouncer into a plain closure with the same behavior.
    pub fn into_fn(self) -> impl Fn(A) + Clone + Send + Sync + 'static {
        move |args| self.call(args)
    }
}

impl<A, S: Scheduler> Clone for CallDebouncer<A, S> {
    fn clone(&self) -> Self {
        Self {
            callback: Arc::clone(&self.callback),
            delay: self.delay,
            timer: self.timer.clone(),
        }
    }
}

impl<A, S: Scheduler> fmt::Debug for CallDebouncer<A, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallDebouncer")
            .field("delay", &self.delay)
            .field("timer", &self.timer)
            .finish()
    }
}
