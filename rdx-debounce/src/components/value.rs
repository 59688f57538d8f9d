//! A hook that debounces a changing value.

use crate::reactive::{Cleanup, Effect, StateCell};
use crate::time::{PendingTimer, Scheduler, TokioScheduler};
use std::fmt;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, trace};

/// Exposes the last value that has stayed unchanged for a quiet period.
///
/// The owner calls [`use_debounce`](ValueDebouncer::use_debounce) once per
/// evaluation cycle with the current input. Whenever the input or the delay
/// differs from the previous cycle, the pending commit is discarded and a new
/// one is scheduled. When a commit lands, subscribers obtained through
/// [`subscribe`](ValueDebouncer::subscribe) are notified so the owner can
/// evaluate again.
///
/// Until the first commit the debounced value is `T::default()`, not the
/// first input. Use [`with_initial`](ValueDebouncer::with_initial) to start
/// from a chosen value instead.
///
/// Dropping the debouncer (or calling [`unmount`](ValueDebouncer::unmount))
/// cancels any pending commit.
pub struct ValueDebouncer<T, S: Scheduler = TokioScheduler> {
    effect: Effect<(T, Option<Duration>)>,
    timer: PendingTimer<S>,
    state: StateCell<T>,
}

impl<T> ValueDebouncer<T, TokioScheduler>
where
    T: Clone + PartialEq + Default + Send + Sync + 'static,
{
    /// Creates a debouncer on the current tokio runtime.
    ///
    /// # Panics
    /// Panics when called outside of a tokio runtime.
    pub fn new() -> Self {
        Self::with_scheduler(TokioScheduler::current())
    }
}

impl<T> Default for ValueDebouncer<T, TokioScheduler>
where
    T: Clone + PartialEq + Default + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, S> ValueDebouncer<T, S>
where
    T: Clone + PartialEq + Send + Sync + 'static,
    S: Scheduler,
{
    pub fn with_scheduler(scheduler: S) -> Self
    where
        T: Default,
    {
        Self::with_initial(T::default(), scheduler)
    }

    pub fn with_initial(initial: T, scheduler: S) -> Self {
        Self {
            effect: Effect::new(),
            timer: PendingTimer::new(scheduler),
            state: StateCell::new(initial),
        }
    }

    /// Feeds this cycle's input and returns the currently committed value.
    ///
    /// A `None` delay commits on the next scheduler turn.
    pub fn use_debounce(&mut self, value: T, delay: Option<Duration>) -> T {
        let timer = &self.timer;
        let setter = self.state.setter();
        let restarted = self.effect.run((value, delay), |(value, delay)| {
            let value = value.clone();
            timer.schedule(delay.unwrap_or(Duration::ZERO), move || {
                if setter.set(value) {
                    debug!("Debounced value committed.");
                }
            });
            let timer = timer.clone();
            let cleanup: Cleanup = Box::new(move || {
                timer.cancel();
            });
            Some(cleanup)
        });
        if restarted {
            trace!(?delay, "Debounce window restarted.");
        }
        self.state.get()
    }

    /// Returns the committed value without feeding a new input.
    pub fn value(&self) -> T {
        self.state.get()
    }

    /// Returns a receiver that observes every commit.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.state.subscribe()
    }

    pub fn is_pending(&self) -> bool {
        self.timer.is_pending()
    }

    /// Tears the debouncer down, discarding any pending commit.
    pub fn unmount(mut self) {
        self.effect.teardown();
        trace!("Value debouncer unmounted.");
    }
}

impl<T, S> fmt::Debug for ValueDebouncer<T, S>
where
    T: fmt::Debug,
    S: Scheduler,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueDebouncer")
            .field("state", &self.state)
            .field("timer", &self.timer)
            .finish()
    }
}
