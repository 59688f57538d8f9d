//! Scheduling primitives shared by every debouncer.
//!
//! A [`Scheduler`] runs a one-shot task after a delay and can cancel it before
//! it fires. [`PendingTimer`] builds on that to hold *at most one* scheduled
//! task at a time: scheduling a new one invalidates the previous one, and
//! dropping the timer invalidates whatever is still outstanding.

use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::trace;

/// A unit of work handed to a [`Scheduler`].
pub type ScheduledTask = Box<dyn FnOnce() + Send + 'static>;

/// Runs a task once after a delay, with the option to cancel it first.
pub trait Scheduler: Clone + Send + Sync + 'static {
    /// Opaque handle to a scheduled task that has not fired yet.
    type Handle: Send + 'static;

    /// Schedules `task` to run once `delay` has elapsed, measured from this call.
    fn schedule(&self, delay: Duration, task: ScheduledTask) -> Self::Handle;

    /// Cancels a scheduled task. A task that has already started is not interrupted.
    fn cancel(&self, handle: Self::Handle);
}

/// A [`Scheduler`] that spawns one sleeping task per timer on a tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    /// Creates a scheduler bound to the given runtime.
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Creates a scheduler bound to the runtime this call is made from.
    ///
    /// # Panics
    /// Panics when called outside of a tokio runtime, exactly like `tokio::spawn`.
    pub fn current() -> Self {
        Self::new(Handle::current())
    }

    /// Like [`TokioScheduler::current`], but reports a missing runtime as an error.
    pub fn try_current() -> anyhow::Result<Self> {
        Ok(Self::new(Handle::try_current()?))
    }
}

impl Scheduler for TokioScheduler {
    type Handle = JoinHandle<()>;

    fn schedule(&self, delay: Duration, task: ScheduledTask) -> Self::Handle {
        // The deadline is fixed here, not when the spawned task is first polled.
        let _guard = self.handle.enter();
        let sleep = tokio::time::sleep(delay);
        self.handle.spawn(async move {
            sleep.await;
            task();
        })
    }

    fn cancel(&self, handle: Self::Handle) {
        handle.abort();
    }
}

/// The single pending-timer slot owned by a debouncer instance.
///
/// Clones share the same slot. The slot is released, and any outstanding task
/// cancelled, when the last clone is dropped.
pub struct PendingTimer<S: Scheduler> {
    shared: Arc<TimerShared<S>>,
}

struct TimerShared<S: Scheduler> {
    scheduler: S,
    slot: Mutex<TimerSlot<S::Handle>>,
}

struct TimerSlot<H> {
    /// Bumped on every schedule and cancel; a task only fires if it still
    /// carries the current generation.
    generation: u64,
    handle: Option<H>,
}

impl<S: Scheduler> PendingTimer<S> {
    /// Creates an empty slot backed by `scheduler`.
    pub fn new(scheduler: S) -> Self {
        Self {
            shared: Arc::new(TimerShared {
                scheduler,
                slot: Mutex::new(TimerSlot {
                    generation: 0,
                    handle: None,
                }),
            }),
        }
    }

    /// Replaces whatever is pending with `callback`, due after `delay`.
    ///
    /// The previously pending callback, if any, is cancelled and will never run.
    pub fn schedule<F>(&self, delay: Duration, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut slot = self.shared.slot.lock();
        if let Some(stale) = slot.handle.take() {
            trace!(generation = slot.generation, "Cancelling superseded timer.");
            self.shared.scheduler.cancel(stale);
        }
        slot.generation = slot.generation.wrapping_add(1);
        let generation = slot.generation;

        let weak: Weak<TimerShared<S>> = Arc::downgrade(&self.shared);
        let task: ScheduledTask = Box::new(move || {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            if shared.claim(generation) {
                trace!(generation, "Timer fired.");
                callback();
            }
        });
        // The lock is held across `schedule` so a task that fires immediately
        // still finds its own handle in the slot.
        slot.handle = Some(self.shared.scheduler.schedule(delay, task));
        trace!(generation, delay_ms = delay.as_millis() as u64, "Timer scheduled.");
    }

    /// Cancels the pending callback. Returns `true` if one was pending.
    pub fn cancel(&self) -> bool {
        let mut slot = self.shared.slot.lock();
        slot.generation = slot.generation.wrapping_add(1);
        match slot.handle.take() {
            Some(handle) => {
                trace!(generation = slot.generation, "Timer cancelled.");
                self.shared.scheduler.cancel(handle);
                true
            }
            None => false,
        }
    }

    /// Returns `true` while a callback is scheduled and has not fired.
    pub fn is_pending(&self) -> bool {
        self.shared.slot.lock().handle.is_some()
    }
}

impl<S: Scheduler> TimerShared<S> {
    /// Clears the slot on behalf of the task carrying `generation`.
    /// Returns `false` if that task has been superseded or cancelled.
    fn claim(&self, generation: u64) -> bool {
        let mut slot = self.slot.lock();
        if slot.generation != generation || slot.handle.is_none() {
            return false;
        }
        slot.handle = None;
        true
    }
}

impl<S: Scheduler> Drop for TimerShared<S> {
    fn drop(&mut self) {
        if let Some(handle) = self.slot.get_mut().handle.take() {
            trace!("Releasing pending timer on teardown.");
            self.scheduler.cancel(handle);
        }
    }
}

impl<S: Scheduler> Clone for PendingTimer<S> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S: Scheduler> fmt::Debug for PendingTimer<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.shared.slot.lock();
        f.debug_struct("PendingTimer")
            .field("generation", &slot.generation)
            .field("pending", &slot.handle.is_some())
            .finish()
    }
}
