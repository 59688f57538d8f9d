//! Minimal reactive building blocks for hook-style components.
//!
//! A component that is re-evaluated over and over needs two things from its
//! host: a slot that keeps a value between evaluations and tells observers
//! when it changes ([`StateCell`]), and a way to run side effects only when
//! their inputs change, cleaning up after the previous run ([`Effect`]).

use std::fmt;
use std::sync::{Arc, Weak};
use tokio::sync::watch;

/// Cleanup returned by an effect, run before the effect re-runs or on teardown.
pub type Cleanup = Box<dyn FnOnce() + Send + 'static>;

/// A value persisted across evaluation cycles.
///
/// Every [`StateCell::set`] notifies the receivers handed out by
/// [`StateCell::subscribe`]; this is the re-evaluation trigger.
pub struct StateCell<T> {
    sender: Arc<watch::Sender<T>>,
}

impl<T> StateCell<T> {
    pub fn new(initial: T) -> Self {
        let (sender, _) = watch::channel(initial);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Returns a copy of the current value.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.sender.borrow().clone()
    }

    /// Stores `value` and notifies every subscriber.
    pub fn set(&self, value: T) {
        self.sender.send_replace(value);
    }

    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.sender.subscribe()
    }

    /// Returns a setter that does not keep the cell alive.
    pub fn setter(&self) -> WeakSetter<T> {
        WeakSetter {
            sender: Arc::downgrade(&self.sender),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for StateCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StateCell").field(&*self.sender.borrow()).finish()
    }
}

/// A detached setter for a [`StateCell`]. Becomes a no-op once the cell is gone.
pub struct WeakSetter<T> {
    sender: Weak<watch::Sender<T>>,
}

impl<T> WeakSetter<T> {
    /// Writes `value` into the cell. Returns `false` if the cell has been dropped.
    pub fn set(&self, value: T) -> bool {
        match self.sender.upgrade() {
            Some(sender) => {
                sender.send_replace(value);
                true
            }
            None => false,
        }
    }
}

impl<T> Clone for WeakSetter<T> {
    fn clone(&self) -> Self {
        Self {
            sender: Weak::clone(&self.sender),
        }
    }
}

/// A side effect keyed on a dependency value.
///
/// [`Effect::run`] executes the effect on its first call and again whenever
/// the dependencies differ from the previous run, invoking the previous
/// run's cleanup first. The last cleanup runs on [`Effect::teardown`] or drop.
pub struct Effect<D> {
    deps: Option<D>,
    cleanup: Option<Cleanup>,
}

impl<D> Effect<D> {
    pub fn new() -> Self {
        Self {
            deps: None,
            cleanup: None,
        }
    }

    /// Runs the outstanding cleanup and forgets the dependencies, so the next
    /// `run` executes unconditionally.
    pub fn teardown(&mut self) {
        self.deps = None;
        if let Some(cleanup) = self.cleanup.take() {
            cleanup();
        }
    }
}

impl<D: PartialEq> Effect<D> {
    /// Runs `effect` if `deps` changed since the last run. Returns whether it ran.
    pub fn run<F>(&mut self, deps: D, effect: F) -> bool
    where
        F: FnOnce(&D) -> Option<Cleanup>,
    {
        if self.deps.as_ref() == Some(&deps) {
            return false;
        }
        if let Some(cleanup) = self.cleanup.take() {
            cleanup();
        }
        self.cleanup = effect(&deps);
        self.deps = Some(deps);
        true
    }
}

impl<D> Default for Effect<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> Drop for Effect<D> {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl<D: fmt::Debug> fmt::Debug for Effect<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Effect")
            .field("deps", &self.deps)
            .field("has_cleanup", &self.cleanup.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn logging_effect(log: &Arc<Mutex<Vec<String>>>, label: u32) -> Option<Cleanup> {
        log.lock().push(format!("run {label}"));
        let log = Arc::clone(log);
        Some(Box::new(move || log.lock().push(format!("cleanup {label}"))))
    }

    #[test]
    fn effect_runs_only_when_deps_change() {
        // Arrange
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut effect = Effect::new();

        // Act
        assert!(effect.run(1, |d| logging_effect(&log, *d)));
        assert!(!effect.run(1, |d| logging_effect(&log, *d)));
        assert!(effect.run(2, |d| logging_effect(&log, *d)));

        // Assert
        assert_eq!(*log.lock(), vec!["run 1", "cleanup 1", "run 2"]);
    }

    #[test]
    fn drop_runs_the_last_cleanup_once() {
        // Arrange
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut effect = Effect::new();
        effect.run(7, |d| logging_effect(&log, *d));

        // Act
        effect.teardown();
        drop(effect);

        // Assert
        assert_eq!(*log.lock(), vec!["run 7", "cleanup 7"]);
    }

    #[test]
    fn teardown_forces_the_next_run() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut effect = Effect::new();
        effect.run(3, |d| logging_effect(&log, *d));
        effect.teardown();

        assert!(effect.run(3, |d| logging_effect(&log, *d)));
    }

    #[tokio::test]
    async fn state_cell_notifies_subscribers() -> anyhow::Result<()> {
        // Arrange
        let cell = StateCell::new(0u32);
        let mut rx = cell.subscribe();

        // Act
        cell.set(5);
        rx.changed().await?;

        // Assert
        assert_eq!(*rx.borrow_and_update(), 5);
        assert_eq!(cell.get(), 5);
        Ok(())
    }

    #[test]
    fn weak_setter_is_inert_after_the_cell_is_dropped() {
        let cell = StateCell::new("initial");
        let setter = cell.setter();
        assert!(setter.set("updated"));
        assert_eq!(cell.get(), "updated");

        drop(cell);

        assert!(!setter.set("late"));
    }
}
