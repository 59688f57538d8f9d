//! # Debounce
//!
//! Two small timing utilities for reacting to input only once it settles.
//!
//! ## Core Concepts
//!
//! - **CallDebouncer**: wraps a callback. Every call restarts a single pending
//!   timer; only the last call in a burst reaches the callback, `delay` after
//!   it was made.
//! - **ValueDebouncer**: a hook-style component. Fed the current input once per
//!   evaluation cycle, it exposes the last input that stayed unchanged for the
//!   configured quiet period and notifies subscribers when that value moves.
//! - **Scheduler**: the timer seam both are built on. `TokioScheduler` runs
//!   each timer as a sleeping task on a tokio runtime; superseded timers are
//!   aborted and can never fire.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use debounce::prelude::*;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // 1. Debounce a function call.
//!     let search = debounce(|query: String| println!("searching for {query}"), Duration::from_millis(200));
//!     for query in ["r", "ru", "rus", "rust"] {
//!         search.call(query.to_string());
//!     }
//!
//!     // 2. Debounce a value inside a component's evaluation loop.
//!     let mut input = ValueDebouncer::<String>::new();
//!     let mut commits = input.subscribe();
//!     let shown = input.use_debounce("rust".to_string(), Some(Duration::from_millis(200)));
//!     assert_eq!(shown, "");
//!
//!     commits.changed().await?;
//!     assert_eq!(*commits.borrow(), "rust");
//!     Ok(())
//! }
//! ```

pub const LIBRARY_NAME: &str = "rdx-debounce";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod common;
pub mod components;
pub mod config;
pub mod reactive;
pub mod time;

/// A prelude module for easy importing of the most common debounce types.
pub mod prelude {
    pub use crate::common::{ComponentId, DebouncerId};
    pub use crate::components::call::{debounce, CallDebouncer};
    pub use crate::components::value::ValueDebouncer;
    pub use crate::config::DebounceConfig;
    pub use crate::time::{PendingTimer, Scheduler, TokioScheduler};
}
