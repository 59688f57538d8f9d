//! The two debouncers.
//!
//! [`call::CallDebouncer`] delays a function call until calls stop arriving;
//! [`value::ValueDebouncer`] is a hook that exposes a value only once it has
//! stopped changing. Both keep a single [`PendingTimer`](crate::time::PendingTimer)
//! per instance and share nothing with each other.

pub mod call;
pub mod value;
