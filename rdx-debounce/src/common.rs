//! Identifier types for applications that juggle many debouncers at once.
//!
//! The debouncers themselves need no ids; these keys exist so a host (such as
//! the debounce shell) can keep instances in a `SlotMap` and hand out stable
//! references to them.

use slotmap::new_key_type;

new_key_type! {
    /// Identifies a [`CallDebouncer`](crate::components::call::CallDebouncer)
    /// registered with a host.
    pub struct DebouncerId;

    /// Identifies a mounted component that owns a
    /// [`ValueDebouncer`](crate::components::value::ValueDebouncer).
    pub struct ComponentId;
}
