//! Application layer - command handlers, queries, and periodic workers.
//!
//! Handlers orchestrate domain types through ports; workers reconcile derived
//! data on a timer.

pub mod handlers;
pub mod workers;

mod keyed_lock;

pub use keyed_lock::KeyedLock;
