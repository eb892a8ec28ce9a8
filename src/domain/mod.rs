//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (ids, money, timestamps, errors, state machine)
//! - `billing` - Invoices, their status machine, and gateway signatures
//! - `entitlement` - Tier bindings, paid access, donations, income, notifications
//! - `content` - Posts, tier ladder, goals, and the access decision

pub mod billing;
pub mod content;
pub mod entitlement;
pub mod foundation;
