//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations over ports.
//!
//! - `billing` - Payment links, payment callbacks, grant dispatch
//! - `entitlement` - Grants, free subscriptions, follows
//! - `content` - Post access checks

pub mod billing;
pub mod content;
pub mod entitlement;
