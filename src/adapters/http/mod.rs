//! HTTP adapters - REST API implementations.
//!
//! Each module has its own router and state; [`app_router`] merges them and
//! adds tracing, request ids, and a request timeout.

pub mod billing;
pub mod content;
pub mod entitlement;
pub mod middleware;

mod app;

pub use app::{app_router, AppState, Ports};
pub use billing::{billing_routes, BillingAppState};
pub use content::{content_routes, ContentAppState};
pub use entitlement::{entitlement_routes, EntitlementAppState};
