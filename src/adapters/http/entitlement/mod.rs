//! HTTP adapter for entitlement endpoints.
//!
//! Service role (called on payment confirmation):
//! - `POST /subscriptions/grant`
//! - `POST /paid-access/grant`
//! - `POST /donations/confirm`
//!
//! User role:
//! - `POST /subscriptions/:id/subscribe-free`
//! - `POST /blogs/:id/follow`, `DELETE /blogs/:id/follow`

pub mod dto;
mod handlers;
mod routes;

pub use handlers::{EntitlementApiError, EntitlementAppState};
pub use routes::entitlement_routes;
