//! HTTP adapter for billing endpoints.
//!
//! - `POST /payment-link` - Create or reuse a payment link (service role)
//! - `GET /confirm` - Gateway result callback, answers `OK{InvId}`

pub mod dto;
mod handlers;
mod routes;

pub use handlers::{confirm_payment, request_payment_link, BillingApiError, BillingAppState};
pub use routes::billing_routes;
