//! Axum router for billing endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{confirm_payment, request_payment_link, BillingAppState};

/// # Routes
///
/// - `POST /payment-link` - service role
/// - `GET /confirm` - unauthenticated, verified by signature
pub fn billing_routes() -> Router<BillingAppState> {
    Router::new()
        .route("/payment-link", post(request_payment_link))
        .route("/confirm", get(confirm_payment))
}
