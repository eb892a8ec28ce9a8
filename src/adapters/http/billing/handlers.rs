//! HTTP handlers for billing endpoints.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Json, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::adapters::http::middleware::RequireService;
use crate::application::handlers::billing::{
    ConfirmPaymentCommand, ConfirmPaymentHandler, RequestPaymentLinkHandler,
};
use crate::domain::billing::BillingError;
use crate::domain::foundation::DomainError;

use super::dto::{ConfirmQuery, PaymentLinkRequest, PaymentLinkResponse};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct BillingAppState {
    pub payment_links: Arc<RequestPaymentLinkHandler>,
    pub confirmations: Arc<ConfirmPaymentHandler>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /payment-link
pub async fn request_payment_link(
    State(state): State<BillingAppState>,
    RequireService(_caller): RequireService,
    body: Result<Json<PaymentLinkRequest>, JsonRejection>,
) -> Result<Json<PaymentLinkResponse>, BillingApiError> {
    let Json(request) = body.map_err(|e| BillingError::validation("body", e.body_text()))?;
    let result = state.payment_links.handle(request.into()).await?;
    Ok(Json(PaymentLinkResponse { url: result.url }))
}

/// GET /confirm?OutSum=..&InvId=..&SignatureValue=..
///
/// The gateway retries until it reads `OK{InvId}`.
pub async fn confirm_payment(
    State(state): State<BillingAppState>,
    query: Result<Query<ConfirmQuery>, QueryRejection>,
) -> Result<String, BillingApiError> {
    let Query(query) = query.map_err(|e| BillingError::validation("query", e.body_text()))?;
    let cmd = ConfirmPaymentCommand::try_from(query)?;
    let result = state.confirmations.handle(cmd).await?;
    Ok(result.ack_body())
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// Maps billing errors to bodiless status responses; the detail goes to the log.
#[derive(Debug)]
pub struct BillingApiError(BillingError);

impl From<BillingError> for BillingApiError {
    fn from(err: BillingError) -> Self {
        Self(err)
    }
}

impl From<DomainError> for BillingApiError {
    fn from(err: DomainError) -> Self {
        Self(BillingError::from(err))
    }
}

impl BillingApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            BillingError::InvalidSignature
            | BillingError::AmountMismatch { .. }
            | BillingError::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
            BillingError::InvoiceNotFound(_) => StatusCode::NOT_FOUND,
            BillingError::InvalidState { .. } => StatusCode::CONFLICT,
            BillingError::Gateway(_) => StatusCode::BAD_GATEWAY,
            BillingError::GrantFailed(_) => StatusCode::SERVICE_UNAVAILABLE,
            BillingError::Infrastructure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for BillingApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = %self.0.code(), error = %self.0, "Billing request failed");
        } else {
            tracing::warn!(code = %self.0.code(), error = %self.0, "Billing request rejected");
        }
        status.into_response()
    }
}
