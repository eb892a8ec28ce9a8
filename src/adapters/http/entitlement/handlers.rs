//! HTTP handlers for entitlement endpoints.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::adapters::http::middleware::{RequireAuth, RequireService};
use crate::application::handlers::entitlement::{
    ConfirmDonationHandler, FollowCommand, FollowHandler, GrantPostAccessHandler,
    GrantSubscriptionHandler, SubscribeFreeCommand, SubscribeFreeHandler, UnfollowHandler,
};
use crate::domain::entitlement::{EntitlementError, GrantRequest};
use crate::domain::foundation::{BlogId, DomainError, SubscriptionId};

use super::dto::{GrantResponse, SubscribeFreeResponse};

#[derive(Clone)]
pub struct EntitlementAppState {
    pub subscriptions: Arc<GrantSubscriptionHandler>,
    pub post_access: Arc<GrantPostAccessHandler>,
    pub donations: Arc<ConfirmDonationHandler>,
    pub subscribe_free: Arc<SubscribeFreeHandler>,
    pub follow: Arc<FollowHandler>,
    pub unfollow: Arc<UnfollowHandler>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Grant endpoints (service role)
// ════════════════════════════════════════════════════════════════════════════════

/// POST /subscriptions/grant
pub async fn grant_subscription(
    State(state): State<EntitlementAppState>,
    RequireService(_caller): RequireService,
    body: Result<Json<GrantRequest>, JsonRejection>,
) -> Result<Json<GrantResponse>, EntitlementApiError> {
    let request = grant_body(body)?;
    let outcome = state.subscriptions.handle(&request).await?;
    Ok(Json(GrantResponse { outcome }))
}

/// POST /paid-access/grant
pub async fn grant_post_access(
    State(state): State<EntitlementAppState>,
    RequireService(_caller): RequireService,
    body: Result<Json<GrantRequest>, JsonRejection>,
) -> Result<Json<GrantResponse>, EntitlementApiError> {
    let request = grant_body(body)?;
    let outcome = state.post_access.handle(&request).await?;
    Ok(Json(GrantResponse { outcome }))
}

/// POST /donations/confirm
pub async fn confirm_donation(
    State(state): State<EntitlementAppState>,
    RequireService(_caller): RequireService,
    body: Result<Json<GrantRequest>, JsonRejection>,
) -> Result<Json<GrantResponse>, EntitlementApiError> {
    let request = grant_body(body)?;
    let outcome = state.donations.handle(&request).await?;
    Ok(Json(GrantResponse { outcome }))
}

// ════════════════════════════════════════════════════════════════════════════════
// User endpoints
// ════════════════════════════════════════════════════════════════════════════════

/// POST /subscriptions/:id/subscribe-free
pub async fn subscribe_free(
    State(state): State<EntitlementAppState>,
    RequireAuth(caller): RequireAuth,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<SubscribeFreeResponse>, EntitlementApiError> {
    let subscription_id = path_id(path)?;
    let result = state
        .subscribe_free
        .handle(SubscribeFreeCommand {
            user_id: caller.user_id,
            subscription_id: SubscriptionId::from_uuid(subscription_id),
        })
        .await?;
    Ok(Json(result.into()))
}

/// POST /blogs/:id/follow
pub async fn follow_blog(
    State(state): State<EntitlementAppState>,
    RequireAuth(caller): RequireAuth,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, EntitlementApiError> {
    let blog_id = path_id(path)?;
    state
        .follow
        .handle(FollowCommand {
            user_id: caller.user_id,
            blog_id: BlogId::from_uuid(blog_id),
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /blogs/:id/follow
pub async fn unfollow_blog(
    State(state): State<EntitlementAppState>,
    RequireAuth(caller): RequireAuth,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, EntitlementApiError> {
    let blog_id = path_id(path)?;
    state
        .unfollow
        .handle(FollowCommand {
            user_id: caller.user_id,
            blog_id: BlogId::from_uuid(blog_id),
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

fn grant_body(body: Result<Json<GrantRequest>, JsonRejection>) -> Result<GrantRequest, EntitlementApiError> {
    let Json(request) = body.map_err(|e| EntitlementError::validation("body", e.body_text()))?;
    Ok(request)
}

fn path_id(path: Result<Path<Uuid>, PathRejection>) -> Result<Uuid, EntitlementApiError> {
    let Path(id) = path.map_err(|e| EntitlementError::validation("id", e.body_text()))?;
    Ok(id)
}

#[derive(Debug)]
pub struct EntitlementApiError(EntitlementError);

impl From<EntitlementError> for EntitlementApiError {
    fn from(err: EntitlementError) -> Self {
        Self(err)
    }
}

impl From<DomainError> for EntitlementApiError {
    fn from(err: DomainError) -> Self {
        Self(EntitlementError::from(err))
    }
}

impl EntitlementApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            EntitlementError::SubscriptionNotFound(_)
            | EntitlementError::PostNotFound(_)
            | EntitlementError::DonationNotFound(_) => StatusCode::NOT_FOUND,
            EntitlementError::NotPurchasable(_) | EntitlementError::ValidationFailed { .. } => {
                StatusCode::BAD_REQUEST
            }
            EntitlementError::InvalidState { .. } => StatusCode::CONFLICT,
            EntitlementError::Infrastructure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for EntitlementApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Entitlement request failed");
        } else {
            tracing::warn!(error = %self.0, "Entitlement request rejected");
        }
        status.into_response()
    }
}
