//! HTTP handlers for content access.

use std::sync::Arc;

use axum::extract::rejection::PathRejection;
use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::adapters::http::middleware::OptionalAuth;
use crate::application::handlers::content::{CheckPostAccessHandler, CheckPostAccessQuery};
use crate::domain::content::AccessError;
use crate::domain::foundation::PostId;

use super::dto::AccessResponse;

#[derive(Clone)]
pub struct ContentAppState {
    pub access: Arc<CheckPostAccessHandler>,
}

/// GET /posts/:id/access
///
/// Anonymous callers are evaluated as guests.
pub async fn check_post_access(
    State(state): State<ContentAppState>,
    OptionalAuth(caller): OptionalAuth,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<AccessResponse>, AccessApiError> {
    let Path(post_id) = path.map_err(|e| AccessError::Malformed(e.body_text()))?;
    let decision = state
        .access
        .handle(CheckPostAccessQuery {
            post_id: PostId::from_uuid(post_id),
            viewer: caller.map(|c| c.user_id),
        })
        .await?;
    Ok(Json(AccessResponse::from(&decision)))
}

#[derive(Debug)]
pub struct AccessApiError(AccessError);

impl From<AccessError> for AccessApiError {
    fn from(err: AccessError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AccessApiError {
    fn into_response(self) -> Response {
        match &self.0 {
            AccessError::PostNotFound(_) => StatusCode::NOT_FOUND.into_response(),
            AccessError::Malformed(_) => {
                tracing::warn!(error = %self.0, "Access check rejected");
                StatusCode::BAD_REQUEST.into_response()
            }
            AccessError::Infrastructure(_) => {
                tracing::error!(error = %self.0, "Access check failed");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}
