//! Caller identity extractors for axum.
//!
//! The upstream API gateway authenticates callers and forwards who they are in
//! two headers:
//!
//! ```text
//! USER-ID:   <uuid>
//! USER-ROLE: user | service | admin
//! ```
//!
//! - `RequireAuth` - Any caller with a valid `USER-ID`
//! - `OptionalAuth` - `None` for anonymous callers
//! - `RequireService` - Only `USER-ROLE: service`
//!
//! # Example
//!
//! ```ignore
//! async fn follow(RequireAuth(caller): RequireAuth, Path(blog): Path<Uuid>) -> StatusCode {
//!     // caller.user_id is the follower
//! }
//! ```

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
};

use crate::domain::foundation::UserId;

pub const USER_ID_HEADER: &str = "USER-ID";
pub const USER_ROLE_HEADER: &str = "USER-ROLE";
pub const SERVICE_ROLE: &str = "service";

/// Role forwarded by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallerRole {
    User,
    Service,
    Admin,
}

impl CallerRole {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "user" => Some(CallerRole::User),
            SERVICE_ROLE => Some(CallerRole::Service),
            "admin" => Some(CallerRole::Admin),
            _ => None,
        }
    }
}

/// Authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: UserId,
    pub role: CallerRole,
}

impl Caller {
    /// Reads the identity headers. A missing role means a plain user.
    fn from_parts(parts: &Parts) -> Result<Option<Self>, AuthRejection> {
        let Some(raw_id) = parts.headers.get(USER_ID_HEADER) else {
            return Ok(None);
        };
        let user_id = raw_id
            .to_str()
            .ok()
            .and_then(|s| UserId::parse(s).ok())
            .ok_or(AuthRejection::MalformedIdentity)?;
        let role = match parts.headers.get(USER_ROLE_HEADER) {
            None => CallerRole::User,
            Some(value) => value
                .to_str()
                .ok()
                .and_then(CallerRole::parse)
                .ok_or(AuthRejection::MalformedIdentity)?,
        };
        Ok(Some(Caller { user_id, role }))
    }
}

/// Extractor that requires an identified caller.
#[derive(Debug, Clone)]
pub struct RequireAuth(pub Caller);

#[async_trait]
impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Caller::from_parts(parts)?
            .map(RequireAuth)
            .ok_or(AuthRejection::Unauthenticated)
    }
}

/// Extractor for optional identity. Malformed headers count as anonymous.
#[derive(Debug, Clone)]
pub struct OptionalAuth(pub Option<Caller>);

#[async_trait]
impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalAuth(Caller::from_parts(parts).ok().flatten()))
    }
}

/// Extractor for service-to-service endpoints.
#[derive(Debug, Clone)]
pub struct RequireService(pub Caller);

#[async_trait]
impl<S> FromRequestParts<S> for RequireService
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let caller = Caller::from_parts(parts)?.ok_or(AuthRejection::Unauthenticated)?;
        if caller.role != CallerRole::Service {
            return Err(AuthRejection::Forbidden);
        }
        Ok(RequireService(caller))
    }
}

/// Rejection type for identity failures. Responds with a bare status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    Unauthenticated,
    MalformedIdentity,
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            AuthRejection::Unauthenticated | AuthRejection::MalformedIdentity => {
                StatusCode::UNAUTHORIZED.into_response()
            }
            AuthRejection::Forbidden => StatusCode::FORBIDDEN.into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/test");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    // ════════════════════════════════════════════════════════════════════════════
    // RequireAuth
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn require_auth_reads_user_id() {
        let id = UserId::new();
        let mut parts = parts(&[(USER_ID_HEADER, &id.to_string())]);

        let RequireAuth(caller) = RequireAuth::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(caller.user_id, id);
        assert_eq!(caller.role, CallerRole::User);
    }

    #[tokio::test]
    async fn require_auth_fails_without_header() {
        let mut parts = parts(&[]);
        let result = RequireAuth::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthRejection::Unauthenticated)));
    }

    #[tokio::test]
    async fn require_auth_rejects_garbage_id() {
        let mut parts = parts(&[(USER_ID_HEADER, "not-a-uuid")]);
        let result = RequireAuth::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthRejection::MalformedIdentity)));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // OptionalAuth
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn optional_auth_is_none_when_absent_or_malformed() {
        let mut absent = parts(&[]);
        let OptionalAuth(caller) = OptionalAuth::from_request_parts(&mut absent, &()).await.unwrap();
        assert!(caller.is_none());

        let mut malformed = parts(&[(USER_ID_HEADER, "???")]);
        let OptionalAuth(caller) =
            OptionalAuth::from_request_parts(&mut malformed, &()).await.unwrap();
        assert!(caller.is_none());
    }

    // ════════════════════════════════════════════════════════════════════════════
    // RequireService
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn require_service_accepts_service_role_case_insensitively() {
        let id = UserId::new();
        let mut parts = parts(&[(USER_ID_HEADER, &id.to_string()), (USER_ROLE_HEADER, "Service")]);
        let RequireService(caller) =
            RequireService::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(caller.role, CallerRole::Service);
    }

    #[tokio::test]
    async fn require_service_forbids_plain_users() {
        let mut parts = parts(&[(USER_ID_HEADER, &UserId::new().to_string()), (USER_ROLE_HEADER, "user")]);
        let result = RequireService::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthRejection::Forbidden)));
    }

    #[test]
    fn rejections_map_to_statuses() {
        assert_eq!(
            AuthRejection::Unauthenticated.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AuthRejection::Forbidden.into_response().status(), StatusCode::FORBIDDEN);
    }
}
