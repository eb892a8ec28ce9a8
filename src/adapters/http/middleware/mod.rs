//! HTTP middleware for axum.
//!
//! - `auth` - Identity extractors over the gateway's `USER-ID` / `USER-ROLE` headers

pub mod auth;

pub use auth::{
    AuthRejection, Caller, CallerRole, OptionalAuth, RequireAuth, RequireService,
    SERVICE_ROLE, USER_ID_HEADER, USER_ROLE_HEADER,
};
