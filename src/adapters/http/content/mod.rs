//! HTTP adapter for content access.
//!
//! - `GET /posts/:id/access` - Whether the caller may read a post

pub mod dto;
mod handlers;
mod routes;

pub use handlers::{check_post_access, AccessApiError, ContentAppState};
pub use routes::content_routes;
