use axum::{routing::get, Router};

use super::handlers::{check_post_access, ContentAppState};

pub fn content_routes() -> Router<ContentAppState> {
    Router::new().route("/posts/:id/access", get(check_post_access))
}
