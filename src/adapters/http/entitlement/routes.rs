//! Axum router for entitlement endpoints.

use axum::{routing::post, Router};

use super::handlers::{
    confirm_donation, follow_blog, grant_post_access, grant_subscription, subscribe_free,
    unfollow_blog, EntitlementAppState,
};

pub fn entitlement_routes() -> Router<EntitlementAppState> {
    Router::new()
        .route("/subscriptions/grant", post(grant_subscription))
        .route("/paid-access/grant", post(grant_post_access))
        .route("/donations/confirm", post(confirm_donation))
        .route("/subscriptions/:id/subscribe-free", post(subscribe_free))
        .route("/blogs/:id/follow", post(follow_blog).delete(unfollow_blog))
}
