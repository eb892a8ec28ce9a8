//! Composition of the HTTP surface.

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::{routing::get, Router};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::billing::{billing_routes, BillingAppState};
use super::content::{content_routes, ContentAppState};
use super::entitlement::{entitlement_routes, EntitlementAppState};
use crate::application::handlers::billing::{
    ConfirmPaymentHandler, GrantDispatcher, PaymentLinkSettings, RequestPaymentLinkHandler,
};
use crate::application::handlers::content::CheckPostAccessHandler;
use crate::application::handlers::entitlement::{
    ConfirmDonationHandler, FollowHandler, GrantPostAccessHandler, GrantSubscriptionHandler,
    LocalEntitlementGranter, SubscribeFreeHandler, UnfollowHandler,
};
use crate::config::SettingsStore;
use crate::domain::billing::MerchantCredentials;
use crate::ports::{
    ContentRepository, EntitlementGranter, EntitlementStore, InvoiceRepository, NotificationSink,
    PaymentGateway,
};

/// Adapters the handlers are built on.
pub struct Ports {
    pub invoices: Arc<dyn InvoiceRepository>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub content: Arc<dyn ContentRepository>,
    pub entitlements: Arc<dyn EntitlementStore>,
    pub notifications: Arc<dyn NotificationSink>,
    /// Grants go to the content service when set, otherwise to the local handlers.
    pub remote_granter: Option<Arc<dyn EntitlementGranter>>,
}

#[derive(Clone)]
pub struct AppState {
    pub billing: BillingAppState,
    pub entitlement: EntitlementAppState,
    pub content: ContentAppState,
}

impl AppState {
    /// Wires every handler.
    pub fn build(
        ports: Ports,
        credentials: MerchantCredentials,
        settings: Arc<SettingsStore>,
        link_settings: PaymentLinkSettings,
    ) -> Self {
        let subscriptions = Arc::new(GrantSubscriptionHandler::new(
            ports.content.clone(),
            ports.entitlements.clone(),
            ports.notifications.clone(),
        ));
        let post_access = Arc::new(GrantPostAccessHandler::new(
            ports.content.clone(),
            ports.entitlements.clone(),
            ports.notifications.clone(),
        ));
        let donations = Arc::new(ConfirmDonationHandler::new(
            ports.content.clone(),
            ports.entitlements.clone(),
            ports.notifications.clone(),
        ));

        let granter: Arc<dyn EntitlementGranter> = match ports.remote_granter {
            Some(remote) => remote,
            None => Arc::new(LocalEntitlementGranter::new(
                subscriptions.clone(),
                post_access.clone(),
                donations.clone(),
            )),
        };
        let dispatcher = Arc::new(GrantDispatcher::new(granter));

        Self {
            billing: BillingAppState {
                payment_links: Arc::new(RequestPaymentLinkHandler::new(
                    ports.invoices.clone(),
                    ports.gateway,
                    settings.clone(),
                    link_settings,
                )),
                confirmations: Arc::new(ConfirmPaymentHandler::new(
                    ports.invoices,
                    dispatcher,
                    credentials,
                    settings,
                )),
            },
            entitlement: EntitlementAppState {
                subscriptions,
                post_access,
                donations,
                subscribe_free: Arc::new(SubscribeFreeHandler::new(
                    ports.content.clone(),
                    ports.entitlements.clone(),
                )),
                follow: Arc::new(FollowHandler::new(
                    ports.content.clone(),
                    ports.entitlements.clone(),
                )),
                unfollow: Arc::new(UnfollowHandler::new(ports.entitlements.clone())),
            },
            content: ContentAppState {
                access: Arc::new(CheckPostAccessHandler::new(ports.content, ports.entitlements)),
            },
        }
    }
}

async fn health() -> StatusCode {
    StatusCode::OK
}

/// Full application router.
pub fn app_router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(billing_routes().with_state(state.billing))
        .merge(entitlement_routes().with_state(state.entitlement))
        .merge(content_routes().with_state(state.content))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::http::middleware::{SERVICE_ROLE, USER_ID_HEADER, USER_ROLE_HEADER};
    use crate::adapters::memory::{InMemoryDatabase, InMemoryInvoiceRepository, RecordingNotifications};
    use crate::adapters::robokassa::MockPaymentGateway;
    use axum::body::Body;
    use axum::http::Request;
    use secrecy::SecretString;
    use tower::ServiceExt;
    use uuid::Uuid;

    fn router() -> Router {
        let db = Arc::new(InMemoryDatabase::new());
        let ports = Ports {
            invoices: Arc::new(InMemoryInvoiceRepository::new()),
            gateway: Arc::new(MockPaymentGateway::new()),
            content: db.clone(),
            entitlements: db,
            notifications: Arc::new(RecordingNotifications::new()),
            remote_granter: None,
        };
        let secret = || SecretString::new("s".to_string());
        let credentials =
            MerchantCredentials::new("shop".to_string(), secret(), secret(), secret(), secret());
        let state = AppState::build(
            ports,
            credentials,
            Arc::new(SettingsStore::default()),
            PaymentLinkSettings {
                payment_link_prefix: "https://pay.test/".to_string(),
                invoice_ttl_secs: 3600,
            },
        );
        app_router(state, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn health_is_ok_and_carries_a_request_id() {
        let response = router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn payment_link_requires_service_role() {
        let request = Request::post("/payment-link")
            .header(USER_ID_HEADER, Uuid::new_v4().to_string())
            .header("content-type", "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let response = router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn malformed_payment_link_body_is_a_bare_400() {
        let request = Request::post("/payment-link")
            .header(USER_ID_HEADER, Uuid::new_v4().to_string())
            .header(USER_ROLE_HEADER, SERVICE_ROLE)
            .header("content-type", "application/json")
            .body(Body::from(r#"{"item_id": 1}"#))
            .unwrap();
        let response = router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert!(body.is_empty());
    }

    async fn bare_status(request: Request<Body>) -> (StatusCode, usize) {
        let response = router().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), 4096).await.unwrap();
        (status, body.len())
    }

    #[tokio::test]
    async fn malformed_grant_body_is_a_bare_400() {
        let request = Request::post("/subscriptions/grant")
            .header(USER_ID_HEADER, Uuid::new_v4().to_string())
            .header(USER_ROLE_HEADER, SERVICE_ROLE)
            .header("content-type", "application/json")
            .body(Body::from(r#"{"item_id":"nope","user_id":1}"#))
            .unwrap();
        assert_eq!(bare_status(request).await, (StatusCode::BAD_REQUEST, 0));
    }

    #[tokio::test]
    async fn malformed_path_ids_are_bare_400s() {
        let access = Request::get("/posts/not-a-uuid/access")
            .body(Body::empty())
            .unwrap();
        assert_eq!(bare_status(access).await, (StatusCode::BAD_REQUEST, 0));

        let subscribe = Request::post("/subscriptions/not-a-uuid/subscribe-free")
            .header(USER_ID_HEADER, Uuid::new_v4().to_string())
            .body(Body::empty())
            .unwrap();
        assert_eq!(bare_status(subscribe).await, (StatusCode::BAD_REQUEST, 0));

        let follow = Request::delete("/blogs/not-a-uuid/follow")
            .header(USER_ID_HEADER, Uuid::new_v4().to_string())
            .body(Body::empty())
            .unwrap();
        assert_eq!(bare_status(follow).await, (StatusCode::BAD_REQUEST, 0));
    }

    #[tokio::test]
    async fn confirm_with_bad_signature_is_400() {
        let response = router()
            .oneshot(
                Request::get("/confirm?OutSum=10.00&InvId=99&SignatureValue=abc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn confirm_without_query_is_400() {
        let response = router()
            .oneshot(Request::get("/confirm").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn access_to_unknown_post_is_404() {
        let uri = format!("/posts/{}/access", Uuid::new_v4());
        let response = router()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn follow_requires_identity() {
        let uri = format!("/blogs/{}/follow", Uuid::new_v4());
        let response = router()
            .oneshot(Request::post(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
