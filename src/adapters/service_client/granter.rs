//! Entitlement grants over HTTP, for deployments where another service owns
//! subscriptions, purchases, and donations.

use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;

use crate::domain::entitlement::{GrantOutcome, GrantRequest};
use crate::domain::foundation::DomainError;
use crate::ports::EntitlementGranter;

use super::ServiceClient;

#[derive(Debug, Deserialize)]
struct GrantResponse {
    outcome: GrantOutcome,
}

pub struct HttpEntitlementGranter {
    client: ServiceClient,
}

impl HttpEntitlementGranter {
    pub fn new(client: ServiceClient) -> Self {
        Self { client }
    }

    async fn post_grant(&self, path: &str, request: &GrantRequest) -> Result<GrantOutcome, DomainError> {
        let response = self
            .client
            .send(self.client.request(Method::POST, path).json(request))
            .await?;
        let body: GrantResponse = response
            .json()
            .await
            .map_err(|e| DomainError::external(self.client.service(), e))?;
        tracing::debug!(
            path,
            item_id = %request.item_id,
            user_id = %request.user_id,
            outcome = ?body.outcome,
            "Grant delivered"
        );
        Ok(body.outcome)
    }
}

#[async_trait]
impl EntitlementGranter for HttpEntitlementGranter {
    async fn grant_subscription(&self, request: &GrantRequest) -> Result<GrantOutcome, DomainError> {
        self.post_grant("/subscriptions/grant", request).await
    }

    async fn grant_post_access(&self, request: &GrantRequest) -> Result<GrantOutcome, DomainError> {
        self.post_grant("/paid-access/grant", request).await
    }

    async fn confirm_donation(&self, request: &GrantRequest) -> Result<GrantOutcome, DomainError> {
        self.post_grant("/donations/confirm", request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{Currency, ErrorCode, InvoiceId, UserId};
    use serde_json::json;
    use std::time::Duration;
    use uuid::Uuid;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn granter(server: &MockServer, service_id: Uuid) -> HttpEntitlementGranter {
        let client =
            ServiceClient::new("content", server.uri(), service_id, Duration::from_secs(5)).unwrap();
        HttpEntitlementGranter::new(client)
    }

    fn request() -> GrantRequest {
        GrantRequest {
            item_id: Uuid::new_v4(),
            user_id: UserId::new(),
            value: "100.00".parse().unwrap(),
            currency: Currency::Rub,
            invoice_id: Some(InvoiceId::new(7)),
        }
    }

    #[tokio::test]
    async fn posts_subscription_grant_with_service_headers() {
        let server = MockServer::start().await;
        let service_id = Uuid::new_v4();
        let req = request();
        Mock::given(method("POST"))
            .and(path("/subscriptions/grant"))
            .and(header("USER-ROLE", "service"))
            .and(header("USER-ID", service_id.to_string().as_str()))
            .and(body_partial_json(json!({
                "item_id": req.item_id,
                "invoice_id": 7,
                "value": "100.00",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"outcome": "granted"})))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = granter(&server, service_id).grant_subscription(&req).await.unwrap();
        assert_eq!(outcome, GrantOutcome::Granted);
    }

    #[tokio::test]
    async fn passes_through_already_granted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/donations/confirm"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"outcome": "already_granted"})),
            )
            .mount(&server)
            .await;

        let outcome = granter(&server, Uuid::new_v4())
            .confirm_donation(&request())
            .await
            .unwrap();
        assert_eq!(outcome, GrantOutcome::AlreadyGranted);
    }

    #[tokio::test]
    async fn server_error_is_external_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/paid-access/grant"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = granter(&server, Uuid::new_v4())
            .grant_post_access(&request())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ExternalServiceError);
        assert_eq!(err.details.get("status").map(String::as_str), Some("500"));
    }
}
