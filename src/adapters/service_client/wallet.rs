//! Users service wallet client.

use async_trait::async_trait;
use reqwest::Method;
use serde::Serialize;

use crate::domain::foundation::{Amount, DomainError, UserId};
use crate::ports::WalletClient;

use super::ServiceClient;

pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

#[derive(Debug, Serialize)]
struct AddRubBody {
    value: Amount,
}

pub struct UsersWalletClient {
    client: ServiceClient,
}

impl UsersWalletClient {
    pub fn new(client: ServiceClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl WalletClient for UsersWalletClient {
    async fn credit_rub(
        &self,
        user_id: UserId,
        value: Amount,
        idempotency_key: &str,
    ) -> Result<(), DomainError> {
        let path = format!("/id/{}/wallet/add-rub", user_id);
        let request = self
            .client
            .request(Method::PUT, &path)
            .header(IDEMPOTENCY_KEY_HEADER, idempotency_key)
            .json(&AddRubBody { value });
        self.client.send(request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use uuid::Uuid;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn wallet(server: &MockServer) -> UsersWalletClient {
        UsersWalletClient::new(
            ServiceClient::new("users", server.uri(), Uuid::new_v4(), Duration::from_secs(5))
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn puts_credit_with_idempotency_key() {
        let server = MockServer::start().await;
        let owner = UserId::new();
        Mock::given(method("PUT"))
            .and(path(format!("/id/{}/wallet/add-rub", owner)))
            .and(header("Idempotency-Key", "abc"))
            .and(body_json(json!({"value": "250.50"})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        wallet(&server)
            .credit_rub(owner, "250.50".parse().unwrap(), "abc")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn rejected_credit_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let result = wallet(&server)
            .credit_rub(UserId::new(), "1.00".parse().unwrap(), "k")
            .await;
        assert!(result.is_err());
    }
}
