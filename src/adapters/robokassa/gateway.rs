//! Robokassa invoice API adapter.
//!
//! Mints a provider-side invoice for a stored one. The request is signed with
//! `sha256(login:out_sum:inv_id:password1)` using the production or test
//! secret, whichever the current runtime settings select.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::config::SettingsStore;
use crate::domain::billing::{signature, MerchantCredentials};
use crate::ports::{GatewayInvoice, GatewayInvoiceRequest, PaymentError, PaymentGateway};

use super::wire_types::{CreateInvoiceBody, CreateInvoiceResponse};

const INVOICE_TYPE_ONE_TIME: &str = "OneTime";

pub struct RobokassaGateway {
    credentials: MerchantCredentials,
    api_base_url: String,
    settings: Arc<SettingsStore>,
    http_client: reqwest::Client,
}

impl RobokassaGateway {
    pub fn new(
        credentials: MerchantCredentials,
        api_base_url: impl Into<String>,
        settings: Arc<SettingsStore>,
        timeout: Duration,
    ) -> Result<Self, PaymentError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PaymentError::network(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            credentials,
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            settings,
            http_client,
        })
    }
}

#[async_trait]
impl PaymentGateway for RobokassaGateway {
    async fn create_invoice(
        &self,
        request: &GatewayInvoiceRequest,
    ) -> Result<GatewayInvoice, PaymentError> {
        let is_test = self.settings.snapshot().is_test;
        let signature_value = signature::creation_signature(
            &self.credentials.login,
            &request.out_sum,
            request.inv_id,
            self.credentials.password1(is_test),
        );
        let body = CreateInvoiceBody {
            merchant_login: &self.credentials.login,
            invoice_type: INVOICE_TYPE_ONE_TIME,
            inv_id: request.inv_id.value(),
            out_sum: request.out_sum.to_string(),
            description: &request.description,
            signature_value,
            is_test,
        };

        let url = format!("{}/CreateInvoice", self.api_base_url);
        let response = self
            .http_client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| PaymentError::network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(
                inv_id = %request.inv_id,
                %status,
                error = %error_text,
                "Gateway CreateInvoice failed"
            );
            return Err(PaymentError::rejected(format!("gateway returned {}", status))
                .with_provider_message(error_text));
        }

        let parsed: CreateInvoiceResponse = response
            .json()
            .await
            .map_err(|e| PaymentError::invalid_response(format!("unparseable body: {}", e)))?;

        match parsed {
            CreateInvoiceResponse {
                is_success: true,
                id: Some(id),
                ..
            } if !id.is_empty() => Ok(GatewayInvoice { provider_id: id }),
            CreateInvoiceResponse {
                is_success: true, ..
            } => Err(PaymentError::invalid_response("success without invoice id")),
            CreateInvoiceResponse { error_message, .. } => {
                let err = PaymentError::rejected("invoice refused");
                Err(match error_message {
                    Some(message) => err.with_provider_message(message),
                    None => err,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuntimeSettings;
    use crate::domain::foundation::InvoiceId;
    use crate::ports::PaymentErrorCode;
    use secrecy::SecretString;
    use serde_json::json;
    use sha2::{Digest, Sha256};
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn credentials() -> MerchantCredentials {
        MerchantCredentials::new(
            "login",
            SecretString::new("S1".into()),
            SecretString::new("S2".into()),
            SecretString::new("T1".into()),
            SecretString::new("T2".into()),
        )
    }

    fn gateway(server: &MockServer, is_test: bool) -> RobokassaGateway {
        let settings = Arc::new(SettingsStore::new(RuntimeSettings {
            is_test,
            ..Default::default()
        }));
        RobokassaGateway::new(credentials(), server.uri(), settings, Duration::from_secs(5))
            .unwrap()
    }

    fn request() -> GatewayInvoiceRequest {
        GatewayInvoiceRequest {
            inv_id: InvoiceId::new(42),
            out_sum: "199.99".parse().unwrap(),
            description: "Gold tier".to_string(),
        }
    }

    #[tokio::test]
    async fn sends_signed_request_and_returns_provider_id() {
        let server = MockServer::start().await;
        let expected_signature = hex::encode(Sha256::digest(b"login:199.99:42:S1"));
        Mock::given(method("POST"))
            .and(path("/CreateInvoice"))
            .and(body_partial_json(json!({
                "MerchantLogin": "login",
                "InvId": 42,
                "OutSum": "199.99",
                "SignatureValue": expected_signature,
                "IsTest": false,
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"isSuccess": true, "id": "abc123"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let invoice = gateway(&server, false).create_invoice(&request()).await.unwrap();
        assert_eq!(invoice.provider_id, "abc123");
    }

    #[tokio::test]
    async fn test_mode_signs_with_test_secret() {
        let server = MockServer::start().await;
        let expected_signature = hex::encode(Sha256::digest(b"login:199.99:42:T1"));
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "SignatureValue": expected_signature,
                "IsTest": true,
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"isSuccess": true, "id": "t-1"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let invoice = gateway(&server, true).create_invoice(&request()).await.unwrap();
        assert_eq!(invoice.provider_id, "t-1");
    }

    #[tokio::test]
    async fn refusal_carries_provider_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                json!({"isSuccess": false, "errorMessage": "Merchant disabled"}),
            ))
            .mount(&server)
            .await;

        let err = gateway(&server, false).create_invoice(&request()).await.unwrap_err();
        assert_eq!(err.code, PaymentErrorCode::Rejected);
        assert_eq!(err.provider_message.as_deref(), Some("Merchant disabled"));
    }

    #[tokio::test]
    async fn http_error_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let err = gateway(&server, false).create_invoice(&request()).await.unwrap_err();
        assert_eq!(err.code, PaymentErrorCode::Rejected);
    }

    #[tokio::test]
    async fn garbage_body_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = gateway(&server, false).create_invoice(&request()).await.unwrap_err();
        assert_eq!(err.code, PaymentErrorCode::InvalidResponse);
    }
}
