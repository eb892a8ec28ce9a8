//! Shared plumbing for service-to-service HTTP calls.

use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response};
use uuid::Uuid;

use crate::adapters::http::middleware::{SERVICE_ROLE, USER_ID_HEADER, USER_ROLE_HEADER};
use crate::domain::foundation::DomainError;

/// Base URL plus the service identity headers.
#[derive(Clone)]
pub struct ServiceClient {
    service: &'static str,
    base_url: String,
    service_user_id: Uuid,
    http_client: reqwest::Client,
}

impl ServiceClient {
    pub fn new(
        service: &'static str,
        base_url: impl Into<String>,
        service_user_id: Uuid,
        timeout: Duration,
    ) -> Result<Self, DomainError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::external(service, e))?;
        Ok(Self {
            service,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            service_user_id,
            http_client,
        })
    }

    pub fn service(&self) -> &'static str {
        self.service
    }

    /// Request to `base_url + path` carrying the service identity.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http_client
            .request(method, format!("{}{}", self.base_url, path))
            .header(USER_ID_HEADER, self.service_user_id.to_string())
            .header(USER_ROLE_HEADER, SERVICE_ROLE)
    }

    /// Sends and fails on transport errors and non-2xx statuses.
    pub async fn send(&self, request: RequestBuilder) -> Result<Response, DomainError> {
        let response = request
            .send()
            .await
            .map_err(|e| DomainError::external(self.service, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(service = self.service, %status, body = %body, "Service call rejected");
            return Err(DomainError::external(self.service, format!("status {}", status))
                .with_detail("status", status.as_u16().to_string()));
        }
        Ok(response)
    }
}
