//! Neighbouring service endpoints

use serde::Deserialize;
use std::time::Duration;
use uuid::Uuid;

use super::error::ValidationError;
use super::payment::is_http_url;

/// Base URLs of the services this one calls
#[derive(Debug, Clone, Deserialize)]
pub struct ServicesConfig {
    /// Users service (wallet credits)
    pub users_url: String,

    /// Comments service (comment counts)
    pub comments_url: String,

    /// Entitlement owner; grants run in-process when unset
    pub content_url: Option<String>,

    /// Identity presented in `USER-ID` on service-to-service calls
    #[serde(default = "Uuid::nil")]
    pub service_user_id: Uuid,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl ServicesConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !is_http_url(&self.users_url) {
            return Err(ValidationError::InvalidServiceUrl("users"));
        }
        if !is_http_url(&self.comments_url) {
            return Err(ValidationError::InvalidServiceUrl("comments"));
        }
        if let Some(url) = &self.content_url {
            if !is_http_url(url) {
                return Err(ValidationError::InvalidServiceUrl("content"));
            }
            if self.service_user_id.is_nil() {
                return Err(ValidationError::MissingRequired("services.service_user_id"));
            }
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

fn default_timeout() -> u64 {
    10
}
