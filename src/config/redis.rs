//! Redis endpoints: the settings push channel and the notification list.

use serde::Deserialize;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    /// Pub/sub channel publishing [`SettingsUpdate`](super::SettingsUpdate) JSON.
    #[serde(default = "RedisConfig::default_settings_channel")]
    pub settings_channel: String,
    /// List the notification service pops from.
    #[serde(default = "RedisConfig::default_notification_channel")]
    pub notification_channel: String,
}

impl RedisConfig {
    fn default_settings_channel() -> String {
        "patronage:settings".to_string()
    }

    fn default_notification_channel() -> String {
        "patronage:notifications".to_string()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.url.trim().is_empty() {
            return Err(ValidationError::MissingRequired("REDIS__URL"));
        }
        let known_scheme = ["redis://", "rediss://", "redis+unix://"]
            .iter()
            .any(|scheme| self.url.starts_with(scheme));
        if !known_scheme {
            return Err(ValidationError::InvalidRedisUrl);
        }
        if self.settings_channel.is_empty() || self.notification_channel.is_empty() {
            return Err(ValidationError::MissingRequired("REDIS__*_CHANNEL"));
        }
        Ok(())
    }
}
