//! Redis pub/sub subscriber for runtime settings.
//!
//! Each message on the channel is a JSON [`SettingsUpdate`]. Malformed
//! messages are logged and dropped. A lost connection is retried with
//! capped exponential backoff until shutdown.

use futures::StreamExt;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::config::SettingsUpdate;
use crate::domain::foundation::{DomainError, ErrorCode};

const INITIAL_BACKOFF: Duration = Duration::from_millis(500);
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Parses one channel message.
pub fn parse_update(payload: &str) -> Result<SettingsUpdate, DomainError> {
    serde_json::from_str(payload).map_err(|e| {
        DomainError::new(
            ErrorCode::ValidationFailed,
            format!("Invalid settings message: {}", e),
        )
    })
}

pub struct RedisSettingsFeed {
    client: ::redis::Client,
    channel: String,
}

enum Exit {
    Shutdown,
    WriterGone,
}

impl RedisSettingsFeed {
    pub fn new(client: ::redis::Client, channel: impl Into<String>) -> Self {
        Self {
            client,
            channel: channel.into(),
        }
    }

    /// Subscribes in the background and forwards updates to `updates`.
    pub fn spawn(
        self,
        updates: mpsc::Sender<SettingsUpdate>,
        shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(updates, shutdown).await })
    }

    async fn run(self, updates: mpsc::Sender<SettingsUpdate>, mut shutdown: watch::Receiver<bool>) {
        let mut backoff = INITIAL_BACKOFF;
        loop {
            match self.listen(&updates, &mut shutdown).await {
                Ok(Exit::Shutdown) | Ok(Exit::WriterGone) => break,
                Err(e) => {
                    tracing::warn!(
                        channel = %self.channel,
                        error = %e,
                        retry_in_ms = backoff.as_millis() as u64,
                        "Settings feed disconnected"
                    );
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(backoff) => {}
                _ = shutdown.changed() => break,
            }
            backoff = (backoff * 2).min(MAX_BACKOFF);
        }
        tracing::debug!(channel = %self.channel, "Settings feed stopped");
    }

    async fn listen(
        &self,
        updates: &mpsc::Sender<SettingsUpdate>,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<Exit, ::redis::RedisError> {
        #[allow(deprecated)]
        let mut pubsub = self.client.get_async_connection().await?.into_pubsub();
        pubsub.subscribe(&self.channel).await?;
        tracing::info!(channel = %self.channel, "Subscribed to settings feed");

        let mut messages = pubsub.on_message();
        loop {
            tokio::select! {
                msg = messages.next() => {
                    let Some(msg) = msg else {
                        return Err(::redis::RedisError::from((
                            ::redis::ErrorKind::IoError,
                            "pub/sub stream ended",
                        )));
                    };
                    let payload: String = match msg.get_payload() {
                        Ok(p) => p,
                        Err(e) => {
                            tracing::warn!(error = %e, "Unreadable settings message");
                            continue;
                        }
                    };
                    match parse_update(&payload) {
                        Ok(update) => {
                            if updates.send(update).await.is_err() {
                                return Ok(Exit::WriterGone);
                            }
                        }
                        Err(e) => tracing::warn!(error = %e, "Dropped settings message"),
                    }
                }
                _ = shutdown.changed() => return Ok(Exit::Shutdown),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn parses_partial_update() {
        let update = parse_update(r#"{"max_price": "5000.00"}"#).unwrap();
        assert_eq!(update.max_price, Some(Decimal::new(500000, 2)));
        assert_eq!(update.min_price, None);
    }

    #[test]
    fn malformed_message_is_a_validation_error() {
        let err = parse_update("{not json").unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[test]
    fn wrong_field_type_is_rejected() {
        assert!(parse_update(r#"{"is_test": "maybe"}"#).is_err());
    }
}
