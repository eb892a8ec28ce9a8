//! Notification transports.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use crate::domain::entitlement::Notification;
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::NotificationTransport;

/// Appends JSON notifications to a Redis list consumed by the notification service.
#[derive(Clone)]
pub struct RedisNotificationTransport {
    conn: MultiplexedConnection,
    list_key: String,
}

impl RedisNotificationTransport {
    pub fn new(conn: MultiplexedConnection, list_key: impl Into<String>) -> Self {
        Self {
            conn,
            list_key: list_key.into(),
        }
    }
}

#[async_trait]
impl NotificationTransport for RedisNotificationTransport {
    async fn deliver(&self, notification: &Notification) -> Result<(), DomainError> {
        let payload = serde_json::to_string(notification).map_err(|e| {
            DomainError::new(ErrorCode::InternalError, format!("serialize notification: {}", e))
        })?;
        let mut conn = self.conn.clone();
        conn.rpush::<_, _, ()>(&self.list_key, payload)
            .await
            .map_err(|e: redis::RedisError| DomainError::new(ErrorCode::CacheError, e.to_string()))
    }
}

/// Logs notifications instead of sending them. Used when Redis is not configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTransport;

#[async_trait]
impl NotificationTransport for LogTransport {
    async fn deliver(&self, notification: &Notification) -> Result<(), DomainError> {
        tracing::info!(
            recipient = %notification.recipient,
            kind = notification.kind(),
            "Notification (log transport)"
        );
        Ok(())
    }
}
