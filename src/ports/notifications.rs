//! Outbound notification ports.

use async_trait::async_trait;

use crate::domain::entitlement::Notification;
use crate::domain::foundation::DomainError;

/// Delivers one notification to the notification service.
#[async_trait]
pub trait NotificationTransport: Send + Sync {
    async fn deliver(&self, notification: &Notification) -> Result<(), DomainError>;
}

/// Accepts notifications without blocking the caller.
///
/// Implementations may drop or dead-letter a notification; they never fail the caller.
pub trait NotificationSink: Send + Sync {
    fn push(&self, notification: Notification);
}

/// Where undeliverable notifications end up.
pub trait DeadLetterSink: Send + Sync {
    fn record(&self, notification: &Notification, reason: &str);
}
