//! Notification sink that keeps everything it is given.

use std::sync::Mutex;

use crate::domain::entitlement::Notification;
use crate::domain::foundation::UserId;
use crate::ports::NotificationSink;

#[derive(Default)]
pub struct RecordingNotifications {
    pushed: Mutex<Vec<Notification>>,
}

impl RecordingNotifications {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<Notification> {
        self.pushed.lock().map(|v| v.clone()).unwrap_or_default()
    }

    /// Notifications addressed to one user.
    pub fn for_recipient(&self, recipient: UserId) -> Vec<Notification> {
        self.all()
            .into_iter()
            .filter(|n| n.recipient == recipient)
            .collect()
    }
}

impl NotificationSink for RecordingNotifications {
    fn push(&self, notification: Notification) {
        if let Ok(mut pushed) = self.pushed.lock() {
            pushed.push(notification);
        }
    }
}
