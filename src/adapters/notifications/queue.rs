//! OutboundQueue - Fire-and-forget notification delivery.
//!
//! Handlers push into a bounded channel and return immediately. A dispatcher
//! task drains the channel and delivers through the configured transport with
//! at most `max_in_flight` deliveries running at once. Anything that cannot be
//! queued or delivered goes to the dead-letter sink.
//!
//! ## Configuration
//!
//! | Setting | Default | Description |
//! |---------|---------|-------------|
//! | `capacity` | 1024 | Queued notifications before pushes are dead-lettered |
//! | `max_in_flight` | 16 | Concurrent deliveries |
//! | `max_attempts` | 3 | Delivery attempts per notification |
//! | `retry_delay` | 200ms | Pause between attempts |
//!
//! ## Shutdown
//!
//! The dispatcher stops once every queue handle is dropped, after the
//! deliveries already in flight have finished.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use crate::domain::entitlement::Notification;
use crate::ports::{DeadLetterSink, NotificationSink, NotificationTransport};

#[derive(Debug, Clone)]
pub struct OutboundQueueConfig {
    pub capacity: usize,
    pub max_in_flight: usize,
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for OutboundQueueConfig {
    fn default() -> Self {
        Self {
            capacity: 1024,
            max_in_flight: 16,
            max_attempts: 3,
            retry_delay: Duration::from_millis(200),
        }
    }
}

impl OutboundQueueConfig {
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }
}

/// Handle used by handlers to enqueue notifications.
#[derive(Clone)]
pub struct OutboundQueue {
    sender: mpsc::Sender<Notification>,
    dead_letters: Arc<dyn DeadLetterSink>,
}

impl OutboundQueue {
    /// Starts the dispatcher and returns the queue handle plus its task.
    pub fn spawn(
        transport: Arc<dyn NotificationTransport>,
        dead_letters: Arc<dyn DeadLetterSink>,
        config: OutboundQueueConfig,
    ) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(config.capacity.max(1));
        let handle = tokio::spawn(dispatch(
            receiver,
            transport,
            dead_letters.clone(),
            config,
        ));
        (
            Self {
                sender,
                dead_letters,
            },
            handle,
        )
    }
}

impl NotificationSink for OutboundQueue {
    fn push(&self, notification: Notification) {
        match self.sender.try_send(notification) {
            Ok(()) => {}
            Err(TrySendError::Full(n)) => self.dead_letters.record(&n, "queue full"),
            Err(TrySendError::Closed(n)) => self.dead_letters.record(&n, "queue closed"),
        }
    }
}

async fn dispatch(
    mut receiver: mpsc::Receiver<Notification>,
    transport: Arc<dyn NotificationTransport>,
    dead_letters: Arc<dyn DeadLetterSink>,
    config: OutboundQueueConfig,
) {
    let max_in_flight = config.max_in_flight.max(1);
    let permits = Arc::new(Semaphore::new(max_in_flight));

    while let Some(notification) = receiver.recv().await {
        let Ok(permit) = permits.clone().acquire_owned().await else {
            dead_letters.record(&notification, "dispatcher stopped");
            continue;
        };
        let transport = transport.clone();
        let dead_letters = dead_letters.clone();
        let attempts = config.max_attempts.max(1);
        let retry_delay = config.retry_delay;

        tokio::spawn(async move {
            deliver_with_retries(&*transport, &*dead_letters, &notification, attempts, retry_delay)
                .await;
            drop(permit);
        });
    }

    // Wait for in-flight deliveries.
    let _ = permits.acquire_many(max_in_flight as u32).await;
    tracing::debug!("Notification dispatcher stopped");
}

async fn deliver_with_retries(
    transport: &dyn NotificationTransport,
    dead_letters: &dyn DeadLetterSink,
    notification: &Notification,
    attempts: u32,
    retry_delay: Duration,
) {
    let mut last_error = String::new();
    for attempt in 1..=attempts {
        match transport.deliver(notification).await {
            Ok(()) => return,
            Err(e) => {
                tracing::warn!(
                    recipient = %notification.recipient,
                    kind = notification.kind(),
                    attempt,
                    error = %e,
                    "Notification delivery failed"
                );
                last_error = e.to_string();
                if attempt < attempts {
                    tokio::time::sleep(retry_delay).await;
                }
            }
        }
    }
    dead_letters.record(notification, &last_error);
}

/// Dead-letter sink that writes to the `dead_letter` log target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDeadLetters;

impl DeadLetterSink for TracingDeadLetters {
    fn record(&self, notification: &Notification, reason: &str) {
        let payload = serde_json::to_string(notification).unwrap_or_default();
        tracing::error!(
            target: "dead_letter",
            recipient = %notification.recipient,
            kind = notification.kind(),
            reason,
            payload,
            "Notification dead-lettered"
        );
    }
}
