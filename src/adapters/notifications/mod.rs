//! Outbound notification adapters.
//!
//! - `OutboundQueue` - Bounded, non-blocking queue with dead-lettering
//! - `RedisNotificationTransport` - RPUSH onto the notification service's list
//! - `LogTransport` - Logs instead of delivering (no Redis configured)
//! - `TracingDeadLetters` - Dead letters to the `dead_letter` log target

mod queue;
mod transports;

pub use queue::{OutboundQueue, OutboundQueueConfig, TracingDeadLetters};
pub use transports::{LogTransport, RedisNotificationTransport};
