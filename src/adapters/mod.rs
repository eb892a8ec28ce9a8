//! Adapters - Implementations of port interfaces.
//!
//! - `postgres` - Storage ports backed by PostgreSQL
//! - `memory` - In-memory storage for tests and local runs
//! - `robokassa` - Payment gateway client
//! - `service_client` - Calls to the Users, Comments, and content services
//! - `notifications` - Bounded outbound queue and its transports
//! - `settings_feed` - Runtime settings pushed over Redis pub/sub
//! - `http` - axum routers

pub mod http;
pub mod memory;
pub mod notifications;
pub mod postgres;
pub mod robokassa;
pub mod service_client;
pub mod settings_feed;
