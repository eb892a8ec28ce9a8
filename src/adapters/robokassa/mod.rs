//! Robokassa payment gateway adapter.
//!
//! - `RobokassaGateway` - Invoice API client (JSON over HTTPS)
//! - `MockPaymentGateway` - Scriptable stand-in for tests and local runs
//!
//! # Security
//!
//! Both merchant secret pairs are held as `secrecy::SecretString`; only the
//! signature derived from them leaves the process.

mod gateway;
mod mock;
mod wire_types;

pub use gateway::RobokassaGateway;
pub use mock::MockPaymentGateway;
