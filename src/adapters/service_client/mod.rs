//! HTTP clients for neighbouring services.
//!
//! Every call presents the configured service identity in `USER-ID` and
//! `USER-ROLE: service`.
//!
//! - `HttpEntitlementGranter` - Grants against the service owning entitlements
//! - `UsersWalletClient` - Wallet credits on the Users service
//! - `CommentsClient` - Live comment counts

mod client;
mod comments;
mod granter;
mod wallet;

pub use client::ServiceClient;
pub use comments::CommentsClient;
pub use granter::HttpEntitlementGranter;
pub use wallet::{UsersWalletClient, IDEMPOTENCY_KEY_HEADER};
