//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Billing
//!
//! - `InvoiceRepository` - Invoice persistence with the one-open-invoice rule
//! - `PaymentGateway` - Provider-side invoice creation
//! - `EntitlementGranter` - Hand-off from a paid invoice to the owning service
//!
//! ## Entitlements and content
//!
//! - `EntitlementStore` - Bindings, purchases, donations, follows, income
//! - `ContentRepository` - Posts, tiers, blog ownership
//!
//! ## Workers
//!
//! - `ReconciliationStore` - Bulk reads and overwrites for the periodic jobs
//! - `CommentCounter`, `WalletClient` - Neighbouring services
//!
//! ## Notifications
//!
//! - `NotificationSink` - Non-blocking push used by handlers
//! - `NotificationTransport` - Actual delivery
//! - `DeadLetterSink` - Undeliverable messages

mod content_repository;
mod entitlement_granter;
mod entitlement_store;
mod invoice_repository;
mod notifications;
mod payment_gateway;
mod reconciliation_store;
mod service_clients;

pub use content_repository::ContentRepository;
pub use entitlement_granter::EntitlementGranter;
pub use entitlement_store::{EntitlementStore, PostPurchase, SubscriptionGrant};
pub use invoice_repository::InvoiceRepository;
pub use notifications::{DeadLetterSink, NotificationSink, NotificationTransport};
pub use payment_gateway::{
    GatewayInvoice, GatewayInvoiceRequest, PaymentError, PaymentErrorCode, PaymentGateway,
};
pub use reconciliation_store::ReconciliationStore;
pub use service_clients::{CommentCounter, WalletClient};
