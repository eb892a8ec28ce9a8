//! Billing domain module.
//!
//! Purchase intents (invoices), their status machine, and the gateway
//! signature scheme.
//!
//! # Module Structure
//!
//! - `invoice` - Invoice aggregate and the payment-link reuse decision
//! - `invoice_status` - InvoiceStatus state machine
//! - `item_type` - What an invoice pays for
//! - `signature` - SHA-256 signatures shared with the gateway
//! - `credentials` - Merchant login and secret pairs
//! - `errors` - BillingError

mod credentials;
mod errors;
mod invoice;
mod invoice_status;
mod item_type;
pub mod signature;

pub use credentials::MerchantCredentials;
pub use errors::BillingError;
pub use invoice::{Invoice, NewInvoice, PaymentLinkDecision};
pub use invoice_status::InvoiceStatus;
pub use item_type::ItemType;
