//! In-memory adapters for local runs and tests.

mod database;
mod invoices;
mod notifications;

pub use database::InMemoryDatabase;
pub use invoices::InMemoryInvoiceRepository;
pub use notifications::RecordingNotifications;
