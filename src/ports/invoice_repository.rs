//! Invoice repository port.
//!
//! Invoices are inserted once and then only updated; nothing is deleted.
//!
//! # Uniqueness
//!
//! Storage must reject a second `new` invoice for the same `(user_id, item_id)`
//! with a `Conflict` error. The payment-link handler relies on that to settle
//! concurrent requests from the same user.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::billing::{Invoice, NewInvoice};
use crate::domain::foundation::{DomainError, InvoiceId, UserId};

#[async_trait]
pub trait InvoiceRepository: Send + Sync {
    /// Inserts a draft and returns it with its assigned id.
    ///
    /// # Errors
    ///
    /// - `Conflict` if a `new` invoice already exists for the pair
    /// - `DatabaseError` on persistence failure
    async fn create(&self, draft: &NewInvoice) -> Result<Invoice, DomainError>;

    /// Persists status, link, and `updated_at` of an existing invoice.
    ///
    /// # Errors
    ///
    /// - `InvoiceNotFound` if the id is unknown
    async fn update(&self, invoice: &Invoice) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: InvoiceId) -> Result<Option<Invoice>, DomainError>;

    /// Most recently created invoice for `(user, item)`, any status.
    async fn find_latest_for(
        &self,
        user_id: UserId,
        item_id: Uuid,
    ) -> Result<Option<Invoice>, DomainError>;
}
