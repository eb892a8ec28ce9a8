//! In-memory invoice repository.

use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::domain::billing::{Invoice, InvoiceStatus, NewInvoice};
use crate::domain::foundation::{DomainError, ErrorCode, InvoiceId, Timestamp, UserId};
use crate::ports::InvoiceRepository;

/// Invoice store backed by a vector, with the same one-open-invoice rule as
/// the database's partial unique index.
#[derive(Default)]
pub struct InMemoryInvoiceRepository {
    invoices: Mutex<Vec<Invoice>>,
}

impl InMemoryInvoiceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Invoice>>, DomainError> {
        self.invoices
            .lock()
            .map_err(|_| DomainError::new(ErrorCode::InternalError, "invoice store lock poisoned"))
    }

    // === Test Helpers ===

    /// Every stored invoice in insertion order.
    pub fn all(&self) -> Vec<Invoice> {
        self.lock().map(|v| v.clone()).unwrap_or_default()
    }

    /// Overwrites an invoice as-is, bypassing the uniqueness check.
    pub fn put(&self, invoice: Invoice) {
        if let Ok(mut invoices) = self.lock() {
            invoices.retain(|i| i.id != invoice.id);
            invoices.push(invoice);
        }
    }
}

#[async_trait]
impl InvoiceRepository for InMemoryInvoiceRepository {
    async fn create(&self, draft: &NewInvoice) -> Result<Invoice, DomainError> {
        let mut invoices = self.lock()?;
        let open = invoices.iter().any(|i| {
            i.user_id == draft.user_id && i.item_id == draft.item_id && i.status == InvoiceStatus::New
        });
        if open {
            return Err(DomainError::new(
                ErrorCode::Conflict,
                "an open invoice already exists for this item",
            ));
        }

        let next_id = invoices.iter().map(|i| i.id.value()).max().unwrap_or(0) + 1;
        let invoice = Invoice::from_draft(InvoiceId::new(next_id), draft.clone(), Timestamp::now());
        invoices.push(invoice.clone());
        Ok(invoice)
    }

    async fn update(&self, invoice: &Invoice) -> Result<(), DomainError> {
        let mut invoices = self.lock()?;
        let slot = invoices
            .iter_mut()
            .find(|i| i.id == invoice.id)
            .ok_or_else(|| {
                DomainError::new(ErrorCode::InvoiceNotFound, format!("invoice {}", invoice.id))
            })?;
        *slot = invoice.clone();
        Ok(())
    }

    async fn find_by_id(&self, id: InvoiceId) -> Result<Option<Invoice>, DomainError> {
        Ok(self.lock()?.iter().find(|i| i.id == id).cloned())
    }

    async fn find_latest_for(
        &self,
        user_id: UserId,
        item_id: Uuid,
    ) -> Result<Option<Invoice>, DomainError> {
        Ok(self
            .lock()?
            .iter()
            .filter(|i| i.user_id == user_id && i.item_id == item_id)
            .max_by_key(|i| (i.created_at, i.id))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::ItemType;

    fn draft(user: UserId, item: Uuid) -> NewInvoice {
        NewInvoice::draft(
            "10".parse().unwrap(),
            item,
            ItemType::Post,
            user,
            "post",
            Timestamp::now(),
            3600,
        )
    }

    #[tokio::test]
    async fn assigns_increasing_ids() {
        let repo = InMemoryInvoiceRepository::new();
        let a = repo.create(&draft(UserId::new(), Uuid::new_v4())).await.unwrap();
        let b = repo.create(&draft(UserId::new(), Uuid::new_v4())).await.unwrap();
        assert!(b.id > a.id);
    }

    #[tokio::test]
    async fn second_open_invoice_for_pair_conflicts() {
        let repo = InMemoryInvoiceRepository::new();
        let user = UserId::new();
        let item = Uuid::new_v4();
        repo.create(&draft(user, item)).await.unwrap();
        let err = repo.create(&draft(user, item)).await.unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn latest_is_most_recent_for_pair() {
        let repo = InMemoryInvoiceRepository::new();
        let user = UserId::new();
        let item = Uuid::new_v4();
        let mut first = repo.create(&draft(user, item)).await.unwrap();
        first.mark_expired().unwrap();
        repo.update(&first).await.unwrap();
        let second = repo.create(&draft(user, item)).await.unwrap();

        let latest = repo.find_latest_for(user, item).await.unwrap().unwrap();
        assert_eq!(latest.id, second.id);
    }
}
