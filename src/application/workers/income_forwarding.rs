//! Forwards unsent blog income to owners' wallets.
//!
//! Unsent income rows are claimed into a batch per owner and each batch is
//! credited as one call keyed by the batch id. Rows are marked sent only after
//! the credit succeeded. A failed batch is retried on the next tick with the
//! same rows and key; income arriving meanwhile goes into a new batch.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::entitlement::{group_unsent, WalletCredit};
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{ReconciliationStore, WalletClient};

use super::PeriodicWorker;

pub struct IncomeForwardingWorker {
    store: Arc<dyn ReconciliationStore>,
    wallet: Arc<dyn WalletClient>,
}

impl IncomeForwardingWorker {
    pub fn new(store: Arc<dyn ReconciliationStore>, wallet: Arc<dyn WalletClient>) -> Self {
        Self { store, wallet }
    }

    async fn forward(&self, credit: &WalletCredit) -> Result<u64, DomainError> {
        if credit.unclaimed {
            let claimed = self
                .store
                .claim_wallet_batch(&credit.income_ids, credit.batch)
                .await?;
            if claimed != credit.income_ids.len() as u64 {
                return Err(DomainError::new(
                    ErrorCode::Conflict,
                    format!(
                        "claimed {} of {} income rows for batch {}",
                        claimed,
                        credit.income_ids.len(),
                        credit.batch
                    ),
                ));
            }
        }
        if !credit.total.is_zero() {
            self.wallet
                .credit_rub(credit.owner_id, credit.total, &credit.idempotency_key())
                .await?;
        }
        self.store.mark_incomes_sent(&credit.income_ids).await
    }
}

#[async_trait]
impl PeriodicWorker for IncomeForwardingWorker {
    fn name(&self) -> &'static str {
        "income_forwarding"
    }

    async fn tick(&self) -> Result<u64, DomainError> {
        let incomes = self.store.unsent_incomes().await?;
        let credits = group_unsent(&incomes);

        let mut marked = 0;
        let mut failed = 0;
        for credit in &credits {
            match self.forward(credit).await {
                Ok(n) => marked += n,
                Err(e) => {
                    failed += 1;
                    tracing::warn!(
                        owner_id = %credit.owner_id,
                        total = %credit.total,
                        error = %e,
                        "Wallet credit failed, will retry"
                    );
                }
            }
        }

        if failed > 0 {
            return Err(DomainError::new(
                ErrorCode::ExternalServiceError,
                format!("{} of {} wallet credits failed", failed, credits.len()),
            )
            .with_detail("marked", marked.to_string()));
        }
        Ok(marked)
    }
}
