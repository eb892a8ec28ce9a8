//! Revenue records and wallet forwarding batches.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::domain::billing::ItemType;
use crate::domain::foundation::{
    Amount, BlogId, Currency, IncomeId, InvoiceId, Timestamp, UserId, WalletBatchId,
};

/// Money earned by a blog owner from one purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogIncome {
    pub id: IncomeId,
    pub blog_id: BlogId,
    /// Owner whose wallet receives the money.
    pub owner_id: UserId,
    pub payer_id: UserId,
    pub amount: Amount,
    pub currency: Currency,
    pub source: ItemType,
    pub item_id: Uuid,
    /// Invoice that paid for it; the grant idempotency key.
    pub invoice_id: Option<InvoiceId>,
    pub sent_to_user_wallet: bool,
    /// Set when the row is claimed for a wallet credit. Never changes after.
    pub wallet_batch: Option<WalletBatchId>,
    pub created_at: Timestamp,
}

impl BlogIncome {
    #[allow(clippy::too_many_arguments)]
    pub fn record(
        blog_id: BlogId,
        owner_id: UserId,
        payer_id: UserId,
        amount: Amount,
        currency: Currency,
        source: ItemType,
        item_id: Uuid,
        invoice_id: Option<InvoiceId>,
        now: Timestamp,
    ) -> Self {
        Self {
            id: IncomeId::new(),
            blog_id,
            owner_id,
            payer_id,
            amount,
            currency,
            source,
            item_id,
            invoice_id,
            sent_to_user_wallet: false,
            wallet_batch: None,
            created_at: now,
        }
    }
}

/// One wallet credit: a batch of an owner's unsent income.
///
/// Rows already claimed keep their batch until marked sent, so a retried
/// credit always carries the same rows, total and key. Unclaimed rows of an
/// owner form a fresh batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletCredit {
    pub owner_id: UserId,
    pub total: Amount,
    /// Sorted ascending.
    pub income_ids: Vec<IncomeId>,
    pub batch: WalletBatchId,
    /// The rows still have to be claimed for `batch` before crediting.
    pub unclaimed: bool,
}

impl WalletCredit {
    /// Key the Users service uses to recognize a repeated credit.
    pub fn idempotency_key(&self) -> String {
        self.batch.to_string()
    }
}

/// Groups unsent income per owner and batch. Rows already sent are skipped.
pub fn group_unsent(incomes: &[BlogIncome]) -> Vec<WalletCredit> {
    let mut groups: BTreeMap<(UserId, Option<WalletBatchId>), Vec<&BlogIncome>> = BTreeMap::new();
    for income in incomes.iter().filter(|i| !i.sent_to_user_wallet) {
        groups
            .entry((income.owner_id, income.wallet_batch))
            .or_default()
            .push(income);
    }

    groups
        .into_iter()
        .map(|((owner_id, batch), rows)| {
            let mut income_ids: Vec<IncomeId> = rows.iter().map(|r| r.id).collect();
            income_ids.sort();
            WalletCredit {
                owner_id,
                total: rows.iter().map(|r| r.amount).sum(),
                income_ids,
                batch: batch.unwrap_or_default(),
                unclaimed: batch.is_none(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn income(owner: UserId, amount: &str) -> BlogIncome {
        BlogIncome::record(
            BlogId::new(),
            owner,
            UserId::new(),
            amount.parse().unwrap(),
            Currency::Rub,
            ItemType::Post,
            Uuid::new_v4(),
            None,
            Timestamp::now(),
        )
    }

    #[test]
    fn sums_per_owner() {
        let alice = UserId::new();
        let bob = UserId::new();
        let rows = vec![income(alice, "100"), income(bob, "50.50"), income(alice, "0.25")];

        let credits = group_unsent(&rows);
        assert_eq!(credits.len(), 2);
        let alice_credit = credits.iter().find(|c| c.owner_id == alice).unwrap();
        assert_eq!(alice_credit.total.to_string(), "100.25");
        assert_eq!(alice_credit.income_ids.len(), 2);
        let bob_credit = credits.iter().find(|c| c.owner_id == bob).unwrap();
        assert_eq!(bob_credit.total.to_string(), "50.50");
    }

    #[test]
    fn skips_rows_already_sent() {
        let owner = UserId::new();
        let mut sent = income(owner, "10");
        sent.sent_to_user_wallet = true;
        assert!(group_unsent(&[sent]).is_empty());
    }

    #[test]
    fn claimed_rows_keep_their_batch_apart_from_new_income() {
        let owner = UserId::new();
        let batch = WalletBatchId::new();
        let mut claimed = income(owner, "100");
        claimed.wallet_batch = Some(batch);
        let fresh = income(owner, "40");

        let credits = group_unsent(&[fresh.clone(), claimed.clone()]);
        assert_eq!(credits.len(), 2);

        let retried = credits.iter().find(|c| !c.unclaimed).unwrap();
        assert_eq!(retried.idempotency_key(), batch.to_string());
        assert_eq!(retried.income_ids, vec![claimed.id]);
        assert_eq!(retried.total.to_string(), "100.00");

        let new = credits.iter().find(|c| c.unclaimed).unwrap();
        assert_ne!(new.batch, batch);
        assert_eq!(new.income_ids, vec![fresh.id]);
    }
}
