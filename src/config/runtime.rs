//! Hot-reloadable runtime settings.
//!
//! Readers take a lock-free snapshot with [`SettingsStore::snapshot`]. Only the
//! writer task spawned by [`spawn_settings_writer`] replaces the snapshot; it
//! is fed by the settings push channel.

use arc_swap::ArcSwap;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{LimitsConfig, PaymentConfig};
use crate::domain::billing::ItemType;
use crate::domain::foundation::{Amount, ValidationError};

/// Immutable snapshot of the scalars that may change without a restart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeSettings {
    pub min_price: Decimal,
    pub max_price: Decimal,
    pub min_donation: Decimal,
    /// Use the gateway's test secrets and flag invoices as test.
    pub is_test: bool,
    /// Bumped on every accepted update.
    pub version: u64,
}

impl RuntimeSettings {
    pub fn from_config(limits: &LimitsConfig, payment: &PaymentConfig) -> Self {
        Self {
            min_price: limits.min_price,
            max_price: limits.max_price,
            min_donation: limits.min_donation,
            is_test: payment.is_test,
            version: 0,
        }
    }

    /// Checks a payment-link sum against the current limits.
    pub fn check_sum(&self, item_type: ItemType, sum: Amount) -> Result<(), ValidationError> {
        let value = sum.as_decimal();
        match item_type {
            ItemType::Donation if value < self.min_donation => Err(ValidationError::invalid_format(
                "sum",
                format!("donation must be at least {}", self.min_donation),
            )),
            ItemType::Subscription | ItemType::Post
                if value < self.min_price || value > self.max_price =>
            {
                Err(ValidationError::out_of_range(
                    "sum",
                    self.min_price,
                    self.max_price,
                    value,
                ))
            }
            _ => Ok(()),
        }
    }

    /// Applies a partial update, rejecting results with inconsistent limits.
    pub fn apply(&self, update: &SettingsUpdate) -> Result<Self, ValidationError> {
        let next = Self {
            min_price: update.min_price.unwrap_or(self.min_price),
            max_price: update.max_price.unwrap_or(self.max_price),
            min_donation: update.min_donation.unwrap_or(self.min_donation),
            is_test: update.is_test.unwrap_or(self.is_test),
            version: self.version + 1,
        };
        if next.min_price.is_sign_negative() || next.min_donation.is_sign_negative() {
            return Err(ValidationError::invalid_format("limits", "negative limit"));
        }
        if next.min_price > next.max_price {
            return Err(ValidationError::out_of_range(
                "min_price",
                Decimal::ZERO,
                next.max_price,
                next.min_price,
            ));
        }
        Ok(next)
    }
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        let limits = LimitsConfig::default();
        Self {
            min_price: limits.min_price,
            max_price: limits.max_price,
            min_donation: limits.min_donation,
            is_test: false,
            version: 0,
        }
    }
}

/// Partial update pushed over the settings channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SettingsUpdate {
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub min_donation: Option<Decimal>,
    pub is_test: Option<bool>,
}

/// Atomically swappable holder of the current [`RuntimeSettings`].
pub struct SettingsStore {
    current: ArcSwap<RuntimeSettings>,
}

impl SettingsStore {
    pub fn new(initial: RuntimeSettings) -> Self {
        Self {
            current: ArcSwap::from_pointee(initial),
        }
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Arc<RuntimeSettings> {
        self.current.load_full()
    }

    fn replace(&self, next: RuntimeSettings) {
        self.current.store(Arc::new(next));
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new(RuntimeSettings::default())
    }
}

/// Spawns the single writer. Updates sent on the returned channel are applied
/// in order; the task ends when every sender is dropped.
pub fn spawn_settings_writer(
    store: Arc<SettingsStore>,
    capacity: usize,
) -> (mpsc::Sender<SettingsUpdate>, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel::<SettingsUpdate>(capacity);
    let handle = tokio::spawn(async move {
        while let Some(update) = rx.recv().await {
            let current = store.snapshot();
            match current.apply(&update) {
                Ok(next) => {
                    tracing::info!(
                        version = next.version,
                        min_price = %next.min_price,
                        max_price = %next.max_price,
                        min_donation = %next.min_donation,
                        is_test = next.is_test,
                        "Runtime settings updated"
                    );
                    store.replace(next);
                }
                Err(e) => {
                    tracing::warn!(error = %e, ?update, "Rejected runtime settings update");
                }
            }
        }
        tracing::debug!("Settings writer stopped");
    });
    (tx, handle)
}
