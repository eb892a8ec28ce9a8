//! ConfirmPaymentHandler - Processes the gateway's payment result callback.
//!
//! The callback is authenticated by `sha256(out_sum:inv_id:password2)`. A
//! valid callback grants the entitlement first and only then marks the
//! invoice confirmed, so a failed grant leaves the invoice `new` for the
//! gateway to redeliver.

use std::sync::Arc;

use crate::application::KeyedLock;
use crate::config::SettingsStore;
use crate::domain::billing::{signature, BillingError, InvoiceStatus, MerchantCredentials};
use crate::domain::entitlement::GrantOutcome;
use crate::domain::foundation::{Amount, InvoiceId, StateMachine};
use crate::ports::InvoiceRepository;

use super::GrantDispatcher;

/// Command built from the callback query.
#[derive(Debug, Clone)]
pub struct ConfirmPaymentCommand {
    pub out_sum: Amount,
    pub inv_id: InvoiceId,
    pub signature: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmPaymentResult {
    /// Entitlement granted and invoice confirmed now.
    Confirmed { invoice_id: InvoiceId, grant: GrantOutcome },
    /// A redelivery for an invoice confirmed earlier.
    AlreadyConfirmed { invoice_id: InvoiceId },
}

impl ConfirmPaymentResult {
    pub fn invoice_id(&self) -> InvoiceId {
        match self {
            ConfirmPaymentResult::Confirmed { invoice_id, .. }
            | ConfirmPaymentResult::AlreadyConfirmed { invoice_id } => *invoice_id,
        }
    }

    /// Body the gateway expects: `OK` followed by the invoice id.
    pub fn ack_body(&self) -> String {
        format!("OK{}", self.invoice_id())
    }
}

pub struct ConfirmPaymentHandler {
    invoices: Arc<dyn InvoiceRepository>,
    dispatcher: Arc<GrantDispatcher>,
    credentials: MerchantCredentials,
    settings: Arc<SettingsStore>,
    locks: KeyedLock<InvoiceId>,
}

impl ConfirmPaymentHandler {
    pub fn new(
        invoices: Arc<dyn InvoiceRepository>,
        dispatcher: Arc<GrantDispatcher>,
        credentials: MerchantCredentials,
        settings: Arc<SettingsStore>,
    ) -> Self {
        Self {
            invoices,
            dispatcher,
            credentials,
            settings,
            locks: KeyedLock::new(),
        }
    }

    pub async fn handle(&self, cmd: ConfirmPaymentCommand) -> Result<ConfirmPaymentResult, BillingError> {
        // 1. Authenticate the callback
        let is_test = self.settings.snapshot().is_test;
        let expected = signature::result_signature(
            &cmd.out_sum,
            cmd.inv_id,
            self.credentials.password2(is_test),
        );
        if !signature::signatures_match(&expected, &cmd.signature) {
            tracing::warn!(inv_id = %cmd.inv_id, is_test, "Payment callback with invalid signature");
            return Err(BillingError::InvalidSignature);
        }

        let _guard = self.locks.lock(cmd.inv_id).await;

        // 2. Load and check the invoice
        let mut invoice = self
            .invoices
            .find_by_id(cmd.inv_id)
            .await?
            .ok_or(BillingError::InvoiceNotFound(cmd.inv_id))?;

        if invoice.out_sum != cmd.out_sum {
            tracing::warn!(
                invoice_id = %invoice.id,
                expected = %invoice.out_sum,
                actual = %cmd.out_sum,
                "Payment callback amount mismatch"
            );
            return Err(BillingError::AmountMismatch {
                expected: invoice.out_sum,
                actual: cmd.out_sum,
            });
        }

        if invoice.status == InvoiceStatus::Confirmed {
            tracing::info!(invoice_id = %invoice.id, "Payment callback redelivered for confirmed invoice");
            return Ok(ConfirmPaymentResult::AlreadyConfirmed {
                invoice_id: invoice.id,
            });
        }
        if !invoice.status.can_transition_to(&InvoiceStatus::Confirmed) {
            return Err(BillingError::invalid_state(invoice.status.as_str(), "confirm"));
        }

        // 3. Grant, then confirm
        let grant = self.dispatcher.dispatch(&invoice).await?;
        invoice.confirm()?;
        self.invoices.update(&invoice).await?;

        tracing::info!(
            invoice_id = %invoice.id,
            user_id = %invoice.user_id,
            item_type = %invoice.item_type,
            out_sum = %invoice.out_sum,
            grant = ?grant,
            "Invoice confirmed"
        );

        Ok(ConfirmPaymentResult::Confirmed {
            invoice_id: invoice.id,
            grant,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::grant_dispatcher::test_support::RecordingGranter;
    use super::*;
    use crate::adapters::memory::InMemoryInvoiceRepository;
    use crate::config::RuntimeSettings;
    use crate::domain::billing::{ItemType, NewInvoice};
    use crate::domain::foundation::{Timestamp, UserId};
    use secrecy::SecretString;
    use uuid::Uuid;

    struct Fixture {
        invoices: Arc<InMemoryInvoiceRepository>,
        granter: Arc<RecordingGranter>,
        handler: ConfirmPaymentHandler,
    }

    fn credentials() -> MerchantCredentials {
        MerchantCredentials::new(
            "login",
            SecretString::new("S1".into()),
            SecretString::new("P2".into()),
            SecretString::new("T1".into()),
            SecretString::new("T2".into()),
        )
    }

    fn fixture() -> Fixture {
        fixture_with(RuntimeSettings::default())
    }

    fn fixture_with(settings: RuntimeSettings) -> Fixture {
        let invoices = Arc::new(InMemoryInvoiceRepository::new());
        let granter = Arc::new(RecordingGranter::default());
        let handler = ConfirmPaymentHandler::new(
            invoices.clone(),
            Arc::new(GrantDispatcher::new(granter.clone())),
            credentials(),
            Arc::new(SettingsStore::new(settings)),
        );
        Fixture {
            invoices,
            granter,
            handler,
        }
    }

    async fn open_invoice(f: &Fixture, sum: &str) -> InvoiceId {
        let draft = NewInvoice::draft(
            sum.parse().unwrap(),
            Uuid::new_v4(),
            ItemType::Subscription,
            UserId::new(),
            "Gold",
            Timestamp::now(),
            3600,
        );
        f.invoices.create(&draft).await.unwrap().id
    }

    fn signed(sum: &str, id: InvoiceId, secret: &str) -> ConfirmPaymentCommand {
        let out_sum: Amount = sum.parse().unwrap();
        ConfirmPaymentCommand {
            out_sum,
            inv_id: id,
            signature: signature::result_signature(&out_sum, id, secret),
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Happy path
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn valid_callback_grants_then_confirms() {
        let f = fixture();
        let id = open_invoice(&f, "199.99").await;

        let result = f.handler.handle(signed("199.99", id, "P2")).await.unwrap();

        assert_eq!(result.ack_body(), format!("OK{}", id));
        assert_eq!(f.granter.calls().len(), 1);
        assert_eq!(f.invoices.all()[0].status, InvoiceStatus::Confirmed);
    }

    #[tokio::test]
    async fn uppercase_signature_is_accepted() {
        let f = fixture();
        let id = open_invoice(&f, "50.00").await;
        let mut cmd = signed("50.00", id, "P2");
        cmd.signature = cmd.signature.to_uppercase();

        assert!(f.handler.handle(cmd).await.is_ok());
    }

    #[tokio::test]
    async fn test_mode_uses_test_secret() {
        let f = fixture_with(RuntimeSettings {
            is_test: true,
            ..Default::default()
        });
        let id = open_invoice(&f, "50.00").await;

        assert!(matches!(
            f.handler.handle(signed("50.00", id, "P2")).await,
            Err(BillingError::InvalidSignature)
        ));
        assert!(f.handler.handle(signed("50.00", id, "T2")).await.is_ok());
    }

    #[tokio::test]
    async fn redelivery_is_acknowledged_without_second_grant() {
        let f = fixture();
        let id = open_invoice(&f, "10.00").await;

        f.handler.handle(signed("10.00", id, "P2")).await.unwrap();
        let again = f.handler.handle(signed("10.00", id, "P2")).await.unwrap();

        assert_eq!(again, ConfirmPaymentResult::AlreadyConfirmed { invoice_id: id });
        assert_eq!(f.granter.calls().len(), 1);
    }

    #[tokio::test]
    async fn superseded_invoice_can_still_be_paid() {
        let f = fixture();
        let id = open_invoice(&f, "10.00").await;
        let mut invoice = f.invoices.all().pop().unwrap();
        invoice.mark_expired().unwrap();
        f.invoices.put(invoice);

        f.handler.handle(signed("10.00", id, "P2")).await.unwrap();
        assert_eq!(f.invoices.all()[0].status, InvoiceStatus::Confirmed);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Rejections
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn wrong_signature_changes_nothing() {
        let f = fixture();
        let id = open_invoice(&f, "199.99").await;

        let err = f.handler.handle(signed("199.99", id, "wrong")).await.unwrap_err();

        assert_eq!(err, BillingError::InvalidSignature);
        assert_eq!(f.invoices.all()[0].status, InvoiceStatus::New);
        assert!(f.granter.calls().is_empty());
    }

    #[tokio::test]
    async fn unknown_invoice_is_not_found() {
        let f = fixture();
        let err = f
            .handler
            .handle(signed("1.00", InvoiceId::new(999), "P2"))
            .await
            .unwrap_err();
        assert_eq!(err, BillingError::InvoiceNotFound(InvoiceId::new(999)));
    }

    #[tokio::test]
    async fn amount_mismatch_is_rejected() {
        let f = fixture();
        let id = open_invoice(&f, "199.99").await;

        let err = f.handler.handle(signed("1.00", id, "P2")).await.unwrap_err();
        assert!(matches!(err, BillingError::AmountMismatch { .. }));
        assert_eq!(f.invoices.all()[0].status, InvoiceStatus::New);
    }

    #[tokio::test]
    async fn grant_failure_leaves_invoice_new() {
        let f = fixture();
        let id = open_invoice(&f, "10.00").await;
        f.granter.set_failing(true);

        let err = f.handler.handle(signed("10.00", id, "P2")).await.unwrap_err();
        assert!(matches!(err, BillingError::GrantFailed(_)));
        assert_eq!(f.invoices.all()[0].status, InvoiceStatus::New);

        // Gateway retry after recovery succeeds.
        f.granter.set_failing(false);
        f.handler.handle(signed("10.00", id, "P2")).await.unwrap();
        assert_eq!(f.invoices.all()[0].status, InvoiceStatus::Confirmed);
    }

    #[tokio::test]
    async fn failed_invoice_cannot_be_confirmed() {
        let f = fixture();
        let id = open_invoice(&f, "10.00").await;
        let mut invoice = f.invoices.all().pop().unwrap();
        invoice.mark_failed().unwrap();
        f.invoices.put(invoice);

        let err = f.handler.handle(signed("10.00", id, "P2")).await.unwrap_err();
        assert!(matches!(err, BillingError::InvalidState { .. }));
        assert!(f.granter.calls().is_empty());
    }
}
