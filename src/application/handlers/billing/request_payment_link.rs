//! RequestPaymentLinkHandler - Hands out a payment link for an item.
//!
//! Reuses the open invoice of the `(user, item)` pair while it is valid,
//! otherwise persists a fresh invoice (so the gateway receives a stable id)
//! and has the gateway mint the provider-side invoice.

use std::sync::Arc;

use uuid::Uuid;

use crate::application::KeyedLock;
use crate::config::SettingsStore;
use crate::domain::billing::{BillingError, Invoice, InvoiceStatus, ItemType, NewInvoice, PaymentLinkDecision};
use crate::domain::foundation::{Amount, InvoiceId, Timestamp, UserId};
use crate::ports::{GatewayInvoiceRequest, InvoiceRepository, PaymentGateway};

/// Command to request a payment link.
#[derive(Debug, Clone)]
pub struct RequestPaymentLinkCommand {
    pub item_id: Uuid,
    pub item_type: ItemType,
    pub user_id: UserId,
    pub sum: Amount,
    pub description: String,
}

/// The link to send the buyer to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPaymentLinkResult {
    pub invoice_id: InvoiceId,
    pub url: String,
    /// True when an existing open invoice was handed out again.
    pub reused: bool,
}

/// Gateway link settings.
#[derive(Debug, Clone)]
pub struct PaymentLinkSettings {
    pub payment_link_prefix: String,
    pub invoice_ttl_secs: i64,
}

pub struct RequestPaymentLinkHandler {
    invoices: Arc<dyn InvoiceRepository>,
    gateway: Arc<dyn PaymentGateway>,
    settings: Arc<SettingsStore>,
    link_settings: PaymentLinkSettings,
    locks: KeyedLock<(UserId, Uuid)>,
}

impl RequestPaymentLinkHandler {
    pub fn new(
        invoices: Arc<dyn InvoiceRepository>,
        gateway: Arc<dyn PaymentGateway>,
        settings: Arc<SettingsStore>,
        link_settings: PaymentLinkSettings,
    ) -> Self {
        Self {
            invoices,
            gateway,
            settings,
            link_settings,
            locks: KeyedLock::new(),
        }
    }

    pub async fn handle(
        &self,
        cmd: RequestPaymentLinkCommand,
    ) -> Result<RequestPaymentLinkResult, BillingError> {
        if cmd.description.trim().is_empty() {
            return Err(BillingError::validation("description", "must not be empty"));
        }
        self.settings.snapshot().check_sum(cmd.item_type, cmd.sum)?;

        let _guard = self.locks.lock((cmd.user_id, cmd.item_id)).await;

        let now = Timestamp::now();
        let latest = self.invoices.find_latest_for(cmd.user_id, cmd.item_id).await?;

        match PaymentLinkDecision::decide(latest.as_ref(), now) {
            PaymentLinkDecision::Reuse { link } => {
                let invoice_id = latest
                    .map(|i| i.id)
                    .ok_or_else(|| BillingError::infrastructure("reused invoice vanished"))?;
                tracing::debug!(%invoice_id, user_id = %cmd.user_id, "Reusing open invoice");
                return Ok(RequestPaymentLinkResult {
                    invoice_id,
                    url: link,
                    reused: true,
                });
            }
            PaymentLinkDecision::Supersede => {
                if let Some(mut stale) = latest {
                    stale.mark_expired()?;
                    self.invoices.update(&stale).await?;
                    tracing::info!(invoice_id = %stale.id, "Superseded stale invoice");
                }
            }
            PaymentLinkDecision::Create => {}
        }

        let draft = NewInvoice::draft(
            cmd.sum,
            cmd.item_id,
            cmd.item_type,
            cmd.user_id,
            cmd.description,
            now,
            self.link_settings.invoice_ttl_secs,
        );

        let invoice = match self.invoices.create(&draft).await {
            Ok(invoice) => invoice,
            Err(e) if e.is_conflict() => return self.reuse_winner(&draft, now).await,
            Err(e) => return Err(e.into()),
        };

        self.mint_link(invoice).await
    }

    /// Another request inserted the open invoice first; hand out its link.
    async fn reuse_winner(
        &self,
        draft: &NewInvoice,
        now: Timestamp,
    ) -> Result<RequestPaymentLinkResult, BillingError> {
        let winner = self
            .invoices
            .find_latest_for(draft.user_id, draft.item_id)
            .await?;
        match winner {
            Some(Invoice {
                id,
                status: InvoiceStatus::New,
                payment_link: Some(link),
                expires_at,
                ..
            }) if now.is_before(&expires_at) => Ok(RequestPaymentLinkResult {
                invoice_id: id,
                url: link,
                reused: true,
            }),
            _ => Err(BillingError::invalid_state(
                InvoiceStatus::New.as_str(),
                "open a second invoice for",
            )),
        }
    }

    async fn mint_link(&self, mut invoice: Invoice) -> Result<RequestPaymentLinkResult, BillingError> {
        let request = GatewayInvoiceRequest {
            inv_id: invoice.id,
            out_sum: invoice.out_sum,
            description: invoice.description.clone(),
        };

        match self.gateway.create_invoice(&request).await {
            Ok(created) => {
                let url = format!("{}{}", self.link_settings.payment_link_prefix, created.provider_id);
                invoice.attach_payment_link(url.clone())?;
                self.invoices.update(&invoice).await?;
                tracing::info!(
                    invoice_id = %invoice.id,
                    user_id = %invoice.user_id,
                    item_type = %invoice.item_type,
                    out_sum = %invoice.out_sum,
                    "Invoice created"
                );
                Ok(RequestPaymentLinkResult {
                    invoice_id: invoice.id,
                    url,
                    reused: false,
                })
            }
            Err(e) => {
                tracing::warn!(invoice_id = %invoice.id, error = %e, "Gateway refused invoice");
                invoice.mark_failed()?;
                self.invoices.update(&invoice).await?;
                Err(BillingError::Gateway(e.to_string()))
            }
        }
    }
}
