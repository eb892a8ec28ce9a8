//! Billing handlers: payment links, payment callbacks, grant dispatch.

mod confirm_payment;
mod grant_dispatcher;
mod request_payment_link;

pub use confirm_payment::{ConfirmPaymentCommand, ConfirmPaymentHandler, ConfirmPaymentResult};
pub use grant_dispatcher::GrantDispatcher;
pub use request_payment_link::{
    PaymentLinkSettings, RequestPaymentLinkCommand, RequestPaymentLinkHandler,
    RequestPaymentLinkResult,
};

#[cfg(test)]
pub(crate) use grant_dispatcher::test_support;
