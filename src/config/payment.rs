//! Payment gateway configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::billing::MerchantCredentials;

/// Gateway merchant account and invoice settings
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    pub merchant_login: String,

    /// Signs invoice creation requests
    pub password1: SecretString,

    /// Verifies payment result callbacks
    pub password2: SecretString,

    /// Test-mode counterparts; fall back to the production secrets when unset
    pub test_password1: Option<SecretString>,
    pub test_password2: Option<SecretString>,

    /// Initial test-mode flag; the live value comes from runtime settings
    #[serde(default)]
    pub is_test: bool,

    /// Prefix the provider invoice id is appended to
    #[serde(default = "default_payment_link_prefix")]
    pub payment_link_prefix: String,

    /// Invoice API base URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// How long a payment link stays reusable
    #[serde(default = "default_invoice_ttl")]
    pub invoice_ttl_secs: i64,
}

impl PaymentConfig {
    pub fn credentials(&self) -> MerchantCredentials {
        let test1 = self.test_password1.as_ref().unwrap_or(&self.password1);
        let test2 = self.test_password2.as_ref().unwrap_or(&self.password2);
        MerchantCredentials::new(
            self.merchant_login.clone(),
            self.password1.clone(),
            self.password2.clone(),
            test1.clone(),
            test2.clone(),
        )
    }

    /// Validate payment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.merchant_login.trim().is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__MERCHANT_LOGIN"));
        }
        if self.password1.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__PASSWORD1"));
        }
        if self.password2.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__PASSWORD2"));
        }
        if !is_http_url(&self.payment_link_prefix) {
            return Err(ValidationError::InvalidPaymentLinkPrefix);
        }
        if !is_http_url(&self.api_base_url) {
            return Err(ValidationError::InvalidServiceUrl("payment gateway"));
        }
        if !(60..=7 * 24 * 3600).contains(&self.invoice_ttl_secs) {
            return Err(ValidationError::InvalidInvoiceTtl);
        }
        Ok(())
    }
}

pub(crate) fn is_http_url(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://")
}

fn default_payment_link_prefix() -> String {
    "https://auth.robokassa.ru/merchant/Invoice/".to_string()
}

fn default_api_base_url() -> String {
    "https://services.robokassa.ru/InvoiceServiceWebApi/api".to_string()
}

fn default_invoice_ttl() -> i64 {
    3600
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PaymentConfig {
        PaymentConfig {
            merchant_login: "shop".to_string(),
            password1: SecretString::new("p1".into()),
            password2: SecretString::new("p2".into()),
            test_password1: None,
            test_password2: Some(SecretString::new("t2".into())),
            is_test: false,
            payment_link_prefix: default_payment_link_prefix(),
            api_base_url: default_api_base_url(),
            invoice_ttl_secs: default_invoice_ttl(),
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn missing_test_secret_falls_back_to_production() {
        let creds = config().credentials();
        assert_eq!(creds.password1(true), "p1");
        assert_eq!(creds.password2(true), "t2");
    }

    #[test]
    fn rejects_relative_link_prefix() {
        let cfg = PaymentConfig {
            payment_link_prefix: "/merchant/Invoice/".to_string(),
            ..config()
        };
        assert_eq!(cfg.validate(), Err(ValidationError::InvalidPaymentLinkPrefix));
    }

    #[test]
    fn rejects_tiny_ttl() {
        let cfg = PaymentConfig {
            invoice_ttl_secs: 5,
            ..config()
        };
        assert_eq!(cfg.validate(), Err(ValidationError::InvalidInvoiceTtl));
    }

    #[test]
    fn requires_login() {
        let cfg = PaymentConfig {
            merchant_login: " ".to_string(),
            ..config()
        };
        assert!(cfg.validate().is_err());
    }
}
