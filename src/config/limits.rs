//! Initial values of the hot-reloadable price limits

use rust_decimal::Decimal;
use serde::Deserialize;

use super::error::ValidationError;

/// Starting point for the runtime settings snapshot
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_min_price")]
    pub min_price: Decimal,

    #[serde(default = "default_max_price")]
    pub max_price: Decimal,

    #[serde(default = "default_min_donation")]
    pub min_donation: Decimal,
}

impl LimitsConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.min_price.is_sign_negative()
            || self.min_donation.is_sign_negative()
            || self.min_price > self.max_price
        {
            return Err(ValidationError::InvalidPriceLimits);
        }
        Ok(())
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            min_price: default_min_price(),
            max_price: default_max_price(),
            min_donation: default_min_donation(),
        }
    }
}

fn default_min_price() -> Decimal {
    Decimal::from(10)
}

fn default_max_price() -> Decimal {
    Decimal::from(1_000_000)
}

fn default_min_donation() -> Decimal {
    Decimal::from(10)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_consistent() {
        assert!(LimitsConfig::default().validate().is_ok());
    }

    #[test]
    fn min_above_max_is_rejected() {
        let config = LimitsConfig {
            min_price: Decimal::from(500),
            max_price: Decimal::from(100),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidPriceLimits));
    }
}
