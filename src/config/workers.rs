//! Reconciliation worker schedule

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Interval of each periodic worker, in seconds
#[derive(Debug, Clone, Deserialize)]
pub struct WorkersConfig {
    /// Master switch; API-only replicas turn the workers off
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default = "default_comments")]
    pub comments_interval_secs: u64,

    #[serde(default = "default_likes")]
    pub likes_interval_secs: u64,

    #[serde(default = "default_goals")]
    pub goals_interval_secs: u64,

    #[serde(default = "default_expiry")]
    pub subscription_expiry_interval_secs: u64,

    #[serde(default = "default_income")]
    pub income_forwarding_interval_secs: u64,
}

impl WorkersConfig {
    pub fn comments_interval(&self) -> Duration {
        Duration::from_secs(self.comments_interval_secs)
    }

    pub fn likes_interval(&self) -> Duration {
        Duration::from_secs(self.likes_interval_secs)
    }

    pub fn goals_interval(&self) -> Duration {
        Duration::from_secs(self.goals_interval_secs)
    }

    pub fn subscription_expiry_interval(&self) -> Duration {
        Duration::from_secs(self.subscription_expiry_interval_secs)
    }

    pub fn income_forwarding_interval(&self) -> Duration {
        Duration::from_secs(self.income_forwarding_interval_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let intervals = [
            ("comments", self.comments_interval_secs),
            ("likes", self.likes_interval_secs),
            ("goals", self.goals_interval_secs),
            ("subscription_expiry", self.subscription_expiry_interval_secs),
            ("income_forwarding", self.income_forwarding_interval_secs),
        ];
        for (name, secs) in intervals {
            if secs == 0 {
                return Err(ValidationError::InvalidWorkerInterval(name));
            }
        }
        Ok(())
    }
}

impl Default for WorkersConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            comments_interval_secs: default_comments(),
            likes_interval_secs: default_likes(),
            goals_interval_secs: default_goals(),
            subscription_expiry_interval_secs: default_expiry(),
            income_forwarding_interval_secs: default_income(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_comments() -> u64 {
    300
}

fn default_likes() -> u64 {
    60
}

fn default_goals() -> u64 {
    300
}

fn default_expiry() -> u64 {
    600
}

fn default_income() -> u64 {
    900
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = WorkersConfig::default();
        assert!(config.enabled);
        assert!(config.validate().is_ok());
        assert_eq!(config.likes_interval(), Duration::from_secs(60));
    }

    #[test]
    fn zero_interval_names_the_worker() {
        let config = WorkersConfig {
            goals_interval_secs: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidWorkerInterval("goals"))
        );
    }
}
