//! Donations to a blog.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::foundation::{Amount, BlogId, DonationId, Timestamp, UserId, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DonationStatus {
    /// Created when the donor asked for a payment link.
    Pending,
    Confirmed,
}

impl DonationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DonationStatus::Pending => "pending",
            DonationStatus::Confirmed => "confirmed",
        }
    }
}

impl FromStr for DonationStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(DonationStatus::Pending),
            "confirmed" => Ok(DonationStatus::Confirmed),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown donation status '{}'", other),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Donation {
    pub id: DonationId,
    pub blog_id: BlogId,
    pub donor_id: UserId,
    pub amount: Amount,
    pub message: Option<String>,
    pub status: DonationStatus,
    pub created_at: Timestamp,
}

impl Donation {
    /// Flips a pending donation to confirmed. Returns `false` if it already was.
    pub fn confirm(&mut self) -> bool {
        match self.status {
            DonationStatus::Pending => {
                self.status = DonationStatus::Confirmed;
                true
            }
            DonationStatus::Confirmed => false,
        }
    }
}
