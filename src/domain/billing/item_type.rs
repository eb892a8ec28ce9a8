//! Kind of item an invoice pays for.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// What a confirmed invoice entitles the buyer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    /// A paid subscription tier of a blog.
    Subscription,
    /// Pay-per-item access to a single post.
    Post,
    /// A donation to a blog.
    Donation,
}

impl ItemType {
    /// Storage and wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Subscription => "subscription",
            ItemType::Post => "post",
            ItemType::Donation => "donation",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ItemType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "subscription" => Ok(ItemType::Subscription),
            "post" => Ok(ItemType::Post),
            "donation" => Ok(ItemType::Donation),
            other => Err(ValidationError::invalid_format(
                "item_type",
                format!("unknown item type '{}'", other),
            )),
        }
    }
}
