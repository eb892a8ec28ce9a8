//! Per-post read policy.

use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

use crate::domain::foundation::ValidationError;

/// How read access to a post is granted.
///
/// Stored as the small integer codes `1..=4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i16", into = "i16")]
pub enum AccessMode {
    /// Anyone may read.
    Public,
    /// Followers of the blog may read.
    FollowGated,
    /// Holders of the required tier, or any tier above it, may read.
    SubscriptionGated,
    /// Buyers of this single post may read.
    PayPerItem,
}

impl AccessMode {
    /// Numeric code used in storage and on the wire.
    pub fn code(&self) -> i16 {
        match self {
            AccessMode::Public => 1,
            AccessMode::FollowGated => 2,
            AccessMode::SubscriptionGated => 3,
            AccessMode::PayPerItem => 4,
        }
    }
}

impl TryFrom<i16> for AccessMode {
    type Error = ValidationError;

    fn try_from(code: i16) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(AccessMode::Public),
            2 => Ok(AccessMode::FollowGated),
            3 => Ok(AccessMode::SubscriptionGated),
            4 => Ok(AccessMode::PayPerItem),
            other => Err(ValidationError::out_of_range("access_mode", 1, 4, other)),
        }
    }
}

impl From<AccessMode> for i16 {
    fn from(mode: AccessMode) -> i16 {
        mode.code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for mode in [
            AccessMode::Public,
            AccessMode::FollowGated,
            AccessMode::SubscriptionGated,
            AccessMode::PayPerItem,
        ] {
            assert_eq!(AccessMode::try_from(mode.code()).unwrap(), mode);
        }
    }

    #[test]
    fn rejects_unknown_code() {
        assert!(AccessMode::try_from(0).is_err());
        assert!(AccessMode::try_from(5).is_err());
    }

    #[test]
    fn serializes_as_number() {
        assert_eq!(serde_json::to_string(&AccessMode::PayPerItem).unwrap(), "4");
        let mode: AccessMode = serde_json::from_str("3").unwrap();
        assert_eq!(mode, AccessMode::SubscriptionGated);
    }
}
