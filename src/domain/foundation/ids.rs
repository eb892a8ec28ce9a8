//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

/// Declares a UUID-backed identifier newtype.
macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates the identifier from an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

uuid_id!(
    /// Platform user (buyer, viewer, or content owner).
    UserId
);
uuid_id!(
    /// Blog owned by a single user.
    BlogId
);
uuid_id!(
    /// Post inside a blog.
    PostId
);
uuid_id!(
    /// Subscription tier offered by a blog.
    SubscriptionId
);
uuid_id!(
    /// Binding between a viewer and a subscription tier.
    UserSubscriptionId
);
uuid_id!(
    /// Donation made to a blog.
    DonationId
);
uuid_id!(
    /// Revenue record credited to a blog owner.
    IncomeId
);
uuid_id!(
    /// Fundraising or audience goal of a blog.
    GoalId
);
uuid_id!(
    /// Fixed set of income rows forwarded as one wallet credit.
    WalletBatchId
);

impl UserId {
    /// Parses a user id from an upstream header value.
    ///
    /// The nil UUID is how the gateway represents anonymous callers and is rejected.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let uuid = Uuid::parse_str(value.trim())
            .map_err(|e| ValidationError::invalid_format("user_id", e.to_string()))?;
        if uuid.is_nil() {
            return Err(ValidationError::empty_field("user_id"));
        }
        Ok(Self(uuid))
    }
}

/// Numeric invoice identifier.
///
/// The payment gateway only accepts integer invoice ids, so invoices use a
/// database sequence rather than UUIDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceId(i64);

impl InvoiceId {
    /// Wraps a raw invoice number.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw invoice number.
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for InvoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for InvoiceId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|e| ValidationError::invalid_format("inv_id", e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ids_are_unique() {
        assert_ne!(PostId::new(), PostId::new());
    }

    #[test]
    fn id_round_trips_through_string() {
        let id = BlogId::new();
        let parsed: BlogId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn id_serializes_as_plain_uuid() {
        let uuid = Uuid::new_v4();
        let id = SubscriptionId::from_uuid(uuid);
        assert_eq!(serde_json::to_string(&id).unwrap(), format!("\"{}\"", uuid));
    }

    #[test]
    fn user_id_parse_rejects_nil() {
        let result = UserId::parse("00000000-0000-0000-0000-000000000000");
        assert!(matches!(result, Err(ValidationError::EmptyField { .. })));
    }

    #[test]
    fn user_id_parse_rejects_garbage() {
        assert!(UserId::parse("not-a-uuid").is_err());
    }

    #[test]
    fn user_id_parse_accepts_uuid_with_whitespace() {
        let uuid = Uuid::new_v4();
        let parsed = UserId::parse(&format!(" {} ", uuid)).unwrap();
        assert_eq!(parsed.as_uuid(), &uuid);
    }

    #[test]
    fn invoice_id_parses_integer() {
        assert_eq!("42".parse::<InvoiceId>().unwrap(), InvoiceId::new(42));
        assert!("4x2".parse::<InvoiceId>().is_err());
    }
}
