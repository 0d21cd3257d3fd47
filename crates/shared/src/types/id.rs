//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `SaleId` where a `DepositId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

typed_id!(TenantId, "Unique identifier for a tenant cooperative.");
typed_id!(UserId, "Unique identifier for an acting user.");
typed_id!(
    AccountId,
    "Unique identifier for a chart of accounts entry."
);
typed_id!(JournalEntryId, "Unique identifier for a journal entry header.");
typed_id!(JournalLineId, "Unique identifier for a journal line.");
typed_id!(MemberId, "Unique identifier for a cooperative member.");
typed_id!(ProductId, "Unique identifier for a stocked product.");
typed_id!(SaleId, "Unique identifier for a point-of-sale sale.");
typed_id!(DepositId, "Unique identifier for a member capital deposit.");

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_typed_id_from_uuid() {
        let uuid = Uuid::new_v4();
        let id = TenantId::from_uuid(uuid);
        assert_eq!(id.into_inner(), uuid);
        assert_eq!(id.to_string(), uuid.to_string());
    }

    #[test]
    fn test_typed_ids_are_v7() {
        let first = JournalEntryId::new();
        let second = JournalEntryId::default();
        assert_ne!(first, second);
        assert_eq!(first.into_inner().get_version_num(), 7);
    }

    #[test]
    fn test_typed_id_from_str() {
        let uuid = Uuid::new_v4();
        let id = SaleId::from_str(&uuid.to_string()).unwrap();
        assert_eq!(id.into_inner(), uuid);
        assert!(DepositId::from_str("invalid").is_err());
    }

    #[test]
    fn test_typed_id_serde_is_transparent() {
        let id = AccountId::from_uuid(Uuid::nil());
        assert_eq!(
            serde_json::to_string(&id).unwrap(),
            "\"00000000-0000-0000-0000-000000000000\""
        );
    }
}
