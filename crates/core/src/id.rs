//! Strongly-typed identifiers used across the warehouse domain.

use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Declares a `Copy` identifier backed by a UUIDv7.
///
/// The type's own name is used in parse errors, so a bad `GoodId` in a request
/// reports as `GoodId: ...` rather than a bare UUID error.
macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Mint a fresh identifier. Later identifiers sort after earlier ones.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

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
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl FromStr for $name {
            type Err = DomainError;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(raw.trim()).map(Self).map_err(|e| {
                    DomainError::invalid_id(format!("{}: {}", stringify!($name), e))
                })
            }
        }
    };
}

uuid_id! {
    /// Identifier of a warehouse. Also the key of the per-warehouse lock.
    WarehouseId
}

uuid_id! {
    /// Identifier of a good (rice lot type) in the catalog.
    GoodId
}

uuid_id! {
    /// Identifier of a customer (counterparty of a transaction).
    CustomerId
}

uuid_id! {
    /// Identifier of a user (staff member recording a transaction).
    UserId
}

uuid_id! {
    /// Identifier of a persisted import/export transaction.
    TransactionId
}
