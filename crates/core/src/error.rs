//! Domain error model.

use thiserror::Error;

use crate::id::GoodId;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// capacity and stock rules). Storage and locking concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A warehouse location is not a valid `"latitude,longitude"` pair.
    #[error("location is not valid: {0}")]
    InvalidLocation(String),

    /// An import would push the warehouse past its declared capacity.
    #[error("warehouse is full (capacity: {capacity}, used: {used}, requested: {requested})")]
    WarehouseFull {
        capacity: i64,
        used: i64,
        requested: i64,
    },

    /// An export asks for more of a good than the warehouse holds.
    #[error("insufficient stock for good {good_id} (on hand: {on_hand}, requested: {requested})")]
    InsufficientStock {
        good_id: GoodId,
        on_hand: i64,
        requested: i64,
    },
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn invalid_location(msg: impl Into<String>) -> Self {
        Self::InvalidLocation(msg.into())
    }

    /// Whether this error is a guard rejection (an expected business outcome).
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::WarehouseFull { .. } | Self::InsufficientStock { .. }
        )
    }
}
