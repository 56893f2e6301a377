//! Errors surfaced by the transaction service.

use thiserror::Error;

use granary_core::{DomainError, GoodId, WarehouseId};

use crate::store::StoreError;

/// Outcome taxonomy of the inventory services.
///
/// `WarehouseFull` and `InsufficientStock` are expected rejections: the caller
/// may resubmit with different quantities. `Internal` is deliberately opaque;
/// its cause is logged where it is classified.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// A referenced warehouse, customer, user, good or transaction does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    #[error("warehouse is full (capacity: {capacity}, used: {used}, requested: {requested})")]
    WarehouseFull {
        capacity: i64,
        used: i64,
        requested: i64,
    },

    #[error("insufficient stock for good {good_id} (on hand: {on_hand}, requested: {requested})")]
    InsufficientStock {
        good_id: GoodId,
        on_hand: i64,
        requested: i64,
    },

    /// The request is malformed (empty, non-positive quantity, duplicate good).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A lock timeout is configured and the warehouse stayed busy past it.
    #[error("timed out waiting for warehouse {0}")]
    LockTimeout(WarehouseId),

    #[error("internal error")]
    Internal,
}

impl ServiceError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Whether a capacity or stock rule rejected the transaction.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::WarehouseFull { .. } | Self::InsufficientStock { .. }
        )
    }
}

/// Classify a store failure while working on `subject`.
///
/// Backend failures are logged here and collapse into the opaque `Internal`.
pub(crate) fn classify_store_error(err: StoreError, subject: &str) -> ServiceError {
    match err {
        StoreError::NotFound => ServiceError::not_found(subject),
        StoreError::MissingReference(what) => ServiceError::NotFound(what),
        StoreError::Backend(cause) => {
            tracing::error!(%cause, subject, "store failure");
            ServiceError::Internal
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::WarehouseFull {
                capacity,
                used,
                requested,
            } => ServiceError::WarehouseFull {
                capacity,
                used,
                requested,
            },
            DomainError::InsufficientStock {
                good_id,
                on_hand,
                requested,
            } => ServiceError::InsufficientStock {
                good_id,
                on_hand,
                requested,
            },
            DomainError::Validation(msg)
            | DomainError::InvalidId(msg)
            | DomainError::InvalidLocation(msg) => ServiceError::Validation(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_errors_stay_rejections() {
        let err: ServiceError = DomainError::WarehouseFull {
            capacity: 10,
            used: 8,
            requested: 3,
        }
        .into();
        assert!(err.is_rejection());
        assert_eq!(
            err.to_string(),
            "warehouse is full (capacity: 10, used: 8, requested: 3)"
        );
    }

    #[test]
    fn validation_maps_to_validation() {
        let err: ServiceError = DomainError::validation("empty").into();
        assert_eq!(err, ServiceError::Validation("empty".to_string()));
        assert!(!err.is_rejection());
    }

    #[test]
    fn store_errors_are_classified() {
        assert_eq!(
            classify_store_error(StoreError::NotFound, "warehouse"),
            ServiceError::NotFound("warehouse".to_string())
        );
        assert_eq!(
            classify_store_error(StoreError::MissingReference("good 1".to_string()), "transaction"),
            ServiceError::NotFound("good 1".to_string())
        );
        assert_eq!(
            classify_store_error(StoreError::Backend("disk on fire".to_string()), "transaction"),
            ServiceError::Internal
        );
    }

    #[test]
    fn internal_is_opaque() {
        assert_eq!(ServiceError::Internal.to_string(), "internal error");
    }
}
