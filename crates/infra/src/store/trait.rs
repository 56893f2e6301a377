use std::sync::Arc;

use thiserror::Error;

use granary_core::{CustomerId, GoodId, TransactionId, UserId, WarehouseId};
use granary_inventory::{
    Customer, Good, InventorySnapshot, PendingTransaction, Transaction, User, Warehouse,
};

use super::query::{Pagination, TransactionFilter};

/// Store operation error.
///
/// These are **infrastructure errors**. The transaction service classifies
/// them into its own taxonomy so storage-specific detail never leaks out.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The requested record does not exist.
    #[error("record not found")]
    NotFound,

    /// A write referenced a record that does not exist (foreign-key violation).
    #[error("missing reference: {0}")]
    MissingReference(String),

    /// Anything else the backend reports.
    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Warehouse lookup by identifier.
pub trait WarehouseLookup: Send + Sync {
    fn warehouse(&self, id: WarehouseId) -> Result<Warehouse, StoreError>;
}

/// Append-only ledger of import/export transactions plus its aggregates.
///
/// Aggregates are derived from the stored line items on every call; nothing
/// here takes a lock on behalf of the caller.
pub trait TransactionStore: Send + Sync {
    /// Imports minus exports over every line item of the warehouse.
    ///
    /// `NotFound` when the warehouse does not exist.
    fn used_capacity(&self, warehouse_id: WarehouseId) -> Result<i64, StoreError>;

    /// Per-good on-hand quantities (positive balances only).
    ///
    /// `NotFound` when the warehouse does not exist.
    fn inventory(&self, warehouse_id: WarehouseId) -> Result<InventorySnapshot, StoreError>;

    /// Persist a transaction and its line items as one write.
    ///
    /// `MissingReference` when the warehouse, customer, user or any good is unknown.
    fn create_transaction(&self, pending: PendingTransaction) -> Result<Transaction, StoreError>;

    fn transaction(&self, id: TransactionId) -> Result<Transaction, StoreError>;

    /// Transactions of one warehouse, newest first.
    fn list_by_warehouse(
        &self,
        warehouse_id: WarehouseId,
        filter: &TransactionFilter,
        pagination: Pagination,
    ) -> Result<Vec<Transaction>, StoreError>;

    fn count_by_warehouse(
        &self,
        warehouse_id: WarehouseId,
        filter: &TransactionFilter,
    ) -> Result<u64, StoreError>;
}

/// Reference data used to enrich transactions for display.
pub trait ReferenceLookup: Send + Sync {
    fn customer(&self, id: CustomerId) -> Result<Customer, StoreError>;
    fn user(&self, id: UserId) -> Result<User, StoreError>;
    fn good(&self, id: GoodId) -> Result<Good, StoreError>;
}

impl<S> WarehouseLookup for Arc<S>
where
    S: WarehouseLookup + ?Sized,
{
    fn warehouse(&self, id: WarehouseId) -> Result<Warehouse, StoreError> {
        (**self).warehouse(id)
    }
}

impl<S> TransactionStore for Arc<S>
where
    S: TransactionStore + ?Sized,
{
    fn used_capacity(&self, warehouse_id: WarehouseId) -> Result<i64, StoreError> {
        (**self).used_capacity(warehouse_id)
    }

    fn inventory(&self, warehouse_id: WarehouseId) -> Result<InventorySnapshot, StoreError> {
        (**self).inventory(warehouse_id)
    }

    fn create_transaction(&self, pending: PendingTransaction) -> Result<Transaction, StoreError> {
        (**self).create_transaction(pending)
    }

    fn transaction(&self, id: TransactionId) -> Result<Transaction, StoreError> {
        (**self).transaction(id)
    }

    fn list_by_warehouse(
        &self,
        warehouse_id: WarehouseId,
        filter: &TransactionFilter,
        pagination: Pagination,
    ) -> Result<Vec<Transaction>, StoreError> {
        (**self).list_by_warehouse(warehouse_id, filter, pagination)
    }

    fn count_by_warehouse(
        &self,
        warehouse_id: WarehouseId,
        filter: &TransactionFilter,
    ) -> Result<u64, StoreError> {
        (**self).count_by_warehouse(warehouse_id, filter)
    }
}

impl<S> ReferenceLookup for Arc<S>
where
    S: ReferenceLookup + ?Sized,
{
    fn customer(&self, id: CustomerId) -> Result<Customer, StoreError> {
        (**self).customer(id)
    }

    fn user(&self, id: UserId) -> Result<User, StoreError> {
        (**self).user(id)
    }

    fn good(&self, id: GoodId) -> Result<Good, StoreError> {
        (**self).good(id)
    }
}
