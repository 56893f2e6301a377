//! Import/export creation under a per-warehouse lock.
//!
//! ```text
//! TransactionRequest
//!   ↓ validate (no lock)
//! lock(warehouse_id)
//!   ↓ warehouse lookup
//!   ↓ aggregate (used capacity | per-good inventory)
//!   ↓ guard (CapacityGuard | StockGuard)
//!   ↓ create_transaction
//! unlock (guard dropped on every exit path)
//! ```
//!
//! The aggregate read, the guard decision and the write all happen while the
//! warehouse lock is held, so two callers cannot both pass a guard on the same
//! stale aggregate. Different warehouses never contend.

use std::sync::Arc;

use chrono::Utc;

use granary_core::{TransactionId, WarehouseId};
use granary_inventory::{
    CapacityGuard, Direction, LineDetails, StockGuard, Transaction, TransactionDetails,
    TransactionRequest,
};

use crate::config::ServiceConfig;
use crate::error::{ServiceError, classify_store_error};
use crate::inventory_query::InventoryQuery;
use crate::keyed_lock::{KeyedLock, KeyedLockGuard};
use crate::store::{
    Pagination, ReferenceLookup, TransactionFilter, TransactionStore, WarehouseLookup,
};

pub struct TransactionService<S> {
    store: S,
    query: InventoryQuery<S>,
    locks: Arc<KeyedLock<WarehouseId>>,
    config: ServiceConfig,
}

impl<S> TransactionService<S>
where
    S: TransactionStore + WarehouseLookup + ReferenceLookup + Clone,
{
    pub fn new(store: S) -> Self {
        Self::with_config(store, ServiceConfig::default())
    }

    pub fn with_config(store: S, config: ServiceConfig) -> Self {
        Self::with_locks(store, Arc::new(KeyedLock::new()), config)
    }

    /// Share a lock table with other services writing to the same warehouses.
    pub fn with_locks(
        store: S,
        locks: Arc<KeyedLock<WarehouseId>>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            query: InventoryQuery::new(store.clone()),
            store,
            locks,
            config,
        }
    }
}

impl<S> TransactionService<S>
where
    S: TransactionStore + WarehouseLookup + ReferenceLookup,
{
    pub fn config(&self) -> ServiceConfig {
        self.config
    }

    pub fn inventory_query(&self) -> &InventoryQuery<S> {
        &self.query
    }

    /// Record goods entering a warehouse.
    ///
    /// Fails with `WarehouseFull` if the total quantity does not fit in the
    /// remaining capacity.
    #[tracing::instrument(
        name = "create_import",
        skip(self, request),
        fields(warehouse_id = %request.warehouse_id, lines = request.items.len())
    )]
    pub fn create_import(&self, request: TransactionRequest) -> Result<Transaction, ServiceError> {
        self.create(Direction::Import, request)
    }

    /// Record goods leaving a warehouse.
    ///
    /// Fails with `InsufficientStock` if any line exceeds what is on hand. No
    /// partial export is ever written.
    #[tracing::instrument(
        name = "create_export",
        skip(self, request),
        fields(warehouse_id = %request.warehouse_id, lines = request.items.len())
    )]
    pub fn create_export(&self, request: TransactionRequest) -> Result<Transaction, ServiceError> {
        self.create(Direction::Export, request)
    }

    fn create(
        &self,
        direction: Direction,
        request: TransactionRequest,
    ) -> Result<Transaction, ServiceError> {
        request.validate()?;
        let requested = request.total_quantity()?;
        let warehouse_id = request.warehouse_id;

        let _guard = self.acquire(warehouse_id)?;

        let warehouse = self
            .store
            .warehouse(warehouse_id)
            .map_err(|e| classify_store_error(e, &format!("warehouse {warehouse_id}")))?;

        let decision = match direction {
            Direction::Import => {
                let used = self.query.used_capacity(warehouse_id)?;
                CapacityGuard::new(warehouse.capacity, used).check(requested)
            }
            Direction::Export => {
                let inventory = self.query.inventory(warehouse_id)?;
                StockGuard::new(&inventory).check(&request.items)
            }
        };
        if let Err(rejection) = decision {
            tracing::info!(%direction, reason = %rejection, "transaction rejected");
            return Err(rejection.into());
        }

        let pending = request.into_pending(direction, Utc::now())?;
        let tx = self
            .store
            .create_transaction(pending)
            .map_err(|e| classify_store_error(e, &format!("{direction} transaction")))?;

        tracing::info!(
            transaction_id = %tx.id,
            %direction,
            quantity = requested,
            total_price = tx.total_price,
            "transaction committed"
        );
        Ok(tx)
    }

    fn acquire(&self, warehouse_id: WarehouseId) -> Result<KeyedLockGuard, ServiceError> {
        match self.config.lock_timeout {
            None => Ok(self.locks.lock(&warehouse_id)),
            Some(timeout) => self.locks.try_lock_for(&warehouse_id, timeout).ok_or_else(|| {
                tracing::warn!(?timeout, "warehouse lock not acquired in time");
                ServiceError::LockTimeout(warehouse_id)
            }),
        }
    }

    pub fn transaction(&self, id: TransactionId) -> Result<Transaction, ServiceError> {
        self.store
            .transaction(id)
            .map_err(|e| classify_store_error(e, &format!("transaction {id}")))
    }

    /// The transaction joined with its warehouse, customer, creator and goods.
    ///
    /// Associations that no longer resolve are left empty.
    pub fn transaction_details(
        &self,
        id: TransactionId,
    ) -> Result<TransactionDetails, ServiceError> {
        let tx = self.transaction(id)?;

        let lines = tx
            .items
            .iter()
            .map(|item| LineDetails {
                item: item.clone(),
                good: self.store.good(item.good_id).ok(),
            })
            .collect();

        Ok(TransactionDetails {
            id: tx.id,
            direction: tx.direction,
            created_at: tx.created_at,
            total_price: tx.total_price,
            warehouse: self.store.warehouse(tx.warehouse_id).ok(),
            customer: self.store.customer(tx.customer_id).ok(),
            created_by: self.store.user(tx.user_id).ok(),
            lines,
        })
    }

    /// Transactions of one warehouse, newest first.
    pub fn list_transactions(
        &self,
        warehouse_id: WarehouseId,
        filter: &TransactionFilter,
        pagination: Pagination,
    ) -> Result<Vec<Transaction>, ServiceError> {
        self.store
            .list_by_warehouse(warehouse_id, filter, pagination)
            .map_err(|e| classify_store_error(e, &format!("warehouse {warehouse_id}")))
    }

    pub fn count_transactions(
        &self,
        warehouse_id: WarehouseId,
        filter: &TransactionFilter,
    ) -> Result<u64, ServiceError> {
        self.store
            .count_by_warehouse(warehouse_id, filter)
            .map_err(|e| classify_store_error(e, &format!("warehouse {warehouse_id}")))
    }
}
