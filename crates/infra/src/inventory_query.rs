//! Read-only inventory aggregation for one warehouse.
//!
//! Nothing here locks. Callers that act on a result (the transaction service)
//! must hold the warehouse lock across read, decision and write themselves.

use serde::Serialize;

use granary_core::{GoodId, WarehouseId};
use granary_inventory::{InventorySnapshot, Warehouse};

use crate::error::{ServiceError, classify_store_error};
use crate::store::{ReferenceLookup, StoreError, TransactionStore, WarehouseLookup};

/// One stocked good in a warehouse overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockLine {
    pub good_id: GoodId,
    /// Display name; `None` if the good no longer resolves in the catalog.
    pub name: Option<String>,
    pub quantity: i64,
}

/// A warehouse together with what it currently holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WarehouseOverview {
    pub warehouse: Warehouse,
    pub used_capacity: i64,
    pub items: Vec<StockLine>,
}

impl WarehouseOverview {
    pub fn remaining_capacity(&self) -> i64 {
        self.warehouse.capacity.saturating_sub(self.used_capacity)
    }
}

#[derive(Debug, Clone)]
pub struct InventoryQuery<S> {
    store: S,
}

impl<S> InventoryQuery<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S> InventoryQuery<S>
where
    S: TransactionStore,
{
    /// Imports minus exports across all goods. Not clamped at zero.
    pub fn used_capacity(&self, warehouse_id: WarehouseId) -> Result<i64, ServiceError> {
        self.store
            .used_capacity(warehouse_id)
            .map_err(|e| classify_store_error(e, &format!("warehouse {warehouse_id}")))
    }

    /// Per-good on-hand quantities, positive balances only.
    pub fn inventory(&self, warehouse_id: WarehouseId) -> Result<InventorySnapshot, ServiceError> {
        self.store
            .inventory(warehouse_id)
            .map_err(|e| classify_store_error(e, &format!("warehouse {warehouse_id}")))
    }
}

impl<S> InventoryQuery<S>
where
    S: TransactionStore + WarehouseLookup + ReferenceLookup,
{
    /// The warehouse, its used capacity and its stock joined with good names.
    pub fn warehouse_overview(
        &self,
        warehouse_id: WarehouseId,
    ) -> Result<WarehouseOverview, ServiceError> {
        let subject = format!("warehouse {warehouse_id}");
        let warehouse = self
            .store
            .warehouse(warehouse_id)
            .map_err(|e| classify_store_error(e, &subject))?;
        let used_capacity = self.used_capacity(warehouse_id)?;
        let snapshot = self.inventory(warehouse_id)?;

        let items = snapshot
            .iter()
            .map(|(good_id, quantity)| {
                let name = match self.store.good(*good_id) {
                    Ok(good) => Some(good.name),
                    Err(StoreError::NotFound) => None,
                    Err(e) => return Err(classify_store_error(e, &format!("good {good_id}"))),
                };
                Ok(StockLine {
                    good_id: *good_id,
                    name,
                    quantity: *quantity,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(WarehouseOverview {
            warehouse,
            used_capacity,
            items,
        })
    }
}
