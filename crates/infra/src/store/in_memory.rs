use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use granary_core::{CustomerId, Entity, GoodId, TransactionId, UserId, WarehouseId};
use granary_inventory::{
    Customer, Good, InventorySnapshot, PendingTransaction, Transaction, User, Warehouse,
    used_capacity,
};

use super::query::{Pagination, TransactionFilter};
use super::r#trait::{ReferenceLookup, StoreError, TransactionStore, WarehouseLookup};

fn poisoned() -> StoreError {
    StoreError::Backend("lock poisoned".to_string())
}

/// Insert or replace a registry record under its own identifier.
fn upsert<E>(table: &RwLock<HashMap<E::Id, E>>, entity: E) -> Result<(), StoreError>
where
    E: Entity,
{
    let id = entity.id().clone();
    table.write().map_err(|_| poisoned())?.insert(id, entity);
    Ok(())
}

/// In-memory warehouse registry and transaction ledger.
///
/// Intended for tests/dev. Aggregates scan the whole ledger on every call, the
/// way a SQL `SUM` over the line-item tables would.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    warehouses: RwLock<HashMap<WarehouseId, Warehouse>>,
    goods: RwLock<HashMap<GoodId, Good>>,
    customers: RwLock<HashMap<CustomerId, Customer>>,
    users: RwLock<HashMap<UserId, User>>,
    ledger: RwLock<Vec<Transaction>>,
    write_delay: Option<Duration>,
    fail_next_write: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep this long inside every `create_transaction`, before the write lands.
    ///
    /// Simulates a slow round trip to a real database.
    pub fn with_write_delay(mut self, delay: Duration) -> Self {
        self.write_delay = Some(delay);
        self
    }

    /// Make the next `create_transaction` fail with a backend error.
    pub fn fail_next_write(&self) {
        self.fail_next_write.store(true, Ordering::SeqCst);
    }

    pub fn insert_warehouse(&self, warehouse: Warehouse) -> Result<(), StoreError> {
        upsert(&self.warehouses, warehouse)
    }

    pub fn insert_good(&self, good: Good) -> Result<(), StoreError> {
        upsert(&self.goods, good)
    }

    pub fn insert_customer(&self, customer: Customer) -> Result<(), StoreError> {
        upsert(&self.customers, customer)
    }

    pub fn insert_user(&self, user: User) -> Result<(), StoreError> {
        upsert(&self.users, user)
    }

    /// Every transaction of one warehouse, in commit order.
    fn warehouse_ledger(&self, warehouse_id: WarehouseId) -> Result<Vec<Transaction>, StoreError> {
        if !self.warehouse_exists(warehouse_id)? {
            return Err(StoreError::NotFound);
        }

        let ledger = self.ledger.read().map_err(|_| poisoned())?;
        Ok(ledger
            .iter()
            .filter(|tx| tx.warehouse_id == warehouse_id)
            .cloned()
            .collect())
    }

    fn warehouse_exists(&self, id: WarehouseId) -> Result<bool, StoreError> {
        Ok(self.warehouses.read().map_err(|_| poisoned())?.contains_key(&id))
    }

    fn check_references(&self, pending: &PendingTransaction) -> Result<(), StoreError> {
        if !self.warehouse_exists(pending.warehouse_id)? {
            return Err(StoreError::MissingReference(format!(
                "warehouse {}",
                pending.warehouse_id
            )));
        }
        if !self
            .customers
            .read()
            .map_err(|_| poisoned())?
            .contains_key(&pending.customer_id)
        {
            return Err(StoreError::MissingReference(format!(
                "customer {}",
                pending.customer_id
            )));
        }
        if !self
            .users
            .read()
            .map_err(|_| poisoned())?
            .contains_key(&pending.user_id)
        {
            return Err(StoreError::MissingReference(format!("user {}", pending.user_id)));
        }

        let goods = self.goods.read().map_err(|_| poisoned())?;
        if let Some(missing) = pending.items.iter().find(|i| !goods.contains_key(&i.good_id)) {
            return Err(StoreError::MissingReference(format!("good {}", missing.good_id)));
        }

        Ok(())
    }
}

impl WarehouseLookup for InMemoryStore {
    fn warehouse(&self, id: WarehouseId) -> Result<Warehouse, StoreError> {
        self.warehouses
            .read()
            .map_err(|_| poisoned())?
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }
}

impl TransactionStore for InMemoryStore {
    fn used_capacity(&self, warehouse_id: WarehouseId) -> Result<i64, StoreError> {
        let ledger = self.warehouse_ledger(warehouse_id)?;
        Ok(used_capacity(&ledger))
    }

    fn inventory(&self, warehouse_id: WarehouseId) -> Result<InventorySnapshot, StoreError> {
        let ledger = self.warehouse_ledger(warehouse_id)?;
        Ok(InventorySnapshot::from_ledger(&ledger))
    }

    fn create_transaction(&self, pending: PendingTransaction) -> Result<Transaction, StoreError> {
        if let Some(delay) = self.write_delay {
            std::thread::sleep(delay);
        }

        if self.fail_next_write.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Backend("injected write failure".to_string()));
        }

        self.check_references(&pending)?;

        let tx = Transaction::from_pending(TransactionId::new(), pending);
        self.ledger.write().map_err(|_| poisoned())?.push(tx.clone());
        Ok(tx)
    }

    fn transaction(&self, id: TransactionId) -> Result<Transaction, StoreError> {
        self.ledger
            .read()
            .map_err(|_| poisoned())?
            .iter()
            .find(|tx| tx.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    fn list_by_warehouse(
        &self,
        warehouse_id: WarehouseId,
        filter: &TransactionFilter,
        pagination: Pagination,
    ) -> Result<Vec<Transaction>, StoreError> {
        let mut matching: Vec<Transaction> = self
            .warehouse_ledger(warehouse_id)?
            .into_iter()
            .filter(|tx| filter.matches(tx))
            .collect();

        // Newest first; ids are time-ordered, so they break timestamp ties.
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(pagination.apply(matching).collect())
    }

    fn count_by_warehouse(
        &self,
        warehouse_id: WarehouseId,
        filter: &TransactionFilter,
    ) -> Result<u64, StoreError> {
        let count = self
            .warehouse_ledger(warehouse_id)?
            .iter()
            .filter(|tx| filter.matches(tx))
            .count();
        Ok(count as u64)
    }
}

impl ReferenceLookup for InMemoryStore {
    fn customer(&self, id: CustomerId) -> Result<Customer, StoreError> {
        self.customers
            .read()
            .map_err(|_| poisoned())?
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    fn user(&self, id: UserId) -> Result<User, StoreError> {
        self.users
            .read()
            .map_err(|_| poisoned())?
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    fn good(&self, id: GoodId) -> Result<Good, StoreError> {
        self.goods
            .read()
            .map_err(|_| poisoned())?
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }
}
