//! Integration tests for the locked create pipeline.
//!
//! Tests: TransactionRequest → KeyedLock → InventoryQuery → Guard → Store
//!
//! Verifies:
//! - Concurrent writers to one warehouse cannot overshoot capacity or stock
//! - Different warehouses do not wait on each other
//! - The lock is released on every exit path

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Barrier};
    use std::thread;
    use std::time::{Duration, Instant};

    use granary_core::{CustomerId, GoodId, UserId, WarehouseId};
    use granary_inventory::{
        Customer, Good, LineItem, Role, Transaction, TransactionRequest, User, Warehouse,
    };

    use crate::config::ServiceConfig;
    use crate::error::ServiceError;
    use crate::keyed_lock::KeyedLock;
    use crate::store::{InMemoryStore, TransactionStore};
    use crate::transaction_service::TransactionService;

    type Service = TransactionService<Arc<InMemoryStore>>;

    struct World {
        store: Arc<InMemoryStore>,
        locks: Arc<KeyedLock<WarehouseId>>,
        service: Arc<Service>,
        customer: CustomerId,
        user: UserId,
        rice: GoodId,
    }

    impl World {
        fn warehouse(&self, name: &str, capacity: i64) -> WarehouseId {
            let id = WarehouseId::new();
            self.store
                .insert_warehouse(Warehouse::new(id, name, "10.0,106.0", capacity).unwrap())
                .unwrap();
            id
        }

        fn request(&self, warehouse: WarehouseId, quantity: i64) -> TransactionRequest {
            TransactionRequest::new(
                warehouse,
                self.customer,
                self.user,
                vec![LineItem::new(self.rice, quantity, 10)],
            )
        }
    }

    /// The write delay widens the window between the aggregate read and the
    /// write, so a missing lock would reliably let both racers through.
    fn world(write_delay: Duration) -> World {
        granary_observability::init_for_tests();

        let store = Arc::new(InMemoryStore::new().with_write_delay(write_delay));
        let customer = CustomerId::new();
        let user = UserId::new();
        let rice = GoodId::new();
        store.insert_customer(Customer::new(customer, "An Giang Food")).unwrap();
        store.insert_user(User::new(user, "keeper", Role::Root)).unwrap();
        store.insert_good(Good::new(rice, "Jasmine 85")).unwrap();

        let locks = Arc::new(KeyedLock::new());
        let service = Arc::new(TransactionService::with_locks(
            Arc::clone(&store),
            Arc::clone(&locks),
            ServiceConfig::default(),
        ));

        World {
            store,
            locks,
            service,
            customer,
            user,
            rice,
        }
    }

    /// Run every request on its own thread, released together.
    fn race<F>(
        service: &Arc<Service>,
        requests: Vec<TransactionRequest>,
        op: F,
    ) -> Vec<Result<Transaction, ServiceError>>
    where
        F: Fn(&Service, TransactionRequest) -> Result<Transaction, ServiceError>
            + Send
            + Sync
            + Copy
            + 'static,
    {
        let barrier = Arc::new(Barrier::new(requests.len()));
        let handles: Vec<_> = requests
            .into_iter()
            .map(|request| {
                let service = Arc::clone(service);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    op(&*service, request)
                })
            })
            .collect();

        handles.into_iter().map(|h| h.join().unwrap()).collect()
    }

    #[test]
    fn two_imports_racing_for_the_last_space() {
        let w = world(Duration::from_millis(20));
        let warehouse = w.warehouse("Long An", 100);

        let results = race(
            &w.service,
            vec![w.request(warehouse, 60), w.request(warehouse, 60)],
            |s, r| s.create_import(r),
        );

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results.iter().any(|r| matches!(
            r,
            Err(ServiceError::WarehouseFull { capacity: 100, used: 60, requested: 60 })
        )));
        assert_eq!(w.store.used_capacity(warehouse).unwrap(), 60);
    }

    #[test]
    fn two_exports_racing_for_the_same_stock() {
        let w = world(Duration::from_millis(20));
        let warehouse = w.warehouse("Soc Trang", 100);
        w.service.create_import(w.request(warehouse, 10)).unwrap();

        let results = race(
            &w.service,
            vec![w.request(warehouse, 6), w.request(warehouse, 6)],
            |s, r| s.create_export(r),
        );

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results.iter().any(|r| matches!(
            r,
            Err(ServiceError::InsufficientStock { on_hand: 4, requested: 6, .. })
        )));
        assert_eq!(w.store.inventory(warehouse).unwrap().get(&w.rice), Some(4));
    }

    #[test]
    fn many_importers_never_overshoot_capacity() {
        const WRITERS: usize = 8;
        const QTY: i64 = 25;

        let w = world(Duration::from_millis(5));
        // Room for all but one writer.
        let warehouse = w.warehouse("Kien Giang", QTY * (WRITERS as i64 - 1));

        let requests = (0..WRITERS).map(|_| w.request(warehouse, QTY)).collect();
        let results = race(&w.service, requests, |s, r| s.create_import(r));

        let committed = results.iter().filter(|r| r.is_ok()).count();
        let full = results
            .iter()
            .filter(|r| matches!(r, Err(ServiceError::WarehouseFull { .. })))
            .count();
        assert_eq!(committed, WRITERS - 1);
        assert_eq!(full, 1);
        assert_eq!(w.store.used_capacity(warehouse).unwrap(), QTY * (WRITERS as i64 - 1));
    }

    #[test]
    fn mixed_traffic_keeps_stock_non_negative() {
        let w = world(Duration::from_millis(2));
        let warehouse = w.warehouse("Bac Lieu", 40);

        let mut requests = Vec::new();
        for _ in 0..6 {
            requests.push((true, w.request(warehouse, 10)));
            requests.push((false, w.request(warehouse, 10)));
        }

        let barrier = Arc::new(Barrier::new(requests.len()));
        let handles: Vec<_> = requests
            .into_iter()
            .map(|(import, request)| {
                let service = Arc::clone(&w.service);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    if import {
                        service.create_import(request)
                    } else {
                        service.create_export(request)
                    }
                })
            })
            .collect();
        for h in handles {
            let _ = h.join().unwrap();
        }

        let used = w.store.used_capacity(warehouse).unwrap();
        assert!((0..=40).contains(&used), "used capacity {used} out of range");
        assert_eq!(w.store.inventory(warehouse).unwrap().on_hand(&w.rice), used);
    }

    #[test]
    fn exporting_a_never_imported_good_is_insufficient() {
        let w = world(Duration::ZERO);
        let warehouse = w.warehouse("Hau Giang", 100);

        let err = w.service.create_export(w.request(warehouse, 1)).unwrap_err();
        assert_eq!(
            err,
            ServiceError::InsufficientStock {
                good_id: w.rice,
                on_hand: 0,
                requested: 1,
            }
        );
    }

    #[test]
    fn held_warehouse_does_not_delay_another() {
        let w = world(Duration::ZERO);
        let busy = w.warehouse("Tien Giang", 100);
        let idle = w.warehouse("Ben Tre", 100);

        let _held = w.locks.lock(&busy);

        let started = Instant::now();
        w.service.create_import(w.request(idle, 10)).unwrap();
        assert!(started.elapsed() < Duration::from_millis(500));
    }

    #[test]
    fn held_warehouse_blocks_writers_until_released() {
        let w = world(Duration::ZERO);
        let warehouse = w.warehouse("Vinh Long", 100);

        let held = w.locks.lock(&warehouse);
        let writer = {
            let service = Arc::clone(&w.service);
            let request = w.request(warehouse, 10);
            thread::spawn(move || service.create_import(request))
        };

        thread::sleep(Duration::from_millis(50));
        assert_eq!(w.store.used_capacity(warehouse).unwrap(), 0);

        drop(held);
        writer.join().unwrap().unwrap();
        assert_eq!(w.store.used_capacity(warehouse).unwrap(), 10);
    }

    #[test]
    fn lock_is_released_after_every_outcome() {
        let w = world(Duration::ZERO);
        let warehouse = w.warehouse("Tra Vinh", 10);
        let stranger = TransactionRequest::new(
            warehouse,
            CustomerId::new(),
            w.user,
            vec![LineItem::new(w.rice, 1, 1)],
        );

        assert!(w.service.create_import(w.request(warehouse, 11)).is_err());
        assert!(w.locks.try_lock(&warehouse).is_some());

        assert!(matches!(w.service.create_import(stranger), Err(ServiceError::NotFound(_))));
        assert!(w.locks.try_lock(&warehouse).is_some());

        w.store.fail_next_write();
        assert_eq!(
            w.service.create_import(w.request(warehouse, 1)),
            Err(ServiceError::Internal)
        );
        assert!(w.locks.try_lock(&warehouse).is_some());

        w.service.create_import(w.request(warehouse, 1)).unwrap();
        assert!(w.locks.try_lock(&warehouse).is_some());
    }

    #[test]
    fn inventory_reads_are_stable_without_writes() {
        let w = world(Duration::ZERO);
        let warehouse = w.warehouse("Ca Mau", 100);
        w.service.create_import(w.request(warehouse, 30)).unwrap();
        w.service.create_export(w.request(warehouse, 5)).unwrap();

        let query = w.service.inventory_query();
        let first = query.inventory(warehouse).unwrap();
        let second = query.inventory(warehouse).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.get(&w.rice), Some(25));
    }

    #[test]
    fn lock_table_grows_per_warehouse_touched() {
        let w = world(Duration::ZERO);
        let a = w.warehouse("A", 10);
        let b = w.warehouse("B", 10);

        w.service.create_import(w.request(a, 1)).unwrap();
        w.service.create_import(w.request(a, 1)).unwrap();
        w.service.create_import(w.request(b, 1)).unwrap();
        assert_eq!(w.locks.key_count(), 2);
    }
}
