//! Infrastructure layer: per-warehouse locking, store boundary, services.

pub mod config;
pub mod error;
pub mod inventory_query;
pub mod keyed_lock;
pub mod store;
pub mod transaction_service;

mod integration_tests;

pub use config::ServiceConfig;
pub use error::ServiceError;
pub use inventory_query::{InventoryQuery, StockLine, WarehouseOverview};
pub use keyed_lock::{KeyedLock, KeyedLockGuard};
pub use transaction_service::TransactionService;
