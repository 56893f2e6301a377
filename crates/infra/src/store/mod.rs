//! Persistence boundary for warehouses and their transaction ledger.
//!
//! The consistency core only depends on these traits. Storage mechanics
//! (schema, SQL, connection handling) live behind them.

pub mod in_memory;
pub mod query;
pub mod r#trait;

pub use in_memory::InMemoryStore;
pub use query::{Pagination, TransactionFilter};
pub use r#trait::{ReferenceLookup, StoreError, TransactionStore, WarehouseLookup};
