//! Warehouse inventory domain.
//!
//! This crate contains business rules for warehouses and their import/export
//! ledger, implemented purely as deterministic domain logic (no IO, no locking,
//! no storage).

pub mod guard;
pub mod reference;
pub mod snapshot;
pub mod transaction;
pub mod warehouse;

pub use guard::{CapacityGuard, StockGuard};
pub use reference::{Customer, Good, Role, User};
pub use snapshot::{InventorySnapshot, used_capacity};
pub use transaction::{
    Direction, LineDetails, LineItem, PendingTransaction, Transaction, TransactionDetails,
    TransactionRequest,
};
pub use warehouse::{Location, Warehouse};
