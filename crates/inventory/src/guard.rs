//! Capacity and stock rules applied before a transaction is written.
//!
//! Both guards are pure: the caller supplies a freshly derived inventory state
//! and is responsible for holding the warehouse lock across check and write.

use granary_core::{DomainError, DomainResult};

use crate::snapshot::InventorySnapshot;
use crate::transaction::LineItem;

/// Import rule: the warehouse must have room for the whole transaction.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CapacityGuard {
    pub capacity: i64,
    pub used: i64,
}

impl CapacityGuard {
    pub fn new(capacity: i64, used: i64) -> Self {
        Self { capacity, used }
    }

    /// Rejects with `WarehouseFull` when `used + requested > capacity`.
    pub fn check(&self, requested: i64) -> DomainResult<()> {
        let fits = self
            .used
            .checked_add(requested)
            .is_some_and(|total| total <= self.capacity);

        if fits {
            Ok(())
        } else {
            Err(DomainError::WarehouseFull {
                capacity: self.capacity,
                used: self.used,
                requested,
            })
        }
    }

    pub fn remaining(&self) -> i64 {
        self.capacity.saturating_sub(self.used)
    }
}

/// Export rule: every requested good must be on hand in sufficient quantity.
#[derive(Debug, Clone, Copy)]
pub struct StockGuard<'a> {
    inventory: &'a InventorySnapshot,
}

impl<'a> StockGuard<'a> {
    pub fn new(inventory: &'a InventorySnapshot) -> Self {
        Self { inventory }
    }

    /// All-or-nothing: the first short line rejects the whole transaction.
    pub fn check(&self, items: &[LineItem]) -> DomainResult<()> {
        for item in items {
            let on_hand = self.inventory.on_hand(&item.good_id);
            if on_hand < item.quantity {
                return Err(DomainError::InsufficientStock {
                    good_id: item.good_id,
                    on_hand,
                    requested: item.quantity,
                });
            }
        }
        Ok(())
    }
}
