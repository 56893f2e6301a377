//! Inventory derived from the transaction ledger.
//!
//! Nothing here is persisted. A snapshot is rebuilt from the full history of a
//! warehouse every time it is needed, so it reflects exactly what had committed
//! when it was computed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use granary_core::GoodId;

use crate::transaction::Transaction;

/// Per-good on-hand quantity for one warehouse.
///
/// Only strictly positive balances are kept: a good that was never imported,
/// or that has been fully exported, is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InventorySnapshot {
    balances: BTreeMap<GoodId, i64>,
}

impl InventorySnapshot {
    /// Build from signed `(good, quantity)` movements (imports positive).
    pub fn from_movements(movements: impl IntoIterator<Item = (GoodId, i64)>) -> Self {
        let mut balances: BTreeMap<GoodId, i64> = BTreeMap::new();
        for (good_id, delta) in movements {
            let entry = balances.entry(good_id).or_insert(0);
            *entry = entry.saturating_add(delta);
        }
        balances.retain(|_, qty| *qty > 0);
        Self { balances }
    }

    /// Build from a warehouse's transactions.
    pub fn from_ledger<'a>(ledger: impl IntoIterator<Item = &'a Transaction>) -> Self {
        Self::from_movements(ledger.into_iter().flat_map(|tx| tx.signed_quantities()))
    }

    /// On-hand quantity of `good_id`, if the warehouse holds any.
    pub fn get(&self, good_id: &GoodId) -> Option<i64> {
        self.balances.get(good_id).copied()
    }

    /// On-hand quantity of `good_id`, zero when absent.
    pub fn on_hand(&self, good_id: &GoodId) -> i64 {
        self.get(good_id).unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&GoodId, &i64)> {
        self.balances.iter()
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    /// Sum of all on-hand balances.
    pub fn total(&self) -> i64 {
        self.balances.values().fold(0i64, |acc, q| acc.saturating_add(*q))
    }
}

impl FromIterator<(GoodId, i64)> for InventorySnapshot {
    fn from_iter<T: IntoIterator<Item = (GoodId, i64)>>(iter: T) -> Self {
        Self::from_movements(iter)
    }
}

/// Used capacity: total imported minus total exported, over every good.
///
/// The result is not clamped; it reports whatever the ledger implies.
pub fn used_capacity<'a>(ledger: impl IntoIterator<Item = &'a Transaction>) -> i64 {
    ledger
        .into_iter()
        .flat_map(|tx| tx.signed_quantities())
        .fold(0i64, |acc, (_, delta)| acc.saturating_add(delta))
}
