use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use granary_core::{
    CustomerId, DomainError, DomainResult, Entity, GoodId, TransactionId, UserId, ValueObject,
    WarehouseId,
};

use crate::reference::{Customer, Good, User};
use crate::warehouse::Warehouse;

/// Whether a transaction brings goods into a warehouse or takes them out.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Import,
    Export,
}

impl Direction {
    /// Sign applied to line-item quantities when deriving inventory.
    pub fn sign(self) -> i64 {
        match self {
            Direction::Import => 1,
            Direction::Export => -1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Import => "import",
            Direction::Export => "export",
        }
    }
}

impl core::fmt::Display for Direction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One good moved by a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub good_id: GoodId,
    /// Always positive once validated; the direction carries the sign.
    pub quantity: i64,
    /// Price per unit in the smallest currency unit.
    pub unit_price: u64,
}

impl ValueObject for LineItem {}

impl LineItem {
    pub fn new(good_id: GoodId, quantity: i64, unit_price: u64) -> Self {
        Self {
            good_id,
            quantity,
            unit_price,
        }
    }

    /// `unit_price * quantity`, or `None` on overflow or a non-positive quantity.
    pub fn line_total(&self) -> Option<u64> {
        let quantity = u64::try_from(self.quantity).ok()?;
        self.unit_price.checked_mul(quantity)
    }
}

/// A request to record a transaction, as handed over by the request layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub warehouse_id: WarehouseId,
    pub customer_id: CustomerId,
    pub user_id: UserId,
    pub items: Vec<LineItem>,
}

impl TransactionRequest {
    pub fn new(
        warehouse_id: WarehouseId,
        customer_id: CustomerId,
        user_id: UserId,
        items: Vec<LineItem>,
    ) -> Self {
        Self {
            warehouse_id,
            customer_id,
            user_id,
            items,
        }
    }

    /// At least one line, positive quantities, unique goods, and totals that
    /// fit their integer types.
    pub fn validate(&self) -> DomainResult<()> {
        if self.items.is_empty() {
            return Err(DomainError::validation(
                "transaction must have at least one line item",
            ));
        }

        let mut seen = HashSet::with_capacity(self.items.len());
        for item in &self.items {
            if item.quantity <= 0 {
                return Err(DomainError::validation(format!(
                    "quantity for good {} must be positive",
                    item.good_id
                )));
            }
            if !seen.insert(item.good_id) {
                return Err(DomainError::validation(format!(
                    "good {} appears more than once",
                    item.good_id
                )));
            }
        }

        self.total_quantity()?;
        self.total_price()?;
        Ok(())
    }

    /// Sum of line-item quantities (the capacity a transaction consumes or frees).
    pub fn total_quantity(&self) -> DomainResult<i64> {
        self.items.iter().try_fold(0i64, |acc, item| {
            acc.checked_add(item.quantity)
                .ok_or_else(|| DomainError::validation("total quantity overflows"))
        })
    }

    /// Sum of `unit_price * quantity` over all lines.
    pub fn total_price(&self) -> DomainResult<u64> {
        self.items.iter().try_fold(0u64, |acc, item| {
            item.line_total()
                .and_then(|line| acc.checked_add(line))
                .ok_or_else(|| DomainError::validation("total price overflows"))
        })
    }

    /// Validate and freeze the request into the write handed to the store.
    pub fn into_pending(
        self,
        direction: Direction,
        created_at: DateTime<Utc>,
    ) -> DomainResult<PendingTransaction> {
        self.validate()?;
        let total_price = self.total_price()?;

        Ok(PendingTransaction {
            direction,
            warehouse_id: self.warehouse_id,
            customer_id: self.customer_id,
            user_id: self.user_id,
            created_at,
            total_price,
            items: self.items,
        })
    }
}

/// A validated transaction that has not been assigned an identifier yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTransaction {
    pub direction: Direction,
    pub warehouse_id: WarehouseId,
    pub customer_id: CustomerId,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub total_price: u64,
    pub items: Vec<LineItem>,
}

/// A persisted, immutable ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub direction: Direction,
    pub warehouse_id: WarehouseId,
    pub customer_id: CustomerId,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub total_price: u64,
    pub items: Vec<LineItem>,
}

impl Transaction {
    pub fn from_pending(id: TransactionId, pending: PendingTransaction) -> Self {
        Self {
            id,
            direction: pending.direction,
            warehouse_id: pending.warehouse_id,
            customer_id: pending.customer_id,
            user_id: pending.user_id,
            created_at: pending.created_at,
            total_price: pending.total_price,
            items: pending.items,
        }
    }

    /// Signed `(good, quantity)` contributions of this entry to the ledger.
    pub fn signed_quantities(&self) -> impl Iterator<Item = (GoodId, i64)> + '_ {
        let sign = self.direction.sign();
        self.items.iter().map(move |i| (i.good_id, sign * i.quantity))
    }
}

impl Entity for Transaction {
    type Id = TransactionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// A line item joined with its good's display data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineDetails {
    #[serde(flatten)]
    pub item: LineItem,
    pub good: Option<Good>,
}

/// A transaction joined with its associations, for reporting.
///
/// Associations that no longer resolve are `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDetails {
    pub id: TransactionId,
    pub direction: Direction,
    pub created_at: DateTime<Utc>,
    pub total_price: u64,
    pub warehouse: Option<Warehouse>,
    pub customer: Option<Customer>,
    pub created_by: Option<User>,
    pub lines: Vec<LineDetails>,
}
