//! Filtering and pagination for transaction listings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use granary_inventory::{Direction, Transaction};

/// A window over a newest-first transaction listing.
///
/// `offset` rows are skipped, then at most `limit` are returned. `limit` never
/// exceeds [`Pagination::MAX_LIMIT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub limit: u32,
    pub offset: u32,
}

impl Pagination {
    pub const DEFAULT_LIMIT: u32 = 50;
    pub const MAX_LIMIT: u32 = 1000;

    /// Build a window from optional request parameters, clamping `limit`.
    pub fn new(limit: Option<u32>, offset: Option<u32>) -> Self {
        Self {
            limit: limit.unwrap_or(Self::DEFAULT_LIMIT).min(Self::MAX_LIMIT),
            offset: offset.unwrap_or_default(),
        }
    }

    /// The rows of `rows` that fall inside this window.
    pub fn apply<I>(self, rows: I) -> impl Iterator<Item = I::Item>
    where
        I: IntoIterator,
    {
        rows.into_iter()
            .skip(self.offset as usize)
            .take(self.limit.min(Self::MAX_LIMIT) as usize)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Filter criteria for transaction listings and counts.
///
/// Time bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionFilter {
    pub direction: Option<Direction>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
}

impl TransactionFilter {
    pub fn direction(direction: Direction) -> Self {
        Self {
            direction: Some(direction),
            ..Default::default()
        }
    }

    pub fn matches(&self, tx: &Transaction) -> bool {
        self.direction.is_none_or(|d| d == tx.direction)
            && self.created_after.is_none_or(|t| tx.created_at >= t)
            && self.created_before.is_none_or(|t| tx.created_at <= t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_caps_limit() {
        let p = Pagination::new(Some(5000), None);
        assert_eq!(p.limit, Pagination::MAX_LIMIT);
        assert_eq!(p.offset, 0);
        assert_eq!(Pagination::new(None, Some(3)).limit, Pagination::DEFAULT_LIMIT);
    }

    #[test]
    fn apply_skips_then_takes() {
        let window = Pagination::new(Some(2), Some(3));
        assert_eq!(window.apply(0..10).collect::<Vec<_>>(), vec![3, 4]);

        // A hand-built window past the cap is still clamped.
        let wide = Pagination {
            limit: u32::MAX,
            offset: 0,
        };
        assert_eq!(wide.apply(0..2000).count(), Pagination::MAX_LIMIT as usize);
    }
}
