//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Warehouses, goods, customers, users and transactions are all entities:
/// two values with the same identifier describe the same thing, even if their
/// attributes differ.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
