//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Users and ledger transactions are entities: their identifier is assigned by
/// the store on insert and never changes afterwards.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;
}
