//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Records owned by external services (employees, created requests) are
/// entities here even though this workspace never mutates them.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
