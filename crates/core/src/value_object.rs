//! Value object trait: equality by value, not identity.

/// Marker trait for immutable values compared by their attributes.
///
/// An affordability assessment or an installment schedule is a value object:
/// to "change" one, compute a new one and replace the old one wholesale.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
