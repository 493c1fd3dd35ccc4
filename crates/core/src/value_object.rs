//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**: two SKU codes with
/// the same text are the same SKU, whichever row or order line they came from.
///
/// ```ignore
/// let a = SkuCode::parse("iphone_15")?;
/// let b = SkuCode::parse(" iphone_15 ")?;
/// assert_eq!(a, b);
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
