//! Value object trait: equality by value, not identity.
//!
//! Value objects (an email address, a SKU) are defined entirely by their
//! attribute values and are validated once, at construction.

/// Marker trait for value objects.
///
/// Implementors are immutable and compared by value. Construction goes through
/// a fallible `parse` so an instance is always known to be valid.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {
    /// Borrow the normalized representation.
    fn as_str(&self) -> &str;
}

/// Trims `raw` and checks its length (in chars) falls within `min..=max`.
///
/// Shared by the domain crates for name/sku style fields.
pub fn trimmed_within(
    field: &'static str,
    raw: &str,
    min: usize,
    max: usize,
) -> crate::DomainResult<String> {
    let value = raw.trim();
    let len = value.chars().count();
    if len < min {
        return Err(crate::DomainError::validation(field, format!("{field} is required")));
    }
    if len > max {
        return Err(crate::DomainError::validation(
            field,
            format!("{field} cannot exceed {max} characters"),
        ));
    }
    Ok(value.to_string())
}
