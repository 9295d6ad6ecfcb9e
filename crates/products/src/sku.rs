use stockpile_core::value_object::trimmed_within;
use stockpile_core::{DomainResult, ValueObject};

pub const MAX_SKU_LEN: usize = 50;

/// Stock-keeping unit: the unique, human-assigned product code.
///
/// Compared exactly (after trimming); `abc-1` and `ABC-1` are different SKUs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sku(String);

impl Sku {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        trimmed_within("sku", raw, 1, MAX_SKU_LEN).map(Self)
    }

    /// Rebuild from a value that was validated before it was stored.
    pub fn from_stored(value: String) -> Self {
        Self(value)
    }
}

impl ValueObject for Sku {
    fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Sku {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_but_keeps_case() {
        assert_eq!(Sku::parse(" DELL-XPS13-001 ").unwrap().as_str(), "DELL-XPS13-001");
        assert_ne!(Sku::parse("abc").unwrap(), Sku::parse("ABC").unwrap());
    }

    #[test]
    fn enforces_length_bounds() {
        assert!(Sku::parse("").is_err());
        assert!(Sku::parse(&"S".repeat(MAX_SKU_LEN)).is_ok());
        assert!(Sku::parse(&"S".repeat(MAX_SKU_LEN + 1)).is_err());
    }
}
