//! `stockpile-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod id;
pub mod locale;
pub mod pagination;
pub mod value_object;

pub use entity::{Entity, newest_first};
pub use error::{DomainError, DomainResult};
pub use id::{AccountId, ProductId};
pub use locale::Locale;
pub use pagination::{Page, PageRequest};
pub use value_object::ValueObject;

/// Case-insensitive literal substring match used by the name filters.
///
/// An empty (or all-whitespace) needle matches everything.
pub fn name_matches(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim();
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::name_matches;

    #[test]
    fn name_filter_ignores_case() {
        assert!(name_matches("Juan Pérez", "pérez"));
        assert!(name_matches("Juan Pérez", "JUAN"));
        assert!(!name_matches("Juan Pérez", "maria"));
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        assert!(!name_matches("Laptop", "L.*p"));
        assert!(name_matches("50% off", "50%"));
    }

    #[test]
    fn blank_filter_matches_all() {
        assert!(name_matches("anything", "  "));
    }
}
