use stockpile_core::{DomainError, DomainResult, ValueObject};

pub const MAX_EMAIL_LEN: usize = 255;

/// Normalized email address (trimmed, lowercased).
///
/// Uniqueness of accounts is decided on this normalized form, which makes it
/// case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Email(String);

impl Email {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let value = raw.trim().to_lowercase();

        if value.is_empty() {
            return Err(DomainError::validation("email", "email is required"));
        }
        if value.chars().count() > MAX_EMAIL_LEN {
            return Err(DomainError::validation(
                "email",
                format!("email cannot exceed {MAX_EMAIL_LEN} characters"),
            ));
        }
        if !looks_like_email(&value) {
            return Err(DomainError::validation("email", "must be a valid email"));
        }

        Ok(Self(value))
    }

    /// Rebuild from a value that was normalized before it was stored.
    pub fn from_stored(value: String) -> Self {
        Self(value)
    }
}

impl ValueObject for Email {
    fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Email {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

// local@domain.tld: no whitespace, one '@', and a dot inside the domain with
// something on both sides of it.
fn looks_like_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rfind('.') {
        Some(dot) => dot > 0 && dot < domain.len() - 1,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn normalizes_case_and_whitespace() {
        let email = Email::parse("  Juan.Perez@Example.COM ").unwrap();
        assert_eq!(email.as_str(), "juan.perez@example.com");
    }

    #[test]
    fn rejects_malformed_addresses() {
        for bad in ["", "   ", "plain", "a@b", "@example.com", "a@@b.com", "a b@c.com", "a@b.", "a@.com"] {
            let err = Email::parse(bad).unwrap_err();
            assert_eq!(err.field(), Some("email"), "input {bad:?}");
        }
    }

    #[test]
    fn rejects_overlong_addresses() {
        let local = "a".repeat(MAX_EMAIL_LEN);
        assert!(Email::parse(&format!("{local}@example.com")).is_err());
    }

    proptest! {
        /// Property: addresses differing only in case normalize to the same value.
        #[test]
        fn case_variants_are_equal(local in "[a-zA-Z0-9._]{1,20}", domain in "[a-zA-Z]{1,10}", tld in "[a-zA-Z]{2,5}") {
            let raw = format!("{local}@{domain}.{tld}");
            let lower = Email::parse(&raw.to_lowercase()).unwrap();
            let upper = Email::parse(&raw.to_uppercase()).unwrap();
            prop_assert_eq!(lower, upper);
        }
    }
}
