use chrono::{DateTime, Utc};

use stockpile_core::value_object::trimmed_within;
use stockpile_core::{AccountId, DomainResult, Entity};

use crate::email::Email;

pub const MAX_NAME_LEN: usize = 100;

/// Entity: Account (owner of products).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    id: AccountId,
    name: String,
    email: Email,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Account {
    /// Rehydrate an account from persisted fields.
    pub fn restore(
        id: AccountId,
        name: String,
        email: Email,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            email,
            created_at,
            updated_at,
        }
    }

    pub fn id_typed(&self) -> AccountId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &Email {
        &self.email
    }
}

impl Entity for Account {
    type Id = AccountId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// Command: CreateAccount (raw, unvalidated input).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateAccount {
    pub name: String,
    pub email: String,
}

impl CreateAccount {
    /// Validate and normalize the input.
    pub fn validate(&self) -> DomainResult<NewAccount> {
        let name = trimmed_within("name", &self.name, 1, MAX_NAME_LEN)?;
        let email = Email::parse(&self.email)?;
        Ok(NewAccount { name, email })
    }
}

/// Validated account input, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    name: String,
    email: Email,
}

impl NewAccount {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Assign identity and timestamps.
    pub fn into_account(self, now: DateTime<Utc>) -> Account {
        Account {
            id: AccountId::new(),
            name: self.name,
            email: self.email,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockpile_core::ValueObject;

    fn cmd(name: &str, email: &str) -> CreateAccount {
        CreateAccount {
            name: name.to_string(),
            email: email.to_string(),
        }
    }

    #[test]
    fn validate_trims_and_normalizes() {
        let new = cmd("  Juan Pérez ", "Juan.Perez@Example.com").validate().unwrap();
        assert_eq!(new.name(), "Juan Pérez");
        assert_eq!(new.email().as_str(), "juan.perez@example.com");
    }

    #[test]
    fn name_is_required_and_bounded() {
        assert_eq!(cmd("   ", "a@b.co").validate().unwrap_err().field(), Some("name"));
        let long = "x".repeat(MAX_NAME_LEN + 1);
        assert_eq!(cmd(&long, "a@b.co").validate().unwrap_err().field(), Some("name"));
    }

    #[test]
    fn name_is_checked_before_email() {
        let err = cmd("", "broken").validate().unwrap_err();
        assert_eq!(err.field(), Some("name"));
    }

    #[test]
    fn into_account_stamps_both_timestamps() {
        let now = Utc::now();
        let account = cmd("Ana", "ana@example.com").validate().unwrap().into_account(now);
        assert_eq!(account.created_at(), now);
        assert_eq!(account.updated_at(), now);
        assert_eq!(account.name(), "Ana");
    }
}
