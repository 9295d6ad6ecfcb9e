use chrono::{DateTime, Utc};

use stockpile_core::value_object::trimmed_within;
use stockpile_core::{AccountId, DomainError, DomainResult, Entity, ProductId};

use crate::sku::Sku;

pub const MAX_NAME_LEN: usize = 100;

/// Entity: Product (a stocked item owned by one account).
///
/// `stock` is unsigned: a product can never hold negative stock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    id: ProductId,
    name: String,
    sku: Sku,
    stock: u32,
    account_id: AccountId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Product {
    /// Rehydrate a product from persisted fields.
    pub fn restore(
        id: ProductId,
        name: String,
        sku: Sku,
        stock: u32,
        account_id: AccountId,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            sku,
            stock,
            account_id,
            created_at,
            updated_at,
        }
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sku(&self) -> &Sku {
        &self.sku
    }

    pub fn stock(&self) -> u32 {
        self.stock
    }

    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    pub fn is_owned_by(&self, account_id: AccountId) -> bool {
        self.account_id == account_id
    }

    pub fn has_stock_for(&self, quantity: u64) -> bool {
        u64::from(self.stock) >= quantity
    }

    /// Subtract `quantity` from stock, refusing to go below zero.
    ///
    /// This is the only way stock changes after creation.
    pub fn decrement_stock(&mut self, quantity: u64, now: DateTime<Utc>) -> DomainResult<()> {
        let remaining = u64::from(self.stock)
            .checked_sub(quantity)
            .and_then(|r| u32::try_from(r).ok())
            .ok_or_else(|| {
                DomainError::invariant(format!(
                    "stock cannot go negative (stock={}, requested={quantity})",
                    self.stock
                ))
            })?;
        self.stock = remaining;
        self.updated_at = now;
        Ok(())
    }
}

impl Entity for Product {
    type Id = ProductId;

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

/// Command: CreateProduct (raw, unvalidated input).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProduct {
    pub name: String,
    pub sku: String,
    pub stock: i64,
    pub account_id: String,
}

impl CreateProduct {
    /// Validate and normalize the input.
    pub fn validate(&self) -> DomainResult<NewProduct> {
        let name = trimmed_within("name", &self.name, 1, MAX_NAME_LEN)?;
        let sku = Sku::parse(&self.sku)?;
        if self.stock < 0 {
            return Err(DomainError::validation("stock", "stock cannot be negative"));
        }
        let stock = u32::try_from(self.stock)
            .map_err(|_| DomainError::validation("stock", format!("stock cannot exceed {}", u32::MAX)))?;
        let account_id: AccountId = self
            .account_id
            .parse()
            .map_err(|_| DomainError::validation("accountId", "must be a valid account id"))?;

        Ok(NewProduct {
            name,
            sku,
            stock,
            account_id,
        })
    }
}

/// Validated product input, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    name: String,
    sku: Sku,
    stock: u32,
    account_id: AccountId,
}

impl NewProduct {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sku(&self) -> &Sku {
        &self.sku
    }

    pub fn stock(&self) -> u32 {
        self.stock
    }

    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    /// Assign identity and timestamps.
    pub fn into_product(self, now: DateTime<Utc>) -> Product {
        Product {
            id: ProductId::new(),
            name: self.name,
            sku: self.sku,
            stock: self.stock,
            account_id: self.account_id,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockpile_core::ValueObject;

    fn cmd(stock: i64) -> CreateProduct {
        CreateProduct {
            name: "Laptop Dell XPS 13".to_string(),
            sku: "DELL-XPS13-001".to_string(),
            stock,
            account_id: AccountId::new().to_string(),
        }
    }

    fn product(stock: u32) -> Product {
        cmd(i64::from(stock)).validate().unwrap().into_product(Utc::now())
    }

    #[test]
    fn validate_accepts_zero_stock() {
        let new = cmd(0).validate().unwrap();
        assert_eq!(new.stock(), 0);
        assert_eq!(new.sku().as_str(), "DELL-XPS13-001");
    }

    #[test]
    fn validate_rejects_negative_stock() {
        assert_eq!(cmd(-1).validate().unwrap_err().field(), Some("stock"));
    }

    #[test]
    fn validate_rejects_stock_beyond_u32() {
        assert_eq!(cmd(i64::from(u32::MAX) + 1).validate().unwrap_err().field(), Some("stock"));
    }

    #[test]
    fn validate_rejects_malformed_account_id() {
        let mut c = cmd(5);
        c.account_id = "507f1f77bcf86cd799439011".to_string();
        assert_eq!(c.validate().unwrap_err().field(), Some("accountId"));
    }

    #[test]
    fn decrement_reduces_stock_and_touches_updated_at() {
        let mut p = product(5);
        let later = p.updated_at() + chrono::Duration::seconds(1);
        p.decrement_stock(2, later).unwrap();
        assert_eq!(p.stock(), 3);
        assert_eq!(p.updated_at(), later);
        assert!(p.created_at() < later);
    }

    #[test]
    fn decrement_to_exactly_zero_is_allowed() {
        let mut p = product(3);
        p.decrement_stock(3, Utc::now()).unwrap();
        assert_eq!(p.stock(), 0);
    }

    #[test]
    fn quantities_beyond_stock_range_are_never_satisfiable() {
        let mut p = product(u32::MAX);
        assert!(p.has_stock_for(u64::from(u32::MAX)));
        assert!(!p.has_stock_for(5_000_000_000));
        assert!(p.decrement_stock(5_000_000_000, Utc::now()).is_err());
        assert_eq!(p.stock(), u32::MAX);
    }

    #[test]
    fn decrement_past_zero_is_rejected_and_leaves_state() {
        let mut p = product(2);
        let before = p.clone();
        let err = p.decrement_stock(3, Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
        assert_eq!(p, before);
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 500,
                ..ProptestConfig::default()
            })]

            /// Property: no sequence of decrements drives stock below zero, and
            /// stock only ever changes by accepted quantities.
            #[test]
            fn stock_never_negative(
                initial in 0u32..1_000,
                requests in proptest::collection::vec(0u64..200, 0..50)
            ) {
                let mut p = product(initial);
                let mut expected = u64::from(initial);
                for q in requests {
                    match p.decrement_stock(q, Utc::now()) {
                        Ok(()) => {
                            prop_assert!(q <= expected);
                            expected -= q;
                        }
                        Err(_) => prop_assert!(q > expected),
                    }
                    prop_assert_eq!(u64::from(p.stock()), expected);
                }
            }
        }
    }
}
