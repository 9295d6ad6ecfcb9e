use std::sync::Arc;

use thiserror::Error;

use stockpile_accounts::{Account, Email};
use stockpile_core::{AccountId, Page, PageRequest, ProductId};
use stockpile_products::{Product, Sku};

/// Unique indexes the store enforces on writes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UniqueIndex {
    AccountEmail,
    ProductSku,
}

impl core::fmt::Display for UniqueIndex {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            UniqueIndex::AccountEmail => f.write_str("accounts.email"),
            UniqueIndex::ProductSku => f.write_str("products.sku"),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// A write collided with an existing record on a unique index.
    #[error("duplicate key on unique index {0}")]
    Duplicate(UniqueIndex),

    /// A persisted record could not be mapped back into the domain.
    #[error("corrupt record: {0}")]
    Corrupt(String),

    /// The backend failed (connection, pool, lock, unexpected database error).
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Result of the atomic conditional stock decrement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StockDecrement {
    /// Stock was reduced; carries the updated product.
    Applied(Product),
    /// Stock was lower than requested; nothing changed. Carries the current product.
    Insufficient(Product),
    /// No product with that id.
    Missing,
}

/// Account persistence.
#[async_trait::async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert a new account. Fails with `Duplicate(AccountEmail)` when the
    /// (normalized) email is taken.
    async fn insert_account(&self, account: Account) -> Result<Account, StoreError>;

    async fn find_account(&self, id: AccountId) -> Result<Option<Account>, StoreError>;

    async fn find_account_by_email(&self, email: &Email) -> Result<Option<Account>, StoreError>;

    /// Accounts whose name contains `name` (case-insensitive), newest first.
    async fn list_accounts(
        &self,
        name: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<Account>, StoreError>;
}

/// Product persistence, including the stock ledger primitive.
#[async_trait::async_trait]
pub trait ProductStore: Send + Sync {
    /// Insert a new product. Fails with `Duplicate(ProductSku)` when the SKU is taken.
    async fn insert_product(&self, product: Product) -> Result<Product, StoreError>;

    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    async fn find_product_by_sku(&self, sku: &Sku) -> Result<Option<Product>, StoreError>;

    /// Products owned by `account_id` whose name contains `name`, newest first.
    async fn list_products_by_account(
        &self,
        account_id: AccountId,
        name: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<Product>, StoreError>;

    /// Atomically apply `stock = stock - quantity` if and only if
    /// `stock >= quantity`.
    ///
    /// Implementations must make the check and the write a single step: two
    /// concurrent calls can never both pass the check against the same stock.
    async fn decrement_stock(
        &self,
        id: ProductId,
        quantity: u64,
    ) -> Result<StockDecrement, StoreError>;
}

/// Everything the ledger needs from a backing store.
pub trait Store: AccountStore + ProductStore {}

impl<T: AccountStore + ProductStore> Store for T {}

#[async_trait::async_trait]
impl<S> AccountStore for Arc<S>
where
    S: AccountStore + ?Sized,
{
    async fn insert_account(&self, account: Account) -> Result<Account, StoreError> {
        (**self).insert_account(account).await
    }

    async fn find_account(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        (**self).find_account(id).await
    }

    async fn find_account_by_email(&self, email: &Email) -> Result<Option<Account>, StoreError> {
        (**self).find_account_by_email(email).await
    }

    async fn list_accounts(
        &self,
        name: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<Account>, StoreError> {
        (**self).list_accounts(name, page).await
    }
}

#[async_trait::async_trait]
impl<S> ProductStore for Arc<S>
where
    S: ProductStore + ?Sized,
{
    async fn insert_product(&self, product: Product) -> Result<Product, StoreError> {
        (**self).insert_product(product).await
    }

    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        (**self).find_product(id).await
    }

    async fn find_product_by_sku(&self, sku: &Sku) -> Result<Option<Product>, StoreError> {
        (**self).find_product_by_sku(sku).await
    }

    async fn list_products_by_account(
        &self,
        account_id: AccountId,
        name: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<Product>, StoreError> {
        (**self).list_products_by_account(account_id, name, page).await
    }

    async fn decrement_stock(
        &self,
        id: ProductId,
        quantity: u64,
    ) -> Result<StockDecrement, StoreError> {
        (**self).decrement_stock(id, quantity).await
    }
}
