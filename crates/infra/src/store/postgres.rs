//! Postgres-backed account/product store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError | Scenario |
//! |------------|----------------------|------------|----------|
//! | Database (unique violation) on `accounts_email_key` | `23505` | `Duplicate(AccountEmail)` | Email already registered |
//! | Database (unique violation) on `products_sku_key` | `23505` | `Duplicate(ProductSku)` | SKU already registered |
//! | Database (other) | Any other | `Backend` | FK/check violations, anything else |
//! | PoolClosed / other | N/A | `Backend` | Network errors, connection failures, etc. |
//!
//! ## Stock Decrement
//!
//! `decrement_stock` is a single conditional `UPDATE ... WHERE stock >= $2`.
//! Postgres re-evaluates the predicate after waiting on the row lock, so two
//! concurrent purchases cannot both succeed against the same units.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{FromRow, PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use stockpile_accounts::{Account, Email};
use stockpile_core::{AccountId, Entity, Page, PageRequest, ProductId, ValueObject};
use stockpile_products::{Product, Sku};

use super::r#trait::{AccountStore, ProductStore, StockDecrement, StoreError, UniqueIndex};

const SCHEMA: &str = include_str!("../../migrations/0001_init.sql");

const PRODUCT_COLUMNS: &str = "id, name, sku, stock, account_id, created_at, updated_at";

/// Postgres-backed store.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: Arc<PgPool>,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Open a pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create tables and indexes if they do not exist yet.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            sqlx::query(statement)
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl AccountStore for PostgresStore {
    #[instrument(skip(self, account), fields(account_id = %account.id_typed()), err)]
    async fn insert_account(&self, account: Account) -> Result<Account, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO accounts (id, name, email, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(account.id_typed().as_uuid())
        .bind(account.name())
        .bind(account.email().as_str())
        .bind(account.created_at())
        .bind(account.updated_at())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_account", e))?;

        Ok(account)
    }

    #[instrument(skip(self), err)]
    async fn find_account(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query(
            "SELECT id, name, email, created_at, updated_at FROM accounts WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_account", e))?;

        row.map(|r| account_from_row(&r)).transpose()
    }

    #[instrument(skip(self), err)]
    async fn find_account_by_email(&self, email: &Email) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query(
            "SELECT id, name, email, created_at, updated_at FROM accounts WHERE LOWER(email) = $1",
        )
        .bind(email.as_str())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_account_by_email", e))?;

        row.map(|r| account_from_row(&r)).transpose()
    }

    #[instrument(skip(self), err)]
    async fn list_accounts(
        &self,
        name: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<Account>, StoreError> {
        let pattern = name.map(like_pattern);

        let total: i64 = sqlx::query(
            r#"
            SELECT COUNT(*) AS total FROM accounts
            WHERE ($1::text IS NULL OR name ILIKE $1 ESCAPE '\')
            "#,
        )
        .bind(pattern.as_deref())
        .fetch_one(&*self.pool)
        .await
        .and_then(|r| r.try_get("total"))
        .map_err(|e| map_sqlx_error("list_accounts", e))?;

        let rows = sqlx::query(
            r#"
            SELECT id, name, email, created_at, updated_at FROM accounts
            WHERE ($1::text IS NULL OR name ILIKE $1 ESCAPE '\')
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(pattern.as_deref())
        .bind(i64::from(page.limit()))
        .bind(offset(page))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_accounts", e))?;

        let data = rows
            .iter()
            .map(account_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(data, page, count(total)))
    }
}

#[async_trait::async_trait]
impl ProductStore for PostgresStore {
    #[instrument(skip(self, product), fields(product_id = %product.id_typed()), err)]
    async fn insert_product(&self, product: Product) -> Result<Product, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, sku, stock, account_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(product.id_typed().as_uuid())
        .bind(product.name())
        .bind(product.sku().as_str())
        .bind(i64::from(product.stock()))
        .bind(product.account_id().as_uuid())
        .bind(product.created_at())
        .bind(product.updated_at())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_product", e))?;

        Ok(product)
    }

    #[instrument(skip(self), err)]
    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_product", e))?;

        row.map(|r| product_from_row(&r)).transpose()
    }

    #[instrument(skip(self), err)]
    async fn find_product_by_sku(&self, sku: &Sku) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE sku = $1"))
            .bind(sku.as_str())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_product_by_sku", e))?;

        row.map(|r| product_from_row(&r)).transpose()
    }

    #[instrument(skip(self), err)]
    async fn list_products_by_account(
        &self,
        account_id: AccountId,
        name: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<Product>, StoreError> {
        let pattern = name.map(like_pattern);

        let total: i64 = sqlx::query(
            r#"
            SELECT COUNT(*) AS total FROM products
            WHERE account_id = $1 AND ($2::text IS NULL OR name ILIKE $2 ESCAPE '\')
            "#,
        )
        .bind(account_id.as_uuid())
        .bind(pattern.as_deref())
        .fetch_one(&*self.pool)
        .await
        .and_then(|r| r.try_get("total"))
        .map_err(|e| map_sqlx_error("list_products_by_account", e))?;

        let rows = sqlx::query(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS} FROM products
            WHERE account_id = $1 AND ($2::text IS NULL OR name ILIKE $2 ESCAPE '\')
            ORDER BY created_at DESC, id DESC
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(account_id.as_uuid())
        .bind(pattern.as_deref())
        .bind(i64::from(page.limit()))
        .bind(offset(page))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_products_by_account", e))?;

        let data = rows
            .iter()
            .map(product_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(data, page, count(total)))
    }

    #[instrument(skip(self), err)]
    async fn decrement_stock(
        &self,
        id: ProductId,
        quantity: u64,
    ) -> Result<StockDecrement, StoreError> {
        let updated = sqlx::query(&format!(
            r#"
            UPDATE products
            SET stock = stock - $2, updated_at = NOW()
            WHERE id = $1 AND stock >= $2
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(id.as_uuid())
        .bind(i64::try_from(quantity).unwrap_or(i64::MAX))
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("decrement_stock", e))?;

        if let Some(row) = updated {
            return Ok(StockDecrement::Applied(product_from_row(&row)?));
        }

        // No row matched: either the product is gone or stock was short.
        match self.find_product(id).await? {
            Some(current) => Ok(StockDecrement::Insufficient(current)),
            None => Ok(StockDecrement::Missing),
        }
    }
}

/// Escape LIKE metacharacters and wrap for a substring match.
fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn offset(page: PageRequest) -> i64 {
    i64::try_from(page.offset()).unwrap_or(i64::MAX)
}

fn count(total: i64) -> u64 {
    u64::try_from(total).unwrap_or(0)
}

/// Internal row representation for accounts.
struct AccountRow {
    id: Uuid,
    name: String,
    email: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for AccountRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(AccountRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Account::restore(
            AccountId::from_uuid(row.id),
            row.name,
            Email::from_stored(row.email),
            row.created_at,
            row.updated_at,
        )
    }
}

/// Internal row representation for products.
struct ProductRow {
    id: Uuid,
    name: String,
    sku: String,
    stock: i64,
    account_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for ProductRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(ProductRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            sku: row.try_get("sku")?,
            stock: row.try_get("stock")?,
            account_id: row.try_get("account_id")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl TryFrom<ProductRow> for Product {
    type Error = StoreError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let stock = u32::try_from(row.stock).map_err(|_| {
            StoreError::Corrupt(format!("product {} has out-of-range stock {}", row.id, row.stock))
        })?;
        Ok(Product::restore(
            ProductId::from_uuid(row.id),
            row.name,
            Sku::from_stored(row.sku),
            stock,
            AccountId::from_uuid(row.account_id),
            row.created_at,
            row.updated_at,
        ))
    }
}

fn account_from_row(row: &PgRow) -> Result<Account, StoreError> {
    AccountRow::from_row(row)
        .map(Account::from)
        .map_err(|e| StoreError::Corrupt(format!("failed to deserialize account row: {e}")))
}

fn product_from_row(row: &PgRow) -> Result<Product, StoreError> {
    ProductRow::from_row(row)
        .map_err(|e| StoreError::Corrupt(format!("failed to deserialize product row: {e}")))?
        .try_into()
}

/// Map SQLx errors to StoreError.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            if db_err.code().as_deref() == Some("23505") {
                match db_err.constraint() {
                    Some("accounts_email_key") => {
                        return StoreError::Duplicate(UniqueIndex::AccountEmail);
                    }
                    Some("products_sku_key") => {
                        return StoreError::Duplicate(UniqueIndex::ProductSku);
                    }
                    _ => {}
                }
            }
            StoreError::Backend(format!("database error in {}: {}", operation, db_err.message()))
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {}", operation))
        }
        _ => StoreError::Backend(format!("sqlx error in {}: {}", operation, err)),
    }
}
