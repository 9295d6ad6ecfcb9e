use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;

use stockpile_accounts::{Account, Email};
use stockpile_core::pagination::paginate;
use stockpile_core::{AccountId, Entity, Page, PageRequest, ProductId, ValueObject, name_matches, newest_first};
use stockpile_products::{Product, Sku};

use super::r#trait::{AccountStore, ProductStore, StockDecrement, StoreError, UniqueIndex};

#[derive(Debug, Default)]
struct AccountTable {
    rows: HashMap<AccountId, Account>,
    by_email: HashMap<String, AccountId>,
}

#[derive(Debug, Default)]
struct ProductTable {
    rows: HashMap<ProductId, Product>,
    by_sku: HashMap<String, ProductId>,
}

/// In-memory store for tests/dev.
///
/// Each table sits behind one `RwLock`; the stock decrement runs entirely under
/// the products write lock, so check and subtract happen as one step.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    accounts: RwLock<AccountTable>,
    products: RwLock<ProductTable>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> StoreError {
    StoreError::Backend("lock poisoned".to_string())
}

fn page_of<E: Entity>(mut rows: Vec<E>, page: PageRequest) -> Page<E> {
    rows.sort_by(newest_first);
    paginate(rows, page)
}

#[async_trait::async_trait]
impl AccountStore for InMemoryStore {
    async fn insert_account(&self, account: Account) -> Result<Account, StoreError> {
        let mut table = self.accounts.write().map_err(|_| poisoned())?;
        let email = account.email().as_str().to_string();
        if table.by_email.contains_key(&email) {
            return Err(StoreError::Duplicate(UniqueIndex::AccountEmail));
        }
        table.by_email.insert(email, account.id_typed());
        table.rows.insert(account.id_typed(), account.clone());
        Ok(account)
    }

    async fn find_account(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        let table = self.accounts.read().map_err(|_| poisoned())?;
        Ok(table.rows.get(&id).cloned())
    }

    async fn find_account_by_email(&self, email: &Email) -> Result<Option<Account>, StoreError> {
        let table = self.accounts.read().map_err(|_| poisoned())?;
        Ok(table
            .by_email
            .get(email.as_str())
            .and_then(|id| table.rows.get(id))
            .cloned())
    }

    async fn list_accounts(
        &self,
        name: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<Account>, StoreError> {
        let rows = {
            let table = self.accounts.read().map_err(|_| poisoned())?;
            table
                .rows
                .values()
                .filter(|a| name.is_none_or(|n| name_matches(a.name(), n)))
                .cloned()
                .collect::<Vec<_>>()
        };
        Ok(page_of(rows, page))
    }
}

#[async_trait::async_trait]
impl ProductStore for InMemoryStore {
    async fn insert_product(&self, product: Product) -> Result<Product, StoreError> {
        let mut table = self.products.write().map_err(|_| poisoned())?;
        let sku = product.sku().as_str().to_string();
        if table.by_sku.contains_key(&sku) {
            return Err(StoreError::Duplicate(UniqueIndex::ProductSku));
        }
        table.by_sku.insert(sku, product.id_typed());
        table.rows.insert(product.id_typed(), product.clone());
        Ok(product)
    }

    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let table = self.products.read().map_err(|_| poisoned())?;
        Ok(table.rows.get(&id).cloned())
    }

    async fn find_product_by_sku(&self, sku: &Sku) -> Result<Option<Product>, StoreError> {
        let table = self.products.read().map_err(|_| poisoned())?;
        Ok(table
            .by_sku
            .get(sku.as_str())
            .and_then(|id| table.rows.get(id))
            .cloned())
    }

    async fn list_products_by_account(
        &self,
        account_id: AccountId,
        name: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<Product>, StoreError> {
        let rows = {
            let table = self.products.read().map_err(|_| poisoned())?;
            table
                .rows
                .values()
                .filter(|p| p.is_owned_by(account_id))
                .filter(|p| name.is_none_or(|n| name_matches(p.name(), n)))
                .cloned()
                .collect::<Vec<_>>()
        };
        Ok(page_of(rows, page))
    }

    async fn decrement_stock(
        &self,
        id: ProductId,
        quantity: u64,
    ) -> Result<StockDecrement, StoreError> {
        let mut table = self.products.write().map_err(|_| poisoned())?;
        let Some(product) = table.rows.get_mut(&id) else {
            return Ok(StockDecrement::Missing);
        };
        if !product.has_stock_for(quantity) {
            return Ok(StockDecrement::Insufficient(product.clone()));
        }
        product
            .decrement_stock(quantity, Utc::now())
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(StockDecrement::Applied(product.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockpile_accounts::CreateAccount;
    use stockpile_products::CreateProduct;

    fn account(name: &str, email: &str) -> Account {
        CreateAccount {
            name: name.to_string(),
            email: email.to_string(),
        }
        .validate()
        .unwrap()
        .into_account(Utc::now())
    }

    fn product(owner: AccountId, name: &str, sku: &str, stock: u32) -> Product {
        CreateProduct {
            name: name.to_string(),
            sku: sku.to_string(),
            stock: i64::from(stock),
            account_id: owner.to_string(),
        }
        .validate()
        .unwrap()
        .into_product(Utc::now())
    }

    #[tokio::test]
    async fn email_index_rejects_duplicates() {
        let store = InMemoryStore::new();
        store.insert_account(account("Ana", "ana@example.com")).await.unwrap();

        let err = store
            .insert_account(account("Other Ana", "ANA@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(UniqueIndex::AccountEmail)));

        let page = store.list_accounts(None, PageRequest::default()).await.unwrap();
        assert_eq!(page.total, 1);
    }

    #[tokio::test]
    async fn sku_index_rejects_duplicates() {
        let store = InMemoryStore::new();
        let owner = AccountId::new();
        store.insert_product(product(owner, "A", "SKU-1", 1)).await.unwrap();
        let err = store
            .insert_product(product(owner, "B", "SKU-1", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(UniqueIndex::ProductSku)));
    }

    #[tokio::test]
    async fn lookups_by_unique_keys() {
        let store = InMemoryStore::new();
        let a = store.insert_account(account("Ana", "ana@example.com")).await.unwrap();
        let p = store
            .insert_product(product(a.id_typed(), "Widget", "W-1", 3))
            .await
            .unwrap();

        let email = Email::parse("Ana@Example.com").unwrap();
        assert_eq!(store.find_account_by_email(&email).await.unwrap(), Some(a));
        let sku = Sku::parse("W-1").unwrap();
        assert_eq!(store.find_product_by_sku(&sku).await.unwrap(), Some(p));
        assert!(store.find_product(ProductId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn decrement_applies_only_when_stock_suffices() {
        let store = InMemoryStore::new();
        let p = store
            .insert_product(product(AccountId::new(), "Widget", "W-1", 5))
            .await
            .unwrap();

        match store.decrement_stock(p.id_typed(), 3).await.unwrap() {
            StockDecrement::Applied(updated) => assert_eq!(updated.stock(), 2),
            other => panic!("expected Applied, got {other:?}"),
        }
        match store.decrement_stock(p.id_typed(), 3).await.unwrap() {
            StockDecrement::Insufficient(current) => assert_eq!(current.stock(), 2),
            other => panic!("expected Insufficient, got {other:?}"),
        }
        assert_eq!(
            store.decrement_stock(ProductId::new(), 1).await.unwrap(),
            StockDecrement::Missing
        );
        assert_eq!(store.find_product(p.id_typed()).await.unwrap().unwrap().stock(), 2);
    }

    #[tokio::test]
    async fn listing_filters_by_owner_and_name() {
        let store = InMemoryStore::new();
        let owner = AccountId::new();
        let other = AccountId::new();
        store.insert_product(product(owner, "Laptop Dell", "L-1", 1)).await.unwrap();
        store.insert_product(product(owner, "Mouse", "M-1", 1)).await.unwrap();
        store.insert_product(product(other, "Laptop HP", "L-2", 1)).await.unwrap();

        let all = store
            .list_products_by_account(owner, None, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(all.total, 2);

        let laptops = store
            .list_products_by_account(owner, Some("LAPTOP"), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(laptops.total, 1);
        assert_eq!(laptops.data[0].name(), "Laptop Dell");
    }

    #[tokio::test]
    async fn listing_is_newest_first() {
        let store = InMemoryStore::new();
        let base = Utc::now();
        for (i, name) in ["first", "second", "third"].into_iter().enumerate() {
            let fresh = account(name, &format!("{name}@example.com"));
            let at = base + chrono::Duration::seconds(i as i64);
            let stamped = Account::restore(
                fresh.id_typed(),
                fresh.name().to_string(),
                fresh.email().clone(),
                at,
                at,
            );
            store.insert_account(stamped).await.unwrap();
        }

        let page = store
            .list_accounts(None, PageRequest::new(Some(1), Some(2)).unwrap())
            .await
            .unwrap();
        let names: Vec<_> = page.data.iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["third", "second"]);
        assert_eq!(page.total_pages, 2);
    }
}
