//! Inventory ledger service (application-level orchestration).
//!
//! `InventoryLedger` sits between the HTTP layer and the stores. It validates
//! raw input, runs the pure domain checks, and drives the store's atomic stock
//! decrement:
//!
//! ```text
//! Purchase
//!   ↓
//! 1. Validate shape (ids, quantity)           → LedgerError::InvalidInput
//!   ↓
//! 2. Account exists?                          → ACCOUNT_NOT_FOUND
//!   ↓
//! 3. Product exists?                          → PRODUCT_NOT_FOUND
//!   ↓
//! 4. check_purchase (ownership, then stock)   → OWNERSHIP_MISMATCH / INSUFFICIENT_STOCK
//!   ↓
//! 5. Conditional decrement in the store       → lost race: INSUFFICIENT_STOCK (fresh snapshot)
//! ```
//!
//! Steps 2–5 never return an error: business outcomes and store failures
//! both become a failed [`PurchaseResult`].

use thiserror::Error;
use tracing::{error, info, warn};

use stockpile_accounts::{Account, CreateAccount};
use stockpile_core::{AccountId, DomainError, Locale, Page, PageRequest, ProductId};
use stockpile_inventory::{Purchase, PurchaseRejection, PurchaseResult, check_purchase};
use stockpile_products::{CreateProduct, Product};

use crate::store::{StockDecrement, Store, StoreError, UniqueIndex};

const MODULE: &str = "ledger";

#[derive(Debug, Error)]
pub enum LedgerError {
    /// Input failed validation before any storage access.
    #[error("invalid input: {0}")]
    InvalidInput(DomainError),

    #[error("account not found")]
    AccountNotFound,

    #[error("product not found")]
    ProductNotFound,

    #[error("email already registered")]
    EmailAlreadyExists,

    #[error("sku already registered")]
    SkuAlreadyExists,

    #[error(transparent)]
    Store(StoreError),
}

impl LedgerError {
    /// Stable, machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::InvalidInput(_) => "INVALID_INPUT",
            LedgerError::AccountNotFound => "ACCOUNT_NOT_FOUND",
            LedgerError::ProductNotFound => "PRODUCT_NOT_FOUND",
            LedgerError::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",
            LedgerError::SkuAlreadyExists => "SKU_ALREADY_EXISTS",
            LedgerError::Store(_) => "INTERNAL_ERROR",
        }
    }

    /// Human-readable message in `locale`.
    pub fn message(&self, locale: Locale) -> String {
        let text = match self {
            LedgerError::InvalidInput(_) => {
                locale.pick("Datos de entrada inválidos", "Invalid input data")
            }
            LedgerError::AccountNotFound => locale.pick("Cuenta no encontrada", "Account not found"),
            LedgerError::ProductNotFound => {
                locale.pick("Producto no encontrado", "Product not found")
            }
            LedgerError::EmailAlreadyExists => locale.pick(
                "Ya existe una cuenta con este email",
                "An account with this email already exists",
            ),
            LedgerError::SkuAlreadyExists => locale.pick(
                "Ya existe un producto con este SKU",
                "A product with this SKU already exists",
            ),
            LedgerError::Store(_) => locale.pick("Error interno del servidor", "Internal server error"),
        };
        text.to_string()
    }
}

impl From<DomainError> for LedgerError {
    fn from(value: DomainError) -> Self {
        LedgerError::InvalidInput(value)
    }
}

impl From<StoreError> for LedgerError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Duplicate(UniqueIndex::AccountEmail) => LedgerError::EmailAlreadyExists,
            StoreError::Duplicate(UniqueIndex::ProductSku) => LedgerError::SkuAlreadyExists,
            other => LedgerError::Store(other),
        }
    }
}

/// Filter for the account listing.
#[derive(Debug, Clone, Default)]
pub struct AccountsFilter {
    pub name: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Filter for the per-account product listing.
#[derive(Debug, Clone, Default)]
pub struct ProductsFilter {
    pub account_id: String,
    pub name: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

fn parse_account_id(field: &'static str, raw: &str) -> Result<AccountId, LedgerError> {
    raw.parse()
        .map_err(|_| LedgerError::InvalidInput(DomainError::validation(field, "must be a valid account id")))
}

fn parse_product_id(field: &'static str, raw: &str) -> Result<ProductId, LedgerError> {
    raw.parse()
        .map_err(|_| LedgerError::InvalidInput(DomainError::validation(field, "must be a valid product id")))
}

/// Blank filters are treated as absent.
fn name_filter(name: Option<&str>) -> Option<&str> {
    name.map(str::trim).filter(|n| !n.is_empty())
}

/// Accounts, products and the purchase flow over a [`Store`].
#[derive(Debug, Clone)]
pub struct InventoryLedger<S> {
    store: S,
    locale: Locale,
}

impl<S> InventoryLedger<S> {
    pub fn new(store: S, locale: Locale) -> Self {
        Self { store, locale }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: Store> InventoryLedger<S> {
    pub async fn create_account(&self, input: CreateAccount) -> Result<Account, LedgerError> {
        let new_account = input.validate()?;

        if self
            .store
            .find_account_by_email(new_account.email())
            .await
            .map_err(|e| self.log_store_error("create_account", e))?
            .is_some()
        {
            warn!(module = MODULE, email = %new_account.email(), "account email already registered");
            return Err(LedgerError::EmailAlreadyExists);
        }

        let account = self
            .store
            .insert_account(new_account.into_account(chrono::Utc::now()))
            .await
            .map_err(|e| self.log_store_error("create_account", e))?;

        info!(module = MODULE, account_id = %account.id_typed(), "account created");
        Ok(account)
    }

    pub async fn find_account(&self, id: &str) -> Result<Account, LedgerError> {
        let id = parse_account_id("id", id)?;
        self.store
            .find_account(id)
            .await
            .map_err(|e| self.log_store_error("find_account", e))?
            .ok_or(LedgerError::AccountNotFound)
    }

    pub async fn find_accounts(&self, filter: AccountsFilter) -> Result<Page<Account>, LedgerError> {
        let page = PageRequest::new(filter.page, filter.limit)?;
        let accounts = self
            .store
            .list_accounts(name_filter(filter.name.as_deref()), page)
            .await
            .map_err(|e| self.log_store_error("find_accounts", e))?;
        Ok(accounts)
    }

    pub async fn create_product(&self, input: CreateProduct) -> Result<Product, LedgerError> {
        let new_product = input.validate()?;

        if self
            .store
            .find_account(new_product.account_id())
            .await
            .map_err(|e| self.log_store_error("create_product", e))?
            .is_none()
        {
            warn!(module = MODULE, account_id = %new_product.account_id(), "product owner does not exist");
            return Err(LedgerError::AccountNotFound);
        }

        if self
            .store
            .find_product_by_sku(new_product.sku())
            .await
            .map_err(|e| self.log_store_error("create_product", e))?
            .is_some()
        {
            warn!(module = MODULE, sku = %new_product.sku(), "sku already registered");
            return Err(LedgerError::SkuAlreadyExists);
        }

        let product = self
            .store
            .insert_product(new_product.into_product(chrono::Utc::now()))
            .await
            .map_err(|e| self.log_store_error("create_product", e))?;

        info!(
            module = MODULE,
            product_id = %product.id_typed(),
            account_id = %product.account_id(),
            stock = product.stock(),
            "product created"
        );
        Ok(product)
    }

    pub async fn find_product(&self, id: &str) -> Result<Product, LedgerError> {
        let id = parse_product_id("id", id)?;
        self.store
            .find_product(id)
            .await
            .map_err(|e| self.log_store_error("find_product", e))?
            .ok_or(LedgerError::ProductNotFound)
    }

    /// Products owned by an account. An unknown account yields an empty page.
    pub async fn find_products_by_account(
        &self,
        filter: ProductsFilter,
    ) -> Result<Page<Product>, LedgerError> {
        let account_id = parse_account_id("accountId", &filter.account_id)?;
        let page = PageRequest::new(filter.page, filter.limit)?;
        let products = self
            .store
            .list_products_by_account(account_id, name_filter(filter.name.as_deref()), page)
            .await
            .map_err(|e| self.log_store_error("find_products_by_account", e))?;
        Ok(products)
    }

    /// Run a purchase.
    ///
    /// Only malformed input is an error; every other outcome is a
    /// [`PurchaseResult`].
    pub async fn purchase(&self, input: Purchase) -> Result<PurchaseResult, LedgerError> {
        let request = input.validate()?;

        let outcome = match self.try_purchase(&request).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(
                    module = MODULE,
                    account_id = %request.account_id(),
                    product_id = %request.product_id(),
                    error = %e,
                    "purchase failed in store"
                );
                Err(PurchaseRejection::ProcessingError(e.to_string()))
            }
        };

        Ok(match outcome {
            Ok(product) => {
                info!(
                    module = MODULE,
                    account_id = %request.account_id(),
                    product_id = %request.product_id(),
                    quantity = request.quantity(),
                    remaining = product.stock(),
                    "purchase completed"
                );
                PurchaseResult::completed(product, request.quantity(), self.locale)
            }
            Err(rejection) => {
                if !matches!(rejection, PurchaseRejection::ProcessingError(_)) {
                    warn!(
                        module = MODULE,
                        account_id = %request.account_id(),
                        product_id = %request.product_id(),
                        quantity = request.quantity(),
                        reason = rejection.code(),
                        "purchase rejected"
                    );
                }
                PurchaseResult::rejected(rejection, self.locale)
            }
        })
    }

    /// Store errors bubble out; business rejections are the inner `Err`.
    async fn try_purchase(
        &self,
        request: &stockpile_inventory::PurchaseRequest,
    ) -> Result<Result<Product, PurchaseRejection>, StoreError> {
        if self.store.find_account(request.account_id()).await?.is_none() {
            return Ok(Err(PurchaseRejection::AccountNotFound));
        }

        let Some(product) = self.store.find_product(request.product_id()).await? else {
            return Ok(Err(PurchaseRejection::ProductNotFound));
        };

        if let Err(rejection) = check_purchase(request, &product) {
            return Ok(Err(rejection));
        }

        Ok(
            match self
                .store
                .decrement_stock(request.product_id(), request.quantity())
                .await?
            {
                StockDecrement::Applied(updated) => Ok(updated),
                StockDecrement::Insufficient(current) => {
                    Err(PurchaseRejection::InsufficientStock {
                        snapshot: current,
                        requested: request.quantity(),
                    })
                }
                StockDecrement::Missing => Err(PurchaseRejection::ProductNotFound),
            },
        )
    }

    fn log_store_error(&self, operation: &'static str, err: StoreError) -> LedgerError {
        let mapped = LedgerError::from(err);
        match &mapped {
            LedgerError::Store(inner) => {
                error!(module = MODULE, operation, error = %inner, "store failure");
            }
            other => {
                warn!(module = MODULE, operation, code = other.code(), "unique index rejected write");
            }
        }
        mapped
    }
}
