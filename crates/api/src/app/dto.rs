use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockpile_accounts::{Account, CreateAccount};
use stockpile_core::{DomainError, Entity, Page};
use stockpile_infra::{AccountsFilter, LedgerError, ProductsFilter};
use stockpile_inventory::{Purchase, PurchaseResult};
use stockpile_products::{CreateProduct, Product};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    pub name: String,
    pub email: String,
}

impl From<CreateAccountRequest> for CreateAccount {
    fn from(value: CreateAccountRequest) -> Self {
        CreateAccount {
            name: value.name,
            email: value.email,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    pub sku: String,
    pub stock: i64,
    pub account_id: String,
}

impl From<CreateProductRequest> for CreateProduct {
    fn from(value: CreateProductRequest) -> Self {
        CreateProduct {
            name: value.name,
            sku: value.sku,
            stock: value.stock,
            account_id: value.account_id,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    pub account_id: String,
    pub product_id: String,
    pub quantity: i64,
}

impl From<PurchaseRequest> for Purchase {
    fn from(value: PurchaseRequest) -> Self {
        Purchase {
            account_id: value.account_id,
            product_id: value.product_id,
            quantity: value.quantity,
        }
    }
}

/// `?name=&page=&limit=`. Numbers arrive as text so bad values become
/// `INVALID_INPUT` instead of a bare extractor rejection.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub name: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl ListQuery {
    pub fn into_accounts_filter(self) -> Result<AccountsFilter, LedgerError> {
        Ok(AccountsFilter {
            page: parse_int("page", self.page.as_deref())?,
            limit: parse_int("limit", self.limit.as_deref())?,
            name: self.name,
        })
    }

    pub fn into_products_filter(self, account_id: String) -> Result<ProductsFilter, LedgerError> {
        Ok(ProductsFilter {
            account_id,
            page: parse_int("page", self.page.as_deref())?,
            limit: parse_int("limit", self.limit.as_deref())?,
            name: self.name,
        })
    }
}

fn parse_int(field: &'static str, raw: Option<&str>) -> Result<Option<i64>, LedgerError> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => v.parse::<i64>().map(Some).map_err(|_| {
            LedgerError::InvalidInput(DomainError::validation(field, format!("{field} must be an integer")))
        }),
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Account> for AccountResponse {
    fn from(a: Account) -> Self {
        Self {
            id: a.id_typed().to_string(),
            name: a.name().to_string(),
            email: a.email().to_string(),
            created_at: a.created_at(),
            updated_at: a.updated_at(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    pub sku: String,
    pub stock: u32,
    pub account_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        Self {
            id: p.id_typed().to_string(),
            name: p.name().to_string(),
            sku: p.sku().to_string(),
            stock: p.stock(),
            account_id: p.account_id().to_string(),
            created_at: p.created_at(),
            updated_at: p.updated_at(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
    pub product: Option<ProductResponse>,
}

impl From<PurchaseResult> for PurchaseResponse {
    fn from(r: PurchaseResult) -> Self {
        Self {
            success: r.success,
            message: r.message,
            reason: r.reason,
            product: r.product.map(ProductResponse::from),
        }
    }
}

pub fn accounts_page(page: Page<Account>) -> Page<AccountResponse> {
    page.map(AccountResponse::from)
}

pub fn products_page(page: Page<Product>) -> Page<ProductResponse> {
    page.map(ProductResponse::from)
}
