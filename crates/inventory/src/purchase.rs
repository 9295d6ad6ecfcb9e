use stockpile_core::{AccountId, DomainError, DomainResult, Locale, ProductId};
use stockpile_products::Product;

/// Command: Purchase (raw, unvalidated input).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Purchase {
    pub account_id: String,
    pub product_id: String,
    pub quantity: i64,
}

impl Purchase {
    /// Validate the request shape. Nothing here touches storage.
    pub fn validate(&self) -> DomainResult<PurchaseRequest> {
        let account_id: AccountId = self
            .account_id
            .parse()
            .map_err(|_| DomainError::validation("accountId", "must be a valid account id"))?;
        let product_id: ProductId = self
            .product_id
            .parse()
            .map_err(|_| DomainError::validation("productId", "must be a valid product id"))?;
        // Any positive quantity is well-formed; whether it fits is a stock question.
        let quantity = u64::try_from(self.quantity)
            .ok()
            .filter(|q| *q > 0)
            .ok_or_else(|| DomainError::validation("quantity", "quantity must be greater than 0"))?;

        Ok(PurchaseRequest {
            account_id,
            product_id,
            quantity,
        })
    }
}

/// Validated purchase request.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PurchaseRequest {
    account_id: AccountId,
    product_id: ProductId,
    quantity: u64,
}

impl PurchaseRequest {
    pub fn new(account_id: AccountId, product_id: ProductId, quantity: u64) -> DomainResult<Self> {
        if quantity == 0 {
            return Err(DomainError::validation("quantity", "quantity must be greater than 0"));
        }
        Ok(Self {
            account_id,
            product_id,
            quantity,
        })
    }

    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn quantity(&self) -> u64 {
        self.quantity
    }
}

/// Why a purchase was turned down.
///
/// These are ordinary business outcomes, reported to callers as a failed
/// [`PurchaseResult`] rather than as an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurchaseRejection {
    AccountNotFound,
    ProductNotFound,
    OwnershipMismatch { owner: AccountId },
    InsufficientStock { snapshot: Product, requested: u64 },
    /// The store failed mid-flow; the detail is shown to the caller.
    ProcessingError(String),
}

impl PurchaseRejection {
    /// Stable, machine-readable reason code.
    pub fn code(&self) -> &'static str {
        match self {
            PurchaseRejection::AccountNotFound => "ACCOUNT_NOT_FOUND",
            PurchaseRejection::ProductNotFound => "PRODUCT_NOT_FOUND",
            PurchaseRejection::OwnershipMismatch { .. } => "OWNERSHIP_MISMATCH",
            PurchaseRejection::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            PurchaseRejection::ProcessingError(_) => "PROCESSING_ERROR",
        }
    }

    pub fn message(&self, locale: Locale) -> String {
        match self {
            PurchaseRejection::AccountNotFound => locale
                .pick("La cuenta especificada no existe", "The specified account does not exist")
                .to_string(),
            PurchaseRejection::ProductNotFound => locale
                .pick("El producto especificado no existe", "The specified product does not exist")
                .to_string(),
            PurchaseRejection::OwnershipMismatch { .. } => locale
                .pick(
                    "El producto no pertenece a la cuenta especificada",
                    "The product does not belong to the specified account",
                )
                .to_string(),
            PurchaseRejection::InsufficientStock { snapshot, .. } => match locale {
                Locale::Es => format!("Stock insuficiente. Stock disponible: {}", snapshot.stock()),
                Locale::En => format!("Insufficient stock. Available stock: {}", snapshot.stock()),
            },
            PurchaseRejection::ProcessingError(detail) => match locale {
                Locale::Es => format!("Error al procesar la compra: {detail}"),
                Locale::En => format!("Error processing the purchase: {detail}"),
            },
        }
    }

    /// Product state to hand back with the failure, if the caller may see it.
    ///
    /// Only the insufficient-stock branch exposes the product; a product owned
    /// by another account is not revealed.
    pub fn into_snapshot(self) -> Option<Product> {
        match self {
            PurchaseRejection::InsufficientStock { snapshot, .. } => Some(snapshot),
            _ => None,
        }
    }
}

/// Decide whether `product` can satisfy `request`.
///
/// Ownership is checked before stock. This is the advisory pre-check; the
/// store's conditional decrement is what actually guards the floor.
pub fn check_purchase(request: &PurchaseRequest, product: &Product) -> Result<(), PurchaseRejection> {
    if !product.is_owned_by(request.account_id()) {
        return Err(PurchaseRejection::OwnershipMismatch {
            owner: product.account_id(),
        });
    }
    if !product.has_stock_for(request.quantity()) {
        return Err(PurchaseRejection::InsufficientStock {
            snapshot: product.clone(),
            requested: request.quantity(),
        });
    }
    Ok(())
}

/// Outcome of a purchase as reported to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseResult {
    pub success: bool,
    pub message: String,
    /// Reason code for failures; `None` on success.
    pub reason: Option<&'static str>,
    pub product: Option<Product>,
}

impl PurchaseResult {
    pub fn completed(product: Product, quantity: u64, locale: Locale) -> Self {
        let message = match locale {
            Locale::Es => format!("Compra realizada exitosamente. Cantidad: {quantity}"),
            Locale::En => format!("Purchase completed successfully. Quantity: {quantity}"),
        };
        Self {
            success: true,
            message,
            reason: None,
            product: Some(product),
        }
    }

    pub fn rejected(rejection: PurchaseRejection, locale: Locale) -> Self {
        let message = rejection.message(locale);
        let reason = Some(rejection.code());
        Self {
            success: false,
            message,
            reason,
            product: rejection.into_snapshot(),
        }
    }
}
