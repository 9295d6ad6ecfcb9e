use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Extension, Path, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_accounts).post(create_account))
        .route("/:id", get(get_account))
        .route("/:id/products", get(list_account_products))
}

pub async fn create_account(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CreateAccountRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::malformed_body(services.locale(), e.body_text()),
    };

    match services.ledger().create_account(body.into()).await {
        Ok(account) => (StatusCode::CREATED, Json(dto::AccountResponse::from(account))).into_response(),
        Err(e) => errors::ledger_error_to_response(e, services.locale()),
    }
}

pub async fn get_account(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    match services.ledger().find_account(&id).await {
        Ok(account) => (StatusCode::OK, Json(dto::AccountResponse::from(account))).into_response(),
        Err(e) => errors::ledger_error_to_response(e, services.locale()),
    }
}

pub async fn list_accounts(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<dto::ListQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(e) => return errors::malformed_body(services.locale(), e.body_text()),
    };
    let filter = match query.into_accounts_filter() {
        Ok(f) => f,
        Err(e) => return errors::ledger_error_to_response(e, services.locale()),
    };

    match services.ledger().find_accounts(filter).await {
        Ok(page) => (StatusCode::OK, Json(dto::accounts_page(page))).into_response(),
        Err(e) => errors::ledger_error_to_response(e, services.locale()),
    }
}

pub async fn list_account_products(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    query: Result<Query<dto::ListQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(e) => return errors::malformed_body(services.locale(), e.body_text()),
    };
    let filter = match query.into_products_filter(id) {
        Ok(f) => f,
        Err(e) => return errors::ledger_error_to_response(e, services.locale()),
    };

    match services.ledger().find_products_by_account(filter).await {
        Ok(page) => (StatusCode::OK, Json(dto::products_page(page))).into_response(),
        Err(e) => errors::ledger_error_to_response(e, services.locale()),
    }
}
