use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_product))
        .route("/:id", get(get_product))
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CreateProductRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::malformed_body(services.locale(), e.body_text()),
    };

    match services.ledger().create_product(body.into()).await {
        Ok(product) => (StatusCode::CREATED, Json(dto::ProductResponse::from(product))).into_response(),
        Err(e) => errors::ledger_error_to_response(e, services.locale()),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    match services.ledger().find_product(&id).await {
        Ok(product) => (StatusCode::OK, Json(dto::ProductResponse::from(product))).into_response(),
        Err(e) => errors::ledger_error_to_response(e, services.locale()),
    }
}
