use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new().route("/", post(purchase))
}

/// Business rejections still answer 200; the body's `success` flag tells
/// callers whether stock moved.
pub async fn purchase(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::PurchaseRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::malformed_body(services.locale(), e.body_text()),
    };

    match services.ledger().purchase(body.into()).await {
        Ok(result) => (StatusCode::OK, Json(dto::PurchaseResponse::from(result))).into_response(),
        Err(e) => errors::ledger_error_to_response(e, services.locale()),
    }
}
