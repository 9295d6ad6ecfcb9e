use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::{Value, json};

use stockpile_core::{DomainError, Locale};
use stockpile_infra::LedgerError;

pub fn ledger_error_to_response(err: LedgerError, locale: Locale) -> axum::response::Response {
    let status = match &err {
        LedgerError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        LedgerError::AccountNotFound | LedgerError::ProductNotFound => StatusCode::NOT_FOUND,
        LedgerError::EmailAlreadyExists | LedgerError::SkuAlreadyExists => StatusCode::CONFLICT,
        LedgerError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let message = err.message(locale);
    match err {
        LedgerError::InvalidInput(domain) => {
            json_error_with_details(status, "INVALID_INPUT", message, validation_details(&domain))
        }
        other => json_error(status, other.code(), message),
    }
}

/// Request body could not be decoded into the expected shape.
pub fn malformed_body(locale: Locale, detail: impl Into<String>) -> axum::response::Response {
    json_error_with_details(
        StatusCode::BAD_REQUEST,
        "INVALID_INPUT",
        locale.pick("Datos de entrada inválidos", "Invalid input data"),
        json!([{ "message": detail.into() }]),
    )
}

fn validation_details(err: &DomainError) -> Value {
    match err {
        DomainError::Validation { field, message } => json!([{ "field": field, "message": message }]),
        other => json!([{ "message": other.to_string() }]),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn json_error_with_details(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
    details: Value,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
            "details": details,
        })),
    )
        .into_response()
}
