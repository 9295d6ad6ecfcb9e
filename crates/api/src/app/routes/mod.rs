use axum::Router;

pub mod accounts;
pub mod products;
pub mod purchases;
pub mod system;

/// Router for all resource endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/accounts", accounts::router())
        .nest("/products", products::router())
        .nest("/purchases", purchases::router())
}
