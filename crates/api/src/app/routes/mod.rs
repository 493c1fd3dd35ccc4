use axum::Router;

pub mod inventory;
pub mod orders;
pub mod products;
pub mod system;

/// Router for the service endpoints (mounted under `/api`).
pub fn router() -> Router {
    Router::new()
        .nest("/inventory", inventory::router())
        .nest("/order", orders::router())
        .nest("/product", products::router())
}
