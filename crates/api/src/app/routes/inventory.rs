use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query},
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};

use storefront_core::{DomainResult, SkuCode};

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(is_in_stock))
        .route("/:sku", put(save_stock))
}

/// Collect every `skuCode` parameter; repeated keys and comma-separated
/// values are both accepted. Blank entries are ignored.
fn requested_skus(params: &[(String, String)]) -> DomainResult<Vec<SkuCode>> {
    params
        .iter()
        .filter(|(k, _)| k == "skuCode")
        .flat_map(|(_, v)| v.split(','))
        .filter(|s| !s.trim().is_empty())
        .map(SkuCode::parse)
        .collect()
}

pub async fn is_in_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<Vec<(String, String)>>,
) -> axum::response::Response {
    let skus = match requested_skus(&params) {
        Ok(s) => s,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.inventory().is_in_stock(&skus).await {
        Ok(statuses) => Json(statuses).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn save_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Path(sku): Path<String>,
    body: Result<Json<dto::SaveStockRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };
    let sku = match SkuCode::parse(&sku) {
        Ok(s) => s,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.inventory().save_stock(sku, body.quantity).await {
        Ok(row) => Json(dto::inventory_to_json(&row)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
