use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use storefront_core::OrderId;

use crate::app::{dto, errors};
use crate::app::services::{self, AppServices};

pub fn router() -> Router {
    Router::new()
        .route("/", post(place_order).get(list_orders))
        .route("/stream", get(stream))
        .route("/:id", get(get_order))
}

pub async fn place_order(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::PlaceOrderRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };
    let line_items = match body.into_line_items() {
        Ok(l) => l,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.orders().place_order(line_items).await {
        Ok(order) => (
            StatusCode::CREATED,
            Json(dto::OrderPlacedResponse {
                order_id: order.id_typed().to_string(),
                order_number: order.order_number().to_string(),
                message: "Order placed successfully",
            }),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_orders(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.orders().list_orders().await {
        Ok(orders) => Json(orders.iter().map(dto::order_to_json).collect::<Vec<_>>()).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match id.parse::<OrderId>() {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.orders().get_order(id).await {
        Ok(order) => Json(dto::order_to_json(&order)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn stream(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Sse<impl tokio_stream::Stream<Item = Result<axum::response::sse::Event, std::convert::Infallible>>> {
    services::order_sse_stream(services)
}
