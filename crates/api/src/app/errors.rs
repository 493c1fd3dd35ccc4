use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use storefront_core::DomainError;
use storefront_infra::repository::RepositoryError;
use storefront_infra::services::ServiceError;

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Domain(e) => domain_error_to_response(e),
        ServiceError::Repository(e) => repository_error_to_response(e),
        ServiceError::OutOfStock(skus) => {
            let message = ServiceError::OutOfStock(skus.clone()).to_string();
            (
                StatusCode::CONFLICT,
                axum::Json(json!({
                    "error": "out_of_stock",
                    "message": message,
                    "skuCodes": skus,
                })),
            )
                .into_response()
        }
        ServiceError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::InvariantViolation(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", msg)
        }
    }
}

fn repository_error_to_response(err: RepositoryError) -> axum::response::Response {
    match err {
        RepositoryError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        RepositoryError::Unrepresentable(msg) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", msg)
        }
        RepositoryError::Unavailable(msg) => {
            tracing::error!("store unavailable: {msg}");
            json_error(StatusCode::SERVICE_UNAVAILABLE, "unavailable", msg)
        }
        e @ (RepositoryError::Corrupt(_) | RepositoryError::Database(_)) => {
            tracing::error!("store error: {e}");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string())
        }
    }
}

/// Malformed or mistyped request bodies get the same JSON error shape as
/// domain validation failures.
pub fn json_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "validation_error", rejection.body_text())
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
