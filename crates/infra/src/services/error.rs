use thiserror::Error;

use storefront_core::{DomainError, SkuCode};

use crate::repository::RepositoryError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// At least one ordered SKU has no stock (or no inventory row at all).
    #[error("not in stock: {}", join_skus(.0))]
    OutOfStock(Vec<SkuCode>),

    #[error("not found")]
    NotFound,
}

fn join_skus(skus: &[SkuCode]) -> String {
    skus.iter().map(SkuCode::as_str).collect::<Vec<_>>().join(", ")
}
