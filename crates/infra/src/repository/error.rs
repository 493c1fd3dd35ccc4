use thiserror::Error;

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Storage failure, independent of the backing store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// Unique/foreign-key style violation.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The store cannot be reached (pool closed, timeout, IO, poisoned lock).
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Stored data could not be mapped back into a domain value.
    #[error("corrupt row: {0}")]
    Corrupt(String),

    /// A domain value does not fit the storage representation.
    #[error("unrepresentable value: {0}")]
    Unrepresentable(String),

    /// Any other database error.
    #[error("database error: {0}")]
    Database(String),
}

/// Map a driver error into a [`RepositoryError`], tagging it with the
/// repository operation that failed.
pub fn map_sqlx_error(operation: &str, err: sqlx::Error) -> RepositoryError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                // unique_violation, foreign_key_violation
                Some("23505") | Some("23503") => RepositoryError::Conflict(msg),
                _ => RepositoryError::Database(msg),
            }
        }
        sqlx::Error::PoolClosed | sqlx::Error::PoolTimedOut => {
            RepositoryError::Unavailable(format!("connection pool unavailable in {}", operation))
        }
        sqlx::Error::Io(e) => RepositoryError::Unavailable(format!("io error in {}: {}", operation, e)),
        sqlx::Error::ColumnNotFound(col) => {
            RepositoryError::Corrupt(format!("missing column {} in {}", col, operation))
        }
        sqlx::Error::ColumnDecode { index, source } => {
            RepositoryError::Corrupt(format!("cannot decode column {} in {}: {}", index, operation, source))
        }
        sqlx::Error::Decode(e) => RepositoryError::Corrupt(format!("decode error in {}: {}", operation, e)),
        other => RepositoryError::Database(format!("{} failed: {}", operation, other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_errors_mean_unavailable() {
        assert!(matches!(
            map_sqlx_error("find_all", sqlx::Error::PoolClosed),
            RepositoryError::Unavailable(_)
        ));
        assert!(matches!(
            map_sqlx_error("find_all", sqlx::Error::PoolTimedOut),
            RepositoryError::Unavailable(_)
        ));
    }

    #[test]
    fn missing_columns_mean_corrupt_rows() {
        let err = map_sqlx_error("find_by_id", sqlx::Error::ColumnNotFound("sku_code".into()));
        assert_eq!(
            err,
            RepositoryError::Corrupt("missing column sku_code in find_by_id".to_string())
        );
    }

    #[test]
    fn other_errors_keep_the_operation_name() {
        match map_sqlx_error("count", sqlx::Error::RowNotFound) {
            RepositoryError::Database(msg) => assert!(msg.starts_with("count failed")),
            other => panic!("expected Database, got {other:?}"),
        }
    }
}
