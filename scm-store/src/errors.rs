//! Mapping of driver errors onto the dispatch error taxonomy.

use scm_core::CoreError;
use tracing::error;

const UNDEFINED_TABLE: &str = "42P01";
const UNDEFINED_COLUMN: &str = "42703";
const UNIQUE_VIOLATION: &str = "23505";

pub fn classify(err: sqlx::Error) -> CoreError {
    match &err {
        sqlx::Error::Database(db) => match db.code().as_deref() {
            Some(UNDEFINED_TABLE) | Some(UNDEFINED_COLUMN) => CoreError::SchemaError(db.message().to_string()),
            Some(UNIQUE_VIOLATION) => CoreError::Conflict(db.message().to_string()),
            _ => {
                error!("Database error: {}", err);
                CoreError::InternalError(err.to_string())
            }
        },
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Configuration(_) => CoreError::ConnectivityError(err.to_string()),
        sqlx::Error::Migrate(_) => CoreError::SchemaError(err.to_string()),
        _ => {
            error!("Store error: {}", err);
            CoreError::InternalError(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_errors_are_connectivity() {
        assert!(matches!(classify(sqlx::Error::PoolTimedOut), CoreError::ConnectivityError(_)));
        assert!(matches!(classify(sqlx::Error::PoolClosed), CoreError::ConnectivityError(_)));
        assert!(matches!(classify(sqlx::Error::RowNotFound), CoreError::InternalError(_)));
    }
}
