pub mod allocator;
pub mod command;
pub mod cache;
pub mod gateway;
pub mod message;
pub mod repository;
pub mod schedule;
pub mod validation;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Store unreachable: {0}")]
    ConnectivityError(String),
    #[error("Store schema mismatch: {0}")]
    SchemaError(String),
    #[error("Internal service error: {0}")]
    InternalError(String),
}

impl CoreError {
    /// Corrective hint shown next to the error banner.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            CoreError::ConnectivityError(_) => {
                Some("Check database.url and that the store is reachable, then retry.")
            }
            CoreError::SchemaError(_) => {
                Some("Table or column missing: run the migrations against this database.")
            }
            CoreError::Conflict(_) => Some("Refresh the booking list and try again."),
            _ => None,
        }
    }
}

impl From<scm_shared::ModelError> for CoreError {
    fn from(err: scm_shared::ModelError) -> Self {
        CoreError::ValidationError(err.to_string())
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
