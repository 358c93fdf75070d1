use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use scm_core::CoreError;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    ValidationError(String),
    #[error("{0}")]
    NotFoundError(String),
    #[error("{0}")]
    ConflictError(String),
    #[error("{message}")]
    Unavailable { message: String, hint: Option<&'static str> },
    #[error("{0}")]
    InternalServerError(String),
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        let hint = err.hint();
        let message = err.to_string();
        match err {
            CoreError::ValidationError(msg) => AppError::ValidationError(msg),
            CoreError::NotFound(msg) => AppError::NotFoundError(format!("{} not found", msg)),
            CoreError::Conflict(msg) => AppError::ConflictError(msg),
            CoreError::ConnectivityError(_) | CoreError::SchemaError(_) => {
                AppError::Unavailable { message, hint }
            }
            CoreError::InternalError(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, hint) = match self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg, None),
            AppError::ConflictError(msg) => (
                StatusCode::CONFLICT,
                msg,
                Some("Refresh the booking list and try again."),
            ),
            AppError::Unavailable { message, hint } => {
                tracing::warn!("Backend unavailable: {}", message);
                (StatusCode::SERVICE_UNAVAILABLE, message, hint)
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string(), None)
            }
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string(), None)
            }
        };

        let body = match hint {
            Some(hint) => json!({ "error": error_message, "hint": hint }),
            None => json!({ "error": error_message }),
        };

        (status, Json(body)).into_response()
    }
}
