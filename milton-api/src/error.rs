use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use milton_core::{CoreError, FieldErrors};
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    NotFoundError(String),
    ValidationError(FieldErrors),
    InternalServerError(String),
}

impl AppError {
    /// Any failure on a path where the visitor gets the error page, not a warning.
    pub fn internal(err: impl std::fmt::Display) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            AppError::ValidationError(fields) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "error": "Validation failed", "fields": fields }),
            ),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": "Internal Server Error" }))
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound(what) => AppError::NotFoundError(format!("Not found: {}", what)),
            CoreError::Validation(fields) => AppError::ValidationError(fields),
            other @ (CoreError::Persistence(_) | CoreError::StaleSession(_)) => {
                AppError::InternalServerError(other.to_string())
            }
        }
    }
}
