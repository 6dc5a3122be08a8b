use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failure of an equity-curve run. Any of these aborts the whole run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CurveError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Illegal state: {0}")]
    IllegalState(String),
    #[error("Ordering error: {0}")]
    Ordering(String),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Internal server error: {0}")]
    Internal(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Unprocessable: {0}")]
    Unprocessable(String),
}

impl From<CurveError> for AppError {
    fn from(err: CurveError) -> Self {
        match err {
            CurveError::InvalidInput(_) | CurveError::Ordering(_) => {
                AppError::BadRequest(err.to_string())
            }
            CurveError::IllegalState(_) => AppError::Unprocessable(err.to_string()),
        }
    }
}

impl From<crate::datasource::DataSourceError> for AppError {
    fn from(err: crate::datasource::DataSourceError) -> Self {
        use crate::datasource::DataSourceError;
        match err {
            DataSourceError::Curve(inner) => inner.into(),
            DataSourceError::Csv(msg) => AppError::BadRequest(format!("CSV error: {}", msg)),
            DataSourceError::Io(msg) => AppError::Internal(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
