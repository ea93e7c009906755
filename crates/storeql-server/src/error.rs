//! API error taxonomy and its HTTP mapping.
//!
//! Every handler returns `Result<T, ApiError>`; the variant fixes the status
//! code and the JSON body. Failures that happen after generation carry the
//! generated SQL so the caller can see what was attempted.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No query provided")]
    MissingQuery,

    #[error("Empty query provided")]
    EmptyQuery,

    #[error("Failed to generate SQL query: {0}")]
    Generation(String),

    #[error("Query blocked for security reasons: {reason}")]
    Blocked { reason: String, generated_sql: String },

    #[error("Database connection failed: {message}")]
    Unavailable {
        message: String,
        generated_sql: String,
    },

    #[error("Database error: {message}")]
    Execution {
        message: String,
        generated_sql: String,
    },

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingQuery
            | ApiError::EmptyQuery
            | ApiError::Blocked { .. }
            | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Generation(_)
            | ApiError::Unavailable { .. }
            | ApiError::Execution { .. }
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    generated_sql: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = self.to_string();
        let generated_sql = match self {
            ApiError::Blocked { generated_sql, .. }
            | ApiError::Unavailable { generated_sql, .. }
            | ApiError::Execution { generated_sql, .. } => Some(generated_sql),
            _ => None,
        };
        (status, Json(ErrorBody {
            error,
            generated_sql,
        }))
            .into_response()
    }
}
