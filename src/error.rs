//! Domain error types.
//!
//! Uses thiserror for ergonomic error handling with automatic Display implementations.

use actix_web::{HttpResponse, ResponseError};
use std::collections::BTreeMap;
use std::fmt;

/// Application-level errors.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed
    #[error("Database error: {0}")]
    Database(String),

    /// Resource not found
    #[error("{0} not found")]
    NotFound(String),

    /// Malformed or semantically invalid input, keyed by field
    #[error("Validation failed: {}", format_fields(.0))]
    Validation(BTreeMap<String, String>),

    /// Reparenting a tree node under its own descendant
    #[error("Cannot move a node under its own descendant")]
    TreeCycle,

    /// Tree Store detected an impossible interval state during rebuild
    #[error("Tree consistency violation: {0}")]
    Consistency(String),
}

impl AppError {
    /// Single-field validation error.
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(field.to_string(), message.into());
        AppError::Validation(fields)
    }
}

fn format_fields(fields: &BTreeMap<String, String>) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{}: {}", k, v))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let (status, error_code, response_message, fields) = match self {
            AppError::Database(err_str) => {
                tracing::error!("Database error: {}", err_str);
                (
                    actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "An internal database error occurred".to_string(),
                    None,
                )
            }
            AppError::NotFound(_) => (
                actix_web::http::StatusCode::NOT_FOUND,
                "NOT_FOUND",
                self.to_string(),
                None,
            ),
            AppError::Validation(f) => (
                actix_web::http::StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "Validation failed".to_string(),
                Some(f.clone()),
            ),
            AppError::TreeCycle => (
                actix_web::http::StatusCode::BAD_REQUEST,
                "TREE_CYCLE",
                self.to_string(),
                None,
            ),
            AppError::Consistency(err_str) => {
                // Never leak tree-encoding internals to callers.
                tracing::error!("Tree consistency violation: {}", err_str);
                (
                    actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "CONSISTENCY_ERROR",
                    "The operation failed and was rolled back".to_string(),
                    None,
                )
            }
        };

        HttpResponse::build(status).json(ErrorResponse {
            error: error_code.to_string(),
            message: response_message,
            fields,
        })
    }
}

/// Error response body matching the OpenAPI schema.
#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    /// Field-keyed validation messages, present for VALIDATION_ERROR only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, String>>,
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

// Conversion implementations for common error types

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::validation("body", format!("JSON parsing error: {}", err))
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::validation("id", format!("Invalid UUID: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_is_field_keyed() {
        let err = AppError::validation("due_date", "must be after started_at");
        assert_eq!(
            err.to_string(),
            "Validation failed: due_date: must be after started_at"
        );
    }

    #[test]
    fn test_tree_cycle_display() {
        assert_eq!(
            AppError::TreeCycle.to_string(),
            "Cannot move a node under its own descendant"
        );
    }
}
