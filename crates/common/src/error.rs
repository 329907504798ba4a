//! Error types for the school registry.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, SqlErr};
use serde_json::json;
use thiserror::Error;

/// Application result type.
pub type AppResult<T> = Result<T, AppError>;

/// Application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // === Client Errors ===
    /// The primary resource of the request does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Some ids of a bulk request did not resolve.
    #[error("{kind} not found: {}", ids.join(", "))]
    MissingIds {
        /// Plural entity label, e.g. `Classes`.
        kind: &'static str,
        /// The ids that did not resolve, in request order.
        ids: Vec<String>,
    },

    /// A name or key is already taken.
    #[error("Duplicate: {0}")]
    Duplicate(String),

    /// Deletion blocked by enrolled students.
    #[error("Has dependents: {0}")]
    HasDependents(String),

    /// An input field points at a row that does not exist.
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    /// Malformed request.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Input failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    // === Server Errors ===
    /// Unclassified database failure.
    #[error("Database error: {0}")]
    Database(String),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Anything else.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            // 4xx Client Errors
            Self::NotFound(_) | Self::MissingIds { .. } => StatusCode::NOT_FOUND,
            Self::Duplicate(_)
            | Self::HasDependents(_)
            | Self::InvalidReference(_)
            | Self::BadRequest(_)
            | Self::Validation(_) => StatusCode::BAD_REQUEST,

            // 5xx Server Errors
            Self::Database(_) | Self::Config(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::MissingIds { .. } => "IDS_NOT_FOUND",
            Self::Duplicate(_) => "DUPLICATE",
            Self::HasDependents(_) => "HAS_DEPENDENTS",
            Self::InvalidReference(_) => "INVALID_REFERENCE",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns whether this error should be logged at error level.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Classify a database error.
    ///
    /// Unique-constraint violations that slip past the service-level
    /// duplicate checks surface as [`AppError::Duplicate`].
    #[must_use]
    pub fn from_db(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => Self::Duplicate(detail),
            Some(SqlErr::ForeignKeyConstraintViolation(detail)) => Self::InvalidReference(detail),
            _ => Self::Database(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        // Log server errors
        if self.is_server_error() {
            tracing::error!(error = %self, code = code, "Server error occurred");
        } else {
            tracing::debug!(error = %self, code = code, "Client error occurred");
        }

        let mut error = json!({
            "code": code,
            "message": self.to_string(),
        });
        if let Self::MissingIds { ids, .. } = &self {
            error["ids"] = json!(ids);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

// === From implementations ===

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        Self::from_db(err)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::NotFound("class".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Duplicate("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::HasDependents("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::InvalidReference("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert!(AppError::Database("down".into()).is_server_error());
    }

    #[test]
    fn test_missing_ids_message_lists_ids() {
        let err = AppError::MissingIds {
            kind: "Classes",
            ids: vec!["a".into(), "b".into()],
        };
        assert_eq!(err.to_string(), "Classes not found: a, b");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.error_code(), "IDS_NOT_FOUND");
    }

    #[test]
    fn test_plain_db_error_is_server_error() {
        let err = AppError::from_db(DbErr::Custom("boom".into()));
        assert!(matches!(err, AppError::Database(_)));
    }
}
