//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Handler returns Result<T, ApiError>                                    │
//! │       │                                                                 │
//! │       ├── CoreError::UnknownAddon ──────► 400 UNKNOWN_ADDON             │
//! │       ├── CoreError::Validation ────────► 400 VALIDATION_ERROR          │
//! │       ├── ExportError ── (logged) ──────► 500 EXPORT_FAILED             │
//! │       └── Json rejection (axum) ────────► 400 / 415 / 422               │
//! │                                                                         │
//! │  Body: { "code": "UNKNOWN_ADDON", "message": "Add-on not found: X" }    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use cavefire_core::CoreError;
use cavefire_export::ExportError;
use serde::Serialize;

/// Error body returned by every failing endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input validation failed (400)
    ValidationError,

    /// A referenced add-on code does not exist (400)
    UnknownAddon,

    /// Rendering an export failed (500)
    ExportFailed,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::ValidationError | ErrorCode::UnknownAddon => StatusCode::BAD_REQUEST,
            ErrorCode::ExportFailed | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UnknownAddon(_) => ApiError::new(ErrorCode::UnknownAddon, err.to_string()),
            CoreError::Validation(_)
            | CoreError::InvalidProposal(_)
            | CoreError::InvalidCatalog(_)
            | CoreError::DuplicateCode(_) => ApiError::validation(err.to_string()),
        }
    }
}

/// Converts export errors to API errors.
impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        // Log the actual error but return a generic message
        tracing::error!(error = %err, "Export failed");
        ApiError::new(ErrorCode::ExportFailed, "Failed to render export")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}
