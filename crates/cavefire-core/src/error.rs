//! # Error Types
//!
//! Domain-specific error types for cavefire-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  cavefire-core errors (this file)                                      │
//! │  ├── CoreError        - Catalog / session / proposal failures          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  cavefire-export errors (separate crate)                               │
//! │  └── ExportError      - CSV writer / template failures                 │
//! │                                                                         │
//! │  HTTP API errors (apps/api)                                            │
//! │  └── ApiError         - What the browser sees (serialized)             │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → Frontend               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The calculator itself has no error type: malformed numbers degrade to
//! zero. Errors here cover structural problems (unknown codes, bad catalog).

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

#[derive(Debug, Error)]
pub enum CoreError {
    /// A code was referenced that the catalog or session does not contain.
    #[error("Add-on not found: {0}")]
    UnknownAddon(String),

    /// Two catalog entries share a code.
    #[error("Duplicate add-on code in catalog: {0}")]
    DuplicateCode(String),

    /// The catalog document is not a JSON array of add-on records.
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    /// The proposal document could not be parsed.
    #[error("Invalid proposal: {0}")]
    InvalidProposal(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (bad code characters, not a data URL).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
