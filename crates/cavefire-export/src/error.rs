//! # Export Error Types
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  csv::Error / std::io::Error / minijinja::Error / docx packaging        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ExportError (this module)                                              │
//! │       │                                                                 │
//! │       ├──► ApiError::ExportFailed (500)   in apps/api                   │
//! │       └──► anyhow::Error (exit 1)         in apps/cli                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    /// The CSV writer rejected a record.
    #[error("CSV export failed: {0}")]
    Csv(#[from] ::csv::Error),

    /// Flushing the in-memory writer failed.
    #[error("I/O error during export: {0}")]
    Io(#[from] std::io::Error),

    /// The HTML template failed to load or render.
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    /// Packaging the DOCX archive failed.
    #[error("DOCX export failed: {0}")]
    Docx(String),

    /// Rendered output was not valid UTF-8.
    #[error("Export produced invalid UTF-8")]
    Encoding,
}

pub type ExportResult<T> = Result<T, ExportError>;
