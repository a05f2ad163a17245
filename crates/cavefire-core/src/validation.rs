//! # Validation Module
//!
//! Input normalization and validation for catalog records and session edits.
//!
//! ## Two Kinds of Input
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Numbers typed by a user (quantity box, tax rate box)                   │
//! │    → NORMALIZED, never rejected: floor, clamp ≥ 0, garbage → 0          │
//! │                                                                         │
//! │  Structural data (catalog codes, attachment payloads)                   │
//! │    → VALIDATED: a bad catalog or data URL is reported as an error       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Amount;
use crate::types::TaxRate;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum length of an add-on code.
pub const MAX_CODE_LEN: usize = 50;

/// Maximum length of an add-on name.
pub const MAX_NAME_LEN: usize = 200;

// =============================================================================
// Normalizers
// =============================================================================

/// Normalizes a user-entered quantity.
///
/// ## Rules
/// ```text
/// "3"    → 3       3.7   → 3      "-2" → 0
/// ""     → 0       "abc" → 0      NaN  → 0
/// ```
/// Values above `u32::MAX` saturate.
pub fn normalize_quantity(raw: &Amount) -> u32 {
    let value = match raw {
        Amount::Number(n) => *n,
        Amount::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse::<f64>().unwrap_or(0.0)
            }
        }
    };

    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    // `as` saturates at u32::MAX
    value.floor() as u32
}

// =============================================================================
// Validators
// =============================================================================

/// Validates an add-on code.
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Only letters, digits, hyphens and underscores
///
/// ```rust
/// use cavefire_core::validation::validate_code;
///
/// assert!(validate_code("F-A-ANNUAL").is_ok());
/// assert!(validate_code("").is_err());
/// assert!(validate_code("has space").is_err());
/// ```
pub fn validate_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    if code.len() > MAX_CODE_LEN {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: MAX_CODE_LEN,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates an add-on display name (non-empty, at most 200 characters).
pub fn validate_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a tax rate (0% to 100%).
pub fn validate_tax_rate(rate: TaxRate) -> ValidationResult<()> {
    if rate.millionths() > TaxRate::SCALE {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0,
            max: 100,
        });
    }

    Ok(())
}

/// Validates an uploaded image / signature payload.
///
/// Only `data:` URLs are accepted; anything else would be a remote reference
/// that exports cannot embed.
pub fn validate_data_url(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if !value.starts_with("data:") || !value.contains(',') {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be a data: URL".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
