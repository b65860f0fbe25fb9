//! Validation helper functions for configuration types.

use crate::core::errors::{CommentaryError, Result};

/// Validate that a usize value is greater than zero.
pub fn validate_positive_usize(value: usize, field: &str) -> Result<()> {
    if value == 0 {
        return Err(CommentaryError::validation_field(
            format!("{} must be greater than 0", field),
            field,
        ));
    }
    Ok(())
}

/// Validate that an f64 value is in the unit range [0.0, 1.0].
pub fn validate_unit_range(value: f64, field: &str) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(CommentaryError::validation_field(
            format!("{} must be between 0.0 and 1.0", field),
            field,
        ));
    }
    Ok(())
}

/// Validate that an optional limit, when present, is greater than zero.
pub fn validate_optional_positive(value: Option<u64>, field: &str) -> Result<()> {
    match value {
        Some(0) => Err(CommentaryError::validation_field(
            format!("{} must be greater than 0 when set", field),
            field,
        )),
        _ => Ok(()),
    }
}
