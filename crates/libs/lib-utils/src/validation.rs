//! # Validation Utilities
//!
//! Input validation helpers. Lengths are counted in characters, not bytes.

/// Validate that a string is not empty or whitespace-only.
pub fn validate_not_empty(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} cannot be empty", field_name))
    } else {
        Ok(())
    }
}

/// Validate that the character count lies within `min..=max`.
pub fn validate_char_range(value: &str, min: usize, max: usize, field_name: &str) -> Result<(), String> {
    let len = value.chars().count();
    if len < min {
        Err(format!("{} must be at least {} characters", field_name, min))
    } else if len > max {
        Err(format!("{} must be at most {} characters", field_name, max))
    } else {
        Ok(())
    }
}
