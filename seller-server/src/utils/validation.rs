//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! Field checks mirror the API contract: each endpoint validates its fields
//! in order and returns the first failing field's message.

use surrealdb::RecordId;

use shared::{AppError, AppResult};

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: product, bundle, category, sale, etc.
pub const MAX_NAME_LEN: usize = 200;

/// Descriptions (product, bundle, shop)
pub const MAX_DESCRIPTION_LEN: usize = 2000;

/// Short identifiers: phone, tax id, license number, etc.
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// URLs
pub const MAX_URL_LEN: usize = 2048;

/// Addresses
pub const MAX_ADDRESS_LEN: usize = 500;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> AppResult<()> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

/// Validate a percentage value (0..=100).
pub fn validate_percentage(value: f64, field: &str) -> AppResult<()> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(AppError::validation(format!(
            "Invalid {field}: must be a number between 0 and 100"
        )));
    }
    Ok(())
}

/// Validate a strictly positive price value.
pub fn validate_positive_price(value: f64, field: &str) -> AppResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(AppError::validation(format!(
            "Invalid or missing {field}: must be a positive number"
        )));
    }
    Ok(())
}

/// Validate a strictly positive integer quantity.
pub fn validate_positive_quantity(value: i64, field: &str) -> AppResult<()> {
    if value <= 0 {
        return Err(AppError::validation(format!(
            "Invalid {field}: must be a positive integer"
        )));
    }
    Ok(())
}

// ── Record ID parsing ───────────────────────────────────────────────

/// Parse an entity id received over the API into a [`RecordId`].
///
/// Accepts either the full `"table:id"` form or the bare key; rejects ids
/// that belong to a different table.
pub fn parse_record_id(table: &str, id: &str) -> AppResult<RecordId> {
    let invalid = || AppError::validation(format!("Invalid {table} ID format"));

    if id.trim().is_empty() {
        return Err(invalid());
    }

    match id.split_once(':') {
        Some((tb, key)) => {
            if tb != table || key.is_empty() {
                return Err(invalid());
            }
            // Strip SurrealDB angle-bracket escaping if present
            let key = key.trim_start_matches('⟨').trim_end_matches('⟩');
            Ok(RecordId::from_table_key(table, key))
        }
        None => Ok(RecordId::from_table_key(table, id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text() {
        assert!(validate_required_text("Widget", "name", MAX_NAME_LEN).is_ok());
        assert!(validate_required_text("", "name", MAX_NAME_LEN).is_err());
        assert!(validate_required_text("   ", "name", MAX_NAME_LEN).is_err());
        assert!(validate_required_text(&"x".repeat(MAX_NAME_LEN + 1), "name", MAX_NAME_LEN).is_err());
    }

    #[test]
    fn test_percentage() {
        assert!(validate_percentage(0.0, "discount").is_ok());
        assert!(validate_percentage(100.0, "discount").is_ok());
        assert!(validate_percentage(-1.0, "discount").is_err());
        assert!(validate_percentage(100.5, "discount").is_err());
        assert!(validate_percentage(f64::NAN, "discount").is_err());
    }

    #[test]
    fn test_positive_price() {
        assert!(validate_positive_price(0.01, "MRP").is_ok());
        assert!(validate_positive_price(0.0, "MRP").is_err());
        assert!(validate_positive_price(-5.0, "MRP").is_err());
    }

    #[test]
    fn test_positive_quantity() {
        assert!(validate_positive_quantity(1, "quantity").is_ok());
        assert!(validate_positive_quantity(0, "quantity").is_err());
        assert!(validate_positive_quantity(-3, "quantity").is_err());
    }

    #[test]
    fn test_parse_record_id() {
        let id = parse_record_id("product", "product:abc123").unwrap();
        assert_eq!(id.table(), "product");
        assert_eq!(id.key().to_string(), "abc123");

        let bare = parse_record_id("product", "abc123").unwrap();
        assert_eq!(bare, id);

        assert!(parse_record_id("product", "bundle:abc123").is_err());
        assert!(parse_record_id("product", "").is_err());
        assert!(parse_record_id("product", "product:").is_err());
    }
}
