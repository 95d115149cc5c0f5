//! Validation utilities for Stockroom

use validator::ValidationError;

// ============================================================================
// Catalog Validations
// ============================================================================

/// Longest accepted SKU
pub const MAX_SKU_LENGTH: usize = 64;

/// Validate SKU format: non-empty, no surrounding or inner whitespace
pub fn validate_sku(sku: &str) -> Result<(), &'static str> {
    if sku.is_empty() {
        return Err("SKU is required");
    }
    if sku.len() > MAX_SKU_LENGTH {
        return Err("SKU must be at most 64 characters");
    }
    if sku.chars().any(char::is_whitespace) {
        return Err("SKU cannot contain whitespace");
    }
    Ok(())
}

/// Adapter for `#[validate(custom = ...)]`
pub fn validate_sku_format(sku: &str) -> Result<(), ValidationError> {
    validate_sku(sku).map_err(|msg| {
        let mut error = ValidationError::new("sku");
        error.message = Some(msg.into());
        error
    })
}

// ============================================================================
// Ledger Validations
// ============================================================================

/// Movement quantities are magnitudes and must be strictly positive
pub fn validate_quantity(quantity: i32) -> Result<(), &'static str> {
    if quantity <= 0 {
        return Err("Quantity must be a positive integer");
    }
    Ok(())
}
