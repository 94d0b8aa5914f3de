//! Validation utilities for the PharmaNet console
//!
//! Applied at the store boundary, when records are created or edited. The
//! engine itself assumes validated input.

use rust_decimal::Decimal;

/// Longest product code accepted from a price list or inventory file
pub const MAX_PRODUCT_CODE_LEN: usize = 64;

/// Prices must fit the stored NUMERIC(14, 4) columns
pub const MAX_PRICE: Decimal = Decimal::from_parts(1_410_065_408, 2, 0, false, 0);

/// Largest quantity accepted for one pharmacy-product row
pub const MAX_QUANTITY: i64 = 1_000_000_000;

/// Largest restock or overstock threshold accepted in a query
pub const MAX_THRESHOLD: i64 = 1_000_000;

// ============================================================================
// Catalog Validations
// ============================================================================

/// Validate a product code: non-blank and reasonably short
pub fn validate_product_code(code: &str) -> Result<(), &'static str> {
    let code = code.trim();
    if code.is_empty() {
        return Err("Product code cannot be empty");
    }
    if code.len() > MAX_PRODUCT_CODE_LEN {
        return Err("Product code is too long");
    }
    Ok(())
}

/// Validate a list or discounted price
pub fn validate_price(price: Decimal) -> Result<(), &'static str> {
    if price < Decimal::ZERO {
        return Err("Price cannot be negative");
    }
    if price >= MAX_PRICE {
        return Err("Price is too large");
    }
    Ok(())
}

// ============================================================================
// Supplier Terms Validations
// ============================================================================

/// Validate a discount percentage is between 0 and 100
pub fn validate_percentage(pct: Decimal) -> Result<(), &'static str> {
    if pct < Decimal::ZERO || pct > Decimal::ONE_HUNDRED {
        return Err("Percentage must be between 0 and 100");
    }
    Ok(())
}

/// Validate supplier credit days
pub fn validate_credit_days(days: i32) -> Result<(), &'static str> {
    if days < 0 {
        return Err("Credit days cannot be negative");
    }
    Ok(())
}

// ============================================================================
// Inventory Validations
// ============================================================================

/// Validate a stock quantity
pub fn validate_quantity(quantity: i64) -> Result<(), &'static str> {
    if quantity < 0 {
        return Err("Quantity cannot be negative");
    }
    if quantity > MAX_QUANTITY {
        return Err("Quantity is too large");
    }
    Ok(())
}

/// Validate a restock or overstock threshold
pub fn validate_threshold(threshold: i64) -> Result<(), &'static str> {
    if threshold < 0 {
        return Err("Threshold cannot be negative");
    }
    if threshold > MAX_THRESHOLD {
        return Err("Threshold is too large");
    }
    Ok(())
}

/// Validate a directory name (supplier or pharmacy)
pub fn validate_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("Name is required");
    }
    Ok(())
}
