//! WebAssembly module for the PharmaNet console
//!
//! Lets the browser preview, before anything is uploaded:
//! - Final prices under a supplier's discount terms
//! - Shortfall quantities and restock priority
//! - Product code and percentage validation

use rust_decimal::Decimal;
use wasm_bindgen::prelude::*;
use web_sys::console;

// Re-export shared types for use in JavaScript
pub use shared::engine::*;
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {}

/// Error handed back to JavaScript, also written to the browser console
fn reject(message: &str) -> JsValue {
    let error = JsValue::from_str(message);
    console::warn_1(&error);
    error
}

fn parse_decimal(value: &str, field: &str) -> Result<Decimal, JsValue> {
    value
        .trim()
        .parse()
        .map_err(|e| reject(&format!("Invalid {}: {}", field, e)))
}

/// Price breakdown of `list_price` under the given terms, as JSON
#[wasm_bindgen]
pub fn preview_final_price(
    list_price: &str,
    commercial_discount_pct: &str,
    early_payment_discount_pct: &str,
    compound_early_payment: bool,
) -> Result<String, JsValue> {
    let terms = SupplierTerms {
        commercial_discount_pct: parse_decimal(commercial_discount_pct, "commercial discount")?,
        early_payment_discount_pct: parse_decimal(early_payment_discount_pct, "early payment discount")?,
        credit_days: 0,
    };
    validate_percentage(terms.commercial_discount_pct).map_err(reject)?;
    validate_percentage(terms.early_payment_discount_pct).map_err(reject)?;
    let list_price = parse_decimal(list_price, "list price")?;
    validate_price(list_price).map_err(reject)?;

    let policy = PricingPolicy { compound_early_payment };
    let breakdown = compute_final_price_with(list_price, &terms, policy);

    serde_json::to_string(&breakdown).map_err(|e| reject(&e.to_string()))
}

/// Units a pharmacy must buy to reach `threshold`
#[wasm_bindgen]
pub fn shortfall_quantity(threshold: i64, quantity_on_hand: i64) -> i64 {
    shortfall_qty(threshold, quantity_on_hand)
}

/// Restock priority ("Alta", "Media" or "Baja") of one product given the
/// quantity on hand in each pharmacy, as a JSON array of integers
#[wasm_bindgen]
pub fn preview_priority(threshold: i64, quantities_json: &str) -> Result<String, JsValue> {
    let quantities: Vec<i64> = serde_json::from_str(quantities_json)
        .map_err(|e| reject(&format!("Invalid quantities JSON: {}", e)))?;
    let tier = priority_for(threshold, &quantities).map_err(reject)?;
    Ok(tier.to_string())
}

fn priority_for(threshold: i64, quantities: &[i64]) -> Result<PriorityTier, &'static str> {
    validate_threshold(threshold)?;
    for &quantity in quantities {
        validate_quantity(quantity)?;
    }

    let record = ShortfallRecord {
        code: String::new(),
        description: String::new(),
        laboratory: String::new(),
        threshold,
        total_stock: quantities.iter().fold(0i64, |total, &q| total.saturating_add(q)),
        pharmacies: quantities
            .iter()
            .map(|&quantity_on_hand| PharmacyShortfall {
                pharmacy_id: Default::default(),
                quantity_on_hand,
                shortfall_qty: shortfall_qty(threshold, quantity_on_hand),
            })
            .collect(),
    };
    Ok(classify_priority(&record, &PriorityPolicy::default()))
}

/// Whether `code` is acceptable as a product code
#[wasm_bindgen]
pub fn is_valid_product_code(code: &str) -> bool {
    validate_product_code(code).is_ok()
}
