//! Supplier, supplier terms and price-list offers

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Commercial terms a supplier grants on every product of its price list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SupplierTerms {
    /// Discount applied to every list price, 0-100
    pub commercial_discount_pct: Decimal,
    /// Additional discount when paying early, 0-100
    pub early_payment_discount_pct: Decimal,
    pub credit_days: i32,
}

/// A supplier in the directory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: Uuid,
    pub name: String,
    pub contact: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    /// Inactive suppliers keep their records but drop out of comparisons
    #[serde(default = "enabled")]
    pub active: bool,
    #[serde(flatten)]
    pub terms: SupplierTerms,
    pub created_at: DateTime<Utc>,
}

fn enabled() -> bool {
    true
}

/// One row of a supplier price list, keyed by (supplier_id, code)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SupplierOffer {
    pub supplier_id: Uuid,
    pub code: String,
    pub description: String,
    #[serde(rename = "lab")]
    pub laboratory: String,
    pub list_price: Decimal,
    /// Discounted price printed on the price list itself, when the supplier
    /// publishes one next to the list price
    pub discounted_price: Option<Decimal>,
    /// Listed but currently out of stock at the supplier
    #[serde(default = "enabled")]
    pub available: bool,
    pub updated_at: DateTime<Utc>,
}

impl SupplierOffer {
    /// Build a fresh offer from an uploaded row
    pub fn from_row(supplier_id: Uuid, row: &OfferRow, now: DateTime<Utc>) -> Self {
        Self {
            supplier_id,
            code: row.code.trim().to_string(),
            description: row.description.trim().to_string(),
            laboratory: row.laboratory.trim().to_string(),
            list_price: row.list_price,
            discounted_price: row.discounted_price,
            available: row.available,
            updated_at: now,
        }
    }

    /// Whether applying `row` would change anything stored for this offer
    pub fn differs_from(&self, row: &OfferRow) -> bool {
        self.description != row.description.trim()
            || self.laboratory != row.laboratory.trim()
            || self.list_price != row.list_price
            || self.discounted_price != row.discounted_price
            || self.available != row.available
    }
}

/// A parsed price-list row as received from the upload boundary
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OfferRow {
    pub code: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "lab", default)]
    pub laboratory: String,
    pub list_price: Decimal,
    #[serde(default)]
    pub discounted_price: Option<Decimal>,
    #[serde(default = "enabled")]
    pub available: bool,
}

impl OfferRow {
    pub fn new(code: &str, description: &str, laboratory: &str, list_price: Decimal) -> Self {
        Self {
            code: code.to_string(),
            description: description.to_string(),
            laboratory: laboratory.to_string(),
            list_price,
            discounted_price: None,
            available: true,
        }
    }
}

/// Result of merging a price list into the catalog
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpsertOutcome {
    pub inserted: usize,
    pub updated: usize,
    /// Rows whose values were clamped instead of rejected
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub anomalies: Vec<String>,
}
