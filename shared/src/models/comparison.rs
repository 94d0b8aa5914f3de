//! Derived price comparison records

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Price of one offer after the supplier's discount layers
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    pub list_price: Decimal,
    /// List price, or the discounted price printed on the list when lower
    pub base_price: Decimal,
    pub commercial_discount_amount: Decimal,
    /// Price used for ranking
    pub final_price: Decimal,
    /// `list_price - final_price`
    pub savings_total: Decimal,
    /// Extra discount available when paying early
    pub early_payment_discount_amount: Decimal,
    pub price_with_early_payment: Decimal,
}

/// One supplier's entry in a product comparison
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RankedOffer {
    pub supplier_id: Uuid,
    pub supplier_name: String,
    pub list_price: Decimal,
    pub base_price: Decimal,
    pub final_price: Decimal,
    pub is_best: bool,
    /// Savings against the list price
    pub savings: Decimal,
    pub commercial_discount_pct: Decimal,
    pub commercial_discount_amount: Decimal,
    pub early_payment_discount_pct: Decimal,
    pub early_payment_discount_amount: Decimal,
    pub price_with_early_payment: Decimal,
    pub credit_days: i32,
    pub diff_from_best: Decimal,
    pub pct_diff_from_best: Decimal,
}

/// All offers for a product, cheapest first
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub code: String,
    pub description: String,
    #[serde(rename = "lab")]
    pub laboratory: String,
    pub offers: Vec<RankedOffer>,
}

impl ComparisonResult {
    /// Comparison for a product no supplier carries
    pub fn empty(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            description: String::new(),
            laboratory: String::new(),
            offers: Vec::new(),
        }
    }

    pub fn is_carried(&self) -> bool {
        !self.offers.is_empty()
    }

    pub fn best(&self) -> Option<&RankedOffer> {
        self.offers.first().filter(|o| o.is_best)
    }

    pub fn best_price(&self) -> Option<Decimal> {
        self.best().map(|o| o.final_price)
    }
}
