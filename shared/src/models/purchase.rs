//! Shortfall, overstock and purchase recommendation records

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Restock urgency of a product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PriorityTier {
    /// At least one pharmacy is out of stock
    Alta,
    Media,
    Baja,
}

impl PriorityTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriorityTier::Alta => "Alta",
            PriorityTier::Media => "Media",
            PriorityTier::Baja => "Baja",
        }
    }

    /// Sort rank, most urgent first
    pub fn rank(&self) -> u8 {
        match self {
            PriorityTier::Alta => 0,
            PriorityTier::Media => 1,
            PriorityTier::Baja => 2,
        }
    }
}

impl fmt::Display for PriorityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown priority tier: {0}")]
pub struct ParsePriorityError(pub String);

impl FromStr for PriorityTier {
    type Err = ParsePriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "alta" => Ok(PriorityTier::Alta),
            "media" => Ok(PriorityTier::Media),
            "baja" => Ok(PriorityTier::Baja),
            other => Err(ParsePriorityError(other.to_string())),
        }
    }
}

/// Deficit of one pharmacy for one product
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PharmacyShortfall {
    pub pharmacy_id: Uuid,
    pub quantity_on_hand: i64,
    pub shortfall_qty: i64,
}

/// Per-product shortfall across the affected pharmacies
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ShortfallRecord {
    pub code: String,
    pub description: String,
    #[serde(rename = "lab")]
    pub laboratory: String,
    pub threshold: i64,
    /// Stock held by the affected pharmacies
    pub total_stock: i64,
    pub pharmacies: Vec<PharmacyShortfall>,
}

impl ShortfallRecord {
    pub fn total_needed(&self) -> i64 {
        self.pharmacies
            .iter()
            .fold(0i64, |total, p| total.saturating_add(p.shortfall_qty))
    }

    pub fn zero_stock_pharmacies(&self) -> usize {
        self.pharmacies
            .iter()
            .filter(|p| p.quantity_on_hand == 0)
            .count()
    }

    pub fn has_zero_stock(&self) -> bool {
        self.zero_stock_pharmacies() > 0
    }
}

/// Excess of one pharmacy for one product
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PharmacyOverstock {
    pub pharmacy_id: Uuid,
    pub quantity_on_hand: i64,
    pub excess_qty: i64,
}

/// Per-product overstock across pharmacies
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OverstockRecord {
    pub code: String,
    pub description: String,
    #[serde(rename = "lab")]
    pub laboratory: String,
    pub threshold: i64,
    pub total_stock: i64,
    pub pharmacies: Vec<PharmacyOverstock>,
}

/// Restock suggestion for one product across the network
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRecommendation {
    pub code: String,
    pub description: String,
    #[serde(rename = "lab")]
    pub laboratory: String,
    pub total_needed: i64,
    /// Best final price; `None` when no supplier carries the product
    pub unit_price: Option<Decimal>,
    pub best_supplier_id: Option<Uuid>,
    pub best_supplier_name: Option<String>,
    pub total_value: Option<Decimal>,
    pub priority: PriorityTier,
    pub zero_stock_pharmacies: usize,
    pub detail_by_pharmacy: Vec<PharmacyShortfall>,
}

/// Recommendation counts per priority tier
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TierCounts {
    pub alta: usize,
    pub media: usize,
    pub baja: usize,
}

impl TierCounts {
    pub fn record(&mut self, tier: PriorityTier) {
        match tier {
            PriorityTier::Alta => self.alta += 1,
            PriorityTier::Media => self.media += 1,
            PriorityTier::Baja => self.baja += 1,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidationSummary {
    pub total_distinct_products: usize,
    pub total_units_needed: i64,
    /// Excludes products without any offer
    pub total_estimated_value: Decimal,
    pub unpriced_products: usize,
    pub by_priority: TierCounts,
}

/// Cross-network purchase plan
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidationReport {
    pub products: Vec<PurchaseRecommendation>,
    pub summary: ConsolidationSummary,
}

/// Order line handed to the order subsystem
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub code: String,
    pub supplier_id: Uuid,
    pub quantity: i64,
    pub price: Decimal,
}
