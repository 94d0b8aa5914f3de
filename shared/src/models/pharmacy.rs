//! Pharmacies and their stock levels

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::percent_of;

/// A pharmacy of the network
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pharmacy {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Pharmacy-level promotional discount, valid only on `date`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DailyDiscount {
    pub pct: Decimal,
    pub date: NaiveDate,
}

impl DailyDiscount {
    /// A daily discount expires at midnight
    pub fn is_active_on(&self, today: NaiveDate) -> bool {
        self.date == today
    }
}

/// Stock of one product in one pharmacy, keyed by (pharmacy_id, code)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PharmacyStock {
    pub pharmacy_id: Uuid,
    pub code: String,
    pub description: Option<String>,
    #[serde(rename = "lab")]
    pub laboratory: Option<String>,
    pub quantity_on_hand: i64,
    pub unit_price: Option<Decimal>,
    pub expiry_date: Option<NaiveDate>,
    pub daily_discount: Option<DailyDiscount>,
    pub updated_at: DateTime<Utc>,
}

impl PharmacyStock {
    pub fn from_row(pharmacy_id: Uuid, row: &StockRow, now: DateTime<Utc>) -> Self {
        Self {
            pharmacy_id,
            code: row.code.trim().to_string(),
            description: row.description.clone(),
            laboratory: row.laboratory.clone(),
            quantity_on_hand: row.quantity,
            unit_price: row.unit_price,
            expiry_date: row.expiry_date,
            daily_discount: None,
            updated_at: now,
        }
    }

    /// Whether applying `row` would change anything stored for this stock entry
    pub fn differs_from(&self, row: &StockRow) -> bool {
        self.quantity_on_hand != row.quantity
            || self.description != row.description
            || self.laboratory != row.laboratory
            || self.unit_price != row.unit_price
            || self.expiry_date != row.expiry_date
    }

    pub fn is_out_of_stock(&self) -> bool {
        self.quantity_on_hand == 0
    }

    /// Daily discount percentage in effect on `today`, if any
    pub fn effective_daily_discount(&self, today: NaiveDate) -> Option<Decimal> {
        self.daily_discount
            .filter(|d| d.is_active_on(today))
            .map(|d| d.pct)
    }

    /// Unit price after the daily discount in effect on `today`
    pub fn shelf_price(&self, today: NaiveDate) -> Option<Decimal> {
        let price = self.unit_price?;
        Some(match self.effective_daily_discount(today) {
            Some(pct) => price - percent_of(price, pct),
            None => price,
        })
    }
}

/// An inventory re-import row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StockRow {
    pub code: String,
    pub quantity: i64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "lab", default)]
    pub laboratory: Option<String>,
    #[serde(default)]
    pub unit_price: Option<Decimal>,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
}

impl StockRow {
    pub fn new(code: &str, quantity: i64) -> Self {
        Self {
            code: code.to_string(),
            quantity,
            description: None,
            laboratory: None,
            unit_price: None,
            expiry_date: None,
        }
    }
}
