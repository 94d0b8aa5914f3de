//! Inventory aggregation across pharmacies.
//!
//! Groups stock rows by product code, measures each pharmacy against a
//! restock or overstock threshold, and classifies restock urgency.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    OverstockRecord, PharmacyOverstock, PharmacyShortfall, PharmacyStock, PriorityTier,
    ShortfallRecord,
};

/// Boundary between the Media and Baja tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityPolicy {
    /// A product is Media when its aggregate shortfall ratio exceeds this
    pub media_ratio: Decimal,
}

impl Default for PriorityPolicy {
    fn default() -> Self {
        Self {
            media_ratio: Decimal::new(5, 1),
        }
    }
}

/// `max(0, threshold - quantity)`
pub fn shortfall_qty(threshold: i64, quantity: i64) -> i64 {
    threshold.saturating_sub(quantity).max(0)
}

/// Products below `threshold` in at least one pharmacy, plus every product
/// out of stock anywhere. Ordered by code.
pub fn aggregate_shortfall<'a>(
    stock: impl IntoIterator<Item = &'a PharmacyStock>,
    threshold: i64,
    pharmacy_filter: Option<Uuid>,
) -> Vec<ShortfallRecord> {
    let mut groups: BTreeMap<&str, ShortfallRecord> = BTreeMap::new();

    for row in filtered(stock, pharmacy_filter) {
        let needed = shortfall_qty(threshold, row.quantity_on_hand);
        if needed == 0 && !row.is_out_of_stock() {
            continue;
        }

        let record = groups.entry(row.code.as_str()).or_insert_with(|| ShortfallRecord {
            code: row.code.clone(),
            description: String::new(),
            laboratory: String::new(),
            threshold,
            total_stock: 0,
            pharmacies: Vec::new(),
        });
        fill_reference(&mut record.description, &mut record.laboratory, row);
        record.total_stock = record.total_stock.saturating_add(row.quantity_on_hand);
        record.pharmacies.push(PharmacyShortfall {
            pharmacy_id: row.pharmacy_id,
            quantity_on_hand: row.quantity_on_hand,
            shortfall_qty: needed,
        });
    }

    groups
        .into_values()
        .map(|mut record| {
            record.pharmacies.sort_by(|a, b| {
                b.shortfall_qty
                    .cmp(&a.shortfall_qty)
                    .then_with(|| a.pharmacy_id.cmp(&b.pharmacy_id))
            });
            record
        })
        .collect()
}

/// Products held above `high_threshold` in at least one pharmacy.
/// Ordered by total excess stock descending, then code.
pub fn aggregate_overstock<'a>(
    stock: impl IntoIterator<Item = &'a PharmacyStock>,
    high_threshold: i64,
    pharmacy_filter: Option<Uuid>,
) -> Vec<OverstockRecord> {
    let mut groups: BTreeMap<&str, OverstockRecord> = BTreeMap::new();

    for row in filtered(stock, pharmacy_filter) {
        if row.quantity_on_hand <= high_threshold {
            continue;
        }

        let record = groups.entry(row.code.as_str()).or_insert_with(|| OverstockRecord {
            code: row.code.clone(),
            description: String::new(),
            laboratory: String::new(),
            threshold: high_threshold,
            total_stock: 0,
            pharmacies: Vec::new(),
        });
        fill_reference(&mut record.description, &mut record.laboratory, row);
        record.total_stock = record.total_stock.saturating_add(row.quantity_on_hand);
        record.pharmacies.push(PharmacyOverstock {
            pharmacy_id: row.pharmacy_id,
            quantity_on_hand: row.quantity_on_hand,
            excess_qty: row.quantity_on_hand - high_threshold,
        });
    }

    let mut records: Vec<OverstockRecord> = groups.into_values().collect();
    for record in &mut records {
        record.pharmacies.sort_by(|a, b| {
            b.excess_qty
                .cmp(&a.excess_qty)
                .then_with(|| a.pharmacy_id.cmp(&b.pharmacy_id))
        });
    }
    records.sort_by(|a, b| b.total_stock.cmp(&a.total_stock).then_with(|| a.code.cmp(&b.code)));
    records
}

/// Restock urgency of a shortfall record.
///
/// Alta when any pharmacy is at zero. Otherwise Media when the summed
/// shortfall over the summed threshold of the pharmacies below it exceeds
/// `policy.media_ratio`, else Baja.
pub fn classify_priority(record: &ShortfallRecord, policy: &PriorityPolicy) -> PriorityTier {
    if record.has_zero_stock() {
        return PriorityTier::Alta;
    }

    let affected = record.pharmacies.iter().filter(|p| p.shortfall_qty > 0).count() as i64;
    let capacity = record.threshold.saturating_mul(affected);
    if capacity <= 0 {
        return PriorityTier::Baja;
    }

    let ratio = Decimal::from(record.total_needed()) / Decimal::from(capacity);
    if ratio > policy.media_ratio {
        PriorityTier::Media
    } else {
        PriorityTier::Baja
    }
}

fn filtered<'a>(
    stock: impl IntoIterator<Item = &'a PharmacyStock>,
    pharmacy_filter: Option<Uuid>,
) -> impl Iterator<Item = &'a PharmacyStock> {
    stock
        .into_iter()
        .filter(move |row| pharmacy_filter.map_or(true, |id| row.pharmacy_id == id))
}

fn fill_reference(description: &mut String, laboratory: &mut String, row: &PharmacyStock) {
    if description.is_empty() {
        if let Some(d) = row.description.as_deref() {
            *description = d.to_string();
        }
    }
    if laboratory.is_empty() {
        if let Some(l) = row.laboratory.as_deref() {
            *laboratory = l.to_string();
        }
    }
}
