//! Purchase consolidation: joins shortfalls with best offers into one
//! network-wide purchase plan.

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::engine::aggregation::{classify_priority, PriorityPolicy};
use crate::models::{
    ComparisonResult, ConsolidationReport, ConsolidationSummary, OrderLine,
    PurchaseRecommendation, ShortfallRecord,
};

/// Build the purchase plan for `shortfalls`.
///
/// `comparisons` is keyed by product code. A product missing from it, or
/// with no offers, is still listed with `unit_price = None` and left out of
/// the estimated value. Products are ordered by priority, then units needed
/// descending, then code.
pub fn consolidate(
    shortfalls: Vec<ShortfallRecord>,
    comparisons: &HashMap<String, ComparisonResult>,
    policy: &PriorityPolicy,
) -> ConsolidationReport {
    let mut products: Vec<PurchaseRecommendation> = shortfalls
        .into_iter()
        .map(|record| {
            let comparison = comparisons.get(&record.code);
            recommend(record, comparison, policy)
        })
        .collect();

    products.sort_by(|a, b| {
        a.priority
            .rank()
            .cmp(&b.priority.rank())
            .then_with(|| b.total_needed.cmp(&a.total_needed))
            .then_with(|| a.code.cmp(&b.code))
    });

    let summary = summarize(&products);
    ConsolidationReport { products, summary }
}

/// Order lines for every priced recommendation that needs units
pub fn order_lines(report: &ConsolidationReport) -> Vec<OrderLine> {
    report
        .products
        .iter()
        .filter(|p| p.total_needed > 0)
        .filter_map(|p| {
            Some(OrderLine {
                code: p.code.clone(),
                supplier_id: p.best_supplier_id?,
                quantity: p.total_needed,
                price: p.unit_price?,
            })
        })
        .collect()
}

fn recommend(
    record: ShortfallRecord,
    comparison: Option<&ComparisonResult>,
    policy: &PriorityPolicy,
) -> PurchaseRecommendation {
    let priority = classify_priority(&record, policy);
    let total_needed = record.total_needed();
    let zero_stock_pharmacies = record.zero_stock_pharmacies();
    let best = comparison.and_then(|c| c.best());

    let mut description = record.description;
    let mut laboratory = record.laboratory;
    if let Some(c) = comparison {
        if description.is_empty() {
            description = c.description.clone();
        }
        if laboratory.is_empty() {
            laboratory = c.laboratory.clone();
        }
    }

    let unit_price = best.map(|o| o.final_price);

    PurchaseRecommendation {
        code: record.code,
        description,
        laboratory,
        total_needed,
        unit_price,
        best_supplier_id: best.map(|o| o.supplier_id),
        best_supplier_name: best.map(|o| o.supplier_name.clone()),
        total_value: unit_price.map(|price| price.saturating_mul(Decimal::from(total_needed))),
        priority,
        zero_stock_pharmacies,
        detail_by_pharmacy: record.pharmacies,
    }
}

fn summarize(products: &[PurchaseRecommendation]) -> ConsolidationSummary {
    products
        .iter()
        .fold(ConsolidationSummary::default(), |mut summary, p| {
            summary.total_distinct_products += 1;
            summary.total_units_needed = summary.total_units_needed.saturating_add(p.total_needed);
            match p.total_value {
                Some(value) => {
                    summary.total_estimated_value = summary.total_estimated_value.saturating_add(value)
                }
                None => summary.unpriced_products += 1,
            }
            summary.by_priority.record(p.priority);
            summary
        })
}
