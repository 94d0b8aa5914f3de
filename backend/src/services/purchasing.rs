//! Purchasing service: shortfall and overstock aggregation, and the
//! cross-network purchase plan built from them

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::Serialize;
use shared::engine::{aggregate_overstock, aggregate_shortfall, consolidate, order_lines, PriorityPolicy};
use shared::models::{ConsolidationReport, OrderLine, OverstockRecord, ShortfallRecord};
use shared::validation::validate_threshold;
use uuid::Uuid;

use crate::error::{check, AppError, AppResult};
use crate::services::ComparisonService;
use crate::store::{Directory, StockStore};
use crate::AppState;

/// Pharmacies listed in the shortfall statistics
const MOST_AFFECTED_LIMIT: usize = 5;

#[derive(Clone)]
pub struct PurchasingService {
    stock: Arc<StockStore>,
    directory: Arc<Directory>,
    comparison: ComparisonService,
    priority: PriorityPolicy,
    default_shortfall_threshold: i64,
    default_overstock_threshold: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AffectedPharmacy {
    pub pharmacy_id: Uuid,
    pub name: String,
    pub products_in_shortfall: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShortfallStats {
    pub threshold: i64,
    pub total_products_in_shortfall: usize,
    /// Pharmacy-product rows with nothing on hand
    pub zero_stock_rows: usize,
    /// Pharmacy-product rows below threshold but not empty
    pub low_stock_rows: usize,
    pub most_affected_pharmacies: Vec<AffectedPharmacy>,
}

impl PurchasingService {
    pub fn new(state: &AppState) -> Self {
        let engine = &state.config.engine;
        Self {
            stock: state.stock.clone(),
            directory: state.directory.clone(),
            comparison: ComparisonService::new(state),
            priority: engine.priority_policy(),
            default_shortfall_threshold: engine.shortfall_threshold,
            default_overstock_threshold: engine.overstock_threshold,
        }
    }

    fn resolve(&self, threshold: Option<i64>, default: i64, pharmacy: Option<Uuid>) -> AppResult<i64> {
        let threshold = threshold.unwrap_or(default);
        check("threshold", validate_threshold(threshold))?;
        if let Some(id) = pharmacy {
            if self.directory.pharmacy(id).is_none() {
                return Err(AppError::NotFound("Pharmacy".to_string()));
            }
        }
        Ok(threshold)
    }

    /// Products below `threshold` in some pharmacy, plus anything out of stock
    pub fn shortfall(&self, threshold: Option<i64>, pharmacy: Option<Uuid>) -> AppResult<Vec<ShortfallRecord>> {
        let threshold = self.resolve(threshold, self.default_shortfall_threshold, pharmacy)?;
        let snapshot = self.stock.snapshot();
        Ok(aggregate_shortfall(snapshot.rows(), threshold, pharmacy))
    }

    /// Products held above `threshold` in some pharmacy
    pub fn overstock(&self, threshold: Option<i64>, pharmacy: Option<Uuid>) -> AppResult<Vec<OverstockRecord>> {
        let threshold = self.resolve(threshold, self.default_overstock_threshold, pharmacy)?;
        let snapshot = self.stock.snapshot();
        Ok(aggregate_overstock(snapshot.rows(), threshold, pharmacy))
    }

    /// Purchase plan: every shortfall product with its best offer and
    /// priority tier, plus network totals
    pub async fn consolidate(
        &self,
        threshold: Option<i64>,
        pharmacy: Option<Uuid>,
    ) -> AppResult<ConsolidationReport> {
        let shortfalls = self.shortfall(threshold, pharmacy)?;
        let codes: Vec<String> = shortfalls.iter().map(|r| r.code.clone()).collect();

        let comparisons: HashMap<String, _> = self
            .comparison
            .compare_many(codes, None)
            .await?
            .into_iter()
            .map(|c| (c.code.clone(), c))
            .collect();

        let report = consolidate(shortfalls, &comparisons, &self.priority);
        tracing::debug!(
            products = report.summary.total_distinct_products,
            units = report.summary.total_units_needed,
            value = %report.summary.total_estimated_value,
            "purchase plan consolidated"
        );
        Ok(report)
    }

    /// `{code, supplierId, quantity, price}` tuples for the order subsystem
    pub async fn order_lines(&self, threshold: Option<i64>, pharmacy: Option<Uuid>) -> AppResult<Vec<OrderLine>> {
        let report = self.consolidate(threshold, pharmacy).await?;
        Ok(order_lines(&report))
    }

    pub fn shortfall_stats(&self, threshold: Option<i64>) -> AppResult<ShortfallStats> {
        let records = self.shortfall(threshold, None)?;
        let threshold = threshold.unwrap_or(self.default_shortfall_threshold);

        let mut zero_stock_rows = 0;
        let mut low_stock_rows = 0;
        let mut per_pharmacy: BTreeMap<Uuid, usize> = BTreeMap::new();
        for entry in records.iter().flat_map(|r| &r.pharmacies) {
            if entry.quantity_on_hand == 0 {
                zero_stock_rows += 1;
            } else {
                low_stock_rows += 1;
            }
            *per_pharmacy.entry(entry.pharmacy_id).or_default() += 1;
        }

        let mut ranked: Vec<(Uuid, usize)> = per_pharmacy.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let most_affected_pharmacies = ranked
            .into_iter()
            .take(MOST_AFFECTED_LIMIT)
            .map(|(pharmacy_id, products_in_shortfall)| AffectedPharmacy {
                pharmacy_id,
                name: self
                    .directory
                    .pharmacy(pharmacy_id)
                    .map(|p| p.name)
                    .unwrap_or_default(),
                products_in_shortfall,
            })
            .collect();

        Ok(ShortfallStats {
            threshold,
            total_products_in_shortfall: records.len(),
            zero_stock_rows,
            low_stock_rows,
            most_affected_pharmacies,
        })
    }
}
