//! Comparison service: ranks supplier offers per product
//!
//! Multi-product requests are split into chunks of product codes and priced
//! on blocking workers against one catalog snapshot, then re-sorted so the
//! result never depends on completion order.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use shared::engine::{compare_quotes, PricingPolicy, Quote};
use shared::models::{ComparisonResult, SearchTerm, Supplier};
use tokio::task::JoinSet;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::store::{CatalogSnapshot, CatalogStore, Directory};
use crate::AppState;

#[derive(Clone)]
pub struct ComparisonService {
    catalog: Arc<CatalogStore>,
    directory: Arc<Directory>,
    policy: PricingPolicy,
    chunk_size: usize,
}

/// Compare each of `codes` against one snapshot. Offers from suppliers
/// missing in `suppliers` are skipped.
fn compare_codes(
    snapshot: &CatalogSnapshot,
    suppliers: &HashMap<Uuid, Supplier>,
    codes: &[String],
    supplier_filter: Option<Uuid>,
    policy: PricingPolicy,
) -> Vec<ComparisonResult> {
    codes
        .iter()
        .map(|code| {
            let quotes = snapshot
                .offers_for_product(code)
                .into_iter()
                .filter(|offer| supplier_filter.map_or(true, |id| offer.supplier_id == id))
                .filter_map(|offer| {
                    suppliers
                        .get(&offer.supplier_id)
                        .map(|supplier| Quote { offer, supplier })
                });
            compare_quotes(code, snapshot.product(code), quotes, policy)
        })
        .collect()
}

/// Cheapest first, products nobody carries last, ties by code
fn search_order(a: &ComparisonResult, b: &ComparisonResult) -> Ordering {
    match (a.best_price(), b.best_price()) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.code.cmp(&b.code))
}

impl ComparisonService {
    pub fn new(state: &AppState) -> Self {
        Self {
            catalog: state.catalog.clone(),
            directory: state.directory.clone(),
            policy: state.config.engine.pricing_policy(),
            chunk_size: state.config.engine.parallel_chunk_size.max(1),
        }
    }

    fn supplier_index(&self) -> HashMap<Uuid, Supplier> {
        self.directory
            .suppliers()
            .into_iter()
            .map(|s| (s.id, s))
            .collect()
    }

    /// Ranked offers for one product. A code nobody carries yields an empty
    /// comparison, not an error.
    pub fn compare_product(&self, code: &str) -> ComparisonResult {
        let code = code.trim().to_string();
        let snapshot = self.catalog.snapshot();
        compare_codes(
            &snapshot,
            &self.supplier_index(),
            std::slice::from_ref(&code),
            None,
            self.policy,
        )
        .pop()
        .unwrap_or_else(|| ComparisonResult::empty(code))
    }

    /// Compare many products at once, fanned out over blocking workers.
    /// Results come back ordered by code.
    pub async fn compare_many(
        &self,
        codes: Vec<String>,
        supplier_filter: Option<Uuid>,
    ) -> AppResult<Vec<ComparisonResult>> {
        let snapshot = Arc::new(self.catalog.snapshot());
        let suppliers = Arc::new(self.supplier_index());
        let policy = self.policy;

        let mut workers = JoinSet::new();
        for chunk in codes.chunks(self.chunk_size) {
            let chunk = chunk.to_vec();
            let snapshot = snapshot.clone();
            let suppliers = suppliers.clone();
            workers.spawn_blocking(move || {
                compare_codes(&snapshot, &suppliers, &chunk, supplier_filter, policy)
            });
        }

        let mut results = Vec::with_capacity(codes.len());
        while let Some(joined) = workers.join_next().await {
            let chunk = joined
                .map_err(|e| AppError::Internal(format!("Comparison worker failed: {}", e)))?;
            results.extend(chunk);
        }

        results.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(results)
    }

    /// Search products and compare every match.
    ///
    /// With a supplier filter only that supplier's offers are considered and
    /// products it does not list are dropped.
    pub async fn search(
        &self,
        query: &str,
        supplier_filter: Option<Uuid>,
    ) -> AppResult<Vec<ComparisonResult>> {
        let Some(term) = SearchTerm::parse(query) else {
            return Ok(Vec::new());
        };
        if let Some(id) = supplier_filter {
            if self.directory.supplier(id).is_none() {
                return Err(AppError::NotFound("Supplier".to_string()));
            }
        }

        let codes: Vec<String> = self
            .catalog
            .snapshot()
            .search(&term)
            .into_iter()
            .map(|p| p.code.clone())
            .collect();

        let mut results = self.compare_many(codes, supplier_filter).await?;
        if supplier_filter.is_some() {
            results.retain(|r| r.is_carried());
        }
        results.sort_by(search_order);

        tracing::debug!(query = term.as_str(), hits = results.len(), "catalog search");
        Ok(results)
    }
}
