//! Catalog service: supplier price-list uploads and product lookups

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use shared::models::{OfferRow, Product, SearchTerm, SupplierOffer, UpsertOutcome};
use shared::validation::{validate_price, validate_product_code};
use uuid::Uuid;

use crate::config::NegativePricePolicy;
use crate::error::{AppError, AppResult};
use crate::persistence::Repository;
use crate::store::{CatalogStore, Directory};
use crate::AppState;

#[derive(Clone)]
pub struct CatalogService {
    catalog: Arc<CatalogStore>,
    directory: Arc<Directory>,
    repo: Repository,
    negative_prices: NegativePricePolicy,
}

impl CatalogService {
    pub fn new(state: &AppState) -> Self {
        Self {
            catalog: state.catalog.clone(),
            directory: state.directory.clone(),
            repo: state.repo.clone(),
            negative_prices: state.config.engine.negative_price_policy,
        }
    }

    fn ensure_supplier(&self, supplier_id: Uuid) -> AppResult<()> {
        match self.directory.supplier(supplier_id) {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound("Supplier".to_string())),
        }
    }

    /// Merge a parsed price list into the supplier's offers.
    ///
    /// The batch is validated as a whole before anything is applied. Codes
    /// missing from `rows` keep their current offer.
    pub async fn upload_price_list(
        &self,
        supplier_id: Uuid,
        mut rows: Vec<OfferRow>,
    ) -> AppResult<UpsertOutcome> {
        self.ensure_supplier(supplier_id)?;
        let anomalies = self.screen_rows(supplier_id, &mut rows)?;

        let writer = self.catalog.lock_supplier(supplier_id).await;
        // the supplier may have been deleted while this upload waited
        self.ensure_supplier(supplier_id)?;
        let plan = self.catalog.plan_upload(&writer, &rows, Utc::now());
        self.repo.save_offers(&plan.changed, &plan.products).await?;

        let mut outcome = plan.outcome.clone();
        outcome.anomalies = anomalies;
        self.catalog.publish(&writer, plan);

        tracing::info!(
            supplier_id = %supplier_id,
            inserted = outcome.inserted,
            updated = outcome.updated,
            anomalies = outcome.anomalies.len(),
            "price list uploaded"
        );
        Ok(outcome)
    }

    /// Add or update one offer on the supplier's price list
    pub async fn upsert_offer(&self, supplier_id: Uuid, row: OfferRow) -> AppResult<UpsertOutcome> {
        self.upload_price_list(supplier_id, vec![row]).await
    }

    /// The supplier's current price list, ordered by code
    pub fn price_list(&self, supplier_id: Uuid) -> AppResult<Vec<SupplierOffer>> {
        self.ensure_supplier(supplier_id)?;
        Ok(self
            .catalog
            .snapshot()
            .offers_for_supplier(supplier_id)
            .map(|offers| offers.values().cloned().collect())
            .unwrap_or_default())
    }

    /// Reject empty codes and oversized prices outright; handle negative
    /// prices per policy. Returns the anomalies recorded for clamped rows.
    fn screen_rows(&self, supplier_id: Uuid, rows: &mut [OfferRow]) -> AppResult<Vec<String>> {
        let mut anomalies = Vec::new();

        for (index, row) in rows.iter_mut().enumerate() {
            validate_product_code(&row.code)
                .map_err(|message| AppError::invalid(format!("rows[{}].code", index), message))?;

            let code = row.code.trim().to_string();
            for (field, price) in [
                ("listPrice", Some(&mut row.list_price)),
                ("discountedPrice", row.discounted_price.as_mut()),
            ] {
                let Some(price) = price else { continue };
                if *price < Decimal::ZERO && self.negative_prices == NegativePricePolicy::Clamp {
                    tracing::warn!(
                        supplier_id = %supplier_id,
                        code = %code,
                        value = %price,
                        field,
                        "negative price in upload clamped to zero"
                    );
                    anomalies.push(format!("{}: {} {} clamped to 0", code, field, price));
                    *price = Decimal::ZERO;
                }
                validate_price(*price).map_err(|message| {
                    AppError::invalid(format!("rows[{}].{}", index, field), message)
                })?;
            }
        }

        Ok(anomalies)
    }

    /// Every stored offer for `code`, ordered by supplier id
    pub fn offers_for_product(&self, code: &str) -> Vec<SupplierOffer> {
        self.catalog
            .snapshot()
            .offers_for_product(code.trim())
            .into_iter()
            .cloned()
            .collect()
    }

    /// Case-insensitive match on code, description or laboratory. A blank
    /// query matches nothing.
    pub fn search_products(&self, query: &str) -> Vec<Product> {
        let Some(term) = SearchTerm::parse(query) else {
            return Vec::new();
        };
        self.catalog
            .snapshot()
            .search(&term)
            .into_iter()
            .cloned()
            .collect()
    }
}
