//! HTTP handlers for the catalog: price-list uploads, search and comparison

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use shared::models::{ComparisonResult, OfferRow, SupplierOffer, UpsertOutcome};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::supplier::SupplierPriceList;
use crate::services::{CatalogService, ComparisonService, SupplierService};
use crate::AppState;

/// Query parameters for the comparison search
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub supplier_id: Option<Uuid>,
}

/// Search products and compare their offers
pub async fn search_catalog(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<ComparisonResult>>> {
    let service = ComparisonService::new(&state);
    let results = service.search(&query.q, query.supplier_id).await?;
    Ok(Json(results))
}

/// Ranked offers for one product
pub async fn get_product_comparison(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Json<ComparisonResult> {
    let service = ComparisonService::new(&state);
    Json(service.compare_product(&code))
}

/// Raw stored offers for one product
pub async fn get_product_offers(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Json<Vec<SupplierOffer>> {
    let service = CatalogService::new(&state);
    Json(service.offers_for_product(&code))
}

/// Suppliers with the size of their current price list
pub async fn list_price_lists(State(state): State<AppState>) -> Json<Vec<SupplierPriceList>> {
    let service = SupplierService::new(&state);
    Json(service.suppliers_with_price_lists())
}

/// Merge an already-parsed price list into a supplier's offers
pub async fn upload_price_list(
    State(state): State<AppState>,
    Path(supplier_id): Path<Uuid>,
    Json(rows): Json<Vec<OfferRow>>,
) -> AppResult<Json<UpsertOutcome>> {
    let service = CatalogService::new(&state);
    let outcome = service.upload_price_list(supplier_id, rows).await?;
    Ok(Json(outcome))
}
