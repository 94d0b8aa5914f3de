//! HTTP handlers for supplier management endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use shared::models::{OfferRow, Supplier, SupplierOffer, UpsertOutcome};
use uuid::Uuid;
use validator::Validate;

use crate::error::AppResult;
use crate::services::supplier::{CreateSupplierInput, SupplierStats, UpdateSupplierInput};
use crate::services::{CatalogService, SupplierService};
use crate::AppState;

/// Register a supplier with its commercial terms
pub async fn create_supplier(
    State(state): State<AppState>,
    Json(input): Json<CreateSupplierInput>,
) -> AppResult<(StatusCode, Json<Supplier>)> {
    input.validate()?;
    let service = SupplierService::new(&state);
    let supplier = service.create_supplier(input).await?;
    Ok((StatusCode::CREATED, Json(supplier)))
}

/// List suppliers ordered by name
pub async fn list_suppliers(State(state): State<AppState>) -> Json<Vec<Supplier>> {
    let service = SupplierService::new(&state);
    Json(service.list_suppliers())
}

pub async fn get_supplier(
    State(state): State<AppState>,
    Path(supplier_id): Path<Uuid>,
) -> AppResult<Json<Supplier>> {
    let service = SupplierService::new(&state);
    Ok(Json(service.get_supplier(supplier_id)?))
}

/// Edit contact data or commercial terms
pub async fn update_supplier(
    State(state): State<AppState>,
    Path(supplier_id): Path<Uuid>,
    Json(input): Json<UpdateSupplierInput>,
) -> AppResult<Json<Supplier>> {
    input.validate()?;
    let service = SupplierService::new(&state);
    let supplier = service.update_supplier(supplier_id, input).await?;
    Ok(Json(supplier))
}

/// Delete a supplier and its price list
pub async fn delete_supplier(
    State(state): State<AppState>,
    Path(supplier_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = SupplierService::new(&state);
    service.delete_supplier(supplier_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Take a supplier out of comparisons, keeping its price list
pub async fn deactivate_supplier(
    State(state): State<AppState>,
    Path(supplier_id): Path<Uuid>,
) -> AppResult<Json<Supplier>> {
    let service = SupplierService::new(&state);
    Ok(Json(service.deactivate_supplier(supplier_id).await?))
}

pub async fn activate_supplier(
    State(state): State<AppState>,
    Path(supplier_id): Path<Uuid>,
) -> AppResult<Json<Supplier>> {
    let service = SupplierService::new(&state);
    Ok(Json(service.activate_supplier(supplier_id).await?))
}

/// Current price list of one supplier, ordered by code
pub async fn get_price_list(
    State(state): State<AppState>,
    Path(supplier_id): Path<Uuid>,
) -> AppResult<Json<Vec<SupplierOffer>>> {
    let service = CatalogService::new(&state);
    Ok(Json(service.price_list(supplier_id)?))
}

/// Add or update a single offer without uploading a whole list
pub async fn upsert_offer(
    State(state): State<AppState>,
    Path(supplier_id): Path<Uuid>,
    Json(row): Json<OfferRow>,
) -> AppResult<Json<UpsertOutcome>> {
    let service = CatalogService::new(&state);
    Ok(Json(service.upsert_offer(supplier_id, row).await?))
}

pub async fn get_supplier_stats(State(state): State<AppState>) -> Json<SupplierStats> {
    let service = SupplierService::new(&state);
    Json(service.supplier_stats())
}
