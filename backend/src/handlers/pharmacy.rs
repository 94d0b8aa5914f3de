//! HTTP handlers for pharmacy management endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use shared::models::{Pharmacy, UpsertOutcome};
use uuid::Uuid;
use validator::Validate;

use crate::error::AppResult;
use crate::services::pharmacy::{CreatePharmacyInput, DailyDiscountInput, UpdatePharmacyInput};
use crate::services::PharmacyService;
use crate::AppState;

/// Register a pharmacy
pub async fn create_pharmacy(
    State(state): State<AppState>,
    Json(input): Json<CreatePharmacyInput>,
) -> AppResult<(StatusCode, Json<Pharmacy>)> {
    input.validate()?;
    let service = PharmacyService::new(&state);
    let pharmacy = service.create_pharmacy(input).await?;
    Ok((StatusCode::CREATED, Json(pharmacy)))
}

pub async fn list_pharmacies(State(state): State<AppState>) -> Json<Vec<Pharmacy>> {
    let service = PharmacyService::new(&state);
    Json(service.list_pharmacies())
}

pub async fn get_pharmacy(
    State(state): State<AppState>,
    Path(pharmacy_id): Path<Uuid>,
) -> AppResult<Json<Pharmacy>> {
    let service = PharmacyService::new(&state);
    Ok(Json(service.get_pharmacy(pharmacy_id)?))
}

/// Rename a pharmacy or edit its contact data
pub async fn update_pharmacy(
    State(state): State<AppState>,
    Path(pharmacy_id): Path<Uuid>,
    Json(input): Json<UpdatePharmacyInput>,
) -> AppResult<Json<Pharmacy>> {
    input.validate()?;
    let service = PharmacyService::new(&state);
    let pharmacy = service.update_pharmacy(pharmacy_id, input).await?;
    Ok(Json(pharmacy))
}

/// Delete a pharmacy and its stock
pub async fn delete_pharmacy(
    State(state): State<AppState>,
    Path(pharmacy_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = PharmacyService::new(&state);
    service.delete_pharmacy(pharmacy_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Set today's (or the given day's) promotional discount
pub async fn apply_daily_discount(
    State(state): State<AppState>,
    Path(pharmacy_id): Path<Uuid>,
    Json(input): Json<DailyDiscountInput>,
) -> AppResult<Json<UpsertOutcome>> {
    let service = PharmacyService::new(&state);
    let outcome = service.apply_daily_discount(pharmacy_id, input).await?;
    Ok(Json(outcome))
}
