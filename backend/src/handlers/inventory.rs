//! HTTP handlers for pharmacy stock endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use shared::models::{StockRow, UpsertOutcome};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::inventory::StockView;
use crate::services::InventoryService;
use crate::AppState;

/// Re-import a pharmacy's inventory
pub async fn import_stock(
    State(state): State<AppState>,
    Path(pharmacy_id): Path<Uuid>,
    Json(rows): Json<Vec<StockRow>>,
) -> AppResult<Json<UpsertOutcome>> {
    let service = InventoryService::new(&state);
    let outcome = service.import_stock(pharmacy_id, rows).await?;
    Ok(Json(outcome))
}

/// Current stock with today's shelf prices
pub async fn list_stock(
    State(state): State<AppState>,
    Path(pharmacy_id): Path<Uuid>,
) -> AppResult<Json<Vec<StockView>>> {
    let service = InventoryService::new(&state);
    Ok(Json(service.list_stock(pharmacy_id)?))
}
