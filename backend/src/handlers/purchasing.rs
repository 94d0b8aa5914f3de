//! HTTP handlers for the purchase plan

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use shared::models::{ConsolidationReport, OrderLine};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::PurchasingService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PurchasingQuery {
    pub threshold: Option<i64>,
    pub pharmacy_id: Option<Uuid>,
}

/// Consolidated purchase plan across pharmacies
pub async fn get_consolidation(
    State(state): State<AppState>,
    Query(query): Query<PurchasingQuery>,
) -> AppResult<Json<ConsolidationReport>> {
    let service = PurchasingService::new(&state);
    let report = service.consolidate(query.threshold, query.pharmacy_id).await?;
    Ok(Json(report))
}

/// Order lines for the order subsystem
pub async fn get_order_lines(
    State(state): State<AppState>,
    Query(query): Query<PurchasingQuery>,
) -> AppResult<Json<Vec<OrderLine>>> {
    let service = PurchasingService::new(&state);
    let lines = service.order_lines(query.threshold, query.pharmacy_id).await?;
    Ok(Json(lines))
}
