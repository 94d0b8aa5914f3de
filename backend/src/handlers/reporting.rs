//! HTTP handlers for shortfall and overstock reports

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::purchasing::ShortfallStats;
use crate::services::{PurchasingService, ReportingService};
use crate::AppState;

/// Query parameters shared by the stock reports
#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub threshold: Option<i64>,
    pub pharmacy_id: Option<Uuid>,
    pub format: Option<String>, // "json" or "csv"
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub threshold: Option<i64>,
}

fn csv_attachment(csv: String, filename: &str) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        csv,
    )
        .into_response()
}

/// Get the shortfall report (purchase plan)
pub async fn get_shortfall_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> AppResult<Response> {
    let service = PurchasingService::new(&state);
    let report = service.consolidate(query.threshold, query.pharmacy_id).await?;

    if query.format.as_deref() == Some("csv") {
        let csv = ReportingService::export_to_csv(&ReportingService::shortfall_rows(&report))?;
        Ok(csv_attachment(csv, "shortfall.csv"))
    } else {
        Ok(Json(report).into_response())
    }
}

/// Get the overstock report
pub async fn get_overstock_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> AppResult<Response> {
    let service = PurchasingService::new(&state);
    let records = service.overstock(query.threshold, query.pharmacy_id)?;

    if query.format.as_deref() == Some("csv") {
        let csv = ReportingService::export_to_csv(&ReportingService::overstock_rows(&records))?;
        Ok(csv_attachment(csv, "overstock.csv"))
    } else {
        Ok(Json(records).into_response())
    }
}

/// Get shortfall statistics
pub async fn get_shortfall_stats(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> AppResult<Json<ShortfallStats>> {
    let service = PurchasingService::new(&state);
    Ok(Json(service.shortfall_stats(query.threshold)?))
}
