//! Reporting service for report export
//! Flattens purchase plans and overstock records into CSV rows

use rust_decimal::Decimal;
use serde::Serialize;
use shared::models::{ConsolidationReport, OverstockRecord, PriorityTier};

use crate::error::{AppError, AppResult};

/// Reporting service
pub struct ReportingService;

/// One purchase recommendation as a spreadsheet row
#[derive(Debug, Serialize)]
pub struct ShortfallCsvRow {
    pub code: String,
    pub description: String,
    pub lab: String,
    pub priority: PriorityTier,
    pub total_needed: i64,
    pub zero_stock_pharmacies: usize,
    pub pharmacies_affected: usize,
    pub unit_price: Option<Decimal>,
    pub best_supplier: Option<String>,
    pub total_value: Option<Decimal>,
}

/// One overstocked product as a spreadsheet row
#[derive(Debug, Serialize)]
pub struct OverstockCsvRow {
    pub code: String,
    pub description: String,
    pub lab: String,
    pub threshold: i64,
    pub total_stock: i64,
    pub pharmacies_over: usize,
    pub total_excess: i64,
}

impl ReportingService {
    pub fn shortfall_rows(report: &ConsolidationReport) -> Vec<ShortfallCsvRow> {
        report
            .products
            .iter()
            .map(|p| ShortfallCsvRow {
                code: p.code.clone(),
                description: p.description.clone(),
                lab: p.laboratory.clone(),
                priority: p.priority,
                total_needed: p.total_needed,
                zero_stock_pharmacies: p.zero_stock_pharmacies,
                pharmacies_affected: p.detail_by_pharmacy.len(),
                unit_price: p.unit_price,
                best_supplier: p.best_supplier_name.clone(),
                total_value: p.total_value,
            })
            .collect()
    }

    pub fn overstock_rows(records: &[OverstockRecord]) -> Vec<OverstockCsvRow> {
        records
            .iter()
            .map(|r| OverstockCsvRow {
                code: r.code.clone(),
                description: r.description.clone(),
                lab: r.laboratory.clone(),
                threshold: r.threshold,
                total_stock: r.total_stock,
                pharmacies_over: r.pharmacies.len(),
                total_excess: r.pharmacies.iter().map(|p| p.excess_qty).sum(),
            })
            .collect()
    }

    /// Export report data as CSV
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Csv(format!("serialization error: {}", e)))?;
        }
        let csv_data = String::from_utf8(
            wtr.into_inner()
                .map_err(|e| AppError::Csv(format!("writer error: {}", e)))?,
        )
        .map_err(|e| AppError::Csv(format!("UTF-8 conversion error: {}", e)))?;
        Ok(csv_data)
    }
}
