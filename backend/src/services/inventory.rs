//! Inventory service: pharmacy stock re-imports and stock listings

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::models::{PharmacyStock, StockRow, UpsertOutcome};
use shared::validation::{validate_price, validate_product_code, validate_quantity};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::persistence::Repository;
use crate::store::{Directory, StockStore};
use crate::AppState;

#[derive(Clone)]
pub struct InventoryService {
    stock: Arc<StockStore>,
    directory: Arc<Directory>,
    repo: Repository,
}

/// Stock row as shown to the pharmacy, with today's shelf price
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StockView {
    #[serde(flatten)]
    pub stock: PharmacyStock,
    pub effective_daily_discount_pct: Option<Decimal>,
    pub shelf_price: Option<Decimal>,
}

impl StockView {
    fn new(stock: PharmacyStock, today: NaiveDate) -> Self {
        Self {
            effective_daily_discount_pct: stock.effective_daily_discount(today),
            shelf_price: stock.shelf_price(today),
            stock,
        }
    }
}

fn screen_rows(rows: &[StockRow]) -> AppResult<()> {
    for (index, row) in rows.iter().enumerate() {
        validate_product_code(&row.code)
            .map_err(|message| AppError::invalid(format!("rows[{}].code", index), message))?;
        validate_quantity(row.quantity)
            .map_err(|message| AppError::invalid(format!("rows[{}].quantity", index), message))?;
        if let Some(price) = row.unit_price {
            validate_price(price)
                .map_err(|message| AppError::invalid(format!("rows[{}].unitPrice", index), message))?;
        }
    }
    Ok(())
}

impl InventoryService {
    pub fn new(state: &AppState) -> Self {
        Self {
            stock: state.stock.clone(),
            directory: state.directory.clone(),
            repo: state.repo.clone(),
        }
    }

    fn ensure_pharmacy(&self, pharmacy_id: Uuid) -> AppResult<()> {
        match self.directory.pharmacy(pharmacy_id) {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound("Pharmacy".to_string())),
        }
    }

    /// Merge an inventory re-import into the pharmacy's stock by code.
    /// Any invalid row rejects the whole batch.
    pub async fn import_stock(&self, pharmacy_id: Uuid, rows: Vec<StockRow>) -> AppResult<UpsertOutcome> {
        self.ensure_pharmacy(pharmacy_id)?;
        screen_rows(&rows)?;

        let writer = self.stock.lock_pharmacy(pharmacy_id).await;
        // the pharmacy may have been deleted while this import waited
        self.ensure_pharmacy(pharmacy_id)?;
        let plan = self.stock.plan_import(&writer, &rows, Utc::now());
        self.repo.save_stock(&plan.changed).await?;
        let outcome = plan.outcome.clone();
        self.stock.publish(&writer, plan);

        tracing::info!(
            pharmacy_id = %pharmacy_id,
            inserted = outcome.inserted,
            updated = outcome.updated,
            "stock imported"
        );
        Ok(outcome)
    }

    /// Current stock of a pharmacy, ordered by code
    pub fn list_stock(&self, pharmacy_id: Uuid) -> AppResult<Vec<StockView>> {
        self.ensure_pharmacy(pharmacy_id)?;
        let today = Utc::now().date_naive();
        let snapshot = self.stock.snapshot();

        Ok(snapshot
            .for_pharmacy(pharmacy_id)
            .map(|rows| {
                rows.values()
                    .cloned()
                    .map(|row| StockView::new(row, today))
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::services::pharmacy::{CreatePharmacyInput, DailyDiscountInput, PharmacyService};

    async fn setup() -> (AppState, Uuid) {
        let state = AppState::new(Config::default(), Repository::default());
        let pharmacy = PharmacyService::new(&state)
            .create_pharmacy(CreatePharmacyInput {
                name: "Farmacia Norte".into(),
                address: None,
                phone: None,
                email: None,
            })
            .await
            .unwrap();
        (state, pharmacy.id)
    }

    #[tokio::test]
    async fn test_import_and_list() {
        let (state, pharmacy) = setup().await;
        let service = InventoryService::new(&state);

        let mut priced = StockRow::new("B", 2);
        priced.unit_price = Some(Decimal::new(40, 0));
        let outcome = service
            .import_stock(pharmacy, vec![priced, StockRow::new("A", 0)])
            .await
            .unwrap();
        assert_eq!((outcome.inserted, outcome.updated), (2, 0));

        let stock = service.list_stock(pharmacy).unwrap();
        assert_eq!(stock.len(), 2);
        assert_eq!(stock[0].stock.code, "A");
        assert_eq!(stock[1].shelf_price, Some(Decimal::new(40, 0)));
    }

    #[tokio::test]
    async fn test_negative_quantity_rejects_batch() {
        let (state, pharmacy) = setup().await;
        let service = InventoryService::new(&state);
        let result = service
            .import_stock(pharmacy, vec![StockRow::new("A", 3), StockRow::new("B", -1)])
            .await;
        assert!(matches!(result, Err(AppError::Validation { .. })));
        assert!(service.list_stock(pharmacy).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_pharmacy() {
        let (state, _) = setup().await;
        let service = InventoryService::new(&state);
        assert!(matches!(
            service.import_stock(Uuid::new_v4(), vec![StockRow::new("A", 1)]).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_daily_discount_applies_to_shelf_price_today() {
        let (state, pharmacy) = setup().await;
        let service = InventoryService::new(&state);
        let mut row = StockRow::new("A", 5);
        row.unit_price = Some(Decimal::new(50, 0));
        service.import_stock(pharmacy, vec![row]).await.unwrap();

        PharmacyService::new(&state)
            .apply_daily_discount(pharmacy, DailyDiscountInput { pct: Decimal::TEN, date: None })
            .await
            .unwrap();

        let stock = service.list_stock(pharmacy).unwrap();
        assert_eq!(stock[0].effective_daily_discount_pct, Some(Decimal::TEN));
        assert_eq!(stock[0].shelf_price, Some(Decimal::new(45, 0)));
    }
}
