//! Pharmacy directory service

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::models::{DailyDiscount, Pharmacy, UpsertOutcome};
use shared::validation::{validate_name, validate_percentage};
use uuid::Uuid;
use validator::Validate;

use crate::error::{check, AppError, AppResult};
use crate::persistence::Repository;
use crate::store::{Directory, StockStore};
use crate::AppState;

#[derive(Clone)]
pub struct PharmacyService {
    directory: Arc<Directory>,
    stock: Arc<StockStore>,
    repo: Repository,
}

/// Input for registering a pharmacy
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePharmacyInput {
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
}

/// Edit of a pharmacy record; the name is always sent, other absent fields
/// keep their value
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePharmacyInput {
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
}

/// Daily promotional discount for every product of a pharmacy
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyDiscountInput {
    pub pct: Decimal,
    /// Defaults to today
    pub date: Option<NaiveDate>,
}

impl PharmacyService {
    pub fn new(state: &AppState) -> Self {
        Self {
            directory: state.directory.clone(),
            stock: state.stock.clone(),
            repo: state.repo.clone(),
        }
    }

    pub async fn create_pharmacy(&self, input: CreatePharmacyInput) -> AppResult<Pharmacy> {
        check("name", validate_name(&input.name))?;

        let _writer = self.directory.lock_writer().await;
        if self.directory.pharmacy_name_taken(&input.name, None) {
            return Err(AppError::DuplicateEntry("name".to_string()));
        }

        let pharmacy = Pharmacy {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            address: input.address,
            phone: input.phone,
            email: input.email,
            created_at: Utc::now(),
        };

        self.repo.save_pharmacy(&pharmacy).await?;
        self.directory.put_pharmacy(pharmacy.clone());

        tracing::info!(pharmacy_id = %pharmacy.id, name = %pharmacy.name, "pharmacy created");
        Ok(pharmacy)
    }

    pub fn get_pharmacy(&self, id: Uuid) -> AppResult<Pharmacy> {
        self.directory
            .pharmacy(id)
            .ok_or_else(|| AppError::NotFound("Pharmacy".to_string()))
    }

    pub fn list_pharmacies(&self) -> Vec<Pharmacy> {
        self.directory.pharmacies()
    }

    pub async fn update_pharmacy(&self, id: Uuid, input: UpdatePharmacyInput) -> AppResult<Pharmacy> {
        check("name", validate_name(&input.name))?;

        let _writer = self.directory.lock_writer().await;
        let mut pharmacy = self.get_pharmacy(id)?;
        if self.directory.pharmacy_name_taken(&input.name, Some(id)) {
            return Err(AppError::DuplicateEntry("name".to_string()));
        }

        pharmacy.name = input.name.trim().to_string();
        if input.address.is_some() {
            pharmacy.address = input.address;
        }
        if input.phone.is_some() {
            pharmacy.phone = input.phone;
        }
        if input.email.is_some() {
            pharmacy.email = input.email;
        }

        self.repo.save_pharmacy(&pharmacy).await?;
        self.directory.put_pharmacy(pharmacy.clone());

        tracing::info!(pharmacy_id = %id, "pharmacy updated");
        Ok(pharmacy)
    }

    /// Remove a pharmacy together with its stock
    pub async fn delete_pharmacy(&self, id: Uuid) -> AppResult<()> {
        let _writer = self.directory.lock_writer().await;
        self.get_pharmacy(id)?;

        let stock_writer = self.stock.lock_pharmacy(id).await;
        self.repo.delete_pharmacy(id).await?;
        self.directory.remove_pharmacy(id);
        let removed = self.stock.remove_pharmacy(stock_writer);

        tracing::info!(pharmacy_id = %id, stock_rows_removed = removed, "pharmacy deleted");
        Ok(())
    }

    /// Set the pharmacy-wide daily discount. It only affects shelf prices on
    /// its own date and lapses at midnight.
    pub async fn apply_daily_discount(
        &self,
        pharmacy_id: Uuid,
        input: DailyDiscountInput,
    ) -> AppResult<UpsertOutcome> {
        self.get_pharmacy(pharmacy_id)?;
        check("pct", validate_percentage(input.pct))?;

        let now = Utc::now();
        let discount = DailyDiscount {
            pct: input.pct,
            date: input.date.unwrap_or_else(|| now.date_naive()),
        };

        let writer = self.stock.lock_pharmacy(pharmacy_id).await;
        self.get_pharmacy(pharmacy_id)?;
        let plan = self.stock.plan_daily_discount(&writer, discount, now);
        self.repo.save_stock(&plan.changed).await?;
        let outcome = plan.outcome.clone();
        self.stock.publish(&writer, plan);

        tracing::info!(
            pharmacy_id = %pharmacy_id,
            pct = %discount.pct,
            date = %discount.date,
            rows = outcome.updated,
            "daily discount applied"
        );
        Ok(outcome)
    }
}
