//! Supplier directory service: supplier records and their commercial terms

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::models::{Supplier, SupplierTerms};
use shared::types::round_money;
use shared::validation::{validate_credit_days, validate_name, validate_percentage};
use uuid::Uuid;
use validator::Validate;

use crate::error::{check, AppError, AppResult};
use crate::persistence::Repository;
use crate::store::{CatalogStore, Directory};
use crate::AppState;

#[derive(Clone)]
pub struct SupplierService {
    directory: Arc<Directory>,
    catalog: Arc<CatalogStore>,
    repo: Repository,
}

/// Input for creating a supplier
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSupplierInput {
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,
    pub contact: Option<String>,
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub address: Option<String>,
    #[serde(default)]
    pub credit_days: i32,
    #[serde(default)]
    pub commercial_discount_pct: Decimal,
    #[serde(default)]
    pub early_payment_discount_pct: Decimal,
}

/// Partial update of a supplier; absent fields keep their value
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSupplierInput {
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: Option<String>,
    pub contact: Option<String>,
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub address: Option<String>,
    pub credit_days: Option<i32>,
    pub commercial_discount_pct: Option<Decimal>,
    pub early_payment_discount_pct: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SupplierStats {
    pub total_suppliers: usize,
    pub suppliers_with_credit: usize,
    pub avg_credit_days: Decimal,
    pub avg_commercial_discount_pct: Decimal,
}

/// Supplier together with the size of its current price list
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SupplierPriceList {
    pub id: Uuid,
    pub name: String,
    pub contact: Option<String>,
    pub total_products: usize,
}

fn validate_terms(terms: &SupplierTerms) -> AppResult<()> {
    check("commercialDiscountPct", validate_percentage(terms.commercial_discount_pct))?;
    check("earlyPaymentDiscountPct", validate_percentage(terms.early_payment_discount_pct))?;
    check("creditDays", validate_credit_days(terms.credit_days))
}

impl SupplierService {
    pub fn new(state: &AppState) -> Self {
        Self {
            directory: state.directory.clone(),
            catalog: state.catalog.clone(),
            repo: state.repo.clone(),
        }
    }

    pub async fn create_supplier(&self, input: CreateSupplierInput) -> AppResult<Supplier> {
        check("name", validate_name(&input.name))?;
        let terms = SupplierTerms {
            commercial_discount_pct: input.commercial_discount_pct,
            early_payment_discount_pct: input.early_payment_discount_pct,
            credit_days: input.credit_days,
        };
        validate_terms(&terms)?;

        let _writer = self.directory.lock_writer().await;
        if self.directory.supplier_name_taken(&input.name, None) {
            return Err(AppError::DuplicateEntry("name".to_string()));
        }

        let supplier = Supplier {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            contact: input.contact,
            phone: input.phone,
            email: input.email,
            address: input.address,
            active: true,
            terms,
            created_at: Utc::now(),
        };

        self.repo.save_supplier(&supplier).await?;
        self.directory.put_supplier(supplier.clone());

        tracing::info!(supplier_id = %supplier.id, name = %supplier.name, "supplier created");
        Ok(supplier)
    }

    pub fn get_supplier(&self, id: Uuid) -> AppResult<Supplier> {
        self.directory
            .supplier(id)
            .ok_or_else(|| AppError::NotFound("Supplier".to_string()))
    }

    pub fn list_suppliers(&self) -> Vec<Supplier> {
        self.directory.suppliers()
    }

    /// Edit contact data or commercial terms. Percentages are validated here,
    /// once, so pricing can trust them.
    pub async fn update_supplier(&self, id: Uuid, input: UpdateSupplierInput) -> AppResult<Supplier> {
        let _writer = self.directory.lock_writer().await;
        let mut supplier = self.get_supplier(id)?;

        if let Some(name) = input.name {
            check("name", validate_name(&name))?;
            if self.directory.supplier_name_taken(&name, Some(id)) {
                return Err(AppError::DuplicateEntry("name".to_string()));
            }
            supplier.name = name.trim().to_string();
        }
        if input.contact.is_some() {
            supplier.contact = input.contact;
        }
        if input.phone.is_some() {
            supplier.phone = input.phone;
        }
        if input.email.is_some() {
            supplier.email = input.email;
        }
        if input.address.is_some() {
            supplier.address = input.address;
        }
        if let Some(days) = input.credit_days {
            supplier.terms.credit_days = days;
        }
        if let Some(pct) = input.commercial_discount_pct {
            supplier.terms.commercial_discount_pct = pct;
        }
        if let Some(pct) = input.early_payment_discount_pct {
            supplier.terms.early_payment_discount_pct = pct;
        }
        validate_terms(&supplier.terms)?;

        self.repo.save_supplier(&supplier).await?;
        self.directory.put_supplier(supplier.clone());

        tracing::info!(supplier_id = %id, "supplier updated");
        Ok(supplier)
    }

    /// Remove a supplier and its whole offer set
    pub async fn delete_supplier(&self, id: Uuid) -> AppResult<()> {
        let _writer = self.directory.lock_writer().await;
        self.get_supplier(id)?;

        let catalog_writer = self.catalog.lock_supplier(id).await;
        self.repo.delete_supplier(id).await?;
        // Uploads queued on the offer set re-check the directory once they
        // get the lock, so the record goes first.
        self.directory.remove_supplier(id);
        let removed = self.catalog.remove_supplier(catalog_writer);

        tracing::info!(supplier_id = %id, offers_removed = removed, "supplier deleted");
        Ok(())
    }

    /// Take a supplier out of comparisons without touching its price list
    pub async fn deactivate_supplier(&self, id: Uuid) -> AppResult<Supplier> {
        self.set_active(id, false).await
    }

    /// Bring a deactivated supplier back with the price list it had
    pub async fn activate_supplier(&self, id: Uuid) -> AppResult<Supplier> {
        self.set_active(id, true).await
    }

    async fn set_active(&self, id: Uuid, active: bool) -> AppResult<Supplier> {
        let _writer = self.directory.lock_writer().await;
        let mut supplier = self.get_supplier(id)?;
        if supplier.active == active {
            return Ok(supplier);
        }

        supplier.active = active;
        self.repo.save_supplier(&supplier).await?;
        self.directory.put_supplier(supplier.clone());

        tracing::info!(supplier_id = %id, active, "supplier status changed");
        Ok(supplier)
    }

    /// Averages over active suppliers only
    pub fn supplier_stats(&self) -> SupplierStats {
        let suppliers: Vec<Supplier> = self
            .directory
            .suppliers()
            .into_iter()
            .filter(|s| s.active)
            .collect();
        let total = suppliers.len();
        if total == 0 {
            return SupplierStats {
                total_suppliers: 0,
                suppliers_with_credit: 0,
                avg_credit_days: Decimal::ZERO,
                avg_commercial_discount_pct: Decimal::ZERO,
            };
        }

        let count = Decimal::from(total);
        let credit_days: Decimal = suppliers.iter().map(|s| Decimal::from(s.terms.credit_days)).sum();
        let commercial: Decimal = suppliers.iter().map(|s| s.terms.commercial_discount_pct).sum();

        SupplierStats {
            total_suppliers: total,
            suppliers_with_credit: suppliers.iter().filter(|s| s.terms.credit_days > 0).count(),
            avg_credit_days: round_money(credit_days / count, 1),
            avg_commercial_discount_pct: round_money(commercial / count, 2),
        }
    }

    /// Active suppliers with the number of products on their current price
    /// list
    pub fn suppliers_with_price_lists(&self) -> Vec<SupplierPriceList> {
        let snapshot = self.catalog.snapshot();
        self.directory
            .suppliers()
            .into_iter()
            .filter(|s| s.active)
            .map(|s| SupplierPriceList {
                total_products: snapshot.offers_for_supplier(s.id).map_or(0, |set| set.len()),
                id: s.id,
                name: s.name,
                contact: s.contact,
            })
            .collect()
    }
}
