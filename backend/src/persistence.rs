//! Optional PostgreSQL write-through persistence
//!
//! Without a database URL every method is a no-op and the console runs from
//! memory alone. With one, the stores are hydrated on boot and each upload is
//! written in a single transaction before its snapshot is published.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use shared::models::{DailyDiscount, Pharmacy, PharmacyStock, Product, Supplier, SupplierOffer, SupplierTerms};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::AppResult;

#[derive(Clone, Default)]
pub struct Repository {
    db: Option<PgPool>,
}

/// Everything needed to rebuild the in-memory stores
#[derive(Debug, Default)]
pub struct Hydration {
    pub suppliers: Vec<Supplier>,
    pub pharmacies: Vec<Pharmacy>,
    pub products: Vec<Product>,
    pub offers: Vec<SupplierOffer>,
    pub stock: Vec<PharmacyStock>,
}

#[derive(Debug, FromRow)]
struct SupplierRecord {
    id: Uuid,
    name: String,
    contact: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    address: Option<String>,
    active: bool,
    commercial_discount_pct: Decimal,
    early_payment_discount_pct: Decimal,
    credit_days: i32,
    created_at: DateTime<Utc>,
}

impl From<SupplierRecord> for Supplier {
    fn from(r: SupplierRecord) -> Self {
        Supplier {
            id: r.id,
            name: r.name,
            contact: r.contact,
            phone: r.phone,
            email: r.email,
            address: r.address,
            active: r.active,
            terms: SupplierTerms {
                commercial_discount_pct: r.commercial_discount_pct,
                early_payment_discount_pct: r.early_payment_discount_pct,
                credit_days: r.credit_days,
            },
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct PharmacyRecord {
    id: Uuid,
    name: String,
    address: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<PharmacyRecord> for Pharmacy {
    fn from(r: PharmacyRecord) -> Self {
        Pharmacy {
            id: r.id,
            name: r.name,
            address: r.address,
            phone: r.phone,
            email: r.email,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct ProductRecord {
    code: String,
    description: String,
    laboratory: String,
    expiry_date: Option<NaiveDate>,
    national: Option<bool>,
}

impl From<ProductRecord> for Product {
    fn from(r: ProductRecord) -> Self {
        Product {
            code: r.code,
            description: r.description,
            laboratory: r.laboratory,
            expiry_date: r.expiry_date,
            national: r.national,
        }
    }
}

#[derive(Debug, FromRow)]
struct OfferRecord {
    supplier_id: Uuid,
    code: String,
    description: String,
    laboratory: String,
    list_price: Decimal,
    discounted_price: Option<Decimal>,
    available: bool,
    updated_at: DateTime<Utc>,
}

impl From<OfferRecord> for SupplierOffer {
    fn from(r: OfferRecord) -> Self {
        SupplierOffer {
            supplier_id: r.supplier_id,
            code: r.code,
            description: r.description,
            laboratory: r.laboratory,
            list_price: r.list_price,
            discounted_price: r.discounted_price,
            available: r.available,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct StockRecord {
    pharmacy_id: Uuid,
    code: String,
    description: Option<String>,
    laboratory: Option<String>,
    quantity_on_hand: i64,
    unit_price: Option<Decimal>,
    expiry_date: Option<NaiveDate>,
    daily_discount_pct: Option<Decimal>,
    daily_discount_date: Option<NaiveDate>,
    updated_at: DateTime<Utc>,
}

impl From<StockRecord> for PharmacyStock {
    fn from(r: StockRecord) -> Self {
        let daily_discount = match (r.daily_discount_pct, r.daily_discount_date) {
            (Some(pct), Some(date)) => Some(DailyDiscount { pct, date }),
            _ => None,
        };
        PharmacyStock {
            pharmacy_id: r.pharmacy_id,
            code: r.code,
            description: r.description,
            laboratory: r.laboratory,
            quantity_on_hand: r.quantity_on_hand,
            unit_price: r.unit_price,
            expiry_date: r.expiry_date,
            daily_discount,
            updated_at: r.updated_at,
        }
    }
}

impl Repository {
    /// Create a new Repository; `None` disables persistence
    pub fn new(db: Option<PgPool>) -> Self {
        Self { db }
    }

    pub fn is_enabled(&self) -> bool {
        self.db.is_some()
    }

    /// Connectivity probe for the health endpoint
    pub async fn ping(&self) -> Option<bool> {
        let db = self.db.as_ref()?;
        Some(sqlx::query("SELECT 1").execute(db).await.is_ok())
    }

    /// Read every table back into domain records
    pub async fn load(&self) -> AppResult<Hydration> {
        let Some(db) = &self.db else {
            return Ok(Hydration::default());
        };

        let suppliers = sqlx::query_as::<_, SupplierRecord>(
            r#"
            SELECT id, name, contact, phone, email, address, active,
                   commercial_discount_pct, early_payment_discount_pct, credit_days, created_at
            FROM suppliers
            "#,
        )
        .fetch_all(db)
        .await?;

        let pharmacies = sqlx::query_as::<_, PharmacyRecord>(
            "SELECT id, name, address, phone, email, created_at FROM pharmacies",
        )
        .fetch_all(db)
        .await?;

        let products = sqlx::query_as::<_, ProductRecord>(
            "SELECT code, description, laboratory, expiry_date, national FROM products",
        )
        .fetch_all(db)
        .await?;

        let offers = sqlx::query_as::<_, OfferRecord>(
            r#"
            SELECT supplier_id, code, description, laboratory, list_price, discounted_price,
                   available, updated_at
            FROM supplier_offers
            "#,
        )
        .fetch_all(db)
        .await?;

        let stock = sqlx::query_as::<_, StockRecord>(
            r#"
            SELECT pharmacy_id, code, description, laboratory, quantity_on_hand, unit_price,
                   expiry_date, daily_discount_pct, daily_discount_date, updated_at
            FROM pharmacy_stock
            "#,
        )
        .fetch_all(db)
        .await?;

        Ok(Hydration {
            suppliers: suppliers.into_iter().map(Into::into).collect(),
            pharmacies: pharmacies.into_iter().map(Into::into).collect(),
            products: products.into_iter().map(Into::into).collect(),
            offers: offers.into_iter().map(Into::into).collect(),
            stock: stock.into_iter().map(Into::into).collect(),
        })
    }

    pub async fn save_supplier(&self, supplier: &Supplier) -> AppResult<()> {
        let Some(db) = &self.db else {
            return Ok(());
        };

        sqlx::query(
            r#"
            INSERT INTO suppliers (
                id, name, contact, phone, email, address, active,
                commercial_discount_pct, early_payment_discount_pct, credit_days, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                contact = EXCLUDED.contact,
                phone = EXCLUDED.phone,
                email = EXCLUDED.email,
                address = EXCLUDED.address,
                active = EXCLUDED.active,
                commercial_discount_pct = EXCLUDED.commercial_discount_pct,
                early_payment_discount_pct = EXCLUDED.early_payment_discount_pct,
                credit_days = EXCLUDED.credit_days
            "#,
        )
        .bind(supplier.id)
        .bind(&supplier.name)
        .bind(&supplier.contact)
        .bind(&supplier.phone)
        .bind(&supplier.email)
        .bind(&supplier.address)
        .bind(supplier.active)
        .bind(supplier.terms.commercial_discount_pct)
        .bind(supplier.terms.early_payment_discount_pct)
        .bind(supplier.terms.credit_days)
        .bind(supplier.created_at)
        .execute(db)
        .await?;

        Ok(())
    }

    /// Delete a supplier; its offers go with it
    pub async fn delete_supplier(&self, id: Uuid) -> AppResult<()> {
        let Some(db) = &self.db else {
            return Ok(());
        };

        sqlx::query("DELETE FROM suppliers WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        Ok(())
    }

    pub async fn save_pharmacy(&self, pharmacy: &Pharmacy) -> AppResult<()> {
        let Some(db) = &self.db else {
            return Ok(());
        };

        sqlx::query(
            r#"
            INSERT INTO pharmacies (id, name, address, phone, email, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                address = EXCLUDED.address,
                phone = EXCLUDED.phone,
                email = EXCLUDED.email
            "#,
        )
        .bind(pharmacy.id)
        .bind(&pharmacy.name)
        .bind(&pharmacy.address)
        .bind(&pharmacy.phone)
        .bind(&pharmacy.email)
        .bind(pharmacy.created_at)
        .execute(db)
        .await?;

        Ok(())
    }

    /// Delete a pharmacy; its stock goes with it
    pub async fn delete_pharmacy(&self, id: Uuid) -> AppResult<()> {
        let Some(db) = &self.db else {
            return Ok(());
        };

        sqlx::query("DELETE FROM pharmacies WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        Ok(())
    }

    /// Write an upload's changed offers and product rows in one transaction
    pub async fn save_offers(&self, offers: &[SupplierOffer], products: &[Product]) -> AppResult<()> {
        let Some(db) = &self.db else {
            return Ok(());
        };

        let mut tx = db.begin().await?;

        for product in products {
            sqlx::query(
                r#"
                INSERT INTO products (code, description, laboratory, expiry_date, national)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (code) DO UPDATE SET
                    description = EXCLUDED.description,
                    laboratory = EXCLUDED.laboratory
                "#,
            )
            .bind(&product.code)
            .bind(&product.description)
            .bind(&product.laboratory)
            .bind(product.expiry_date)
            .bind(product.national)
            .execute(&mut *tx)
            .await?;
        }

        for offer in offers {
            sqlx::query(
                r#"
                INSERT INTO supplier_offers (
                    supplier_id, code, description, laboratory, list_price, discounted_price,
                    available, updated_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                ON CONFLICT (supplier_id, code) DO UPDATE SET
                    description = EXCLUDED.description,
                    laboratory = EXCLUDED.laboratory,
                    list_price = EXCLUDED.list_price,
                    discounted_price = EXCLUDED.discounted_price,
                    available = EXCLUDED.available,
                    updated_at = EXCLUDED.updated_at
                "#,
            )
            .bind(offer.supplier_id)
            .bind(&offer.code)
            .bind(&offer.description)
            .bind(&offer.laboratory)
            .bind(offer.list_price)
            .bind(offer.discounted_price)
            .bind(offer.available)
            .bind(offer.updated_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Write changed stock rows in one transaction
    pub async fn save_stock(&self, rows: &[PharmacyStock]) -> AppResult<()> {
        let Some(db) = &self.db else {
            return Ok(());
        };

        let mut tx = db.begin().await?;

        for row in rows {
            sqlx::query(
                r#"
                INSERT INTO pharmacy_stock (
                    pharmacy_id, code, description, laboratory, quantity_on_hand, unit_price,
                    expiry_date, daily_discount_pct, daily_discount_date, updated_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                ON CONFLICT (pharmacy_id, code) DO UPDATE SET
                    description = EXCLUDED.description,
                    laboratory = EXCLUDED.laboratory,
                    quantity_on_hand = EXCLUDED.quantity_on_hand,
                    unit_price = EXCLUDED.unit_price,
                    expiry_date = EXCLUDED.expiry_date,
                    daily_discount_pct = EXCLUDED.daily_discount_pct,
                    daily_discount_date = EXCLUDED.daily_discount_date,
                    updated_at = EXCLUDED.updated_at
                "#,
            )
            .bind(row.pharmacy_id)
            .bind(&row.code)
            .bind(&row.description)
            .bind(&row.laboratory)
            .bind(row.quantity_on_hand)
            .bind(row.unit_price)
            .bind(row.expiry_date)
            .bind(row.daily_discount.map(|d| d.pct))
            .bind(row.daily_discount.map(|d| d.date))
            .bind(row.updated_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
