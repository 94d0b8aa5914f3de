//! Stock store
//!
//! One stock set per pharmacy, published copy-on-write exactly like the
//! supplier offer sets in the catalog store.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use shared::models::{DailyDiscount, PharmacyStock, StockRow, UpsertOutcome};
use uuid::Uuid;

use super::locks::{KeyedLocks, WriterGuard};

type StockSet = Arc<BTreeMap<String, PharmacyStock>>;

/// Immutable view of every pharmacy's stock at one instant
#[derive(Debug, Clone, Default)]
pub struct StockSnapshot {
    pharmacies: BTreeMap<Uuid, StockSet>,
}

impl StockSnapshot {
    /// All stock rows, ordered by pharmacy id then code
    pub fn rows(&self) -> impl Iterator<Item = &PharmacyStock> {
        self.pharmacies.values().flat_map(|set| set.values())
    }

    pub fn for_pharmacy(&self, pharmacy_id: Uuid) -> Option<&BTreeMap<String, PharmacyStock>> {
        self.pharmacies.get(&pharmacy_id).map(|set| set.as_ref())
    }
}

/// Result of merging an inventory import into a pharmacy's stock set
#[derive(Debug)]
pub struct ImportPlan {
    pub pharmacy_id: Uuid,
    stock: BTreeMap<String, PharmacyStock>,
    /// Rows inserted or changed by this import
    pub changed: Vec<PharmacyStock>,
    pub outcome: UpsertOutcome,
}

#[derive(Debug, Default)]
pub struct StockStore {
    state: RwLock<BTreeMap<Uuid, StockSet>>,
    writers: KeyedLocks,
}

impl StockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all stock, used when hydrating from the database
    pub fn load(&self, rows: Vec<PharmacyStock>) {
        let mut by_pharmacy: BTreeMap<Uuid, BTreeMap<String, PharmacyStock>> = BTreeMap::new();
        for row in rows {
            by_pharmacy
                .entry(row.pharmacy_id)
                .or_default()
                .insert(row.code.clone(), row);
        }

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        *state = by_pharmacy
            .into_iter()
            .map(|(id, set)| (id, Arc::new(set)))
            .collect();
    }

    pub fn snapshot(&self) -> StockSnapshot {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        StockSnapshot {
            pharmacies: state.clone(),
        }
    }

    /// Exclusive write access to one pharmacy's stock
    pub async fn lock_pharmacy(&self, pharmacy_id: Uuid) -> WriterGuard {
        self.writers.acquire(pharmacy_id).await
    }

    fn current(&self, pharmacy_id: Uuid) -> BTreeMap<String, PharmacyStock> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state
            .get(&pharmacy_id)
            .map(|set| set.as_ref().clone())
            .unwrap_or_default()
    }

    /// Merge validated `rows` into the pharmacy's stock by product code.
    /// Codes absent from `rows` are kept; a daily discount already set on a
    /// row survives the re-import.
    pub fn plan_import(&self, writer: &WriterGuard, rows: &[StockRow], now: DateTime<Utc>) -> ImportPlan {
        let pharmacy_id = writer.key();
        let mut stock = self.current(pharmacy_id);
        let mut changed: BTreeMap<String, PharmacyStock> = BTreeMap::new();
        let mut outcome = UpsertOutcome::default();

        for row in rows {
            let mut entry = PharmacyStock::from_row(pharmacy_id, row, now);
            match stock.get(&entry.code) {
                Some(existing) => {
                    outcome.updated += 1;
                    if !existing.differs_from(row) {
                        continue;
                    }
                    entry.daily_discount = existing.daily_discount;
                }
                None => outcome.inserted += 1,
            }
            changed.insert(entry.code.clone(), entry.clone());
            stock.insert(entry.code.clone(), entry);
        }

        ImportPlan {
            pharmacy_id,
            stock,
            changed: changed.into_values().collect(),
            outcome,
        }
    }

    /// Set `discount` on every stock row of the pharmacy
    pub fn plan_daily_discount(
        &self,
        writer: &WriterGuard,
        discount: DailyDiscount,
        now: DateTime<Utc>,
    ) -> ImportPlan {
        let pharmacy_id = writer.key();
        let mut stock = self.current(pharmacy_id);
        for entry in stock.values_mut() {
            entry.daily_discount = Some(discount);
            entry.updated_at = now;
        }

        ImportPlan {
            pharmacy_id,
            changed: stock.values().cloned().collect(),
            outcome: UpsertOutcome {
                updated: stock.len(),
                ..UpsertOutcome::default()
            },
            stock,
        }
    }

    pub fn publish(&self, writer: &WriterGuard, plan: ImportPlan) {
        debug_assert_eq!(writer.key(), plan.pharmacy_id);
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.insert(plan.pharmacy_id, Arc::new(plan.stock));
    }

    /// Drop the pharmacy's whole stock set and its writer lock
    pub fn remove_pharmacy(&self, writer: WriterGuard) -> usize {
        let removed = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            state.remove(&writer.key()).map_or(0, |set| set.len())
        };
        self.writers.forget(writer);
        removed
    }
}
