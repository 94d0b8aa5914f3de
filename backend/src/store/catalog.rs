//! Catalog & offer store
//!
//! Holds one offer set per supplier plus the product reference data. Each
//! supplier's offer set sits behind its own `Arc` and is swapped whole on
//! publish, so a reader holding a snapshot sees either the set before an
//! upload or the set after it.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use shared::models::{OfferRow, Product, SearchTerm, SupplierOffer, UpsertOutcome};
use uuid::Uuid;

use super::locks::{KeyedLocks, WriterGuard};

type OfferSet = Arc<BTreeMap<String, SupplierOffer>>;

#[derive(Debug, Default)]
struct CatalogState {
    offers: BTreeMap<Uuid, OfferSet>,
    products: Arc<BTreeMap<String, Product>>,
}

/// Immutable view of the catalog at one instant
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    offers: BTreeMap<Uuid, OfferSet>,
    products: Arc<BTreeMap<String, Product>>,
}

impl CatalogSnapshot {
    /// Every offer for `code`, ordered by supplier id
    pub fn offers_for_product(&self, code: &str) -> Vec<&SupplierOffer> {
        self.offers
            .values()
            .filter_map(|set| set.get(code))
            .collect()
    }

    pub fn offers_for_supplier(&self, supplier_id: Uuid) -> Option<&BTreeMap<String, SupplierOffer>> {
        self.offers.get(&supplier_id).map(|set| set.as_ref())
    }

    pub fn product(&self, code: &str) -> Option<&Product> {
        self.products.get(code)
    }

    /// Products matching `term`, ordered by code
    pub fn search(&self, term: &SearchTerm) -> Vec<&Product> {
        self.products.values().filter(|p| term.matches(p)).collect()
    }

    pub fn product_count(&self) -> usize {
        self.products.len()
    }
}

/// Result of merging one upload into a supplier's current offer set
#[derive(Debug)]
pub struct UploadPlan {
    pub supplier_id: Uuid,
    /// Full offer set after the merge
    offers: BTreeMap<String, SupplierOffer>,
    /// Offers inserted or changed by this upload
    pub changed: Vec<SupplierOffer>,
    /// Product reference rows inserted or changed by this upload
    pub products: Vec<Product>,
    pub outcome: UpsertOutcome,
}

#[derive(Debug, Default)]
pub struct CatalogStore {
    state: RwLock<CatalogState>,
    writers: KeyedLocks,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole catalog, used when hydrating from the database
    pub fn load(&self, offers: Vec<SupplierOffer>, products: Vec<Product>) {
        let mut by_supplier: BTreeMap<Uuid, BTreeMap<String, SupplierOffer>> = BTreeMap::new();
        for offer in offers {
            by_supplier
                .entry(offer.supplier_id)
                .or_default()
                .insert(offer.code.clone(), offer);
        }

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.offers = by_supplier
            .into_iter()
            .map(|(id, set)| (id, Arc::new(set)))
            .collect();
        state.products = Arc::new(products.into_iter().map(|p| (p.code.clone(), p)).collect());
    }

    pub fn snapshot(&self) -> CatalogSnapshot {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        CatalogSnapshot {
            offers: state.offers.clone(),
            products: state.products.clone(),
        }
    }

    /// Exclusive write access to one supplier's offer set
    pub async fn lock_supplier(&self, supplier_id: Uuid) -> WriterGuard {
        self.writers.acquire(supplier_id).await
    }

    /// Merge validated `rows` into the supplier's current offer set.
    ///
    /// Existing codes are updated in place, new codes inserted, and codes
    /// absent from `rows` kept as they are. An unchanged row keeps its
    /// timestamp but still counts as updated.
    pub fn plan_upload(
        &self,
        writer: &WriterGuard,
        rows: &[OfferRow],
        now: DateTime<Utc>,
    ) -> UploadPlan {
        let supplier_id = writer.key();
        let snapshot = self.snapshot();
        let mut offers = snapshot
            .offers_for_supplier(supplier_id)
            .cloned()
            .unwrap_or_default();

        let mut changed: BTreeMap<String, SupplierOffer> = BTreeMap::new();
        let mut products: BTreeMap<String, Product> = BTreeMap::new();
        let mut outcome = UpsertOutcome::default();

        for row in rows {
            let offer = SupplierOffer::from_row(supplier_id, row, now);
            match offers.get(&offer.code) {
                Some(existing) => {
                    outcome.updated += 1;
                    if !existing.differs_from(row) {
                        continue;
                    }
                }
                None => outcome.inserted += 1,
            }

            let known = products
                .get(&offer.code)
                .or_else(|| snapshot.product(&offer.code));
            if let Some(product) = reference_update(known, &offer) {
                products.insert(product.code.clone(), product);
            }

            changed.insert(offer.code.clone(), offer.clone());
            offers.insert(offer.code.clone(), offer);
        }

        UploadPlan {
            supplier_id,
            offers,
            changed: changed.into_values().collect(),
            products: products.into_values().collect(),
            outcome,
        }
    }

    /// Swap in the merged offer set
    pub fn publish(&self, writer: &WriterGuard, plan: UploadPlan) {
        debug_assert_eq!(writer.key(), plan.supplier_id);

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if !plan.products.is_empty() {
            let mut products = state.products.as_ref().clone();
            for product in plan.products {
                products.insert(product.code.clone(), product);
            }
            state.products = Arc::new(products);
        }
        state.offers.insert(plan.supplier_id, Arc::new(plan.offers));
    }

    /// Drop the supplier's whole offer set and its writer lock
    pub fn remove_supplier(&self, writer: WriterGuard) -> usize {
        let removed = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            state
                .offers
                .remove(&writer.key())
                .map_or(0, |set| set.len())
        };
        self.writers.forget(writer);
        removed
    }
}

/// Product reference row to store for `offer`, if it adds anything
fn reference_update(known: Option<&Product>, offer: &SupplierOffer) -> Option<Product> {
    match known {
        None => Some(Product::new(
            offer.code.clone(),
            offer.description.clone(),
            offer.laboratory.clone(),
        )),
        Some(product) => {
            let description = if offer.description.is_empty() {
                &product.description
            } else {
                &offer.description
            };
            let laboratory = if offer.laboratory.is_empty() {
                &product.laboratory
            } else {
                &offer.laboratory
            };
            if description == &product.description && laboratory == &product.laboratory {
                return None;
            }
            Some(Product {
                description: description.clone(),
                laboratory: laboratory.clone(),
                ..product.clone()
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn row(code: &str, price: &str) -> OfferRow {
        OfferRow::new(code, &format!("{} desc", code), "Leti", dec(price))
    }

    async fn upload(store: &CatalogStore, supplier: Uuid, rows: &[OfferRow]) -> UpsertOutcome {
        let writer = store.lock_supplier(supplier).await;
        let plan = store.plan_upload(&writer, rows, Utc::now());
        let outcome = plan.outcome.clone();
        store.publish(&writer, plan);
        outcome
    }

    #[tokio::test]
    async fn test_reupload_is_idempotent() {
        let store = CatalogStore::new();
        let supplier = Uuid::from_u128(1);
        let rows = vec![row("A", "10"), row("B", "20")];

        let first = upload(&store, supplier, &rows).await;
        assert_eq!((first.inserted, first.updated), (2, 0));
        let before = store.snapshot();

        let second = upload(&store, supplier, &rows).await;
        assert_eq!((second.inserted, second.updated), (0, 2));

        let after = store.snapshot();
        assert_eq!(
            before.offers_for_supplier(supplier),
            after.offers_for_supplier(supplier)
        );
    }

    #[tokio::test]
    async fn test_partial_upload_keeps_missing_codes() {
        let store = CatalogStore::new();
        let supplier = Uuid::from_u128(1);
        upload(&store, supplier, &[row("A", "10"), row("B", "20"), row("C", "30")]).await;

        let outcome = upload(&store, supplier, &[row("A", "11"), row("B", "20")]).await;
        assert_eq!((outcome.inserted, outcome.updated), (0, 2));

        let snapshot = store.snapshot();
        let offers = snapshot.offers_for_supplier(supplier).unwrap();
        assert_eq!(offers.len(), 3);
        assert_eq!(offers["A"].list_price, dec("11"));
        assert_eq!(offers["C"].list_price, dec("30"));
    }

    #[tokio::test]
    async fn test_offers_for_product_across_suppliers() {
        let store = CatalogStore::new();
        upload(&store, Uuid::from_u128(2), &[row("A", "12")]).await;
        upload(&store, Uuid::from_u128(1), &[row("A", "10"), row("B", "5")]).await;

        let snapshot = store.snapshot();
        let offers = snapshot.offers_for_product("A");
        assert_eq!(offers.len(), 2);
        assert_eq!(offers[0].supplier_id, Uuid::from_u128(1));
        assert_eq!(snapshot.product_count(), 2);
        assert!(snapshot.offers_for_product("Z").is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_is_isolated_from_later_uploads() {
        let store = CatalogStore::new();
        let supplier = Uuid::from_u128(1);
        upload(&store, supplier, &[row("A", "10")]).await;

        let before = store.snapshot();
        upload(&store, supplier, &[row("A", "99"), row("B", "1")]).await;

        let offers = before.offers_for_supplier(supplier).unwrap();
        assert_eq!(offers.len(), 1);
        assert_eq!(offers["A"].list_price, dec("10"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_uploads_never_interleave() {
        let store = Arc::new(CatalogStore::new());
        let supplier = Uuid::from_u128(1);
        let old: Vec<OfferRow> = (0..50).map(|i| row(&format!("P{:03}", i), "1")).collect();
        let new: Vec<OfferRow> = (0..50).map(|i| row(&format!("P{:03}", i), "2")).collect();
        upload(&store, supplier, &old).await;

        let writer = {
            let store = store.clone();
            tokio::spawn(async move {
                for _ in 0..20 {
                    upload(&store, supplier, &new).await;
                    upload(&store, supplier, &old).await;
                }
            })
        };

        for _ in 0..200 {
            let snapshot = store.snapshot();
            let offers = snapshot.offers_for_supplier(supplier).unwrap();
            let first = offers.values().next().unwrap().list_price;
            assert!(offers.values().all(|o| o.list_price == first));
            tokio::task::yield_now().await;
        }
        writer.await.unwrap();
    }

    #[tokio::test]
    async fn test_remove_supplier_drops_offers() {
        let store = CatalogStore::new();
        let supplier = Uuid::from_u128(1);
        upload(&store, supplier, &[row("A", "10"), row("B", "20")]).await;

        let writer = store.lock_supplier(supplier).await;
        assert_eq!(store.remove_supplier(writer), 2);

        let snapshot = store.snapshot();
        assert!(snapshot.offers_for_supplier(supplier).is_none());
        assert!(snapshot.product("A").is_some());
    }

    #[test]
    fn test_search_matches_reference_data() {
        let store = CatalogStore::new();
        store.load(
            Vec::new(),
            vec![
                Product::new("AMX-500", "Amoxicilina 500mg", "Leti"),
                Product::new("IBU-400", "Ibuprofeno 400mg", "Genven"),
            ],
        );
        let snapshot = store.snapshot();
        let hits = snapshot.search(&SearchTerm::parse("genven").unwrap());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].code, "IBU-400");
    }
}
