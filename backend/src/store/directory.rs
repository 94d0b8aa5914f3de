//! Supplier and pharmacy directory

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use shared::models::{Pharmacy, Supplier};
use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct Directory {
    suppliers: RwLock<BTreeMap<Uuid, Supplier>>,
    pharmacies: RwLock<BTreeMap<Uuid, Pharmacy>>,
    writer: Mutex<()>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&self, suppliers: Vec<Supplier>, pharmacies: Vec<Pharmacy>) {
        *self.suppliers.write().unwrap_or_else(PoisonError::into_inner) =
            suppliers.into_iter().map(|s| (s.id, s)).collect();
        *self.pharmacies.write().unwrap_or_else(PoisonError::into_inner) =
            pharmacies.into_iter().map(|p| (p.id, p)).collect();
    }

    /// Serializes directory edits so name-uniqueness checks hold until the
    /// record is stored
    pub async fn lock_writer(&self) -> MutexGuard<'_, ()> {
        self.writer.lock().await
    }

    // ------------------------------------------------------------------------
    // Suppliers
    // ------------------------------------------------------------------------

    pub fn supplier(&self, id: Uuid) -> Option<Supplier> {
        self.suppliers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    /// All suppliers, ordered by name
    pub fn suppliers(&self) -> Vec<Supplier> {
        let mut suppliers: Vec<Supplier> = self
            .suppliers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        suppliers.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.id.cmp(&b.id))
        });
        suppliers
    }

    /// Whether another supplier already uses `name` (case-insensitive)
    pub fn supplier_name_taken(&self, name: &str, except: Option<Uuid>) -> bool {
        let name = name.trim().to_lowercase();
        self.suppliers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .any(|s| Some(s.id) != except && s.name.trim().to_lowercase() == name)
    }

    pub fn put_supplier(&self, supplier: Supplier) {
        self.suppliers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(supplier.id, supplier);
    }

    pub fn remove_supplier(&self, id: Uuid) -> Option<Supplier> {
        self.suppliers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
    }

    // ------------------------------------------------------------------------
    // Pharmacies
    // ------------------------------------------------------------------------

    pub fn pharmacy(&self, id: Uuid) -> Option<Pharmacy> {
        self.pharmacies
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    /// All pharmacies, ordered by name
    pub fn pharmacies(&self) -> Vec<Pharmacy> {
        let mut pharmacies: Vec<Pharmacy> = self
            .pharmacies
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        pharmacies.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.id.cmp(&b.id))
        });
        pharmacies
    }

    /// Whether another pharmacy already uses `name` (case-insensitive)
    pub fn pharmacy_name_taken(&self, name: &str, except: Option<Uuid>) -> bool {
        let name = name.trim().to_lowercase();
        self.pharmacies
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .any(|p| Some(p.id) != except && p.name.trim().to_lowercase() == name)
    }

    pub fn put_pharmacy(&self, pharmacy: Pharmacy) {
        self.pharmacies
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(pharmacy.id, pharmacy);
    }

    pub fn remove_pharmacy(&self, id: Uuid) -> Option<Pharmacy> {
        self.pharmacies
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
    }
}
