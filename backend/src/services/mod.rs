//! Business logic services for the PharmaNet console

pub mod catalog;
pub mod comparison;
pub mod inventory;
pub mod pharmacy;
pub mod purchasing;
pub mod reporting;
pub mod supplier;

pub use catalog::CatalogService;
pub use comparison::ComparisonService;
pub use inventory::InventoryService;
pub use pharmacy::PharmacyService;
pub use purchasing::PurchasingService;
pub use reporting::ReportingService;
pub use supplier::SupplierService;
