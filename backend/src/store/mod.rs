//! In-memory stores backing the console
//!
//! The catalog and stock stores are the only mutable state the engine reads.
//! Queries work on snapshots; writers take a per-key lock, plan the merge,
//! persist it, then publish.

pub mod catalog;
pub mod directory;
pub mod locks;
pub mod stock;

pub use catalog::{CatalogSnapshot, CatalogStore};
pub use directory::Directory;
pub use stock::StockStore;
