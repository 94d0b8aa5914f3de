//! Shared types and pricing engine for the PharmaNet console
//!
//! This crate holds the typed records and the pure computations (discount
//! calculation, price comparison, inventory aggregation, purchase
//! consolidation) used by the backend and by the browser via WASM.

pub mod engine;
pub mod models;
pub mod types;
pub mod validation;

pub use engine::*;
pub use models::*;
pub use types::*;
pub use validation::*;
