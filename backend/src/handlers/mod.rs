//! HTTP request handlers

mod catalog;
mod health;
mod inventory;
mod pharmacy;
mod purchasing;
mod reporting;
mod supplier;

pub use catalog::*;
pub use health::*;
pub use inventory::*;
pub use pharmacy::*;
pub use purchasing::*;
pub use reporting::*;
pub use supplier::*;
