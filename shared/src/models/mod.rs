//! Domain models for the PharmaNet console

mod comparison;
mod pharmacy;
mod product;
mod purchase;
mod supplier;

pub use comparison::*;
pub use pharmacy::*;
pub use product::*;
pub use purchase::*;
pub use supplier::*;
