//! Pricing and purchasing engine
//!
//! Every function here is a pure read-compute-return over records handed in
//! by the caller; the stores owning those records live in the backend.

pub mod aggregation;
pub mod comparison;
pub mod consolidation;
pub mod pricing;

pub use aggregation::{
    aggregate_overstock, aggregate_shortfall, classify_priority, shortfall_qty, PriorityPolicy,
};
pub use comparison::{compare_quotes, Quote};
pub use consolidation::{consolidate, order_lines};
pub use pricing::{compute_final_price, compute_final_price_with, price_offer, PricingPolicy};
