// ============================================================================
// spark-view - Reactivity Module
// Observable data fields and their dependency edges
// ============================================================================

pub mod cell;
pub mod equality;
pub mod store;

pub use cell::ReactiveCell;
pub use equality::{equals, safe_equals_f64, safe_not_equal_f64};
pub use store::DataStore;
