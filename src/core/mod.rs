// ============================================================================
// spark-view - Core Module
// Fundamental types, values, errors and constants
// ============================================================================

pub mod constants;
pub mod error;
pub mod types;
pub mod value;

// Re-export commonly used items
pub use constants::*;
pub use error::{
    ConstructionError, Error, ExpressionError, InvalidDirectiveError, RenderTargetError, Result,
};
pub use types::{ElementRef, Event, NodeId, TextRef};
pub use value::Value;
