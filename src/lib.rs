// ============================================================================
// spark-view - A Reactive View-Binding Engine for Rust
// ============================================================================
//
// Binds named data fields into a host node tree. Every expression a node
// evaluates records that node as a subscriber of the fields it read; writing
// a field re-renders exactly those nodes, synchronously.
//
// Layers, bottom up:
//   core        values, ids, errors, constants
//   reactivity  reactive cells and the data store
//   expression  parser, field inference, interpreter
//   view        host tree trait, snapshots, directives, render steps
//   app         mount / unmount / set and the public handle
//   memory      an in-memory host tree
// ============================================================================

pub mod app;
pub mod core;
pub mod expression;
pub mod memory;
pub mod reactivity;
pub mod view;

mod macros;

// Re-export the everyday surface at crate root
pub use app::{App, AppOptions, Method};
pub use core::constants;
pub use core::error::{
    ConstructionError, Error, ExpressionError, InvalidDirectiveError, RenderTargetError, Result,
};
pub use core::types::{ElementRef, Event, ListenerId, NodeId, TextRef};
pub use core::value::Value;
pub use memory::MemoryTree;
pub use reactivity::{DataStore, ReactiveCell};
pub use view::{Directive, DirectiveBinding, NodeSnapshot, PresentationTree};

// =============================================================================
// TESTS
// =============================================================================
