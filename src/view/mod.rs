// ============================================================================
// spark-view - View Module
// Host tree abstraction, node snapshots, directives and render steps
// ============================================================================

pub mod directive;
pub mod interpolate;
pub(crate) mod render;
pub mod snapshot;
pub mod tree;

pub use directive::{Directive, DirectiveBinding, DirectiveRegistry, Hook};
pub use snapshot::{AttributeKind, AttributeSnapshot, EventBinding, NodeSnapshot, TextSnapshot};
pub use tree::{Listener, PresentationTree, ValueListener};
