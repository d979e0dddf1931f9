// ============================================================================
// spark-view - Presentation Tree
// The host's node tree, as seen by the engine
// ============================================================================

use std::rc::Rc;

use crate::core::error::Error;
use crate::core::types::{ElementRef, Event, ListenerId, TextRef};

/// Event listener registered on a live element.
pub type Listener = Rc<dyn Fn(&Event) -> Result<(), Error>>;

/// Observer for a live attribute or property value; receives the new text.
pub type ValueListener = Rc<dyn Fn(&str) -> Result<(), Error>>;

/// A host node tree the engine binds data into.
///
/// Elements and text nodes are opaque handles. The engine never holds a
/// borrow of the host across calls into it, and hosts must not hold their
/// own borrows while invoking listeners: a listener may call straight back
/// into the tree.
///
/// Attributes are the markup view of a node (`:class` and `@click` live
/// there before mount). Properties are live state such as an input's current
/// `value`, which may drift from its attribute. Display is the node's
/// display mode (`"none"` when hidden, `""` for the host default).
pub trait PresentationTree {
    /// Find an element by selector.
    fn select(&self, selector: &str) -> Option<ElementRef>;

    fn tag_name(&self, element: ElementRef) -> String;

    /// All attributes, in document order.
    fn attributes(&self, element: ElementRef) -> Vec<(String, String)>;

    fn attribute(&self, element: ElementRef, name: &str) -> Option<String>;

    /// Set an attribute. Fires value-changed observers for `name` when the
    /// value actually changes; the first observer error is returned after
    /// every observer has run.
    fn set_attribute(&self, element: ElementRef, name: &str, value: &str) -> Result<(), Error>;

    fn remove_attribute(&self, element: ElementRef, name: &str);

    /// Child elements, in document order.
    fn children(&self, element: ElementRef) -> Vec<ElementRef>;

    /// Direct text-node children, in document order.
    fn text_nodes(&self, element: ElementRef) -> Vec<TextRef>;

    fn text_content(&self, text: TextRef) -> String;

    fn set_text_content(&self, text: TextRef, content: &str);

    /// A live property, or `None` when the element has no such property.
    fn property(&self, element: ElementRef, name: &str) -> Option<String>;

    fn set_property(&self, element: ElementRef, name: &str, value: &str);

    fn display(&self, element: ElementRef) -> String;

    fn set_display(&self, element: ElementRef, display: &str);

    fn add_event_listener(&self, element: ElementRef, event: &str, listener: Listener)
    -> ListenerId;

    /// Observe changes to the live attribute `name` of `element`.
    fn on_value_changed(&self, element: ElementRef, name: &str, listener: ValueListener)
    -> ListenerId;

    /// Detach a listener or observer. Unknown ids are ignored.
    fn remove_listener(&self, element: ElementRef, listener: ListenerId);
}
