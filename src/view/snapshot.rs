// ============================================================================
// spark-view - Node Snapshots
// What a node looked like at mount time, plus its per-node render state
// ============================================================================

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

use super::tree::PresentationTree;
use crate::core::constants::{
    BOUND_PREFIX, DEFAULT_MODEL_PROPERTY, DIRECTIVE_PREFIX, DISPLAY_HIDDEN, EVENT_PREFIX,
    MODEL_DIRECTIVE,
};
use crate::core::types::{ElementRef, ListenerId, NodeId, TextRef};

// =============================================================================
// ATTRIBUTES
// =============================================================================

/// How the engine reads one captured attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeKind {
    /// Left alone.
    Plain,
    /// `:target="expr"`
    Bound { target: String },
    /// `e-model[:property]="field"`
    Model { property: String, field: String },
    /// `e-name="expr"`
    Directive { name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSnapshot {
    pub name: String,
    pub value: String,
    pub kind: AttributeKind,
}

impl AttributeSnapshot {
    fn classify(name: String, value: String) -> Self {
        let kind = if let Some(target) = name.strip_prefix(BOUND_PREFIX) {
            AttributeKind::Bound {
                target: target.to_string(),
            }
        } else if let Some(directive) = name.strip_prefix(DIRECTIVE_PREFIX) {
            match directive.split_once(BOUND_PREFIX) {
                Some((MODEL_DIRECTIVE, property)) if !property.is_empty() => AttributeKind::Model {
                    property: property.to_string(),
                    field: value.clone(),
                },
                _ if directive == MODEL_DIRECTIVE => AttributeKind::Model {
                    property: DEFAULT_MODEL_PROPERTY.to_string(),
                    field: value.clone(),
                },
                _ => AttributeKind::Directive {
                    name: directive.to_string(),
                },
            }
        } else {
            AttributeKind::Plain
        };
        Self { name, value, kind }
    }
}

/// `@event="method"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventBinding {
    pub event: String,
    pub method: String,
}

/// A text node and the content it had at mount time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSnapshot {
    pub node: TextRef,
    pub original: String,
}

// =============================================================================
// NODE SNAPSHOT
// =============================================================================

/// One element as captured at mount.
///
/// The captured attributes, events and text are fixed once taken; only the
/// render bookkeeping (events bound, observed model properties, host
/// listeners, remembered display) changes afterwards.
#[derive(Debug)]
pub struct NodeSnapshot {
    id: NodeId,
    element: ElementRef,
    tag: String,
    attributes: Vec<AttributeSnapshot>,
    events: Vec<EventBinding>,
    texts: Vec<TextSnapshot>,
    parent: Cell<Option<NodeId>>,
    children: Vec<NodeId>,

    events_bound: Cell<bool>,
    observed: RefCell<HashSet<String>>,
    listeners: RefCell<Vec<ListenerId>>,
    remembered_display: RefCell<Option<String>>,
}

impl NodeSnapshot {
    /// Capture `element` under `id`. Children must already be captured.
    pub fn capture(
        tree: &dyn PresentationTree,
        element: ElementRef,
        id: NodeId,
        children: Vec<NodeId>,
    ) -> Self {
        let mut attributes = Vec::new();
        let mut events = Vec::new();
        for (name, value) in tree.attributes(element) {
            match name.strip_prefix(EVENT_PREFIX) {
                Some(event) => events.push(EventBinding {
                    event: event.to_string(),
                    method: value,
                }),
                None => attributes.push(AttributeSnapshot::classify(name, value)),
            }
        }

        let texts = tree
            .text_nodes(element)
            .into_iter()
            .map(|node| TextSnapshot {
                node,
                original: tree.text_content(node),
            })
            .collect();

        let display = tree.display(element);
        let remembered_display = (display != DISPLAY_HIDDEN).then_some(display);

        Self {
            id,
            element,
            tag: tree.tag_name(element),
            attributes,
            events,
            texts,
            parent: Cell::new(None),
            children,
            events_bound: Cell::new(false),
            observed: RefCell::new(HashSet::new()),
            listeners: RefCell::new(Vec::new()),
            remembered_display: RefCell::new(remembered_display),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn element(&self) -> ElementRef {
        self.element
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Captured attributes in document order, events excluded.
    pub fn attributes(&self) -> &[AttributeSnapshot] {
        &self.attributes
    }

    pub fn events(&self) -> &[EventBinding] {
        &self.events
    }

    pub fn texts(&self) -> &[TextSnapshot] {
        &self.texts
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent.get()
    }

    pub(crate) fn set_parent(&self, parent: NodeId) {
        self.parent.set(Some(parent));
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn events_bound(&self) -> bool {
        self.events_bound.get()
    }

    pub(crate) fn mark_events_bound(&self) {
        self.events_bound.set(true);
    }

    /// Mark a model property as observed. True the first time only.
    pub(crate) fn observe_property(&self, property: &str) -> bool {
        self.observed.borrow_mut().insert(property.to_string())
    }

    /// Record a listener the engine registered on this node's element.
    pub(crate) fn track_listener(&self, listener: ListenerId) {
        self.listeners.borrow_mut().push(listener);
    }

    /// Hand back every tracked listener, forgetting them.
    pub(crate) fn take_listeners(&self) -> Vec<ListenerId> {
        std::mem::take(&mut *self.listeners.borrow_mut())
    }

    /// Last display mode seen while visible.
    pub fn remembered_display(&self) -> Option<String> {
        self.remembered_display.borrow().clone()
    }

    pub(crate) fn remember_display(&self, display: String) {
        *self.remembered_display.borrow_mut() = Some(display);
    }
}

// =============================================================================
// ARENA CAPTURE
// =============================================================================

/// Snapshot `element` and its whole subtree into `arena`, children first.
/// Returns the id of `element`'s snapshot.
pub(crate) fn capture_tree(
    tree: &dyn PresentationTree,
    element: ElementRef,
    generation: u32,
    arena: &mut Vec<Rc<NodeSnapshot>>,
) -> NodeId {
    let children = tree
        .children(element)
        .into_iter()
        .map(|child| capture_tree(tree, child, generation, arena))
        .collect();
    let id = NodeId::new(arena.len(), generation);
    arena.push(Rc::new(NodeSnapshot::capture(tree, element, id, children)));
    id
}

/// Point every child snapshot at its parent.
pub(crate) fn link_parents(arena: &[Rc<NodeSnapshot>]) {
    for snapshot in arena {
        for child in snapshot.children() {
            if let Some(child) = arena.get(child.index()) {
                child.set_parent(snapshot.id());
            }
        }
    }
}

/// Ids of `root`'s descendants, depth-first, parents before children.
pub(crate) fn descendants(arena: &[Rc<NodeSnapshot>], root: NodeId) -> Vec<NodeId> {
    let mut order = Vec::new();
    let mut stack: Vec<NodeId> = match arena.get(root.index()) {
        Some(snapshot) => snapshot.children().iter().rev().copied().collect(),
        None => return order,
    };
    while let Some(id) = stack.pop() {
        order.push(id);
        if let Some(snapshot) = arena.get(id.index()) {
            stack.extend(snapshot.children().iter().rev().copied());
        }
    }
    order
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(name: &str, value: &str) -> AttributeKind {
        AttributeSnapshot::classify(name.to_string(), value.to_string()).kind
    }

    #[test]
    fn attribute_classification() {
        assert_eq!(kind("id", "x"), AttributeKind::Plain);
        assert_eq!(
            kind(":title", "msg"),
            AttributeKind::Bound {
                target: "title".into()
            }
        );
        assert_eq!(
            kind("e-model", "name"),
            AttributeKind::Model {
                property: "value".into(),
                field: "name".into()
            }
        );
        assert_eq!(
            kind("e-model:checked", "done"),
            AttributeKind::Model {
                property: "checked".into(),
                field: "done".into()
            }
        );
        assert_eq!(
            kind("e-show", "visible"),
            AttributeKind::Directive {
                name: "show".into()
            }
        );
        assert_eq!(
            kind("e-models", "x"),
            AttributeKind::Directive {
                name: "models".into()
            }
        );
    }
}
