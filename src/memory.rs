// ============================================================================
// spark-view - In-Memory Tree
// A headless PresentationTree host
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use crate::core::constants::DEFAULT_MODEL_PROPERTY;
use crate::core::error::Error;
use crate::core::types::{ElementRef, Event, ListenerId, TextRef};
use crate::view::tree::{Listener, PresentationTree, ValueListener};

/// Tags whose elements start with a live `value` property.
const VALUE_TAGS: [&str; 3] = ["input", "textarea", "select"];

#[derive(Clone, Copy)]
enum Child {
    Element(ElementRef),
    Text(TextRef),
}

struct ElementData {
    tag: String,
    attributes: IndexMap<String, String>,
    properties: IndexMap<String, String>,
    display: String,
    children: Vec<Child>,
    listeners: Vec<(ListenerId, String, Listener)>,
    observers: Vec<(ListenerId, String, ValueListener)>,
}

#[derive(Default)]
struct Dom {
    elements: Vec<ElementData>,
    texts: Vec<String>,
    next_listener: u64,
}

impl Dom {
    fn element(&self, element: ElementRef) -> Option<&ElementData> {
        self.elements.get(element.0 as usize)
    }

    fn element_mut(&mut self, element: ElementRef) -> Option<&mut ElementData> {
        self.elements.get_mut(element.0 as usize)
    }

    fn listener_id(&mut self) -> ListenerId {
        self.next_listener += 1;
        ListenerId(self.next_listener)
    }
}

// =============================================================================
// MEMORY TREE
// =============================================================================

/// An in-memory node tree.
///
/// Cloning gives another handle to the same tree, so a test can keep one
/// handle while an [`App`](crate::App) owns another. Elements are selected
/// in creation order. Listeners and observers run with no borrow of the
/// tree held, so they may freely read and write it.
///
/// # Example
///
/// ```
/// use spark_view::{MemoryTree, PresentationTree};
///
/// let tree = MemoryTree::new();
/// let root = tree.element_with("div", &[("id", "app")]);
/// let field = tree.child(root, "input", &[]);
///
/// assert_eq!(tree.select("#app"), Some(root));
/// assert_eq!(tree.select("input"), Some(field));
/// assert_eq!(tree.property(field, "value"), Some(String::new()));
/// ```
#[derive(Clone, Default)]
pub struct MemoryTree {
    dom: Rc<RefCell<Dom>>,
}

impl MemoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // BUILDING
    // =========================================================================

    /// Create a detached element.
    pub fn element(&self, tag: &str) -> ElementRef {
        let mut dom = self.dom.borrow_mut();
        let mut properties = IndexMap::new();
        if VALUE_TAGS.contains(&tag.to_ascii_lowercase().as_str()) {
            properties.insert(DEFAULT_MODEL_PROPERTY.to_string(), String::new());
        }
        dom.elements.push(ElementData {
            tag: tag.to_string(),
            attributes: IndexMap::new(),
            properties,
            display: String::new(),
            children: Vec::new(),
            listeners: Vec::new(),
            observers: Vec::new(),
        });
        ElementRef(dom.elements.len() as u64 - 1)
    }

    /// Create a detached element with attributes, in order.
    pub fn element_with(&self, tag: &str, attributes: &[(&str, &str)]) -> ElementRef {
        let element = self.element(tag);
        if let Some(data) = self.dom.borrow_mut().element_mut(element) {
            for (name, value) in attributes {
                data.attributes.insert(name.to_string(), value.to_string());
            }
        }
        element
    }

    /// Create an element with attributes and append it to `parent`.
    pub fn child(&self, parent: ElementRef, tag: &str, attributes: &[(&str, &str)]) -> ElementRef {
        let element = self.element_with(tag, attributes);
        self.append_child(parent, element);
        element
    }

    pub fn append_child(&self, parent: ElementRef, child: ElementRef) {
        if let Some(data) = self.dom.borrow_mut().element_mut(parent) {
            data.children.push(Child::Element(child));
        }
    }

    /// Append a text node to `parent`.
    pub fn append_text(&self, parent: ElementRef, content: &str) -> TextRef {
        let mut dom = self.dom.borrow_mut();
        dom.texts.push(content.to_string());
        let text = TextRef(dom.texts.len() as u64 - 1);
        if let Some(data) = dom.element_mut(parent) {
            data.children.push(Child::Text(text));
        }
        text
    }

    // =========================================================================
    // INSPECTION
    // =========================================================================

    /// Current content of a text node.
    pub fn text(&self, text: TextRef) -> String {
        self.text_content(text)
    }

    /// Concatenated content of an element's direct text nodes.
    pub fn inner_text(&self, element: ElementRef) -> String {
        self.text_nodes(element)
            .into_iter()
            .map(|text| self.text_content(text))
            .collect()
    }

    pub fn listener_count(&self, element: ElementRef, event: &str) -> usize {
        self.dom
            .borrow()
            .element(element)
            .map(|data| data.listeners.iter().filter(|(_, name, _)| name == event).count())
            .unwrap_or(0)
    }

    pub fn observer_count(&self, element: ElementRef, name: &str) -> usize {
        self.dom
            .borrow()
            .element(element)
            .map(|data| data.observers.iter().filter(|(_, watched, _)| watched == name).count())
            .unwrap_or(0)
    }

    // =========================================================================
    // EVENTS
    // =========================================================================

    /// Fire `event` on `element`.
    ///
    /// Every listener runs, in registration order; the first error is
    /// returned once they all have.
    pub fn dispatch(&self, element: ElementRef, event: &str) -> Result<(), Error> {
        let listeners: Vec<Listener> = self
            .dom
            .borrow()
            .element(element)
            .map(|data| {
                data.listeners
                    .iter()
                    .filter(|(_, name, _)| name == event)
                    .map(|(_, _, listener)| listener.clone())
                    .collect()
            })
            .unwrap_or_default();

        let event = Event::new(event, element);
        let mut first_error = None;
        for listener in listeners {
            if let Err(err) = listener(&event) {
                first_error.get_or_insert(err);
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Simulate typing: replace the live `value` property, then fire `input`.
    pub fn input(&self, element: ElementRef, value: &str) -> Result<(), Error> {
        self.set_property(element, DEFAULT_MODEL_PROPERTY, value);
        self.dispatch(element, "input")
    }

    /// Like [`input`](Self::input), firing `change`.
    pub fn change(&self, element: ElementRef, value: &str) -> Result<(), Error> {
        self.set_property(element, DEFAULT_MODEL_PROPERTY, value);
        self.dispatch(element, "change")
    }
}

// =============================================================================
// PRESENTATION TREE
// =============================================================================

impl PresentationTree for MemoryTree {
    /// `#id` matches the `id` attribute; anything else matches the tag name,
    /// case-insensitively.
    fn select(&self, selector: &str) -> Option<ElementRef> {
        let dom = self.dom.borrow();
        let position = match selector.strip_prefix('#') {
            Some(id) => dom
                .elements
                .iter()
                .position(|data| data.attributes.get("id").map(String::as_str) == Some(id)),
            None => dom
                .elements
                .iter()
                .position(|data| data.tag.eq_ignore_ascii_case(selector)),
        };
        position.map(|index| ElementRef(index as u64))
    }

    fn tag_name(&self, element: ElementRef) -> String {
        self.dom
            .borrow()
            .element(element)
            .map(|data| data.tag.clone())
            .unwrap_or_default()
    }

    fn attributes(&self, element: ElementRef) -> Vec<(String, String)> {
        self.dom
            .borrow()
            .element(element)
            .map(|data| {
                data.attributes
                    .iter()
                    .map(|(name, value)| (name.clone(), value.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn attribute(&self, element: ElementRef, name: &str) -> Option<String> {
        self.dom
            .borrow()
            .element(element)
            .and_then(|data| data.attributes.get(name).cloned())
    }

    fn set_attribute(&self, element: ElementRef, name: &str, value: &str) -> Result<(), Error> {
        let observers: Vec<ValueListener> = {
            let mut dom = self.dom.borrow_mut();
            let Some(data) = dom.element_mut(element) else {
                return Ok(());
            };
            let previous = data.attributes.insert(name.to_string(), value.to_string());
            if previous.as_deref() == Some(value) {
                return Ok(());
            }
            data.observers
                .iter()
                .filter(|(_, watched, _)| watched == name)
                .map(|(_, _, observer)| observer.clone())
                .collect()
        };

        let mut first_error = None;
        for observer in observers {
            if let Err(err) = observer(value) {
                first_error.get_or_insert(err);
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn remove_attribute(&self, element: ElementRef, name: &str) {
        if let Some(data) = self.dom.borrow_mut().element_mut(element) {
            data.attributes.shift_remove(name);
        }
    }

    fn children(&self, element: ElementRef) -> Vec<ElementRef> {
        self.dom
            .borrow()
            .element(element)
            .map(|data| {
                data.children
                    .iter()
                    .filter_map(|child| match child {
                        Child::Element(element) => Some(*element),
                        Child::Text(_) => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn text_nodes(&self, element: ElementRef) -> Vec<TextRef> {
        self.dom
            .borrow()
            .element(element)
            .map(|data| {
                data.children
                    .iter()
                    .filter_map(|child| match child {
                        Child::Text(text) => Some(*text),
                        Child::Element(_) => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn text_content(&self, text: TextRef) -> String {
        self.dom
            .borrow()
            .texts
            .get(text.0 as usize)
            .cloned()
            .unwrap_or_default()
    }

    fn set_text_content(&self, text: TextRef, content: &str) {
        if let Some(slot) = self.dom.borrow_mut().texts.get_mut(text.0 as usize) {
            *slot = content.to_string();
        }
    }

    fn property(&self, element: ElementRef, name: &str) -> Option<String> {
        self.dom
            .borrow()
            .element(element)
            .and_then(|data| data.properties.get(name).cloned())
    }

    fn set_property(&self, element: ElementRef, name: &str, value: &str) {
        if let Some(data) = self.dom.borrow_mut().element_mut(element) {
            data.properties.insert(name.to_string(), value.to_string());
        }
    }

    fn display(&self, element: ElementRef) -> String {
        self.dom
            .borrow()
            .element(element)
            .map(|data| data.display.clone())
            .unwrap_or_default()
    }

    fn set_display(&self, element: ElementRef, display: &str) {
        if let Some(data) = self.dom.borrow_mut().element_mut(element) {
            data.display = display.to_string();
        }
    }

    fn add_event_listener(
        &self,
        element: ElementRef,
        event: &str,
        listener: Listener,
    ) -> ListenerId {
        let mut dom = self.dom.borrow_mut();
        let id = dom.listener_id();
        if let Some(data) = dom.element_mut(element) {
            data.listeners.push((id, event.to_string(), listener));
        }
        id
    }

    fn on_value_changed(
        &self,
        element: ElementRef,
        name: &str,
        listener: ValueListener,
    ) -> ListenerId {
        let mut dom = self.dom.borrow_mut();
        let id = dom.listener_id();
        if let Some(data) = dom.element_mut(element) {
            data.observers.push((id, name.to_string(), listener));
        }
        id
    }

    fn remove_listener(&self, element: ElementRef, listener: ListenerId) {
        if let Some(data) = self.dom.borrow_mut().element_mut(element) {
            data.listeners.retain(|(id, _, _)| *id != listener);
            data.observers.retain(|(id, _, _)| *id != listener);
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn children_and_texts_keep_document_order() {
        let tree = MemoryTree::new();
        let root = tree.element("div");
        let first = tree.append_text(root, "a");
        let span = tree.child(root, "span", &[]);
        let second = tree.append_text(root, "b");

        assert_eq!(tree.children(root), vec![span]);
        assert_eq!(tree.text_nodes(root), vec![first, second]);
        assert_eq!(tree.inner_text(root), "ab");
    }

    #[test]
    fn select_by_id_and_tag() {
        let tree = MemoryTree::new();
        let a = tree.element_with("DIV", &[("id", "a")]);
        let b = tree.element_with("p", &[("id", "b")]);
        assert_eq!(tree.select("#b"), Some(b));
        assert_eq!(tree.select("div"), Some(a));
        assert_eq!(tree.select("#missing"), None);
    }

    #[test]
    fn observers_fire_on_change_only() {
        let tree = MemoryTree::new();
        let el = tree.element("input");
        let calls = Rc::new(Cell::new(0));
        let seen = calls.clone();
        tree.on_value_changed(
            el,
            "value",
            Rc::new(move |_| {
                seen.set(seen.get() + 1);
                Ok(())
            }),
        );

        tree.set_attribute(el, "value", "x").unwrap();
        tree.set_attribute(el, "value", "x").unwrap();
        tree.set_attribute(el, "title", "t").unwrap();
        tree.set_attribute(el, "value", "y").unwrap();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn listeners_may_reenter_the_tree() {
        let tree = MemoryTree::new();
        let el = tree.element("button");
        let handle = tree.clone();
        tree.add_event_listener(
            el,
            "click",
            Rc::new(move |event| {
                handle.set_attribute(event.target, "clicked", "yes")
            }),
        );
        tree.dispatch(el, "click").unwrap();
        assert_eq!(tree.attribute(el, "clicked").as_deref(), Some("yes"));
    }

    #[test]
    fn dispatch_runs_every_listener_and_reports_first_error() {
        let tree = MemoryTree::new();
        let el = tree.element("button");
        let ran = Rc::new(Cell::new(0));
        for fail in [true, false] {
            let ran = ran.clone();
            tree.add_event_listener(
                el,
                "click",
                Rc::new(move |_| {
                    ran.set(ran.get() + 1);
                    if fail {
                        Err(Error::UndeclaredField { field: "x".into() })
                    } else {
                        Ok(())
                    }
                }),
            );
        }
        assert!(tree.dispatch(el, "click").is_err());
        assert_eq!(ran.get(), 2);
        assert_eq!(tree.listener_count(el, "click"), 2);
    }

    #[test]
    fn observer_errors_reach_the_writer() {
        let tree = MemoryTree::new();
        let el = tree.element("input");
        let ran = Rc::new(Cell::new(0));
        for fail in [true, false] {
            let ran = ran.clone();
            tree.on_value_changed(
                el,
                "value",
                Rc::new(move |_| {
                    ran.set(ran.get() + 1);
                    if fail {
                        Err(Error::UndeclaredField { field: "x".into() })
                    } else {
                        Ok(())
                    }
                }),
            );
        }
        assert!(matches!(
            tree.set_attribute(el, "value", "v"),
            Err(Error::UndeclaredField { .. })
        ));
        assert_eq!(ran.get(), 2);
        assert_eq!(tree.attribute(el, "value").as_deref(), Some("v"));
    }

    #[test]
    fn removed_listeners_stop_firing() {
        let tree = MemoryTree::new();
        let el = tree.element("input");
        let calls = Rc::new(Cell::new(0));
        let clicks = calls.clone();
        let listener = tree.add_event_listener(
            el,
            "click",
            Rc::new(move |_| {
                clicks.set(clicks.get() + 1);
                Ok(())
            }),
        );
        let changes = calls.clone();
        let observer = tree.on_value_changed(
            el,
            "value",
            Rc::new(move |_| {
                changes.set(changes.get() + 1);
                Ok(())
            }),
        );
        assert_ne!(listener, observer);

        tree.remove_listener(el, listener);
        tree.remove_listener(el, observer);
        tree.remove_listener(el, ListenerId(999));
        tree.dispatch(el, "click").unwrap();
        tree.set_attribute(el, "value", "x").unwrap();
        assert_eq!(calls.get(), 0);
        assert_eq!(tree.listener_count(el, "click"), 0);
        assert_eq!(tree.observer_count(el, "value"), 0);
    }

    #[test]
    fn only_form_elements_have_a_value_property() {
        let tree = MemoryTree::new();
        let input = tree.element("input");
        let div = tree.element("div");
        assert_eq!(tree.property(input, "value").as_deref(), Some(""));
        assert_eq!(tree.property(div, "value"), None);
    }
}
