// ============================================================================
// spark-view - Data Store
// A record of named reactive cells
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use super::cell::ReactiveCell;
use crate::core::error::{Error, Result};
use crate::core::types::NodeId;
use crate::core::value::Value;

// =============================================================================
// DATA STORE
// =============================================================================

/// Named reactive fields.
///
/// Every field is its own [`ReactiveCell`], so reading `a` never subscribes
/// anyone to `b`. The store does not re-render anything: [`DataStore::set`]
/// hands back the nodes to re-render and the engine does the rest.
///
/// # Example
///
/// ```
/// use spark_view::{NodeId, Value};
/// use spark_view::reactivity::DataStore;
///
/// let store = DataStore::new();
/// store.declare("count", Value::from(0));
///
/// let node = NodeId::new(0, 0);
/// store.get("count", Some(node)).unwrap();
///
/// let dirty = store.set("count", Value::from(1)).unwrap();
/// assert_eq!(dirty, Some(vec![node]));
/// ```
#[derive(Default)]
pub struct DataStore {
    cells: RefCell<IndexMap<String, Rc<ReactiveCell>>>,
}

impl DataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a field with its initial value.
    ///
    /// Declaring an existing field keeps the existing cell, value and
    /// subscribers included, and returns false.
    pub fn declare(&self, field: impl Into<String>, initial: Value) -> bool {
        let field = field.into();
        let mut cells = self.cells.borrow_mut();
        if cells.contains_key(&field) {
            warn!(field = %field, "field declared twice, keeping the existing value");
            return false;
        }
        trace!(field = %field, value = %initial, "field declared");
        cells.insert(field, Rc::new(ReactiveCell::new(initial)));
        true
    }

    /// Check whether a field is declared (whatever its value).
    pub fn contains(&self, field: &str) -> bool {
        self.cells.borrow().contains_key(field)
    }

    /// Get the cell behind a field.
    pub fn cell(&self, field: &str) -> Option<Rc<ReactiveCell>> {
        self.cells.borrow().get(field).cloned()
    }

    fn require(&self, field: &str) -> Result<Rc<ReactiveCell>> {
        self.cell(field).ok_or_else(|| Error::UndeclaredField {
            field: field.to_string(),
        })
    }

    /// Read a field, subscribing `subscriber` to it when given.
    pub fn get(&self, field: &str, subscriber: Option<NodeId>) -> Result<Value> {
        let cell = self.require(field)?;
        if let Some(id) = subscriber {
            trace!(field, node = %id, "dependency captured");
        }
        Ok(cell.read(subscriber))
    }

    /// Read a field without subscribing.
    pub fn peek(&self, field: &str) -> Option<Value> {
        self.cell(field).map(|cell| cell.peek())
    }

    /// Write a field.
    ///
    /// `Ok(None)` means the value was equal and nothing changed;
    /// `Ok(Some(nodes))` lists the subscribers to re-render, in order.
    pub fn set(&self, field: &str, value: Value) -> Result<Option<Vec<NodeId>>> {
        let cell = self.require(field)?;
        let Some((old, nodes)) = cell.replace(value) else {
            return Ok(None);
        };
        debug!(field, old = %old, new = %cell.peek(), subscribers = nodes.len(), "field set");
        Ok(Some(nodes))
    }

    /// Declared field names, in declaration order.
    pub fn fields(&self) -> Vec<String> {
        self.cells.borrow().keys().cloned().collect()
    }

    /// Current subscribers of a field (empty when undeclared).
    pub fn subscribers(&self, field: &str) -> Vec<NodeId> {
        self.cell(field)
            .map(|cell| cell.subscribers())
            .unwrap_or_default()
    }

    /// Drop every dependency edge, keeping the values.
    pub fn clear_subscriptions(&self) {
        for cell in self.cells.borrow().values() {
            cell.clear_subscribers();
        }
    }

    pub fn len(&self) -> usize {
        self.cells.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn node(index: usize) -> NodeId {
        NodeId::new(index, 0)
    }

    #[test]
    fn fields_are_independent() {
        let store = DataStore::new();
        store.declare("a", Value::from(1));
        store.declare("b", Value::from(2));

        store.get("a", Some(node(0))).unwrap();

        assert_eq!(store.subscribers("a"), vec![node(0)]);
        assert!(store.subscribers("b").is_empty());
        assert_eq!(store.set("b", Value::from(3)).unwrap(), Some(vec![]));
    }

    #[test]
    fn equal_write_reports_nothing() {
        let store = DataStore::new();
        store.declare("name", Value::from("Ann"));
        store.get("name", Some(node(4))).unwrap();

        assert_eq!(store.set("name", Value::from("Ann")).unwrap(), None);
        assert_eq!(
            store.set("name", Value::from("Bo")).unwrap(),
            Some(vec![node(4)])
        );
        assert_eq!(store.peek("name"), Some(Value::from("Bo")));
    }

    #[test]
    fn undeclared_fields_are_errors() {
        let store = DataStore::new();
        assert_eq!(
            store.get("nope", None),
            Err(Error::UndeclaredField {
                field: "nope".into()
            })
        );
        assert!(store.set("nope", Value::Null).is_err());
        assert_eq!(store.peek("nope"), None);
    }

    #[test]
    fn redeclare_keeps_existing_cell() {
        let store = DataStore::new();
        assert!(store.declare("x", Value::from(1)));
        store.get("x", Some(node(1))).unwrap();

        assert!(!store.declare("x", Value::from(99)));
        assert_eq!(store.peek("x"), Some(Value::from(1)));
        assert_eq!(store.subscribers("x"), vec![node(1)]);
    }

    #[test]
    fn falsy_values_are_still_declared() {
        let store = DataStore::new();
        store.declare("zero", Value::from(0));
        store.declare("nothing", Value::Null);
        assert!(store.contains("zero"));
        assert!(store.contains("nothing"));
        assert_eq!(store.fields(), vec!["zero".to_string(), "nothing".to_string()]);
    }

    #[test]
    fn clear_subscriptions_keeps_values() {
        let store = DataStore::new();
        store.declare("x", Value::from(1));
        store.get("x", Some(node(0))).unwrap();
        store.clear_subscriptions();
        assert!(store.subscribers("x").is_empty());
        assert_eq!(store.peek("x"), Some(Value::from(1)));
        assert_eq!(store.len(), 1);
    }
}
