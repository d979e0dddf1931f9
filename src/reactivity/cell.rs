// ============================================================================
// spark-view - Reactive Cell
// One observable data field with its subscriber set
// ============================================================================
//
// A cell records which nodes read it and reports them back on a changing
// write. It never calls into the render engine itself: the caller collects
// the subscriber list, releases every borrow, and only then re-renders
// ("collect-then-mutate"), so re-entrant reads and writes from inside a
// render never hit a RefCell that is already borrowed.
// ============================================================================

use std::cell::RefCell;

use indexmap::IndexSet;

use super::equality::equals;
use crate::core::types::NodeId;
use crate::core::value::Value;

// =============================================================================
// REACTIVE CELL
// =============================================================================

/// An observable value plus the ordered set of nodes depending on it.
///
/// # Example
///
/// ```
/// use spark_view::{NodeId, Value};
/// use spark_view::reactivity::ReactiveCell;
///
/// let cell = ReactiveCell::new(Value::from(1));
/// let node = NodeId::new(0, 0);
///
/// // A tracked read subscribes the reader
/// assert_eq!(cell.read(Some(node)), Value::from(1));
///
/// // A changing write reports who needs re-rendering
/// assert_eq!(cell.write(Value::from(2)), Some(vec![node]));
///
/// // An equal write reports nothing
/// assert_eq!(cell.write(Value::from(2)), None);
/// ```
pub struct ReactiveCell {
    /// The current value
    value: RefCell<Value>,

    /// Nodes that read this cell while rendering, in first-read order
    subscribers: RefCell<IndexSet<NodeId>>,
}

impl ReactiveCell {
    /// Create a cell using structural equality for write suppression.
    pub fn new(value: Value) -> Self {
        Self {
            value: RefCell::new(value),
            subscribers: RefCell::new(IndexSet::new()),
        }
    }

    /// Read the value, subscribing `subscriber` when one is given.
    ///
    /// Each read captures at most one dependency edge.
    pub fn read(&self, subscriber: Option<NodeId>) -> Value {
        if let Some(id) = subscriber {
            self.subscribe(id);
        }
        self.value.borrow().clone()
    }

    /// Read the value without subscribing anyone.
    pub fn peek(&self) -> Value {
        self.value.borrow().clone()
    }

    /// Write a value.
    ///
    /// Returns `None` when the value is equal to the current one. Otherwise
    /// stores it and returns a snapshot of the subscriber list, in insertion
    /// order, for the caller to re-render.
    pub fn write(&self, value: Value) -> Option<Vec<NodeId>> {
        self.replace(value).map(|(_, subscribers)| subscribers)
    }

    /// Like [`write`](Self::write), also handing back the replaced value.
    pub fn replace(&self, value: Value) -> Option<(Value, Vec<NodeId>)> {
        let changed = {
            let current = self.value.borrow();
            !equals(&current, &value)
        };

        if !changed {
            return None;
        }

        let old = std::mem::replace(&mut *self.value.borrow_mut(), value);
        Some((old, self.subscribers()))
    }

    /// Add a subscriber. Returns true if it was not subscribed yet.
    pub fn subscribe(&self, id: NodeId) -> bool {
        self.subscribers.borrow_mut().insert(id)
    }

    /// Snapshot of the current subscribers.
    pub fn subscribers(&self) -> Vec<NodeId> {
        self.subscribers.borrow().iter().copied().collect()
    }

    /// Number of subscribers
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }

    /// Drop every subscriber.
    pub fn clear_subscribers(&self) {
        self.subscribers.borrow_mut().clear();
    }
}

impl std::fmt::Debug for ReactiveCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReactiveCell")
            .field("value", &*self.value.borrow())
            .field("subscribers", &self.subscriber_count())
            .finish()
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
    fn untracked_read_subscribes_nobody() {
        let cell = ReactiveCell::new(Value::from("a"));
        assert_eq!(cell.read(None), Value::from("a"));
        assert_eq!(cell.peek(), Value::from("a"));
        assert_eq!(cell.subscriber_count(), 0);
    }

    #[test]
    fn subscription_is_idempotent() {
        let cell = ReactiveCell::new(Value::from(0));
        cell.read(Some(node(1)));
        cell.read(Some(node(1)));
        cell.read(Some(node(2)));
        assert_eq!(cell.subscribers(), vec![node(1), node(2)]);
    }

    #[test]
    fn write_reports_subscribers_in_insertion_order() {
        let cell = ReactiveCell::new(Value::from(0));
        cell.subscribe(node(3));
        cell.subscribe(node(1));
        cell.subscribe(node(2));

        assert_eq!(cell.write(Value::from(1)), Some(vec![node(3), node(1), node(2)]));
        assert_eq!(cell.peek(), Value::from(1));
    }

    #[test]
    fn equal_write_is_a_no_op() {
        let cell = ReactiveCell::new(Value::from(5));
        cell.subscribe(node(0));

        assert_eq!(cell.write(Value::from(5)), None);
        assert_eq!(cell.subscribers(), vec![node(0)]);
        assert_eq!(
            cell.replace(Value::from(6)),
            Some((Value::from(5), vec![node(0)]))
        );

        // NaN over NaN is equal too
        let cell = ReactiveCell::new(Value::from(f64::NAN));
        assert_eq!(cell.write(Value::from(f64::NAN)), None);
    }

    #[test]
    fn clear_drops_every_subscriber() {
        let cell = ReactiveCell::new(Value::Null);
        for i in 0..4 {
            assert!(cell.subscribe(node(i)));
        }
        assert!(!cell.subscribe(node(1)));

        cell.clear_subscribers();
        assert_eq!(cell.subscriber_count(), 0);
        assert_eq!(cell.write(Value::from(1)), Some(vec![]));
    }
}
