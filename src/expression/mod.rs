// ============================================================================
// spark-view - Expression Module
// Parsing, field inference and evaluation of binding expressions
// ============================================================================

pub mod ast;
pub mod fields;
pub mod interpreter;
pub mod parser;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

pub use ast::{BinaryOp, Expr, UnaryOp};
pub use fields::extract_referenced_fields;
pub use interpreter::{Bindings, interpret};
pub use parser::parse;

use tracing::trace;

use crate::core::error::ExpressionError;
use crate::core::types::NodeId;
use crate::core::value::Value;
use crate::reactivity::store::DataStore;

// =============================================================================
// EVALUATOR
// =============================================================================

/// Evaluates expression text against a [`DataStore`], caching parsed ASTs
/// per distinct text.
///
/// # Example
///
/// ```
/// use spark_view::{NodeId, Value};
/// use spark_view::expression::Evaluator;
/// use spark_view::reactivity::DataStore;
///
/// let store = DataStore::new();
/// store.declare("price", Value::from(4));
/// store.declare("qty", Value::from(3));
///
/// let evaluator = Evaluator::new();
/// let node = NodeId::new(1, 0);
/// let total = evaluator.evaluate("price * qty", &store, Some(node)).unwrap();
///
/// assert_eq!(total, Value::from(12));
/// assert_eq!(store.subscribers("qty"), vec![node]);
/// ```
#[derive(Default)]
pub struct Evaluator {
    cache: RefCell<HashMap<String, Rc<Expr>>>,
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `source`, reusing the cached AST when the text was seen before.
    pub fn parse(&self, source: &str) -> Result<Rc<Expr>, ExpressionError> {
        if let Some(expr) = self.cache.borrow().get(source) {
            return Ok(expr.clone());
        }
        let expr = Rc::new(parse(source)?);
        self.cache
            .borrow_mut()
            .insert(source.to_string(), expr.clone());
        Ok(expr)
    }

    /// Evaluate `source` on behalf of `node`.
    ///
    /// Every referenced field is read through the store first, subscribing
    /// `node` to each one even if the text then fails to parse. Only those
    /// fields are visible to the expression. Blank text evaluates to null.
    pub fn evaluate(
        &self,
        source: &str,
        store: &DataStore,
        node: Option<NodeId>,
    ) -> Result<Value, ExpressionError> {
        let mut bindings = Bindings::new();
        for field in extract_referenced_fields(source, store) {
            if let Ok(value) = store.get(&field, node) {
                bindings.insert(field, value);
            }
        }

        let source = source.trim();
        if source.is_empty() {
            return Ok(Value::Null);
        }

        let expr = self.parse(source)?;
        let value = interpret(&expr, &bindings, source)?;
        trace!(expression = source, value = %value, "evaluated");
        Ok(value)
    }

    /// Number of distinct expression texts parsed so far.
    pub fn cached(&self) -> usize {
        self.cache.borrow().len()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_each_text_once() {
        let store = DataStore::new();
        store.declare("n", Value::from(1));
        let evaluator = Evaluator::new();

        for _ in 0..3 {
            evaluator.evaluate("n + 1", &store, None).unwrap();
        }
        evaluator.evaluate("n + 2", &store, None).unwrap();
        assert_eq!(evaluator.cached(), 2);
    }

    #[test]
    fn untracked_evaluation_subscribes_nobody() {
        let store = DataStore::new();
        store.declare("n", Value::from(1));
        Evaluator::new().evaluate("n", &store, None).unwrap();
        assert!(store.subscribers("n").is_empty());
    }

    #[test]
    fn unextracted_names_are_unbound() {
        let store = DataStore::new();
        store.declare("a", Value::from(1));
        store.declare("b", Value::from(2));

        let evaluator = Evaluator::new();
        assert_eq!(
            evaluator.evaluate("a + b", &store, None).unwrap(),
            Value::from(3)
        );
        assert!(matches!(
            evaluator.evaluate("a+b", &store, None),
            Err(ExpressionError::UnboundIdentifier { .. })
        ));
    }

    #[test]
    fn dependencies_are_captured_before_syntax_errors() {
        let store = DataStore::new();
        store.declare("a", Value::from(1));
        let node = NodeId::new(3, 0);

        let result = Evaluator::new().evaluate("a +", &store, Some(node));
        assert!(matches!(result, Err(ExpressionError::Syntax { .. })));
        assert_eq!(store.subscribers("a"), vec![node]);
    }

    #[test]
    fn blank_text_is_null() {
        let store = DataStore::new();
        assert_eq!(
            Evaluator::new().evaluate("   ", &store, None).unwrap(),
            Value::Null
        );
    }
}
