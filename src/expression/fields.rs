// ============================================================================
// spark-view - Referenced Field Extraction
// Decides which data fields an expression reads before it is evaluated
// ============================================================================
//
// Extraction is lexical, not syntactic: the expression is split on
// whitespace and each token is matched against the declared fields. Only the
// fields found here are bound as names during evaluation, so `a+b` (no
// spaces) binds neither `a` nor `b` unless `a+b` itself is a field.
// ============================================================================

use indexmap::IndexSet;

use crate::core::constants::RESERVED_WORDS;
use crate::reactivity::store::DataStore;

/// Collect the declared fields an expression references, in first-seen
/// order.
///
/// # Example
///
/// ```
/// use spark_view::Value;
/// use spark_view::expression::extract_referenced_fields;
/// use spark_view::reactivity::DataStore;
///
/// let store = DataStore::new();
/// store.declare("items", Value::from(vec![1, 2]));
/// store.declare("idx", Value::from(0));
///
/// let fields = extract_referenced_fields("items[idx] + 1", &store);
/// assert_eq!(fields.into_iter().collect::<Vec<_>>(), vec!["items", "idx"]);
/// ```
pub fn extract_referenced_fields(expression: &str, store: &DataStore) -> IndexSet<String> {
    let mut fields = IndexSet::new();
    for token in expression.split_whitespace() {
        collect_token(token, store, &mut fields);
    }
    fields
}

fn collect_token(token: &str, store: &DataStore, fields: &mut IndexSet<String>) {
    if token.is_empty() || RESERVED_WORDS.contains(&token) {
        return;
    }

    // `name[key]`: the prefix, plus whatever the key references
    let mut bracket = token.split('[');
    if let (Some(prefix), Some(rest), None) = (bracket.next(), bracket.next(), bracket.next()) {
        if store.contains(prefix) {
            fields.insert(prefix.to_string());
            let key = rest.split(']').next().unwrap_or_default();
            collect_token(key, store, fields);
            return;
        }
    }

    // `name.member`
    let mut dot = token.split('.');
    if let (Some(prefix), Some(_), None) = (dot.next(), dot.next(), dot.next()) {
        if store.contains(prefix) {
            fields.insert(prefix.to_string());
            return;
        }
    }

    if store.contains(token) {
        fields.insert(token.to_string());
    }
}

// =============================================================================
// TESTS
// =============================================================================
