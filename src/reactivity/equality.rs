// ============================================================================
// spark-view - Equality Functions
// Write-suppression rules for reactive cells
// ============================================================================

use crate::core::value::Value;

// =============================================================================
// STRICT EQUALITY (Default)
// =============================================================================

/// Default equality for data fields: structural, NaN equal to NaN.
///
/// # Example
/// ```
/// use spark_view::Value;
/// use spark_view::reactivity::equality::equals;
///
/// assert!(equals(&Value::from(42), &Value::from(42)));
/// assert!(!equals(&Value::from(42), &Value::from("42")));
/// ```
pub fn equals(a: &Value, b: &Value) -> bool {
    a == b
}

// =============================================================================
// SAFE FLOAT EQUALITY
// =============================================================================

/// Safe not-equal check for f64.
/// Handles NaN correctly: NaN == NaN returns true (unlike IEEE 754).
///
/// # Example
/// ```
/// use spark_view::reactivity::equality::safe_not_equal_f64;
///
/// assert!(safe_not_equal_f64(&1.0, &2.0));
/// assert!(!safe_not_equal_f64(&1.0, &1.0));
/// assert!(!safe_not_equal_f64(&f64::NAN, &f64::NAN));
/// assert!(safe_not_equal_f64(&f64::NAN, &1.0));
/// ```
pub fn safe_not_equal_f64(a: &f64, b: &f64) -> bool {
    if a.is_nan() {
        return !b.is_nan();
    }
    a != b
}

/// Safe equality for f64 values.
pub fn safe_equals_f64(a: &f64, b: &f64) -> bool {
    !safe_not_equal_f64(a, b)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equals() {
        assert!(equals(&Value::from("hello"), &Value::from("hello")));
        assert!(!equals(&Value::from("hello"), &Value::from("world")));
        assert!(equals(&Value::Null, &Value::Null));
        assert!(!equals(&Value::Null, &Value::from(false)));
    }

    #[test]
    fn test_safe_equals_f64_nan() {
        assert!(safe_equals_f64(&f64::NAN, &f64::NAN));
        assert!(!safe_equals_f64(&f64::NAN, &1.0));
        assert!(!safe_equals_f64(&1.0, &f64::NAN));
    }

    #[test]
    fn test_safe_equals_f64_zero_and_infinity() {
        assert!(safe_equals_f64(&-0.0, &0.0));
        assert!(safe_equals_f64(&f64::INFINITY, &f64::INFINITY));
        assert!(!safe_equals_f64(&f64::INFINITY, &f64::NEG_INFINITY));
    }
}
