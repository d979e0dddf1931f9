// ============================================================================
// spark-view - Value
// The dynamic value stored in data fields and produced by expressions
// ============================================================================

use std::fmt;

use indexmap::IndexMap;

use crate::reactivity::equality::safe_equals_f64;

/// 2^53: above this, whole `f64`s are no longer every integer.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

// =============================================================================
// VALUE
// =============================================================================

/// A dynamically typed data value.
///
/// Data fields, expression results and bound attribute values are all
/// `Value`s. Objects keep insertion order for iteration; their rendered
/// text is JSON with sorted keys.
///
/// # Example
///
/// ```
/// use spark_view::Value;
///
/// let count = Value::from(3);
/// assert!(count.is_truthy());
/// assert_eq!(count.to_string(), "3");
///
/// assert!(!Value::from("").is_truthy());
/// ```
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Object(IndexMap<String, Value>),
}

impl Value {
    /// Truthiness as used by `show`, `!`, `&&`, `||` and `?:`.
    ///
    /// Empty strings, zero, NaN, `false` and null are falsy; everything
    /// else (including empty arrays and objects) is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric conversion used by arithmetic and ordering operators.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Null => 0.0,
            Value::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Number(n) => *n,
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    trimmed.parse().unwrap_or(f64::NAN)
                }
            }
            Value::Array(_) | Value::Object(_) => f64::NAN,
        }
    }

    /// Name of the variant, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    /// Interpret raw text coming from a live node as the same kind of value
    /// as `self`.
    ///
    /// Numbers and booleans stay numbers and booleans when the text parses
    /// as one; anything else becomes a string. This keeps a two-way binding
    /// on a numeric field numeric.
    pub fn coerce_like(&self, raw: &str) -> Value {
        match self {
            Value::Number(_) => match raw.trim().parse::<f64>() {
                Ok(n) => Value::Number(n),
                Err(_) => Value::String(raw.to_string()),
            },
            Value::Bool(_) => match raw {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                _ => Value::String(raw.to_string()),
            },
            _ => Value::String(raw.to_string()),
        }
    }

    /// Member access: object keys plus `length` on strings and arrays.
    pub fn member(&self, name: &str) -> Value {
        match (self, name) {
            (Value::Object(map), _) => map.get(name).cloned().unwrap_or_default(),
            (Value::String(s), "length") => Value::Number(s.chars().count() as f64),
            (Value::Array(items), "length") => Value::Number(items.len() as f64),
            _ => Value::Null,
        }
    }

    /// Index access: array positions, object keys, string characters.
    pub fn index(&self, key: &Value) -> Value {
        match (self, key) {
            (Value::Array(items), Value::Number(n)) => {
                if n.fract() == 0.0 && *n >= 0.0 {
                    items.get(*n as usize).cloned().unwrap_or_default()
                } else {
                    Value::Null
                }
            }
            (Value::String(s), Value::Number(n)) => {
                if n.fract() == 0.0 && *n >= 0.0 {
                    s.chars()
                        .nth(*n as usize)
                        .map(|c| Value::String(c.to_string()))
                        .unwrap_or_default()
                } else {
                    Value::Null
                }
            }
            (_, Value::String(name)) => self.member(name),
            (Value::Object(map), other) => map.get(&other.to_string()).cloned().unwrap_or_default(),
            _ => Value::Null,
        }
    }

    /// Convert into a `serde_json::Value`.
    ///
    /// Whole numbers in the exactly representable range become JSON
    /// integers. Non-finite numbers have no JSON form and become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) if n.fract() == 0.0 && n.abs() < MAX_SAFE_INTEGER => {
                serde_json::Value::Number(serde_json::Number::from(*n as i64))
            }
            Value::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Object(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }
}

// =============================================================================
// EQUALITY
// =============================================================================
//
// Structural equality with NaN == NaN, so writing NaN over NaN is a no-op
// write rather than an endless stream of re-renders.
// =============================================================================

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => safe_equals_f64(a, b),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            _ => false,
        }
    }
}

// =============================================================================
// DISPLAY
// =============================================================================

fn fmt_number(n: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if n.is_nan() {
        write!(f, "NaN")
    } else if n.is_infinite() {
        write!(f, "{}", if n > 0.0 { "Infinity" } else { "-Infinity" })
    } else if n == 0.0 {
        // -0 renders as 0
        write!(f, "0")
    } else {
        write!(f, "{n}")
    }
}

impl fmt::Display for Value {
    /// Text form written into attributes and interpolated text.
    ///
    /// Null renders as the empty string; arrays join their items with `,`;
    /// objects render as JSON.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => fmt_number(*n, f),
            Value::String(s) => f.write_str(s),
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            Value::Object(_) => write!(f, "{}", self.to_json()),
        }
    }
}

// =============================================================================
// CONVERSIONS
// =============================================================================

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Value::Number(n as f64)
    }
}

macro_rules! value_from_integer {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(n: $t) -> Self {
                    Value::Number(n as f64)
                }
            }
        )*
    };
}

value_from_integer!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize);

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(map: IndexMap<String, Value>) -> Self {
        Value::Object(map)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Object(
                map.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            ),
        }
    }
}

impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> Self {
        value.to_json()
    }
}

// =============================================================================
// TESTS
// =============================================================================
