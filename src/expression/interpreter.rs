// ============================================================================
// spark-view - Expression Interpreter
// Tree-walking evaluation against a table of bound names
// ============================================================================

use std::cmp::Ordering;

use indexmap::IndexMap;

use super::ast::{BinaryOp, Expr, UnaryOp};
use crate::core::error::ExpressionError;
use crate::core::value::Value;

/// Names visible to an expression, with their values.
pub type Bindings = IndexMap<String, Value>;

/// Evaluate `expr` with only `bindings` in scope.
///
/// `source` is the expression text, used in error messages.
pub fn interpret(expr: &Expr, bindings: &Bindings, source: &str) -> Result<Value, ExpressionError> {
    Interpreter { bindings, source }.eval(expr)
}

struct Interpreter<'a> {
    bindings: &'a Bindings,
    source: &'a str,
}

impl Interpreter<'_> {
    fn eval(&self, expr: &Expr) -> Result<Value, ExpressionError> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),

            Expr::Array(items) => items
                .iter()
                .map(|item| self.eval(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),

            Expr::Identifier(name) => {
                self.bindings
                    .get(name)
                    .cloned()
                    .ok_or_else(|| ExpressionError::UnboundIdentifier {
                        expression: self.source.to_string(),
                        name: name.clone(),
                    })
            }

            Expr::Member { object, property } => {
                let object = self.eval(object)?;
                if object.is_null() {
                    return Err(self.null_access(property));
                }
                Ok(object.member(property))
            }

            Expr::Index { object, index } => {
                let object = self.eval(object)?;
                let key = self.eval(index)?;
                if object.is_null() {
                    return Err(self.null_access(&key.to_string()));
                }
                Ok(object.index(&key))
            }

            Expr::Unary { op, operand } => {
                let value = self.eval(operand)?;
                Ok(match op {
                    UnaryOp::Not => Value::Bool(!value.is_truthy()),
                    UnaryOp::Negate => Value::Number(-value.to_number()),
                })
            }

            // && and || short-circuit and yield an operand, not a bool
            Expr::Binary {
                op: BinaryOp::And,
                left,
                right,
            } => {
                let left = self.eval(left)?;
                if left.is_truthy() {
                    self.eval(right)
                } else {
                    Ok(left)
                }
            }
            Expr::Binary {
                op: BinaryOp::Or,
                left,
                right,
            } => {
                let left = self.eval(left)?;
                if left.is_truthy() {
                    Ok(left)
                } else {
                    self.eval(right)
                }
            }

            Expr::Binary { op, left, right } => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                Ok(apply_binary(*op, &left, &right))
            }

            Expr::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.eval(condition)?.is_truthy() {
                    self.eval(then_branch)
                } else {
                    self.eval(else_branch)
                }
            }
        }
    }

    fn null_access(&self, property: &str) -> ExpressionError {
        ExpressionError::NullAccess {
            expression: self.source.to_string(),
            property: property.to_string(),
        }
    }
}

// =============================================================================
// OPERATORS
// =============================================================================

fn apply_binary(op: BinaryOp, left: &Value, right: &Value) -> Value {
    match op {
        BinaryOp::Add => add(left, right),
        BinaryOp::Subtract => Value::Number(left.to_number() - right.to_number()),
        BinaryOp::Multiply => Value::Number(left.to_number() * right.to_number()),
        BinaryOp::Divide => Value::Number(left.to_number() / right.to_number()),
        BinaryOp::Remainder => Value::Number(left.to_number() % right.to_number()),

        BinaryOp::Less => Value::Bool(compare(left, right) == Some(Ordering::Less)),
        BinaryOp::LessOrEqual => Value::Bool(matches!(
            compare(left, right),
            Some(Ordering::Less | Ordering::Equal)
        )),
        BinaryOp::Greater => Value::Bool(compare(left, right) == Some(Ordering::Greater)),
        BinaryOp::GreaterOrEqual => Value::Bool(matches!(
            compare(left, right),
            Some(Ordering::Greater | Ordering::Equal)
        )),

        BinaryOp::Equal => Value::Bool(loose_equals(left, right)),
        BinaryOp::NotEqual => Value::Bool(!loose_equals(left, right)),
        BinaryOp::StrictEqual => Value::Bool(strict_equals(left, right)),
        BinaryOp::StrictNotEqual => Value::Bool(!strict_equals(left, right)),

        // Short-circuit forms are handled before operands are evaluated
        BinaryOp::And | BinaryOp::Or => Value::Null,
    }
}

/// `+` concatenates as soon as either side is not a plain scalar.
fn add(left: &Value, right: &Value) -> Value {
    let concatenates = |value: &Value| {
        matches!(
            value,
            Value::String(_) | Value::Array(_) | Value::Object(_)
        )
    };
    if concatenates(left) || concatenates(right) {
        Value::String(format!("{left}{right}"))
    } else {
        Value::Number(left.to_number() + right.to_number())
    }
}

/// Strings compare by text when both sides are strings; everything else
/// compares numerically. NaN is unordered.
fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => left.to_number().partial_cmp(&right.to_number()),
    }
}

fn strict_equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        // NaN !== NaN in expressions, unlike store equality
        (Value::Number(a), Value::Number(b)) => a == b,
        _ => left == right,
    }
}

/// `==` converts scalars of different kinds to numbers before comparing.
fn loose_equals(left: &Value, right: &Value) -> bool {
    let scalar = |value: &Value| {
        matches!(
            value,
            Value::Bool(_) | Value::Number(_) | Value::String(_)
        )
    };
    if std::mem::discriminant(left) != std::mem::discriminant(right)
        && scalar(left)
        && scalar(right)
    {
        return left.to_number() == right.to_number();
    }
    strict_equals(left, right)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::parser::parse;

    fn eval_with(source: &str, bindings: &[(&str, Value)]) -> Result<Value, ExpressionError> {
        let bindings: Bindings = bindings
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect();
        interpret(&parse(source).unwrap(), &bindings, source)
    }

    fn eval(source: &str) -> Value {
        eval_with(source, &[]).unwrap()
    }

    #[test]
    fn arithmetic() {
        assert_eq!(eval("1 + 2 * 3"), Value::from(7));
        assert_eq!(eval("(1 + 2) * 3"), Value::from(9));
        assert_eq!(eval("7 % 4"), Value::from(3));
        assert_eq!(eval("-2 - 1"), Value::from(-3));
        assert_eq!(eval("1 / 0"), Value::from(f64::INFINITY));
    }

    #[test]
    fn string_concatenation() {
        assert_eq!(eval("'a' + 1"), Value::from("a1"));
        assert_eq!(eval("1 + 2 + 'x'"), Value::from("3x"));
        assert_eq!(
            eval_with("'n=' + n", &[("n", Value::from(2.5))]).unwrap(),
            Value::from("n=2.5")
        );
    }

    #[test]
    fn logical_operators_return_operands() {
        assert_eq!(eval("0 || 'fallback'"), Value::from("fallback"));
        assert_eq!(eval("'' && 'never'"), Value::from(""));
        assert_eq!(eval("!0"), Value::from(true));
        assert_eq!(eval("!!'x'"), Value::from(true));
    }

    #[test]
    fn short_circuit_skips_unbound_names() {
        assert_eq!(eval("true || missing"), Value::from(true));
        assert!(eval_with("false || missing", &[]).is_err());
    }

    #[test]
    fn comparisons() {
        assert_eq!(eval("2 < 10"), Value::from(true));
        assert_eq!(eval("'2' < '10'"), Value::from(false));
        assert_eq!(eval("3 >= 3"), Value::from(true));
        assert_eq!(eval("1 == '1'"), Value::from(true));
        assert_eq!(eval("1 === '1'"), Value::from(false));
        assert_eq!(eval("null == null"), Value::from(true));
        assert_eq!(eval("1 !== 2"), Value::from(true));
    }

    #[test]
    fn conditional_and_access() {
        let user = Value::from(serde_json::json!({ "name": "Ann", "tags": ["a", "b"] }));
        assert_eq!(
            eval_with("user.name", &[("user", user.clone())]).unwrap(),
            Value::from("Ann")
        );
        assert_eq!(
            eval_with("user.tags[1]", &[("user", user.clone())]).unwrap(),
            Value::from("b")
        );
        assert_eq!(
            eval_with("user.tags.length > 1 ? 'many' : 'few'", &[("user", user)]).unwrap(),
            Value::from("many")
        );
        assert_eq!(eval("'abc'.length"), Value::from(3));
    }

    #[test]
    fn unbound_identifier() {
        assert_eq!(
            eval_with("x + 1", &[]),
            Err(ExpressionError::UnboundIdentifier {
                expression: "x + 1".into(),
                name: "x".into(),
            })
        );
    }

    #[test]
    fn null_access() {
        assert_eq!(
            eval_with("user.name", &[("user", Value::Null)]),
            Err(ExpressionError::NullAccess {
                expression: "user.name".into(),
                property: "name".into(),
            })
        );
        assert!(eval_with("list[0]", &[("list", Value::Null)]).is_err());
    }

    #[test]
    fn missing_members_are_null() {
        let user = Value::from(serde_json::json!({ "name": "Ann" }));
        assert_eq!(
            eval_with("user.age", &[("user", user)]).unwrap(),
            Value::Null
        );
    }

    #[test]
    fn array_literals() {
        assert_eq!(
            eval("[1, 'two', [3]]"),
            Value::Array(vec![
                Value::from(1),
                Value::from("two"),
                Value::Array(vec![Value::from(3)])
            ])
        );
    }
}
