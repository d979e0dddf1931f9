// ============================================================================
// spark-view - Expression AST
// ============================================================================

use crate::core::value::Value;

/// A parsed binding expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `1`, `'text'`, `true`, `null`
    Literal(Value),
    /// `[a, b, 1]`
    Array(Vec<Expr>),
    /// A name looked up in the bound-name table
    Identifier(String),
    /// `object.property`
    Member {
        object: Box<Expr>,
        property: String,
    },
    /// `object[index]`
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `condition ? then_branch : else_branch`
    Conditional {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Negate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Multiply,
    Divide,
    Remainder,
    Add,
    Subtract,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    Equal,
    NotEqual,
    StrictEqual,
    StrictNotEqual,
    And,
    Or,
}

impl Expr {
    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_box_their_operands() {
        assert_eq!(
            Expr::binary(
                BinaryOp::Add,
                Expr::Identifier("b".into()),
                Expr::Literal(Value::from(1))
            ),
            Expr::Binary {
                op: BinaryOp::Add,
                left: Box::new(Expr::Identifier("b".into())),
                right: Box::new(Expr::Literal(Value::from(1))),
            }
        );
        assert_eq!(
            Expr::unary(UnaryOp::Not, Expr::Identifier("on".into())),
            Expr::Unary {
                op: UnaryOp::Not,
                operand: Box::new(Expr::Identifier("on".into())),
            }
        );
    }
}
