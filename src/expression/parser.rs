// ============================================================================
// spark-view - Expression Parser
// chumsky grammar for binding expressions
// ============================================================================
//
// Precedence, lowest first:
//   ?:  ||  &&  == != === !==  < <= > >=  + -  * / %  unary ! -  . []
// ============================================================================

use chumsky::prelude::*;

use super::ast::{BinaryOp, Expr, UnaryOp};
use crate::core::error::ExpressionError;
use crate::core::value::Value;

pub type ParseError<'src> = Rich<'src, char>;

enum Accessor {
    Member(String),
    Index(Expr),
}

fn expression<'src>() -> impl Parser<'src, &'src str, Expr, extra::Err<ParseError<'src>>> {
    recursive(|expression| {
        let identifier = any()
            .filter(|character: &char| {
                character.is_ascii_alphabetic() || *character == '_' || *character == '$'
            })
            .then(
                any()
                    .filter(|character: &char| {
                        character.is_ascii_alphanumeric() || *character == '_' || *character == '$'
                    })
                    .repeated(),
            )
            .to_slice();

        let number = text::int(10)
            .then(just('.').then(text::digits(10)).or_not())
            .to_slice()
            .from_str()
            .unwrapped()
            .map(|number: f64| Expr::Literal(Value::Number(number)));

        let quoted = choice((
            just('\'')
                .ignore_then(none_of('\'').repeated().to_slice())
                .then_ignore(just('\'')),
            just('"')
                .ignore_then(none_of('"').repeated().to_slice())
                .then_ignore(just('"')),
        ))
        .map(|text: &str| Expr::Literal(Value::String(text.to_string())));

        let word = identifier.clone().map(|word: &str| match word {
            "true" => Expr::Literal(Value::Bool(true)),
            "false" => Expr::Literal(Value::Bool(false)),
            "null" | "undefined" => Expr::Literal(Value::Null),
            name => Expr::Identifier(name.to_string()),
        });

        let array = expression
            .clone()
            .separated_by(just(',').padded())
            .allow_trailing()
            .collect::<Vec<_>>()
            .delimited_by(just('[').padded(), just(']').padded())
            .map(Expr::Array);

        let nested = expression
            .clone()
            .delimited_by(just('(').padded(), just(')').padded());

        let atom = choice((number, quoted, array, nested, word)).padded();

        let accessor = choice((
            just('.')
                .padded()
                .ignore_then(identifier)
                .map(|name: &str| Accessor::Member(name.to_string())),
            expression
                .clone()
                .delimited_by(just('[').padded(), just(']').padded())
                .map(Accessor::Index),
        ));

        let postfix = atom
            .foldl(accessor.repeated(), |object, accessor| match accessor {
                Accessor::Member(property) => Expr::Member {
                    object: Box::new(object),
                    property,
                },
                Accessor::Index(index) => Expr::Index {
                    object: Box::new(object),
                    index: Box::new(index),
                },
            })
            .boxed();

        let unary = choice((
            just('!').to(UnaryOp::Not),
            just('-').to(UnaryOp::Negate),
        ))
        .padded()
        .repeated()
        .foldr(postfix, Expr::unary)
        .boxed();

        let product = unary
            .clone()
            .foldl(
                choice((
                    just('*').to(BinaryOp::Multiply),
                    just('/').to(BinaryOp::Divide),
                    just('%').to(BinaryOp::Remainder),
                ))
                .padded()
                .then(unary)
                .repeated(),
                |left, (op, right)| Expr::binary(op, left, right),
            )
            .boxed();

        let sum = product
            .clone()
            .foldl(
                choice((
                    just('+').to(BinaryOp::Add),
                    just('-').to(BinaryOp::Subtract),
                ))
                .padded()
                .then(product)
                .repeated(),
                |left, (op, right)| Expr::binary(op, left, right),
            )
            .boxed();

        let comparison = sum
            .clone()
            .foldl(
                choice((
                    just("<=").to(BinaryOp::LessOrEqual),
                    just(">=").to(BinaryOp::GreaterOrEqual),
                    just("<").to(BinaryOp::Less),
                    just(">").to(BinaryOp::Greater),
                ))
                .padded()
                .then(sum)
                .repeated(),
                |left, (op, right)| Expr::binary(op, left, right),
            )
            .boxed();

        let equality = comparison
            .clone()
            .foldl(
                choice((
                    just("===").to(BinaryOp::StrictEqual),
                    just("!==").to(BinaryOp::StrictNotEqual),
                    just("==").to(BinaryOp::Equal),
                    just("!=").to(BinaryOp::NotEqual),
                ))
                .padded()
                .then(comparison)
                .repeated(),
                |left, (op, right)| Expr::binary(op, left, right),
            )
            .boxed();

        let and = equality
            .clone()
            .foldl(
                just("&&")
                    .padded()
                    .to(BinaryOp::And)
                    .then(equality)
                    .repeated(),
                |left, (op, right)| Expr::binary(op, left, right),
            )
            .boxed();

        let or = and
            .clone()
            .foldl(
                just("||")
                    .padded()
                    .to(BinaryOp::Or)
                    .then(and)
                    .repeated(),
                |left, (op, right)| Expr::binary(op, left, right),
            )
            .boxed();

        or.then(
            just('?')
                .padded()
                .ignore_then(expression.clone())
                .then_ignore(just(':').padded())
                .then(expression)
                .or_not(),
        )
        .map(|(condition, branches)| match branches {
            Some((then_branch, else_branch)) => Expr::Conditional {
                condition: Box::new(condition),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
            },
            None => condition,
        })
    })
}

/// Parse one binding expression.
///
/// # Example
///
/// ```
/// use spark_view::expression::{parse, Expr};
///
/// let expr = parse("count").unwrap();
/// assert_eq!(expr, Expr::Identifier("count".to_string()));
///
/// assert!(parse("count +").is_err());
/// ```
pub fn parse(source: &str) -> Result<Expr, ExpressionError> {
    let (output, errors) = expression()
        .padded()
        .then_ignore(end())
        .parse(source)
        .into_output_errors();

    if let Some(error) = errors.into_iter().next() {
        return Err(ExpressionError::Syntax {
            expression: source.to_string(),
            message: error.reason().to_string(),
            span: error.span().into_range(),
        });
    }

    output.ok_or_else(|| ExpressionError::Syntax {
        expression: source.to_string(),
        message: "no expression".to_string(),
        span: 0..source.len(),
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str) -> Expr {
        Expr::Identifier(name.to_string())
    }

    fn num(n: f64) -> Expr {
        Expr::Literal(Value::Number(n))
    }

    #[test]
    fn literals() {
        assert_eq!(parse("42").unwrap(), num(42.0));
        assert_eq!(parse("2.5").unwrap(), num(2.5));
        assert_eq!(
            parse("'hi there'").unwrap(),
            Expr::Literal(Value::from("hi there"))
        );
        assert_eq!(parse("\"q\"").unwrap(), Expr::Literal(Value::from("q")));
        assert_eq!(parse("true").unwrap(), Expr::Literal(Value::Bool(true)));
        assert_eq!(parse("undefined").unwrap(), Expr::Literal(Value::Null));
        assert_eq!(
            parse("[1, 'a',]").unwrap(),
            Expr::Array(vec![num(1.0), Expr::Literal(Value::from("a"))])
        );
    }

    #[test]
    fn precedence() {
        assert_eq!(
            parse("a + b * 2").unwrap(),
            Expr::binary(
                BinaryOp::Add,
                ident("a"),
                Expr::binary(BinaryOp::Multiply, ident("b"), num(2.0))
            )
        );
        assert_eq!(
            parse("(a + b) * 2").unwrap(),
            Expr::binary(
                BinaryOp::Multiply,
                Expr::binary(BinaryOp::Add, ident("a"), ident("b")),
                num(2.0)
            )
        );
        assert_eq!(
            parse("a < 1 || b && !c").unwrap(),
            Expr::binary(
                BinaryOp::Or,
                Expr::binary(BinaryOp::Less, ident("a"), num(1.0)),
                Expr::binary(
                    BinaryOp::And,
                    ident("b"),
                    Expr::unary(UnaryOp::Not, ident("c"))
                )
            )
        );
    }

    #[test]
    fn multi_character_operators() {
        assert_eq!(
            parse("a <= b").unwrap(),
            Expr::binary(BinaryOp::LessOrEqual, ident("a"), ident("b"))
        );
        assert_eq!(
            parse("a !== b").unwrap(),
            Expr::binary(BinaryOp::StrictNotEqual, ident("a"), ident("b"))
        );
        assert_eq!(
            parse("a != b").unwrap(),
            Expr::binary(BinaryOp::NotEqual, ident("a"), ident("b"))
        );
        assert_eq!(
            parse("a === b").unwrap(),
            Expr::binary(BinaryOp::StrictEqual, ident("a"), ident("b"))
        );
    }

    #[test]
    fn member_and_index_chains() {
        assert_eq!(
            parse("items[idx].name").unwrap(),
            Expr::Member {
                object: Box::new(Expr::Index {
                    object: Box::new(ident("items")),
                    index: Box::new(ident("idx")),
                }),
                property: "name".into(),
            }
        );
    }

    #[test]
    fn conditional() {
        assert_eq!(
            parse("on ? 'yes' : 'no'").unwrap(),
            Expr::Conditional {
                condition: Box::new(ident("on")),
                then_branch: Box::new(Expr::Literal(Value::from("yes"))),
                else_branch: Box::new(Expr::Literal(Value::from("no"))),
            }
        );
    }

    #[test]
    fn negative_numbers_are_unary() {
        assert_eq!(
            parse("-3").unwrap(),
            Expr::unary(UnaryOp::Negate, num(3.0))
        );
    }

    #[test]
    fn syntax_errors_carry_the_source() {
        for source in ["a +", "(a", "a b", "'open", "a = 1", ""] {
            match parse(source) {
                Err(ExpressionError::Syntax { expression, .. }) => assert_eq!(expression, source),
                other => panic!("expected syntax error for {source:?}, got {other:?}"),
            }
        }
    }
}
