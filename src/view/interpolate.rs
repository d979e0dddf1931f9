// ============================================================================
// spark-view - Text Interpolation
// `{{ expr }}` segments inside text nodes
// ============================================================================

use crate::core::constants::{INTERPOLATION_CLOSE, INTERPOLATION_OPEN};
use crate::core::value::Value;

/// A piece of interpolated text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Literal(&'a str),
    /// Expression text between the braces, trimmed.
    Expression(&'a str),
}

/// Split `text` into literal and expression segments.
///
/// An opening `{{` without a matching `}}` ends scanning: it and everything
/// after it stay literal. Empty literals are omitted.
///
/// # Example
///
/// ```
/// use spark_view::view::interpolate::{segments, Segment};
///
/// assert_eq!(
///     segments("Hi {{ name }}!"),
///     vec![Segment::Literal("Hi "), Segment::Expression("name"), Segment::Literal("!")]
/// );
/// assert_eq!(segments("a {{ b"), vec![Segment::Literal("a {{ b")]);
/// ```
pub fn segments(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find(INTERPOLATION_OPEN) {
        let code_start = start + INTERPOLATION_OPEN.len();
        let Some(length) = rest[code_start..].find(INTERPOLATION_CLOSE) else {
            break;
        };
        let code_end = code_start + length;

        if start > 0 {
            segments.push(Segment::Literal(&rest[..start]));
        }
        segments.push(Segment::Expression(rest[code_start..code_end].trim()));
        rest = &rest[code_end + INTERPOLATION_CLOSE.len()..];
    }

    if !rest.is_empty() {
        segments.push(Segment::Literal(rest));
    }
    segments
}

/// Render `text`, replacing each expression segment with the text form of
/// `evaluate(expression)`.
///
/// Expressions are evaluated left to right; the first error stops rendering.
pub fn render<E>(
    text: &str,
    mut evaluate: impl FnMut(&str) -> Result<Value, E>,
) -> Result<String, E> {
    let mut rendered = String::with_capacity(text.len());
    for segment in segments(text) {
        match segment {
            Segment::Literal(literal) => rendered.push_str(literal),
            Segment::Expression(code) => rendered.push_str(&evaluate(code)?.to_string()),
        }
    }
    Ok(rendered)
}

// =============================================================================
// TESTS
// =============================================================================
