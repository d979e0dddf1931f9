// ============================================================================
// spark-view - Errors
// Construction failures, expression failures and stale render targets
// ============================================================================

use std::ops::Range;

use thiserror::Error;

use super::types::NodeId;

/// Result alias used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

// =============================================================================
// EXPRESSION ERRORS
// =============================================================================

/// An expression could not be parsed or evaluated.
///
/// Never swallowed: it propagates out of render, `set` and event dispatch.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExpressionError {
    #[error("cannot parse expression `{expression}` at {span:?}: {message}")]
    Syntax {
        expression: String,
        message: String,
        span: Range<usize>,
    },

    #[error("`{name}` is not defined in expression `{expression}`")]
    UnboundIdentifier { expression: String, name: String },

    #[error("cannot read `{property}` of null in expression `{expression}`")]
    NullAccess {
        expression: String,
        property: String,
    },
}

// =============================================================================
// CONSTRUCTION ERRORS
// =============================================================================

/// A directive registration was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid directive `{name}`: {reason}")]
pub struct InvalidDirectiveError {
    pub name: String,
    pub reason: &'static str,
}

/// Fatal failures while building or mounting an app.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConstructionError {
    #[error("no element matches root selector `{selector}`")]
    MissingRoot { selector: String },

    #[error(transparent)]
    InvalidDirective(#[from] InvalidDirectiveError),

    #[error("initial data must be an object, got {found}")]
    InvalidData { found: &'static str },

    #[error("app is already mounted")]
    AlreadyMounted,
}

// =============================================================================
// RENDER TARGET ERRORS
// =============================================================================

/// A render was requested for something that is not a live node snapshot.
///
/// Only ever logged: the render call becomes a no-op, since the id may come
/// from a stale dependency entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderTargetError {
    #[error("{id} does not refer to a node snapshot")]
    Unknown { id: NodeId },

    #[error("{id} is from mount generation {generation}, current is {current}")]
    Stale {
        id: NodeId,
        generation: u32,
        current: u32,
    },
}

// =============================================================================
// CRATE ERROR
// =============================================================================

/// Any error an app operation can return.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Construction(#[from] ConstructionError),

    #[error(transparent)]
    Expression(#[from] ExpressionError),

    #[error("field `{field}` is not declared")]
    UndeclaredField { field: String },
}

impl From<InvalidDirectiveError> for Error {
    fn from(err: InvalidDirectiveError) -> Self {
        Error::Construction(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_culprit() {
        let err = Error::from(ConstructionError::MissingRoot {
            selector: "#app".into(),
        });
        assert_eq!(err.to_string(), "no element matches root selector `#app`");

        let err = Error::from(InvalidDirectiveError {
            name: "model".into(),
            reason: "reserved name",
        });
        assert_eq!(err.to_string(), "invalid directive `model`: reserved name");

        let err = RenderTargetError::Stale {
            id: NodeId::new(1, 0),
            generation: 0,
            current: 2,
        };
        assert_eq!(
            err.to_string(),
            "node#1@0 is from mount generation 0, current is 2"
        );
    }

    #[test]
    fn expression_errors_convert() {
        let err: Error = ExpressionError::UnboundIdentifier {
            expression: "a + b".into(),
            name: "b".into(),
        }
        .into();
        assert!(matches!(err, Error::Expression(_)));
    }
}
