//! Error types for Strata query compilation.

use crate::position::Position;
use alloc::string::String;
use core::fmt;

/// Result type alias for Strata operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Error types raised while compiling a query.
///
/// Every variant is a hard failure that aborts the whole compilation.
/// Optimizer passes that merely fail to find a rewrite opportunity do not
/// produce an `Error`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// Generic compilation failure at a position in the query text.
    Compilation {
        position: Position,
        message: String,
    },
    /// Expression tree is nested deeper than the traversal allows.
    ExpressionTooDeep {
        position: Position,
        limit: usize,
    },
    /// Expression node is structurally invalid.
    MalformedExpression {
        position: Position,
        message: String,
    },
    /// Model id does not belong to the arena it was used with.
    UnknownModel {
        id: usize,
    },
    /// Nested-model links revisit a model.
    ChainCycle {
        id: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Compilation { position, message } => {
                write!(f, "[{}] {}", position, message)
            }
            Error::ExpressionTooDeep { position, limit } => {
                write!(
                    f,
                    "[{}] expression is too deep, maximum depth is {}",
                    position, limit
                )
            }
            Error::MalformedExpression { position, message } => {
                write!(f, "[{}] malformed expression: {}", position, message)
            }
            Error::UnknownModel { id } => {
                write!(f, "Unknown query model: #{}", id)
            }
            Error::ChainCycle { id } => {
                write!(f, "Query model chain revisits model #{}", id)
            }
        }
    }
}

impl Error {
    /// Creates a compilation error.
    pub fn compilation(position: impl Into<Position>, message: impl Into<String>) -> Self {
        Error::Compilation {
            position: position.into(),
            message: message.into(),
        }
    }

    /// Creates an expression depth error.
    pub fn expression_too_deep(position: impl Into<Position>, limit: usize) -> Self {
        Error::ExpressionTooDeep {
            position: position.into(),
            limit,
        }
    }

    /// Creates a malformed expression error.
    pub fn malformed_expression(
        position: impl Into<Position>,
        message: impl Into<String>,
    ) -> Self {
        Error::MalformedExpression {
            position: position.into(),
            message: message.into(),
        }
    }

    /// Creates an unknown model error.
    pub fn unknown_model(id: usize) -> Self {
        Error::UnknownModel { id }
    }

    /// Creates a chain cycle error.
    pub fn chain_cycle(id: usize) -> Self {
        Error::ChainCycle { id }
    }

    /// Returns the position in the query text, if the error carries one.
    pub fn position(&self) -> Option<Position> {
        match self {
            Error::Compilation { position, .. }
            | Error::ExpressionTooDeep { position, .. }
            | Error::MalformedExpression { position, .. } => Some(*position),
            Error::UnknownModel { .. } | Error::ChainCycle { .. } => None,
        }
    }
}
