//! Error types for parsing and mutating.

use thiserror::Error;

/// A malformed path or script.
///
/// `offset` is 1-based and points just past the byte where parsing stopped.
/// `snippet` holds the input text (lossily decoded when it was not UTF-8).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at {offset} in {snippet}")]
pub struct ParseError {
    pub message: String,
    pub offset: usize,
    pub snippet: String,
}

/// A container refused a value written through [`crate::Keyed`] or
/// [`crate::Indexed`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("can not assign a {found} to '{target}'")]
pub struct AssignError {
    pub target: String,
    pub found: &'static str,
}

impl AssignError {
    pub fn new(target: impl Into<String>, found: &'static str) -> Self {
        AssignError {
            target: target.into(),
            found,
        }
    }
}

/// Errors raised by set, delete, modify and remove.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    #[error("can not {op} with an empty expression")]
    EmptyExpression { op: &'static str },

    #[error("can not {op} with an expression ending with a {fragment}")]
    IllegalTerminal {
        op: &'static str,
        fragment: &'static str,
    },

    #[error("can not follow a {kind} at '{path}'")]
    CannotFollow { kind: &'static str, path: String },

    #[error("can not deduce what element to add at '{path}'")]
    CannotDeduce { path: String },

    #[error("can not deduce the length of the array to add at '{path}'")]
    NegativeLength { path: String },

    #[error("can not follow out of bounds array index at '{path}'")]
    OutOfBounds { path: String },

    #[error("can not {op} at '{path}': {source}")]
    NotAssignable {
        op: &'static str,
        path: String,
        #[source]
        source: AssignError,
    },
}
