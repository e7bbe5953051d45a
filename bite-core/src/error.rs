//! Error types for parsing and value derivation.
//!
//! Only [`ParseError::UnmetExpectation`] is backtrackable. Every other
//! variant aborts the parse (or the incremental stream) it occurs in.

use std::io;

use thiserror::Error;

use crate::parser::Parser;

/// Failure while evaluating a grammar against a buffer.
#[derive(Debug, Error)]
pub enum ParseError {
    /// A parser did not match at the given offset.
    #[error("expected {expected} at position {at_loc}")]
    UnmetExpectation { expected: Parser, at_loc: usize },

    /// The one-shot driver was asked to consume everything but stopped short.
    #[error("trailing bytes: parse ended at {end_loc} of {len}")]
    TrailingBytes { end_loc: usize, len: usize },

    /// The incremental driver matched a zero-width tree with input left.
    #[error("incremental parse made no progress")]
    NoProgress,

    /// A `Forward` was invoked before being bound.
    #[error("forward parser {name} used before it was bound")]
    UnboundForward { name: String },

    /// The byte source failed or came up short where bytes were required.
    #[error("byte source failed: {0}")]
    Source(#[from] io::Error),

    /// Deriving a value needed during parsing failed.
    #[error("value derivation failed: {0}")]
    Value(#[from] ValueError),
}

impl ParseError {
    pub(crate) fn unmet(expected: &Parser, at_loc: usize) -> Self {
        Self::UnmetExpectation {
            expected: expected.clone(),
            at_loc,
        }
    }

    /// True for the one variant combinators may intercept.
    #[inline]
    pub fn is_backtrackable(&self) -> bool {
        matches!(self, Self::UnmetExpectation { .. })
    }

    /// The parser that failed to match, for `UnmetExpectation`.
    pub fn expected(&self) -> Option<&Parser> {
        match self {
            Self::UnmetExpectation { expected, .. } => Some(expected),
            _ => None,
        }
    }

    /// The offset of the failed match, for `UnmetExpectation`.
    pub fn at_loc(&self) -> Option<usize> {
        match self {
            Self::UnmetExpectation { at_loc, .. } => Some(*at_loc),
            _ => None,
        }
    }
}

/// Failure while computing the flattened values of a node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// Exactly one value was required.
    #[error("expected exactly one value, found {count}")]
    ExpectedSingleValue { count: usize },

    /// A byte string was required (e.g. under `Combine`).
    #[error("expected a byte string value")]
    ExpectedBytes,

    /// A non-negative integer was required (the count of `Counted`).
    #[error("expected a non-negative integer count")]
    ExpectedCount,

    /// Raised by a user transform.
    #[error("{0}")]
    Custom(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::literal;

    #[test]
    fn unmet_expectation_message_names_parser() {
        let err = ParseError::unmet(&literal(b"A").named("A"), 3);
        assert_eq!(err.to_string(), "expected A at position 3");
        assert!(err.is_backtrackable());
        assert_eq!(err.at_loc(), Some(3));
    }

    #[test]
    fn source_errors_are_fatal() {
        let err: ParseError = io::Error::from(io::ErrorKind::UnexpectedEof).into();
        assert!(!err.is_backtrackable());
        assert!(err.expected().is_none());
    }
}
