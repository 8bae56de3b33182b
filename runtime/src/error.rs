//! Parse failures raised by generated parsers.
//!
//! A failure carries the position where it was detected and, when it was
//! relabelled by an enclosing construct (`Failed to parse X`, `Expected: y`),
//! the failure it replaced. Walking `causes()` therefore goes from the
//! outermost grammar construct down to the token that did not match.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at line {line}, column {column}")]
pub struct ParseError {
    pub message: String,
    /// Byte offset into the source.
    pub offset: usize,
    /// 1-based line.
    pub line: usize,
    /// 1-based column, counted in characters.
    pub column: usize,
    #[source]
    pub cause: Option<Box<ParseError>>,
}

impl ParseError {
    /// Build a failure at `offset` in `source`.
    pub fn at(source: &str, offset: usize, message: impl Into<String>) -> Self {
        let offset = offset.min(source.len());
        let before = &source[..offset];
        let line = before.matches('\n').count() + 1;
        let column = match before.rfind('\n') {
            Some(newline) => before[newline + 1..].chars().count() + 1,
            None => before.chars().count() + 1,
        };
        ParseError {
            message: message.into(),
            offset,
            line,
            column,
            cause: None,
        }
    }

    /// Relabel this failure, keeping it as the cause.
    pub fn context(self, label: impl Into<String>) -> Self {
        ParseError {
            message: label.into(),
            offset: self.offset,
            line: self.line,
            column: self.column,
            cause: Some(Box::new(self)),
        }
    }

    /// This failure followed by every failure it wraps, outermost first.
    pub fn causes(&self) -> impl Iterator<Item = &ParseError> {
        std::iter::successors(Some(self), |e| e.cause.as_deref())
    }

    /// The innermost failure: the match that actually did not succeed.
    pub fn root_cause(&self) -> &ParseError {
        self.causes().last().unwrap_or(self)
    }
}

/// Final link of a try-chain or recognition routine: an unconditional
/// failure bearing the supplied label if everything before it failed.
pub trait Recover<T> {
    fn or_fail(self, label: impl Into<String>) -> Result<T, ParseError>;
}

impl<T> Recover<T> for Result<T, ParseError> {
    fn or_fail(self, label: impl Into<String>) -> Result<T, ParseError> {
        self.map_err(|cause| cause.context(label))
    }
}
