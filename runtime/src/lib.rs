//! Runtime support for rdgen-generated parsers
//!
//! Every parser emitted by `rdgen-emitter` links against this crate. It provides:
//! - The input cursor and its match-or-fail primitives (literal and pattern)
//! - Recoverable blocks, repeat-while-succeeds loops and ordered try-chains
//! - Lazily compiled, anchored pattern extractors
//! - Rendering helpers used by the generated `Display` implementations

// Parse failures with position and cause chain
mod error;
pub use error::{ParseError, Recover};

// Named pattern matchers referenced from the generated extraction table
mod extractor;
pub use extractor::Extractor;

// Cursor and combinators
mod parser;
pub use parser::Parser;

// Base capability of every generated entity type
mod node;
pub use node::{downcast, Node};

/// Everything a generated parser module needs in scope.
pub mod prelude {
    pub use crate::{
        DisplayOption, DisplaySlice, DisplayText, Extractor, Node, ParseError, Parser, Recover,
    };
}

/// Wrapper that provides `Display` for slices/Vecs of `Display` items.
///
/// Renders as a comma-separated list, e.g. `a,b,c`.
/// Used by generated `Display` impls for sequence-typed fields.
pub struct DisplaySlice<'a, T>(pub &'a [T]);

impl<T: std::fmt::Display> std::fmt::Display for DisplaySlice<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, item) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", item)?;
        }
        Ok(())
    }
}

/// Renders an absent value as `null` and a present one through its own `Display`.
pub struct DisplayOption<'a, T>(pub &'a Option<T>);

impl<T: std::fmt::Display> std::fmt::Display for DisplayOption<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(value) => write!(f, "{}", value),
            None => write!(f, "null"),
        }
    }
}

/// Renders text as a quoted, escaped literal.
pub struct DisplayText<'a>(pub &'a str);

impl std::fmt::Display for DisplayText<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.0)
    }
}
