//! Input cursor and the combinators generated parsers are built from.
//!
//! Generated recognition routines are free functions taking `p: &mut Parser`.
//! Every grammar construct maps onto one primitive here:
//!
//! | construct           | primitive                                   |
//! |---------------------|---------------------------------------------|
//! | literal             | `consume` / `maybe_consume`                 |
//! | pattern             | `extract`                                   |
//! | recoverable block   | `attempt` / `maybe`                         |
//! | repetition          | `repeat` / `many`                           |
//! | ordered alternation | `attempt(..).or_else(..)` + `Recover::or_fail` |
//!
//! Whitespace is skipped before every match: with the grammar's skip
//! extractor when one was installed, otherwise any Unicode whitespace.

use crate::{Extractor, ParseError};

pub struct Parser<'s> {
    source: &'s str,
    cursor: usize,
    skip: Option<&'static Extractor>,
}

impl<'s> Parser<'s> {
    pub fn new(source: &'s str) -> Self {
        Parser {
            source,
            cursor: 0,
            skip: None,
        }
    }

    /// Replace default whitespace skipping with `skip`.
    pub fn with_skip(mut self, skip: &'static Extractor) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> &'s str {
        &self.source[self.cursor..]
    }

    pub fn is_at_end(&self) -> bool {
        self.cursor >= self.source.len()
    }

    /// A failure positioned at the cursor.
    pub fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::at(self.source, self.cursor, message)
    }

    fn skip_whitespace(&mut self) -> Result<(), ParseError> {
        match self.skip {
            Some(skip) => {
                let skipped = skip
                    .match_prefix(self.remaining())
                    .map_err(|message| self.error(message))?
                    .map_or(0, str::len);
                self.cursor += skipped;
            }
            None => {
                let rest = self.remaining();
                self.cursor += rest.len() - rest.trim_start().len();
            }
        }
        Ok(())
    }

    /// Match `literal` exactly or fail.
    pub fn consume(&mut self, literal: &str) -> Result<String, ParseError> {
        let start = self.cursor;
        self.skip_whitespace()?;
        if self.remaining().starts_with(literal) {
            self.cursor += literal.len();
            Ok(literal.to_string())
        } else {
            let err = self.error(format!("Expected: {:?}", literal));
            self.cursor = start;
            Err(err)
        }
    }

    /// Tolerant form of `consume`: reports whether `literal` was present.
    pub fn maybe_consume(&mut self, literal: &str) -> bool {
        self.consume(literal).is_ok()
    }

    /// Match `extractor` at the cursor or fail, returning the matched text.
    pub fn extract(&mut self, extractor: &Extractor) -> Result<String, ParseError> {
        let start = self.cursor;
        self.skip_whitespace()?;
        let matched = extractor
            .match_prefix(self.remaining())
            .map_err(|message| self.error(message))?;
        match matched {
            Some(text) => {
                self.cursor += text.len();
                Ok(text.to_string())
            }
            None => {
                let err = self.error(format!("Expected: {}", extractor.name()));
                self.cursor = start;
                Err(err)
            }
        }
    }

    /// Recoverable block: run `f`, restoring the cursor if it fails.
    pub fn attempt<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        let start = self.cursor;
        let result = f(self);
        if result.is_err() {
            self.cursor = start;
        }
        result
    }

    /// Recoverable block whose failure yields no value instead of propagating.
    pub fn maybe<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, ParseError>) -> Option<T> {
        self.attempt(f).ok()
    }

    /// Run complete passes of `f` until one fails.
    ///
    /// The failing pass is rolled back to where it started. A pass that
    /// succeeds without consuming input ends the loop, so zero-width
    /// grammars cannot spin forever.
    pub fn repeat(&mut self, mut f: impl FnMut(&mut Self) -> Result<(), ParseError>) {
        loop {
            let start = self.cursor;
            if self.attempt(&mut f).is_err() || self.cursor == start {
                break;
            }
        }
    }

    /// Like `repeat`, collecting the value of every successful pass.
    pub fn many<T>(&mut self, mut f: impl FnMut(&mut Self) -> Result<T, ParseError>) -> Vec<T> {
        let mut items = Vec::new();
        loop {
            let start = self.cursor;
            match self.attempt(&mut f) {
                Ok(item) => {
                    items.push(item);
                    if self.cursor == start {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
        items
    }

    /// Require that only skippable input remains.
    pub fn finish(&mut self) -> Result<(), ParseError> {
        self.skip_whitespace()?;
        if self.is_at_end() {
            Ok(())
        } else {
            Err(self.error("Unexpected trailing input"))
        }
    }

    /// Trace entry into a recognition routine.
    pub fn log(&self, routine: &str) {
        log::trace!("{} at offset {}", routine, self.cursor);
    }
}
