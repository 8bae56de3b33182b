//! Named pattern matchers.
//!
//! Generated code declares one `static` extractor per pattern-only entity.
//! The regex is compiled on first use and reused for the lifetime of the
//! program.

use once_cell::sync::OnceCell;
use regex::Regex;

pub struct Extractor {
    name: &'static str,
    pattern: &'static str,
    regex: OnceCell<Result<Regex, regex::Error>>,
}

impl Extractor {
    /// `pattern` is expected to be anchored (`^…`); matches that do not
    /// start at the cursor are rejected regardless.
    pub const fn new(name: &'static str, pattern: &'static str) -> Self {
        Extractor {
            name,
            pattern,
            regex: OnceCell::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn pattern(&self) -> &'static str {
        self.pattern
    }

    fn regex(&self) -> Result<&Regex, regex::Error> {
        self.regex
            .get_or_init(|| Regex::new(self.pattern))
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Match at the start of `text`, returning the matched prefix.
    /// `Err` carries the message for a pattern that does not compile.
    pub(crate) fn match_prefix<'t>(&self, text: &'t str) -> Result<Option<&'t str>, String> {
        let regex = self
            .regex()
            .map_err(|e| format!("Invalid pattern for {}: {}", self.name, e))?;
        Ok(regex
            .find(text)
            .filter(|m| m.start() == 0)
            .map(|m| m.as_str()))
    }
}

impl std::fmt::Debug for Extractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extractor")
            .field("name", &self.name)
            .field("pattern", &self.pattern)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static DIGITS: Extractor = Extractor::new("Digits", "^[0-9]+");
    static UNANCHORED: Extractor = Extractor::new("Word", "[a-z]+");
    static BROKEN: Extractor = Extractor::new("Broken", "^[0-9");

    #[test]
    fn test_matches_prefix() {
        assert_eq!(DIGITS.match_prefix("123abc"), Ok(Some("123")));
        assert_eq!(DIGITS.match_prefix("abc"), Ok(None));
    }

    #[test]
    fn test_rejects_match_not_at_start() {
        assert_eq!(UNANCHORED.match_prefix("12ab"), Ok(None));
        assert_eq!(UNANCHORED.match_prefix("ab12"), Ok(Some("ab")));
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        let err = BROKEN.match_prefix("1").unwrap_err();
        assert!(err.starts_with("Invalid pattern for Broken"), "{}", err);
    }
}
