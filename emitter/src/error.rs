//! Generator-internal faults.
//!
//! Every variant means the model cannot be turned into a correct parser.
//! Generation stops at the first one and returns no partial output.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    #[error("plural mismatch on `{entity}.{property}`: {reason}")]
    PluralMismatch {
        entity: String,
        property: String,
        reason: &'static str,
    },
    #[error("cannot accumulate into `{property}` of virtual entity `{entity}`")]
    VirtualAccumulation { entity: String, property: String },
    #[error("`{entity}.{property}` holds {expected} but its action produces {found}")]
    TypeMismatch {
        entity: String,
        property: String,
        expected: String,
        found: String,
    },
    #[error("{kind} action cannot be assigned to `{entity}.{property}`")]
    UnassignableAction {
        entity: String,
        property: String,
        kind: &'static str,
    },
    #[error("`{0}` has no extractor: it is not a virtual entity recognized by a pattern")]
    MissingExtractor(String),
    #[error("`{0}` has no recognition routine")]
    NoRecognitionRoutine(String),
    #[error("invalid pattern for `{entity}`: {message}")]
    InvalidPattern { entity: String, message: String },
    #[error("`{first}` and `{second}` both generate the {kind} `{ident}`")]
    NameCollision {
        first: String,
        second: String,
        kind: &'static str,
        ident: String,
    },
    #[error("generated code is not valid Rust: {0}")]
    MalformedOutput(String),
}
