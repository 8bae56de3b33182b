//! # rdgen: recursive-descent parser emitter
//!
//! Turns a structural grammar model (entities, their properties and the
//! parse-action tree recognizing each entity) into Rust source for a
//! recursive-descent parser that builds typed values of those entities.
//!
//! ## Architecture
//!
//! ```text
//!  grammar.json ──→ ModelSpec::resolve ──→ Model
//!                                            │
//!                                            ▼
//!                ┌────────────────────────────────────────────────┐
//!                │ pipeline                                       │
//!                │  1. entity::entity_declaration   (per entity)  │
//!                │  2. routine::write_routine       (per entity)  │
//!                │       └─ action::Translator      (recursive)   │
//!                │  3. extracting::write_extracting (once)        │
//!                │  4. concatenate + parse into TokenStream       │
//!                └────────────────────────────────────────────────┘
//!                                            │
//!                                            ▼
//!                     GeneratedParser (links against rdgen-runtime)
//! ```
//!
//! Generation is a pure function of the model: the same model always yields
//! the same token stream. Only the optional banner (`emit_info`) carries a
//! timestamp, and it is kept outside the token stream.

pub mod action;
pub mod ebnf;
pub mod entity;
pub mod error;
pub mod extracting;
pub mod model;
pub mod naming;
pub mod pipeline;
pub mod routine;

#[cfg(test)]
mod tests;

pub use error::GenerateError;
pub use model::spec::{ModelError, ModelSpec};
pub use model::{ActionKind, Entity, EntityId, Model, ParseAction, Property, PropertyRef, ValueType};
pub use pipeline::GeneratedParser;

/// Path of the runtime crate generated code refers to by default.
pub const DEFAULT_RUNTIME_CRATE: &str = "rdgen_runtime";

/// Emission options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitterOptions {
    /// Prefix the source with a banner naming the generation time and sources.
    pub emit_info: bool,
    /// Annotate types and routines with their grammar rule as doc attributes.
    pub emit_rules: bool,
    /// Grammar files the model was read from, listed in the banner.
    pub sources: Vec<String>,
    /// Wrap everything in `pub mod <namespace>`; `a::b` nests.
    pub namespace: Option<String>,
    /// Path under which generated code reaches the runtime.
    pub runtime_crate: String,
    /// Pipe the source through `rustfmt` when it is available.
    pub format: bool,
}

impl Default for EmitterOptions {
    fn default() -> Self {
        EmitterOptions {
            emit_info: false,
            emit_rules: false,
            sources: Vec::new(),
            namespace: None,
            runtime_crate: DEFAULT_RUNTIME_CRATE.to_string(),
            format: false,
        }
    }
}

/// Generate a complete parser for `model`.
///
/// The result contains, in order:
/// - One type per entity (struct for concrete, trait for virtual)
/// - One `parse_<entity>` routine per recognizable entity, plus `parse(source)`
///   for the root
/// - `pub mod extracting` with one static extractor per pattern entity
///
/// Any [`GenerateError`] aborts generation; no partial output is returned.
#[inline]
pub fn generate(model: &Model, options: &EmitterOptions) -> Result<GeneratedParser, GenerateError> {
    pipeline::run_pipeline(model, options)
}
