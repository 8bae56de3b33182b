//! Pipeline for parser code generation.
//!
//! Implements a state machine that:
//! 1. **Generates** the three code sections from `&Model`: entity declarations,
//!    recognition routines (plus the entry point) and the extraction table
//! 2. **Finalizes** by concatenating the sections in that order, wrapping them
//!    in the configured namespace and parsing the result into a `TokenStream`
//!
//! ```text
//! Model ──→ Ready ──→ [Generate] ──→ Generated ──→ [Finalize] ──→ Complete
//!                     declarations               concatenate + parse
//!                     parser routines            into TokenStream
//!                     extraction table
//! ```
//!
//! Only the optional banner depends on anything but the model; it is kept out
//! of the token stream and added by [`GeneratedParser::to_source`].

use std::io::Write;
use std::process::{Command, Stdio};

use proc_macro2::TokenStream;

use crate::ebnf;
use crate::entity::entity_declaration;
use crate::error::GenerateError;
use crate::extracting::write_extracting;
use crate::model::{EntityId, Model};
use crate::naming::check_names;
use crate::routine::{write_entry_point, write_routine};
use crate::EmitterOptions;

// ══════════════════════════════════════════════════════════════════════════════
// Pipeline state machine
// ══════════════════════════════════════════════════════════════════════════════

/// Pipeline state machine for code generation.
///
/// Each state holds the data needed for the next transition.
pub enum PipelineState<'m> {
    /// Model and options in hand, nothing generated yet.
    Ready {
        model: &'m Model,
        options: &'m EmitterOptions,
    },
    /// All sections generated, ready to merge.
    Generated {
        options: &'m EmitterOptions,
        declarations: String,
        parser: String,
        extracting: String,
    },
    /// Final output produced.
    Complete(TokenStream),
}

impl PipelineState<'_> {
    /// Advance the pipeline to the next state.
    ///
    /// - `Ready → Generated`: runs the three emitters
    /// - `Generated → Complete`: concatenates sections and parses into `TokenStream`
    /// - `Complete → Complete`: nothing left to do
    pub fn advance(self) -> Result<Self, GenerateError> {
        match self {
            PipelineState::Ready { model, options } => {
                check_names(model)?;
                let runtime = runtime_path(options)?;
                let declarations = generate_declarations(model, options, &runtime);
                let parser = generate_parser_code(model, options)?;
                let mut extracting = String::new();
                write_extracting(&mut extracting, model, &options.runtime_crate)?;
                Ok(PipelineState::Generated {
                    options,
                    declarations,
                    parser,
                    extracting,
                })
            }
            PipelineState::Generated {
                options,
                declarations,
                parser,
                extracting,
            } => {
                let mut combined = format!(
                    "#[allow(unused_imports)]\nuse {}::Recover as _;\n",
                    options.runtime_crate
                );
                combined.push_str(&declarations);
                combined.push_str(&parser);
                combined.push_str(&extracting);
                if let Some(namespace) = &options.namespace {
                    combined = wrap_namespace(namespace, combined);
                }
                let tokens = combined
                    .parse::<TokenStream>()
                    .map_err(|e| GenerateError::MalformedOutput(e.to_string()))?;
                syn::parse2::<syn::File>(tokens.clone())
                    .map_err(|e| GenerateError::MalformedOutput(e.to_string()))?;
                Ok(PipelineState::Complete(tokens))
            }
            complete @ PipelineState::Complete(_) => Ok(complete),
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Entry point
// ══════════════════════════════════════════════════════════════════════════════

/// Run the full pipeline: generate → finalize.
pub fn run_pipeline(model: &Model, options: &EmitterOptions) -> Result<GeneratedParser, GenerateError> {
    // EBNF debug dump (opt-in via environment variable)
    if let Ok(dump_target) = std::env::var("RDGEN_DUMP_EBNF") {
        let dump = ebnf::format_ebnf(model);
        ebnf::write_ebnf_output(&dump, &model.root().name, &dump_target);
    }

    let mut state = PipelineState::Ready { model, options };
    loop {
        state = state.advance()?;
        if let PipelineState::Complete(tokens) = state {
            return Ok(GeneratedParser {
                tokens,
                banner: banner(options),
                format: options.format,
            });
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Generate phase
// ══════════════════════════════════════════════════════════════════════════════

fn runtime_path(options: &EmitterOptions) -> Result<syn::Path, GenerateError> {
    syn::parse_str(&options.runtime_crate).map_err(|e| {
        GenerateError::MalformedOutput(format!("runtime crate path `{}`: {}", options.runtime_crate, e))
    })
}

fn rule_doc(model: &Model, id: EntityId, options: &EmitterOptions) -> Option<String> {
    if !options.emit_rules {
        return None;
    }
    model.entity(id).rule.clone().or_else(|| ebnf::production(model, id))
}

fn generate_declarations(model: &Model, options: &EmitterOptions, runtime: &syn::Path) -> String {
    let mut buf = String::new();
    for (id, _) in model.iter() {
        let doc = rule_doc(model, id, options);
        buf.push_str(&entity_declaration(model, id, runtime, doc.as_deref()).to_string());
        buf.push('\n');
    }
    buf
}

fn generate_parser_code(model: &Model, options: &EmitterOptions) -> Result<String, GenerateError> {
    let mut buf = String::new();
    for (id, _) in model.iter().filter(|(id, _)| model.has_routine(*id)) {
        let doc = rule_doc(model, id, options);
        write_routine(&mut buf, model, id, &options.runtime_crate, doc.as_deref())?;
    }
    write_entry_point(&mut buf, model, &options.runtime_crate)?;
    Ok(buf)
}

/// `a::b` (or `a.b`) becomes `pub mod a { pub mod b { ... } }`.
fn wrap_namespace(namespace: &str, code: String) -> String {
    namespace
        .split(|c| c == '.' || c == ':')
        .filter(|segment| !segment.is_empty())
        .rev()
        .fold(code, |inner, segment| format!("pub mod {} {{\n{}}}\n", segment, inner))
}

fn banner(options: &EmitterOptions) -> Option<String> {
    if !options.emit_info {
        return None;
    }
    let now = chrono::Local::now();
    let mut banner = format!(
        "// DO NOT EDIT THIS FILE\n// This file was generated using rdgen\n// on {}",
        now.format("%A, %B %-d, %Y at %H:%M:%S")
    );
    if !options.sources.is_empty() {
        let plural = if options.sources.len() > 1 { "s" } else { "" };
        banner.push_str(&format!("\n// Source{} : {}", plural, options.sources.join(", ")));
    }
    Some(banner)
}

// ══════════════════════════════════════════════════════════════════════════════
// Output
// ══════════════════════════════════════════════════════════════════════════════

/// Generated parser module.
#[derive(Debug, Clone)]
pub struct GeneratedParser {
    tokens: TokenStream,
    banner: Option<String>,
    format: bool,
}

impl GeneratedParser {
    pub fn tokens(&self) -> &TokenStream {
        &self.tokens
    }

    pub fn into_tokens(self) -> TokenStream {
        self.tokens
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    /// Source text: the banner, then the code, formatted with `rustfmt`
    /// when requested and available.
    pub fn to_source(&self) -> String {
        let raw = self.tokens.to_string();
        let code = if self.format {
            rustfmt(&raw).unwrap_or(raw)
        } else {
            raw
        };
        match &self.banner {
            Some(banner) => format!("{}\n\n{}\n", banner, code),
            None => format!("{}\n", code),
        }
    }
}

fn rustfmt(code: &str) -> Option<String> {
    let mut child = match Command::new("rustfmt")
        .args(["--edition", "2021", "--emit", "stdout", "--quiet"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            log::warn!("rustfmt unavailable, emitting unformatted code: {}", e);
            return None;
        }
    };
    let mut stdin = child.stdin.take()?;
    let input = code.to_string();
    let writer = std::thread::spawn(move || stdin.write_all(input.as_bytes()));
    let output = child.wait_with_output().ok()?;
    if !matches!(writer.join(), Ok(Ok(()))) || !output.status.success() {
        log::warn!("rustfmt failed, emitting unformatted code");
        return None;
    }
    String::from_utf8(output.stdout).ok()
}
