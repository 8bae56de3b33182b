//! Identifier and literal formatting for generated code.
//!
//! Grammar names are free-form; these helpers map them onto Rust naming
//! conventions (types in `PascalCase`, fields and routines in `snake_case`,
//! extractors in `CONSTANT_CASE`), escaping keywords as raw identifiers.

use convert_case::{Case, Casing};
use proc_macro2::{Ident, Literal, Span};

use crate::error::GenerateError;
use crate::model::{Model, SKIP_ENTITY};

/// Keywords that cannot be written as raw identifiers.
const UNRAWABLE: &[&str] = &["self", "Self", "super", "crate"];

fn ident(name: &str) -> Ident {
    if UNRAWABLE.contains(&name) {
        return Ident::new(&format!("{}_", name), Span::call_site());
    }
    match syn::parse_str::<Ident>(name) {
        Ok(ident) => ident,
        Err(_) => Ident::new_raw(name, Span::call_site()),
    }
}

pub fn type_ident(name: &str) -> Ident {
    ident(&name.to_case(Case::Pascal))
}

pub fn field_ident(name: &str) -> Ident {
    ident(&name.to_case(Case::Snake))
}

/// `Digit` → `parse_digit`
pub fn routine_name(name: &str) -> String {
    format!("parse_{}", name.to_case(Case::Snake))
}

/// `IntLiteral` → `INT_LITERAL`; the skip entity becomes `SKIP`.
pub fn extractor_name(name: &str) -> String {
    if name == SKIP_ENTITY {
        return "SKIP".to_string();
    }
    name.to_case(Case::Snake).to_uppercase()
}

/// Rust string literal for `text`, quoted and escaped.
pub fn string_literal(text: &str) -> String {
    Literal::string(text).to_string()
}

/// Reject models in which two grammar names map onto one generated
/// identifier: types, routines, extractors, and fields within an entity.
pub fn check_names(model: &Model) -> Result<(), GenerateError> {
    let types = model
        .iter()
        .filter(|(_, e)| !e.is_skip())
        .map(|(_, e)| (e.name.as_str(), type_ident(&e.name).to_string()));
    distinct("type", types)?;

    let routines = model
        .iter()
        .filter(|(id, _)| model.has_routine(*id))
        .map(|(_, e)| (e.name.as_str(), routine_name(&e.name)));
    distinct("routine", routines)?;

    let extractors = model
        .iter()
        .filter(|(_, e)| e.pattern().is_some())
        .map(|(_, e)| (e.name.as_str(), extractor_name(&e.name)));
    distinct("extractor", extractors)?;

    for (_, entity) in model.iter() {
        let fields = entity
            .properties
            .iter()
            .map(|p| (p.name.as_str(), field_ident(&p.name).to_string()));
        distinct("field", fields)?;
    }
    Ok(())
}

fn distinct<'a>(
    kind: &'static str,
    names: impl Iterator<Item = (&'a str, String)>,
) -> Result<(), GenerateError> {
    let mut seen: Vec<(&str, String)> = Vec::new();
    for (name, ident) in names {
        if let Some((first, _)) = seen.iter().find(|(_, other)| *other == ident) {
            return Err(GenerateError::NameCollision {
                first: first.to_string(),
                second: name.to_string(),
                kind,
                ident,
            });
        }
        seen.push((name, ident));
    }
    Ok(())
}
