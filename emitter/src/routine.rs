//! Recognition routines.
//!
//! One `parse_<entity>` function per entity that has a routine (see
//! [`Model::has_routine`]). The routine declares its result slot, runs the
//! translated root action inside a recoverable block, and relabels any failure
//! as `Failed to parse <Entity>`. The root entity additionally gets the public
//! `parse(source)` entry point.

use crate::action::Translator;
use crate::error::GenerateError;
use crate::model::{EntityId, Model};
use crate::naming::{routine_name, string_literal, type_ident};

/// Write the recognition routine for `id` to `buf`.
pub fn write_routine(
    buf: &mut String,
    model: &Model,
    id: EntityId,
    runtime: &str,
    doc: Option<&str>,
) -> Result<(), GenerateError> {
    let entity = model.entity(id);
    let Some(action) = entity.action.as_ref().filter(|_| model.has_routine(id)) else {
        return Err(GenerateError::NoRecognitionRoutine(entity.name.clone()));
    };
    let name = routine_name(&entity.name);
    let ty = type_ident(&entity.name);
    let failure = string_literal(&format!("Failed to parse {}", entity.name));
    let body = Translator::new(model, runtime).translate(action)?;
    log::debug!("emitting {} for {}", name, entity.name);

    if let Some(doc) = doc {
        buf.push_str(&format!("#[doc = {}]\n", string_literal(doc)));
    }
    if entity.is_virtual {
        buf.push_str(&format!(
            "pub fn {name}(p: &mut {rt}::Parser<'_>) -> std::result::Result<std::boxed::Box<dyn {ty}>, {rt}::ParseError> {{\n\
             p.log({log});\n\
             #[allow(unused_mut)]\n\
             let mut result: std::option::Option<std::boxed::Box<dyn {ty}>> = None;\n\
             p.attempt(|p| {{\n{body}\nOk(())\n}})\n\
             .or_fail({failure})?;\n\
             result.ok_or_else(|| p.error({failure}))\n\
             }}\n",
            rt = runtime,
            log = string_literal(&name),
        ));
    } else {
        buf.push_str(&format!(
            "pub fn {name}(p: &mut {rt}::Parser<'_>) -> std::result::Result<{ty}, {rt}::ParseError> {{\n\
             p.log({log});\n\
             #[allow(unused_mut)]\n\
             let mut result = {ty}::new();\n\
             p.attempt(|p| {{\n{body}\nOk(())\n}})\n\
             .or_fail({failure})?;\n\
             Ok(result)\n\
             }}\n",
            rt = runtime,
            log = string_literal(&name),
        ));
    }
    Ok(())
}

/// Write `pub fn parse(source)` for the root entity: its routine over the
/// whole input, with the grammar's skip extractor when it defines one.
pub fn write_entry_point(buf: &mut String, model: &Model, runtime: &str) -> Result<(), GenerateError> {
    let root = model.root();
    if !model.has_routine(model.root) {
        return Err(GenerateError::NoRecognitionRoutine(root.name.clone()));
    }
    let ty = type_ident(&root.name);
    let ty = if root.is_virtual {
        format!("std::boxed::Box<dyn {}>", ty)
    } else {
        ty.to_string()
    };
    let skip = if model.skip_pattern().is_some() {
        ".with_skip(&extracting::SKIP)"
    } else {
        ""
    };
    buf.push_str(&format!(
        "pub fn parse(source: &str) -> std::result::Result<{ty}, {rt}::ParseError> {{\n\
         let mut p = {rt}::Parser::new(source){skip};\n\
         let result = {routine}(&mut p)?;\n\
         p.finish()?;\n\
         Ok(result)\n\
         }}\n",
        rt = runtime,
        routine = routine_name(&root.name),
    ));
    Ok(())
}
