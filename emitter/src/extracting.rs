//! Extraction table.
//!
//! Every entity whose root action is a pattern gets one `static` extractor in
//! `pub mod extracting`, anchored to the start of the remaining input. Call
//! sites only ever refer to these statics by name. Patterns are compiled here
//! once so a broken pattern fails generation instead of the generated parser.

use regex::Regex;

use crate::error::GenerateError;
use crate::model::Model;
use crate::naming::{extractor_name, string_literal};

/// Write `pub mod extracting { ... }` to `buf`.
pub fn write_extracting(buf: &mut String, model: &Model, runtime: &str) -> Result<(), GenerateError> {
    buf.push_str("pub mod extracting {\n");
    for (_, entity) in model.iter() {
        let Some(pattern) = entity.pattern() else {
            continue;
        };
        let anchored = format!("^{}", pattern);
        Regex::new(&anchored).map_err(|e| GenerateError::InvalidPattern {
            entity: entity.name.clone(),
            message: e.to_string(),
        })?;
        buf.push_str(&format!(
            "pub static {}: {rt}::Extractor = {rt}::Extractor::new({}, {});\n",
            extractor_name(&entity.name),
            string_literal(&entity.name),
            string_literal(&anchored),
            rt = runtime,
        ));
    }
    buf.push_str("}\n");
    Ok(())
}
