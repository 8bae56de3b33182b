//! EBNF rendering of a grammar model.
//!
//! Produces one `Name ::= body ;` production per entity, used to annotate
//! generated items when the model carries no source rule text and as a debug
//! dump of the whole model. Bodies use `,` for sequence, `|` for choice,
//! `{ }` for repetition, `[ ]` for options, `/re/` for patterns and
//! `field@item` for bound actions.
//!
//! Activated via the `RDGEN_DUMP_EBNF` environment variable:
//! - `RDGEN_DUMP_EBNF=1` writes to `target/rdgen/<Root>.ebnf`
//! - `RDGEN_DUMP_EBNF=<dir>` writes to `<dir>/<Root>.ebnf`

use std::fmt::Write;

use crate::model::{ActionKind, EntityId, Model, ParseAction};

/// Format every production of the model, in declaration order.
pub fn format_ebnf(model: &Model) -> String {
    let mut buf = String::new();
    let _ = writeln!(buf, "(* {} *)", model.root().name);
    let _ = writeln!(buf);
    for (id, _) in model.iter() {
        if let Some(production) = production(model, id) {
            let _ = writeln!(buf, "{}", production);
        }
    }
    buf
}

/// `Name ::= body ;` for entity `id`. A dispatch type without an action is
/// rendered as the alternation of its direct subtypes; `None` when it has none.
pub fn production(model: &Model, id: EntityId) -> Option<String> {
    let entity = model.entity(id);
    let body = match &entity.action {
        Some(action) => format_action(model, action, false),
        None => {
            let subtypes: Vec<&str> = model.subtypes(id).map(|(_, e)| e.name.as_str()).collect();
            if subtypes.is_empty() {
                return None;
            }
            subtypes.join(" | ")
        }
    };
    Some(format!("{} ::= {} ;", entity.name, body))
}

fn format_action(model: &Model, action: &ParseAction, nested: bool) -> String {
    let core = match &action.kind {
        ActionKind::Literal(text) => format!("\"{}\"", text.replace('"', "\\\"")),
        ActionKind::Pattern { pattern, .. } => format!("/{}/", pattern),
        ActionKind::Reference(id) => model.entity(*id).name.clone(),
        ActionKind::Sequence(actions) => group(
            actions.iter().map(|a| format_action(model, a, true)).collect::<Vec<_>>().join(" , "),
            actions.len() > 1 && (nested || action.is_plural || action.is_optional),
        ),
        ActionKind::Alternation { actions, .. } => group(
            actions.iter().map(|a| format_action(model, a, true)).collect::<Vec<_>>().join(" | "),
            actions.len() > 1 && (nested || action.is_plural || action.is_optional),
        ),
    };
    let core = match action.property {
        Some(property) => format!("{}@{}", model.property(property).name, core),
        None => core,
    };
    if action.is_plural {
        format!("{{ {} }}", core)
    } else if action.is_optional {
        format!("[ {} ]", core)
    } else {
        core
    }
}

fn group(body: String, parenthesize: bool) -> String {
    if parenthesize {
        format!("( {} )", body)
    } else {
        body
    }
}

/// Write EBNF output to the location named by the dump target.
///
/// - `"1"` → `target/rdgen/<name>.ebnf`
/// - Any other value → treat as directory path, write to `<dir>/<name>.ebnf`
pub fn write_ebnf_output(ebnf: &str, name: &str, dump_target: &str) {
    let dir = if dump_target == "1" {
        std::path::PathBuf::from("target/rdgen")
    } else {
        std::path::PathBuf::from(dump_target)
    };

    if let Err(e) = std::fs::create_dir_all(&dir) {
        eprintln!("warning: RDGEN_DUMP_EBNF: failed to create directory {:?}: {}", dir, e);
        return;
    }

    let path = dir.join(format!("{}.ebnf", name));
    match std::fs::write(&path, ebnf) {
        Ok(()) => eprintln!("info: RDGEN_DUMP_EBNF: wrote {}", path.display()),
        Err(e) => eprintln!("warning: RDGEN_DUMP_EBNF: failed to write {:?}: {}", path, e),
    }
}
