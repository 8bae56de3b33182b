//! Action translation: parse-action tree → statements of a recognition routine.
//!
//! Every translated statement runs inside a closure `|p| { ... Ok(()) }` of
//! the enclosing routine, with the parser bound to `p` and the routine's
//! value under construction bound to `result`. Failure propagates with `?`.
//!
//! | action                      | emitted                                        |
//! |-----------------------------|------------------------------------------------|
//! | literal                     | `p.consume("x")?`                              |
//! | optional literal            | `p.maybe_consume("x")`                         |
//! | pattern / extractor ref     | `p.extract(&extracting::X)?`                   |
//! | reference                   | `parse_x(p)?`                                  |
//! | plural leaf                 | `p.many(\|p\| ...)`                            |
//! | sequence                    | statements in order                            |
//! | alternation                 | `p.attempt(..).or_else(..).or_fail(label)?`    |
//! | plural sequence/alternation | `p.repeat(\|p\| { ... })`                      |
//! | optional                    | `p.maybe(\|p\| { ... })`                       |
//!
//! Values bound to a property are written to `result.<field>` (overwrite),
//! pushed / extended into it when the action sits under a repetition, or
//! written to `result` itself when the property belongs to a virtual entity.
//!
//! A repetition pass, alternation branch or optional block that fails
//! part-way is discarded as a whole: accumulating fields it touches are
//! truncated back to their length at the start of the pass.

use crate::error::GenerateError;
use crate::model::{ActionKind, EntityId, Model, ParseAction, Property, ValueType};
use crate::naming::{extractor_name, field_ident, routine_name, string_literal, type_ident};

const BOX: &str = "std::boxed::Box";

/// What a leaf match evaluates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Produced {
    Text,
    Flag,
    Concrete(EntityId),
    /// `Box<dyn V>` returned by a virtual entity's routine.
    Boxed(EntityId),
}

/// A leaf match: the call expression and what it yields.
struct Fetch {
    call: String,
    produced: Produced,
    fallible: bool,
}

impl Fetch {
    fn fallible(call: String, produced: Produced) -> Self {
        Fetch {
            call,
            produced,
            fallible: true,
        }
    }

    fn value(&self) -> String {
        if self.fallible {
            format!("{}?", self.call)
        } else {
            self.call.clone()
        }
    }
}

pub struct Translator<'m> {
    model: &'m Model,
    runtime: &'m str,
}

impl<'m> Translator<'m> {
    pub fn new(model: &'m Model, runtime: &'m str) -> Self {
        Translator { model, runtime }
    }

    /// Translate `action` into one or more statements.
    pub fn translate(&self, action: &ParseAction) -> Result<String, GenerateError> {
        let code = match &action.kind {
            ActionKind::Literal(text) if self.is_tolerant(action) => {
                let fetch = Fetch {
                    call: format!("p.maybe_consume({})", string_literal(text)),
                    produced: Produced::Flag,
                    fallible: false,
                };
                self.assign(action, fetch)?
            }
            ActionKind::Literal(text) => {
                let call = format!("p.consume({})", string_literal(text));
                self.assign(action, Fetch::fallible(call, Produced::Text))?
            }
            ActionKind::Pattern { entity, .. } => self.assign(action, self.extract(*entity)?)?,
            ActionKind::Reference(entity) => self.assign(action, self.call(*entity)?)?,
            ActionKind::Sequence(actions) => self.sequence(action, actions)?,
            ActionKind::Alternation { actions, label } => self.alternation(action, actions, label)?,
        };

        if action.is_optional && !self.is_tolerant(action) {
            Ok(self.optional(action, &code))
        } else {
            Ok(code)
        }
    }

    /// Optional single literal whose presence is the value: it already
    /// encodes its own failure tolerance.
    fn is_tolerant(&self, action: &ParseAction) -> bool {
        let ActionKind::Literal(_) = action.kind else {
            return false;
        };
        let wants_text = action
            .property
            .is_some_and(|p| self.model.property(p).value == ValueType::Text);
        action.is_optional && !action.is_plural && !wants_text
    }

    fn extract(&self, entity: EntityId) -> Result<Fetch, GenerateError> {
        let target = self.model.entity(entity);
        if target.pattern().is_none() {
            return Err(GenerateError::MissingExtractor(target.name.clone()));
        }
        let call = format!("p.extract(&extracting::{})", extractor_name(&target.name));
        Ok(Fetch::fallible(call, Produced::Text))
    }

    fn call(&self, entity: EntityId) -> Result<Fetch, GenerateError> {
        if self.model.is_extractor(entity) {
            return self.extract(entity);
        }
        let target = self.model.entity(entity);
        if !self.model.has_routine(entity) {
            return Err(GenerateError::NoRecognitionRoutine(target.name.clone()));
        }
        let produced = if target.is_virtual {
            Produced::Boxed(entity)
        } else {
            Produced::Concrete(entity)
        };
        Ok(Fetch::fallible(format!("{}(p)", routine_name(&target.name)), produced))
    }

    fn sequence(&self, action: &ParseAction, actions: &[ParseAction]) -> Result<String, GenerateError> {
        self.reject_binding(action)?;
        let body = self.statements(actions)?;
        Ok(if action.is_plural {
            self.repeat(action, &body)
        } else {
            body
        })
    }

    fn alternation(
        &self,
        action: &ParseAction,
        actions: &[ParseAction],
        label: &str,
    ) -> Result<String, GenerateError> {
        self.reject_binding(action)?;
        let label = string_literal(&format!("Expected: {}", label));
        let chain = if actions.is_empty() {
            format!(
                "std::result::Result::<(), {}::ParseError>::Err(p.error({}))?;",
                self.runtime, label
            )
        } else {
            let mut chain = String::new();
            for (i, branch) in actions.iter().enumerate() {
                let attempt = self.branch(branch, &self.translate(branch)?);
                if i == 0 && attempt.starts_with('{') {
                    chain.push_str(&format!("({})", attempt));
                } else if i == 0 {
                    chain.push_str(&attempt);
                } else {
                    chain.push_str(&format!("\n.or_else(|_| {})", attempt));
                }
            }
            format!("{}\n.or_fail({})?;", chain, label)
        };
        Ok(if action.is_plural {
            self.repeat(action, &chain)
        } else {
            chain
        })
    }

    fn statements(&self, actions: &[ParseAction]) -> Result<String, GenerateError> {
        Ok(actions
            .iter()
            .map(|a| self.translate(a))
            .collect::<Result<Vec<_>, _>>()?
            .join("\n"))
    }

    fn reject_binding(&self, action: &ParseAction) -> Result<(), GenerateError> {
        match action.property {
            Some(property) => {
                let property = self.model.property(property);
                Err(GenerateError::UnassignableAction {
                    entity: self.model.entity(property.owner).name.clone(),
                    property: property.name.clone(),
                    kind: action.kind.describe(),
                })
            }
            None => Ok(()),
        }
    }

    // ── Control wraps ──

    /// Repeat-while-succeeds over whole passes of `body`.
    fn repeat(&self, action: &ParseAction, body: &str) -> String {
        let fields = self.accumulators(action);
        if fields.is_empty() {
            return format!("p.repeat(|p| {{\n{}\nOk(())\n}});", body);
        }
        format!(
            "p.repeat(|p| {{\n{}\nlet pass = p.attempt(|p| {{\n{}\nOk(())\n}});\nif pass.is_err() {{\n{}\n}}\npass\n}});",
            mark(&fields),
            body,
            truncate(&fields)
        )
    }

    /// One alternative of a try-chain. A failed branch leaves nothing behind
    /// in the fields it appended to before failing.
    fn branch(&self, action: &ParseAction, body: &str) -> String {
        let fields = self.accumulators(action);
        if fields.is_empty() {
            return format!("p.attempt(|p| {{\n{}\nOk(())\n}})", body);
        }
        format!(
            "{{\n{}\nlet branch = p.attempt(|p| {{\n{}\nOk(())\n}});\nif branch.is_err() {{\n{}\n}}\nbranch\n}}",
            mark(&fields),
            body,
            truncate(&fields)
        )
    }

    /// Recoverable block whose failure contributes nothing.
    fn optional(&self, action: &ParseAction, code: &str) -> String {
        let fields = self.accumulators(action);
        if fields.is_empty() {
            return format!("p.maybe(|p| {{\n{}\nOk(())\n}});", code);
        }
        format!(
            "{{\n{}\nif p.attempt(|p| {{\n{}\nOk(())\n}}).is_err() {{\n{}\n}}\n}}",
            mark(&fields),
            code,
            truncate(&fields)
        )
    }

    /// Fields appended to anywhere inside `action`, in first-seen order.
    fn accumulators(&self, action: &ParseAction) -> Vec<String> {
        let mut fields = Vec::new();
        action.walk(&mut |a| {
            let Some(property) = a.property else { return };
            let property = self.model.property(property);
            if a.has_plural_parent && !self.model.entity(property.owner).is_virtual {
                let field = format!("result.{}", field_ident(&property.name));
                if !fields.contains(&field) {
                    fields.push(field);
                }
            }
        });
        fields
    }

    // ── Assignment ──

    fn assign(&self, action: &ParseAction, fetch: Fetch) -> Result<String, GenerateError> {
        let Some(property) = action.property else {
            return Ok(if action.is_plural {
                format!("{};", self.many(&fetch, |value| Ok(value.to_string()))?)
            } else {
                format!("{};", fetch.value())
            });
        };
        let property = self.model.property(property);
        let owner = self.model.entity(property.owner);

        if owner.is_virtual {
            if action.is_plural || action.has_plural_parent {
                return Err(GenerateError::VirtualAccumulation {
                    entity: owner.name.clone(),
                    property: property.name.clone(),
                });
            }
            let slot = ValueType::Entity(property.owner);
            let value = self.element(property, slot, fetch.produced, &fetch.value())?;
            return Ok(format!("result = Some({});", value));
        }

        let field = format!("result.{}", field_ident(&property.name));
        let element =
            |value: &str| self.element(property, property.value, fetch.produced, value);
        match (action.is_plural, action.has_plural_parent) {
            (true, true) => {
                self.require_sequence(property)?;
                Ok(format!("{}.extend({});", field, self.many(&fetch, element)?))
            }
            (true, false) if property.is_plural => {
                Ok(format!("{} = {};", field, self.many(&fetch, element)?))
            }
            (true, false) => Err(self.plural_mismatch(
                property,
                "repeated action bound to a single-valued property",
            )),
            (false, true) => {
                self.require_sequence(property)?;
                Ok(format!("{}.push({});", field, element(&fetch.value())?))
            }
            (false, false) if property.is_sequence() => Err(self.plural_mismatch(
                property,
                "single action bound to a plural property outside any repetition",
            )),
            (false, false) => Ok(format!(
                "{} = {};",
                field,
                self.scalar(property, fetch.produced, &fetch.value())?
            )),
        }
    }

    /// `p.many(..)` collecting each converted match.
    fn many(
        &self,
        fetch: &Fetch,
        element: impl Fn(&str) -> Result<String, GenerateError>,
    ) -> Result<String, GenerateError> {
        let value = fetch.value();
        let converted = element(&value)?;
        Ok(if converted == value {
            format!("p.many(|p| {})", fetch.call)
        } else {
            format!("p.many(|p| Ok({}))", converted)
        })
    }

    fn require_sequence(&self, property: &Property) -> Result<(), GenerateError> {
        if property.is_sequence() {
            Ok(())
        } else {
            Err(self.plural_mismatch(property, "accumulating into a single-valued property"))
        }
    }

    fn plural_mismatch(&self, property: &Property, reason: &'static str) -> GenerateError {
        GenerateError::PluralMismatch {
            entity: self.model.entity(property.owner).name.clone(),
            property: property.name.clone(),
            reason,
        }
    }

    /// Convert `value` into the element type used for `target`: the type a
    /// `Vec` field holds, or a virtual result slot's boxed capability.
    fn element(
        &self,
        property: &Property,
        target: ValueType,
        produced: Produced,
        value: &str,
    ) -> Result<String, GenerateError> {
        let converted = match (target, produced) {
            (ValueType::Text, Produced::Text) => Some(value.to_string()),
            (ValueType::Boolean, Produced::Flag) => Some(value.to_string()),
            (ValueType::Entity(t), Produced::Text) if self.model.is_extractor(t) => {
                Some(value.to_string())
            }
            (ValueType::Entity(t), _) if self.model.is_extractor(t) => None,
            (ValueType::Entity(t), Produced::Concrete(e)) if !self.model.entity(t).is_virtual => {
                (e == t).then(|| value.to_string())
            }
            (ValueType::Entity(t), Produced::Concrete(e)) if self.model.satisfies(e, t) => {
                Some(format!("{BOX}::new({}) as {BOX}<dyn {}>", value, self.type_name(t)))
            }
            (ValueType::Entity(t), Produced::Boxed(e)) if e == t => Some(value.to_string()),
            (ValueType::Entity(t), Produced::Boxed(e))
                if self.model.entity(t).is_virtual && self.model.satisfies(e, t) =>
            {
                Some(format!("{} as {BOX}<dyn {}>", value, self.type_name(t)))
            }
            _ => None,
        };
        converted.ok_or_else(|| GenerateError::TypeMismatch {
            entity: self.model.entity(property.owner).name.clone(),
            property: property.name.clone(),
            expected: self.describe_type(target),
            found: self.describe_produced(produced),
        })
    }

    /// Convert `value` into a single-valued field of `property`'s type.
    fn scalar(&self, property: &Property, produced: Produced, value: &str) -> Result<String, GenerateError> {
        let element = self.element(property, property.value, produced, value)?;
        Ok(match property.value {
            ValueType::Entity(t) if self.model.is_extractor(t) => element,
            ValueType::Entity(t) if self.model.entity(t).is_virtual => format!("Some({})", element),
            ValueType::Entity(_) => format!("Some({BOX}::new({}))", element),
            ValueType::Text | ValueType::Boolean => element,
        })
    }

    fn type_name(&self, id: EntityId) -> String {
        type_ident(&self.model.entity(id).name).to_string()
    }

    fn describe_type(&self, value: ValueType) -> String {
        match value {
            ValueType::Text => "text".to_string(),
            ValueType::Boolean => "a flag".to_string(),
            ValueType::Entity(id) => format!("`{}`", self.model.entity(id).name),
        }
    }

    fn describe_produced(&self, produced: Produced) -> String {
        match produced {
            Produced::Text => "text".to_string(),
            Produced::Flag => "a flag".to_string(),
            Produced::Concrete(id) => format!("`{}`", self.model.entity(id).name),
            Produced::Boxed(id) => format!("`dyn {}`", self.model.entity(id).name),
        }
    }
}

fn mark(fields: &[String]) -> String {
    let lens: Vec<String> = fields.iter().map(|f| format!("{}.len()", f)).collect();
    format!("let mark = [{}];", lens.join(", "))
}

fn truncate(fields: &[String]) -> String {
    fields
        .iter()
        .enumerate()
        .map(|(i, f)| format!("{}.truncate(mark[{}]);", f, i))
        .collect::<Vec<_>>()
        .join("\n")
}
