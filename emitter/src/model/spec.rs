//! JSON interchange form of the grammar model.
//!
//! Everything is referenced by name; [`ModelSpec::resolve`] turns names into
//! arena indices and reports dangling references. A property `type` is
//! `"<string>"`, `"<bool>"` or an entity name. An action is an object with
//! exactly one kind key plus modifier flags:
//!
//! ```json
//! { "sequence": [
//!     { "reference": "Identifier", "property": "name" },
//!     { "literal": "=" },
//!     { "reference": "Expression", "property": "value", "optional": true }
//! ] }
//! ```
//!
//! `property` names resolve against the entity whose action tree contains
//! the action. A bound action inherits `plural_parent` from its property.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{ActionKind, Entity, EntityId, Model, ParseAction, Property, PropertyRef, ValueType};

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("malformed model: {0}")]
    Syntax(#[from] serde_json::Error),
    #[error("unknown entity `{name}` referenced from `{from}`")]
    UnknownEntity { name: String, from: String },
    #[error("entity `{entity}` has no property `{property}`")]
    UnknownProperty { entity: String, property: String },
    #[error("entity `{0}` is declared more than once")]
    DuplicateEntity(String),
    #[error("root entity `{0}` is not declared")]
    UnknownRoot(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelSpec {
    pub root: String,
    pub entities: Vec<EntitySpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntitySpec {
    pub name: String,
    #[serde(default, rename = "virtual")]
    pub is_virtual: bool,
    #[serde(default)]
    pub supers: Vec<String>,
    #[serde(default)]
    pub properties: Vec<PropertySpec>,
    #[serde(default)]
    pub action: Option<ActionSpec>,
    #[serde(default)]
    pub rule: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertySpec {
    pub name: String,
    #[serde(rename = "type")]
    pub value_type: String,
    #[serde(default)]
    pub plural: bool,
    #[serde(default)]
    pub plural_parent: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSpec {
    #[serde(flatten)]
    pub kind: ActionKindSpec,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub plural: bool,
    #[serde(default)]
    pub plural_parent: bool,
    #[serde(default)]
    pub property: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKindSpec {
    Literal(String),
    /// Pattern of the enclosing entity.
    Pattern(String),
    Reference(String),
    Sequence(Vec<ActionSpec>),
    Alternation { label: String, actions: Vec<ActionSpec> },
}

pub const TEXT_TYPE: &str = "<string>";
pub const BOOL_TYPE: &str = "<bool>";

impl ModelSpec {
    pub fn from_json(text: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn resolve(&self) -> Result<Model, ModelError> {
        let mut ids: Vec<&str> = Vec::with_capacity(self.entities.len());
        for entity in &self.entities {
            if ids.contains(&entity.name.as_str()) {
                return Err(ModelError::DuplicateEntity(entity.name.clone()));
            }
            ids.push(&entity.name);
        }
        let lookup = |name: &str, from: &str| -> Result<EntityId, ModelError> {
            ids.iter()
                .position(|n| *n == name)
                .map(EntityId)
                .ok_or_else(|| ModelError::UnknownEntity {
                    name: name.to_string(),
                    from: from.to_string(),
                })
        };
        let root = ids
            .iter()
            .position(|n| *n == self.root)
            .map(EntityId)
            .ok_or_else(|| ModelError::UnknownRoot(self.root.clone()))?;

        // Properties first: actions bind to them by index.
        let mut entities = Vec::with_capacity(self.entities.len());
        for (index, spec) in self.entities.iter().enumerate() {
            let owner = EntityId(index);
            let supers = spec
                .supers
                .iter()
                .map(|s| lookup(s, &spec.name))
                .collect::<Result<Vec<_>, _>>()?;
            let properties = spec
                .properties
                .iter()
                .map(|p| {
                    let value = match p.value_type.as_str() {
                        TEXT_TYPE => ValueType::Text,
                        BOOL_TYPE => ValueType::Boolean,
                        name => ValueType::Entity(lookup(name, &spec.name)?),
                    };
                    Ok(Property {
                        name: p.name.clone(),
                        owner,
                        value,
                        is_plural: p.plural,
                        has_plural_parent: p.plural_parent,
                    })
                })
                .collect::<Result<Vec<_>, ModelError>>()?;
            entities.push(Entity {
                name: spec.name.clone(),
                is_virtual: spec.is_virtual,
                supers,
                properties,
                action: None,
                rule: spec.rule.clone(),
            });
        }

        for (index, spec) in self.entities.iter().enumerate() {
            if let Some(action) = &spec.action {
                let resolver = ActionResolver {
                    owner: EntityId(index),
                    entities: &entities,
                    lookup: &lookup,
                };
                let action = resolver.resolve(action)?;
                entities[index].action = Some(action);
            }
        }

        Ok(Model::new(root, entities))
    }
}

struct ActionResolver<'a, F> {
    owner: EntityId,
    entities: &'a [Entity],
    lookup: &'a F,
}

impl<F> ActionResolver<'_, F>
where
    F: Fn(&str, &str) -> Result<EntityId, ModelError>,
{
    fn owner_name(&self) -> &str {
        &self.entities[self.owner.0].name
    }

    fn resolve(&self, spec: &ActionSpec) -> Result<ParseAction, ModelError> {
        let kind = match &spec.kind {
            ActionKindSpec::Literal(text) => ActionKind::Literal(text.clone()),
            ActionKindSpec::Pattern(pattern) => ActionKind::Pattern {
                entity: self.owner,
                pattern: pattern.clone(),
            },
            ActionKindSpec::Reference(name) => {
                ActionKind::Reference((self.lookup)(name, self.owner_name())?)
            }
            ActionKindSpec::Sequence(actions) => ActionKind::Sequence(
                actions.iter().map(|a| self.resolve(a)).collect::<Result<_, _>>()?,
            ),
            ActionKindSpec::Alternation { label, actions } => ActionKind::Alternation {
                actions: actions.iter().map(|a| self.resolve(a)).collect::<Result<_, _>>()?,
                label: label.clone(),
            },
        };

        let mut action = ParseAction {
            kind,
            is_optional: spec.optional,
            is_plural: spec.plural,
            has_plural_parent: spec.plural_parent,
            property: None,
        };
        if let Some(name) = &spec.property {
            let owner = &self.entities[self.owner.0];
            let index = owner
                .properties
                .iter()
                .position(|p| &p.name == name)
                .ok_or_else(|| ModelError::UnknownProperty {
                    entity: owner.name.clone(),
                    property: name.clone(),
                })?;
            action.has_plural_parent |= owner.properties[index].has_plural_parent;
            action.property = Some(PropertyRef {
                entity: self.owner,
                index,
            });
        }
        Ok(action)
    }
}

impl Model {
    /// Parse and resolve a JSON model.
    pub fn from_json(text: &str) -> Result<Model, ModelError> {
        ModelSpec::from_json(text)?.resolve()
    }
}
