//! Grammar model consumed by the emitters.
//!
//! The model is an arena: entities live in `Model::entities` and refer to each
//! other through `EntityId` indices, so the entity graph (supers, property
//! types, references inside action trees) may contain cycles without any
//! shared ownership. It is built once, either programmatically or through
//! [`spec::ModelSpec`], and only read afterwards.

pub mod spec;

/// Index of an entity in `Model::entities`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub usize);

/// A property addressed by its owning entity and position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PropertyRef {
    pub entity: EntityId,
    pub index: usize,
}

/// Type of the value a property holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// `<string>`
    Text,
    /// `<bool>`
    Boolean,
    Entity(EntityId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    pub owner: EntityId,
    pub value: ValueType,
    pub is_plural: bool,
    /// Lives inside a repeating structure one level up: accumulated, never overwritten.
    pub has_plural_parent: bool,
}

impl Property {
    pub fn new(name: impl Into<String>, owner: EntityId, value: ValueType) -> Self {
        Property {
            name: name.into(),
            owner,
            value,
            is_plural: false,
            has_plural_parent: false,
        }
    }

    pub fn plural(mut self) -> Self {
        self.is_plural = true;
        self
    }

    pub fn plural_parent(mut self) -> Self {
        self.has_plural_parent = true;
        self
    }

    /// Whether the generated field is a `Vec`.
    pub fn is_sequence(&self) -> bool {
        self.is_plural || self.has_plural_parent
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionKind {
    Literal(String),
    /// Match with the extractor of `entity`; `pattern` is that extractor's source.
    Pattern { entity: EntityId, pattern: String },
    Reference(EntityId),
    Sequence(Vec<ParseAction>),
    Alternation { actions: Vec<ParseAction>, label: String },
}

impl ActionKind {
    pub fn describe(&self) -> &'static str {
        match self {
            ActionKind::Literal(_) => "literal",
            ActionKind::Pattern { .. } => "pattern",
            ActionKind::Reference(_) => "reference",
            ActionKind::Sequence(_) => "sequence",
            ActionKind::Alternation { .. } => "alternation",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseAction {
    pub kind: ActionKind,
    pub is_optional: bool,
    pub is_plural: bool,
    pub has_plural_parent: bool,
    /// Where the produced value is written.
    pub property: Option<PropertyRef>,
}

impl ParseAction {
    pub fn new(kind: ActionKind) -> Self {
        ParseAction {
            kind,
            is_optional: false,
            is_plural: false,
            has_plural_parent: false,
            property: None,
        }
    }

    pub fn literal(text: impl Into<String>) -> Self {
        Self::new(ActionKind::Literal(text.into()))
    }

    pub fn reference(entity: EntityId) -> Self {
        Self::new(ActionKind::Reference(entity))
    }

    pub fn pattern(entity: EntityId, pattern: impl Into<String>) -> Self {
        Self::new(ActionKind::Pattern {
            entity,
            pattern: pattern.into(),
        })
    }

    pub fn sequence(actions: Vec<ParseAction>) -> Self {
        Self::new(ActionKind::Sequence(actions))
    }

    pub fn alternation(actions: Vec<ParseAction>, label: impl Into<String>) -> Self {
        Self::new(ActionKind::Alternation {
            actions,
            label: label.into(),
        })
    }

    pub fn optional(mut self) -> Self {
        self.is_optional = true;
        self
    }

    pub fn plural(mut self) -> Self {
        self.is_plural = true;
        self
    }

    pub fn plural_parent(mut self) -> Self {
        self.has_plural_parent = true;
        self
    }

    pub fn bind(mut self, property: PropertyRef) -> Self {
        self.property = Some(property);
        self
    }

    /// Pre-order walk over this action and all nested actions.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a ParseAction)) {
        visit(self);
        match &self.kind {
            ActionKind::Sequence(actions) | ActionKind::Alternation { actions, .. } => {
                for action in actions {
                    action.walk(visit);
                }
            }
            ActionKind::Literal(_) | ActionKind::Pattern { .. } | ActionKind::Reference(_) => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub name: String,
    pub is_virtual: bool,
    /// Direct supers in declaration order; only virtual ones become capabilities.
    pub supers: Vec<EntityId>,
    pub properties: Vec<Property>,
    /// Absent only for pure dispatch types.
    pub action: Option<ParseAction>,
    /// Source rule text, used for annotations.
    pub rule: Option<String>,
}

impl Entity {
    pub fn new(name: impl Into<String>) -> Self {
        Entity {
            name: name.into(),
            is_virtual: false,
            supers: Vec::new(),
            properties: Vec::new(),
            action: None,
            rule: None,
        }
    }

    pub fn virtual_(mut self) -> Self {
        self.is_virtual = true;
        self
    }

    pub fn with_supers(mut self, supers: Vec<EntityId>) -> Self {
        self.supers = supers;
        self
    }

    pub fn with_properties(mut self, properties: Vec<Property>) -> Self {
        self.properties = properties;
        self
    }

    pub fn with_action(mut self, action: ParseAction) -> Self {
        self.action = Some(action);
        self
    }

    /// The pattern when this entity is recognized by a `Pattern` root action.
    pub fn pattern(&self) -> Option<&str> {
        match self.action.as_ref().map(|a| &a.kind) {
            Some(ActionKind::Pattern { pattern, .. }) => Some(pattern),
            _ => None,
        }
    }

    pub fn is_skip(&self) -> bool {
        self.name == SKIP_ENTITY
    }
}

/// Name of the entity whose pattern replaces default whitespace skipping.
pub const SKIP_ENTITY: &str = "_";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    pub root: EntityId,
    /// Declaration order is emission order.
    pub entities: Vec<Entity>,
}

impl Model {
    pub fn new(root: EntityId, entities: Vec<Entity>) -> Self {
        Model { root, entities }
    }

    pub fn entity(&self, id: EntityId) -> &Entity {
        &self.entities[id.0]
    }

    pub fn root(&self) -> &Entity {
        self.entity(self.root)
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.entities.iter().enumerate().map(|(i, e)| (EntityId(i), e))
    }

    pub fn get(&self, name: &str) -> Option<EntityId> {
        self.entities.iter().position(|e| e.name == name).map(EntityId)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn property(&self, property: PropertyRef) -> &Property {
        &self.entity(property.entity).properties[property.index]
    }

    /// Virtual entity recognized purely by its pattern: consumed through the
    /// extraction table, never through a routine.
    pub fn is_extractor(&self, id: EntityId) -> bool {
        let entity = self.entity(id);
        entity.is_virtual && entity.pattern().is_some()
    }

    /// Whether `id` gets a recognition routine.
    pub fn has_routine(&self, id: EntityId) -> bool {
        let entity = self.entity(id);
        !entity.is_skip() && !self.is_extractor(id) && entity.action.is_some()
    }

    /// Pattern of the `_` entity, if the grammar defines one.
    pub fn skip_pattern(&self) -> Option<&str> {
        self.get(SKIP_ENTITY).and_then(|id| self.entity(id).pattern())
    }

    /// Virtual supers of `id`, transitively through virtual supers, in
    /// first-seen order without duplicates.
    pub fn virtual_supers_closure(&self, id: EntityId) -> Vec<EntityId> {
        let mut closure = Vec::new();
        let mut pending: Vec<EntityId> = self.entity(id).supers.iter().rev().copied().collect();
        while let Some(next) = pending.pop() {
            if next == id || closure.contains(&next) || !self.entity(next).is_virtual {
                continue;
            }
            closure.push(next);
            pending.extend(self.entity(next).supers.iter().rev().copied());
        }
        closure
    }

    /// Whether a value of entity `from` can be held where `to` is expected.
    pub fn satisfies(&self, from: EntityId, to: EntityId) -> bool {
        from == to || self.virtual_supers_closure(from).contains(&to)
    }

    /// Entities listing `id` among their direct supers.
    pub fn subtypes(&self, id: EntityId) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.iter().filter(move |(_, e)| e.supers.contains(&id))
    }
}
