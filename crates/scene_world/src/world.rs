//! Live entity-component world.
//!
//! Component types are registered by name (not Rust types), so payloads are
//! stored as `serde_json::Value` keyed by type name. This is the world the
//! packer reads from and the reconstructor writes into; it provides the full
//! capability surface the packing engine consumes:
//!
//! - entity lifecycle with names and enabled flags,
//! - component / tag attach, query and removal,
//! - typed relationship pairs between handles and type identities,
//! - structural parent/child edges with ordered children,
//! - attachment enumeration for classification,
//! - name and [`Uuid`] lookup.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde_json::Value;
use thiserror::Error;

use crate::entity::{Entity, EntityAllocator};
use crate::uuid::Uuid;

/// Errors from world operations.
#[derive(Debug, Error)]
pub enum WorldError {
    #[error("entity {0} not found")]
    EntityNotFound(Entity),
    #[error("an entity named '{0}' already exists in this world")]
    DuplicateName(String),
    #[error("unknown type: {0}")]
    UnknownType(String),
    #[error("'{0}' is a tag, not a data component")]
    NotAComponent(String),
    #[error("'{0}' is a data component, not a tag")]
    NotATag(String),
    #[error("component '{0}' not found on {1}")]
    ComponentNotFound(String, Entity),
    #[error("{0} cannot be its own parent")]
    SelfParent(Entity),
}

/// A registered type identity. The name doubles as the type's stable path,
/// valid across worlds (unlike entity handles).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo {
    /// Registered type name, e.g. `"Position"`.
    pub name: String,
    /// Tags carry no payload; data components carry a JSON object.
    pub is_tag: bool,
}

/// One side of a relationship pair.
///
/// Relationship and target are drawn from different identity spaces: a side
/// is either a component/tag *type* (stable across worlds, identified by its
/// registered name) or a *data entity* (identified by a world-local handle).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairPart {
    /// A component or tag type identity.
    Type(String),
    /// A live data entity.
    Entity(Entity),
}

/// A relationship edge `(relationship, target)` attached to an entity,
/// optionally carrying its own payload (e.g. a weighted edge).
#[derive(Debug, Clone, PartialEq)]
pub struct PairRecord {
    pub relationship: PairPart,
    pub target: PairPart,
    pub data: Option<Value>,
}

/// One identity attached to an entity, as reported by
/// [`World::attachments`]. This is what the packer's classifier consumes.
#[derive(Debug, Clone, PartialEq)]
pub enum Attachment {
    /// A single (non-pair) identity: a tag when `data` is `None`, a data
    /// component otherwise.
    Single {
        type_name: String,
        data: Option<Value>,
    },
    /// A relationship pair.
    Pair {
        relationship: PairPart,
        target: PairPart,
        data: Option<Value>,
    },
}

/// A single entity's record.
#[derive(Debug)]
struct EntityData {
    name: String,
    enabled: bool,
    uuid: Uuid,
    parent: Entity,
    children: Vec<Entity>,
    tags: BTreeSet<String>,
    components: BTreeMap<String, Value>,
    pairs: Vec<PairRecord>,
}

impl EntityData {
    fn new(name: String) -> Self {
        Self {
            name,
            enabled: true,
            uuid: Uuid::INVALID,
            parent: Entity::INVALID,
            children: Vec::new(),
            tags: BTreeSet::new(),
            components: BTreeMap::new(),
            pairs: Vec::new(),
        }
    }
}

/// The live world: entity storage, a type registry, and the relationship
/// graph.
#[derive(Debug, Default)]
pub struct World {
    allocator: EntityAllocator,
    types: HashMap<String, TypeInfo>,
    entities: HashMap<Entity, EntityData>,
    /// Index of non-empty entity names. Names are unique per world; two
    /// distinct entities are never silently merged under one name.
    names: HashMap<String, Entity>,
}

impl World {
    /// Create a new empty world.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -- Type registry --

    /// Register a data component type by name. Idempotent.
    pub fn register_component(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.types.entry(name.clone()).or_insert(TypeInfo {
            name,
            is_tag: false,
        });
    }

    /// Register a tag type (zero payload) by name. Idempotent.
    pub fn register_tag(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.types.entry(name.clone()).or_insert(TypeInfo {
            name,
            is_tag: true,
        });
    }

    /// Resolve a type name to its registered identity.
    #[must_use]
    pub fn resolve_type(&self, name: &str) -> Option<&TypeInfo> {
        self.types.get(name)
    }

    // -- Entity lifecycle --

    /// Create an entity with the given name (empty for unnamed).
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DuplicateName`] if a non-empty name is already
    /// taken in this world.
    pub fn spawn(&mut self, name: &str) -> Result<Entity, WorldError> {
        if !name.is_empty() && self.names.contains_key(name) {
            return Err(WorldError::DuplicateName(name.to_string()));
        }
        let entity = self.allocator.allocate();
        self.entities.insert(entity, EntityData::new(name.to_string()));
        if !name.is_empty() {
            self.names.insert(name.to_string(), entity);
        }
        Ok(entity)
    }

    /// Destroy an entity. Its children are detached (not destroyed) and any
    /// pair on another entity referencing it is dropped.
    pub fn despawn(&mut self, entity: Entity) -> Result<(), WorldError> {
        let data = self
            .entities
            .remove(&entity)
            .ok_or(WorldError::EntityNotFound(entity))?;
        if !data.name.is_empty() {
            self.names.remove(&data.name);
        }
        if let Some(parent) = self.entities.get_mut(&data.parent) {
            parent.children.retain(|&c| c != entity);
        }
        for child in data.children {
            if let Some(c) = self.entities.get_mut(&child) {
                c.parent = Entity::INVALID;
            }
        }
        for other in self.entities.values_mut() {
            other.pairs.retain(|pair| {
                pair.relationship != PairPart::Entity(entity)
                    && pair.target != PairPart::Entity(entity)
            });
        }
        Ok(())
    }

    /// Check if an entity exists.
    #[must_use]
    pub fn exists(&self, entity: Entity) -> bool {
        self.entities.contains_key(&entity)
    }

    /// Returns the number of live entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Look up an entity by name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Entity> {
        self.names.get(name).copied()
    }

    /// Find the entity carrying the given stable identifier, if any.
    #[must_use]
    pub fn find_by_uuid(&self, uuid: Uuid) -> Option<Entity> {
        if !uuid.is_valid() {
            return None;
        }
        self.entities
            .iter()
            .find(|(_, data)| data.uuid == uuid)
            .map(|(&e, _)| e)
    }

    // -- Per-entity fields --

    /// Returns the entity's name (empty for unnamed).
    pub fn name(&self, entity: Entity) -> Result<&str, WorldError> {
        Ok(&self.data(entity)?.name)
    }

    pub fn set_enabled(&mut self, entity: Entity, enabled: bool) -> Result<(), WorldError> {
        self.data_mut(entity)?.enabled = enabled;
        Ok(())
    }

    pub fn is_enabled(&self, entity: Entity) -> Result<bool, WorldError> {
        Ok(self.data(entity)?.enabled)
    }

    /// Returns the entity's stable identifier ([`Uuid::INVALID`] if none was
    /// assigned).
    pub fn uuid(&self, entity: Entity) -> Result<Uuid, WorldError> {
        Ok(self.data(entity)?.uuid)
    }

    pub fn set_uuid(&mut self, entity: Entity, uuid: Uuid) -> Result<(), WorldError> {
        self.data_mut(entity)?.uuid = uuid;
        Ok(())
    }

    /// Assign a fresh random identifier and return it.
    pub fn assign_uuid(&mut self, entity: Entity) -> Result<Uuid, WorldError> {
        let uuid = Uuid::generate();
        self.data_mut(entity)?.uuid = uuid;
        Ok(uuid)
    }

    // -- Hierarchy --

    /// Re-parent `child` under `parent`. Pass [`Entity::INVALID`] as the
    /// parent to detach. The child is appended to the parent's child list.
    pub fn set_parent(&mut self, child: Entity, parent: Entity) -> Result<(), WorldError> {
        if child == parent {
            return Err(WorldError::SelfParent(child));
        }
        if !self.exists(child) {
            return Err(WorldError::EntityNotFound(child));
        }
        if parent.is_valid() && !self.exists(parent) {
            return Err(WorldError::EntityNotFound(parent));
        }
        let old_parent = self.data(child)?.parent;
        if let Some(old) = self.entities.get_mut(&old_parent) {
            old.children.retain(|&c| c != child);
        }
        self.data_mut(child)?.parent = parent;
        if parent.is_valid() {
            self.data_mut(parent)?.children.push(child);
        }
        Ok(())
    }

    /// Returns the entity's parent ([`Entity::INVALID`] for roots).
    pub fn parent(&self, entity: Entity) -> Result<Entity, WorldError> {
        Ok(self.data(entity)?.parent)
    }

    /// Returns the entity's children in attachment order.
    pub fn children(&self, entity: Entity) -> Result<&[Entity], WorldError> {
        Ok(&self.data(entity)?.children)
    }

    // -- Components and tags --

    /// Set a data component on an entity.
    ///
    /// # Errors
    ///
    /// The type must be registered as a data component.
    pub fn set_component(
        &mut self,
        entity: Entity,
        type_name: &str,
        value: Value,
    ) -> Result<(), WorldError> {
        match self.types.get(type_name) {
            None => return Err(WorldError::UnknownType(type_name.to_string())),
            Some(info) if info.is_tag => {
                return Err(WorldError::NotAComponent(type_name.to_string()));
            }
            Some(_) => {}
        }
        self.data_mut(entity)?
            .components
            .insert(type_name.to_string(), value);
        Ok(())
    }

    /// Get a component value from an entity.
    pub fn get_component(&self, entity: Entity, type_name: &str) -> Result<&Value, WorldError> {
        self.data(entity)?
            .components
            .get(type_name)
            .ok_or_else(|| WorldError::ComponentNotFound(type_name.to_string(), entity))
    }

    #[must_use]
    pub fn has_component(&self, entity: Entity, type_name: &str) -> bool {
        self.data(entity)
            .map(|d| d.components.contains_key(type_name))
            .unwrap_or(false)
    }

    pub fn remove_component(&mut self, entity: Entity, type_name: &str) -> Result<(), WorldError> {
        if self.data_mut(entity)?.components.remove(type_name).is_none() {
            return Err(WorldError::ComponentNotFound(type_name.to_string(), entity));
        }
        Ok(())
    }

    /// Attach a tag (zero-payload identity) to an entity.
    ///
    /// # Errors
    ///
    /// The type must be registered as a tag.
    pub fn add_tag(&mut self, entity: Entity, type_name: &str) -> Result<(), WorldError> {
        match self.types.get(type_name) {
            None => return Err(WorldError::UnknownType(type_name.to_string())),
            Some(info) if !info.is_tag => {
                return Err(WorldError::NotATag(type_name.to_string()));
            }
            Some(_) => {}
        }
        self.data_mut(entity)?.tags.insert(type_name.to_string());
        Ok(())
    }

    #[must_use]
    pub fn has_tag(&self, entity: Entity, type_name: &str) -> bool {
        self.data(entity)
            .map(|d| d.tags.contains(type_name))
            .unwrap_or(false)
    }

    pub fn remove_tag(&mut self, entity: Entity, type_name: &str) -> Result<(), WorldError> {
        self.data_mut(entity)?.tags.remove(type_name);
        Ok(())
    }

    // -- Relationship pairs --

    /// Attach a relationship pair. Each side is validated: a type side must
    /// be registered, an entity side must be live. Self-referential pairs
    /// (target == owner) are allowed.
    pub fn add_pair(
        &mut self,
        entity: Entity,
        relationship: PairPart,
        target: PairPart,
        data: Option<Value>,
    ) -> Result<(), WorldError> {
        self.check_pair_part(&relationship)?;
        self.check_pair_part(&target)?;
        self.data_mut(entity)?.pairs.push(PairRecord {
            relationship,
            target,
            data,
        });
        Ok(())
    }

    /// Convenience: attach a `(relationship-type, target-entity)` pair with
    /// no payload — the common relationship shape.
    pub fn relate(
        &mut self,
        entity: Entity,
        relationship: &str,
        target: Entity,
    ) -> Result<(), WorldError> {
        self.add_pair(
            entity,
            PairPart::Type(relationship.to_string()),
            PairPart::Entity(target),
            None,
        )
    }

    #[must_use]
    pub fn has_pair(&self, entity: Entity, relationship: &PairPart, target: &PairPart) -> bool {
        self.data(entity)
            .map(|d| {
                d.pairs
                    .iter()
                    .any(|p| &p.relationship == relationship && &p.target == target)
            })
            .unwrap_or(false)
    }

    /// Returns all pairs attached to an entity, in attachment order.
    pub fn pairs(&self, entity: Entity) -> Result<&[PairRecord], WorldError> {
        Ok(&self.data(entity)?.pairs)
    }

    // -- Introspection --

    /// Enumerate every identity attached to an entity: tags and components
    /// first (in name order), then pairs in attachment order.
    pub fn attachments(&self, entity: Entity) -> Result<Vec<Attachment>, WorldError> {
        let data = self.data(entity)?;
        let mut out = Vec::with_capacity(data.tags.len() + data.components.len() + data.pairs.len());
        for tag in &data.tags {
            out.push(Attachment::Single {
                type_name: tag.clone(),
                data: None,
            });
        }
        for (name, value) in &data.components {
            out.push(Attachment::Single {
                type_name: name.clone(),
                data: Some(value.clone()),
            });
        }
        for pair in &data.pairs {
            out.push(Attachment::Pair {
                relationship: pair.relationship.clone(),
                target: pair.target.clone(),
                data: pair.data.clone(),
            });
        }
        Ok(out)
    }

    // -- Internals --

    fn data(&self, entity: Entity) -> Result<&EntityData, WorldError> {
        self.entities
            .get(&entity)
            .ok_or(WorldError::EntityNotFound(entity))
    }

    fn data_mut(&mut self, entity: Entity) -> Result<&mut EntityData, WorldError> {
        self.entities
            .get_mut(&entity)
            .ok_or(WorldError::EntityNotFound(entity))
    }

    fn check_pair_part(&self, part: &PairPart) -> Result<(), WorldError> {
        match part {
            PairPart::Type(name) => {
                if !self.types.contains_key(name) {
                    return Err(WorldError::UnknownType(name.clone()));
                }
            }
            PairPart::Entity(e) => {
                if !self.exists(*e) {
                    return Err(WorldError::EntityNotFound(*e));
                }
            }
        }
        Ok(())
    }
}
