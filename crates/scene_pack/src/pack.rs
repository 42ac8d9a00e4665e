//! Packer — converts a live entity forest into the packed value model.
//!
//! Packing is a read-only pre-order traversal. Every identity attached to an
//! entity is classified as a tag, a data component, or a relationship pair;
//! components go through the codec registry, pair sides are resolved to
//! portable identities (type path or entity UUID), and children recurse in
//! live iteration order.

use tracing::warn;

use scene_world::{Attachment, Entity, PairPart, Uuid, World, WorldError};

use crate::codec::CodecRegistry;
use crate::packed::{PackedComponent, PackedEntity, PackedPair, PackedScene, PackedSceneMetadata};

/// Errors from packing. Anything recoverable (missing codec, missing UUID)
/// is a diagnostic, not an error; only a broken call contract fails.
#[derive(Debug, thiserror::Error)]
pub enum PackError {
    #[error(transparent)]
    World(#[from] WorldError),
}

/// The classification of one attached identity.
///
/// A single identity with no payload is a tag; with a payload it is a data
/// component; a `(relationship, target)` edge is a pair, each side resolved
/// independently to either a component-type path or a data-entity UUID.
#[derive(Debug)]
enum Classified {
    Tag(String),
    Component {
        type_name: String,
        data: serde_json::Value,
    },
    Pair(PackedPair),
}

/// Packs live entities into portable [`PackedEntity`]/[`PackedScene`] values.
#[derive(Debug)]
pub struct Packer<'a> {
    world: &'a World,
    codecs: &'a CodecRegistry,
}

impl<'a> Packer<'a> {
    /// Create a packer over a world and its component codec registry.
    #[must_use]
    pub fn new(world: &'a World, codecs: &'a CodecRegistry) -> Self {
        Self { world, codecs }
    }

    /// Pack one live entity and its subtree.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::World`] only if `entity` (or a structural child)
    /// is not alive. A component without a registered codec is omitted with
    /// a diagnostic; the entity is still packed.
    pub fn pack_entity(&self, entity: Entity) -> Result<PackedEntity, PackError> {
        let uuid = self.world.uuid(entity)?;
        let name = self.world.name(entity)?.to_string();
        if !uuid.is_valid() {
            warn!(entity = %entity, name = %name, "packing entity without a uuid; it cannot be pair-targeted reliably");
        }

        let mut packed = PackedEntity {
            uuid,
            name,
            enabled: self.world.is_enabled(entity)?,
            ..PackedEntity::default()
        };

        for attachment in self.world.attachments(entity)? {
            match self.classify(entity, attachment) {
                Classified::Tag(type_name) => packed.tags.push(PackedComponent::tag(type_name)),
                Classified::Component { type_name, data } => {
                    match self.codecs.encode(&type_name, &data) {
                        // The document form inlines component payloads, so
                        // only JSON object output survives a round-trip;
                        // anything else is rejected here rather than being
                        // silently truncated to a tag on read.
                        Ok(json_data) => match serde_json::from_str::<serde_json::Value>(&json_data)
                        {
                            Ok(serde_json::Value::Object(_)) => packed
                                .components
                                .push(PackedComponent::new(type_name, json_data)),
                            _ => {
                                warn!(
                                    entity = %entity,
                                    type_name = %type_name,
                                    "codec produced a non-object payload; component omitted from pack"
                                );
                            }
                        },
                        Err(error) => {
                            // Non-fatal: the component is omitted, the
                            // entity is still packed.
                            warn!(entity = %entity, %error, "component omitted from pack");
                        }
                    }
                }
                Classified::Pair(pair) => packed.pairs.push(pair),
            }
        }

        for &child in self.world.children(entity)? {
            packed.children.push(self.pack_entity(child)?);
        }

        Ok(packed)
    }

    /// Pack a forest of root entities into a scene.
    ///
    /// The scene gets a fresh UUID and engine-version metadata; name, author
    /// and the external dependency list are the caller's to fill in on the
    /// returned value.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::World`] if any root is not alive.
    pub fn pack_scene(&self, roots: &[Entity]) -> Result<PackedScene, PackError> {
        let mut scene = PackedScene {
            uuid: Uuid::generate(),
            metadata: PackedSceneMetadata {
                engine_version: env!("CARGO_PKG_VERSION").to_string(),
                ..PackedSceneMetadata::default()
            },
            ..PackedScene::default()
        };
        for &root in roots {
            scene.entities.push(self.pack_entity(root)?);
        }
        Ok(scene)
    }

    fn classify(&self, owner: Entity, attachment: Attachment) -> Classified {
        match attachment {
            Attachment::Single {
                type_name,
                data: None,
            } => Classified::Tag(type_name),
            Attachment::Single {
                type_name,
                data: Some(data),
            } => Classified::Component { type_name, data },
            Attachment::Pair {
                relationship,
                target,
                data,
            } => {
                let mut pair = PackedPair::default();
                self.pack_side(
                    owner,
                    &relationship,
                    &mut pair.relationship_name,
                    &mut pair.relationship_uuid,
                    &mut pair.relationship_is_component,
                    &mut pair.relationship_path,
                );
                self.pack_side(
                    owner,
                    &target,
                    &mut pair.target_name,
                    &mut pair.target_uuid,
                    &mut pair.target_is_component,
                    &mut pair.target_path,
                );
                if let Some(value) = data {
                    pair.json_data = value.to_string();
                }
                Classified::Pair(pair)
            }
        }
    }

    /// Resolve one side of a pair to its portable identity: a type's stable
    /// path, or a data entity's UUID. The two sides collide at the
    /// raw-handle level but not at the portable level, which is why each is
    /// classified on its own.
    fn pack_side(
        &self,
        owner: Entity,
        part: &PairPart,
        name: &mut String,
        uuid: &mut Uuid,
        is_component: &mut bool,
        path: &mut String,
    ) {
        match part {
            PairPart::Type(type_name) => {
                *name = type_name.clone();
                *is_component = true;
                *path = type_name.clone();
            }
            PairPart::Entity(target) => {
                *name = self.world.name(*target).unwrap_or_default().to_string();
                *is_component = false;
                *uuid = self.world.uuid(*target).unwrap_or(Uuid::INVALID);
                if !uuid.is_valid() {
                    warn!(
                        entity = %owner,
                        target = %target,
                        "pair targets an entity without a uuid; the edge will not resolve on load"
                    );
                }
            }
        }
    }
}
