//! The packed value model — the portable, pointer-free representation of an
//! entity forest.
//!
//! These are immutable value objects: created fresh by the packer, consumed
//! fully by the reconstructor. They own no live-world resources. Every
//! cross-reference is carried as a stable [`Uuid`] or a type path, never as a
//! live handle.
//!
//! Document field names and defaults live here as serde attributes; the
//! [`document`](crate::document) module provides the text-level adapters.

use serde::{Deserialize, Serialize};

use scene_world::Uuid;

/// A serialized component or tag.
///
/// `json_data` holds the component's full JSON object text, including its
/// `type` member. A tag is a `PackedComponent` with empty `json_data` — the
/// type name is its entire payload.
///
/// An unrecognised `type_name` is preserved verbatim through a round-trip
/// but cannot be instantiated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PackedComponent {
    pub type_name: String,
    pub json_data: String,
}

impl PackedComponent {
    /// A data component with its serialized payload.
    #[must_use]
    pub fn new(type_name: impl Into<String>, json_data: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            json_data: json_data.into(),
        }
    }

    /// A tag: identity only, no payload.
    #[must_use]
    pub fn tag(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            json_data: String::new(),
        }
    }

    /// Returns `true` if this packed identity carries no payload.
    #[must_use]
    pub fn is_tag(&self) -> bool {
        self.json_data.is_empty()
    }
}

/// One relationship edge `(relationship, target)`.
///
/// Either side resolves to a data-entity instance (by `*_uuid`, meaningful
/// only within the packed graph it travels with) or to a component/tag type
/// (by `*_path`, stable across worlds). `*_is_component` selects which
/// resolution rule applies; the two sides are classified independently.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackedPair {
    #[serde(rename = "relationship")]
    pub relationship_name: String,
    #[serde(rename = "relationshipUUID")]
    pub relationship_uuid: Uuid,
    #[serde(rename = "relationshipIsComponent")]
    pub relationship_is_component: bool,
    #[serde(rename = "relationshipPath", skip_serializing_if = "String::is_empty")]
    pub relationship_path: String,
    #[serde(rename = "target")]
    pub target_name: String,
    #[serde(rename = "targetUUID")]
    pub target_uuid: Uuid,
    #[serde(rename = "targetIsComponent")]
    pub target_is_component: bool,
    #[serde(rename = "targetPath", skip_serializing_if = "String::is_empty")]
    pub target_path: String,
    /// Optional payload attached to the edge itself (e.g. a weight).
    #[serde(
        rename = "data",
        with = "crate::document::json_text",
        skip_serializing_if = "String::is_empty"
    )]
    pub json_data: String,
}

/// A node in a packed entity tree.
///
/// `children` encodes the parent/child relationship structurally, but
/// `pairs` may reference *any* UUID in the enclosing [`PackedScene`] —
/// ancestors, siblings, or entities in unrelated subtrees. Reconstruction is
/// therefore a graph problem, not a tree problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackedEntity {
    pub uuid: Uuid,
    pub name: String,
    pub enabled: bool,
    pub tags: Vec<PackedComponent>,
    pub pairs: Vec<PackedPair>,
    pub components: Vec<PackedComponent>,
    pub children: Vec<PackedEntity>,
}

impl Default for PackedEntity {
    fn default() -> Self {
        Self {
            uuid: Uuid::INVALID,
            name: String::new(),
            // An entity with no `enabled` field in the document is active.
            enabled: true,
            tags: Vec::new(),
            pairs: Vec::new(),
            components: Vec::new(),
            children: Vec::new(),
        }
    }
}

/// A forward reference to an entity, scene or asset that is not present in
/// this document. A pair may target such a UUID; the reconstructor defers
/// it instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackedExternalDependency {
    pub uuid: Uuid,
    #[serde(rename = "type")]
    pub ty: String,
}

/// Free-form scene provenance. No structural role.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PackedSceneMetadata {
    pub editor_version: String,
    pub engine_version: String,
    pub last_modified: String,
    pub author: String,
}

/// A complete packed scene: a forest of [`PackedEntity`] trees plus the
/// external dependency list. This is the unit of pack/load; pair resolution
/// scope is the *entire* `entities` forest, not a single tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackedScene {
    #[serde(rename = "sceneUUID")]
    pub uuid: Uuid,
    #[serde(rename = "sceneName")]
    pub name: String,
    pub metadata: PackedSceneMetadata,
    #[serde(rename = "externalDependencies")]
    pub external_dependencies: Vec<PackedExternalDependency>,
    pub entities: Vec<PackedEntity>,
}
