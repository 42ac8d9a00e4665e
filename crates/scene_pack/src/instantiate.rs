//! Reconstructor — builds a live, fully-wired entity forest from a packed
//! scene.
//!
//! A packed pair may target a UUID that appears *later* in traversal order:
//! a sibling not yet created, a descendant, or an entity in a different root
//! tree. A single create-and-wire pass would fail or dangle depending on
//! declaration order, so reconstruction is strictly two-phase:
//!
//! - **Phase 1 — allocate.** Walk the full forest pre-order and create a
//!   live entity for every node, recording `packed UUID -> live handle` in
//!   the allocation map. Nothing is linked yet.
//! - **Phase 2 — link.** Walk again in the same order and attach parent/
//!   child edges, tags, components, and pairs. Every in-forest UUID is now
//!   a pure map lookup — resolution never fails due to ordering, only due
//!   to the UUID genuinely not being in this scene.
//!
//! Recoverable conditions (unknown type, missing codec, unresolvable
//! target) are reported through `tracing` and skipped; the owning entity is
//! still fully constructed. Pairs targeting a declared external dependency
//! are carried in [`SceneInstance::deferred`] for a later cross-scene
//! resolution pass.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use scene_world::{Entity, PairPart, Uuid, World, WorldError};

use crate::codec::CodecRegistry;
use crate::packed::{PackedEntity, PackedPair, PackedScene};

/// A pair that could not be resolved inside the scene because its target is
/// a declared external dependency. Kept for a later resolution pass.
#[derive(Debug, Clone, PartialEq)]
pub struct DeferredPair {
    /// The live entity that owns the edge.
    pub entity: Entity,
    /// The unresolved packed edge, verbatim.
    pub pair: PackedPair,
}

/// The result of instantiating one packed scene.
#[derive(Debug, Default)]
pub struct SceneInstance {
    /// Live handles of the scene's root entities, in document order.
    pub roots: Vec<Entity>,
    /// The allocation map: packed UUID to live handle, for every entity in
    /// the scene that carried a valid UUID.
    pub by_uuid: HashMap<Uuid, Entity>,
    /// Pairs deferred to a later cross-scene resolution pass.
    pub deferred: Vec<DeferredPair>,
}

/// One allocated node, recorded in phase 1 and consumed in phase 2.
/// The flat list preserves forest traversal order, which gives phase 2
/// last-writer-wins semantics consistent with packing order.
#[derive(Debug)]
struct AllocatedNode<'p> {
    entity: Entity,
    parent: Entity,
    packed: &'p PackedEntity,
}

/// How one pair side resolved against the scene and the target world.
enum SideResolution {
    Resolved(PairPart),
    External(Uuid),
    Missing,
}

/// Reconstructs packed scenes into a target world.
#[derive(Debug)]
pub struct Instantiator<'a> {
    world: &'a mut World,
    codecs: &'a CodecRegistry,
}

impl<'a> Instantiator<'a> {
    /// Create an instantiator over a target world and its codec registry.
    ///
    /// The world must not be concurrently mutated for the duration of one
    /// instantiate call; the engine itself takes no locks.
    pub fn new(world: &'a mut World, codecs: &'a CodecRegistry) -> Self {
        Self { world, codecs }
    }

    /// Instantiate a packed scene as new root entities in the target world.
    pub fn instantiate_scene(&mut self, scene: &PackedScene) -> SceneInstance {
        self.instantiate(scene, Entity::INVALID)
    }

    /// Instantiate a packed scene with its root entities parented under an
    /// existing live entity.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::EntityNotFound`] if `parent` is not alive —
    /// the one contract violation that is fatal rather than recoverable.
    pub fn instantiate_scene_as_children(
        &mut self,
        scene: &PackedScene,
        parent: Entity,
    ) -> Result<SceneInstance, WorldError> {
        if !self.world.exists(parent) {
            return Err(WorldError::EntityNotFound(parent));
        }
        Ok(self.instantiate(scene, parent))
    }

    fn instantiate(&mut self, scene: &PackedScene, parent: Entity) -> SceneInstance {
        let external: HashSet<Uuid> = scene
            .external_dependencies
            .iter()
            .map(|dep| dep.uuid)
            .filter(|uuid| uuid.is_valid())
            .collect();

        // Phase 1: allocate every node before anything references anything.
        let mut order: Vec<AllocatedNode<'_>> = Vec::new();
        let mut by_uuid: HashMap<Uuid, Entity> = HashMap::new();
        let mut roots = Vec::with_capacity(scene.entities.len());
        for node in &scene.entities {
            roots.push(self.allocate(node, parent, &mut order, &mut by_uuid));
        }

        // Phase 2: link, in forest traversal order.
        let mut deferred = Vec::new();
        for alloc in &order {
            self.link(alloc, &by_uuid, &external, &mut deferred);
        }

        SceneInstance {
            roots,
            by_uuid,
            deferred,
        }
    }

    /// Phase 1 for one subtree: create live entities pre-order, filling the
    /// allocation map both ways.
    fn allocate<'p>(
        &mut self,
        node: &'p PackedEntity,
        parent: Entity,
        order: &mut Vec<AllocatedNode<'p>>,
        by_uuid: &mut HashMap<Uuid, Entity>,
    ) -> Entity {
        let entity = self.spawn_renamed(&node.name);
        // These cannot fail for an entity we just spawned, and recoverable
        // load problems must not abort the build; report and continue.
        if let Err(error) = self.world.set_enabled(entity, node.enabled) {
            warn!(%entity, %error, "failed to set enabled flag");
        }
        if node.uuid.is_valid() {
            if let Some(&first) = by_uuid.get(&node.uuid) {
                warn!(
                    uuid = %node.uuid,
                    %first,
                    duplicate = %entity,
                    "duplicate uuid in scene; pairs resolve to the first entity"
                );
            } else {
                by_uuid.insert(node.uuid, entity);
                if let Err(error) = self.world.set_uuid(entity, node.uuid) {
                    warn!(%entity, %error, "failed to set uuid");
                }
            }
        }
        order.push(AllocatedNode {
            entity,
            parent,
            packed: node,
        });
        for child in &node.children {
            self.allocate(child, entity, order, by_uuid);
        }
        entity
    }

    /// Create an entity under the packed name, renaming deterministically
    /// (`name#2`, `name#3`, ...) on collision. Two distinct entities are
    /// never merged under one name.
    fn spawn_renamed(&mut self, name: &str) -> Entity {
        let mut candidate = name.to_string();
        let mut attempt = 1u32;
        loop {
            match self.world.spawn(&candidate) {
                Ok(entity) => {
                    if attempt > 1 {
                        warn!(
                            original = name,
                            renamed = %candidate,
                            "entity name already taken in target world; renamed"
                        );
                    }
                    return entity;
                }
                Err(_) => {
                    attempt += 1;
                    candidate = format!("{name}#{attempt}");
                }
            }
        }
    }

    /// Phase 2 for one node: structural parent edge, tags, components, then
    /// pairs.
    fn link(
        &mut self,
        alloc: &AllocatedNode<'_>,
        by_uuid: &HashMap<Uuid, Entity>,
        external: &HashSet<Uuid>,
        deferred: &mut Vec<DeferredPair>,
    ) {
        let entity = alloc.entity;

        if alloc.parent.is_valid()
            && let Err(error) = self.world.set_parent(entity, alloc.parent)
        {
            warn!(%entity, %error, "failed to attach parent edge");
        }

        for tag in &alloc.packed.tags {
            match self.world.resolve_type(&tag.type_name) {
                Some(info) if info.is_tag => {
                    if let Err(error) = self.world.add_tag(entity, &tag.type_name) {
                        warn!(%entity, %error, "failed to attach tag");
                    }
                }
                Some(_) => {
                    warn!(%entity, tag = %tag.type_name, "packed tag is a data component in this world; skipped");
                }
                None => {
                    warn!(%entity, tag = %tag.type_name, "unknown tag type; skipped");
                }
            }
        }

        for component in &alloc.packed.components {
            match self.codecs.decode(&component.type_name, &component.json_data) {
                Ok(value) => {
                    if let Err(error) =
                        self.world.set_component(entity, &component.type_name, value)
                    {
                        warn!(%entity, %error, "failed to attach component");
                    }
                }
                Err(error) => {
                    warn!(%entity, %error, "component skipped on load");
                }
            }
        }

        for pair in &alloc.packed.pairs {
            self.link_pair(entity, pair, by_uuid, external, deferred);
        }
    }

    fn link_pair(
        &mut self,
        entity: Entity,
        pair: &PackedPair,
        by_uuid: &HashMap<Uuid, Entity>,
        external: &HashSet<Uuid>,
        deferred: &mut Vec<DeferredPair>,
    ) {
        let relationship = self.resolve_side(
            pair.relationship_is_component,
            pair.relationship_uuid,
            &pair.relationship_path,
            by_uuid,
            external,
        );
        let target = self.resolve_side(
            pair.target_is_component,
            pair.target_uuid,
            &pair.target_path,
            by_uuid,
            external,
        );

        let (relationship, target) = match (relationship, target) {
            (SideResolution::Resolved(r), SideResolution::Resolved(t)) => (r, t),
            (SideResolution::External(uuid), _) | (_, SideResolution::External(uuid)) => {
                // Not an error: the target lives outside this document.
                debug!(%entity, %uuid, relationship = %pair.relationship_name, "pair deferred to external dependency");
                deferred.push(DeferredPair {
                    entity,
                    pair: pair.clone(),
                });
                return;
            }
            _ => {
                warn!(
                    %entity,
                    relationship = %pair.relationship_name,
                    target = %pair.target_name,
                    "pair references nothing in this scene; edge dropped"
                );
                return;
            }
        };

        let data = if pair.json_data.is_empty() {
            None
        } else {
            match serde_json::from_str(&pair.json_data) {
                Ok(value) => Some(value),
                Err(error) => {
                    warn!(%entity, %error, "pair payload is malformed; attached without data");
                    None
                }
            }
        };

        if let Err(error) = self.world.add_pair(entity, relationship, target, data) {
            warn!(%entity, %error, "failed to attach pair");
        }
    }

    /// Resolve one side of a packed pair. Component-type sides resolve
    /// through the target world's type registry; data-entity sides resolve
    /// through the allocation map built in phase 1.
    fn resolve_side(
        &self,
        is_component: bool,
        uuid: Uuid,
        path: &str,
        by_uuid: &HashMap<Uuid, Entity>,
        external: &HashSet<Uuid>,
    ) -> SideResolution {
        if is_component {
            match self.world.resolve_type(path) {
                Some(info) => SideResolution::Resolved(PairPart::Type(info.name.clone())),
                None => SideResolution::Missing,
            }
        } else if let Some(&entity) = by_uuid.get(&uuid) {
            SideResolution::Resolved(PairPart::Entity(entity))
        } else if external.contains(&uuid) {
            SideResolution::External(uuid)
        } else {
            SideResolution::Missing
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{read_document, write_document};
    use crate::pack::Packer;
    use crate::packed::{PackedComponent, PackedExternalDependency};
    use serde_json::json;

    fn make_world() -> (World, CodecRegistry) {
        let mut world = World::new();
        world.register_component("Position");
        world.register_component("Health");
        world.register_tag("Frozen");
        world.register_tag("Targets");
        world.register_tag("IsA");

        let mut codecs = CodecRegistry::new();
        codecs.register_json("Position");
        codecs.register_json("Health");
        (world, codecs)
    }

    fn entity_node(uuid: u64, name: &str) -> PackedEntity {
        PackedEntity {
            uuid: Uuid::from_raw(uuid),
            name: name.into(),
            ..PackedEntity::default()
        }
    }

    fn targets_pair(target_name: &str, target_uuid: u64) -> PackedPair {
        PackedPair {
            relationship_name: "Targets".into(),
            relationship_is_component: true,
            relationship_path: "Targets".into(),
            target_name: target_name.into(),
            target_uuid: Uuid::from_raw(target_uuid),
            ..PackedPair::default()
        }
    }

    #[test]
    fn test_player_targets_enemy_scenario() {
        let (mut world, codecs) = make_world();

        let mut player = entity_node(0xA, "Player");
        player.components.push(PackedComponent::new(
            "Position",
            r#"{"type":"Position","x":0.0,"y":0.0,"z":0.0}"#,
        ));
        player.pairs.push(targets_pair("Enemy", 0xB));

        let mut enemy = entity_node(0xB, "Enemy");
        enemy.components.push(PackedComponent::new(
            "Position",
            r#"{"type":"Position","x":10.0,"y":0.0,"z":0.0}"#,
        ));

        let scene = PackedScene {
            entities: vec![player, enemy],
            ..PackedScene::default()
        };

        let instance = Instantiator::new(&mut world, &codecs).instantiate_scene(&scene);
        assert_eq!(instance.roots.len(), 2);
        assert!(instance.deferred.is_empty());

        let live_player = world.lookup("Player").unwrap();
        let live_enemy = world.lookup("Enemy").unwrap();
        let pos = world.get_component(live_player, "Position").unwrap();
        assert_eq!(pos["x"], 0.0);
        assert!(world.has_pair(
            live_player,
            &PairPart::Type("Targets".into()),
            &PairPart::Entity(live_enemy)
        ));
    }

    #[test]
    fn test_forward_reference_resolves() {
        // Player is declared before Enemy; its pair must still resolve.
        let (mut world, codecs) = make_world();
        let mut player = entity_node(0xA, "Player");
        player.pairs.push(targets_pair("Enemy", 0xB));
        let scene = PackedScene {
            entities: vec![player, entity_node(0xB, "Enemy")],
            ..PackedScene::default()
        };
        Instantiator::new(&mut world, &codecs).instantiate_scene(&scene);
        assert!(world.has_pair(
            world.lookup("Player").unwrap(),
            &PairPart::Type("Targets".into()),
            &PairPart::Entity(world.lookup("Enemy").unwrap())
        ));
    }

    #[test]
    fn test_declaration_order_is_irrelevant() {
        // The same scene with entity order reversed yields identical edges.
        let build = |reversed: bool| {
            let (mut world, codecs) = make_world();
            let mut a = entity_node(0xA, "A");
            a.pairs.push(targets_pair("B", 0xB));
            let b = entity_node(0xB, "B");
            let entities = if reversed { vec![b, a] } else { vec![a, b] };
            let scene = PackedScene {
                entities,
                ..PackedScene::default()
            };
            Instantiator::new(&mut world, &codecs).instantiate_scene(&scene);
            let live_a = world.lookup("A").unwrap();
            let live_b = world.lookup("B").unwrap();
            world.has_pair(
                live_a,
                &PairPart::Type("Targets".into()),
                &PairPart::Entity(live_b),
            )
        };
        assert!(build(false));
        assert!(build(true));
    }

    #[test]
    fn test_forward_and_backward_references_across_trees() {
        // Parent targets a not-yet-visited descendant; the descendant
        // targets back up to an entity in a different root tree.
        let (mut world, codecs) = make_world();

        let mut leaf = entity_node(0xC, "Leaf");
        leaf.pairs.push(targets_pair("Other", 0xD));
        let mut root = entity_node(0xA, "Root");
        root.pairs.push(targets_pair("Leaf", 0xC));
        root.children.push({
            let mut mid = entity_node(0xB, "Mid");
            mid.children.push(leaf);
            mid
        });

        let scene = PackedScene {
            entities: vec![root, entity_node(0xD, "Other")],
            ..PackedScene::default()
        };
        let instance = Instantiator::new(&mut world, &codecs).instantiate_scene(&scene);
        assert!(instance.deferred.is_empty());

        let live_root = world.lookup("Root").unwrap();
        let live_leaf = world.lookup("Leaf").unwrap();
        let live_other = world.lookup("Other").unwrap();
        assert!(world.has_pair(
            live_root,
            &PairPart::Type("Targets".into()),
            &PairPart::Entity(live_leaf)
        ));
        assert!(world.has_pair(
            live_leaf,
            &PairPart::Type("Targets".into()),
            &PairPart::Entity(live_other)
        ));
    }

    #[test]
    fn test_hierarchy_scenario() {
        let (mut world, codecs) = make_world();
        let mut root = entity_node(0x1, "Root");
        let mut mid = entity_node(0x2, "Mid");
        mid.children.push(entity_node(0x3, "Leaf"));
        root.children.push(mid);
        let scene = PackedScene {
            entities: vec![root],
            ..PackedScene::default()
        };

        let instance = Instantiator::new(&mut world, &codecs).instantiate_scene(&scene);
        assert_eq!(instance.roots.len(), 1);

        let live_root = world.lookup("Root").unwrap();
        let live_mid = world.lookup("Mid").unwrap();
        let live_leaf = world.lookup("Leaf").unwrap();
        assert_eq!(world.parent(live_leaf).unwrap(), live_mid);
        assert_eq!(world.parent(live_mid).unwrap(), live_root);
        assert_eq!(world.children(live_root).unwrap().len(), 1);
        assert_eq!(world.parent(live_root).unwrap(), Entity::INVALID);
    }

    #[test]
    fn test_unresolvable_target_drops_edge_only() {
        let (mut world, codecs) = make_world();
        let mut player = entity_node(0xA, "Player");
        player.pairs.push(targets_pair("Ghost", 0xEE));
        player.components.push(PackedComponent::new(
            "Health",
            r#"{"type":"Health","value":100.0}"#,
        ));
        let scene = PackedScene {
            entities: vec![player],
            ..PackedScene::default()
        };

        let instance = Instantiator::new(&mut world, &codecs).instantiate_scene(&scene);
        // Edge dropped, not deferred; entity otherwise complete.
        assert!(instance.deferred.is_empty());
        let live = world.lookup("Player").unwrap();
        assert!(world.pairs(live).unwrap().is_empty());
        assert!(world.has_component(live, "Health"));
    }

    #[test]
    fn test_external_dependency_target_is_deferred() {
        let (mut world, codecs) = make_world();
        let mut player = entity_node(0xA, "Player");
        player.pairs.push(targets_pair("OtherSceneBoss", 0xDEAD));
        let scene = PackedScene {
            entities: vec![player],
            external_dependencies: vec![PackedExternalDependency {
                uuid: Uuid::from_raw(0xDEAD),
                ty: "scene".into(),
            }],
            ..PackedScene::default()
        };

        let instance = Instantiator::new(&mut world, &codecs).instantiate_scene(&scene);
        let live = world.lookup("Player").unwrap();
        assert!(world.pairs(live).unwrap().is_empty());
        assert_eq!(instance.deferred.len(), 1);
        assert_eq!(instance.deferred[0].entity, live);
        assert_eq!(instance.deferred[0].pair.target_uuid, Uuid::from_raw(0xDEAD));
    }

    #[test]
    fn test_unknown_component_type_is_skipped() {
        let (mut world, codecs) = make_world();
        let mut node = entity_node(0xA, "A");
        node.components.push(PackedComponent::new(
            "Mystery",
            r#"{"type":"Mystery","x":1}"#,
        ));
        node.components.push(PackedComponent::new(
            "Health",
            r#"{"type":"Health","value":5.0}"#,
        ));
        node.tags.push(PackedComponent::tag("NotRegistered"));
        node.tags.push(PackedComponent::tag("Frozen"));
        let scene = PackedScene {
            entities: vec![node],
            ..PackedScene::default()
        };

        Instantiator::new(&mut world, &codecs).instantiate_scene(&scene);
        let live = world.lookup("A").unwrap();
        assert!(!world.has_component(live, "Mystery"));
        assert!(world.has_component(live, "Health"));
        assert!(!world.has_tag(live, "NotRegistered"));
        assert!(world.has_tag(live, "Frozen"));
    }

    #[test]
    fn test_duplicate_name_is_renamed_not_merged() {
        let (mut world, codecs) = make_world();
        let existing = world.spawn("Player").unwrap();
        let scene = PackedScene {
            entities: vec![entity_node(0xA, "Player")],
            ..PackedScene::default()
        };

        let instance = Instantiator::new(&mut world, &codecs).instantiate_scene(&scene);
        let renamed = instance.roots[0];
        assert_ne!(renamed, existing);
        assert_eq!(world.name(renamed).unwrap(), "Player#2");
        assert_eq!(world.lookup("Player"), Some(existing));
    }

    #[test]
    fn test_duplicate_uuid_keeps_first_allocation() {
        let (mut world, codecs) = make_world();
        let mut aimer = entity_node(0x1, "Aimer");
        aimer.pairs.push(targets_pair("First", 0x5));
        let scene = PackedScene {
            entities: vec![aimer, entity_node(0x5, "First"), entity_node(0x5, "Second")],
            ..PackedScene::default()
        };

        Instantiator::new(&mut world, &codecs).instantiate_scene(&scene);
        let live_aimer = world.lookup("Aimer").unwrap();
        let live_first = world.lookup("First").unwrap();
        assert!(world.has_pair(
            live_aimer,
            &PairPart::Type("Targets".into()),
            &PairPart::Entity(live_first)
        ));
    }

    #[test]
    fn test_instantiate_as_children() {
        let (mut world, codecs) = make_world();
        let anchor = world.spawn("Anchor").unwrap();
        let scene = PackedScene {
            entities: vec![entity_node(0xA, "A"), entity_node(0xB, "B")],
            ..PackedScene::default()
        };

        let instance = Instantiator::new(&mut world, &codecs)
            .instantiate_scene_as_children(&scene, anchor)
            .unwrap();
        assert_eq!(world.children(anchor).unwrap(), instance.roots.as_slice());
        for &root in &instance.roots {
            assert_eq!(world.parent(root).unwrap(), anchor);
        }
    }

    #[test]
    fn test_instantiate_as_children_requires_live_parent() {
        let (mut world, codecs) = make_world();
        let result = Instantiator::new(&mut world, &codecs)
            .instantiate_scene_as_children(&PackedScene::default(), Entity::from_raw(404));
        assert!(matches!(result, Err(WorldError::EntityNotFound(_))));
    }

    #[test]
    fn test_pair_payload_survives() {
        let (mut world, codecs) = make_world();
        let mut a = entity_node(0xA, "A");
        let mut pair = targets_pair("B", 0xB);
        pair.json_data = r#"{"weight":0.5}"#.into();
        a.pairs.push(pair);
        let scene = PackedScene {
            entities: vec![a, entity_node(0xB, "B")],
            ..PackedScene::default()
        };

        Instantiator::new(&mut world, &codecs).instantiate_scene(&scene);
        let live = world.lookup("A").unwrap();
        let record = &world.pairs(live).unwrap()[0];
        assert_eq!(record.data.as_ref().unwrap()["weight"], 0.5);
    }

    #[test]
    fn test_string_pair_payload_survives_document() {
        // A pair carrying a bare string payload keeps it through the full
        // pack -> write -> read -> instantiate path.
        let (mut world, codecs) = make_world();
        let a = world.spawn("A").unwrap();
        let b = world.spawn("B").unwrap();
        world.assign_uuid(a).unwrap();
        world.assign_uuid(b).unwrap();
        world
            .add_pair(
                a,
                PairPart::Type("Targets".into()),
                PairPart::Entity(b),
                Some(json!("hi")),
            )
            .unwrap();

        let scene = Packer::new(&world, &codecs).pack_scene(&[a, b]).unwrap();
        let parsed: PackedScene = read_document(&write_document(&scene).unwrap()).unwrap();
        assert_eq!(parsed, scene);

        let (mut world2, codecs2) = make_world();
        Instantiator::new(&mut world2, &codecs2).instantiate_scene(&parsed);
        let live = world2.lookup("A").unwrap();
        assert_eq!(world2.pairs(live).unwrap()[0].data, Some(json!("hi")));
    }

    #[test]
    fn test_disabled_entity_stays_disabled() {
        let (mut world, codecs) = make_world();
        let mut node = entity_node(0xA, "Sleeper");
        node.enabled = false;
        let scene = PackedScene {
            entities: vec![node],
            ..PackedScene::default()
        };
        Instantiator::new(&mut world, &codecs).instantiate_scene(&scene);
        assert!(!world.is_enabled(world.lookup("Sleeper").unwrap()).unwrap());
    }

    #[test]
    fn test_prefab_isa_pair_roundtrip() {
        // An IsA pair whose target is a prefab entity in the same forest.
        let (mut world, codecs) = make_world();
        let prefab = world.spawn("EnemyPrefab").unwrap();
        let prefab_uuid = world.assign_uuid(prefab).unwrap();
        world
            .set_component(prefab, "Health", json!({"value": 100.0}))
            .unwrap();
        let instance_entity = world.spawn("Enemy1").unwrap();
        world.assign_uuid(instance_entity).unwrap();
        world.relate(instance_entity, "IsA", prefab).unwrap();

        let packer = Packer::new(&world, &codecs);
        let scene = packer.pack_scene(&[prefab, instance_entity]).unwrap();
        assert_eq!(scene.entities[1].pairs[0].relationship_name, "IsA");
        assert_eq!(scene.entities[1].pairs[0].target_uuid, prefab_uuid);

        let (mut world2, codecs2) = make_world();
        Instantiator::new(&mut world2, &codecs2).instantiate_scene(&scene);
        let live_prefab = world2.lookup("EnemyPrefab").unwrap();
        let live_enemy = world2.lookup("Enemy1").unwrap();
        assert!(world2.has_pair(
            live_enemy,
            &PairPart::Type("IsA".into()),
            &PairPart::Entity(live_prefab)
        ));
    }

    #[test]
    fn test_full_roundtrip_through_document() {
        // Pack -> write -> read -> instantiate into a different world, then
        // compare name, enabled, components, tags and child names.
        let (mut world, codecs) = make_world();
        let root = world.spawn("Root").unwrap();
        world.assign_uuid(root).unwrap();
        world.add_tag(root, "Frozen").unwrap();
        world
            .set_component(root, "Position", json!({"x": 1.0, "y": 2.0, "z": 3.0}))
            .unwrap();
        let child = world.spawn("Child").unwrap();
        world.assign_uuid(child).unwrap();
        world.set_enabled(child, false).unwrap();
        world.set_parent(child, root).unwrap();
        world.relate(child, "Targets", root).unwrap();

        let scene = Packer::new(&world, &codecs).pack_scene(&[root]).unwrap();
        let text = write_document(&scene).unwrap();
        let parsed: PackedScene = read_document(&text).unwrap();
        assert_eq!(parsed, scene);

        let (mut world2, codecs2) = make_world();
        let instance = Instantiator::new(&mut world2, &codecs2).instantiate_scene(&parsed);
        assert!(instance.deferred.is_empty());

        let live_root = world2.lookup("Root").unwrap();
        let live_child = world2.lookup("Child").unwrap();
        assert!(world2.is_enabled(live_root).unwrap());
        assert!(!world2.is_enabled(live_child).unwrap());
        assert!(world2.has_tag(live_root, "Frozen"));
        assert_eq!(
            world2.get_component(live_root, "Position").unwrap(),
            world.get_component(root, "Position").unwrap()
        );
        assert_eq!(world2.children(live_root).unwrap(), &[live_child]);
        assert!(world2.has_pair(
            live_child,
            &PairPart::Type("Targets".into()),
            &PairPart::Entity(live_root)
        ));
        // UUIDs are carried over, so the instance can be re-packed with
        // stable identity.
        assert_eq!(world2.uuid(live_root).unwrap(), world.uuid(root).unwrap());
    }
}
