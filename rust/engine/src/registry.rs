// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entity registry.
//!
//! Maps scene nodes to the semantic entities a user can select. The arena
//! is rebuilt from scratch on every load; only [`EntityRef`]s survive a
//! reload.

use rustc_hash::FxHashMap;
use slotmap::SlotMap;

use crate::keys::{EntityKey, NodeKey};
use crate::model::{EntityRef, EntityType};
use crate::scene::Scene;

#[derive(Debug, Clone)]
pub struct Entity {
    pub reference: EntityRef,
    pub node: NodeKey,
    pub parent: Option<EntityKey>,
    pub children: Vec<EntityKey>,
}

impl Entity {
    pub fn entity_type(&self) -> EntityType {
        self.reference.entity_type
    }

    pub fn floor_id(&self) -> &str {
        &self.reference.floor_id
    }
}

#[derive(Debug, Default)]
pub struct EntityRegistry {
    entities: SlotMap<EntityKey, Entity>,
    by_node: FxHashMap<NodeKey, EntityKey>,
    by_ref: FxHashMap<EntityRef, EntityKey>,
    /// Registration order, used for keyboard cycling
    order: Vec<EntityKey>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `node` as a selectable entity.
    ///
    /// A node maps to at most one entity; registering it again returns the
    /// existing key.
    pub fn register(
        &mut self,
        node: NodeKey,
        entity_type: EntityType,
        entity_id: &str,
        floor_id: &str,
        parent: Option<EntityKey>,
    ) -> EntityKey {
        if let Some(&existing) = self.by_node.get(&node) {
            tracing::warn!(entity_id, "node already registered");
            return existing;
        }

        let reference = EntityRef::new(entity_type, entity_id, floor_id);
        let parent = parent.filter(|p| self.entities.contains_key(*p));
        let key = self.entities.insert(Entity {
            reference: reference.clone(),
            node,
            parent,
            children: Vec::new(),
        });

        if let Some(p) = parent {
            self.entities[p].children.push(key);
        }
        self.by_node.insert(node, key);
        if self.by_ref.contains_key(&reference) {
            tracing::warn!(%reference, "duplicate entity id, keeping the first");
        } else {
            self.by_ref.insert(reference, key);
        }
        self.order.push(key);
        key
    }

    pub fn get(&self, key: EntityKey) -> Option<&Entity> {
        self.entities.get(key)
    }

    pub fn entity_for_node(&self, node: NodeKey) -> Option<EntityKey> {
        self.by_node.get(&node).copied()
    }

    /// Walk up from `node` to the nearest registered node.
    pub fn find_selectable_ancestor(&self, scene: &Scene, node: NodeKey) -> Option<EntityKey> {
        let mut current = Some(node);
        while let Some(k) = current {
            if let Some(entity) = self.entity_for_node(k) {
                return Some(entity);
            }
            current = scene.parent(k);
        }
        None
    }

    /// All entities in registration order
    pub fn all_entities(&self) -> &[EntityKey] {
        &self.order
    }

    pub fn resolve(&self, reference: &EntityRef) -> Option<EntityKey> {
        self.by_ref.get(reference).copied()
    }

    pub fn reference(&self, key: EntityKey) -> Option<&EntityRef> {
        self.entities.get(key).map(|e| &e.reference)
    }

    pub fn children_of(&self, key: EntityKey) -> &[EntityKey] {
        self.entities
            .get(key)
            .map_or(&[][..], |e| e.children.as_slice())
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn clear(&mut self) {
        self.entities.clear();
        self.by_node.clear();
        self.by_ref.clear();
        self.order.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::Material;
    use floorplan_geometry::Mesh;

    #[test]
    fn ancestor_walk_finds_registered_parent() {
        let mut scene = Scene::new();
        let mut registry = EntityRegistry::new();
        let floor = scene.add_group(scene.root(), "floor");
        let wall = scene.add_mesh(floor, "wall", Mesh::new(), Material::solid([1.0; 3]));
        let detail = scene.add_mesh(wall, "door frame", Mesh::new(), Material::solid([1.0; 3]));

        let key = registry.register(wall, EntityType::Wall, "r1:top", "f1", None);
        assert_eq!(registry.find_selectable_ancestor(&scene, detail), Some(key));
        assert_eq!(registry.find_selectable_ancestor(&scene, floor), None);
    }

    #[test]
    fn parents_children_and_order() {
        let mut scene = Scene::new();
        let mut registry = EntityRegistry::new();
        let root = scene.root();
        let room_node = scene.add_group(root, "room");
        let wall_node = scene.add_group(room_node, "wall");
        let stair_node = scene.add_group(root, "stair");

        let room = registry.register(room_node, EntityType::Room, "r1", "f1", None);
        let wall = registry.register(wall_node, EntityType::Wall, "r1:top", "f1", Some(room));
        let stair = registry.register(stair_node, EntityType::Stair, "s1", "f1", None);

        assert_eq!(registry.all_entities(), &[room, wall, stair]);
        assert_eq!(registry.children_of(room), &[wall]);
        assert_eq!(registry.get(wall).unwrap().parent, Some(room));
        assert_eq!(
            registry.resolve(&EntityRef::new(EntityType::Stair, "s1", "f1")),
            Some(stair)
        );

        // registering the same node again is a no-op
        assert_eq!(registry.register(room_node, EntityType::Room, "r1", "f1", None), room);
        assert_eq!(registry.len(), 3);

        registry.clear();
        assert!(registry.is_empty());
        assert!(registry.all_entities().is_empty());
        assert_eq!(registry.entity_for_node(room_node), None);
    }
}
