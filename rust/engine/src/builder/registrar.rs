// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::keys::{EntityKey, NodeKey};
use crate::model::EntityType;
use crate::registry::EntityRegistry;

/// A semantic mesh the pipeline just produced
#[derive(Debug, Clone, Copy)]
pub struct Registration<'a> {
    pub node: NodeKey,
    pub entity_type: EntityType,
    pub entity_id: &'a str,
    pub floor_id: &'a str,
    pub parent: Option<EntityKey>,
}

/// Strategy deciding which produced meshes become selectable.
///
/// Called immediately after each semantic mesh is added to the scene.
/// Returning `None` leaves the node unregistered; clicks on it then resolve
/// to the nearest registered ancestor.
pub trait MeshRegistrar {
    fn register(&mut self, registry: &mut EntityRegistry, item: Registration<'_>) -> Option<EntityKey>;
}

/// Registers everything
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectableRegistrar;

impl MeshRegistrar for SelectableRegistrar {
    fn register(&mut self, registry: &mut EntityRegistry, item: Registration<'_>) -> Option<EntityKey> {
        Some(registry.register(
            item.node,
            item.entity_type,
            item.entity_id,
            item.floor_id,
            item.parent,
        ))
    }
}

/// Registers only the listed entity types, e.g. a rooms-only picker
#[derive(Debug, Clone, Default)]
pub struct TypeFilterRegistrar {
    types: Vec<EntityType>,
}

impl TypeFilterRegistrar {
    pub fn new(types: impl IntoIterator<Item = EntityType>) -> Self {
        Self {
            types: types.into_iter().collect(),
        }
    }
}

impl MeshRegistrar for TypeFilterRegistrar {
    fn register(&mut self, registry: &mut EntityRegistry, item: Registration<'_>) -> Option<EntityKey> {
        if !self.types.contains(&item.entity_type) {
            return None;
        }
        SelectableRegistrar.register(registry, item)
    }
}
