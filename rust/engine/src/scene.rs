// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scene graph.
//!
//! A tree of nodes in a slot map. Every node carries a local transform and
//! a visibility flag; leaf content is an optional mesh in node-local
//! coordinates. Hiding a node hides its whole subtree.

use floorplan_geometry::{Aabb, Matrix4, Mesh, Ray};
use slotmap::SlotMap;
use smallvec::SmallVec;

use crate::keys::NodeKey;
use crate::theme::Material;

/// Highlight state the renderer draws on top of a node's material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HighlightLevel {
    /// Directly selected
    Primary,
    /// Selected through a selected parent room
    Secondary,
    /// Under the pointer or inside a live marquee
    Hover,
}

#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    pub parent: Option<NodeKey>,
    pub children: Vec<NodeKey>,
    pub transform: Matrix4<f64>,
    pub visible: bool,
    pub mesh: Option<Mesh>,
    pub material: Option<Material>,
    pub highlight: Option<HighlightLevel>,
}

impl SceneNode {
    fn group(name: &str, parent: Option<NodeKey>) -> Self {
        Self {
            name: name.to_string(),
            parent,
            children: Vec::new(),
            transform: Matrix4::identity(),
            visible: true,
            mesh: None,
            material: None,
            highlight: None,
        }
    }
}

/// A ray hit against a mesh node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub node: NodeKey,
    pub distance: f64,
}

pub type Hits = SmallVec<[Hit; 8]>;

#[derive(Debug)]
pub struct Scene {
    nodes: SlotMap<NodeKey, SceneNode>,
    root: NodeKey,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(SceneNode::group("root", None));
        Self { nodes, root }
    }

    pub fn root(&self) -> NodeKey {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Add an empty group under `parent` (the root when `parent` is stale)
    pub fn add_group(&mut self, parent: NodeKey, name: &str) -> NodeKey {
        let parent = if self.nodes.contains_key(parent) {
            parent
        } else {
            self.root
        };
        let key = self.nodes.insert(SceneNode::group(name, Some(parent)));
        self.nodes[parent].children.push(key);
        key
    }

    pub fn add_mesh(&mut self, parent: NodeKey, name: &str, mesh: Mesh, material: Material) -> NodeKey {
        let key = self.add_group(parent, name);
        let node = &mut self.nodes[key];
        node.mesh = Some(mesh);
        node.material = Some(material);
        key
    }

    pub fn node(&self, key: NodeKey) -> Option<&SceneNode> {
        self.nodes.get(key)
    }

    pub fn node_mut(&mut self, key: NodeKey) -> Option<&mut SceneNode> {
        self.nodes.get_mut(key)
    }

    pub fn parent(&self, key: NodeKey) -> Option<NodeKey> {
        self.nodes.get(key).and_then(|n| n.parent)
    }

    pub fn set_visible(&mut self, key: NodeKey, visible: bool) {
        if let Some(node) = self.nodes.get_mut(key) {
            node.visible = visible;
        }
    }

    /// False when the node or any ancestor is hidden, or the key is stale.
    pub fn is_visible_in_hierarchy(&self, key: NodeKey) -> bool {
        let mut current = Some(key);
        while let Some(k) = current {
            match self.nodes.get(k) {
                Some(node) if node.visible => current = node.parent,
                _ => return false,
            }
        }
        true
    }

    pub fn world_transform(&self, key: NodeKey) -> Matrix4<f64> {
        let mut transform = Matrix4::identity();
        let mut current = Some(key);
        while let Some(k) = current {
            let Some(node) = self.nodes.get(k) else { break };
            transform = node.transform * transform;
            current = node.parent;
        }
        transform
    }

    /// `key` followed by all of its descendants, depth first
    pub fn subtree(&self, key: NodeKey) -> Vec<NodeKey> {
        let mut out = Vec::new();
        let mut stack = vec![key];
        while let Some(k) = stack.pop() {
            let Some(node) = self.nodes.get(k) else { continue };
            out.push(k);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// World-space bound of every mesh in the subtree
    pub fn world_bounds(&self, key: NodeKey) -> Aabb {
        self.subtree(key)
            .into_iter()
            .filter_map(|k| {
                let mesh = self.nodes[k].mesh.as_ref()?;
                Some(mesh.bounds().transformed(&self.world_transform(k)))
            })
            .fold(Aabb::empty(), |acc, b| acc.union(&b))
    }

    /// Mesh in world coordinates
    pub fn world_mesh(&self, key: NodeKey) -> Option<Mesh> {
        let mesh = self.nodes.get(key)?.mesh.as_ref()?;
        Some(mesh.transformed(&self.world_transform(key)))
    }

    /// Every mesh hit along `ray`, nearest first. Visibility is not
    /// considered here.
    pub fn raycast(&self, ray: &Ray) -> Hits {
        let mut hits: Hits = self
            .nodes
            .iter()
            .filter_map(|(key, node)| {
                let mesh = node.mesh.as_ref()?;
                let world = self.world_transform(key);
                let local_ray = match world.try_inverse() {
                    Some(inv) => ray.transformed(&inv),
                    None => return None,
                };
                let local_hit = mesh.raycast(&local_ray)?;
                // Distance back in world units
                let world_point = world.transform_point(&local_ray.at(local_hit));
                Some(Hit {
                    node: key,
                    distance: (world_point - ray.origin).norm(),
                })
            })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    /// Mesh nodes that are visible through their whole ancestor chain
    pub fn visible_mesh_nodes(&self) -> Vec<NodeKey> {
        self.subtree(self.root)
            .into_iter()
            .filter(|&k| self.nodes[k].mesh.is_some() && self.is_visible_in_hierarchy(k))
            .collect()
    }

    pub fn clear_highlights(&mut self) {
        for node in self.nodes.values_mut() {
            node.highlight = None;
        }
    }

    /// Drop every node except a fresh root
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = self.nodes.insert(SceneNode::group("root", None));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use floorplan_geometry::{box_mesh, Point3, Vector3};

    fn unit_box() -> Mesh {
        box_mesh(&Aabb::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0)))
    }

    #[test]
    fn hidden_parent_hides_subtree() {
        let mut scene = Scene::new();
        let floor = scene.add_group(scene.root(), "floor");
        let room = scene.add_mesh(floor, "room", unit_box(), Material::solid([1.0; 3]));
        assert!(scene.is_visible_in_hierarchy(room));
        scene.set_visible(floor, false);
        assert!(!scene.is_visible_in_hierarchy(room));
        assert!(scene.visible_mesh_nodes().is_empty());
    }

    #[test]
    fn world_bounds_follow_parent_transform() {
        let mut scene = Scene::new();
        let floor = scene.add_group(scene.root(), "floor");
        scene.node_mut(floor).unwrap().transform =
            Matrix4::new_translation(&Vector3::new(0.0, 3.0, 0.0));
        let room = scene.add_mesh(floor, "room", unit_box(), Material::solid([1.0; 3]));
        let b = scene.world_bounds(room);
        assert_relative_eq!(b.min.y, 3.0, epsilon = 1e-6);
        assert_relative_eq!(scene.world_bounds(floor).max.y, 4.0, epsilon = 1e-6);
    }

    #[test]
    fn raycast_orders_hits() {
        let mut scene = Scene::new();
        let root = scene.root();
        let low = scene.add_mesh(root, "low", unit_box(), Material::solid([1.0; 3]));
        let high = scene.add_mesh(root, "high", unit_box(), Material::solid([1.0; 3]));
        scene.node_mut(high).unwrap().transform =
            Matrix4::new_translation(&Vector3::new(0.0, 2.0, 0.0));

        let ray = Ray::new(Point3::new(0.5, 10.0, 0.5), Vector3::new(0.0, -1.0, 0.0));
        let hits = scene.raycast(&ray);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].node, high);
        assert_relative_eq!(hits[0].distance, 7.0, epsilon = 1e-6);
        assert_eq!(hits[1].node, low);
    }

    #[test]
    fn clear_leaves_fresh_root() {
        let mut scene = Scene::new();
        let old_root = scene.root();
        scene.add_group(old_root, "floor");
        scene.clear();
        assert_eq!(scene.len(), 1);
        assert!(scene.node(old_root).is_none());
        assert!(scene.is_empty());
    }
}
