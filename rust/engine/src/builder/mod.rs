// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scene construction pipeline.
//!
//! Floors are processed strictly bottom to top. Each floor's slabs are cut
//! with the penetrations produced by the floor directly below, and every
//! floor produces the penetrations its own stairs and lifts need above.
//!
//! Wall geometry and entity registration are pluggable through
//! [`WallGenerator`] and [`MeshRegistrar`].

mod materials;
mod registrar;
mod walls;

pub use materials::MaterialSet;
pub use registrar::{MeshRegistrar, Registration, SelectableRegistrar, TypeFilterRegistrar};
pub use walls::{BoxWallGenerator, ConnectionPiece, WallGenerator, WallPiece, WallPieces, WallRequest};

use floorplan_geometry::{
    lift_door_panels, lift_shaft_mesh, stair_mesh, Aabb, FloorCutter, Penetration,
    PenetrationComputer, PenetrationSource, Point3,
};
use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::config::EngineConfig;
use crate::keys::{EntityKey, NodeKey};
use crate::layout::FloorLayout;
use crate::model::{wall_id, Direction, EntityType, Floor, Floorplan, Room, Style};
use crate::registry::EntityRegistry;
use crate::scene::Scene;
use crate::theme::Palette;

const FALLBACK_HEIGHT: f64 = 3.0;

/// What one floor produced
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FloorSummary {
    pub floor_id: String,
    pub base: f64,
    pub height: f64,
    pub rooms: usize,
    pub walls: usize,
    pub connections: usize,
    pub stairs: usize,
    pub lifts: usize,
    pub holes_cut: usize,
    pub holes_skipped: usize,
    /// Penetrations handed to the floor above
    pub penetrations: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BuildReport {
    pub floors: Vec<FloorSummary>,
}

impl BuildReport {
    pub fn holes_cut(&self) -> usize {
        self.floors.iter().map(|f| f.holes_cut).sum()
    }
}

/// Mutable state the pipeline writes into
pub struct BuildTarget<'a> {
    pub scene: &'a mut Scene,
    pub registry: &'a mut EntityRegistry,
    pub layout: &'a mut FloorLayout,
}

pub type FloorCallback = Box<dyn FnMut(&FloorSummary)>;

pub struct ScenePipeline {
    walls: Box<dyn WallGenerator>,
    registrar: Box<dyn MeshRegistrar>,
    /// Called after each floor is complete
    pub on_floor_built: Option<FloorCallback>,
    cutter: FloorCutter,
    computer: PenetrationComputer,
}

impl ScenePipeline {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            walls: Box::new(BoxWallGenerator::new()),
            registrar: Box::new(SelectableRegistrar),
            on_floor_built: None,
            cutter: FloorCutter::new(config.min_hole_size),
            computer: PenetrationComputer::new().with_lift_headroom(config.lift_headroom),
        }
    }

    pub fn with_wall_generator(mut self, generator: impl WallGenerator + 'static) -> Self {
        self.walls = Box::new(generator);
        self
    }

    pub fn with_registrar(mut self, registrar: impl MeshRegistrar + 'static) -> Self {
        self.registrar = Box::new(registrar);
        self
    }

    pub fn with_floor_callback(mut self, callback: impl FnMut(&FloorSummary) + 'static) -> Self {
        self.on_floor_built = Some(Box::new(callback));
        self
    }

    /// Build every floor of `plan` into an empty scene and registry.
    pub fn build(&mut self, plan: &Floorplan, palette: &Palette, target: BuildTarget<'_>) -> BuildReport {
        let BuildTarget {
            scene,
            registry,
            layout,
        } = target;
        let mut report = BuildReport::default();
        let mut below: Vec<Penetration> = Vec::new();
        let mut placed_connections: FxHashSet<String> = FxHashSet::default();

        for floor in &plan.floors {
            let height = floor_height(plan, floor);
            let group = scene.add_group(scene.root(), &format!("floor {}", floor.id));
            let base = layout.push(&floor.id, height, group);
            let mut builder = FloorBuilder {
                plan,
                floor,
                palette,
                base,
                height,
                group,
                scene: &mut *scene,
                registry: &mut *registry,
                registrar: self.registrar.as_mut(),
                summary: FloorSummary {
                    floor_id: floor.id.clone(),
                    base,
                    height,
                    ..FloorSummary::default()
                },
            };

            for room in &floor.rooms {
                builder.room(room, &self.cutter, &below, self.walls.as_ref(), &mut placed_connections);
            }
            below = builder.circulation(&self.computer);

            let summary = builder.summary;
            tracing::debug!(
                floor = %summary.floor_id,
                base,
                height,
                rooms = summary.rooms,
                holes = summary.holes_cut,
                "floor built"
            );
            if let Some(callback) = self.on_floor_built.as_mut() {
                callback(&summary);
            }
            report.floors.push(summary);
        }

        tracing::info!(
            floors = report.floors.len(),
            entities = registry.len(),
            holes = report.holes_cut(),
            "scene built"
        );
        report
    }
}

struct FloorBuilder<'a> {
    plan: &'a Floorplan,
    floor: &'a Floor,
    palette: &'a Palette,
    base: f64,
    height: f64,
    group: NodeKey,
    scene: &'a mut Scene,
    registry: &'a mut EntityRegistry,
    registrar: &'a mut dyn MeshRegistrar,
    summary: FloorSummary,
}

impl FloorBuilder<'_> {
    fn register(&mut self, node: NodeKey, entity_type: EntityType, id: &str, parent: Option<EntityKey>) -> Option<EntityKey> {
        self.registrar.register(
            self.registry,
            Registration {
                node,
                entity_type,
                entity_id: id,
                floor_id: &self.floor.id,
                parent,
            },
        )
    }

    fn room(
        &mut self,
        room: &Room,
        cutter: &FloorCutter,
        below: &[Penetration],
        walls: &dyn WallGenerator,
        placed_connections: &mut FxHashSet<String>,
    ) {
        let (plan, floor) = (self.plan, self.floor);
        let style = room_style(plan, floor, room);
        let materials = MaterialSet::new(self.palette, style);
        let height = room_height(plan, floor, room);

        let top = self.base + room.elevation;
        let bottom = top - plan.config.floor_thickness.max(0.0);
        let slab = Aabb::new(
            Point3::new(room.position[0], bottom, room.position[1]),
            Point3::new(room.position[0] + room.width, top, room.position[1] + room.depth),
        );
        let cut = cutter.cut(&slab, below);
        self.summary.holes_cut += cut.holes_cut;
        self.summary.holes_skipped += cut.holes_skipped;

        let node = self
            .scene
            .add_mesh(self.group, &format!("room {}", room.id), cut.mesh, materials.floor);
        let room_key = self.register(node, EntityType::Room, &room.id, None);
        self.summary.rooms += 1;

        for side in Direction::ALL {
            let request = WallRequest {
                room,
                side,
                rooms: &floor.rooms,
                connections: &plan.connections,
                materials: &materials,
                floor_y: top,
                height,
                thickness: plan.config.wall_thickness,
            };
            let Some(pieces) = walls.generate(&request) else {
                continue;
            };

            let wall_node = self
                .scene
                .add_mesh(node, &pieces.wall.name, pieces.wall.mesh, pieces.wall.material);
            let wall_key = self.register(wall_node, EntityType::Wall, &wall_id(&room.id, side), room_key);
            self.summary.walls += 1;

            for detail in pieces.details {
                self.scene
                    .add_mesh(wall_node, &detail.name, detail.mesh, detail.material);
            }
            for leaf in pieces.connections {
                if !placed_connections.insert(leaf.id.clone()) {
                    continue;
                }
                let leaf_node = self.scene.add_mesh(
                    wall_node,
                    &format!("connection {}", leaf.id),
                    leaf.mesh,
                    leaf.material,
                );
                self.register(leaf_node, EntityType::Connection, &leaf.id, wall_key);
                self.summary.connections += 1;
            }
        }
    }

    /// Stairs and lifts; returns the penetrations for the floor above
    fn circulation(&mut self, computer: &PenetrationComputer) -> Vec<Penetration> {
        let floor = self.floor;
        let materials = MaterialSet::new(self.palette, floor_style(self.plan, floor));
        let mut produced = Vec::with_capacity(floor.stairs.len() + floor.lifts.len());

        for stair in &floor.stairs {
            let spec = stair.to_spec();
            let layout = computer.stair_layout(&spec, None, Some(self.height));
            let mesh = stair_mesh(&layout, self.base);
            let node = self
                .scene
                .add_mesh(self.group, &format!("stair {}", stair.id), mesh, materials.stair);
            self.register(node, EntityType::Stair, &stair.id, None);
            self.summary.stairs += 1;
            produced.push(Penetration {
                source: PenetrationSource::Stair(stair.id.clone()),
                bounds: layout.bounds(self.base),
            });
        }

        let thickness = self.plan.config.wall_thickness;
        for lift in &floor.lifts {
            let spec = lift.to_spec();
            let mesh = lift_shaft_mesh(&spec, self.base, self.height, thickness);
            let node = self
                .scene
                .add_mesh(self.group, &format!("lift {}", lift.id), mesh, materials.lift);
            self.register(node, EntityType::Lift, &lift.id, None);
            for (side, panel) in lift_door_panels(&spec, self.base, self.height, thickness) {
                self.scene.add_mesh(
                    node,
                    &format!("lift door {}", side.as_str()),
                    panel,
                    materials.lift_door,
                );
            }
            self.summary.lifts += 1;
            produced.push(computer.lift_penetration(&lift.id, &spec, self.base, self.height));
        }

        self.summary.penetrations = produced.len();
        produced
    }
}

fn positive(v: Option<f64>) -> Option<f64> {
    v.filter(|h| h.is_finite() && *h > 0.0)
}

fn floor_style<'a>(plan: &'a Floorplan, floor: &Floor) -> Option<&'a Style> {
    floor
        .style
        .as_deref()
        .or(plan.config.default_style.as_deref())
        .and_then(|name| plan.style(name))
}

fn room_style<'a>(plan: &'a Floorplan, floor: &Floor, room: &Room) -> Option<&'a Style> {
    room.style
        .as_deref()
        .and_then(|name| plan.style(name))
        .or_else(|| floor_style(plan, floor))
}

/// Floor height: floor, then its style, then the document default
pub fn floor_height(plan: &Floorplan, floor: &Floor) -> f64 {
    positive(floor.height)
        .or_else(|| positive(floor_style(plan, floor).and_then(|s| s.room_height)))
        .or_else(|| positive(Some(plan.config.default_height)))
        .unwrap_or(FALLBACK_HEIGHT)
}

/// Room height: room, floor, style, document default
pub fn room_height(plan: &Floorplan, floor: &Floor, room: &Room) -> f64 {
    positive(room.height)
        .or_else(|| positive(floor.height))
        .or_else(|| positive(room_style(plan, floor, room).and_then(|s| s.room_height)))
        .or_else(|| positive(Some(plan.config.default_height)))
        .unwrap_or(FALLBACK_HEIGHT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntityRef;
    use crate::theme::Theme;
    use approx::assert_relative_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    const STACKED: &str = r#"{
        "floors": [
            {
                "id": "f0",
                "rooms": [{ "id": "hall", "position": [0, 0], "width": 6, "depth": 6 }],
                "stairs": [{ "id": "s1", "position": [1, 1] }],
                "lifts": [{ "id": "l1", "position": [4, 4], "width": 1.5, "depth": 1.5, "doors": ["bottom"] }]
            },
            {
                "id": "f1",
                "rooms": [{ "id": "landing", "position": [0, 0], "width": 6, "depth": 3.5 }]
            }
        ]
    }"#;

    struct Built {
        scene: Scene,
        registry: EntityRegistry,
        layout: FloorLayout,
        report: BuildReport,
    }

    fn build_with(mut pipeline: ScenePipeline, json: &str) -> Built {
        let plan = Floorplan::from_json(json).unwrap();
        let mut scene = Scene::new();
        let mut registry = EntityRegistry::new();
        let mut layout = FloorLayout::new();
        let report = pipeline.build(
            &plan,
            &Theme::Light.palette(),
            BuildTarget {
                scene: &mut scene,
                registry: &mut registry,
                layout: &mut layout,
            },
        );
        Built {
            scene,
            registry,
            layout,
            report,
        }
    }

    fn build(json: &str) -> Built {
        build_with(ScenePipeline::new(&EngineConfig::default()), json)
    }

    fn node_of(built: &Built, r: EntityRef) -> NodeKey {
        let key = built.registry.resolve(&r).unwrap();
        built.registry.get(key).unwrap().node
    }

    #[test]
    fn stairwell_cuts_the_slab_above() {
        let built = build(STACKED);
        let [f0, f1] = &built.report.floors[..] else {
            panic!("two floors expected");
        };
        assert_eq!(f0.penetrations, 2);
        assert_eq!(f0.holes_cut, 0);
        // the stair hole lands inside the landing; the lift at z >= 4 misses it
        assert_eq!(f1.holes_cut, 1);
        assert_relative_eq!(f1.base, 3.0);

        let slab = node_of(&built, EntityRef::new(EntityType::Room, "landing", "f1"));
        let mesh = built.scene.node(slab).unwrap().mesh.as_ref().unwrap();
        // 6 x 3.5 x 0.2 minus a 1.0 x 2.5 stair opening
        assert_relative_eq!(mesh.volume(), 4.2 - 0.5, epsilon = 1e-3);
    }

    #[test]
    fn walls_hang_under_their_room() {
        let built = build(STACKED);
        let room = built
            .registry
            .resolve(&EntityRef::new(EntityType::Room, "hall", "f0"))
            .unwrap();
        assert_eq!(built.registry.children_of(room).len(), 4);
        let wall = built
            .registry
            .resolve(&EntityRef::new(EntityType::Wall, "hall:top", "f0"))
            .unwrap();
        assert_eq!(built.registry.get(wall).unwrap().parent, Some(room));

        // 2 rooms, 8 walls, 1 stair, 1 lift; lift doors stay unregistered
        assert_eq!(built.registry.len(), 12);
        let lift = node_of(&built, EntityRef::new(EntityType::Lift, "l1", "f0"));
        let door = built.scene.node(lift).unwrap().children[0];
        assert_eq!(
            built.registry.find_selectable_ancestor(&built.scene, door),
            built.registry.entity_for_node(lift)
        );
        assert_eq!(built.layout.floors().len(), 2);
    }

    #[test]
    fn heights_follow_priority() {
        let json = r#"{
            "styles": [{ "name": "tall", "roomHeight": 4.0 }],
            "config": { "defaultHeight": 2.5 },
            "floors": [
                {
                    "id": "f0",
                    "style": "tall",
                    "rooms": [
                        { "id": "r1", "position": [0, 0], "width": 2, "depth": 2, "height": 3.3 },
                        { "id": "r2", "position": [10, 0], "width": 2, "depth": 2 }
                    ]
                },
                { "id": "f1", "height": 2.8, "rooms": [{ "id": "r3", "position": [0, 0], "width": 2, "depth": 2 }] },
                { "id": "f2", "rooms": [{ "id": "r4", "position": [0, 0], "width": 2, "depth": 2 }] }
            ]
        }"#;
        let built = build(json);
        let wall_height = |room: &str, floor: &str| {
            let node = node_of(&built, EntityRef::new(EntityType::Wall, format!("{room}:top"), floor));
            built.scene.world_bounds(node).size().y
        };
        assert_relative_eq!(wall_height("r1", "f0"), 3.3, epsilon = 1e-5);
        assert_relative_eq!(wall_height("r2", "f0"), 4.0, epsilon = 1e-5);
        assert_relative_eq!(wall_height("r3", "f1"), 2.8, epsilon = 1e-5);
        assert_relative_eq!(wall_height("r4", "f2"), 2.5, epsilon = 1e-5);

        let bases: Vec<f64> = built.layout.floors().iter().map(|f| f.base).collect();
        assert_eq!(bases.len(), 3);
        assert_relative_eq!(bases[0], 0.0);
        assert_relative_eq!(bases[1], 4.0);
        assert_relative_eq!(bases[2], 6.8, epsilon = 1e-9);
    }

    #[test]
    fn callback_and_registrar_strategies() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let pipeline = ScenePipeline::new(&EngineConfig::default())
            .with_registrar(TypeFilterRegistrar::new([EntityType::Room]))
            .with_floor_callback(move |s| sink.borrow_mut().push(s.floor_id.clone()));

        let built = build_with(pipeline, STACKED);
        assert_eq!(*seen.borrow(), vec!["f0".to_string(), "f1".to_string()]);
        assert_eq!(built.registry.len(), 2);

        // a click on a wall still lands on its room
        let hall = node_of(&built, EntityRef::new(EntityType::Room, "hall", "f0"));
        let wall = built.scene.node(hall).unwrap().children[0];
        assert_eq!(
            built.registry.find_selectable_ancestor(&built.scene, wall),
            built.registry.entity_for_node(hall)
        );
    }
}
