// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Floorplan Geometry
//!
//! Mesh primitives, stair and lift layouts, penetration volumes and slab
//! perforation for floorplan scenes. Boolean work goes through csgrs,
//! polygon triangulation through earcutr and all math through nalgebra.
//!
//! World space is Y-up; plan coordinates `(x, z)` lie on the ground plane.

pub mod bounds;
pub mod circulation;
pub mod csg;
pub mod elements;
pub mod error;
pub mod floor_cutter;
pub mod mesh;
pub mod penetration;
pub mod ray;
pub mod shapes;
pub mod transform;
pub mod triangulation;

// Re-export nalgebra types for convenience
pub use nalgebra::{Matrix4, Point2, Point3, Vector2, Vector3};

pub use bounds::Aabb;
pub use circulation::{lift_door_panels, lift_shaft_mesh, stair_mesh};
pub use csg::CsgProcessor;
pub use elements::{
    LiftSpec, PlanDirection, StairSegment, StairShape, StairSpec, TurnDirection, DEFAULT_RISE,
    DEFAULT_RISER, DEFAULT_STAIR_WIDTH, DEFAULT_TREAD,
};
pub use error::{Error, Result};
pub use floor_cutter::{CutResult, FloorCutter};
pub use mesh::Mesh;
pub use penetration::{Penetration, PenetrationComputer, PenetrationSource, StairLayout};
pub use ray::{ray_aabb, ray_triangle, Ray};
pub use shapes::{box_mesh, oriented_box_mesh};
pub use transform::LocalFrame;
pub use triangulation::triangulate_polygon;
