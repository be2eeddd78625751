// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Stair and lift shaft meshes

use crate::bounds::Aabb;
use crate::elements::{LiftSpec, PlanDirection};
use crate::mesh::Mesh;
use crate::penetration::StairLayout;
use crate::shapes::{box_mesh, oriented_box_mesh};
use crate::transform::LocalFrame;
use nalgebra::{Matrix4, Point2, Point3, Vector3};
use std::f64::consts::TAU;

const LANDING_THICKNESS: f64 = 0.15;
const SPIRAL_COLUMN_RADIUS: f64 = 0.1;
const LIFT_DOOR_WIDTH: f64 = 0.9;
const LIFT_DOOR_HEIGHT: f64 = 2.1;

/// Steps and landings of a laid-out stair standing on `base`
pub fn stair_mesh(layout: &StairLayout, base: f64) -> Mesh {
    let mut mesh = Mesh::new();
    let h = layout.step_height;

    for flight in &layout.flights {
        let heading = flight.forward.y.atan2(flight.forward.x);
        for k in 0..flight.steps {
            let level = (flight.first_step + k) as f64;
            let center = flight.start + flight.forward * ((k as f64 + 0.5) * layout.tread);
            mesh.merge(&oriented_box_mesh(
                &placed(center, base + (level + 0.5) * h, heading),
                Vector3::new(layout.tread / 2.0, h / 2.0, flight.width / 2.0),
            ));
        }
    }

    for landing in &layout.landings {
        let top = base + landing.level as f64 * h;
        let thickness = LANDING_THICKNESS.min(h).max(0.01);
        mesh.merge(&box_mesh(&Aabb::new(
            Point3::new(landing.min.x, top - thickness, landing.min.y),
            Point3::new(landing.max.x, top, landing.max.y),
        )));
    }

    if let Some(spiral) = &layout.spiral {
        let c = spiral.center;
        let r = SPIRAL_COLUMN_RADIUS;
        mesh.merge(&box_mesh(&Aabb::new(
            Point3::new(c.x - r, base, c.y - r),
            Point3::new(c.x + r, base + layout.rise, c.y + r),
        )));

        // One full revolution; each tread is a plank from the column out
        let steps = layout.total_steps.max(1);
        let reach = spiral.outer_radius * 0.95 - r;
        let half_arc = (TAU * spiral.outer_radius / steps as f64 / 2.0).min(reach / 2.0);
        for k in 0..steps {
            let angle = k as f64 * TAU / steps as f64;
            let center = LocalFrame::new(c, angle).to_world(Point2::new(r + reach / 2.0, 0.0));
            mesh.merge(&oriented_box_mesh(
                &placed(center, base + (k as f64 + 0.5) * h, angle),
                Vector3::new(reach / 2.0, h / 2.0, half_arc),
            ));
        }
    }

    mesh
}

/// Transform placing local +X along `heading` at a plan point and height
fn placed(center: Point2<f64>, y: f64, heading: f64) -> Matrix4<f64> {
    Matrix4::new_translation(&Vector3::new(0.0, y, 0.0)) * LocalFrame::new(center, heading).to_matrix()
}

/// Shaft walls around a lift, with a door gap on each door side
pub fn lift_shaft_mesh(lift: &LiftSpec, base: f64, height: f64, wall_thickness: f64) -> Mesh {
    let mut mesh = Mesh::new();
    let top = base + height;

    for side in PlanDirection::ALL {
        let wall = ShaftWall::new(lift, wall_thickness, side);
        let mut pieces: Vec<((f64, f64), (f64, f64))> = Vec::with_capacity(3);
        match wall.door_gap(lift) {
            Some((d0, d1)) => {
                let lintel = (base + LIFT_DOOR_HEIGHT).min(top);
                pieces.push(((wall.along.0, d0), (base, top)));
                pieces.push(((d1, wall.along.1), (base, top)));
                if lintel < top {
                    pieces.push(((d0, d1), (lintel, top)));
                }
            }
            None => pieces.push((wall.along, (base, top))),
        }

        for (along, (y0, y1)) in pieces {
            if along.1 - along.0 <= 1e-9 {
                continue;
            }
            mesh.merge(&box_mesh(&wall.aabb(wall.across, along, (y0, y1))));
        }
    }

    mesh
}

/// Closed door leaves filling each door gap, one mesh per door side
pub fn lift_door_panels(
    lift: &LiftSpec,
    base: f64,
    height: f64,
    wall_thickness: f64,
) -> Vec<(PlanDirection, Mesh)> {
    let top = (base + LIFT_DOOR_HEIGHT).min(base + height);
    PlanDirection::ALL
        .into_iter()
        .filter_map(|side| {
            let wall = ShaftWall::new(lift, wall_thickness, side);
            let gap = wall.door_gap(lift)?;
            // a third of the wall thickness, on the wall's center line
            let mid = (wall.across.0 + wall.across.1) / 2.0;
            let half = wall_thickness / 6.0;
            let panel = wall.aabb((mid - half, mid + half), gap, (base, top));
            Some((side, box_mesh(&panel)))
        })
        .collect()
}

/// One side of a lift shaft in plan
struct ShaftWall {
    /// Range on the wall-normal axis
    across: (f64, f64),
    /// Range along the wall
    along: (f64, f64),
    runs_along_x: bool,
    side: PlanDirection,
}

impl ShaftWall {
    fn new(lift: &LiftSpec, t: f64, side: PlanDirection) -> Self {
        let (x0, z0) = (lift.position.x, lift.position.y);
        let (x1, z1) = (x0 + lift.width, z0 + lift.depth);
        let (across, along, runs_along_x) = match side {
            PlanDirection::Top => ((z0, z0 + t), (x0, x1), true),
            PlanDirection::Bottom => ((z1 - t, z1), (x0, x1), true),
            PlanDirection::Left => ((x0, x0 + t), (z0 + t, z1 - t), false),
            PlanDirection::Right => ((x1 - t, x1), (z0 + t, z1 - t), false),
        };
        Self {
            across,
            along,
            runs_along_x,
            side,
        }
    }

    fn door_gap(&self, lift: &LiftSpec) -> Option<(f64, f64)> {
        let length = self.along.1 - self.along.0;
        if !lift.doors.contains(&self.side) || length <= 0.0 {
            return None;
        }
        let door = LIFT_DOOR_WIDTH.min(length * 0.8);
        let mid = (self.along.0 + self.along.1) / 2.0;
        Some((mid - door / 2.0, mid + door / 2.0))
    }

    fn aabb(&self, across: (f64, f64), along: (f64, f64), y: (f64, f64)) -> Aabb {
        if self.runs_along_x {
            Aabb::new(Point3::new(along.0, y.0, across.0), Point3::new(along.1, y.1, across.1))
        } else {
            Aabb::new(Point3::new(across.0, y.0, along.0), Point3::new(across.1, y.1, along.1))
        }
    }
}
