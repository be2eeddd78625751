// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use approx::assert_relative_eq;
use floorplan_geometry::{
    box_mesh, Aabb, FloorCutter, PenetrationComputer, Point2, Point3, StairSpec,
};

fn slab(x: f64, z: f64, w: f64, d: f64, top: f64) -> Aabb {
    Aabb::new(Point3::new(x, top - 0.2, z), Point3::new(x + w, top, z + d))
}

#[test]
fn slab_without_overlap_matches_naive_box() {
    let computer = PenetrationComputer::new();
    let stair = StairSpec::straight(Point2::new(20.0, 20.0));
    let pen = computer.stair_penetration("st", &stair, 0.0, None, Some(3.0));

    let room = slab(0.0, 0.0, 6.0, 5.0, 3.0);
    let out = FloorCutter::default().cut(&room, &[pen]);

    let naive = box_mesh(&room);
    assert_eq!(out.holes_cut, 0);
    assert_eq!(out.mesh.bounds(), naive.bounds());
    assert_relative_eq!(out.mesh.volume(), naive.volume(), epsilon = 1e-6);
}

#[test]
fn stairwell_is_cut_from_the_floor_above() {
    let computer = PenetrationComputer::new();
    let stair = StairSpec::straight(Point2::new(1.0, 0.5));
    let pen = computer.stair_penetration("st", &stair, 0.0, None, Some(3.0));

    let room = slab(0.0, 0.0, 6.0, 6.0, 3.0);
    let out = FloorCutter::default().cut(&room, &[pen]);

    assert_eq!(out.holes_cut, 1);
    assert!(out.mesh.is_finite());
    let expected = 6.0 * 6.0 * 0.2 - 1.0 * 4.76 * 0.2;
    assert_relative_eq!(out.mesh.volume(), expected, epsilon = 1e-3);
}
