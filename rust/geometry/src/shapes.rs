// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Primitive mesh builders

use crate::bounds::Aabb;
use crate::mesh::Mesh;
use nalgebra::{Matrix4, Point3, Vector3};

/// Closed box with 12 outward-facing triangles (2 per face)
pub fn box_mesh(aabb: &Aabb) -> Mesh {
    let mut mesh = Mesh::with_capacity(24, 36);
    if aabb.is_empty() {
        return mesh;
    }

    let (a, b) = (aabb.min, aabb.max);
    // (normal, four corners counter-clockwise seen from outside)
    let faces: [(Vector3<f64>, [Point3<f64>; 4]); 6] = [
        (
            -Vector3::x(),
            [
                Point3::new(a.x, a.y, a.z),
                Point3::new(a.x, a.y, b.z),
                Point3::new(a.x, b.y, b.z),
                Point3::new(a.x, b.y, a.z),
            ],
        ),
        (
            Vector3::x(),
            [
                Point3::new(b.x, a.y, b.z),
                Point3::new(b.x, a.y, a.z),
                Point3::new(b.x, b.y, a.z),
                Point3::new(b.x, b.y, b.z),
            ],
        ),
        (
            -Vector3::y(),
            [
                Point3::new(a.x, a.y, a.z),
                Point3::new(b.x, a.y, a.z),
                Point3::new(b.x, a.y, b.z),
                Point3::new(a.x, a.y, b.z),
            ],
        ),
        (
            Vector3::y(),
            [
                Point3::new(a.x, b.y, b.z),
                Point3::new(b.x, b.y, b.z),
                Point3::new(b.x, b.y, a.z),
                Point3::new(a.x, b.y, a.z),
            ],
        ),
        (
            -Vector3::z(),
            [
                Point3::new(b.x, a.y, a.z),
                Point3::new(a.x, a.y, a.z),
                Point3::new(a.x, b.y, a.z),
                Point3::new(b.x, b.y, a.z),
            ],
        ),
        (
            Vector3::z(),
            [
                Point3::new(a.x, a.y, b.z),
                Point3::new(b.x, a.y, b.z),
                Point3::new(b.x, b.y, b.z),
                Point3::new(a.x, b.y, b.z),
            ],
        ),
    ];

    for (normal, quad) in faces {
        let base = mesh.vertex_count() as u32;
        for corner in quad {
            mesh.add_vertex(corner, normal);
        }
        mesh.add_triangle(base, base + 1, base + 2);
        mesh.add_triangle(base, base + 2, base + 3);
    }

    mesh
}

/// Box of the given half extents centered on the origin of `transform`
pub fn oriented_box_mesh(transform: &Matrix4<f64>, half_extents: Vector3<f64>) -> Mesh {
    let local = Aabb::new(Point3::from(-half_extents), Point3::from(half_extents));
    box_mesh(&local).transformed(transform)
}
