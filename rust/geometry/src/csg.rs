// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CSG (Constructive Solid Geometry) Operations
//!
//! Boolean subtraction through csgrs, with conversion to and from the
//! renderable [`Mesh`] layout.

use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::triangulation::{calculate_polygon_normal, project_to_2d, triangulate_polygon};
use csgrs::mesh::{polygon::Polygon, vertex::Vertex, Mesh as CSGMesh};
use nalgebra::{Point3, Vector3};

/// Relative volume change below which a subtraction counts as a no-op
const VOLUME_EPSILON: f64 = 1e-9;

/// Boolean operations on closed meshes
#[derive(Debug, Clone, Copy)]
pub struct CsgProcessor {
    /// Normals shorter than this are treated as degenerate
    pub epsilon: f64,
}

impl CsgProcessor {
    pub fn new() -> Self {
        Self { epsilon: 1e-10 }
    }

    /// `host - cutter`.
    ///
    /// Errors when the boolean kernel produces nothing usable: an empty
    /// result, non-finite coordinates, or a solid that lost no volume (the
    /// kernel hands back the host untouched when the cutter swallows it).
    pub fn subtract_mesh(&self, host: &Mesh, cutter: &Mesh) -> Result<Mesh> {
        use csgrs::traits::CSG;

        if cutter.is_empty() {
            return Ok(host.clone());
        }
        if host.is_empty() {
            return Err(Error::csg("host mesh is empty"));
        }

        let host_csg = self.mesh_to_csgrs(host)?;
        let cutter_csg = self.mesh_to_csgrs(cutter)?;
        let result = host_csg.difference(&cutter_csg);

        let mesh = self.csgrs_to_mesh(&result)?;
        if mesh.is_empty() {
            return Err(Error::csg("difference produced an empty solid"));
        }
        if !mesh.is_finite() {
            return Err(Error::csg("difference produced non-finite vertices"));
        }
        let before = host.volume();
        if before - mesh.volume() <= VOLUME_EPSILON * before.max(1.0) {
            return Err(Error::csg("difference removed no volume"));
        }
        Ok(mesh)
    }

    /// Convert our Mesh format to csgrs Mesh format
    fn mesh_to_csgrs(&self, mesh: &Mesh) -> Result<CSGMesh<()>> {
        let mut polygons = Vec::with_capacity(mesh.triangle_count());

        for [v0, v1, v2] in mesh.triangles() {
            // Degenerate triangles would poison the BSP with NaN planes
            let Some(face_normal) = (v1 - v0).cross(&(v2 - v0)).try_normalize(self.epsilon) else {
                continue;
            };
            let vertices = vec![
                Vertex::new(v0, face_normal),
                Vertex::new(v1, face_normal),
                Vertex::new(v2, face_normal),
            ];
            polygons.push(Polygon::new(vertices, None));
        }

        if polygons.is_empty() {
            return Err(Error::degenerate("mesh has no non-degenerate triangles"));
        }
        Ok(CSGMesh::from_polygons(&polygons, None))
    }

    /// Convert csgrs Mesh format back to our Mesh format
    fn csgrs_to_mesh(&self, csg_mesh: &CSGMesh<()>) -> Result<Mesh> {
        let mut mesh = Mesh::new();

        for polygon in &csg_mesh.polygons {
            let vertices = &polygon.vertices;
            if vertices.len() < 3 {
                continue;
            }

            let points: Vec<Point3<f64>> = vertices
                .iter()
                .map(|v| Point3::new(v.pos.x, v.pos.y, v.pos.z))
                .collect();

            let raw = Vector3::new(vertices[0].normal.x, vertices[0].normal.y, vertices[0].normal.z);
            let normal = match raw.try_normalize(self.epsilon) {
                Some(n) if n.iter().all(|c| c.is_finite()) => n,
                _ => calculate_polygon_normal(&points),
            };

            let indices = if points.len() == 3 {
                vec![0, 1, 2]
            } else {
                match triangulate_polygon(&project_to_2d(&points, &normal)) {
                    Ok(indices) => indices,
                    Err(_) => continue,
                }
            };

            let base = mesh.vertex_count() as u32;
            for p in &points {
                mesh.add_vertex(*p, normal);
            }
            for tri in indices.chunks_exact(3) {
                mesh.add_triangle(
                    base + tri[0] as u32,
                    base + tri[1] as u32,
                    base + tri[2] as u32,
                );
            }
        }

        Ok(mesh)
    }
}

impl Default for CsgProcessor {
    fn default() -> Self {
        Self::new()
    }
}
