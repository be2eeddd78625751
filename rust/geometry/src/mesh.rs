// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh data structures

use crate::bounds::Aabb;
use crate::ray::{ray_aabb, ray_triangle, Ray};
use nalgebra::{Matrix3, Matrix4, Point3, Vector3};

/// Triangle mesh in the layout renderers consume directly
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// Vertex positions (x, y, z)
    pub positions: Vec<f32>,
    /// Vertex normals (nx, ny, nz)
    pub normals: Vec<f32>,
    /// Triangle indices (i0, i1, i2)
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            positions: Vec::new(),
            normals: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Create a mesh with capacity
    pub fn with_capacity(vertex_count: usize, index_count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertex_count * 3),
            normals: Vec::with_capacity(vertex_count * 3),
            indices: Vec::with_capacity(index_count),
        }
    }

    /// Add a vertex with normal
    #[inline]
    pub fn add_vertex(&mut self, position: Point3<f64>, normal: Vector3<f64>) {
        self.positions
            .extend_from_slice(&[position.x as f32, position.y as f32, position.z as f32]);
        self.normals
            .extend_from_slice(&[normal.x as f32, normal.y as f32, normal.z as f32]);
    }

    /// Add a triangle
    #[inline]
    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.indices.extend_from_slice(&[i0, i1, i2]);
    }

    /// Append a flat-shaded triangle with its own three vertices
    pub fn push_flat_triangle(&mut self, v0: Point3<f64>, v1: Point3<f64>, v2: Point3<f64>) {
        let normal = match (v1 - v0).cross(&(v2 - v0)).try_normalize(1e-12) {
            Some(n) => n,
            None => return,
        };
        let base = self.vertex_count() as u32;
        self.add_vertex(v0, normal);
        self.add_vertex(v1, normal);
        self.add_vertex(v2, normal);
        self.add_triangle(base, base + 1, base + 2);
    }

    /// Merge another mesh into this one
    pub fn merge(&mut self, other: &Mesh) {
        if other.is_empty() {
            return;
        }

        let vertex_offset = self.vertex_count() as u32;
        self.positions.extend_from_slice(&other.positions);
        self.normals.extend_from_slice(&other.normals);
        self.indices
            .extend(other.indices.iter().map(|&i| i + vertex_offset));
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    #[inline]
    pub fn vertex(&self, index: usize) -> Point3<f64> {
        Point3::new(
            self.positions[index * 3] as f64,
            self.positions[index * 3 + 1] as f64,
            self.positions[index * 3 + 2] as f64,
        )
    }

    /// Iterate triangles as f64 corner triples
    pub fn triangles(&self) -> impl Iterator<Item = [Point3<f64>; 3]> + '_ {
        self.indices.chunks_exact(3).map(move |tri| {
            [
                self.vertex(tri[0] as usize),
                self.vertex(tri[1] as usize),
                self.vertex(tri[2] as usize),
            ]
        })
    }

    /// Bounding box of all vertices (empty box for an empty mesh)
    pub fn bounds(&self) -> Aabb {
        let mut aabb = Aabb::empty();
        for chunk in self.positions.chunks_exact(3) {
            aabb.expand_point(&Point3::new(chunk[0] as f64, chunk[1] as f64, chunk[2] as f64));
        }
        aabb
    }

    /// Enclosed volume via the divergence theorem; only meaningful for
    /// closed, consistently wound meshes.
    pub fn volume(&self) -> f64 {
        self.triangles()
            .map(|[a, b, c]| a.coords.dot(&b.coords.cross(&c.coords)) / 6.0)
            .sum::<f64>()
            .abs()
    }

    /// Copy of this mesh with positions and normals transformed
    pub fn transformed(&self, transform: &Matrix4<f64>) -> Mesh {
        let mut out = self.clone();
        out.apply_transform(transform);
        out
    }

    /// Transform positions and normals in place
    pub fn apply_transform(&mut self, transform: &Matrix4<f64>) {
        let linear: Matrix3<f64> = transform.fixed_view::<3, 3>(0, 0).into_owned();
        let normal_matrix = linear
            .try_inverse()
            .map(|m| m.transpose())
            .unwrap_or_else(Matrix3::identity);

        for chunk in self.positions.chunks_exact_mut(3) {
            let p = transform.transform_point(&Point3::new(
                chunk[0] as f64,
                chunk[1] as f64,
                chunk[2] as f64,
            ));
            chunk[0] = p.x as f32;
            chunk[1] = p.y as f32;
            chunk[2] = p.z as f32;
        }

        for chunk in self.normals.chunks_exact_mut(3) {
            let n = normal_matrix * Vector3::new(chunk[0] as f64, chunk[1] as f64, chunk[2] as f64);
            let n = n.try_normalize(1e-12).unwrap_or(n);
            chunk[0] = n.x as f32;
            chunk[1] = n.y as f32;
            chunk[2] = n.z as f32;
        }
    }

    /// True when every coordinate is finite
    pub fn is_finite(&self) -> bool {
        self.positions.iter().all(|v| v.is_finite())
    }

    /// Nearest hit distance of `ray` against this mesh's triangles
    pub fn raycast(&self, ray: &Ray) -> Option<f64> {
        ray_aabb(ray, &self.bounds().inflated(1e-6))?;
        self.triangles()
            .filter_map(|[a, b, c]| ray_triangle(ray, &a, &b, &c))
            .min_by(|a, b| a.total_cmp(b))
    }

    /// Clear the mesh
    #[inline]
    pub fn clear(&mut self) {
        self.positions.clear();
        self.normals.clear();
        self.indices.clear();
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::box_mesh;
    use approx::assert_relative_eq;

    #[test]
    fn test_mesh_creation() {
        let mesh = Mesh::new();
        assert!(mesh.is_empty());
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.triangle_count(), 0);
        assert!(mesh.bounds().is_empty());
    }

    #[test]
    fn test_merge_offsets_indices() {
        let mut a = Mesh::new();
        a.push_flat_triangle(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        );
        let b = a.clone();
        a.merge(&b);
        assert_eq!(a.vertex_count(), 6);
        assert_eq!(&a.indices[3..], &[3, 4, 5]);
    }

    #[test]
    fn test_degenerate_triangle_skipped() {
        let mut mesh = Mesh::new();
        let p = Point3::new(1.0, 1.0, 1.0);
        mesh.push_flat_triangle(p, p, p);
        assert!(mesh.is_empty());
    }

    #[test]
    fn test_box_volume() {
        let mesh = box_mesh(&Aabb::new(Point3::origin(), Point3::new(2.0, 3.0, 4.0)));
        assert_relative_eq!(mesh.volume(), 24.0, epsilon = 1e-4);
    }

    #[test]
    fn test_transform_moves_bounds() {
        let mesh = box_mesh(&Aabb::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0)));
        let moved = mesh.transformed(&Matrix4::new_translation(&Vector3::new(5.0, 0.0, 0.0)));
        assert_relative_eq!(moved.bounds().min.x, 5.0, epsilon = 1e-6);
        assert_relative_eq!(moved.volume(), 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_raycast_nearest_face() {
        let mesh = box_mesh(&Aabb::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0)));
        let ray = Ray::new(Point3::new(0.0, 10.0, 0.0), Vector3::new(0.0, -1.0, 0.0));
        assert_relative_eq!(mesh.raycast(&ray).unwrap(), 9.0, epsilon = 1e-6);
    }
}
