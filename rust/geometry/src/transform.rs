// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Local ↔ world frame transforms for plan-space geometry
//!
//! Plan coordinates `(u, v)` live on the world X/Z plane. A [`LocalFrame`]
//! places a local plan frame at an origin with a rotation about +Y, where a
//! positive angle turns +X toward +Z.

use nalgebra::{Matrix4, Point2, Point3, Vector2};

/// Rigid 2D frame on the floor plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalFrame {
    /// World X/Z position of the local origin
    pub origin: Point2<f64>,
    /// Rotation in radians
    pub angle: f64,
}

impl LocalFrame {
    pub fn new(origin: Point2<f64>, angle: f64) -> Self {
        Self { origin, angle }
    }

    pub fn identity() -> Self {
        Self::new(Point2::origin(), 0.0)
    }

    /// Rotate a plan-space vector by this frame's angle
    #[inline]
    pub fn rotate(&self, v: Vector2<f64>) -> Vector2<f64> {
        let (sin, cos) = self.angle.sin_cos();
        Vector2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
    }

    /// Local plan point → world plan point
    #[inline]
    pub fn to_world(&self, local: Point2<f64>) -> Point2<f64> {
        self.origin + self.rotate(local.coords)
    }

    /// World plan point → local plan point
    #[inline]
    pub fn to_local(&self, world: Point2<f64>) -> Point2<f64> {
        let d = world - self.origin;
        let (sin, cos) = self.angle.sin_cos();
        Point2::new(d.x * cos + d.y * sin, -d.x * sin + d.y * cos)
    }

    /// Local plan point at height `y` → world 3D point
    #[inline]
    pub fn to_world_3d(&self, local: Point2<f64>, y: f64) -> Point3<f64> {
        let p = self.to_world(local);
        Point3::new(p.x, y, p.y)
    }

    /// Equivalent 4x4 transform, mapping local (u, y, v) to world (x, y, z)
    pub fn to_matrix(&self) -> Matrix4<f64> {
        let (sin, cos) = self.angle.sin_cos();
        #[rustfmt::skip]
        let m = Matrix4::new(
            cos, 0.0, -sin, self.origin.x,
            0.0, 1.0, 0.0,  0.0,
            sin, 0.0, cos,  self.origin.y,
            0.0, 0.0, 0.0,  1.0,
        );
        m
    }
}

impl Default for LocalFrame {
    fn default() -> Self {
        Self::identity()
    }
}

/// Plan position `(x, z)` lifted to a world point at height `y`
#[inline]
pub fn plan_to_world(plan: Point2<f64>, y: f64) -> Point3<f64> {
    Point3::new(plan.x, y, plan.y)
}

/// Translation-only world transform
#[inline]
pub fn translation(x: f64, y: f64, z: f64) -> Matrix4<f64> {
    Matrix4::new_translation(&nalgebra::Vector3::new(x, y, z))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_round_trip() {
        let frame = LocalFrame::new(Point2::new(3.0, -2.0), 0.7);
        let p = Point2::new(1.5, 4.0);
        let back = frame.to_local(frame.to_world(p));
        assert_relative_eq!(back.x, p.x, epsilon = 1e-12);
        assert_relative_eq!(back.y, p.y, epsilon = 1e-12);
    }

    #[test]
    fn test_quarter_turn_maps_x_to_z() {
        let frame = LocalFrame::new(Point2::origin(), FRAC_PI_2);
        let p = frame.to_world(Point2::new(1.0, 0.0));
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_matrix_agrees_with_point_mapping() {
        let frame = LocalFrame::new(Point2::new(2.0, 5.0), -FRAC_PI_2);
        let local = Point2::new(0.5, 1.5);
        let expected = frame.to_world_3d(local, 1.0);
        let actual = frame
            .to_matrix()
            .transform_point(&Point3::new(local.x, 1.0, local.y));
        assert_relative_eq!(actual, expected, epsilon = 1e-12);
    }
}
