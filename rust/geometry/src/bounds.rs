// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Axis-aligned bounding boxes
//!
//! World space is Y-up; the floorplan plane is X/Z. "Footprint" queries
//! ignore the Y axis.

use nalgebra::{Matrix4, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in f64 precision
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Aabb {
    /// Create a box from two corners (order is normalized)
    pub fn new(a: Point3<f64>, b: Point3<f64>) -> Self {
        Self {
            min: Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// An inverted box that any `expand_point` call replaces
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::MAX, f64::MAX, f64::MAX),
            max: Point3::new(f64::MIN, f64::MIN, f64::MIN),
        }
    }

    /// Box centered on `center` with the given full size
    pub fn from_center_size(center: Point3<f64>, size: Vector3<f64>) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3<f64>>) -> Self {
        let mut aabb = Self::empty();
        for p in points {
            aabb.expand_point(p);
        }
        aabb
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    #[inline]
    pub fn expand_point(&mut self, p: &Point3<f64>) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Aabb {
            min: Point3::new(
                self.min.x.min(other.min.x),
                self.min.y.min(other.min.y),
                self.min.z.min(other.min.z),
            ),
            max: Point3::new(
                self.max.x.max(other.max.x),
                self.max.y.max(other.max.y),
                self.max.z.max(other.max.z),
            ),
        }
    }

    /// Strict overlap test on all three axes (touching faces do not count)
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    /// Strict overlap test on the X/Z plane only
    pub fn intersects_footprint(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    /// Overlapping region, or `None` when the boxes are disjoint
    pub fn intersection(&self, other: &Aabb) -> Option<Aabb> {
        let clipped = Aabb {
            min: Point3::new(
                self.min.x.max(other.min.x),
                self.min.y.max(other.min.y),
                self.min.z.max(other.min.z),
            ),
            max: Point3::new(
                self.max.x.min(other.max.x),
                self.max.y.min(other.max.y),
                self.max.z.min(other.max.z),
            ),
        };
        (!clipped.is_empty()).then_some(clipped)
    }

    #[inline]
    pub fn size(&self) -> Vector3<f64> {
        if self.is_empty() {
            return Vector3::zeros();
        }
        self.max - self.min
    }

    #[inline]
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Largest of the three extents
    pub fn max_dimension(&self) -> f64 {
        let s = self.size();
        s.x.max(s.y).max(s.z)
    }

    pub fn volume(&self) -> f64 {
        let s = self.size();
        s.x * s.y * s.z
    }

    pub fn contains_point(&self, p: &Point3<f64>) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// The 8 corners, bottom face first
    pub fn corners(&self) -> [Point3<f64>; 8] {
        let (a, b) = (self.min, self.max);
        [
            Point3::new(a.x, a.y, a.z),
            Point3::new(b.x, a.y, a.z),
            Point3::new(b.x, a.y, b.z),
            Point3::new(a.x, a.y, b.z),
            Point3::new(a.x, b.y, a.z),
            Point3::new(b.x, b.y, a.z),
            Point3::new(b.x, b.y, b.z),
            Point3::new(a.x, b.y, b.z),
        ]
    }

    /// Bound of this box after an affine transform
    pub fn transformed(&self, transform: &Matrix4<f64>) -> Aabb {
        if self.is_empty() {
            return *self;
        }
        let corners = self.corners().map(|c| transform.transform_point(&c));
        Aabb::from_points(corners.iter())
    }

    /// Grow every face outward by `margin`
    pub fn inflated(&self, margin: f64) -> Aabb {
        let m = Vector3::new(margin, margin, margin);
        Aabb {
            min: self.min - m,
            max: self.max + m,
        }
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit() -> Aabb {
        Aabb::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn test_empty_box_union() {
        let empty = Aabb::empty();
        assert!(empty.is_empty());
        assert_eq!(empty.union(&unit()), unit());
        assert_eq!(empty.size(), Vector3::zeros());
    }

    #[test]
    fn test_new_normalizes_corners() {
        let b = Aabb::new(Point3::new(2.0, 0.0, -1.0), Point3::new(0.0, 3.0, 1.0));
        assert_eq!(b.min, Point3::new(0.0, 0.0, -1.0));
        assert_eq!(b.max, Point3::new(2.0, 3.0, 1.0));
    }

    #[test]
    fn test_touching_boxes_do_not_intersect() {
        let a = unit();
        let b = Aabb::new(Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 1.0, 1.0));
        assert!(!a.intersects(&b));
        assert!(!a.intersects_footprint(&b));
    }

    #[test]
    fn test_footprint_ignores_height() {
        let floor = Aabb::new(Point3::new(0.0, 2.8, 0.0), Point3::new(4.0, 3.0, 4.0));
        let shaft = Aabb::new(Point3::new(1.0, 0.0, 1.0), Point3::new(2.0, 1.0, 2.0));
        assert!(!floor.intersects(&shaft));
        assert!(floor.intersects_footprint(&shaft));
    }

    #[test]
    fn test_intersection_region() {
        let a = Aabb::new(Point3::origin(), Point3::new(4.0, 1.0, 4.0));
        let b = Aabb::new(Point3::new(3.0, 0.0, 3.0), Point3::new(6.0, 1.0, 6.0));
        let i = a.intersection(&b).unwrap();
        assert_relative_eq!(i.size().x, 1.0);
        assert_relative_eq!(i.size().z, 1.0);
    }

    #[test]
    fn test_transformed_rotation() {
        let b = Aabb::new(Point3::origin(), Point3::new(2.0, 1.0, 1.0));
        let rot = Matrix4::from_axis_angle(&Vector3::y_axis(), std::f64::consts::FRAC_PI_2);
        let r = b.transformed(&rot);
        assert_relative_eq!(r.size().x, 1.0, epsilon = 1e-9);
        assert_relative_eq!(r.size().z, 2.0, epsilon = 1e-9);
    }
}
