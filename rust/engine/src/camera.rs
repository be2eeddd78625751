// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Camera director.
//!
//! Owns a perspective and an orthographic camera that orbit the same
//! target, converts between them without a visible jump in scale, and
//! animates framing moves.

use floorplan_geometry::{Aabb, Matrix4, Point2, Point3, Ray, Vector3};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraMode {
    #[default]
    Perspective,
    Orthographic,
}

#[derive(Debug, Clone, Copy)]
struct Tween {
    from_position: Point3<f64>,
    from_target: Point3<f64>,
    to_position: Point3<f64>,
    to_target: Point3<f64>,
    elapsed: f64,
    duration: f64,
}

/// `1 - (1 - t)^3`
pub fn ease_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// Pixel position → normalized device coordinates (y up)
pub fn screen_to_ndc(x: f64, y: f64, width: f64, height: f64) -> Point2<f64> {
    let w = width.max(1.0);
    let h = height.max(1.0);
    Point2::new(x / w * 2.0 - 1.0, 1.0 - y / h * 2.0)
}

#[derive(Debug, Clone)]
pub struct CameraDirector {
    mode: CameraMode,
    position: Point3<f64>,
    target: Point3<f64>,
    /// Vertical field of view, radians
    fov: f64,
    aspect: f64,
    near: f64,
    far: f64,
    /// Orthographic frustum half height at zoom 1
    half_height: f64,
    zoom: f64,
    orbit_enabled: bool,
    tween_duration: f64,
    tween: Option<Tween>,
}

impl CameraDirector {
    pub fn new(config: &EngineConfig) -> Self {
        let mut camera = Self {
            mode: CameraMode::Perspective,
            position: Point3::new(0.0, 20.0, 20.0),
            target: Point3::origin(),
            fov: config.fov_degrees.clamp(1.0, 179.0).to_radians(),
            aspect: 1.0,
            near: config.near,
            far: config.far,
            half_height: 1.0,
            zoom: 1.0,
            orbit_enabled: true,
            tween_duration: config.tween_duration.max(0.0),
            tween: None,
        };
        camera.derive_ortho_frustum();
        if config.camera_mode == CameraMode::Orthographic {
            camera.switch_to_orthographic();
        }
        camera
    }

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    pub fn position(&self) -> Point3<f64> {
        self.position
    }

    pub fn target(&self) -> Point3<f64> {
        self.target
    }

    pub fn distance(&self) -> f64 {
        (self.position - self.target).norm()
    }

    pub fn fov(&self) -> f64 {
        self.fov
    }

    pub fn aspect(&self) -> f64 {
        self.aspect
    }

    /// Effective orthographic half height (zoom applied)
    pub fn ortho_half_height(&self) -> f64 {
        self.half_height / self.zoom
    }

    pub fn orbit_enabled(&self) -> bool {
        self.orbit_enabled
    }

    pub fn set_orbit_enabled(&mut self, enabled: bool) {
        self.orbit_enabled = enabled;
    }

    pub fn is_animating(&self) -> bool {
        self.tween.is_some()
    }

    /// Place the camera directly, cancelling any tween
    pub fn look_at(&mut self, position: Point3<f64>, target: Point3<f64>) {
        self.tween = None;
        self.position = position;
        self.target = target;
        if self.mode == CameraMode::Orthographic {
            self.derive_ortho_frustum();
        }
    }

    /// Orthographic zoom factor (orbit-control dolly in ortho mode)
    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom.is_finite() && zoom > 0.0 {
            self.zoom = zoom;
        }
    }

    pub fn set_aspect(&mut self, aspect: f64) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    /// Switch to orthographic, keeping the apparent size at the target.
    pub fn switch_to_orthographic(&mut self) {
        if self.mode == CameraMode::Orthographic {
            return;
        }
        self.zoom = 1.0;
        self.derive_ortho_frustum();
        self.mode = CameraMode::Orthographic;
    }

    /// Switch to perspective, re-deriving distance from the frustum height.
    pub fn switch_to_perspective(&mut self) {
        if self.mode == CameraMode::Perspective {
            return;
        }
        let distance = self.ortho_half_height() / (self.fov / 2.0).tan();
        self.position = self.target + self.view_direction() * distance;
        self.zoom = 1.0;
        self.mode = CameraMode::Perspective;
    }

    pub fn toggle_mode(&mut self) -> CameraMode {
        match self.mode {
            CameraMode::Perspective => self.switch_to_orthographic(),
            CameraMode::Orthographic => self.switch_to_perspective(),
        }
        self.mode
    }

    /// Frame the union of `boxes`. Returns false when there is nothing to
    /// frame.
    ///
    /// The camera keeps its current bearing and eases toward the new
    /// position; a second call replaces an unfinished move.
    pub fn focus_on_objects(&mut self, boxes: &[Aabb], padding: f64) -> bool {
        let bounds = boxes.iter().fold(Aabb::empty(), |acc, b| acc.union(b));
        if bounds.is_empty() {
            return false;
        }

        let center = bounds.center();
        let max_dim = bounds.max_dimension().max(1e-3);
        let distance = max_dim * padding / (2.0 * (self.effective_fov() / 2.0).tan());
        let to_position = center + self.view_direction() * distance;

        tracing::debug!(distance, ?center, "focus");
        self.zoom = 1.0;
        if self.tween_duration <= 0.0 {
            self.position = to_position;
            self.target = center;
            self.derive_ortho_frustum();
            self.tween = None;
            return true;
        }

        self.tween = Some(Tween {
            from_position: self.position,
            from_target: self.target,
            to_position,
            to_target: center,
            elapsed: 0.0,
            duration: self.tween_duration,
        });
        true
    }

    /// Advance the focus animation by `dt` seconds. Returns true while a
    /// tween is still running.
    pub fn update(&mut self, dt: f64) -> bool {
        let Some(mut tween) = self.tween else {
            return false;
        };

        tween.elapsed += dt.max(0.0);
        let t = (tween.elapsed / tween.duration).min(1.0);
        let e = ease_out_cubic(t);
        self.position = tween.from_position + (tween.to_position - tween.from_position) * e;
        self.target = tween.from_target + (tween.to_target - tween.from_target) * e;
        self.derive_ortho_frustum();

        if t >= 1.0 {
            self.tween = None;
            false
        } else {
            self.tween = Some(tween);
            true
        }
    }

    pub fn view_matrix(&self) -> Matrix4<f64> {
        let forward = self.target - self.position;
        let steep = forward
            .try_normalize(1e-12)
            .map_or(false, |f| f.y.abs() > 0.999);
        let up = if steep {
            -Vector3::z()
        } else {
            Vector3::y()
        };
        Matrix4::look_at_rh(&self.position, &self.target, &up)
    }

    pub fn projection_matrix(&self) -> Matrix4<f64> {
        match self.mode {
            CameraMode::Perspective => {
                Matrix4::new_perspective(self.aspect, self.fov, self.near, self.far)
            }
            CameraMode::Orthographic => {
                let hh = self.ortho_half_height();
                let hw = hh * self.aspect;
                Matrix4::new_orthographic(-hw, hw, -hh, hh, self.near, self.far)
            }
        }
    }

    pub fn view_projection(&self) -> Matrix4<f64> {
        self.projection_matrix() * self.view_matrix()
    }

    /// Picking ray through an NDC position
    pub fn ray_from_screen(&self, ndc: Point2<f64>) -> Ray {
        let inverse = self
            .view_projection()
            .try_inverse()
            .unwrap_or_else(Matrix4::identity);
        let near = inverse.transform_point(&Point3::new(ndc.x, ndc.y, -1.0));
        let far = inverse.transform_point(&Point3::new(ndc.x, ndc.y, 1.0));
        Ray::new(near, far - near)
    }

    /// NDC of a world point, or `None` when it lies behind the camera
    pub fn project_to_ndc(&self, point: &Point3<f64>) -> Option<Point2<f64>> {
        let view = self.view_matrix().transform_point(point);
        if view.z >= 0.0 {
            return None;
        }
        let clip = self.projection_matrix().transform_point(&view);
        Some(Point2::new(clip.x, clip.y))
    }

    /// Unit vector from target to camera
    fn view_direction(&self) -> Vector3<f64> {
        (self.position - self.target)
            .try_normalize(1e-9)
            .unwrap_or_else(|| Vector3::new(0.0, 1.0, 1.0).normalize())
    }

    /// Narrower of the vertical and horizontal field of view
    fn effective_fov(&self) -> f64 {
        let horizontal = 2.0 * ((self.fov / 2.0).tan() * self.aspect).atan();
        self.fov.min(horizontal)
    }

    fn derive_ortho_frustum(&mut self) {
        self.half_height = (self.distance() * (self.fov / 2.0).tan()).max(1e-6);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn director() -> CameraDirector {
        CameraDirector::new(&EngineConfig::default())
    }

    #[test]
    fn ease_curve_endpoints() {
        assert_relative_eq!(ease_out_cubic(0.0), 0.0);
        assert_relative_eq!(ease_out_cubic(1.0), 1.0);
        assert_relative_eq!(ease_out_cubic(0.5), 0.875);
    }

    #[test]
    fn ortho_keeps_apparent_scale() {
        let mut cam = director();
        let d = cam.distance();
        cam.switch_to_orthographic();
        assert_relative_eq!(
            cam.ortho_half_height(),
            d * (37.5f64).to_radians().tan(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn tween_reaches_target_and_stops() {
        let mut cam = director();
        let b = Aabb::new(Point3::new(10.0, 0.0, 10.0), Point3::new(12.0, 2.0, 12.0));
        assert!(cam.focus_on_objects(&[b], 1.6));
        assert!(cam.update(0.3));
        assert!(cam.is_animating());
        assert!(!cam.update(0.4));
        assert!(!cam.is_animating());
        assert_relative_eq!(cam.target(), b.center(), epsilon = 1e-9);
    }

    #[test]
    fn focus_on_nothing_is_ignored() {
        let mut cam = director();
        assert!(!cam.focus_on_objects(&[], 1.6));
        assert!(!cam.is_animating());
    }

    #[test]
    fn wide_aspect_uses_vertical_fov() {
        let mut cam = director();
        cam.set_aspect(2.0);
        assert_relative_eq!(cam.effective_fov(), cam.fov());
        cam.set_aspect(0.5);
        assert!(cam.effective_fov() < cam.fov());
    }

    #[test]
    fn center_ray_points_at_target() {
        let cam = director();
        let ray = cam.ray_from_screen(Point2::origin());
        let to_target = (cam.target() - cam.position()).normalize();
        assert_relative_eq!(ray.direction, to_target, epsilon = 1e-6);

        let ndc = cam.project_to_ndc(&cam.target()).unwrap();
        assert_relative_eq!(ndc.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(ndc.y, 0.0, epsilon = 1e-9);
        let behind = cam.position() + (cam.position() - cam.target());
        assert!(cam.project_to_ndc(&behind).is_none());
    }

    #[test]
    fn screen_to_ndc_corners() {
        assert_eq!(screen_to_ndc(0.0, 0.0, 100.0, 50.0), Point2::new(-1.0, 1.0));
        assert_eq!(screen_to_ndc(100.0, 50.0, 100.0, 50.0), Point2::new(1.0, -1.0));
    }
}
