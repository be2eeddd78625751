// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Viewer configuration.

use serde::{Deserialize, Serialize};

use crate::camera::CameraMode;
use crate::error::Result;
use crate::theme::Theme;

/// How a drag rectangle decides which entities it picks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarqueeMode {
    /// Any overlap with the entity's screen bound selects it.
    #[default]
    Intersection,
    /// The entity's whole screen bound must be inside the rectangle.
    Containment,
}

/// Viewer configuration.
///
/// Every field has a default, so a partial JSON document is enough to
/// override a handful of settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Pointer travel in CSS pixels below which a press is a click.
    pub click_threshold_px: f64,
    pub marquee_mode: MarqueeMode,
    /// Hover-highlight what the marquee would pick while dragging.
    pub live_marquee_preview: bool,
    /// Selecting a room also selects its walls and connections.
    pub hierarchical_selection: bool,
    /// Camera focus animation length in seconds.
    pub tween_duration: f64,
    pub focus_padding: f64,
    /// Vertical field of view in degrees.
    pub fov_degrees: f64,
    pub near: f64,
    pub far: f64,
    /// Slab holes narrower than this (metres) are not cut.
    pub min_hole_size: f64,
    /// How far a lift shaft penetration reaches above its floor height.
    pub lift_headroom: f64,
    pub camera_mode: CameraMode,
    pub theme: Theme,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            click_threshold_px: 5.0,
            marquee_mode: MarqueeMode::Intersection,
            live_marquee_preview: true,
            hierarchical_selection: true,
            tween_duration: 0.6,
            focus_padding: 1.6,
            fov_degrees: 75.0,
            near: 0.1,
            far: 2000.0,
            min_hole_size: 0.1,
            lift_headroom: 1.0,
            camera_mode: CameraMode::Perspective,
            theme: Theme::Light,
        }
    }
}

impl EngineConfig {
    /// Overlay a (possibly partial) JSON document on the defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
