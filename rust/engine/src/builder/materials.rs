// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::model::Style;
use crate::theme::{parse_hex_color, Material, Palette, Rgb};

/// Materials for one room or floor, after style colors are applied
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialSet {
    pub floor: Material,
    pub wall: Material,
    pub stair: Material,
    pub lift: Material,
    pub lift_door: Material,
    pub door: Material,
    pub window: Material,
    pub opening: Material,
}

impl MaterialSet {
    pub fn new(palette: &Palette, style: Option<&Style>) -> Self {
        let floor = style_color(style.and_then(|s| s.floor_color.as_deref()), "floorColor")
            .unwrap_or(palette.floor);
        let wall = style_color(style.and_then(|s| s.wall_color.as_deref()), "wallColor")
            .unwrap_or(palette.wall);

        Self {
            floor: Material::solid(floor),
            wall: Material::solid(wall),
            stair: Material::solid(palette.stair),
            lift: Material::solid(palette.lift),
            lift_door: Material::solid(scale(palette.lift, 0.8)),
            door: Material::solid(palette.door),
            window: Material::translucent(palette.window, 0.5),
            opening: Material::translucent(wall, 0.25),
        }
    }
}

fn style_color(value: Option<&str>, field: &str) -> Option<Rgb> {
    let text = value?;
    let color = parse_hex_color(text);
    if color.is_none() {
        tracing::warn!(field, value = text, "unparseable style color, using theme default");
    }
    color
}

fn scale(c: Rgb, k: f32) -> Rgb {
    [c[0] * k, c[1] * k, c[2] * k]
}
