// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Color themes and material colors.

use serde::{Deserialize, Serialize};

/// Linear RGB color in `0..=1`
pub type Rgb = [f32; 3];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn palette(self) -> Palette {
        match self {
            Theme::Light => Palette {
                background: [0.96, 0.96, 0.95],
                floor: [0.87, 0.84, 0.78],
                wall: [0.93, 0.93, 0.93],
                stair: [0.70, 0.68, 0.64],
                lift: [0.62, 0.66, 0.72],
                door: [0.55, 0.38, 0.22],
                window: [0.65, 0.82, 0.95],
                selection: [0.13, 0.77, 0.37],
                hover: [0.23, 0.51, 0.96],
                glow: [0.05, 0.30, 0.12],
            },
            Theme::Dark => Palette {
                background: [0.09, 0.10, 0.12],
                floor: [0.30, 0.29, 0.27],
                wall: [0.45, 0.46, 0.48],
                stair: [0.38, 0.37, 0.35],
                lift: [0.32, 0.36, 0.42],
                door: [0.45, 0.31, 0.18],
                window: [0.35, 0.52, 0.65],
                selection: [0.29, 0.87, 0.50],
                hover: [0.38, 0.65, 0.98],
                glow: [0.08, 0.40, 0.18],
            },
        }
    }
}

/// Colors a theme assigns to scene content and highlights
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Palette {
    pub background: Rgb,
    pub floor: Rgb,
    pub wall: Rgb,
    pub stair: Rgb,
    pub lift: Rgb,
    pub door: Rgb,
    pub window: Rgb,
    /// Edge outline of selected entities
    pub selection: Rgb,
    /// Edge outline of hovered entities
    pub hover: Rgb,
    /// Emissive tint on selected rooms
    pub glow: Rgb,
}

/// What a mesh is made of, as far as the renderer cares
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub color: Rgb,
    pub opacity: f32,
    pub emissive: Rgb,
}

impl Material {
    pub fn solid(color: Rgb) -> Self {
        Self {
            color,
            opacity: 1.0,
            emissive: [0.0; 3],
        }
    }

    pub fn translucent(color: Rgb, opacity: f32) -> Self {
        Self {
            opacity,
            ..Self::solid(color)
        }
    }
}

/// Parse `#rgb` or `#rrggbb`
pub fn parse_hex_color(text: &str) -> Option<Rgb> {
    let hex = text.trim().strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok().map(|v| v as f32 / 255.0);
    match hex.len() {
        6 => Some([channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?]),
        3 => {
            let expand = |i: usize| {
                let c = &hex[i..i + 1];
                channel(&format!("{c}{c}"))
            };
            Some([expand(0)?, expand(1)?, expand(2)?])
        }
        _ => None,
    }
}
