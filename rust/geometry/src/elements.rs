// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Vertical circulation element descriptions
//!
//! Plain value types for stairs and lifts as the geometry layer sees them.
//! The enums double as the wire vocabulary of the floorplan model, so they
//! carry serde derives with the lowercase / camelCase names used in the
//! exported JSON.

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TREAD: f64 = 0.28;
pub const DEFAULT_RISER: f64 = 0.18;
pub const DEFAULT_STAIR_WIDTH: f64 = 1.0;
pub const DEFAULT_RISE: f64 = 3.0;

/// A side of a room or element in plan view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanDirection {
    /// −Z
    Top,
    /// +Z
    Bottom,
    /// −X
    Left,
    /// +X
    Right,
}

impl PlanDirection {
    pub const ALL: [PlanDirection; 4] = [
        PlanDirection::Top,
        PlanDirection::Bottom,
        PlanDirection::Left,
        PlanDirection::Right,
    ];

    pub fn inverse(self) -> Self {
        match self {
            PlanDirection::Top => PlanDirection::Bottom,
            PlanDirection::Bottom => PlanDirection::Top,
            PlanDirection::Left => PlanDirection::Right,
            PlanDirection::Right => PlanDirection::Left,
        }
    }

    /// Unit vector on the (x, z) plane
    pub fn unit(self) -> Vector2<f64> {
        match self {
            PlanDirection::Top => Vector2::new(0.0, -1.0),
            PlanDirection::Bottom => Vector2::new(0.0, 1.0),
            PlanDirection::Left => Vector2::new(-1.0, 0.0),
            PlanDirection::Right => Vector2::new(1.0, 0.0),
        }
    }

    /// True for top/bottom
    pub fn is_vertical(self) -> bool {
        matches!(self, PlanDirection::Top | PlanDirection::Bottom)
    }

    /// Rotation that carries a stair traced toward −Z onto this entry side
    pub fn entry_angle(self) -> f64 {
        match self {
            PlanDirection::Top => 180f64.to_radians(),
            PlanDirection::Bottom => 0.0,
            PlanDirection::Right => (-90f64).to_radians(),
            PlanDirection::Left => 90f64.to_radians(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PlanDirection::Top => "top",
            PlanDirection::Bottom => "bottom",
            PlanDirection::Left => "left",
            PlanDirection::Right => "right",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnDirection {
    Left,
    #[default]
    Right,
}

impl TurnDirection {
    /// Rotate a plan vector a quarter turn
    pub fn rotate(self, v: Vector2<f64>) -> Vector2<f64> {
        match self {
            TurnDirection::Right => Vector2::new(-v.y, v.x),
            TurnDirection::Left => Vector2::new(v.y, -v.x),
        }
    }

    /// Side of the new heading that lies on the outside of the turn
    pub fn outer_side(self, heading: Vector2<f64>) -> Vector2<f64> {
        match self {
            TurnDirection::Right => Vector2::new(heading.y, -heading.x),
            TurnDirection::Left => Vector2::new(-heading.y, heading.x),
        }
    }
}

/// Stair plan shape. Unrecognized names fall back to `Straight`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StairShape {
    #[default]
    Straight,
    LShaped,
    UShaped,
    Spiral,
    Custom,
}

impl From<String> for StairShape {
    fn from(value: String) -> Self {
        match value.as_str() {
            "lShaped" | "l-shaped" | "L" => StairShape::LShaped,
            "uShaped" | "u-shaped" | "U" => StairShape::UShaped,
            "spiral" => StairShape::Spiral,
            "custom" => StairShape::Custom,
            "straight" => StairShape::Straight,
            other => {
                tracing::warn!(shape = other, "unknown stair shape, using straight");
                StairShape::Straight
            }
        }
    }
}

impl From<StairShape> for String {
    fn from(value: StairShape) -> Self {
        match value {
            StairShape::Straight => "straight",
            StairShape::LShaped => "lShaped",
            StairShape::UShaped => "uShaped",
            StairShape::Spiral => "spiral",
            StairShape::Custom => "custom",
        }
        .to_string()
    }
}

/// One piece of a custom stair path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StairSegment {
    Flight {
        steps: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        width: Option<f64>,
    },
    Turn {
        direction: TurnDirection,
        /// `[width, depth]`
        landing: [f64; 2],
    },
}

/// Geometry-side description of a stair
#[derive(Debug, Clone, PartialEq)]
pub struct StairSpec {
    /// Plan anchor `(x, z)`
    pub position: Point2<f64>,
    pub width: f64,
    pub shape: StairShape,
    pub rise: Option<f64>,
    pub tread: Option<f64>,
    pub riser: Option<f64>,
    pub direction: Option<PlanDirection>,
    pub entry: Option<PlanDirection>,
    pub turn: TurnDirection,
    pub runs: Option<[u32; 2]>,
    pub outer_radius: Option<f64>,
    pub segments: Vec<StairSegment>,
}

impl StairSpec {
    pub fn straight(position: Point2<f64>) -> Self {
        Self {
            position,
            width: DEFAULT_STAIR_WIDTH,
            shape: StairShape::Straight,
            rise: None,
            tread: None,
            riser: None,
            direction: None,
            entry: None,
            turn: TurnDirection::default(),
            runs: None,
            outer_radius: None,
            segments: Vec::new(),
        }
    }

    /// Climb direction: explicit, else the inverse of the entry, else top
    pub fn climb_direction(&self) -> PlanDirection {
        self.direction
            .or_else(|| self.entry.map(PlanDirection::inverse))
            .unwrap_or(PlanDirection::Top)
    }

    /// Entry side: explicit, else the inverse of the climb, else bottom
    pub fn entry_side(&self) -> PlanDirection {
        self.entry
            .or_else(|| self.direction.map(PlanDirection::inverse))
            .unwrap_or(PlanDirection::Bottom)
    }
}

/// Geometry-side description of a lift shaft
#[derive(Debug, Clone, PartialEq)]
pub struct LiftSpec {
    /// Minimum plan corner `(x, z)`
    pub position: Point2<f64>,
    pub width: f64,
    pub depth: f64,
    pub doors: Vec<PlanDirection>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_shape_is_straight() {
        let shape: StairShape = serde_json::from_str("\"helical\"").unwrap();
        assert_eq!(shape, StairShape::Straight);
        let shape: StairShape = serde_json::from_str("\"lShaped\"").unwrap();
        assert_eq!(shape, StairShape::LShaped);
    }

    #[test]
    fn test_segments_deserialize() {
        let json = r#"[
            {"type": "flight", "steps": 10, "width": 1.0},
            {"type": "turn", "direction": "right", "landing": [1.2, 1.2]}
        ]"#;
        let segments: Vec<StairSegment> = serde_json::from_str(json).unwrap();
        assert_eq!(
            segments[0],
            StairSegment::Flight {
                steps: 10,
                width: Some(1.0)
            }
        );
        assert!(matches!(
            segments[1],
            StairSegment::Turn {
                direction: TurnDirection::Right,
                ..
            }
        ));
    }

    #[test]
    fn test_climb_and_entry_resolution() {
        let mut stair = StairSpec::straight(Point2::origin());
        assert_eq!(stair.climb_direction(), PlanDirection::Top);
        assert_eq!(stair.entry_side(), PlanDirection::Bottom);

        stair.entry = Some(PlanDirection::Left);
        assert_eq!(stair.climb_direction(), PlanDirection::Right);

        stair.direction = Some(PlanDirection::Bottom);
        assert_eq!(stair.climb_direction(), PlanDirection::Bottom);
        assert_eq!(stair.entry_side(), PlanDirection::Left);
    }

    #[test]
    fn test_turns_rotate_quarter() {
        let north = PlanDirection::Top.unit();
        assert_eq!(TurnDirection::Right.rotate(north), PlanDirection::Right.unit());
        assert_eq!(TurnDirection::Left.rotate(north), PlanDirection::Left.unit());
        let east = PlanDirection::Right.unit();
        assert_eq!(TurnDirection::Right.outer_side(east), north);
    }
}
