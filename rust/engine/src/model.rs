// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Floorplan data model.
//!
//! Mirrors the normalized floorplan JSON export. Everything here is plain
//! data; geometry is derived later by the scene builder.

use std::fmt;

use floorplan_geometry::{LiftSpec, Point2, StairSpec, DEFAULT_STAIR_WIDTH};
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use floorplan_geometry::{
    PlanDirection as Direction, StairSegment, StairShape, TurnDirection,
};

/// Root of a floorplan document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Floorplan {
    /// Ordered bottom to top.
    #[serde(default)]
    pub floors: Vec<Floor>,
    #[serde(default)]
    pub connections: Vec<Connection>,
    #[serde(default)]
    pub styles: Vec<Style>,
    #[serde(default)]
    pub config: FloorplanConfig,
}

impl Floorplan {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn style(&self, name: &str) -> Option<&Style> {
        self.styles.iter().find(|s| s.name == name)
    }

    pub fn floor(&self, id: &str) -> Option<&Floor> {
        self.floors.iter().find(|f| f.id == id)
    }

    /// Floor and room for a room id, searching every floor
    pub fn find_room(&self, room_id: &str) -> Option<(&Floor, &Room)> {
        self.floors.iter().find_map(|floor| {
            floor
                .rooms
                .iter()
                .find(|r| r.id == room_id)
                .map(|room| (floor, room))
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Floor {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub stairs: Vec<Stair>,
    #[serde(default)]
    pub lifts: Vec<Lift>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Plan `[x, z]` of the minimum corner
    pub position: [f64; 2],
    /// Extent along X
    pub width: f64,
    /// Extent along Z
    pub depth: f64,
    #[serde(default)]
    pub walls: WallSpec,
    #[serde(default)]
    pub elevation: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

impl Room {
    pub fn min(&self) -> Point2<f64> {
        Point2::new(self.position[0], self.position[1])
    }

    pub fn max(&self) -> Point2<f64> {
        Point2::new(self.position[0] + self.width, self.position[1] + self.depth)
    }

    /// Plan endpoints of one side, running in +X or +Z
    pub fn wall_segment(&self, side: Direction) -> (Point2<f64>, Point2<f64>) {
        let (a, b) = (self.min(), self.max());
        match side {
            Direction::Top => (a, Point2::new(b.x, a.y)),
            Direction::Bottom => (Point2::new(a.x, b.y), b),
            Direction::Left => (a, Point2::new(a.x, b.y)),
            Direction::Right => (Point2::new(b.x, a.y), b),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WallType {
    #[default]
    Solid,
    Door,
    Window,
    Open,
}

/// Per-side wall types of a room
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallSpec {
    #[serde(default)]
    pub top: WallType,
    #[serde(default)]
    pub bottom: WallType,
    #[serde(default)]
    pub left: WallType,
    #[serde(default)]
    pub right: WallType,
}

impl WallSpec {
    pub fn get(&self, side: Direction) -> WallType {
        match side {
            Direction::Top => self.top,
            Direction::Bottom => self.bottom,
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stair {
    pub id: String,
    pub position: [f64; 2],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default)]
    pub shape: StairShape,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rise: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tread: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub riser: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<Direction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turn: Option<TurnDirection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runs: Option<[u32; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outer_radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub segments: Vec<StairSegment>,
}

impl Stair {
    pub fn to_spec(&self) -> StairSpec {
        StairSpec {
            position: Point2::new(self.position[0], self.position[1]),
            width: self.width.unwrap_or(DEFAULT_STAIR_WIDTH),
            shape: self.shape,
            rise: self.rise,
            tread: self.tread,
            riser: self.riser,
            direction: self.direction,
            entry: self.entry,
            turn: self.turn.unwrap_or_default(),
            runs: self.runs,
            outer_radius: self.outer_radius,
            segments: self.segments.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lift {
    pub id: String,
    pub position: [f64; 2],
    pub width: f64,
    pub depth: f64,
    #[serde(default)]
    pub doors: Vec<Direction>,
}

impl Lift {
    pub fn to_spec(&self) -> LiftSpec {
        LiftSpec {
            position: Point2::new(self.position[0], self.position[1]),
            width: self.width,
            depth: self.depth,
            doors: self.doors.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionKind {
    #[default]
    Door,
    Window,
    Opening,
}

/// One side of one room
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WallRef {
    pub room: String,
    pub wall: Direction,
}

/// An opening between rooms (or to the outside), anchored on a wall
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: String,
    #[serde(default)]
    pub kind: ConnectionKind,
    pub from: WallRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<WallRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// Position along the wall in `0..=1`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<f64>,
}

impl Connection {
    pub fn touches(&self, room: &str, side: Direction) -> bool {
        let hits = |w: &WallRef| w.room == room && w.wall == side;
        hits(&self.from) || self.to.as_ref().is_some_and(hits)
    }

    pub fn offset(&self) -> f64 {
        self.offset.unwrap_or(0.5).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wall_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_height: Option<f64>,
}

/// Global geometric defaults carried by the document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FloorplanConfig {
    pub wall_thickness: f64,
    pub floor_thickness: f64,
    pub default_height: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_style: Option<String>,
}

impl Default for FloorplanConfig {
    fn default() -> Self {
        Self {
            wall_thickness: 0.15,
            floor_thickness: 0.2,
            default_height: 3.0,
            default_style: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Room,
    Wall,
    Stair,
    Lift,
    Connection,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Room => "room",
            EntityType::Wall => "wall",
            EntityType::Stair => "stair",
            EntityType::Lift => "lift",
            EntityType::Connection => "connection",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable identity of a selectable entity across reloads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRef {
    pub entity_type: EntityType,
    pub entity_id: String,
    pub floor_id: String,
}

impl EntityRef {
    pub fn new(entity_type: EntityType, entity_id: impl Into<String>, floor_id: impl Into<String>) -> Self {
        Self {
            entity_type,
            entity_id: entity_id.into(),
            floor_id: floor_id.into(),
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.floor_id, self.entity_type, self.entity_id)
    }
}

/// Entity id of one side of a room
pub fn wall_id(room_id: &str, side: Direction) -> String {
    format!("{room_id}:{}", side.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "floors": [{
            "id": "ground",
            "height": 3.2,
            "rooms": [{
                "id": "kitchen",
                "position": [0, 0],
                "width": 4,
                "depth": 3,
                "walls": {"top": "window", "right": "open"}
            }],
            "stairs": [{"id": "s1", "position": [5, 0], "shape": "spiral-ish"}]
        }],
        "connections": [{
            "id": "c1",
            "kind": "door",
            "from": {"room": "kitchen", "wall": "bottom"}
        }],
        "config": {"wallThickness": 0.2}
    }"#;

    #[test]
    fn parses_normalized_export() {
        let plan = Floorplan::from_json(SAMPLE).unwrap();
        let (floor, room) = plan.find_room("kitchen").unwrap();
        assert_eq!(floor.id, "ground");
        assert_eq!(room.walls.get(Direction::Top), WallType::Window);
        assert_eq!(room.walls.get(Direction::Left), WallType::Solid);
        assert_eq!(room.elevation, 0.0);
        assert_eq!(plan.config.wall_thickness, 0.2);
        assert_eq!(plan.config.floor_thickness, 0.2);
        assert_eq!(plan.config.default_height, 3.0);
        assert_eq!(floor.stairs[0].shape, StairShape::Straight);
        assert!(plan.connections[0].touches("kitchen", Direction::Bottom));
        assert_eq!(plan.connections[0].offset(), 0.5);
    }

    #[test]
    fn bad_json_is_a_parse_error() {
        let err = Floorplan::from_json("{ floors: ").unwrap_err();
        assert!(matches!(err, crate::Error::Parse(_)));
    }

    #[test]
    fn entity_ref_uses_camel_case() {
        let r = EntityRef::new(EntityType::Wall, wall_id("kitchen", Direction::Top), "ground");
        let json = serde_json::to_string(&r).unwrap();
        assert_eq!(
            json,
            r#"{"entityType":"wall","entityId":"kitchen:top","floorId":"ground"}"#
        );
    }
}
