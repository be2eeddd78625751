// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wall generation strategies.

use floorplan_geometry::{box_mesh, Aabb, Mesh, Point2, Point3};

use super::materials::MaterialSet;
use crate::model::{Connection, ConnectionKind, Direction, Room, WallType};
use crate::theme::Material;

const DOOR_WIDTH: f64 = 0.9;
const DOOR_HEIGHT: f64 = 2.1;
const WINDOW_WIDTH: f64 = 1.2;
const WINDOW_SILL: f64 = 0.9;
const OPENING_WIDTH: f64 = 1.0;
const OPENING_HEIGHT: f64 = 2.4;
const EPS: f64 = 1e-6;

/// Everything a generator may look at for one side of one room
#[derive(Debug, Clone, Copy)]
pub struct WallRequest<'a> {
    pub room: &'a Room,
    pub side: Direction,
    /// Every room on the same floor, in document order
    pub rooms: &'a [Room],
    /// Every connection in the document
    pub connections: &'a [Connection],
    pub materials: &'a MaterialSet,
    /// World elevation of the room's floor surface
    pub floor_y: f64,
    pub height: f64,
    pub thickness: f64,
}

impl WallRequest<'_> {
    pub fn wall_type(&self) -> WallType {
        self.room.walls.get(self.side)
    }

    pub fn segment(&self) -> (Point2<f64>, Point2<f64>) {
        self.room.wall_segment(self.side)
    }
}

#[derive(Debug, Clone)]
pub struct WallPiece {
    pub name: String,
    pub mesh: Mesh,
    pub material: Material,
}

/// A registered connection leaf hanging under a wall
#[derive(Debug, Clone)]
pub struct ConnectionPiece {
    pub id: String,
    pub mesh: Mesh,
    pub material: Material,
}

/// Output for one wall: the wall itself, unregistered decoration and
/// connection leaves
#[derive(Debug, Clone)]
pub struct WallPieces {
    pub wall: WallPiece,
    pub details: Vec<WallPiece>,
    pub connections: Vec<ConnectionPiece>,
}

/// Strategy producing wall geometry.
///
/// Returning `None` means the side has no wall entity at all.
pub trait WallGenerator {
    fn generate(&self, request: &WallRequest<'_>) -> Option<WallPieces>;
}

/// One box per wall, centered on the room edge
#[derive(Debug, Clone, Copy, Default)]
pub struct BoxWallGenerator;

impl BoxWallGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl WallGenerator for BoxWallGenerator {
    fn generate(&self, request: &WallRequest<'_>) -> Option<WallPieces> {
        let wall_type = request.wall_type();
        if wall_type == WallType::Open {
            return None;
        }
        if let Some(owner) = coincident_owner(request) {
            tracing::debug!(
                room = %request.room.id,
                side = request.side.as_str(),
                owner = %owner.id,
                "wall shared with an earlier room"
            );
            return None;
        }

        let line = WallLine::new(request);
        let (y0, top) = (request.floor_y, request.floor_y + request.height);
        let wall = WallPiece {
            name: format!("wall {}:{}", request.room.id, request.side.as_str()),
            mesh: box_mesh(&line.span(line.start, line.end, request.thickness / 2.0, y0, top)),
            material: request.materials.wall,
        };

        let mut details = Vec::new();
        let mid = (line.start + line.end) / 2.0;
        let detail_half = request.thickness * 0.6;
        match wall_type {
            WallType::Door => {
                let w = DOOR_WIDTH.min(line.length() * 0.8);
                let y1 = y0 + DOOR_HEIGHT.min(request.height);
                details.push(WallPiece {
                    name: "door".into(),
                    mesh: box_mesh(&line.span(mid - w / 2.0, mid + w / 2.0, detail_half, y0, y1)),
                    material: request.materials.door,
                });
            }
            WallType::Window => {
                let w = WINDOW_WIDTH.min(line.length() * 0.8);
                let (s0, s1) = window_band(y0, request.height);
                details.push(WallPiece {
                    name: "window".into(),
                    mesh: box_mesh(&line.span(mid - w / 2.0, mid + w / 2.0, detail_half, s0, s1)),
                    material: request.materials.window,
                });
            }
            WallType::Solid | WallType::Open => {}
        }

        let connections = request
            .connections
            .iter()
            .filter(|c| c.touches(&request.room.id, request.side))
            .map(|c| connection_piece(request, &line, c))
            .collect();

        Some(WallPieces {
            wall,
            details,
            connections,
        })
    }
}

/// An earlier room on the floor whose opposite wall lies on the same line
/// and overlaps this one
fn coincident_owner<'a>(request: &WallRequest<'a>) -> Option<&'a Room> {
    let index = request.rooms.iter().position(|r| r.id == request.room.id)?;
    let (a, b) = request.segment();
    let opposite = request.side.inverse();

    request.rooms[..index].iter().find(|other| {
        if other.walls.get(opposite) == WallType::Open {
            return false;
        }
        let (c, d) = other.wall_segment(opposite);
        if request.side.is_vertical() {
            (a.y - c.y).abs() < EPS && b.x.min(d.x) - a.x.max(c.x) > EPS
        } else {
            (a.x - c.x).abs() < EPS && b.y.min(d.y) - a.y.max(c.y) > EPS
        }
    })
}

fn window_band(floor_y: f64, height: f64) -> (f64, f64) {
    let top = floor_y + DOOR_HEIGHT.min(height);
    let sill = (floor_y + WINDOW_SILL).min(top - 0.1).max(floor_y);
    (sill, top)
}

fn connection_piece(request: &WallRequest<'_>, line: &WallLine, connection: &Connection) -> ConnectionPiece {
    let (default_width, material) = match connection.kind {
        ConnectionKind::Door => (DOOR_WIDTH, request.materials.door),
        ConnectionKind::Window => (WINDOW_WIDTH, request.materials.window),
        ConnectionKind::Opening => (OPENING_WIDTH, request.materials.opening),
    };
    let width = connection
        .width
        .filter(|w| *w > 0.0)
        .unwrap_or(default_width)
        .min(line.length().max(0.0));

    // Anchor on the `from` wall so both sides of a shared wall agree
    let anchor = request
        .rooms
        .iter()
        .find(|r| r.id == connection.from.room)
        .map(|r| {
            let (a, b) = r.wall_segment(connection.from.wall);
            a + (b - a) * connection.offset()
        })
        .map(|p| line.along_of(p))
        .unwrap_or_else(|| line.start + line.length() * connection.offset());
    let half = width / 2.0;
    let center = anchor.max(line.start + half).min(line.end - half);

    let y0 = request.floor_y;
    let (c0, c1) = match connection.kind {
        ConnectionKind::Door => (y0, y0 + DOOR_HEIGHT.min(request.height)),
        ConnectionKind::Window => window_band(y0, request.height),
        ConnectionKind::Opening => (y0, y0 + OPENING_HEIGHT.min(request.height)),
    };

    ConnectionPiece {
        id: connection.id.clone(),
        mesh: box_mesh(&line.span(center - half, center + half, request.thickness * 0.7, c0, c1)),
        material,
    }
}

/// A wall's center line: a fixed coordinate on one plan axis and a range on
/// the other
struct WallLine {
    runs_along_x: bool,
    fixed: f64,
    start: f64,
    end: f64,
}

impl WallLine {
    fn new(request: &WallRequest<'_>) -> Self {
        let (a, b) = request.segment();
        if request.side.is_vertical() {
            Self {
                runs_along_x: true,
                fixed: a.y,
                start: a.x,
                end: b.x,
            }
        } else {
            Self {
                runs_along_x: false,
                fixed: a.x,
                start: a.y,
                end: b.y,
            }
        }
    }

    fn length(&self) -> f64 {
        self.end - self.start
    }

    fn along_of(&self, p: Point2<f64>) -> f64 {
        if self.runs_along_x {
            p.x
        } else {
            p.y
        }
    }

    fn span(&self, from: f64, to: f64, half_across: f64, y0: f64, y1: f64) -> Aabb {
        let (c0, c1) = (self.fixed - half_across, self.fixed + half_across);
        if self.runs_along_x {
            Aabb::new(Point3::new(from, y0, c0), Point3::new(to, y1, c1))
        } else {
            Aabb::new(Point3::new(c0, y0, from), Point3::new(c1, y1, to))
        }
    }
}
