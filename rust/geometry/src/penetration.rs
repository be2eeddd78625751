// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Penetration volumes for stairs and lifts
//!
//! A penetration is the world-space box a vertical element occupies. The
//! floor slab directly above is perforated wherever a penetration's
//! footprint reaches into it.
//!
//! Every stair shape is laid out by the same path tracer: flights advance
//! along a heading, turns drop a landing and rotate the heading a quarter
//! turn. The resulting [`StairLayout`] drives both the penetration box and
//! the step meshes, so the two always agree.

use crate::bounds::Aabb;
use crate::elements::{
    LiftSpec, PlanDirection, StairSegment, StairShape, StairSpec, TurnDirection, DEFAULT_RISE,
    DEFAULT_RISER, DEFAULT_TREAD,
};
use crate::transform::LocalFrame;
use nalgebra::{Point2, Point3, Vector2};

/// Element a penetration was derived from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PenetrationSource {
    Stair(String),
    Lift(String),
}

impl PenetrationSource {
    pub fn id(&self) -> &str {
        match self {
            PenetrationSource::Stair(id) | PenetrationSource::Lift(id) => id,
        }
    }
}

/// A penetration volume, produced on one floor and consumed by the next
#[derive(Debug, Clone, PartialEq)]
pub struct Penetration {
    pub source: PenetrationSource,
    pub bounds: Aabb,
}

/// A straight run of steps in world plan coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct FlightLayout {
    /// Center of the first step's leading edge
    pub start: Point2<f64>,
    /// Unit climb heading
    pub forward: Vector2<f64>,
    pub width: f64,
    pub steps: u32,
    /// Global index of this flight's first step
    pub first_step: u32,
}

/// A landing rectangle in world plan coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct LandingLayout {
    pub min: Point2<f64>,
    pub max: Point2<f64>,
    /// Number of steps climbed before reaching the landing
    pub level: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpiralLayout {
    pub center: Point2<f64>,
    pub outer_radius: f64,
}

/// Fully resolved plan layout of a stair
#[derive(Debug, Clone, PartialEq)]
pub struct StairLayout {
    pub flights: Vec<FlightLayout>,
    pub landings: Vec<LandingLayout>,
    pub spiral: Option<SpiralLayout>,
    pub total_steps: u32,
    pub tread: f64,
    /// Height of one step (`rise / total_steps`)
    pub step_height: f64,
    pub rise: f64,
    /// Plan bound `(min, max)` over (x, z)
    pub footprint: (Point2<f64>, Point2<f64>),
}

impl StairLayout {
    /// World box from `base` up to `base + rise`
    pub fn bounds(&self, base: f64) -> Aabb {
        let (min, max) = self.footprint;
        Aabb::new(
            Point3::new(min.x, base, min.y),
            Point3::new(max.x, base + self.rise, max.y),
        )
    }
}

/// Traces flights and turns in a 2D frame, accumulating the plan bound
struct PathTracer {
    pos: Point2<f64>,
    forward: Vector2<f64>,
    min: Point2<f64>,
    max: Point2<f64>,
    steps: u32,
    tread: f64,
    flights: Vec<FlightLayout>,
    landings: Vec<LandingLayout>,
}

impl PathTracer {
    fn new(forward: Vector2<f64>, tread: f64) -> Self {
        Self {
            pos: Point2::origin(),
            forward,
            min: Point2::new(f64::MAX, f64::MAX),
            max: Point2::new(f64::MIN, f64::MIN),
            steps: 0,
            tread,
            flights: Vec::new(),
            landings: Vec::new(),
        }
    }

    fn grow(&mut self, p: Point2<f64>) {
        self.min = self.min.inf(&p);
        self.max = self.max.sup(&p);
    }

    fn flight(&mut self, steps: u32, width: f64) {
        let half_side = Vector2::new(-self.forward.y, self.forward.x) * (width / 2.0);
        let start = self.pos;
        let end = start + self.forward * (steps as f64 * self.tread);

        for p in [start, end] {
            self.grow(p + half_side);
            self.grow(p - half_side);
        }

        self.flights.push(FlightLayout {
            start,
            forward: self.forward,
            width,
            steps,
            first_step: self.steps,
        });
        self.steps += steps;
        self.pos = end;
    }

    /// `landing` is `[width, depth]`; depth lies along the incoming heading
    fn turn(&mut self, direction: TurnDirection, landing: [f64; 2], next_width: Option<f64>) {
        let [landing_width, landing_depth] = landing;
        let center = self.pos + self.forward * (landing_depth / 2.0);

        let across = Vector2::new(-self.forward.y, self.forward.x) * (landing_width / 2.0);
        let along = self.forward * (landing_depth / 2.0);
        let (a, b) = (center - along - across, center + along + across);
        let min = a.inf(&b);
        let max = a.sup(&b);
        self.grow(min);
        self.grow(max);
        self.landings.push(LandingLayout {
            min,
            max,
            level: self.steps,
        });

        self.forward = direction.rotate(self.forward);
        self.pos = center + self.forward * (landing_width / 2.0);
        if let Some(next_width) = next_width {
            let shift = (landing_width - next_width) / 2.0;
            self.pos += direction.outer_side(self.forward) * shift;
        }
    }

    /// Map the traced path so its local minimum lands on `frame.origin`,
    /// rotated by `frame.angle`
    fn finish(self, frame: LocalFrame, rise: f64) -> StairLayout {
        let local_min = self.min.coords;
        let to_world = |p: Point2<f64>| frame.to_world(p - local_min);

        let mut world_min = Point2::new(f64::MAX, f64::MAX);
        let mut world_max = Point2::new(f64::MIN, f64::MIN);
        for corner in [
            self.min,
            Point2::new(self.max.x, self.min.y),
            self.max,
            Point2::new(self.min.x, self.max.y),
        ] {
            let w = to_world(corner);
            world_min = world_min.inf(&w);
            world_max = world_max.sup(&w);
        }

        let flights = self
            .flights
            .into_iter()
            .map(|f| FlightLayout {
                start: to_world(f.start),
                forward: frame.rotate(f.forward),
                ..f
            })
            .collect();
        let landings = self
            .landings
            .into_iter()
            .map(|l| {
                let (a, b) = (to_world(l.min), to_world(l.max));
                LandingLayout {
                    min: a.inf(&b),
                    max: a.sup(&b),
                    level: l.level,
                }
            })
            .collect();

        let total_steps = self.steps;
        StairLayout {
            flights,
            landings,
            spiral: None,
            total_steps,
            tread: self.tread,
            step_height: if total_steps > 0 {
                rise / total_steps as f64
            } else {
                rise
            },
            rise,
            footprint: (world_min, world_max),
        }
    }
}

/// Computes stair layouts and penetration volumes
#[derive(Debug, Clone)]
pub struct PenetrationComputer {
    pub default_tread: f64,
    pub default_riser: f64,
    pub default_rise: f64,
    /// Extra height above the floor a lift shaft reaches
    pub lift_headroom: f64,
}

impl Default for PenetrationComputer {
    fn default() -> Self {
        Self {
            default_tread: DEFAULT_TREAD,
            default_riser: DEFAULT_RISER,
            default_rise: DEFAULT_RISE,
            lift_headroom: 1.0,
        }
    }
}

impl PenetrationComputer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lift_headroom(mut self, headroom: f64) -> Self {
        self.lift_headroom = headroom;
        self
    }

    /// Penetration of a stair whose floor plane sits at `base`.
    ///
    /// `tread` and `rise` are fallbacks used when the stair leaves them out.
    pub fn stair_penetration(
        &self,
        id: &str,
        stair: &StairSpec,
        base: f64,
        tread: Option<f64>,
        rise: Option<f64>,
    ) -> Penetration {
        Penetration {
            source: PenetrationSource::Stair(id.to_string()),
            bounds: self.stair_layout(stair, tread, rise).bounds(base),
        }
    }

    /// Penetration of a lift shaft on a floor of `floor_height`
    pub fn lift_penetration(
        &self,
        id: &str,
        lift: &LiftSpec,
        base: f64,
        floor_height: f64,
    ) -> Penetration {
        let min = Point3::new(lift.position.x, base, lift.position.y);
        let max = Point3::new(
            lift.position.x + lift.width,
            base + floor_height + self.lift_headroom,
            lift.position.y + lift.depth,
        );
        Penetration {
            source: PenetrationSource::Lift(id.to_string()),
            bounds: Aabb::new(min, max),
        }
    }

    /// Resolve a stair into flights, landings and its plan footprint
    pub fn stair_layout(&self, stair: &StairSpec, tread: Option<f64>, rise: Option<f64>) -> StairLayout {
        let tread = positive(stair.tread)
            .or(positive(tread))
            .unwrap_or(self.default_tread);
        let riser = positive(stair.riser).unwrap_or(self.default_riser);
        let rise = positive(stair.rise)
            .or(positive(rise))
            .unwrap_or(self.default_rise);
        let width = if stair.width > 0.0 {
            stair.width
        } else {
            crate::elements::DEFAULT_STAIR_WIDTH
        };
        let step_count = ((rise / riser) - 1e-9).ceil().max(1.0) as u32;

        let anchored = LocalFrame::new(stair.position, 0.0);

        match stair.shape {
            StairShape::Straight => {
                let mut tracer = PathTracer::new(stair.climb_direction().unit(), tread);
                tracer.flight(step_count, width);
                tracer.finish(anchored, rise)
            }
            StairShape::LShaped => {
                let [run1, run2] = split_runs(stair.runs, step_count);
                let mut tracer = PathTracer::new(stair.climb_direction().unit(), tread);
                tracer.flight(run1, width);
                tracer.turn(stair.turn, [width, width], Some(width));
                tracer.flight(run2, width);
                tracer.finish(anchored, rise)
            }
            StairShape::UShaped => {
                let [run1, run2] = split_runs(stair.runs, step_count);
                let mut tracer = PathTracer::new(stair.climb_direction().unit(), tread);
                tracer.flight(run1, width);
                tracer.turn(stair.turn, [width, width], None);
                tracer.turn(stair.turn, [width, width], Some(width));
                tracer.flight(run2, width);
                tracer.finish(anchored, rise)
            }
            StairShape::Spiral => self.spiral_layout(stair, width, step_count, tread, rise),
            StairShape::Custom => {
                let mut tracer = PathTracer::new(PlanDirection::Top.unit(), tread);
                for (i, segment) in stair.segments.iter().enumerate() {
                    match *segment {
                        StairSegment::Flight { steps, width: w } => {
                            tracer.flight(steps, positive(w).unwrap_or(width))
                        }
                        StairSegment::Turn { direction, landing } => {
                            let next_width = next_flight_width(&stair.segments[i + 1..], width);
                            tracer.turn(direction, landing, next_width);
                        }
                    }
                }
                if tracer.flights.is_empty() && tracer.landings.is_empty() {
                    tracing::warn!("custom stair has no segments, using a straight run");
                    tracer.flight(step_count, width);
                }
                let frame = LocalFrame::new(stair.position, stair.entry_side().entry_angle());
                tracer.finish(frame, rise)
            }
        }
    }

    fn spiral_layout(
        &self,
        stair: &StairSpec,
        width: f64,
        steps: u32,
        tread: f64,
        rise: f64,
    ) -> StairLayout {
        let radius = positive(stair.outer_radius).unwrap_or(width);
        let c = stair.position;
        StairLayout {
            flights: Vec::new(),
            landings: Vec::new(),
            spiral: Some(SpiralLayout {
                center: c,
                outer_radius: radius,
            }),
            total_steps: steps,
            tread,
            step_height: rise / steps as f64,
            rise,
            footprint: (
                Point2::new(c.x - radius, c.y - radius),
                Point2::new(c.x + radius, c.y + radius),
            ),
        }
    }
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

fn split_runs(runs: Option<[u32; 2]>, step_count: u32) -> [u32; 2] {
    runs.unwrap_or_else(|| {
        let first = step_count.div_ceil(2);
        [first, step_count - first]
    })
}

/// Width of the flight following a turn, if another flight follows
fn next_flight_width(rest: &[StairSegment], default: f64) -> Option<f64> {
    rest.iter().find_map(|segment| match segment {
        StairSegment::Flight { width, .. } => Some(positive(*width).unwrap_or(default)),
        StairSegment::Turn { .. } => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn stair(shape: StairShape) -> StairSpec {
        StairSpec {
            shape,
            ..StairSpec::straight(Point2::new(2.0, 3.0))
        }
    }

    #[test]
    fn test_straight_run_along_x_for_side_climb() {
        let mut s = stair(StairShape::Straight);
        s.direction = Some(PlanDirection::Right);
        let b = PenetrationComputer::new()
            .stair_penetration("s", &s, 0.0, None, Some(3.0))
            .bounds;
        assert_relative_eq!(b.min.x, 2.0, epsilon = 1e-9);
        assert_relative_eq!(b.size().x, 17.0 * 0.28, epsilon = 1e-9);
        assert_relative_eq!(b.size().z, 1.0, epsilon = 1e-9);
        assert_relative_eq!(b.min.z, 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rise_resolution_order() {
        let computer = PenetrationComputer::new();
        let mut s = stair(StairShape::Straight);
        assert_relative_eq!(computer.stair_layout(&s, None, None).rise, 3.0);
        assert_relative_eq!(computer.stair_layout(&s, None, Some(2.7)).rise, 2.7);
        s.rise = Some(3.6);
        let layout = computer.stair_layout(&s, None, Some(2.7));
        assert_relative_eq!(layout.rise, 3.6);
        assert_eq!(layout.total_steps, 20);
    }

    #[test]
    fn test_l_shaped_footprint() {
        let mut s = stair(StairShape::LShaped);
        s.runs = Some([6, 4]);
        let layout = PenetrationComputer::new().stair_layout(&s, None, None);
        let (min, max) = layout.footprint;
        // climb top: run1 + landing along Z, width + run2 along X
        assert_relative_eq!(max.y - min.y, 6.0 * 0.28 + 1.0, epsilon = 1e-9);
        assert_relative_eq!(max.x - min.x, 1.0 + 4.0 * 0.28, epsilon = 1e-9);
        assert_relative_eq!(min.x, 2.0, epsilon = 1e-9);
        assert_relative_eq!(min.y, 3.0, epsilon = 1e-9);
        assert_eq!(layout.landings.len(), 1);
        assert_eq!(layout.flights[1].first_step, 6);
    }

    #[test]
    fn test_u_shaped_footprint() {
        let mut s = stair(StairShape::UShaped);
        s.runs = Some([8, 5]);
        let layout = PenetrationComputer::new().stair_layout(&s, None, None);
        let (min, max) = layout.footprint;
        assert_relative_eq!(max.x - min.x, 2.0, epsilon = 1e-9);
        assert_relative_eq!(max.y - min.y, 8.0 * 0.28 + 1.0, epsilon = 1e-9);
        // second flight runs back against the first
        assert_relative_eq!(
            layout.flights[1].forward.dot(&layout.flights[0].forward),
            -1.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_spiral_centered_on_anchor() {
        let mut s = stair(StairShape::Spiral);
        s.outer_radius = Some(1.5);
        let b = PenetrationComputer::new()
            .stair_penetration("s", &s, 0.0, None, None)
            .bounds;
        assert_relative_eq!(b.center().x, 2.0, epsilon = 1e-9);
        assert_relative_eq!(b.center().z, 3.0, epsilon = 1e-9);
        assert_relative_eq!(b.size().x, 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_custom_outer_edge_shift() {
        let mut s = stair(StairShape::Custom);
        s.segments = vec![
            StairSegment::Flight {
                steps: 4,
                width: Some(1.0),
            },
            StairSegment::Turn {
                direction: TurnDirection::Right,
                landing: [1.6, 1.6],
            },
            StairSegment::Flight {
                steps: 4,
                width: Some(1.0),
            },
        ];
        let layout = PenetrationComputer::new().stair_layout(&s, None, None);
        let landing = &layout.landings[0];
        let second = &layout.flights[1];
        // Heading east after a right turn from the bottom entry; the narrower
        // flight hugs the landing's north (outer) edge.
        assert_relative_eq!(second.forward.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(second.start.y - 0.5, landing.min.y, epsilon = 1e-9);
    }

    #[test]
    fn test_lift_penetration_headroom() {
        let lift = LiftSpec {
            position: Point2::new(1.0, 1.0),
            width: 2.0,
            depth: 2.5,
            doors: vec![PlanDirection::Bottom],
        };
        let p = PenetrationComputer::new().lift_penetration("l", &lift, 3.0, 3.0);
        assert_eq!(p.source, PenetrationSource::Lift("l".into()));
        assert_relative_eq!(p.bounds.min.y, 3.0);
        assert_relative_eq!(p.bounds.max.y, 7.0);
        assert_relative_eq!(p.bounds.max.z, 3.5);
    }
}
