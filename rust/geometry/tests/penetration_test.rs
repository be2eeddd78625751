// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use approx::assert_relative_eq;
use floorplan_geometry::{
    Aabb, PenetrationComputer, PlanDirection, Point2, StairSegment, StairShape, StairSpec,
    TurnDirection,
};

fn assert_box(b: &Aabb, x: (f64, f64), z: (f64, f64)) {
    assert_relative_eq!(b.min.x, x.0, epsilon = 1e-9);
    assert_relative_eq!(b.max.x, x.1, epsilon = 1e-9);
    assert_relative_eq!(b.min.z, z.0, epsilon = 1e-9);
    assert_relative_eq!(b.max.z, z.1, epsilon = 1e-9);
}

#[test]
fn straight_stair_climbing_top() {
    let (x0, z0) = (4.0, 2.5);
    let stair = StairSpec {
        rise: Some(3.0),
        riser: Some(0.18),
        tread: Some(0.28),
        direction: Some(PlanDirection::Top),
        ..StairSpec::straight(Point2::new(x0, z0))
    };

    let computer = PenetrationComputer::new();
    let layout = computer.stair_layout(&stair, None, None);
    assert_eq!(layout.total_steps, 17);

    let p = computer.stair_penetration("st1", &stair, 0.0, None, None);
    assert_box(&p.bounds, (x0, x0 + 1.0), (z0, z0 + 4.76));
    assert_relative_eq!(p.bounds.min.y, 0.0);
    assert_relative_eq!(p.bounds.max.y, 3.0);
}

#[test]
fn straight_stair_takes_floor_height_as_rise() {
    let stair = StairSpec::straight(Point2::new(0.0, 0.0));
    let p = PenetrationComputer::new().stair_penetration("st1", &stair, 3.0, None, Some(3.6));
    assert_relative_eq!(p.bounds.min.y, 3.0);
    assert_relative_eq!(p.bounds.max.y, 6.6);
    assert_relative_eq!(p.bounds.size().z, 20.0 * 0.28, epsilon = 1e-9);
}

#[test]
fn custom_stair_rotates_with_entry() {
    let (x0, z0) = (10.0, 10.0);
    let custom = |entry| StairSpec {
        shape: StairShape::Custom,
        entry: Some(entry),
        segments: vec![
            StairSegment::Flight {
                steps: 10,
                width: Some(1.0),
            },
            StairSegment::Turn {
                direction: TurnDirection::Right,
                landing: [1.2, 1.2],
            },
        ],
        ..StairSpec::straight(Point2::new(x0, z0))
    };

    let computer = PenetrationComputer::new();
    let bounds = |entry| {
        computer
            .stair_penetration("c1", &custom(entry), 0.0, None, None)
            .bounds
    };

    // Local trace is 1.2 wide and 10 * 0.28 + 1.2 = 4.0 long
    assert_box(&bounds(PlanDirection::Bottom), (x0, x0 + 1.2), (z0, z0 + 4.0));
    assert_box(&bounds(PlanDirection::Top), (x0 - 1.2, x0), (z0 - 4.0, z0));
    assert_box(&bounds(PlanDirection::Right), (x0, x0 + 4.0), (z0 - 1.2, z0));
    assert_box(&bounds(PlanDirection::Left), (x0 - 4.0, x0), (z0, z0 + 1.2));
}

#[test]
fn unknown_shape_falls_back_to_straight() {
    let json = r#""corkscrew""#;
    let shape: StairShape = serde_json::from_str(json).unwrap();
    let computer = PenetrationComputer::new();
    let odd = StairSpec {
        shape,
        ..StairSpec::straight(Point2::new(1.0, 1.0))
    };
    let straight = StairSpec::straight(Point2::new(1.0, 1.0));
    assert_eq!(
        computer.stair_penetration("a", &odd, 0.0, None, None),
        computer.stair_penetration("a", &straight, 0.0, None, None)
    );
}
