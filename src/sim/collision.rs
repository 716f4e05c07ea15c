//! Post-integration consistency: pairwise separation, circuit boundary
//! pushback, and open-world off-road correction.
//!
//! The pairwise pass mutates cars in list order, so a different agent
//! ordering can yield slightly different contact outcomes. That matches
//! how the game has always felt and keeps replays reproducible.

use super::{Car, RoadNetwork, Surface, TrackGeometry};
use crate::consts;
use crate::math::{closest_point_on_segment, normalize_angle};

/// Separate every overlapping car pair and kill their closing velocity.
pub(crate) fn resolve_pairs(cars: &mut [Car]) {
    for i in 0..cars.len() {
        for j in (i + 1)..cars.len() {
            let (head, tail) = cars.split_at_mut(j);
            let a = &mut head[i];
            let b = &mut tail[0];

            let delta = b.pos - a.pos;
            let dist = delta.length();
            if dist >= consts::CAR_MIN_SEPARATION || dist <= 0.0 {
                continue;
            }

            let normal = delta / dist;
            let overlap = (consts::CAR_MIN_SEPARATION - dist) / 2.0;
            a.pos -= normal * overlap;
            b.pos += normal * overlap;

            let closing = (b.vel - a.vel).dot(normal);
            if closing < 0.0 {
                let correction = normal * (closing * consts::PAIR_VEL_CORRECTION);
                a.vel += correction;
                b.vel -= correction;
                a.speed *= consts::PAIR_SPEED_DECAY;
                b.speed *= consts::PAIR_SPEED_DECAY;
            }
        }
    }
}

/// Push a car off the circuit's boundary fence toward the centerline.
/// Checks each footprint corner against the edges indexed near the car.
pub(crate) fn resolve_boundary(car: &mut Car, track: &TrackGeometry) -> bool {
    let segments = track.segments_near(car.pos);
    if segments.is_empty() {
        return false;
    }

    for corner in car.corners() {
        for seg in &segments {
            let hit = closest_point_on_segment(corner, seg.a, seg.b);
            if hit.dist >= consts::BOUNDARY_HIT_DIST {
                continue;
            }

            let center = track.point_at(track.nearest_t(car.pos));
            let to_center = (center - car.pos).normalize_or_zero();
            let push = (consts::BOUNDARY_HIT_DIST - hit.dist) * consts::BOUNDARY_PUSH_SCALE;
            car.pos += to_center * push;
            car.speed *= consts::BOUNDARY_SPEED_DECAY;
            return true;
        }
    }
    false
}

/// Herd an off-road car back toward the nearest road. Grass gets a strong
/// distance-scaled push, a lateral-velocity bleed, and a heading nudge;
/// curbs get a mild centering push.
pub(crate) fn correct_off_road(car: &mut Car, network: &RoadNetwork) {
    match network.surface_at(car.pos) {
        Surface::Asphalt => {}
        Surface::Grass => {
            let Some(road) = network.nearest_road(car.pos) else {
                return;
            };
            let delta = road.point - car.pos;
            let dist = delta.length();
            if dist > 0.0 {
                let dir = delta / dist;
                let push = (dist * consts::COLLISION_PUSH_FACTOR).min(consts::COLLISION_PUSH_MAX);
                car.pos += dir * push;
            }
            car.speed *= consts::COLLISION_SPEED_DECAY;

            // bleed lateral velocity so the slide stops carrying the car
            // further off the road
            let right = car.right();
            let lateral = car.vel.dot(right);
            car.vel -= right * (lateral * 0.5);

            if dist > 0.0 {
                let to_road = delta.y.atan2(delta.x);
                car.angle += normalize_angle(to_road - car.angle) * consts::OFF_ROAD_CORRECTION;
            }
        }
        Surface::Curb => {
            let Some(road) = network.nearest_road(car.pos) else {
                return;
            };
            let delta = road.point - car.pos;
            let dist = delta.length();
            if dist > 0.0 {
                car.pos += delta / dist * consts::OFF_ROAD_PUSH_SPEED;
            }
            car.speed *= consts::OFF_ROAD_SPEED_DECAY;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{CarConfig, CarKind, RoadSegment, SpawnPose};
    use glam::Vec2;

    fn car_at(x: f32, y: f32) -> Car {
        Car::new(
            CarKind::Racer,
            SpawnPose {
                pos: Vec2::new(x, y),
                angle: 0.0,
            },
            CarConfig::STREET,
            "#FFF",
            "TEST",
        )
    }

    #[test]
    fn overlapping_pair_is_pushed_apart_symmetrically() {
        let mut cars = vec![car_at(0.0, 0.0), car_at(10.0, 0.0)];
        resolve_pairs(&mut cars);
        let gap = cars[1].pos.x - cars[0].pos.x;
        assert!((gap - consts::CAR_MIN_SEPARATION).abs() < 1e-3);
        // both moved by the same amount
        assert!((cars[0].pos.x + 9.0).abs() < 1e-3);
        assert!((cars[1].pos.x - 19.0).abs() < 1e-3);
    }

    #[test]
    fn closing_velocity_is_damped_inelastically() {
        let mut cars = vec![car_at(0.0, 0.0), car_at(20.0, 0.0)];
        cars[0].speed = 200.0;
        cars[0].vel = Vec2::new(200.0, 0.0);
        cars[1].speed = 0.0;
        resolve_pairs(&mut cars);
        // closing speed -200 along the normal, half corrected on each side
        assert!((cars[0].vel.x - 100.0).abs() < 1e-3);
        assert!((cars[1].vel.x - 100.0).abs() < 1e-3);
        assert!((cars[0].speed - 200.0 * consts::PAIR_SPEED_DECAY).abs() < 1e-3);
    }

    #[test]
    fn separating_pair_keeps_its_velocity() {
        let mut cars = vec![car_at(0.0, 0.0), car_at(20.0, 0.0)];
        cars[1].vel = Vec2::new(300.0, 0.0);
        cars[1].speed = 300.0;
        resolve_pairs(&mut cars);
        assert_eq!(cars[1].vel, Vec2::new(300.0, 0.0));
        assert_eq!(cars[1].speed, 300.0);
    }

    #[test]
    fn distant_cars_are_untouched() {
        let mut cars = vec![car_at(0.0, 0.0), car_at(500.0, 0.0)];
        resolve_pairs(&mut cars);
        assert_eq!(cars[0].pos, Vec2::ZERO);
        assert_eq!(cars[1].pos, Vec2::new(500.0, 0.0));
    }

    #[test]
    fn grass_correction_pushes_toward_the_road_and_scrubs_speed() {
        let points: Vec<Vec2> = (0..=40).map(|i| Vec2::new(i as f32 * 50.0, 0.0)).collect();
        let network = RoadNetwork::new(
            vec![RoadSegment {
                points,
                width: 30.0,
                kind: "residential".into(),
                name: String::new(),
                oneway: false,
            }],
            Vec2::ZERO,
            Vec2::new(2000.0, 0.0),
        );

        let mut car = car_at(500.0, 80.0);
        car.speed = 200.0;
        car.vel = Vec2::new(200.0, 40.0);
        let before_y = car.pos.y;
        correct_off_road(&mut car, &network);
        assert!(car.pos.y < before_y, "no push back toward the road");
        assert!((car.speed - 200.0 * consts::COLLISION_SPEED_DECAY).abs() < 1e-3);
        // heading bent toward the road (which is toward -y)
        assert!(car.angle < 0.0);
    }

    #[test]
    fn curb_correction_is_mild() {
        let points: Vec<Vec2> = (0..=40).map(|i| Vec2::new(i as f32 * 50.0, 0.0)).collect();
        let network = RoadNetwork::new(
            vec![RoadSegment {
                points,
                width: 30.0,
                kind: "residential".into(),
                name: String::new(),
                oneway: false,
            }],
            Vec2::ZERO,
            Vec2::new(2000.0, 0.0),
        );

        let mut car = car_at(500.0, 28.0);
        car.speed = 100.0;
        correct_off_road(&mut car, &network);
        assert!((car.pos.y - (28.0 - consts::OFF_ROAD_PUSH_SPEED)).abs() < 1e-3);
        assert!((car.speed - 100.0 * consts::OFF_ROAD_SPEED_DECAY).abs() < 1e-3);
    }

    #[test]
    fn boundary_fence_pushes_back_onto_the_circuit() {
        let track = TrackGeometry::classic();
        // park a car along the left fence with its outer corners on it
        let t = 0.2;
        let i = (t * consts::TRACK_SAMPLES as f32) as usize;
        let edge = track.left_boundary()[i];
        let normal = track.normal_at(t);
        let tangent = track.tangent_at(t);
        let start = edge - normal * (consts::CAR_WIDTH / 2.0);
        let mut car = car_at(start.x, start.y);
        car.angle = tangent.to_angle();
        car.speed = 150.0;

        let hit = resolve_boundary(&mut car, &track);
        assert!(hit);
        assert!((car.speed - 150.0 * consts::BOUNDARY_SPEED_DECAY).abs() < 1e-3);
        // pushed toward the centerline
        let center = track.point_at(track.nearest_t(start));
        assert!(car.pos.distance(center) < start.distance(center));
    }

    #[test]
    fn boundary_pass_ignores_cars_in_the_infield() {
        let track = TrackGeometry::classic();
        let center = track.point_at(0.5);
        let mut car = car_at(center.x, center.y);
        assert!(!resolve_boundary(&mut car, &track));
    }
}
