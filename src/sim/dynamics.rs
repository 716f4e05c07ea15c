//! The per-car integrator.
//!
//! Longitudinal forces act on a signed scalar speed; steering maps to yaw
//! rate with authority scaled by speed; world velocity is rebuilt each step
//! by pinning the forward component to the scalar speed while a fraction of
//! the lateral component survives, which is what makes cars drift.

use super::{Car, Course, Surface};
use crate::consts;

/// Advance one car by `dt` on the given surface.
///
/// After every call `car.speed` lies in `[reverse_max, max_speed]`.
pub fn integrate(car: &mut Car, dt: f32, surface: Surface) {
    car.surface = surface;
    let grip = surface.grip();
    let cfg = car.config;

    // longitudinal
    let mut force = 0.0;
    if car.controls.throttle > 0.0 {
        force = cfg.accel * car.controls.throttle * grip;
    }
    force -= cfg.brake_force * car.controls.brake;
    force -= car.speed * car.speed.abs() * cfg.drag;
    let travel_dir = if car.speed == 0.0 { 1.0 } else { car.speed.signum() };
    force -= cfg.rolling_resist * travel_dir;
    force -= surface.drag() * travel_dir;
    car.speed = (car.speed + force * dt).clamp(cfg.reverse_max, cfg.max_speed);

    // steering: no authority at a standstill, reduced near top speed
    let speed_factor = (car.speed.abs() / consts::SPEED_FACTOR_DIVISOR).clamp(0.0, 1.0);
    let mut effective_turn =
        cfg.turn_rate * (1.0 - car.speed.abs() / cfg.max_speed * consts::TURN_REDUCTION_AT_SPEED);
    if car.controls.handbrake {
        effective_turn *= consts::HANDBRAKE_TURN_MULT;
    }
    car.angular_vel = car.controls.steer * effective_turn * speed_factor;
    car.angle += car.angular_vel * dt;

    // drift decomposition around the new heading
    let fwd = car.forward();
    let right = car.right();
    if car.vel.x.abs() + car.vel.y.abs() < 0.1 && car.speed.abs() > 0.1 {
        car.vel = fwd * car.speed;
    }
    let mut lateral = car.vel.dot(right);
    let retention = if car.controls.handbrake {
        consts::HANDBRAKE_DRIFT
    } else {
        cfg.drift_factor * grip
    };
    lateral *= retention;

    car.is_drifting = lateral.abs() > consts::DRIFT_THRESHOLD;
    car.vel = fwd * car.speed + right * lateral;
    car.pos += car.vel * dt;

    car.distance += car.speed.abs() * dt;
}

/// Update lap/progress bookkeeping from the car's new position.
pub fn update_progress(car: &mut Car, course: &Course) {
    match course {
        Course::Open(net) => {
            let to_finish = net.distance_to_finish(car.pos);
            car.stats.race_progress =
                (1.0 - to_finish / net.total_length()).clamp(0.0, 1.0);
            car.stats.lap_progress = car.stats.race_progress;
            if to_finish < consts::FINISH_RADIUS {
                car.stats.finished = true;
            }
        }
        Course::Circuit(track) => {
            let prev = car.stats.lap_progress;
            let t = track.nearest_t(car.pos);
            car.stats.lap_progress = t;

            car.stats
                .mark_checkpoint((t * consts::NUM_CHECKPOINTS as f32) as u32);

            // forward wraparound with enough checkpoints visited is a lap;
            // the checkpoint guard rejects wrong-way and cut laps
            if prev > 0.9
                && t < 0.1
                && car.stats.checkpoints_count() >= consts::NUM_CHECKPOINTS - 1
            {
                car.stats.current_lap += 1;
                let lap_time = car.stats.total_time - car.stats.lap_start_time;
                car.stats.lap_times.push(lap_time);
                if lap_time < car.stats.best_lap {
                    car.stats.best_lap = lap_time;
                }
                car.stats.lap_start_time = car.stats.total_time;
                car.stats.clear_checkpoints();
            }

            // crossing the line backwards takes the lap back
            if prev < 0.1 && t > 0.9 {
                car.stats.current_lap = car.stats.current_lap.saturating_sub(1);
                car.stats.clear_checkpoints();
            }

            car.stats.race_progress = car.stats.current_lap as f32 + t;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{CarConfig, CarKind, RoadSegment, RoadNetwork, SpawnPose, TrackGeometry};

    fn test_car() -> Car {
        Car::new(
            CarKind::Player,
            SpawnPose::default(),
            CarConfig::STREET,
            "#FFD700",
            "PLAYER",
        )
    }

    #[test]
    fn full_throttle_from_rest_matches_the_force_model() {
        let mut car = test_car();
        car.controls.throttle = 1.0;
        integrate(&mut car, 1.0, Surface::Asphalt);
        // accel - rolling resistance, no drag at rest
        let expected = consts::CAR_ACCEL - consts::CAR_ROLLING_RESIST;
        assert!(
            (car.speed - expected).abs() < 1e-3,
            "speed {} expected {expected}",
            car.speed
        );
    }

    #[test]
    fn speed_stays_clamped_for_any_step_size() {
        for i in 0..=50 {
            let dt = i as f32 * 0.001;
            let mut car = test_car();
            car.speed = car.config.max_speed;
            car.controls.throttle = 1.0;
            integrate(&mut car, dt, Surface::Asphalt);
            assert!(car.speed <= car.config.max_speed);

            let mut car = test_car();
            car.speed = car.config.reverse_max;
            car.controls.brake = 1.0;
            integrate(&mut car, dt, Surface::Asphalt);
            assert!(car.speed >= car.config.reverse_max);
        }
    }

    #[test]
    fn no_steering_at_a_standstill() {
        let mut car = test_car();
        car.controls.steer = 1.0;
        integrate(&mut car, 0.016, Surface::Asphalt);
        // rolling resistance leaves a sub-perceptible creep, nothing more
        assert!(car.angular_vel.abs() < 1e-3);
        assert!(car.angle.abs() < 1e-4);
    }

    #[test]
    fn handbrake_retains_lateral_velocity_and_flags_drift() {
        let mut car = test_car();
        car.speed = 200.0;
        // sliding sideways at 60 px/s
        car.vel = car.forward() * 200.0 + car.right() * 60.0;
        car.controls.handbrake = true;
        integrate(&mut car, 0.016, Surface::Asphalt);
        assert!(car.is_drifting);
        let lateral = car.vel.dot(car.right());
        assert!(lateral > 40.0, "slide bled off too fast: {lateral}");
    }

    #[test]
    fn grass_scrubs_more_lateral_velocity_than_asphalt() {
        let run = |surface| {
            let mut car = test_car();
            car.speed = 200.0;
            car.vel = car.forward() * 200.0 + car.right() * 60.0;
            integrate(&mut car, 0.016, surface);
            car.vel.dot(car.right()).abs()
        };
        assert!(run(Surface::Grass) < run(Surface::Asphalt));
    }

    #[test]
    fn odometer_accumulates_absolute_speed() {
        let mut car = test_car();
        car.speed = -50.0;
        car.vel = car.forward() * -50.0;
        integrate(&mut car, 0.5, Surface::Asphalt);
        assert!(car.distance > 20.0);
    }

    #[test]
    fn lap_counts_once_at_the_guarded_wraparound() {
        let track = TrackGeometry::classic();
        let course = Course::Circuit(track);
        let mut car = test_car();

        // a full lap's worth of checkpoints, then the line crossing
        for bucket in 0..consts::NUM_CHECKPOINTS {
            car.stats.mark_checkpoint(bucket);
        }
        car.stats.lap_progress = 0.95;
        for t in [0.95, 0.97, 0.99, 0.02, 0.05] {
            car.pos = course.point_at(t);
            update_progress(&mut car, &course);
        }
        assert_eq!(car.stats.current_lap, 1);
        assert_eq!(car.stats.lap_times.len(), 1);
    }

    #[test]
    fn wraparound_without_checkpoints_is_not_a_lap() {
        let course = Course::Circuit(TrackGeometry::classic());
        let mut car = test_car();
        car.stats.lap_progress = 0.95;
        for t in [0.95, 0.99, 0.02] {
            car.pos = course.point_at(t);
            update_progress(&mut car, &course);
        }
        assert_eq!(car.stats.current_lap, 0);
    }

    #[test]
    fn reversing_over_the_line_decrements_the_lap() {
        let course = Course::Circuit(TrackGeometry::classic());
        let mut car = test_car();
        car.stats.current_lap = 2;
        car.stats.lap_progress = 0.02;
        car.pos = course.point_at(0.95);
        update_progress(&mut car, &course);
        assert_eq!(car.stats.current_lap, 1);
    }

    #[test]
    fn open_world_progress_and_finish_detection() {
        let points: Vec<glam::Vec2> = (0..=40)
            .map(|i| glam::Vec2::new(i as f32 * 50.0, 0.0))
            .collect();
        let net = RoadNetwork::new(
            vec![RoadSegment {
                points,
                width: 30.0,
                kind: "residential".into(),
                name: String::new(),
                oneway: false,
            }],
            glam::Vec2::ZERO,
            glam::Vec2::new(2000.0, 0.0),
        );
        let course = Course::Open(net);
        let mut car = test_car();

        car.pos = glam::Vec2::new(1000.0, 0.0);
        update_progress(&mut car, &course);
        assert!((car.stats.race_progress - 0.5).abs() < 1e-3);
        assert!(!car.stats.finished);

        car.pos = glam::Vec2::new(1950.0, 0.0);
        update_progress(&mut car, &course);
        assert!(car.stats.finished);
    }
}
