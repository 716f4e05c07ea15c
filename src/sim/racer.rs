use super::controller::{StuckWatchdog, avoid_others};
use super::{Car, Course};
use crate::consts;
use crate::math::normalize_angle;
use glam::Vec2;

const STEER_GAIN: f32 = 2.5;
const LOOKAHEAD: f32 = 130.0;
/// Curvature samples taken ahead when picking a corner speed.
const CURVE_SAMPLES: u32 = 6;
const CURVE_SAMPLE_STEP: f32 = 40.0;
const AVOID_NUDGE: f32 = 0.4;

/// Per-driver tuning for an AI racer.
#[derive(Clone, Copy, Debug)]
pub struct DriverProfile {
    /// Fraction of the theoretical corner speed the driver dares to carry.
    pub skill: f32,
    /// Scales how hard the driver brakes when over speed.
    pub aggression: f32,
    /// Fraction of the base top speed this car gets.
    pub top_speed_factor: f32,
    /// Lateral bias of the driven line, in half-track-widths.
    pub line_offset: f32,
}

/// Drives an AI racer: spline following on a circuit, road-plus-finish
/// blending on an open network. Only local lookahead heuristics; no
/// global pathing.
#[derive(Clone, Debug)]
pub struct RacerController {
    profile: DriverProfile,
    stuck: StuckWatchdog,
}

impl RacerController {
    #[must_use]
    pub fn new(profile: DriverProfile) -> Self {
        Self {
            profile,
            stuck: StuckWatchdog::default(),
        }
    }

    #[must_use]
    pub const fn profile(&self) -> DriverProfile {
        self.profile
    }

    pub(crate) fn drive(
        &mut self,
        car: &mut Car,
        before: &[Car],
        after: &[Car],
        course: &Course,
        dt: f32,
    ) {
        if course.is_open() {
            self.drive_open(car, course, dt);
        } else {
            self.drive_circuit(car, course);
        }
        avoid_others(
            car,
            before.iter().chain(after.iter()),
            AVOID_NUDGE,
            true,
            false,
        );
        self.stuck.update(
            car,
            course,
            dt,
            consts::AI_STUCK_TIMEOUT,
            consts::AI_STUCK_RECOVERY_SPEED,
        );
    }

    fn drive_circuit(&mut self, car: &mut Car, course: &Course) {
        let current_t = course.nearest_t(car.pos);

        // pick a steering target ahead on the spline, biased by our line
        let look_dist = LOOKAHEAD + car.speed.abs() * 0.2;
        let ahead_t = (current_t + look_dist / course.total_length()).rem_euclid(1.0);
        let target = course.point_at(ahead_t)
            + course.normal_at(ahead_t)
                * (self.profile.line_offset * course.width_at(ahead_t) * 0.5);
        self.steer_toward(car, target);

        // corner speed from the worst curvature coming up
        let mut max_curvature = 0.0f32;
        for i in 1..=CURVE_SAMPLES {
            let ct = (current_t + i as f32 * CURVE_SAMPLE_STEP / course.total_length())
                .rem_euclid(1.0);
            max_curvature = max_curvature.max(course.curvature_at(ct));
        }
        let safe_speed =
            (car.config.max_speed * (1.0 - max_curvature * 1.8) * self.profile.skill).max(60.0);
        self.converge_speed(car, safe_speed, 100.0);
    }

    fn drive_open(&mut self, car: &mut Car, course: &Course, _dt: f32) {
        let finish = course.finish_point().unwrap_or(car.pos);

        let Some(road) = course.nearest_road(car.pos) else {
            // off the mapped network entirely: limp toward the finish
            let target_angle = (finish - car.pos).to_angle();
            car.controls.steer =
                (normalize_angle(target_angle - car.angle) * STEER_GAIN).clamp(-1.0, 1.0);
            car.controls.throttle = 0.5;
            car.controls.brake = 0.0;
            car.controls.handbrake = false;
            return;
        };

        let look_dist = LOOKAHEAD + car.speed.abs() * 0.25;
        let road_dir = Vec2::from_angle(road.angle);
        let to_finish = finish - car.pos;
        let finish_dir = to_finish.normalize_or(Vec2::X);

        // follow the road while it points at the finish, lean toward the
        // finish harder when it does not, to escape dead ends
        let blend = if road_dir.dot(finish_dir) > 0.2 { 0.7 } else { 0.4 };
        let mut target = car.pos + (road_dir * blend + finish_dir * (1.0 - blend)) * look_dist;
        target += road.normal * (self.profile.line_offset * road.width * 0.3);

        let target_angle = (target - car.pos).to_angle();
        let angle_diff = normalize_angle(target_angle - car.angle);
        car.controls.steer = (angle_diff * STEER_GAIN).clamp(-1.0, 1.0);

        let safe_speed = (car.config.max_speed * (1.0 - angle_diff.abs() * 1.2)
            * self.profile.skill)
            .max(50.0);
        self.converge_speed(car, safe_speed, 100.0);
    }

    fn steer_toward(&self, car: &mut Car, target: Vec2) {
        let target_angle = (target - car.pos).to_angle();
        car.controls.steer =
            (normalize_angle(target_angle - car.angle) * STEER_GAIN).clamp(-1.0, 1.0);
    }

    /// Asymmetric speed convergence: brake harder than we accelerate,
    /// scaled by driver aggression.
    fn converge_speed(&self, car: &mut Car, safe_speed: f32, gain_divisor: f32) {
        if car.speed > safe_speed * 1.05 {
            car.controls.throttle = 0.0;
            car.controls.brake = ((car.speed - safe_speed) / gain_divisor).clamp(0.1, 0.8)
                * self.profile.aggression;
        } else {
            car.controls.throttle = ((safe_speed - car.speed) / gain_divisor).clamp(0.3, 1.0);
            car.controls.brake = 0.0;
        }
        car.controls.handbrake = false;
    }
}
