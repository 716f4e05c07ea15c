use super::controller::StuckWatchdog;
use super::{Car, Course};
use crate::consts::{self, traffic};
use crate::math::normalize_angle;

/// Drives a civilian car: hug the nearest road at a per-car cruise speed.
/// Steering is exponentially smoothed so lane following does not twitch.
/// No pursuit, no evasion, and the player is just another obstacle the
/// collision pass handles.
#[derive(Clone, Debug)]
pub struct TrafficController {
    cruise_speed: f32,
    stuck: StuckWatchdog,
}

impl TrafficController {
    #[must_use]
    pub fn new(cruise_speed: f32) -> Self {
        Self {
            cruise_speed,
            stuck: StuckWatchdog::default(),
        }
    }

    #[must_use]
    pub const fn cruise_speed(&self) -> f32 {
        self.cruise_speed
    }

    pub(crate) fn drive(&mut self, car: &mut Car, course: &Course, dt: f32) {
        let Some(road) = course.nearest_road(car.pos) else {
            car.controls.throttle = 0.0;
            car.controls.brake = 0.5;
            car.controls.steer = 0.0;
            car.controls.handbrake = false;
            return;
        };

        let angle_diff = normalize_angle(road.angle - car.angle);
        let raw_steer = (angle_diff * traffic::STEER_GAIN).clamp(-1.0, 1.0);
        car.controls.steer += (raw_steer - car.controls.steer) * traffic::STEER_SMOOTH;

        // ease off proportionally to how hard the road bends away
        let speed_target = self.cruise_speed * (1.0 - angle_diff.abs() * 0.5);
        if car.speed > speed_target {
            car.controls.throttle = 0.0;
            car.controls.brake = ((car.speed - speed_target) / 60.0).clamp(0.1, 0.5);
        } else {
            car.controls.throttle = ((speed_target - car.speed) / 60.0).clamp(0.2, 0.5);
            car.controls.brake = 0.0;
        }
        car.controls.handbrake = false;

        self.stuck.update(
            car,
            course,
            dt,
            consts::AI_STUCK_TIMEOUT,
            consts::AI_STUCK_RECOVERY_SPEED,
        );
    }
}
