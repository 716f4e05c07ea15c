use super::{Car, CarKind, Course, PoliceController, RacerController, TrafficController};
use crate::math::sign;
use glam::Vec2;

/// Control policy attached to one car. Dispatch is a plain match on the
/// variant; there is no behavior hierarchy on the cars themselves.
#[derive(Clone, Debug)]
pub enum Controller {
    /// Controls are written from outside between steps.
    Player,
    Racer(RacerController),
    Police(PoliceController),
    Traffic(TrafficController),
}

impl Controller {
    #[must_use]
    pub const fn kind(&self) -> CarKind {
        match self {
            Self::Player => CarKind::Player,
            Self::Racer(_) => CarKind::Racer,
            Self::Police(_) => CarKind::Police,
            Self::Traffic(_) => CarKind::Traffic,
        }
    }

    /// Produce this step's driving intent. `before`/`after` are the other
    /// cars, split around this one, read live in list order.
    pub(crate) fn drive(
        &mut self,
        car: &mut Car,
        before: &[Car],
        after: &[Car],
        course: &Course,
        player_pos: Vec2,
        dt: f32,
    ) {
        match self {
            Self::Player => {}
            Self::Racer(c) => c.drive(car, before, after, course, dt),
            Self::Police(c) => c.drive(car, before, after, course, player_pos, dt),
            Self::Traffic(c) => c.drive(car, course, dt),
        }
    }
}

pub(crate) const AVOID_RADIUS: f32 = 60.0;
pub(crate) const AVOID_AHEAD: f32 = 50.0;
/// Below this speed a car counts as motionless for stuck detection.
pub(crate) const STUCK_SPEED: f32 = 5.0;

/// Steer away from nearby cars roughly ahead of us; optionally brake when
/// running up behind a slower one.
pub(crate) fn avoid_others<'a>(
    car: &mut Car,
    others: impl Iterator<Item = &'a Car>,
    steer_nudge: f32,
    brake_when_overtaking: bool,
    ignore_player: bool,
) {
    let fwd = car.forward();
    let right = car.right();
    for other in others {
        if ignore_player && other.kind == CarKind::Player {
            continue;
        }
        let delta = other.pos - car.pos;
        let d = delta.length();
        if d < AVOID_RADIUS && d > 0.0 {
            let ahead = delta.dot(fwd);
            if ahead > 0.0 && ahead < AVOID_AHEAD {
                let side = delta.dot(right);
                car.controls.steer -= sign(side) * steer_nudge;
                if brake_when_overtaking && car.speed > other.speed + 10.0 {
                    car.controls.brake = 0.3;
                }
            }
        }
    }
}

/// Teleports a motionless car back onto the road after a timeout.
///
/// Recovery is deliberate behavior, not an error path: the car lands on
/// the nearest road point facing along it, at a fixed speed, with its
/// drift velocity cleared.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct StuckWatchdog {
    timer: f32,
}

impl StuckWatchdog {
    pub(crate) fn update(
        &mut self,
        car: &mut Car,
        course: &Course,
        dt: f32,
        timeout: f32,
        recovery_speed: f32,
    ) -> bool {
        if car.speed.abs() >= STUCK_SPEED {
            self.timer = 0.0;
            return false;
        }

        self.timer += dt;
        if self.timer <= timeout {
            return false;
        }

        if let Some(hit) = course.nearest_road(car.pos) {
            car.pos = hit.point;
            car.angle = hit.angle;
        } else {
            let t = course.nearest_t(car.pos);
            car.pos = course.point_at(t);
            car.angle = course.tangent_at(t).to_angle();
        }
        car.speed = recovery_speed;
        car.vel = Vec2::ZERO;
        self.timer = 0.0;
        log::debug!("{} recovered from being stuck", car.name);
        true
    }
}
