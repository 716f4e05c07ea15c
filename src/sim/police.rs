use super::controller::{StuckWatchdog, avoid_others};
use super::{Car, CarControls, Course};
use crate::consts::police;
use crate::math::normalize_angle;
use glam::Vec2;

const CHASE_STEER_GAIN: f32 = 3.0;
const PATROL_STEER_GAIN: f32 = 2.0;
const CHASE_GAIN_DIVISOR: f32 = 80.0;
const AVOID_NUDGE: f32 = 0.5;
const STUCK_TIMEOUT: f32 = 2.0;
const STUCK_RECOVERY_SPEED: f32 = 50.0;

/// Pursuit state. `Patrol`→`Chasing` at `CHASE_RANGE`, back at
/// `GIVE_UP_RANGE`; the gap between the two is hysteresis so the state
/// does not flap at the threshold.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PoliceState {
    #[default]
    Patrol,
    Chasing,
    /// Standing down after issuing a warning; navigation is ignored and
    /// the car is held at a dead stop until the timer runs out.
    Frozen,
}

/// Read-only pursuit info for the HUD.
#[derive(Clone, Copy, Debug)]
pub struct PoliceStatus {
    /// Index of the car in the race's car list.
    pub car: usize,
    pub is_chasing: bool,
    pub is_frozen: bool,
    pub radar_radius: f32,
    pub chase_range: f32,
}

/// Drives a police cruiser: patrol the nearest road at low speed, chase
/// the player inside range, freeze after a warning.
#[derive(Clone, Debug)]
pub struct PoliceController {
    state: PoliceState,
    freeze_timer: f32,
    stuck: StuckWatchdog,
}

impl Default for PoliceController {
    fn default() -> Self {
        Self::new()
    }
}

impl PoliceController {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: PoliceState::Patrol,
            freeze_timer: 0.0,
            stuck: StuckWatchdog::default(),
        }
    }

    #[must_use]
    pub const fn state(&self) -> PoliceState {
        self.state
    }

    #[must_use]
    pub const fn is_chasing(&self) -> bool {
        matches!(self.state, PoliceState::Chasing)
    }

    #[must_use]
    pub const fn is_frozen(&self) -> bool {
        matches!(self.state, PoliceState::Frozen)
    }

    /// Stand down for `FREEZE_DURATION`, e.g. right after issuing a
    /// warning. The cruiser unfreezes into `Patrol` on its own.
    pub fn freeze(&mut self) {
        self.state = PoliceState::Frozen;
        self.freeze_timer = police::FREEZE_DURATION;
    }

    /// True when the player is inside the radar ring of an active officer.
    #[must_use]
    pub fn check_arrest(&self, car: &Car, player_pos: Vec2) -> bool {
        !self.is_frozen() && car.pos.distance(player_pos) < police::RADAR_RADIUS
    }

    pub(crate) fn drive(
        &mut self,
        car: &mut Car,
        before: &[Car],
        after: &[Car],
        course: &Course,
        player_pos: Vec2,
        dt: f32,
    ) {
        if self.is_frozen() {
            self.freeze_timer -= dt;
            car.controls = CarControls {
                brake: 1.0,
                ..CarControls::DEFAULT
            };
            car.speed = 0.0;
            car.vel = Vec2::ZERO;
            if self.freeze_timer <= 0.0 {
                self.state = PoliceState::Patrol;
            }
            return;
        }

        let dist_to_player = car.pos.distance(player_pos);
        if dist_to_player < police::CHASE_RANGE {
            self.state = PoliceState::Chasing;
        }
        if dist_to_player > police::GIVE_UP_RANGE {
            self.state = PoliceState::Patrol;
        }

        match self.state {
            PoliceState::Chasing => self.chase(car, course, player_pos),
            PoliceState::Patrol => Self::patrol(car, course),
            PoliceState::Frozen => unreachable!(),
        }

        // never swerve around the one car we are chasing
        avoid_others(
            car,
            before.iter().chain(after.iter()),
            AVOID_NUDGE,
            false,
            true,
        );
        self.stuck
            .update(car, course, dt, STUCK_TIMEOUT, STUCK_RECOVERY_SPEED);
    }

    fn chase(&self, car: &mut Car, course: &Course, player_pos: Vec2) {
        let to_player = player_pos - car.pos;
        let dist = to_player.length().max(1.0);
        let player_dir = to_player / dist;

        // blend road following with direct pursuit; go more direct when
        // the road points away from the player
        let target = if let Some(road) = course.nearest_road(car.pos) {
            let road_dir = Vec2::from_angle(road.angle);
            let blend = if road_dir.dot(player_dir) > 0.3 { 0.5 } else { 0.2 };
            let look_dist = police::LOOKAHEAD + car.speed.abs() * 0.2;
            car.pos + (road_dir * blend + player_dir * (1.0 - blend)) * look_dist
        } else {
            player_pos
        };

        let target_angle = (target - car.pos).to_angle();
        let angle_diff = normalize_angle(target_angle - car.angle);
        car.controls.steer = (angle_diff * CHASE_STEER_GAIN).clamp(-1.0, 1.0);

        let safe_speed = (car.config.max_speed * (1.0 - angle_diff.abs())).max(60.0);
        if car.speed > safe_speed * 1.05 {
            car.controls.throttle = 0.0;
            car.controls.brake =
                ((car.speed - safe_speed) / CHASE_GAIN_DIVISOR).clamp(0.1, 0.9);
        } else {
            car.controls.throttle =
                ((safe_speed - car.speed) / CHASE_GAIN_DIVISOR).clamp(0.4, 1.0);
            car.controls.brake = 0.0;
        }
        car.controls.handbrake = false;
    }

    fn patrol(car: &mut Car, course: &Course) {
        let Some(road) = course.nearest_road(car.pos) else {
            car.controls.throttle = 0.0;
            car.controls.brake = 0.5;
            return;
        };

        let angle_diff = normalize_angle(road.angle - car.angle);
        car.controls.steer = (angle_diff * PATROL_STEER_GAIN).clamp(-1.0, 1.0);

        if car.speed > police::CRUISE_SPEED {
            car.controls.throttle = 0.0;
            car.controls.brake = 0.2;
        } else {
            car.controls.throttle = 0.3;
            car.controls.brake = 0.0;
        }
        car.controls.handbrake = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{CarConfig, CarKind, RoadSegment, RoadNetwork, SpawnPose};

    fn open_course() -> Course {
        let points: Vec<Vec2> = (0..=100).map(|i| Vec2::new(i as f32 * 50.0, 0.0)).collect();
        Course::Open(RoadNetwork::new(
            vec![RoadSegment {
                points,
                width: 30.0,
                kind: "primary".into(),
                name: String::new(),
                oneway: false,
            }],
            Vec2::ZERO,
            Vec2::new(5000.0, 0.0),
        ))
    }

    fn cruiser_at(x: f32, y: f32) -> Car {
        Car::new(
            CarKind::Police,
            SpawnPose {
                pos: Vec2::new(x, y),
                angle: 0.0,
            },
            CarConfig::POLICE,
            "#1565C0",
            "POLICE",
        )
    }

    #[test]
    fn chase_starts_inside_chase_range_with_hysteresis() {
        let course = open_course();
        let mut ctl = PoliceController::new();
        let mut car = cruiser_at(2000.0, 0.0);

        // outside chase range: stays on patrol
        ctl.drive(&mut car, &[], &[], &course, Vec2::new(3200.0, 0.0), 0.016);
        assert_eq!(ctl.state(), PoliceState::Patrol);

        // inside chase range: starts chasing
        ctl.drive(&mut car, &[], &[], &course, Vec2::new(3000.0, 0.0), 0.016);
        assert_eq!(ctl.state(), PoliceState::Chasing);

        // between the two ranges: keeps chasing
        ctl.drive(&mut car, &[], &[], &course, Vec2::new(5000.0, 0.0), 0.016);
        assert_eq!(ctl.state(), PoliceState::Chasing);

        // past the give-up range: back to patrol
        car.pos = Vec2::new(0.0, 0.0);
        ctl.drive(&mut car, &[], &[], &course, Vec2::new(3600.0, 0.0), 0.016);
        assert_eq!(ctl.state(), PoliceState::Patrol);
    }

    #[test]
    fn frozen_cruisers_stand_still_then_resume_patrol() {
        let course = open_course();
        let mut ctl = PoliceController::new();
        let mut car = cruiser_at(1000.0, 0.0);
        car.speed = 150.0;
        car.vel = Vec2::new(150.0, 0.0);

        ctl.freeze();
        ctl.drive(&mut car, &[], &[], &course, Vec2::new(1050.0, 0.0), 0.1);
        assert!(ctl.is_frozen());
        assert_eq!(car.speed, 0.0);
        assert_eq!(car.vel, Vec2::ZERO);
        assert_eq!(car.controls.brake, 1.0);
        assert_eq!(car.controls.throttle, 0.0);

        // runs out after FREEZE_DURATION of simulated time
        for _ in 0..50 {
            ctl.drive(&mut car, &[], &[], &course, Vec2::new(9000.0, 0.0), 0.1);
        }
        assert!(!ctl.is_frozen());
    }

    #[test]
    fn radar_contact_is_an_arrest_only_while_active() {
        let car = cruiser_at(1000.0, 0.0);
        let mut ctl = PoliceController::new();
        assert!(ctl.check_arrest(&car, Vec2::new(1100.0, 0.0)));
        assert!(!ctl.check_arrest(&car, Vec2::new(1121.0, 0.0)));
        ctl.freeze();
        assert!(!ctl.check_arrest(&car, Vec2::new(1100.0, 0.0)));
    }

    #[test]
    fn patrol_cruises_along_the_road_at_low_speed() {
        let course = open_course();
        let mut ctl = PoliceController::new();
        let mut car = cruiser_at(2000.0, 10.0);
        ctl.drive(&mut car, &[], &[], &course, Vec2::new(-9000.0, 0.0), 0.016);
        assert_eq!(ctl.state(), PoliceState::Patrol);
        assert!(car.controls.throttle > 0.0);

        car.speed = police::CRUISE_SPEED + 20.0;
        ctl.drive(&mut car, &[], &[], &course, Vec2::new(-9000.0, 0.0), 0.016);
        assert_eq!(car.controls.throttle, 0.0);
        assert!(car.controls.brake > 0.0);
    }
}
