use crate::consts::{self, police, traffic};

/// Physical tuning for one car. Fixed after construction.
#[derive(Clone, Copy, Debug)]
pub struct CarConfig {
    /// Footprint along the heading.
    pub length: f32,
    pub width: f32,
    pub max_speed: f32,
    pub accel: f32,
    pub brake_force: f32,
    pub turn_rate: f32,
    pub grip: f32,
    pub drift_factor: f32,
    pub drag: f32,
    pub rolling_resist: f32,
    /// Most negative speed allowed (reversing).
    pub reverse_max: f32,
}

impl Default for CarConfig {
    fn default() -> Self {
        Self::STREET
    }
}

impl CarConfig {
    pub const STREET: Self = Self::make(
        consts::CAR_MAX_SPEED,
        consts::CAR_ACCEL,
        consts::CAR_BRAKE_FORCE,
        consts::CAR_TURN_RATE,
    );

    pub const POLICE: Self = Self::make(
        consts::CAR_MAX_SPEED * police::SPEED_FACTOR,
        police::ACCEL,
        police::BRAKE_FORCE,
        police::TURN_RATE,
    );

    /// Base traffic tuning; the spawner rescales `max_speed` around each
    /// car's randomized cruise speed.
    pub const TRAFFIC: Self = Self::make(traffic::MAX_SPEED * 1.2, 120.0, 200.0, 2.4);

    const fn make(max_speed: f32, accel: f32, brake_force: f32, turn_rate: f32) -> Self {
        Self {
            length: consts::CAR_LENGTH,
            width: consts::CAR_WIDTH,
            max_speed,
            accel,
            brake_force,
            turn_rate,
            grip: consts::CAR_GRIP,
            drift_factor: consts::CAR_DRIFT_FACTOR,
            drag: consts::CAR_DRAG,
            rolling_resist: consts::CAR_ROLLING_RESIST,
            reverse_max: consts::CAR_REVERSE_MAX,
        }
    }
}
