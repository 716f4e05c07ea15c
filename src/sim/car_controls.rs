/// Driving intent for one simulation step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CarControls {
    pub throttle: f32,
    pub brake: f32,
    pub steer: f32,
    pub handbrake: bool,
}

impl Default for CarControls {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl CarControls {
    pub const DEFAULT: Self = Self {
        throttle: 0.0,
        brake: 0.0,
        steer: 0.0,
        handbrake: false,
    };

    pub(crate) fn clamp_fix(&mut self) {
        self.throttle = self.throttle.clamp(0.0, 1.0);
        self.brake = self.brake.clamp(0.0, 1.0);
        self.steer = self.steer.clamp(-1.0, 1.0);
    }
}
