use super::{CarConfig, CarControls, Surface};
use crate::consts;
use glam::Vec2;

/// Which control policy drives a car.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CarKind {
    Player,
    Racer,
    Police,
    Traffic,
}

impl CarKind {
    /// Police and traffic are not ranked in race standings.
    #[must_use]
    pub const fn competes(self) -> bool {
        matches!(self, Self::Player | Self::Racer)
    }
}

/// Position and heading for spawning a car.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SpawnPose {
    pub pos: Vec2,
    pub angle: f32,
}

/// Race bookkeeping for one car.
#[derive(Clone, Debug)]
pub struct RaceStats {
    pub current_lap: u32,
    /// Spline parameter (circuit) or start→finish fraction (open world).
    pub lap_progress: f32,
    /// Bitmask of checkpoint buckets visited this lap.
    checkpoints_hit: u16,
    pub lap_times: Vec<f32>,
    pub lap_start_time: f32,
    pub best_lap: f32,
    pub total_time: f32,
    /// Laps-plus-fraction (circuit) or [0, 1] fraction (open world);
    /// the sort key for standings.
    pub race_progress: f32,
    pub finished: bool,
}

impl Default for RaceStats {
    fn default() -> Self {
        Self {
            current_lap: 0,
            lap_progress: 0.0,
            checkpoints_hit: 0,
            lap_times: Vec::new(),
            lap_start_time: 0.0,
            best_lap: f32::INFINITY,
            total_time: 0.0,
            race_progress: 0.0,
            finished: false,
        }
    }
}

impl RaceStats {
    pub(crate) fn mark_checkpoint(&mut self, bucket: u32) {
        if bucket < consts::NUM_CHECKPOINTS {
            self.checkpoints_hit |= 1 << bucket;
        }
    }

    pub(crate) fn checkpoints_count(&self) -> u32 {
        self.checkpoints_hit.count_ones()
    }

    pub(crate) fn clear_checkpoints(&mut self) {
        self.checkpoints_hit = 0;
    }
}

/// A single simulated vehicle. Every kind of car is this one struct;
/// the behavioral differences live in the controllers.
#[derive(Clone, Debug)]
pub struct Car {
    pub kind: CarKind,
    pub pos: Vec2,
    /// Heading, radians.
    pub angle: f32,
    /// Signed scalar speed along the heading.
    pub speed: f32,
    /// World-space velocity, including retained lateral drift.
    pub vel: Vec2,
    pub angular_vel: f32,
    pub controls: CarControls,
    pub is_drifting: bool,
    pub surface: Surface,
    pub config: CarConfig,
    /// Odometer, world pixels.
    pub distance: f32,
    pub color: &'static str,
    pub name: &'static str,
    pub stats: RaceStats,
}

impl Car {
    #[must_use]
    pub fn new(
        kind: CarKind,
        pose: SpawnPose,
        config: CarConfig,
        color: &'static str,
        name: &'static str,
    ) -> Self {
        Self {
            kind,
            pos: pose.pos,
            angle: pose.angle,
            speed: 0.0,
            vel: Vec2::ZERO,
            angular_vel: 0.0,
            controls: CarControls::DEFAULT,
            is_drifting: false,
            surface: Surface::Asphalt,
            config,
            distance: 0.0,
            color,
            name,
            stats: RaceStats::default(),
        }
    }

    /// Unit vector along the heading.
    #[must_use]
    pub fn forward(&self) -> Vec2 {
        Vec2::from_angle(self.angle)
    }

    /// Unit vector 90° counter-clockwise from the heading.
    #[must_use]
    pub fn right(&self) -> Vec2 {
        self.forward().perp()
    }

    /// The oriented rectangular footprint, front corners first.
    #[must_use]
    pub fn corners(&self) -> [Vec2; 4] {
        let fwd = self.forward() * (self.config.length * 0.5);
        let side = self.right() * (self.config.width * 0.5);
        [
            self.pos + fwd + side,
            self.pos + fwd - side,
            self.pos - fwd + side,
            self.pos - fwd - side,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn corners_span_the_footprint() {
        let car = Car::new(
            CarKind::Player,
            SpawnPose::default(),
            CarConfig::STREET,
            "#FFD700",
            "PLAYER",
        );
        let corners = car.corners();
        // heading 0: length extends along +x, width along y
        assert!((corners[0].x - consts::CAR_LENGTH / 2.0).abs() < 1e-4);
        assert!((corners[0].y - consts::CAR_WIDTH / 2.0).abs() < 1e-4);
        assert!((corners[3].x + consts::CAR_LENGTH / 2.0).abs() < 1e-4);
    }

    #[test]
    fn right_is_perpendicular_to_forward() {
        let mut car = Car::new(
            CarKind::Racer,
            SpawnPose::default(),
            CarConfig::STREET,
            "#E53935",
            "ROSSO",
        );
        car.angle = FRAC_PI_2;
        assert!(car.forward().dot(car.right()).abs() < 1e-6);
        assert!(car.right().distance(Vec2::new(-1.0, 0.0)) < 1e-6);
    }

    #[test]
    fn checkpoint_bitmask_counts_distinct_buckets() {
        let mut stats = RaceStats::default();
        stats.mark_checkpoint(0);
        stats.mark_checkpoint(3);
        stats.mark_checkpoint(3);
        stats.mark_checkpoint(9);
        assert_eq!(stats.checkpoints_count(), 3);
        stats.clear_checkpoints();
        assert_eq!(stats.checkpoints_count(), 0);
    }
}
