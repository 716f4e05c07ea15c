use glam::Vec2;
use std::f32::consts::{PI, TAU};

/// Wrap an angle into `(-PI, PI]`.
#[must_use]
pub fn normalize_angle(mut a: f32) -> f32 {
    while a > PI {
        a -= TAU;
    }
    while a < -PI {
        a += TAU;
    }
    a
}

#[must_use]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Sign of `v`, zero at zero.
#[must_use]
pub fn sign(v: f32) -> f32 {
    if v == 0.0 { 0.0 } else { v.signum() }
}

/// Centripetal-free Catmull-Rom through `p1`..`p2` at `t` in `[0, 1]`.
#[must_use]
pub fn catmull_rom(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, t: f32) -> Vec2 {
    let t2 = t * t;
    let t3 = t2 * t;
    0.5 * (2.0 * p1
        + (p2 - p0) * t
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
        + (3.0 * p1 - p0 - 3.0 * p2 + p3) * t3)
}

/// Scalar Catmull-Rom, used to interpolate widths along the spline.
#[must_use]
pub fn catmull_rom_scalar(w0: f32, w1: f32, w2: f32, w3: f32, t: f32) -> f32 {
    let t2 = t * t;
    let t3 = t2 * t;
    0.5 * (2.0 * w1
        + (w2 - w0) * t
        + (2.0 * w0 - 5.0 * w1 + 4.0 * w2 - w3) * t2
        + (3.0 * w1 - w0 - 3.0 * w2 + w3) * t3)
}

/// Closest point on the segment `a`..`b` to `p`.
#[derive(Clone, Copy, Debug)]
pub struct SegmentHit {
    pub point: Vec2,
    pub dist: f32,
}

#[must_use]
pub fn closest_point_on_segment(p: Vec2, a: Vec2, b: Vec2) -> SegmentHit {
    let ab = b - a;
    let len_sq = ab.length_squared();
    // degenerate segments collapse to a point
    if len_sq == 0.0 {
        return SegmentHit {
            point: a,
            dist: p.distance(a),
        };
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    let point = a + ab * t;
    SegmentHit {
        point,
        dist: p.distance(point),
    }
}

#[must_use]
pub fn point_to_segment_dist(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    closest_point_on_segment(p, a, b).dist
}

/// Axis-aligned world-space bounds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    pub const EMPTY: Self = Self {
        min: Vec2::INFINITY,
        max: Vec2::NEG_INFINITY,
    };

    pub fn include(&mut self, p: Vec2) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    #[must_use]
    pub fn padded(self, pad: f32) -> Self {
        Self {
            min: self.min - Vec2::splat(pad),
            max: self.max + Vec2::splat(pad),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_angle_wraps_into_range() {
        assert!((normalize_angle(3.0 * PI) - PI).abs() < 1e-6);
        assert!((normalize_angle(-3.0 * PI) - PI).abs() < 1e-6);
        assert!((normalize_angle(0.5) - 0.5).abs() < 1e-6);
        assert!(normalize_angle(TAU).abs() < 1e-6);
    }

    #[test]
    fn catmull_rom_passes_through_control_points() {
        let p0 = Vec2::new(0.0, 0.0);
        let p1 = Vec2::new(1.0, 2.0);
        let p2 = Vec2::new(3.0, 1.0);
        let p3 = Vec2::new(4.0, 4.0);
        assert!(catmull_rom(p0, p1, p2, p3, 0.0).distance(p1) < 1e-5);
        assert!(catmull_rom(p0, p1, p2, p3, 1.0).distance(p2) < 1e-5);
    }

    #[test]
    fn catmull_rom_scalar_matches_endpoints() {
        assert!((catmull_rom_scalar(10.0, 20.0, 30.0, 40.0, 0.0) - 20.0).abs() < 1e-5);
        assert!((catmull_rom_scalar(10.0, 20.0, 30.0, 40.0, 1.0) - 30.0).abs() < 1e-5);
    }

    #[test]
    fn degenerate_segment_falls_back_to_point_distance() {
        let a = Vec2::new(2.0, 2.0);
        let hit = closest_point_on_segment(Vec2::new(5.0, 6.0), a, a);
        assert_eq!(hit.point, a);
        assert!((hit.dist - 5.0).abs() < 1e-5);
    }

    #[test]
    fn closest_point_clamps_to_segment_ends() {
        let a = Vec2::ZERO;
        let b = Vec2::new(10.0, 0.0);
        let hit = closest_point_on_segment(Vec2::new(-4.0, 3.0), a, b);
        assert_eq!(hit.point, a);
        let hit = closest_point_on_segment(Vec2::new(4.0, 3.0), a, b);
        assert!((hit.point.x - 4.0).abs() < 1e-5);
        assert!((hit.dist - 3.0).abs() < 1e-5);
    }

    #[test]
    fn sign_is_zero_at_zero() {
        assert_eq!(sign(0.0), 0.0);
        assert_eq!(sign(-3.5), -1.0);
        assert_eq!(sign(0.2), 1.0);
    }
}
