use super::{SpatialGrid, Surface};
use crate::consts;
use crate::math::{Bounds, catmull_rom, catmull_rom_scalar, normalize_angle};
use glam::Vec2;

/// One control point of the circuit spline.
#[derive(Clone, Copy, Debug)]
pub struct Waypoint {
    pub pos: Vec2,
    pub width: f32,
}

impl Waypoint {
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            width,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundarySide {
    Left,
    Right,
}

/// A track-edge segment stored in the proximity grid.
#[derive(Clone, Copy, Debug)]
pub struct BoundarySegment {
    pub a: Vec2,
    pub b: Vec2,
    /// Sample index the edge starts at.
    pub index: usize,
    pub side: BoundarySide,
}

const WAYPOINTS: [Waypoint; 20] = [
    Waypoint::new(800.0, 1600.0, 75.0),
    Waypoint::new(1100.0, 1600.0, 75.0),
    Waypoint::new(1400.0, 1600.0, 75.0),
    Waypoint::new(1700.0, 1580.0, 70.0),
    Waypoint::new(1950.0, 1480.0, 65.0),
    Waypoint::new(2150.0, 1300.0, 65.0),
    Waypoint::new(2250.0, 1050.0, 70.0),
    Waypoint::new(2200.0, 800.0, 65.0),
    Waypoint::new(2050.0, 600.0, 60.0),
    Waypoint::new(1850.0, 480.0, 55.0),
    Waypoint::new(1650.0, 430.0, 55.0),
    Waypoint::new(1450.0, 480.0, 55.0),
    Waypoint::new(1300.0, 600.0, 55.0),
    Waypoint::new(1100.0, 520.0, 55.0),
    Waypoint::new(900.0, 620.0, 60.0),
    Waypoint::new(700.0, 800.0, 65.0),
    Waypoint::new(530.0, 1050.0, 70.0),
    Waypoint::new(450.0, 1300.0, 70.0),
    Waypoint::new(500.0, 1500.0, 75.0),
    Waypoint::new(650.0, 1600.0, 75.0),
];

/// A closed Catmull-Rom circuit, sampled once into a dense polyline.
///
/// Every parametric query treats `t` as wrapping in `[0, 1)` over the
/// fixed sample count. Built once per race and immutable afterwards.
#[derive(Clone, Debug)]
pub struct TrackGeometry {
    points: Vec<Vec2>,
    widths: Vec<f32>,
    tangents: Vec<Vec2>,
    normals: Vec<Vec2>,
    left_boundary: Vec<Vec2>,
    right_boundary: Vec<Vec2>,
    total_length: f32,
    grid: SpatialGrid<BoundarySegment>,
}

impl TrackGeometry {
    /// The stock circuit.
    #[must_use]
    pub fn classic() -> Self {
        Self::new(&WAYPOINTS)
    }

    #[must_use]
    pub fn new(waypoints: &[Waypoint]) -> Self {
        assert!(
            waypoints.len() >= 4,
            "a circuit needs at least 4 waypoints"
        );

        let n = waypoints.len();
        let samples = consts::TRACK_SAMPLES;
        let mut points = Vec::with_capacity(samples);
        let mut widths = Vec::with_capacity(samples);

        for i in 0..samples {
            let global_t = i as f32 / samples as f32;
            let seg = global_t * n as f32;
            let idx = seg as usize;
            let t = seg - idx as f32;
            let p0 = waypoints[(idx + n - 1) % n];
            let p1 = waypoints[idx % n];
            let p2 = waypoints[(idx + 1) % n];
            let p3 = waypoints[(idx + 2) % n];
            points.push(catmull_rom(p0.pos, p1.pos, p2.pos, p3.pos, t));
            widths.push(catmull_rom_scalar(p0.width, p1.width, p2.width, p3.width, t));
        }

        let mut tangents = Vec::with_capacity(samples);
        let mut normals = Vec::with_capacity(samples);
        let mut total_length = 0.0;
        for i in 0..samples {
            let next = (i + 1) % samples;
            let delta = points[next] - points[i];
            let len = delta.length();
            let tangent = if len > 0.0 { delta / len } else { Vec2::X };
            tangents.push(tangent);
            normals.push(tangent.perp());
            total_length += len;
        }

        let mut left_boundary = Vec::with_capacity(samples);
        let mut right_boundary = Vec::with_capacity(samples);
        for i in 0..samples {
            let offset = normals[i] * widths[i];
            left_boundary.push(points[i] + offset);
            right_boundary.push(points[i] - offset);
        }

        let mut grid = SpatialGrid::new(consts::TRACK_GRID_CELL);
        for i in 0..samples {
            let next = (i + 1) % samples;
            for (side, boundary) in [
                (BoundarySide::Left, &left_boundary),
                (BoundarySide::Right, &right_boundary),
            ] {
                let (a, b) = (boundary[i], boundary[next]);
                let seg = BoundarySegment { a, b, index: i, side };
                grid.insert_aabb(a.min(b), a.max(b), seg);
            }
        }

        Self {
            points,
            widths,
            tangents,
            normals,
            left_boundary,
            right_boundary,
            total_length,
            grid,
        }
    }

    fn sample_index(&self, t: f32) -> usize {
        let t = t.rem_euclid(1.0);
        (t * self.points.len() as f32) as usize % self.points.len()
    }

    /// Centerline point at parameter `t`, interpolated between samples.
    #[must_use]
    pub fn point_at(&self, t: f32) -> Vec2 {
        let samples = self.points.len();
        let fi = t.rem_euclid(1.0) * samples as f32;
        let i = fi as usize % samples;
        let frac = fi.fract();
        let next = (i + 1) % samples;
        self.points[i].lerp(self.points[next], frac)
    }

    #[must_use]
    pub fn tangent_at(&self, t: f32) -> Vec2 {
        self.tangents[self.sample_index(t)]
    }

    #[must_use]
    pub fn normal_at(&self, t: f32) -> Vec2 {
        self.normals[self.sample_index(t)]
    }

    #[must_use]
    pub fn width_at(&self, t: f32) -> f32 {
        self.widths[self.sample_index(t)]
    }

    /// Turn rate at `t`: tangent angle change over a short parameter step.
    #[must_use]
    pub fn curvature_at(&self, t: f32) -> f32 {
        let step = 3.0 / self.points.len() as f32;
        let t1 = self.tangent_at(t);
        let t2 = self.tangent_at(t + step);
        normalize_angle(t2.to_angle() - t1.to_angle()).abs() / step
    }

    /// Parameter of the sample nearest to `p`.
    ///
    /// Coarse stride search refined by a local window; exact enough for a
    /// smooth, densely sampled spline and much cheaper than a full scan.
    #[must_use]
    pub fn nearest_t(&self, p: Vec2) -> f32 {
        let samples = self.points.len();
        let mut best_dist = f32::INFINITY;
        let mut best_i = 0usize;
        for i in (0..samples).step_by(10) {
            let d = self.points[i].distance_squared(p);
            if d < best_dist {
                best_dist = d;
                best_i = i;
            }
        }

        let mut fine_i = best_i;
        best_dist = f32::INFINITY;
        for offset in -15i32..=15 {
            let idx = (best_i as i32 + offset).rem_euclid(samples as i32) as usize;
            let d = self.points[idx].distance_squared(p);
            if d < best_dist {
                best_dist = d;
                fine_i = idx;
            }
        }
        fine_i as f32 / samples as f32
    }

    /// Classify `p` by lateral distance from the nearest centerline sample.
    #[must_use]
    pub fn surface_at(&self, p: Vec2) -> Surface {
        let i = self.sample_index(self.nearest_t(p));
        let lateral = (p - self.points[i]).dot(self.normals[i]).abs();
        let width = self.widths[i];
        if lateral < width - consts::TRACK_CURB_MARGIN {
            Surface::Asphalt
        } else if lateral < width {
            Surface::Curb
        } else {
            Surface::Grass
        }
    }

    /// Boundary segments in the 3x3 grid neighborhood of `p`.
    #[must_use]
    pub fn segments_near(&self, p: Vec2) -> Vec<BoundarySegment> {
        let mut result = Vec::new();
        self.grid.for_each_near(p, 1, |seg| result.push(*seg));
        result
    }

    #[must_use]
    pub fn bounds(&self) -> Bounds {
        let mut bounds = Bounds::EMPTY;
        for p in &self.points {
            bounds.include(*p);
        }
        bounds.padded(consts::BOUNDS_PAD)
    }

    #[must_use]
    pub fn total_length(&self) -> f32 {
        self.total_length
    }

    #[must_use]
    pub fn left_boundary(&self) -> &[Vec2] {
        &self.left_boundary
    }

    #[must_use]
    pub fn right_boundary(&self) -> &[Vec2] {
        &self.right_boundary
    }

    #[must_use]
    pub fn centerline(&self) -> &[Vec2] {
        &self.points
    }
}
