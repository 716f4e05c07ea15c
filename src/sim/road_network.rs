use super::{SpatialGrid, Surface};
use crate::consts;
use crate::math::{Bounds, closest_point_on_segment};
use glam::Vec2;
use std::f32::consts::{FRAC_PI_2, PI};

/// One road from the map importer: an ordered centerline polyline with a
/// fixed half-width. The class tag and name are pass-through metadata for
/// rendering and HUD lookups; they do not change behavior.
#[derive(Clone, Debug)]
pub struct RoadSegment {
    pub points: Vec<Vec2>,
    /// Half-width of the drivable surface.
    pub width: f32,
    /// Importer road class ("residential", "primary", ...).
    pub kind: String,
    pub name: String,
    pub oneway: bool,
}

/// Per-point geometry derived from a segment's centerline.
#[derive(Clone, Debug, Default)]
pub struct SegmentEdges {
    pub normals: Vec<Vec2>,
    pub left: Vec<Vec2>,
    pub right: Vec<Vec2>,
}

/// Start or finish marker with its road-aligned heading.
#[derive(Clone, Copy, Debug)]
pub struct Endpoint {
    pub pos: Vec2,
    pub angle: f32,
}

/// Result of a nearest-road query.
#[derive(Clone, Copy, Debug)]
pub struct RoadHit {
    /// Closest point on the centerline.
    pub point: Vec2,
    pub dist: f32,
    /// Tangent heading of the centerline there.
    pub angle: f32,
    pub width: f32,
    /// Index of the owning segment.
    pub segment: usize,
    /// Unit normal of the centerline there.
    pub normal: Vec2,
}

/// World-space anchor for drawing a road name.
#[derive(Clone, Debug)]
pub struct RoadLabel {
    pub text: String,
    pub pos: Vec2,
    /// Rotation, normalized to upright reading.
    pub angle: f32,
}

#[derive(Clone, Copy, Debug)]
struct CenterlinePiece {
    a: Vec2,
    b: Vec2,
    segment: usize,
    width: f32,
}

/// An open road network raced point-to-point.
///
/// Unlike the circuit there is no boundary collision geometry; roads
/// connect, so cars roam freely and off-road correction handles the rest.
/// Built once per race from an already-projected segment list and
/// immutable afterwards.
#[derive(Clone, Debug)]
pub struct RoadNetwork {
    segments: Vec<RoadSegment>,
    edges: Vec<SegmentEdges>,
    start: Endpoint,
    finish: Endpoint,
    /// Straight-line start→finish distance; the progress denominator.
    total_length: f32,
    grid: SpatialGrid<CenterlinePiece>,
    bounds: Bounds,
    labels: Vec<RoadLabel>,
}

impl RoadNetwork {
    #[must_use]
    pub fn new(segments: Vec<RoadSegment>, start: Vec2, finish: Vec2) -> Self {
        assert!(
            !segments.is_empty(),
            "a road network needs at least one segment"
        );
        assert!(
            start.distance(finish) >= consts::MIN_START_FINISH_DIST,
            "start and finish are too close together"
        );

        let edges = segments.iter().map(derive_edges).collect();

        let mut grid = SpatialGrid::new(consts::ROAD_GRID_CELL);
        for (si, seg) in segments.iter().enumerate() {
            let pad = seg.width + consts::ROAD_GRID_PAD;
            for pair in seg.points.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                let piece = CenterlinePiece {
                    a,
                    b,
                    segment: si,
                    width: seg.width,
                };
                grid.insert_aabb(
                    a.min(b) - Vec2::splat(pad),
                    a.max(b) + Vec2::splat(pad),
                    piece,
                );
            }
        }

        let mut bounds = Bounds::EMPTY;
        for seg in &segments {
            for p in &seg.points {
                bounds.include(*p - Vec2::splat(seg.width));
                bounds.include(*p + Vec2::splat(seg.width));
            }
        }

        let labels = build_labels(&segments);

        let mut network = Self {
            segments,
            edges,
            start: Endpoint {
                pos: start,
                angle: 0.0,
            },
            finish: Endpoint {
                pos: finish,
                angle: 0.0,
            },
            total_length: start.distance(finish),
            grid,
            bounds: bounds.padded(consts::BOUNDS_PAD),
            labels,
        };

        // endpoint headings follow the nearest road
        if let Some(hit) = network.nearest_road(start) {
            network.start.angle = hit.angle;
        }
        if let Some(hit) = network.nearest_road(finish) {
            network.finish.angle = hit.angle;
        }
        network
    }

    /// Nearest centerline point within the searched 5x5 cell neighborhood,
    /// or `None` when nothing is in range. Callers fall back rather than
    /// fail on `None`.
    #[must_use]
    pub fn nearest_road(&self, p: Vec2) -> Option<RoadHit> {
        let mut best: Option<RoadHit> = None;
        self.grid.for_each_near(p, 2, |piece| {
            let hit = closest_point_on_segment(p, piece.a, piece.b);
            if best.is_none_or(|b| hit.dist < b.dist) {
                let delta = piece.b - piece.a;
                let len = delta.length();
                let dir = if len > 0.0 { delta / len } else { Vec2::X };
                best = Some(RoadHit {
                    point: hit.point,
                    dist: hit.dist,
                    angle: delta.y.atan2(delta.x),
                    width: piece.width,
                    segment: piece.segment,
                    normal: dir.perp(),
                });
            }
        });
        best
    }

    /// Classify `p` against the nearest centerline's half-width.
    #[must_use]
    pub fn surface_at(&self, p: Vec2) -> Surface {
        let mut min_dist = f32::INFINITY;
        let mut nearest_width = consts::DEFAULT_ROAD_WIDTH;
        self.grid.for_each_near(p, 1, |piece| {
            let d = closest_point_on_segment(p, piece.a, piece.b).dist;
            if d < min_dist {
                min_dist = d;
                nearest_width = piece.width;
            }
        });

        if min_dist < nearest_width - consts::ROAD_ASPHALT_MARGIN {
            Surface::Asphalt
        } else if min_dist < nearest_width + consts::ROAD_CURB_MARGIN {
            Surface::Curb
        } else {
            Surface::Grass
        }
    }

    /// Name of the road under `p`, if `p` is reasonably on it.
    #[must_use]
    pub fn road_name_at(&self, p: Vec2) -> Option<&str> {
        let hit = self.nearest_road(p)?;
        if hit.dist > hit.width + consts::ROAD_NAME_TOLERANCE {
            return None;
        }
        let name = self.segments[hit.segment].name.as_str();
        (!name.is_empty()).then_some(name)
    }

    #[must_use]
    pub fn distance_to_finish(&self, p: Vec2) -> f32 {
        p.distance(self.finish.pos)
    }

    /// Progress toward the finish as a fraction in `[0, 1]`.
    #[must_use]
    pub fn race_progress(&self, p: Vec2) -> f32 {
        (1.0 - self.distance_to_finish(p) / self.total_length).clamp(0.0, 1.0)
    }

    // --- circuit-compatible shim ---
    // Downstream progress queries treat the run as a straight start→finish
    // spline so they need no per-mode branching.

    #[must_use]
    pub fn nearest_t(&self, p: Vec2) -> f32 {
        self.race_progress(p)
    }

    #[must_use]
    pub fn point_at(&self, t: f32) -> Vec2 {
        self.start.pos.lerp(self.finish.pos, t.clamp(0.0, 1.0))
    }

    #[must_use]
    pub fn tangent_at(&self, _t: f32) -> Vec2 {
        let delta = self.finish.pos - self.start.pos;
        let len = delta.length();
        if len > 0.0 { delta / len } else { Vec2::X }
    }

    #[must_use]
    pub fn normal_at(&self, t: f32) -> Vec2 {
        self.tangent_at(t).perp()
    }

    #[must_use]
    pub fn width_at(&self, _t: f32) -> f32 {
        consts::DEFAULT_ROAD_WIDTH
    }

    #[must_use]
    pub fn curvature_at(&self, _t: f32) -> f32 {
        0.0
    }

    #[must_use]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    #[must_use]
    pub fn total_length(&self) -> f32 {
        self.total_length
    }

    #[must_use]
    pub fn start(&self) -> Endpoint {
        self.start
    }

    #[must_use]
    pub fn finish(&self) -> Endpoint {
        self.finish
    }

    #[must_use]
    pub fn segments(&self) -> &[RoadSegment] {
        &self.segments
    }

    /// Derived boundary polylines, parallel to `segments()`.
    #[must_use]
    pub fn edges(&self) -> &[SegmentEdges] {
        &self.edges
    }

    /// Road-name anchors for the renderer.
    #[must_use]
    pub fn labels(&self) -> &[RoadLabel] {
        &self.labels
    }
}

fn derive_edges(seg: &RoadSegment) -> SegmentEdges {
    let n = seg.points.len();
    let mut edges = SegmentEdges {
        normals: Vec::with_capacity(n),
        left: Vec::with_capacity(n),
        right: Vec::with_capacity(n),
    };
    for i in 0..n {
        let prev = seg.points[i.saturating_sub(1)];
        let next = seg.points[(i + 1).min(n - 1)];
        let delta = next - prev;
        let len = delta.length();
        let normal = if len > 0.0 {
            (delta / len).perp()
        } else {
            Vec2::Y
        };
        edges.normals.push(normal);
        edges.left.push(seg.points[i] + normal * seg.width);
        edges.right.push(seg.points[i] - normal * seg.width);
    }
    edges
}

/// Precompute label anchors: one every `LABEL_SPACING` along each named
/// segment, skipping segments too short to label, with angles flipped
/// into the upright reading range.
fn build_labels(segments: &[RoadSegment]) -> Vec<RoadLabel> {
    let mut labels = Vec::new();
    for seg in segments {
        if seg.name.is_empty() || seg.points.len() < 2 {
            continue;
        }

        let total_len: f32 = seg
            .points
            .windows(2)
            .map(|pair| pair[0].distance(pair[1]))
            .sum();
        if total_len < consts::LABEL_MIN_LENGTH {
            continue;
        }

        let mut next_label = (total_len / 2.0).min(consts::LABEL_SPACING * 0.4);
        let mut cum_dist = 0.0;

        for pair in seg.points.windows(2) {
            if next_label >= total_len {
                break;
            }
            let (a, b) = (pair[0], pair[1]);
            let seg_len = a.distance(b);

            while next_label >= cum_dist && next_label < cum_dist + seg_len && seg_len > 0.0 {
                let t = (next_label - cum_dist) / seg_len;
                let mut angle = (b - a).to_angle();
                if angle > FRAC_PI_2 {
                    angle -= PI;
                }
                if angle < -FRAC_PI_2 {
                    angle += PI;
                }
                labels.push(RoadLabel {
                    text: seg.name.clone(),
                    pos: a.lerp(b, t),
                    angle,
                });
                next_label += consts::LABEL_SPACING;
            }
            cum_dist += seg_len;
        }
    }
    labels
}
