use super::{RoadHit, RoadNetwork, Surface, TrackGeometry};
use crate::math::Bounds;
use glam::Vec2;

/// The active geometry for a race. Exactly one per race; cars query it
/// every step and never mutate it.
#[derive(Clone, Debug)]
pub enum Course {
    Circuit(TrackGeometry),
    Open(RoadNetwork),
}

impl Course {
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self, Self::Open(_))
    }

    #[must_use]
    pub const fn as_open(&self) -> Option<&RoadNetwork> {
        match self {
            Self::Open(net) => Some(net),
            Self::Circuit(_) => None,
        }
    }

    #[must_use]
    pub const fn as_circuit(&self) -> Option<&TrackGeometry> {
        match self {
            Self::Circuit(track) => Some(track),
            Self::Open(_) => None,
        }
    }

    #[must_use]
    pub fn surface_at(&self, p: Vec2) -> Surface {
        match self {
            Self::Circuit(track) => track.surface_at(p),
            Self::Open(net) => net.surface_at(p),
        }
    }

    #[must_use]
    pub fn nearest_t(&self, p: Vec2) -> f32 {
        match self {
            Self::Circuit(track) => track.nearest_t(p),
            Self::Open(net) => net.nearest_t(p),
        }
    }

    #[must_use]
    pub fn point_at(&self, t: f32) -> Vec2 {
        match self {
            Self::Circuit(track) => track.point_at(t),
            Self::Open(net) => net.point_at(t),
        }
    }

    #[must_use]
    pub fn tangent_at(&self, t: f32) -> Vec2 {
        match self {
            Self::Circuit(track) => track.tangent_at(t),
            Self::Open(net) => net.tangent_at(t),
        }
    }

    #[must_use]
    pub fn normal_at(&self, t: f32) -> Vec2 {
        match self {
            Self::Circuit(track) => track.normal_at(t),
            Self::Open(net) => net.normal_at(t),
        }
    }

    #[must_use]
    pub fn width_at(&self, t: f32) -> f32 {
        match self {
            Self::Circuit(track) => track.width_at(t),
            Self::Open(net) => net.width_at(t),
        }
    }

    #[must_use]
    pub fn curvature_at(&self, t: f32) -> f32 {
        match self {
            Self::Circuit(track) => track.curvature_at(t),
            Self::Open(net) => net.curvature_at(t),
        }
    }

    #[must_use]
    pub fn total_length(&self) -> f32 {
        match self {
            Self::Circuit(track) => track.total_length(),
            Self::Open(net) => net.total_length(),
        }
    }

    #[must_use]
    pub fn bounds(&self) -> Bounds {
        match self {
            Self::Circuit(track) => track.bounds(),
            Self::Open(net) => net.bounds(),
        }
    }

    /// Nearest road on an open course; always `None` on a circuit.
    #[must_use]
    pub fn nearest_road(&self, p: Vec2) -> Option<RoadHit> {
        self.as_open().and_then(|net| net.nearest_road(p))
    }

    /// Finish marker of an open course.
    #[must_use]
    pub fn finish_point(&self) -> Option<Vec2> {
        self.as_open().map(|net| net.finish().pos)
    }
}
