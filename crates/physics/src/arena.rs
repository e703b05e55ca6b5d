//! # Arena Layout
//!
//! The arena is a box of six immovable planes. Its footprint follows the
//! viewport: the camera looks straight down at the floor, so the visible
//! half-extents at floor level become the wall positions. The plane nearest
//! the camera is the "front" plane, the one tubes audibly knock against.

use std::fmt;

use glam::Vec3;

/// Fraction of the smaller half-extent used as the body scale.
const SCALE_PER_BOUND: f32 = 0.25;
/// Front plane height as a fraction of the camera distance.
const HEIGHT_PER_DISTANCE: f32 = 0.5;

/// Which face of the arena a plane is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArenaSide {
    Floor,
    Front,
    Left,
    Right,
    Top,
    Bottom,
}

impl ArenaSide {
    pub const ALL: [Self; 6] = [
        Self::Floor,
        Self::Front,
        Self::Left,
        Self::Right,
        Self::Top,
        Self::Bottom,
    ];
}

/// Semantic tag attached to a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyTag {
    Plane(ArenaSide),
    Tube(usize),
}

impl fmt::Display for BodyTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plane(ArenaSide::Floor) => f.write_str("floor plane"),
            Self::Plane(ArenaSide::Front) => f.write_str("front plane"),
            Self::Plane(ArenaSide::Left) => f.write_str("left plane"),
            Self::Plane(ArenaSide::Right) => f.write_str("right plane"),
            Self::Plane(ArenaSide::Top) => f.write_str("top plane"),
            Self::Plane(ArenaSide::Bottom) => f.write_str("bottom plane"),
            Self::Tube(index) => write!(f, "tube.{index}"),
        }
    }
}

/// A plane as `normal · p = offset`; the side the normal points to is free space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArenaPlane {
    pub side: ArenaSide,
    pub normal: Vec3,
    pub offset: f32,
}

impl ArenaPlane {
    /// Signed distance of `point` into free space.
    #[must_use]
    pub fn distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) - self.offset
    }
}

/// Half-extents of the arena. Fixed once the world is built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArenaBounds {
    /// Half-width along X.
    pub bound_x: f32,
    /// Half-depth along Z (the viewport's vertical axis).
    pub bound_y: f32,
    /// Height of the front plane above the floor.
    pub height: f32,
}

impl ArenaBounds {
    #[must_use]
    pub const fn new(bound_x: f32, bound_y: f32, height: f32) -> Self {
        Self { bound_x, bound_y, height }
    }

    /// Largest horizontal half-extent, the reference length of the shockwave.
    #[must_use]
    pub fn max_bound(&self) -> f32 {
        self.bound_x.max(self.bound_y)
    }

    #[must_use]
    pub fn plane(&self, side: ArenaSide) -> ArenaPlane {
        let (normal, offset) = match side {
            ArenaSide::Floor => (Vec3::Y, 0.0),
            ArenaSide::Front => (Vec3::NEG_Y, -self.height),
            ArenaSide::Left => (Vec3::X, -self.bound_x),
            ArenaSide::Right => (Vec3::NEG_X, -self.bound_x),
            ArenaSide::Top => (Vec3::Z, -self.bound_y),
            ArenaSide::Bottom => (Vec3::NEG_Z, -self.bound_y),
        };
        ArenaPlane { side, normal, offset }
    }

    #[must_use]
    pub fn planes(&self) -> [ArenaPlane; 6] {
        ArenaSide::ALL.map(|side| self.plane(side))
    }

    /// Whether `point` lies inside every plane's free half-space.
    #[must_use]
    pub fn contains(&self, point: Vec3) -> bool {
        self.planes().iter().all(|plane| plane.distance(point) >= 0.0)
    }

    /// Pseudo-random spawn point at least `margin` away from every plane
    /// (or the arena centre along an axis too small for the margin).
    pub fn spawn_point(&self, rng: &mut fastrand::Rng, margin: f32) -> Vec3 {
        let span = |half: f32| (half - margin).max(0.0);
        let x = (rng.f32() * 2.0 - 1.0) * span(self.bound_x);
        let z = (rng.f32() * 2.0 - 1.0) * span(self.bound_y);
        let low = margin.min(self.height * 0.5);
        let high = (self.height - margin).max(low);
        let y = low + rng.f32() * (high - low);
        Vec3::new(x, y, z)
    }
}

/// Arena and body scale derived from the viewport and camera geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArenaLayout {
    pub bounds: ArenaBounds,
    pub scale_factor: f32,
}

impl ArenaLayout {
    /// Layout for a camera `distance` above the floor looking straight down.
    #[must_use]
    pub fn from_camera(distance: f32, fovy: f32, aspect: f32) -> Self {
        let bound_y = distance * (fovy * 0.5).tan();
        let bound_x = bound_y * aspect.max(f32::EPSILON);
        let bounds = ArenaBounds::new(bound_x, bound_y, distance * HEIGHT_PER_DISTANCE);
        Self {
            bounds,
            scale_factor: bound_x.min(bound_y) * SCALE_PER_BOUND,
        }
    }
}
