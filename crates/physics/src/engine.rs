//! # Physics Engine Collaborator
//!
//! The rigid-body solver is an external collaborator. This module pins down
//! the capability set the rest of the workspace needs from it (world
//! creation, bodies, stepping, ray queries, impulses, transforms and contact
//! data) so any compliant backend can be substituted behind
//! [`PhysicsEngine`].

use glam::{Quat, Vec3};

use crate::error::PhysicsError;
use crate::mesh::MeshProxy;

/// Opaque identity of a body owned by the engine.
///
/// Handles are stable for the lifetime of the world and usable as map keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(pub u32);

/// Identity of a collision shape registered with the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeId(pub u32);

/// Collision layer bit masks.
///
/// Two layer sets interact only when each one's membership intersects the
/// other's filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollisionLayers {
    pub membership: u32,
    pub filter: u32,
}

impl CollisionLayers {
    pub const ENVIRONMENT: u32 = 0x01;
    pub const OBJECT: u32 = 0x02;
    pub const RAY: u32 = 0x04;

    pub const DEFAULT_MASK: u32 = Self::ENVIRONMENT | Self::OBJECT;
    pub const INTERACTIVE_MASK: u32 = Self::ENVIRONMENT | Self::OBJECT | Self::RAY;
    pub const RAY_MASK: u32 = Self::OBJECT | Self::RAY;

    /// Static arena geometry: collides with itself and objects, never with rays.
    pub const STATIC: Self = Self::new(Self::ENVIRONMENT, Self::DEFAULT_MASK);
    /// Dynamic tubes: visible to the environment, other tubes and rays.
    pub const DYNAMIC: Self = Self::new(Self::OBJECT, Self::INTERACTIVE_MASK);
    /// Interaction ray queries.
    pub const QUERY: Self = Self::new(Self::RAY, Self::RAY_MASK);

    #[must_use]
    pub const fn new(membership: u32, filter: u32) -> Self {
        Self { membership, filter }
    }

    #[must_use]
    pub const fn interacts_with(&self, other: &Self) -> bool {
        (self.membership & other.filter) != 0 && (other.membership & self.filter) != 0
    }
}

/// Closest hit reported by a ray query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub body: BodyHandle,
    /// Hit point in world space.
    pub point: Vec3,
}

/// One contact manifold between two bodies from the latest step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactManifold {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    pub point_count: usize,
}

impl ContactManifold {
    /// The body on the other side of `body`, if `body` takes part in the manifold.
    #[must_use]
    pub fn other(&self, body: BodyHandle) -> Option<BodyHandle> {
        if self.body_a == body {
            Some(self.body_b)
        } else if self.body_b == body {
            Some(self.body_a)
        } else {
            None
        }
    }
}

/// Capability set required from a rigid-body solver.
///
/// Execution is single-threaded; implementations need not be `Send`.
pub trait PhysicsEngine {
    /// Create the simulation world. Called exactly once before anything else.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::EngineInit`] when the engine cannot start.
    fn create_world(&mut self, gravity: Vec3) -> Result<(), PhysicsError>;

    /// Register a collision shape built from `proxy`, uniformly scaled.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::InvalidShape`] when the proxy is degenerate.
    fn create_shape(&mut self, proxy: &MeshProxy, scale: f32) -> Result<ShapeId, PhysicsError>;

    /// Add an immovable plane. Points `p` with `normal · p >= offset` are free space.
    fn add_static_plane(&mut self, normal: Vec3, offset: f32, layers: CollisionLayers) -> BodyHandle;

    /// Add a dynamic body using a previously registered shape.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::InvalidShape`] for an unknown shape id.
    fn add_dynamic_body(
        &mut self,
        shape: ShapeId,
        mass: f32,
        position: Vec3,
        rotation: Quat,
        layers: CollisionLayers,
    ) -> Result<BodyHandle, PhysicsError>;

    /// Advance the simulation by `dt` seconds split into `substeps` integration steps.
    fn step_simulation(&mut self, dt: f32, substeps: u32);

    /// Closest body hit by the segment `start..end` among bodies whose layers
    /// interact with `layers`.
    fn ray_test(&self, start: Vec3, end: Vec3, layers: CollisionLayers) -> Option<RayHit>;

    /// Wake `body` and apply an instantaneous impulse at `local_position`
    /// (body frame, unscaled).
    fn apply_impulse(&mut self, body: BodyHandle, local_position: Vec3, impulse: Vec3);

    /// Current pose of `body`, `None` when the body has no valid motion state.
    fn world_transform(&self, body: BodyHandle) -> Option<(Quat, Vec3)>;

    /// Current linear velocity of `body`.
    fn linear_velocity(&self, body: BodyHandle) -> Option<Vec3>;

    /// Touching contact manifolds seen during the latest step.
    fn contact_manifolds(&self) -> Vec<ContactManifold>;
}
