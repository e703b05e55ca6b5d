//! # Physics World Adapter
//!
//! [`PhysicsWorld`] is the single point of contact with the rigid-body
//! engine. It owns every body handle, builds the arena once, steps the
//! solver with a clamped frame time and hands back render-ready transforms
//! together with the collision events detected during the step.

use std::collections::HashMap;
use std::f32::consts::{FRAC_PI_2, TAU};

use glam::{Mat4, Quat, Vec3};
use tracing::{debug, info, warn};

use crate::arena::{ArenaBounds, ArenaSide, BodyTag};
use crate::collision::{CollisionConfig, CollisionDetector, CollisionEvent};
use crate::engine::{BodyHandle, CollisionLayers, PhysicsEngine, RayHit};
use crate::error::PhysicsError;
use crate::mesh::MeshProxy;
use crate::transform;

/// Largest frame time integrated by a single [`PhysicsWorld::step`].
pub const MAX_STEP_MS: f64 = 32.0;
/// Integration steps the engine runs per frame.
pub const SUBSTEPS: u32 = 10;

/// Everything needed to build a world.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldParams {
    pub body_count: usize,
    /// Uniform body scale, also the reference length for impulses.
    pub scale_factor: f32,
    pub bound_x: f32,
    pub bound_y: f32,
    /// Height of the front plane above the floor.
    pub height: f32,
    pub gravity: Vec3,
    pub body_mass: f32,
    /// Seed for spawn positions and orientations.
    pub seed: u64,
    pub collision: CollisionConfig,
}

impl WorldParams {
    /// Parameters with reference defaults; the front plane sits at the
    /// larger of the two horizontal bounds.
    #[must_use]
    pub fn new(body_count: usize, scale_factor: f32, bound_x: f32, bound_y: f32) -> Self {
        Self {
            body_count,
            scale_factor,
            bound_x,
            bound_y,
            height: bound_x.max(bound_y),
            gravity: Vec3::new(0.0, -9.0, 0.0),
            body_mass: 0.1,
            seed: 0x7ab5,
            collision: CollisionConfig::default(),
        }
    }

    #[must_use]
    pub fn with_height(mut self, height: f32) -> Self {
        self.height = height;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_gravity(mut self, gravity: Vec3) -> Self {
        self.gravity = gravity;
        self
    }

    #[must_use]
    pub fn with_mass(mut self, body_mass: f32) -> Self {
        self.body_mass = body_mass;
        self
    }

    #[must_use]
    pub fn with_collision(mut self, collision: CollisionConfig) -> Self {
        self.collision = collision;
        self
    }

    fn validate(&self) -> Result<(), PhysicsError> {
        let positive = |v: f32| v.is_finite() && v > 0.0;
        if !positive(self.scale_factor) {
            return Err(PhysicsError::InvalidParameter("scale factor must be positive"));
        }
        if !(positive(self.bound_x) && positive(self.bound_y) && positive(self.height)) {
            return Err(PhysicsError::InvalidParameter("arena bounds must be positive"));
        }
        if !positive(self.body_mass) {
            return Err(PhysicsError::InvalidParameter("body mass must be positive"));
        }
        Ok(())
    }
}

/// Result of one [`PhysicsWorld::step`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepOutput {
    /// Scaled world matrix per tube, in body-index order.
    pub transforms: Vec<Mat4>,
    /// Front plane impacts recognised during this step.
    pub collisions: Vec<CollisionEvent>,
}

pub struct PhysicsWorld {
    engine: Box<dyn PhysicsEngine>,
    params: WorldParams,
    bounds: ArenaBounds,
    planes: Vec<(ArenaSide, BodyHandle)>,
    front_plane: BodyHandle,
    tubes: Vec<BodyHandle>,
    index_of: HashMap<BodyHandle, usize>,
    detector: CollisionDetector,
}

impl PhysicsWorld {
    /// Create the engine world, the six arena planes, the shared tube shape
    /// and `params.body_count` tubes.
    ///
    /// # Errors
    ///
    /// Engine start-up failures are returned unchanged and are not retried.
    pub fn initialize(mut engine: Box<dyn PhysicsEngine>, params: &WorldParams) -> Result<Self, PhysicsError> {
        params.validate()?;
        engine.create_world(params.gravity)?;

        let bounds = ArenaBounds::new(params.bound_x, params.bound_y, params.height);
        let planes: Vec<(ArenaSide, BodyHandle)> = bounds
            .planes()
            .iter()
            .map(|plane| {
                let handle = engine.add_static_plane(plane.normal, plane.offset, CollisionLayers::STATIC);
                (plane.side, handle)
            })
            .collect();
        let front_plane = planes
            .iter()
            .find(|(side, _)| *side == ArenaSide::Front)
            .map(|(_, handle)| *handle)
            .ok_or(PhysicsError::InvalidParameter("arena has no front plane"))?;

        let shape = engine.create_shape(&MeshProxy::tube(), params.scale_factor)?;

        let mut rng = fastrand::Rng::with_seed(params.seed);
        let mut tubes = Vec::with_capacity(params.body_count);
        let mut index_of = HashMap::with_capacity(params.body_count);
        for index in 0..params.body_count {
            let position = bounds.spawn_point(&mut rng, params.scale_factor);
            // Lay the tube on its side, then spin it about the vertical axis.
            let rotation = Quat::from_rotation_y(rng.f32() * TAU) * Quat::from_rotation_z(FRAC_PI_2);
            let handle = engine.add_dynamic_body(shape, params.body_mass, position, rotation, CollisionLayers::DYNAMIC)?;
            debug!(index, ?position, "spawned tube");
            index_of.insert(handle, index);
            tubes.push(handle);
        }

        info!(
            bodies = tubes.len(),
            bound_x = bounds.bound_x,
            bound_y = bounds.bound_y,
            height = bounds.height,
            scale = params.scale_factor,
            "physics world initialized"
        );

        Ok(Self {
            engine,
            params: params.clone(),
            bounds,
            planes,
            front_plane,
            tubes,
            index_of,
            detector: CollisionDetector::new(params.collision),
        })
    }

    /// Advance the simulation by `delta_ms`, clamped to [`MAX_STEP_MS`].
    ///
    /// A zero (or negative) frame time leaves the engine untouched and only
    /// reads back the current transforms.
    pub fn step(&mut self, delta_ms: f64, now_ms: f64) -> StepOutput {
        let clamped = if delta_ms.is_nan() { 0.0 } else { delta_ms.clamp(0.0, MAX_STEP_MS) };

        let mut collisions = Vec::new();
        if clamped > 0.0 {
            self.engine.step_simulation((clamped / 1000.0) as f32, SUBSTEPS);

            let manifolds = self.engine.contact_manifolds();
            let engine = &self.engine;
            let index_of = &self.index_of;
            collisions = self.detector.detect(&manifolds, self.front_plane, now_ms, |handle| {
                let index = *index_of.get(&handle)?;
                let speed = engine.linear_velocity(handle).map_or(0.0, Vec3::length);
                Some((index, speed))
            });
        }

        StepOutput {
            transforms: self.transforms(),
            collisions,
        }
    }

    /// Current scaled world matrices of every tube with a valid motion state.
    #[must_use]
    pub fn transforms(&self) -> Vec<Mat4> {
        (0..self.tubes.len())
            .filter_map(|index| {
                let matrix = self.body_matrix(index);
                if matrix.is_none() {
                    warn!(index, "tube has no motion state");
                }
                matrix
            })
            .collect()
    }

    /// Closest tube hit by the segment `start..end`. Static planes never match.
    #[must_use]
    pub fn ray_hit_test(&self, start: Vec3, end: Vec3) -> Option<RayHit> {
        self.engine
            .ray_test(start, end, CollisionLayers::QUERY)
            .filter(|hit| self.index_of.contains_key(&hit.body))
    }

    /// Wake `body` and apply `impulse` at `local_position`.
    ///
    /// `local_position` is expressed in the scaled mesh frame, i.e. the frame
    /// of the matrices returned by [`step`](Self::step).
    ///
    /// # Errors
    ///
    /// [`PhysicsError::UnknownBody`] when `body` is not one of the tubes.
    pub fn apply_impulse(&mut self, body: BodyHandle, local_position: Vec3, impulse: Vec3) -> Result<(), PhysicsError> {
        if !self.index_of.contains_key(&body) {
            return Err(PhysicsError::UnknownBody(body));
        }
        self.engine
            .apply_impulse(body, local_position * self.params.scale_factor, impulse);
        Ok(())
    }

    #[must_use]
    pub fn body_index_of(&self, body: BodyHandle) -> Option<usize> {
        self.index_of.get(&body).copied()
    }

    #[must_use]
    pub fn body_handle(&self, index: usize) -> Option<BodyHandle> {
        self.tubes.get(index).copied()
    }

    /// Scaled world matrix of tube `index`.
    #[must_use]
    pub fn body_matrix(&self, index: usize) -> Option<Mat4> {
        let handle = self.body_handle(index)?;
        let (rotation, position) = self.engine.world_transform(handle)?;
        Some(transform::body_matrix(position, rotation, self.params.scale_factor))
    }

    #[must_use]
    pub fn body_position(&self, index: usize) -> Option<Vec3> {
        let handle = self.body_handle(index)?;
        self.engine.world_transform(handle).map(|(_, position)| position)
    }

    #[must_use]
    pub fn tag_of(&self, body: BodyHandle) -> Option<BodyTag> {
        if let Some(index) = self.body_index_of(body) {
            return Some(BodyTag::Tube(index));
        }
        self.planes
            .iter()
            .find(|(_, handle)| *handle == body)
            .map(|(side, _)| BodyTag::Plane(*side))
    }

    #[must_use]
    pub fn bounds(&self) -> &ArenaBounds {
        &self.bounds
    }

    #[must_use]
    pub fn scale_factor(&self) -> f32 {
        self.params.scale_factor
    }

    #[must_use]
    pub fn max_bound(&self) -> f32 {
        self.bounds.max_bound()
    }

    #[must_use]
    pub fn front_plane(&self) -> BodyHandle {
        self.front_plane
    }

    #[must_use]
    pub fn body_count(&self) -> usize {
        self.tubes.len()
    }

    #[must_use]
    pub fn params(&self) -> &WorldParams {
        &self.params
    }

    #[must_use]
    pub fn collision_detector(&self) -> &CollisionDetector {
        &self.detector
    }
}

impl std::fmt::Debug for PhysicsWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhysicsWorld")
            .field("bounds", &self.bounds)
            .field("bodies", &self.tubes.len())
            .field("front_plane", &self.front_plane)
            .finish_non_exhaustive()
    }
}
