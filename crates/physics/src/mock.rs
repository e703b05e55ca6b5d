//! Scripted [`PhysicsEngine`] for tests.
//!
//! Every call is recorded and the interesting outputs (poses, velocities,
//! ray hits, contact manifolds) are set by the test. Clones share state, so a
//! test can keep one clone while the world owns the other.

use std::cell::RefCell;
use std::rc::Rc;

use glam::{Quat, Vec3};

use crate::engine::{BodyHandle, CollisionLayers, ContactManifold, PhysicsEngine, RayHit, ShapeId};
use crate::error::PhysicsError;
use crate::mesh::MeshProxy;

#[derive(Debug, Clone, PartialEq)]
pub struct MockPlane {
    pub handle: BodyHandle,
    pub normal: Vec3,
    pub offset: f32,
    pub layers: CollisionLayers,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MockBody {
    pub handle: BodyHandle,
    pub shape: ShapeId,
    pub mass: f32,
    pub position: Vec3,
    pub rotation: Quat,
    pub velocity: Vec3,
    pub layers: CollisionLayers,
    pub awake: bool,
    /// When false the body reports no motion state.
    pub has_motion_state: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordedImpulse {
    pub body: BodyHandle,
    pub local_position: Vec3,
    pub impulse: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordedStep {
    pub dt: f32,
    pub substeps: u32,
}

#[derive(Debug, Default)]
pub struct MockState {
    pub gravity: Option<Vec3>,
    pub fail_create_world: bool,
    pub shapes: Vec<f32>,
    pub planes: Vec<MockPlane>,
    pub bodies: Vec<MockBody>,
    pub steps: Vec<RecordedStep>,
    pub impulses: Vec<RecordedImpulse>,
    pub ray_queries: Vec<(Vec3, Vec3, CollisionLayers)>,
    pub ray_hit: Option<RayHit>,
    pub manifolds: Vec<ContactManifold>,
    next_handle: u32,
}

impl MockState {
    fn next_handle(&mut self) -> BodyHandle {
        let handle = BodyHandle(self.next_handle);
        self.next_handle += 1;
        handle
    }

    fn layers_of(&self, body: BodyHandle) -> Option<CollisionLayers> {
        self.bodies
            .iter()
            .find(|b| b.handle == body)
            .map(|b| b.layers)
            .or_else(|| self.planes.iter().find(|p| p.handle == body).map(|p| p.layers))
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockEngine {
    state: Rc<RefCell<MockState>>,
}

impl MockEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An engine whose `create_world` fails.
    #[must_use]
    pub fn failing() -> Self {
        let engine = Self::default();
        engine.state.borrow_mut().fail_create_world = true;
        engine
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&mut MockState) -> R) -> R {
        f(&mut self.state.borrow_mut())
    }

    pub fn set_position(&self, body: BodyHandle, position: Vec3) {
        self.with_body(body, |b| b.position = position);
    }

    pub fn set_velocity(&self, body: BodyHandle, velocity: Vec3) {
        self.with_body(body, |b| b.velocity = velocity);
    }

    pub fn set_ray_hit(&self, hit: Option<RayHit>) {
        self.state.borrow_mut().ray_hit = hit;
    }

    pub fn set_manifolds(&self, manifolds: Vec<ContactManifold>) {
        self.state.borrow_mut().manifolds = manifolds;
    }

    #[must_use]
    pub fn impulses(&self) -> Vec<RecordedImpulse> {
        self.state.borrow().impulses.clone()
    }

    #[must_use]
    pub fn steps(&self) -> Vec<RecordedStep> {
        self.state.borrow().steps.clone()
    }

    #[must_use]
    pub fn bodies(&self) -> Vec<MockBody> {
        self.state.borrow().bodies.clone()
    }

    #[must_use]
    pub fn planes(&self) -> Vec<MockPlane> {
        self.state.borrow().planes.clone()
    }

    fn with_body(&self, body: BodyHandle, f: impl FnOnce(&mut MockBody)) {
        if let Some(b) = self.state.borrow_mut().bodies.iter_mut().find(|b| b.handle == body) {
            f(b);
        }
    }
}

impl PhysicsEngine for MockEngine {
    fn create_world(&mut self, gravity: Vec3) -> Result<(), PhysicsError> {
        let mut state = self.state.borrow_mut();
        if state.fail_create_world {
            return Err(PhysicsError::EngineInit("mock engine configured to fail".into()));
        }
        state.gravity = Some(gravity);
        Ok(())
    }

    fn create_shape(&mut self, proxy: &MeshProxy, scale: f32) -> Result<ShapeId, PhysicsError> {
        if proxy.is_empty() {
            return Err(PhysicsError::InvalidShape("empty mesh proxy"));
        }
        let mut state = self.state.borrow_mut();
        state.shapes.push(scale);
        Ok(ShapeId(state.shapes.len() as u32 - 1))
    }

    fn add_static_plane(&mut self, normal: Vec3, offset: f32, layers: CollisionLayers) -> BodyHandle {
        let mut state = self.state.borrow_mut();
        let handle = state.next_handle();
        state.planes.push(MockPlane { handle, normal, offset, layers });
        handle
    }

    fn add_dynamic_body(
        &mut self,
        shape: ShapeId,
        mass: f32,
        position: Vec3,
        rotation: Quat,
        layers: CollisionLayers,
    ) -> Result<BodyHandle, PhysicsError> {
        let mut state = self.state.borrow_mut();
        if shape.0 as usize >= state.shapes.len() {
            return Err(PhysicsError::InvalidShape("unknown shape id"));
        }
        let handle = state.next_handle();
        state.bodies.push(MockBody {
            handle,
            shape,
            mass,
            position,
            rotation,
            velocity: Vec3::ZERO,
            layers,
            awake: false,
            has_motion_state: true,
        });
        Ok(handle)
    }

    fn step_simulation(&mut self, dt: f32, substeps: u32) {
        let mut state = self.state.borrow_mut();
        state.steps.push(RecordedStep { dt, substeps });
        for body in &mut state.bodies {
            body.position += body.velocity * dt;
        }
    }

    fn ray_test(&self, start: Vec3, end: Vec3, layers: CollisionLayers) -> Option<RayHit> {
        let mut state = self.state.borrow_mut();
        state.ray_queries.push((start, end, layers));
        let hit = state.ray_hit?;
        let target = state.layers_of(hit.body)?;
        layers.interacts_with(&target).then_some(hit)
    }

    fn apply_impulse(&mut self, body: BodyHandle, local_position: Vec3, impulse: Vec3) {
        let mut state = self.state.borrow_mut();
        if let Some(b) = state.bodies.iter_mut().find(|b| b.handle == body) {
            b.awake = true;
            b.velocity += impulse / b.mass.max(f32::EPSILON);
        }
        state.impulses.push(RecordedImpulse { body, local_position, impulse });
    }

    fn world_transform(&self, body: BodyHandle) -> Option<(Quat, Vec3)> {
        let state = self.state.borrow();
        state
            .bodies
            .iter()
            .find(|b| b.handle == body && b.has_motion_state)
            .map(|b| (b.rotation, b.position))
    }

    fn linear_velocity(&self, body: BodyHandle) -> Option<Vec3> {
        let state = self.state.borrow();
        state.bodies.iter().find(|b| b.handle == body).map(|b| b.velocity)
    }

    fn contact_manifolds(&self) -> Vec<ContactManifold> {
        self.state.borrow().manifolds.clone()
    }
}
