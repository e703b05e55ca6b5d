//! # Rapier Backend
//!
//! [`PhysicsEngine`] implemented over rapier3d. Planes are half-spaces on
//! fixed bodies, tubes share one convex hull built from the mesh proxy, and
//! the frame time is split into a fixed number of equal integration steps.

use std::collections::{BTreeMap, HashMap};

use glam::{Quat, Vec3};
use rapier3d::na::Unit;
use rapier3d::prelude::*;
use tracing::{debug, info};

use crate::engine::{BodyHandle, CollisionLayers, ContactManifold, PhysicsEngine, RayHit, ShapeId};
use crate::error::PhysicsError;
use crate::mesh::MeshProxy;

const PLANE_RESTITUTION: Real = 1.0;
const TUBE_RESTITUTION: Real = 0.6;
const TUBE_FRICTION: Real = 0.5;
/// Contact points separated by more than this are speculative, not touching.
const TOUCH_DISTANCE: Real = 1.0e-3;

fn to_vector(v: Vec3) -> Vector<Real> {
    vector![v.x, v.y, v.z]
}

fn to_point(v: Vec3) -> Point<Real> {
    point![v.x, v.y, v.z]
}

fn interaction_groups(layers: CollisionLayers) -> InteractionGroups {
    InteractionGroups::new(
        Group::from_bits_truncate(layers.membership),
        Group::from_bits_truncate(layers.filter),
    )
}

/// Rapier world plus the handle bookkeeping the trait needs.
pub struct RapierEngine {
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: BroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    shapes: Vec<SharedShape>,
    handles: Vec<RigidBodyHandle>,
    reverse: HashMap<RigidBodyHandle, BodyHandle>,
    /// Touching pairs seen in any substep of the latest step, with the
    /// largest touching point count observed.
    step_contacts: BTreeMap<(BodyHandle, BodyHandle), usize>,
    created: bool,
}

impl RapierEngine {
    #[must_use]
    pub fn new() -> Self {
        Self {
            gravity: Vector::zeros(),
            integration_parameters: IntegrationParameters::default(),
            pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: BroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            shapes: Vec::new(),
            handles: Vec::new(),
            reverse: HashMap::new(),
            step_contacts: BTreeMap::new(),
            created: false,
        }
    }

    fn insert(&mut self, body: RigidBody, collider: Collider) -> BodyHandle {
        let rb_handle = self.bodies.insert(body);
        self.colliders
            .insert_with_parent(collider, rb_handle, &mut self.bodies);
        let handle = BodyHandle(self.handles.len() as u32);
        self.handles.push(rb_handle);
        self.reverse.insert(rb_handle, handle);
        // Ray queries can run before the first step.
        self.query_pipeline.update(&self.bodies, &self.colliders);
        handle
    }

    fn body(&self, body: BodyHandle) -> Option<&RigidBody> {
        self.handles
            .get(body.0 as usize)
            .and_then(|handle| self.bodies.get(*handle))
    }

    fn collider_body(&self, collider: ColliderHandle) -> Option<BodyHandle> {
        self.colliders
            .get(collider)
            .and_then(Collider::parent)
            .and_then(|parent| self.reverse.get(&parent).copied())
    }

    /// Fold the narrow phase's touching contacts into `step_contacts`. A fast
    /// tube can hit and leave a plane within one frame, so every substep is
    /// scanned rather than only the last one.
    fn record_touching_contacts(&mut self) {
        for pair in self.narrow_phase.contact_pairs() {
            let (Some(body_a), Some(body_b)) = (
                self.collider_body(pair.collider1),
                self.collider_body(pair.collider2),
            ) else {
                continue;
            };
            for manifold in &pair.manifolds {
                let touching = manifold
                    .points
                    .iter()
                    .filter(|point| point.dist <= TOUCH_DISTANCE)
                    .count();
                if touching == 0 {
                    continue;
                }
                let count = self.step_contacts.entry((body_a, body_b)).or_insert(0);
                *count = (*count).max(touching);
            }
        }
    }
}

impl Default for RapierEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsEngine for RapierEngine {
    fn create_world(&mut self, gravity: Vec3) -> Result<(), PhysicsError> {
        if self.created {
            return Err(PhysicsError::EngineInit("world already created".into()));
        }
        if !gravity.is_finite() {
            return Err(PhysicsError::EngineInit(format!("non-finite gravity {gravity:?}")));
        }
        self.gravity = to_vector(gravity);
        self.created = true;
        info!(?gravity, "rapier world created");
        Ok(())
    }

    fn create_shape(&mut self, proxy: &MeshProxy, scale: f32) -> Result<ShapeId, PhysicsError> {
        if proxy.is_empty() {
            return Err(PhysicsError::InvalidShape("empty mesh proxy"));
        }
        if !(scale.is_finite() && scale > 0.0) {
            return Err(PhysicsError::InvalidShape("scale must be positive"));
        }
        let points: Vec<Point<Real>> = proxy
            .scaled_points(scale)
            .into_iter()
            .map(to_point)
            .collect();
        let shape = SharedShape::convex_hull(&points)
            .ok_or(PhysicsError::InvalidShape("mesh proxy has no convex hull"))?;
        let volume = shape.mass_properties(1.0).mass();
        if !(volume.is_finite() && volume > Real::EPSILON) {
            return Err(PhysicsError::InvalidShape("mesh proxy hull has no volume"));
        }
        self.shapes.push(shape);
        debug!(points = points.len(), scale, "collision hull built");
        Ok(ShapeId(self.shapes.len() as u32 - 1))
    }

    fn add_static_plane(&mut self, normal: Vec3, offset: f32, layers: CollisionLayers) -> BodyHandle {
        let body = RigidBodyBuilder::fixed()
            .translation(to_vector(normal * offset))
            .build();
        let collider = ColliderBuilder::halfspace(Unit::new_normalize(to_vector(normal)))
            .restitution(PLANE_RESTITUTION)
            .collision_groups(interaction_groups(layers))
            .build();
        self.insert(body, collider)
    }

    fn add_dynamic_body(
        &mut self,
        shape: ShapeId,
        mass: f32,
        position: Vec3,
        rotation: Quat,
        layers: CollisionLayers,
    ) -> Result<BodyHandle, PhysicsError> {
        let shape = self
            .shapes
            .get(shape.0 as usize)
            .cloned()
            .ok_or(PhysicsError::InvalidShape("unknown shape id"))?;
        let (axis, angle) = rotation.to_axis_angle();
        let body = RigidBodyBuilder::dynamic()
            .translation(to_vector(position))
            .rotation(to_vector(axis * angle))
            .build();
        let collider = ColliderBuilder::new(shape)
            .mass(mass)
            .restitution(TUBE_RESTITUTION)
            .friction(TUBE_FRICTION)
            .collision_groups(interaction_groups(layers))
            .build();
        Ok(self.insert(body, collider))
    }

    /// Split `dt` into `substeps` equal integration steps. The step size
    /// follows the frame time instead of a fixed 1/240 s, so a clamped 32 ms
    /// frame integrates at 3.2 ms and a 16 ms frame at 1.6 ms.
    fn step_simulation(&mut self, dt: f32, substeps: u32) {
        let substeps = substeps.max(1);
        self.integration_parameters.dt = dt / substeps as f32;
        self.step_contacts.clear();
        for _ in 0..substeps {
            self.pipeline.step(
                &self.gravity,
                &self.integration_parameters,
                &mut self.island_manager,
                &mut self.broad_phase,
                &mut self.narrow_phase,
                &mut self.bodies,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                &mut self.ccd_solver,
                Some(&mut self.query_pipeline),
                &(),
                &(),
            );
            self.record_touching_contacts();
        }
    }

    fn ray_test(&self, start: Vec3, end: Vec3, layers: CollisionLayers) -> Option<RayHit> {
        let ray = Ray::new(to_point(start), to_vector(end - start));
        let filter = QueryFilter::default().groups(interaction_groups(layers));
        // The direction spans the whole segment, so a toi of 1 reaches `end`.
        let (collider, toi) = self.query_pipeline.cast_ray(
            &self.bodies,
            &self.colliders,
            &ray,
            1.0,
            true,
            filter,
        )?;
        let body = self.collider_body(collider)?;
        let hit = ray.point_at(toi);
        Some(RayHit {
            body,
            point: Vec3::new(hit.x, hit.y, hit.z),
        })
    }

    fn apply_impulse(&mut self, body: BodyHandle, local_position: Vec3, impulse: Vec3) {
        let Some(handle) = self.handles.get(body.0 as usize).copied() else {
            return;
        };
        if let Some(rb) = self.bodies.get_mut(handle) {
            rb.wake_up(true);
            let point = rb.position() * to_point(local_position);
            rb.apply_impulse_at_point(to_vector(impulse), point, true);
        }
    }

    fn world_transform(&self, body: BodyHandle) -> Option<(Quat, Vec3)> {
        let rb = self.body(body)?;
        let iso = rb.position();
        let t = iso.translation.vector;
        let q = iso.rotation;
        Some((Quat::from_xyzw(q.i, q.j, q.k, q.w), Vec3::new(t.x, t.y, t.z)))
    }

    fn linear_velocity(&self, body: BodyHandle) -> Option<Vec3> {
        let v = self.body(body)?.linvel();
        Some(Vec3::new(v.x, v.y, v.z))
    }

    fn contact_manifolds(&self) -> Vec<ContactManifold> {
        self.step_contacts
            .iter()
            .map(|(&(body_a, body_b), &point_count)| ContactManifold {
                body_a,
                body_b,
                point_count,
            })
            .collect()
    }
}
