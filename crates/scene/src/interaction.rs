//! # Interaction Controller
//!
//! Resolves a pointer click into impulses. The click becomes a ray from the
//! camera through the far plane; a tube under the ray is pushed along the ray
//! at the hit point, and every other tube is pushed away from where the ray
//! meets the floor with a strength that falls off with distance.

use glam::{Vec2, Vec3};
use physics::{transform, BodyHandle, PhysicsWorld};
use render::{CameraState, ImpulseRing};
use tracing::{debug, warn};

use crate::audio::AudioEngine;

/// Added to the shockwave distance so a tube at the centre stays finite.
const SHOCKWAVE_DISTANCE_BIAS: f32 = 0.01;

/// A click as delivered by the window layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickInput {
    /// Normalized device coordinates, origin at the centre, +Y up.
    pub ndc: Vec2,
    /// `[0, 1]` screen coordinates, origin top-left; recorded for the effect.
    pub screen: Vec2,
    pub now_ms: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppliedImpulse {
    pub body_index: usize,
    /// Point of application in the scaled mesh frame.
    pub local_position: Vec3,
    pub impulse: Vec3,
}

/// Everything a click did, for logging and tests.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClickOutcome {
    /// Index of the tube under the pointer.
    pub hit: Option<usize>,
    pub hit_point: Option<Vec3>,
    /// Shockwave centre; `None` when the ray never reaches the floor.
    pub ground_point: Option<Vec3>,
    pub impulses: Vec<AppliedImpulse>,
    /// Ring slot the visual effect was written to.
    pub ring_slot: usize,
}

impl ClickOutcome {
    #[must_use]
    pub fn impulse_for(&self, body_index: usize) -> Option<&AppliedImpulse> {
        self.impulses.iter().find(|i| i.body_index == body_index)
    }
}

/// Strength of the radial push on a tube `distance` away from the centre.
#[must_use]
pub fn shockwave_magnitude(max_bound: f32, distance: f32, scale_factor: f32) -> f32 {
    (max_bound / (distance + SHOCKWAVE_DISTANCE_BIAS)).max(0.0) * scale_factor
}

/// Where the ray `origin + t * direction` crosses `y = 0`, for `t > 0`.
#[must_use]
pub fn ground_intersection(origin: Vec3, direction: Vec3, epsilon: f32) -> Option<Vec3> {
    if direction.y.abs() <= epsilon {
        return None;
    }
    let t = -origin.y / direction.y;
    (t.is_finite() && t > 0.0).then(|| origin + direction * t)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionController {
    /// Lower bound of the direct impulse.
    pub min_direct_impulse: f32,
    /// Direct impulse per unit of body scale.
    pub direct_scale: f32,
    /// Rays flatter than this never reach the floor.
    pub parallel_epsilon: f32,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self {
            min_direct_impulse: 3.0,
            direct_scale: 1.5,
            parallel_epsilon: 1e-6,
        }
    }
}

impl InteractionController {
    #[must_use]
    pub fn direct_impulse_magnitude(&self, scale_factor: f32) -> f32 {
        self.min_direct_impulse.max(scale_factor * self.direct_scale)
    }

    pub fn handle_click(
        &self,
        input: &ClickInput,
        camera: &CameraState,
        world: &mut PhysicsWorld,
        ring: &mut ImpulseRing,
        audio: &mut dyn AudioEngine,
    ) -> ClickOutcome {
        let origin = camera.eye();
        let far = camera.unproject_far(input.ndc);
        let direction = (far - origin).normalize_or_zero();
        let scale = world.scale_factor();
        let mut outcome = ClickOutcome::default();

        let mut hit_body: Option<BodyHandle> = None;
        if let Some(hit) = world.ray_hit_test(origin, far) {
            if let Some(index) = world.body_index_of(hit.body) {
                let local = world
                    .body_matrix(index)
                    .map_or(Vec3::ZERO, |m| transform::world_to_local(m, hit.point));
                let impulse = direction * self.direct_impulse_magnitude(scale);
                apply(world, &mut outcome, index, hit.body, local, impulse);
                hit_body = Some(hit.body);
                outcome.hit = Some(index);
                outcome.hit_point = Some(hit.point);
            }
        }

        outcome.ground_point = ground_intersection(origin, direction, self.parallel_epsilon);
        if let Some(centre) = outcome.ground_point {
            let max_bound = world.max_bound();
            for index in 0..world.body_count() {
                let Some(handle) = world.body_handle(index) else {
                    continue;
                };
                if Some(handle) == hit_body {
                    continue;
                }
                let Some(position) = world.body_position(index) else {
                    continue;
                };
                let offset = position - centre;
                let magnitude = shockwave_magnitude(max_bound, offset.length(), scale);
                let impulse = offset.normalize_or_zero() * magnitude;
                apply(world, &mut outcome, index, handle, Vec3::ZERO, impulse);
            }
        } else {
            debug!(?direction, "click ray misses the floor; no shockwave");
        }

        audio.play_click_sound();
        outcome.ring_slot = ring.record(input.screen, input.now_ms);
        debug!(
            hit = ?outcome.hit,
            impulses = outcome.impulses.len(),
            slot = outcome.ring_slot,
            "click resolved"
        );
        outcome
    }
}

fn apply(
    world: &mut PhysicsWorld,
    outcome: &mut ClickOutcome,
    body_index: usize,
    handle: BodyHandle,
    local_position: Vec3,
    impulse: Vec3,
) {
    match world.apply_impulse(handle, local_position, impulse) {
        Ok(()) => outcome.impulses.push(AppliedImpulse {
            body_index,
            local_position,
            impulse,
        }),
        Err(err) => warn!(%err, body_index, "impulse rejected"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magnitude_falls_off_and_never_goes_negative() {
        let near = shockwave_magnitude(10.0, 1.0, 2.0);
        let far = shockwave_magnitude(10.0, 20.0, 2.0);
        assert!(near > far);
        assert!(far > 0.0);
        assert!(shockwave_magnitude(10.0, 0.0, 1.0).is_finite());
        assert_eq!(shockwave_magnitude(-1.0, 3.0, 1.0), 0.0);

        let mut last = f32::INFINITY;
        for step in 0..200 {
            let m = shockwave_magnitude(12.0, step as f32 * 0.25, 1.5);
            assert!(m <= last && m >= 0.0);
            last = m;
        }
    }

    #[test]
    fn ground_hit_below_the_camera() {
        let p = ground_intersection(Vec3::new(0.0, 20.0, 0.0), Vec3::new(0.6, -0.8, 0.0), 1e-6).unwrap();
        assert!(p.y.abs() < 1e-5);
        assert!((p.x - 15.0).abs() < 1e-4);
    }

    #[test]
    fn parallel_and_upward_rays_have_no_ground_point() {
        assert_eq!(ground_intersection(Vec3::new(0.0, 5.0, 0.0), Vec3::X, 1e-6), None);
        assert_eq!(ground_intersection(Vec3::new(0.0, 5.0, 0.0), Vec3::Y, 1e-6), None);
    }

    #[test]
    fn direct_impulse_has_a_floor() {
        let controller = InteractionController::default();
        assert_eq!(controller.direct_impulse_magnitude(0.5), 3.0);
        assert_eq!(controller.direct_impulse_magnitude(4.0), 6.0);
    }
}
