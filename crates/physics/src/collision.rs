//! # Collision Event Detection
//!
//! Turns raw contact manifolds into debounced semantic events. Only impacts
//! of tracked tubes against the front plane count, and each tube is held in
//! a cooldown after an emitted event: one physical impact shows up as several
//! manifolds over consecutive steps and would otherwise retrigger the impact
//! sound like a machine gun.

use std::collections::HashMap;

use tracing::debug;

use crate::engine::{BodyHandle, ContactManifold};

/// Thresholds for recognising an impact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionConfig {
    /// Minimum linear speed (units/s) of the tube for a contact to count.
    pub min_impact_speed: f32,
    /// Per-body cooldown after an emitted event, in milliseconds.
    pub debounce_ms: f64,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            min_impact_speed: 4.0,
            debounce_ms: 200.0,
        }
    }
}

/// A recognised impact of a tube against the front plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionEvent {
    /// Index of the tube in the transform array returned by a step.
    pub body_index: usize,
    /// Linear speed of the tube at the time of the impact.
    pub impact_speed: f32,
    pub timestamp_ms: f64,
}

/// Debounce state and scanning logic.
#[derive(Debug, Default)]
pub struct CollisionDetector {
    config: CollisionConfig,
    /// body index -> cooldown expiry timestamp
    cooldowns: HashMap<usize, f64>,
}

impl CollisionDetector {
    #[must_use]
    pub fn new(config: CollisionConfig) -> Self {
        Self {
            config,
            cooldowns: HashMap::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &CollisionConfig {
        &self.config
    }

    /// Scan the manifolds of one step.
    ///
    /// `lookup` resolves a handle to `(body index, linear speed)` for tracked
    /// tubes and returns `None` for everything else; manifolds that do not
    /// pair the front plane with a tracked tube are ignored.
    pub fn detect<F>(
        &mut self,
        manifolds: &[ContactManifold],
        front_plane: BodyHandle,
        now_ms: f64,
        lookup: F,
    ) -> Vec<CollisionEvent>
    where
        F: Fn(BodyHandle) -> Option<(usize, f32)>,
    {
        self.purge_expired(now_ms);

        let mut events = Vec::new();
        for manifold in manifolds.iter().filter(|m| m.point_count > 0) {
            let Some(other) = manifold.other(front_plane) else {
                continue;
            };
            let Some((body_index, speed)) = lookup(other) else {
                continue;
            };
            if let Some(event) = self.register_impact(body_index, speed, now_ms) {
                events.push(event);
            }
        }
        events
    }

    /// Apply the speed threshold and the debounce window to one contact.
    pub fn register_impact(&mut self, body_index: usize, speed: f32, now_ms: f64) -> Option<CollisionEvent> {
        if speed <= self.config.min_impact_speed {
            return None;
        }
        if self.is_cooling_down(body_index, now_ms) {
            return None;
        }

        self.cooldowns.insert(body_index, now_ms + self.config.debounce_ms);
        debug!(body_index, speed, now_ms, "front plane impact");
        Some(CollisionEvent {
            body_index,
            impact_speed: speed,
            timestamp_ms: now_ms,
        })
    }

    #[must_use]
    pub fn is_cooling_down(&self, body_index: usize, now_ms: f64) -> bool {
        self.cooldowns
            .get(&body_index)
            .is_some_and(|&expiry| now_ms < expiry)
    }

    /// Number of bodies currently tracked in the cooldown map.
    #[must_use]
    pub fn tracked_cooldowns(&self) -> usize {
        self.cooldowns.len()
    }

    fn purge_expired(&mut self, now_ms: f64) {
        self.cooldowns.retain(|_, expiry| now_ms < *expiry);
    }
}
