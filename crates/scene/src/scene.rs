//! The composed arena: one [`Scene`] per window, advanced one tick at a time.

use glam::Mat4;
use physics::{CollisionEvent, PhysicsEngine, PhysicsWorld};
use render::{CameraState, FrameInputs, ImpulseRing, ImpulseSlot, IMPULSE_SLOTS};
use tracing::{debug, info};

use crate::audio::{AudioEngine, ClickMute};
use crate::config::SceneConfig;
use crate::error::SceneError;
use crate::frame::FrameContext;
use crate::interaction::{ClickInput, ClickOutcome, InteractionController};

/// Counters for the headless summary and logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SceneStats {
    pub ticks: u64,
    pub clicks: u64,
    pub impact_sounds: u64,
    pub muted_impacts: u64,
}

/// What one tick produced; everything the renderer needs for the frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSnapshot {
    pub transforms: Vec<Mat4>,
    pub collisions: Vec<CollisionEvent>,
    pub impulses: [ImpulseSlot; IMPULSE_SLOTS],
    pub time_ms: f64,
    pub frames: f32,
}

/// The arena as one unit: camera, physics, effect ring, interaction and audio.
pub struct Scene {
    config: SceneConfig,
    camera: CameraState,
    world: PhysicsWorld,
    ring: ImpulseRing,
    controller: InteractionController,
    audio: Box<dyn AudioEngine>,
    mute: ClickMute,
    destroyed: bool,
    stats: SceneStats,
}

impl Scene {
    /// Build the arena for a `width` x `height` drawable.
    ///
    /// # Errors
    ///
    /// Propagates physics initialisation failures.
    pub fn initialize(
        config: SceneConfig,
        engine: Box<dyn PhysicsEngine>,
        audio: Box<dyn AudioEngine>,
        width: u32,
        height: u32,
    ) -> Result<Self, SceneError> {
        let camera = CameraState::new(config.camera.camera(), width, height);
        let layout = config.layout(width, height);
        let world = PhysicsWorld::initialize(engine, &config.world_params(&layout))?;
        info!(
            bodies = world.body_count(),
            scale = layout.scale_factor,
            bound_x = layout.bounds.bound_x,
            bound_y = layout.bounds.bound_y,
            "scene initialised"
        );
        Ok(Self {
            ring: ImpulseRing::new(config.effect_duration_ms),
            mute: ClickMute::new(config.click_mute_ms),
            controller: InteractionController::default(),
            camera,
            world,
            audio,
            config,
            destroyed: false,
            stats: SceneStats::default(),
        })
    }

    /// Step physics, voice the collisions and snapshot the effect ring.
    /// Returns `None` once the scene is destroyed.
    pub fn tick(&mut self, frame: &FrameContext) -> Option<FrameSnapshot> {
        if self.destroyed {
            return None;
        }
        let out = self.world.step(frame.delta_ms, frame.time_ms);
        for event in &out.collisions {
            if self.mute.allows(frame.time_ms) {
                self.audio.play_impact_sound(event.impact_speed);
                self.stats.impact_sounds += 1;
            } else {
                debug!(body = event.body_index, "impact muted after click");
                self.stats.muted_impacts += 1;
            }
        }
        self.stats.ticks += 1;
        Some(FrameSnapshot {
            transforms: out.transforms,
            collisions: out.collisions,
            impulses: self.ring.snapshot(frame.time_ms),
            time_ms: frame.time_ms,
            frames: frame.frames,
        })
    }

    /// Handle a click at client pixel coordinates.
    pub fn click(&mut self, client_x: f32, client_y: f32, now_ms: f64) -> Option<ClickOutcome> {
        if self.destroyed {
            return None;
        }
        let input = ClickInput {
            ndc: self.camera.client_to_ndc(client_x, client_y),
            screen: self.camera.client_to_screen(client_x, client_y),
            now_ms,
        };
        let outcome = self.controller.handle_click(
            &input,
            &self.camera,
            &mut self.world,
            &mut self.ring,
            self.audio.as_mut(),
        );
        self.mute.on_click(now_ms);
        self.stats.clicks += 1;
        Some(outcome)
    }

    /// The arena keeps its initial bounds; only the projection follows the
    /// drawable.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.resize(width, height);
        debug!(width, height, "scene camera resized");
    }

    pub fn destroy(&mut self) {
        if !self.destroyed {
            info!(stats = ?self.stats, "scene destroyed");
        }
        self.destroyed = true;
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    #[must_use]
    pub fn frame_inputs<'a>(&'a self, snapshot: &'a FrameSnapshot) -> FrameInputs<'a> {
        FrameInputs {
            camera: &self.camera,
            transforms: &snapshot.transforms,
            impulses: snapshot.impulses,
            time_ms: snapshot.time_ms,
            frames: snapshot.frames,
        }
    }

    #[must_use]
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    #[must_use]
    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    #[must_use]
    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    #[must_use]
    pub fn ring(&self) -> &ImpulseRing {
        &self.ring
    }

    #[must_use]
    pub fn stats(&self) -> SceneStats {
        self.stats
    }
}
