#![deny(clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::missing_errors_doc
)]
//! # Tubes Scene
//!
//! Glue between the physics world and the renderer: one [`Scene`] owns the
//! camera, the [`physics::PhysicsWorld`], the impulse effect ring and the
//! audio hooks, and is driven one [`FrameContext`] at a time by the host
//! loop. Nothing here touches the GPU or the window.

pub mod audio;
pub mod config;
pub mod error;
pub mod frame;
pub mod interaction;
pub mod scene;

pub use audio::{impact_volume_db, AudioEngine, ClickMute, TracingAudio};
pub use config::{CameraConfig, SceneConfig};
pub use error::SceneError;
pub use frame::FrameContext;
pub use interaction::{
    ground_intersection, shockwave_magnitude, AppliedImpulse, ClickInput, ClickOutcome, InteractionController,
};
pub use scene::{FrameSnapshot, Scene, SceneStats};
