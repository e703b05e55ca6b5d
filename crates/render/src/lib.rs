//! # Tubes Renderer
//!
//! Presentation side of the arena: the top-down camera, the ring buffer of
//! recent impulse effects, and a wgpu [`Renderer`] that runs a fixed
//! four-pass frame (geometry, horizontal blur, vertical blur, impulse
//! composite).
//!
//! Everything except [`state`], [`pipeline`] and [`targets`] is plain data
//! and usable without a GPU.

pub mod camera;
pub mod error;
pub mod gpu_types;
pub mod impulse_ring;
pub mod passes;
pub mod pipeline;
pub mod state;
pub mod targets;

use glam::Mat4;

pub use camera::{Camera, CameraState};
pub use error::RenderError;
pub use impulse_ring::{ImpulseRecord, ImpulseRing, ImpulseSlot, IMPULSE_SLOTS};
pub use passes::{Pass, ShaderKind, FRAME_PASSES};
pub use state::{RenderSettings, Renderer};

/// Everything a frame draws, gathered by the caller before [`Renderer::render`].
#[derive(Debug, Clone, Copy)]
pub struct FrameInputs<'a> {
    pub camera: &'a CameraState,
    /// Scaled body world matrices in body-index order.
    pub transforms: &'a [Mat4],
    pub impulses: [ImpulseSlot; IMPULSE_SLOTS],
    pub time_ms: f64,
    /// Animation frame counter.
    pub frames: f32,
}
