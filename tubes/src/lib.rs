//! # Tubes
//!
//! The application shell around the workspace crates:
//!
//! -   **[`physics`]:** the rigid-body world, the arena and front plane
//!     collision events.
//! -   **[`render`]:** camera, impulse effect ring and the wgpu renderer.
//! -   **[`scene`]:** the per-frame coordination of the two, click handling
//!     and audio hooks.
//!
//! This crate adds the command line, the winit event loop, resize coalescing
//! and shader hot reloading.

pub mod app;
pub mod cli;
pub mod input;
pub mod resize;
pub mod watcher;

pub use app::{run, run_headless, HeadlessSummary};
pub use cli::Cli;

pub use physics;
pub use render;
pub use scene;
