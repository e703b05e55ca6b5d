//! # Application Loop
//!
//! [`run`] opens a window and drives the scene from winit's redraw events;
//! [`run_headless`] drives the same scene from a synthetic 16 ms clock with a
//! periodic centre click, for CI and profiling.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use physics::RapierEngine;
use render::{Renderer, ShaderKind};
use scene::{FrameContext, Scene, SceneConfig, TracingAudio};
use tracing::{debug, error, info, warn};
use winit::event::{ElementState, Event, MouseButton, WindowEvent};
use winit::event_loop::EventLoop;
use winit::window::WindowBuilder;

use crate::input::Pointer;
use crate::resize::ResizeDebounce;
use crate::watcher::ShaderWatcher;

const HEADLESS_WIDTH: u32 = 1280;
const HEADLESS_HEIGHT: u32 = 720;
const HEADLESS_FRAME_MS: f64 = 16.0;
const HEADLESS_CLICK_EVERY: u64 = 120;
const PROGRESS_EVERY: u64 = 300;

/// Periodic progress line with a wall-clock frame rate.
struct Progress {
    frames: u64,
    since: Instant,
}

impl Progress {
    fn new() -> Self {
        Self {
            frames: 0,
            since: Instant::now(),
        }
    }

    fn frame(&mut self, scene: &Scene, bodies: usize) {
        self.frames += 1;
        if self.frames % PROGRESS_EVERY != 0 {
            return;
        }
        let elapsed = self.since.elapsed().as_secs_f64();
        let fps = if elapsed > 0.0 { PROGRESS_EVERY as f64 / elapsed } else { 0.0 };
        let stats = scene.stats();
        info!(
            frame = self.frames,
            bodies,
            fps = (fps * 10.0).round() / 10.0,
            clicks = stats.clicks,
            impacts = stats.impact_sounds,
            "progress"
        );
        self.since = Instant::now();
    }
}

/// What a headless run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadlessSummary {
    pub frames: u64,
    pub clicks: u64,
    pub impact_sounds: u64,
    pub muted_impacts: u64,
    /// Transforms returned by the last tick.
    pub bodies: usize,
}

/// Open a window and run until it is closed.
///
/// With `shader_dir` set, WGSL files there are watched and reloaded into the
/// running renderer; a shader that fails to compile keeps the previous
/// pipeline.
///
/// # Errors
///
/// Window, renderer or physics initialisation failures, and event loop
/// errors.
pub fn run(config: SceneConfig, shader_dir: Option<PathBuf>) -> Result<()> {
    let event_loop = EventLoop::new().context("failed to create event loop")?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("Floating Tubes")
            .build(&event_loop)
            .context("failed to create window")?,
    );
    let size = window.inner_size();

    let mut renderer = pollster::block_on(Renderer::new(window.clone(), config.render_settings()))
        .context("failed to initialise renderer")?;
    let animate = config.animate;
    let mut scene = Scene::initialize(
        config,
        Box::new(RapierEngine::new()),
        Box::new(TracingAudio::default()),
        size.width,
        size.height,
    )?;

    let shaders = shader_dir.and_then(|dir| match ShaderWatcher::start(&dir) {
        Ok(watcher) => Some(watcher),
        Err(e) => {
            error!("failed to start shader watcher: {e:?}");
            None
        }
    });

    let clock = Instant::now();
    let elapsed_ms = move || clock.elapsed().as_secs_f64() * 1000.0;
    let mut frame = FrameContext::start(elapsed_ms());
    let mut resize = ResizeDebounce::default();
    let mut pointer = Pointer::default();
    let mut progress = Progress::new();

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { ref event, window_id } if window_id == renderer.window().id() => match event {
            WindowEvent::CloseRequested => {
                scene.destroy();
                elwt.exit();
            }
            WindowEvent::Resized(size) => resize.request(size.width, size.height, elapsed_ms()),
            WindowEvent::CursorMoved { position, .. } => pointer.moved(position.x, position.y),
            WindowEvent::CursorLeft { .. } => pointer.left(),
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                let Some((x, y)) = pointer.click_position() else {
                    debug!("click before the cursor position is known; ignored");
                    return;
                };
                if let Some(outcome) = scene.click(x, y, elapsed_ms()) {
                    debug!(hit = ?outcome.hit, impulses = outcome.impulses.len(), "click");
                }
            }
            WindowEvent::RedrawRequested => {
                if let Some(watcher) = &shaders {
                    reload_changed(&mut renderer, &watcher.drain());
                }
                let now = elapsed_ms();
                if let Some((width, height)) = resize.take_ready(now) {
                    renderer.resize(width, height);
                    scene.resize(width, height);
                }

                frame = frame.advance(now, animate);
                let Some(snapshot) = scene.tick(&frame) else {
                    elwt.exit();
                    return;
                };
                progress.frame(&scene, snapshot.transforms.len());
                let rendered = renderer.render(&scene.frame_inputs(&snapshot));
                match rendered {
                    Ok(()) => {}
                    // Reconfigure the surface if lost
                    Err(wgpu::SurfaceError::Lost) => {
                        let (width, height) = renderer.size();
                        renderer.resize(width, height);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        error!("surface out of memory; exiting");
                        scene.destroy();
                        elwt.exit();
                    }
                    // Outdated and Timeout resolve on the next frame
                    Err(e) => warn!("frame skipped: {e:?}"),
                }
            }
            _ => {}
        },
        Event::AboutToWait => renderer.window().request_redraw(),
        _ => {}
    })?;
    Ok(())
}

/// Recompile every changed shader the renderer knows about.
fn reload_changed(renderer: &mut Renderer, paths: &[PathBuf]) {
    for path in paths {
        let Some(kind) = ShaderKind::from_path(path) else {
            debug!(path = %path.display(), "not a pipeline shader");
            continue;
        };
        match read_shader(path) {
            Ok(source) => {
                if let Err(e) = renderer.reload_shader(kind, &source) {
                    warn!("keeping previous {} pipeline: {e}", kind.file_name());
                }
            }
            Err(e) => warn!("{e:#}"),
        }
    }
}

fn read_shader(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading shader {}", path.display()))
}

/// Run `frames` ticks of 16 ms without a window, clicking the centre of the
/// virtual drawable every 120 frames.
///
/// # Errors
///
/// Physics initialisation failures.
pub fn run_headless(config: SceneConfig, frames: u64) -> Result<HeadlessSummary> {
    let animate = config.animate;
    let mut scene = Scene::initialize(
        config,
        Box::new(RapierEngine::new()),
        Box::new(TracingAudio::default()),
        HEADLESS_WIDTH,
        HEADLESS_HEIGHT,
    )?;
    info!(frames, "starting headless run");

    let centre = (HEADLESS_WIDTH as f32 * 0.5, HEADLESS_HEIGHT as f32 * 0.5);
    let mut frame = FrameContext::start(0.0);
    let mut bodies = 0;
    let mut progress = Progress::new();
    for i in 1..=frames {
        let now = i as f64 * HEADLESS_FRAME_MS;
        if i % HEADLESS_CLICK_EVERY == 0 {
            scene.click(centre.0, centre.1, now);
        }
        frame = frame.advance(now, animate);
        let Some(snapshot) = scene.tick(&frame) else {
            break;
        };
        bodies = snapshot.transforms.len();
        progress.frame(&scene, bodies);
    }
    scene.destroy();

    let stats = scene.stats();
    Ok(HeadlessSummary {
        frames: stats.ticks,
        clicks: stats.clicks,
        impact_sounds: stats.impact_sounds,
        muted_impacts: stats.muted_impacts,
        bodies,
    })
}
