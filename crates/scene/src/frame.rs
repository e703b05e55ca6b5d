//! Per-tick timing: clamped frame delta and the animation frame counter.

use physics::MAX_STEP_MS;

/// Frame time reference unit; one animation frame per 16 ms.
const FRAME_UNIT_MS: f64 = 16.0;

/// Timing state carried from one animation frame to the next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameContext {
    /// Timestamp of the current frame.
    pub time_ms: f64,
    /// Clamped time since the previous frame.
    pub delta_ms: f64,
    /// Animation counter, advanced by `delta / 16` while animating.
    pub frames: f32,
}

impl FrameContext {
    #[must_use]
    pub fn start(time_ms: f64) -> Self {
        Self {
            time_ms,
            delta_ms: 0.0,
            frames: 0.0,
        }
    }

    /// Move to the frame at `now_ms`. A clock that jumps backwards yields a
    /// zero delta; a long stall yields at most [`MAX_STEP_MS`].
    #[must_use]
    pub fn advance(self, now_ms: f64, animate: bool) -> Self {
        let raw = now_ms - self.time_ms;
        let delta_ms = if raw.is_nan() { 0.0 } else { raw.clamp(0.0, MAX_STEP_MS) };
        let frames = if animate {
            self.frames + (delta_ms / FRAME_UNIT_MS) as f32
        } else {
            self.frames
        };
        Self {
            time_ms: now_ms,
            delta_ms,
            frames,
        }
    }
}
