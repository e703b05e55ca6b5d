//! Resize coalescing. A window drag produces a burst of resize events; the
//! renderer and scene only follow once the size has been stable for a while.

/// Quiet period before a pending size is applied.
pub const RESIZE_DEBOUNCE_MS: f64 = 300.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeDebounce {
    delay_ms: f64,
    pending: Option<(u32, u32, f64)>,
}

impl Default for ResizeDebounce {
    fn default() -> Self {
        Self::new(RESIZE_DEBOUNCE_MS)
    }
}

impl ResizeDebounce {
    #[must_use]
    pub fn new(delay_ms: f64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    /// Remember the latest size and restart the quiet period. A zero-sized
    /// drawable (minimised window) is ignored and keeps the previous size.
    pub fn request(&mut self, width: u32, height: u32, now_ms: f64) {
        if width == 0 || height == 0 {
            return;
        }
        self.pending = Some((width, height, now_ms + self.delay_ms));
    }

    /// The pending size, once its quiet period is over.
    pub fn take_ready(&mut self, now_ms: f64) -> Option<(u32, u32)> {
        match self.pending {
            Some((width, height, due)) if now_ms >= due => {
                self.pending = None;
                Some((width, height))
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
