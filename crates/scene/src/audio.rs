//! Sound hooks.
//!
//! Playback itself lives outside the workspace; the scene only decides when a
//! sound fires and how loud it is.

use tracing::info;

/// Impact strengths above this are played at full volume.
const MAX_IMPACT_STRENGTH: f32 = 25.0;

pub trait AudioEngine {
    /// A tube hit the front plane at `strength` units per second.
    fn play_impact_sound(&mut self, strength: f32);
    fn play_click_sound(&mut self);
}

/// Volume in decibels for an impact: `min(strength, 25) - 25`, so 0 dB at
/// full strength and quieter below.
#[must_use]
pub fn impact_volume_db(strength: f32) -> f32 {
    strength.min(MAX_IMPACT_STRENGTH) - MAX_IMPACT_STRENGTH
}

/// Audio sink that only logs; used headless and when no device is wired up.
#[derive(Debug, Default)]
pub struct TracingAudio {
    pub impacts: usize,
    pub clicks: usize,
}

impl AudioEngine for TracingAudio {
    fn play_impact_sound(&mut self, strength: f32) {
        self.impacts += 1;
        info!(strength, volume_db = impact_volume_db(strength), "impact sound");
    }

    fn play_click_sound(&mut self) {
        self.clicks += 1;
        info!("click sound");
    }
}

/// Suppresses impact sounds for a short window after a click, so the click
/// is not drowned out by the collisions it causes.
#[derive(Debug, Clone, Copy)]
pub struct ClickMute {
    window_ms: f64,
    muted_until: Option<f64>,
}

impl ClickMute {
    #[must_use]
    pub fn new(window_ms: f64) -> Self {
        Self {
            window_ms,
            muted_until: None,
        }
    }

    pub fn on_click(&mut self, now_ms: f64) {
        self.muted_until = Some(now_ms + self.window_ms);
    }

    #[must_use]
    pub fn allows(&self, now_ms: f64) -> bool {
        match self.muted_until {
            Some(until) => now_ms >= until,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volume_saturates_at_zero_db() {
        assert_eq!(impact_volume_db(25.0), 0.0);
        assert_eq!(impact_volume_db(100.0), 0.0);
        assert_eq!(impact_volume_db(5.0), -20.0);
    }

    #[test]
    fn mute_window_after_click() {
        let mut mute = ClickMute::new(50.0);
        assert!(mute.allows(0.0));
        mute.on_click(100.0);
        assert!(!mute.allows(120.0));
        assert!(mute.allows(150.0));
    }
}
