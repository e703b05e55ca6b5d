//! # Impulse Effect Ring Buffer
//!
//! Fixed-capacity log of the most recent clicks, read by the composite pass
//! to draw a decaying ring around each one. Slots are never removed; a new
//! click overwrites the oldest slot. Unused slots hold an off-screen position
//! so they never paint anything.

use glam::Vec2;

/// Number of effect slots, matched by `impulse.wgsl`.
pub const IMPULSE_SLOTS: usize = 5;
/// Screen position of a slot that has never been written.
pub const INERT_POSITION: Vec2 = Vec2::new(-10.0, -10.0);
pub const DEFAULT_EFFECT_DURATION_MS: f64 = 1500.0;

/// One recorded click.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpulseRecord {
    /// Screen position in `[0, 1]`, origin top-left.
    pub screen: Vec2,
    pub start_ms: f64,
}

impl ImpulseRecord {
    /// Off-canvas and already fully decayed.
    pub const INERT: Self = Self {
        screen: INERT_POSITION,
        start_ms: f64::NEG_INFINITY,
    };
}

/// A slot as seen by the composite pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpulseSlot {
    pub x: f32,
    pub y: f32,
    /// 0 right after the click, 1 once the effect has fully decayed.
    pub age: f32,
}

impl ImpulseSlot {
    /// `(x, y, age, reserved)` as uploaded to the GPU.
    #[must_use]
    pub fn to_vec4(self) -> [f32; 4] {
        [self.x, self.y, self.age, 0.0]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImpulseRing {
    records: [ImpulseRecord; IMPULSE_SLOTS],
    pointer: usize,
    duration_ms: f64,
}

impl Default for ImpulseRing {
    fn default() -> Self {
        Self::new(DEFAULT_EFFECT_DURATION_MS)
    }
}

impl ImpulseRing {
    #[must_use]
    pub fn new(duration_ms: f64) -> Self {
        Self {
            records: [ImpulseRecord::INERT; IMPULSE_SLOTS],
            pointer: 0,
            duration_ms,
        }
    }

    /// Overwrite the slot under the pointer and advance it. Returns the slot written.
    pub fn record(&mut self, screen: Vec2, time_ms: f64) -> usize {
        let slot = self.pointer;
        self.records[slot] = ImpulseRecord {
            screen,
            start_ms: time_ms,
        };
        self.pointer = (self.pointer + 1) % IMPULSE_SLOTS;
        slot
    }

    /// Every slot with its normalized age at `now_ms`.
    #[must_use]
    pub fn snapshot(&self, now_ms: f64) -> [ImpulseSlot; IMPULSE_SLOTS] {
        self.records.map(|record| ImpulseSlot {
            x: record.screen.x,
            y: record.screen.y,
            age: self.age(record.start_ms, now_ms),
        })
    }

    #[must_use]
    pub fn records(&self) -> &[ImpulseRecord; IMPULSE_SLOTS] {
        &self.records
    }

    /// Slot the next [`record`](Self::record) will overwrite.
    #[must_use]
    pub fn pointer(&self) -> usize {
        self.pointer
    }

    #[must_use]
    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    fn age(&self, start_ms: f64, now_ms: f64) -> f32 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        ((now_ms - start_ms) / self.duration_ms).clamp(0.0, 1.0) as f32
    }
}
