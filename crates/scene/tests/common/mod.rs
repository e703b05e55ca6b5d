#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use scene::AudioEngine;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sound {
    Impact(f32),
    Click,
}

/// Audio sink that keeps every trigger; clones share the log.
#[derive(Debug, Clone, Default)]
pub struct RecordingAudio {
    pub sounds: Rc<RefCell<Vec<Sound>>>,
}

impl RecordingAudio {
    pub fn impacts(&self) -> usize {
        self.sounds.borrow().iter().filter(|s| matches!(s, Sound::Impact(_))).count()
    }

    pub fn clicks(&self) -> usize {
        self.sounds.borrow().iter().filter(|s| **s == Sound::Click).count()
    }
}

impl AudioEngine for RecordingAudio {
    fn play_impact_sound(&mut self, strength: f32) {
        self.sounds.borrow_mut().push(Sound::Impact(strength));
    }

    fn play_click_sound(&mut self) {
        self.sounds.borrow_mut().push(Sound::Click);
    }
}
