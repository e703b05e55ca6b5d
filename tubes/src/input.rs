//! Pointer tracking for the windowed loop.

/// Last known cursor position in client pixels. Unknown until the first
/// cursor move and again after the cursor leaves the window.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pointer {
    position: Option<(f32, f32)>,
}

impl Pointer {
    pub fn moved(&mut self, x: f64, y: f64) {
        self.position = Some((x as f32, y as f32));
    }

    pub fn left(&mut self) {
        self.position = None;
    }

    /// Where a click lands; `None` while the position is unknown.
    #[must_use]
    pub fn click_position(&self) -> Option<(f32, f32)> {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clicks_wait_for_a_known_position() {
        let mut pointer = Pointer::default();
        assert_eq!(pointer.click_position(), None);

        pointer.moved(120.5, 48.0);
        assert_eq!(pointer.click_position(), Some((120.5, 48.0)));

        pointer.left();
        assert_eq!(pointer.click_position(), None);
    }
}
