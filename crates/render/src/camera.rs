//! Top-down camera and the screen/world conversions built on it.
//!
//! The camera hovers above the arena on the +Y axis and looks straight down
//! at the floor. Screen up maps to world -Z.

use glam::{Mat4, Vec2, Vec3};

/// Perspective camera parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Camera position
    pub eye: Vec3,
    /// Point the camera is looking at
    pub target: Vec3,
    /// Up vector
    pub up: Vec3,
    /// Vertical field of view in radians
    pub fovy: f32,
    /// Near clipping plane distance
    pub znear: f32,
    /// Far clipping plane distance
    pub zfar: f32,
}

impl Camera {
    /// Camera `distance` units above the arena origin, looking down.
    #[must_use]
    pub fn top_down(distance: f32, fovy: f32, znear: f32, zfar: f32) -> Self {
        Self {
            eye: Vec3::new(0.0, distance, 0.0),
            target: Vec3::ZERO,
            up: Vec3::NEG_Z,
            fovy,
            znear,
            zfar,
        }
    }

    /// Distance from the eye to the target.
    #[must_use]
    pub fn distance(&self) -> f32 {
        (self.eye - self.target).length()
    }

    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    #[must_use]
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fovy, aspect, self.znear, self.zfar)
    }
}

/// Camera plus the matrices derived from it for the current drawable size.
///
/// Recomputed on resize; read-only while a click is being resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraState {
    pub camera: Camera,
    width: u32,
    height: u32,
    view: Mat4,
    projection: Mat4,
    inverse_projection: Mat4,
    inverse_view_projection: Mat4,
}

impl CameraState {
    #[must_use]
    pub fn new(camera: Camera, width: u32, height: u32) -> Self {
        let mut state = Self {
            camera,
            width: 1,
            height: 1,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            inverse_projection: Mat4::IDENTITY,
            inverse_view_projection: Mat4::IDENTITY,
        };
        state.resize(width, height);
        state
    }

    /// Recompute view and projection for a new drawable size. Zero sizes are
    /// treated as one pixel.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
        self.view = self.camera.view_matrix();
        self.projection = self.camera.projection_matrix(self.aspect());
        self.inverse_projection = self.projection.inverse();
        self.inverse_view_projection = (self.projection * self.view).inverse();
    }

    #[must_use]
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[must_use]
    pub fn eye(&self) -> Vec3 {
        self.camera.eye
    }

    #[must_use]
    pub fn view(&self) -> Mat4 {
        self.view
    }

    #[must_use]
    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    #[must_use]
    pub fn inverse_projection(&self) -> Mat4 {
        self.inverse_projection
    }

    #[must_use]
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    /// World-space point on the far clip plane under `ndc`.
    #[must_use]
    pub fn unproject_far(&self, ndc: Vec2) -> Vec3 {
        self.inverse_view_projection.project_point3(ndc.extend(1.0))
    }

    /// Ray from the eye through `ndc`, as `(origin, unit direction)`.
    #[must_use]
    pub fn click_ray(&self, ndc: Vec2) -> (Vec3, Vec3) {
        let origin = self.eye();
        let direction = (self.unproject_far(ndc) - origin).normalize_or_zero();
        (origin, direction)
    }

    #[must_use]
    pub fn client_to_ndc(&self, x: f32, y: f32) -> Vec2 {
        client_to_ndc(x, y, self.width, self.height)
    }

    #[must_use]
    pub fn client_to_screen(&self, x: f32, y: f32) -> Vec2 {
        client_to_screen(x, y, self.width, self.height)
    }
}

/// Client pixel coordinates (origin top-left) to normalized device
/// coordinates (origin centre, +Y up).
#[must_use]
pub fn client_to_ndc(x: f32, y: f32, width: u32, height: u32) -> Vec2 {
    let w = width.max(1) as f32;
    let h = height.max(1) as f32;
    Vec2::new(2.0 * x / w - 1.0, 1.0 - 2.0 * y / h)
}

/// Client pixel coordinates to `[0, 1]` screen coordinates, origin top-left.
#[must_use]
pub fn client_to_screen(x: f32, y: f32, width: u32, height: u32) -> Vec2 {
    let w = width.max(1) as f32;
    let h = height.max(1) as f32;
    Vec2::new(x / w, y / h)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> CameraState {
        CameraState::new(Camera::top_down(20.0, 45f32.to_radians(), 10.0, 50.0), 800, 600)
    }

    #[test]
    fn centre_click_looks_straight_down() {
        let (origin, dir) = state().click_ray(Vec2::ZERO);
        assert_eq!(origin, Vec3::new(0.0, 20.0, 0.0));
        assert!((dir - Vec3::NEG_Y).length() < 1e-5, "{dir:?}");
    }

    #[test]
    fn screen_up_is_world_minus_z() {
        let (_, dir) = state().click_ray(Vec2::new(0.0, 0.5));
        assert!(dir.z < 0.0);
        let (_, dir) = state().click_ray(Vec2::new(0.5, 0.0));
        assert!(dir.x > 0.0);
    }

    #[test]
    fn far_point_lies_on_far_plane() {
        let s = state();
        let p = s.unproject_far(Vec2::ZERO);
        assert!((p.y - (20.0 - 50.0)).abs() < 1e-2, "{p:?}");
    }

    #[test]
    fn client_conversions() {
        assert_eq!(client_to_ndc(400.0, 300.0, 800, 600), Vec2::ZERO);
        assert_eq!(client_to_ndc(0.0, 0.0, 800, 600), Vec2::new(-1.0, 1.0));
        assert_eq!(client_to_screen(800.0, 600.0, 800, 600), Vec2::ONE);
        assert_eq!(client_to_screen(200.0, 150.0, 800, 600), Vec2::new(0.25, 0.25));
    }

    #[test]
    fn resize_updates_aspect_and_projection() {
        let mut s = state();
        let before = s.projection();
        s.resize(1200, 600);
        assert!((s.aspect() - 2.0).abs() < 1e-6);
        assert_ne!(before, s.projection());
        assert!((s.projection() * s.inverse_projection()).abs_diff_eq(Mat4::IDENTITY, 1e-4));
    }
}
