//! Scene configuration.
//!
//! Every field has a reference default, so a JSON file only needs the
//! values it changes.

use std::path::Path;

use glam::Vec3;
use physics::{ArenaLayout, CollisionConfig, WorldParams};
use render::{Camera, RenderSettings};
use serde::{Deserialize, Serialize};

use crate::error::SceneError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Height of the camera above the floor.
    pub distance: f32,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            distance: 20.0,
            fov_degrees: 45.0,
            near: 1.0,
            far: 50.0,
        }
    }
}

impl CameraConfig {
    #[must_use]
    pub fn camera(&self) -> Camera {
        Camera::top_down(self.distance, self.fov_degrees.to_radians(), self.near, self.far)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub body_count: usize,
    pub seed: u64,
    pub gravity: [f32; 3],
    pub body_mass: f32,
    /// Minimum tube speed for an audible front plane impact.
    pub min_impact_speed: f32,
    pub debounce_ms: f64,
    /// How long collision sounds stay muted after a click.
    pub click_mute_ms: f64,
    pub effect_duration_ms: f64,
    pub effect_strength: f32,
    pub blur_radius: f32,
    pub depth_falloff: f32,
    /// Advance the animation frame counter.
    pub animate: bool,
    pub camera: CameraConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        let collision = CollisionConfig::default();
        let render = RenderSettings::default();
        Self {
            body_count: 24,
            seed: 0x7ab5,
            gravity: [0.0, -9.0, 0.0],
            body_mass: 0.1,
            min_impact_speed: collision.min_impact_speed,
            debounce_ms: collision.debounce_ms,
            click_mute_ms: 50.0,
            effect_duration_ms: render::impulse_ring::DEFAULT_EFFECT_DURATION_MS,
            effect_strength: render.effect_strength,
            blur_radius: render.blur_radius,
            depth_falloff: render.depth_falloff,
            animate: true,
            camera: CameraConfig::default(),
        }
    }
}

impl SceneConfig {
    /// # Errors
    ///
    /// Returns [`SceneError::Config`] for malformed JSON or mistyped fields.
    pub fn from_json_str(json: &str) -> Result<Self, SceneError> {
        Ok(serde_json::from_str(json)?)
    }

    /// # Errors
    ///
    /// Fails when the file cannot be read or does not parse.
    pub fn from_json_file(path: &Path) -> Result<Self, SceneError> {
        let json = std::fs::read_to_string(path).map_err(|source| SceneError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Arena and body scale for a drawable of `width` x `height` pixels.
    /// The effective configuration as pretty JSON, loadable with
    /// [`from_json_str`](Self::from_json_str).
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::Config`] if serialisation fails.
    pub fn to_json_pretty(&self) -> Result<String, SceneError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    #[must_use]
    pub fn layout(&self, width: u32, height: u32) -> ArenaLayout {
        let aspect = width.max(1) as f32 / height.max(1) as f32;
        ArenaLayout::from_camera(self.camera.distance, self.camera.fov_degrees.to_radians(), aspect)
    }

    #[must_use]
    pub fn world_params(&self, layout: &ArenaLayout) -> WorldParams {
        WorldParams::new(
            self.body_count,
            layout.scale_factor,
            layout.bounds.bound_x,
            layout.bounds.bound_y,
        )
        .with_height(layout.bounds.height)
        .with_seed(self.seed)
        .with_gravity(Vec3::from_array(self.gravity))
        .with_mass(self.body_mass)
        .with_collision(CollisionConfig {
            min_impact_speed: self.min_impact_speed,
            debounce_ms: self.debounce_ms,
        })
    }

    #[must_use]
    pub fn render_settings(&self) -> RenderSettings {
        RenderSettings {
            blur_radius: self.blur_radius,
            depth_falloff: self.depth_falloff,
            effect_strength: self.effect_strength,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = SceneConfig::from_json_str(r#"{ "body_count": 3, "camera": { "distance": 30.0 } }"#).unwrap();
        assert_eq!(config.body_count, 3);
        assert_eq!(config.camera.distance, 30.0);
        assert_eq!(config.camera.fov_degrees, 45.0);
        assert_eq!(config.debounce_ms, 200.0);
        assert_eq!(config.min_impact_speed, 4.0);
    }

    #[test]
    fn dumped_config_loads_back_unchanged() {
        let mut config = SceneConfig::default();
        config.body_count = 9;
        config.camera.near = 2.5;
        let json = config.to_json_pretty().unwrap();
        assert!(json.contains("\"body_count\": 9"));
        assert_eq!(SceneConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = SceneConfig::from_json_str(r#"{ "body_count": "many" }"#).unwrap_err();
        assert!(matches!(err, SceneError::Config(_)));
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = SceneConfig::from_json_file(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }

    #[test]
    fn world_params_follow_the_layout() {
        let config = SceneConfig::default();
        let layout = config.layout(1600, 800);
        let params = config.world_params(&layout);
        assert!((params.bound_x - 2.0 * params.bound_y).abs() < 1e-4);
        assert_eq!(params.scale_factor, layout.scale_factor);
        assert_eq!(params.height, config.camera.distance * 0.5);
        assert_eq!(params.collision.debounce_ms, 200.0);
    }
}
