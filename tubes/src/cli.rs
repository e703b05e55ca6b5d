use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use scene::SceneConfig;

#[derive(Debug, Parser)]
#[command(name = "tubes", version, about = "Floating tubes arena")]
pub struct Cli {
    /// Run without a window for `--frames` ticks.
    #[arg(long)]
    pub headless: bool,

    /// Ticks to simulate in headless mode.
    #[arg(long, default_value_t = 600)]
    pub frames: u64,

    /// Number of tubes; overrides the config file.
    #[arg(long)]
    pub bodies: Option<usize>,

    /// Spawn seed; overrides the config file.
    #[arg(long)]
    pub seed: Option<u64>,

    /// JSON scene configuration.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory watched for WGSL changes.
    #[arg(long, default_value = "crates/render/src/shaders")]
    pub shader_dir: PathBuf,

    /// Disable shader hot reloading.
    #[arg(long)]
    pub no_watch: bool,

    /// Freeze the animation frame counter.
    #[arg(long)]
    pub no_animate: bool,

    /// Print the effective scene configuration as JSON and exit.
    #[arg(long)]
    pub print_config: bool,
}

impl Cli {
    /// The config file (or defaults) with command line overrides applied.
    pub fn scene_config(&self) -> Result<SceneConfig> {
        let mut config = match &self.config {
            Some(path) => SceneConfig::from_json_file(path)
                .with_context(|| format!("loading scene config {}", path.display()))?,
            None => SceneConfig::default(),
        };
        if let Some(bodies) = self.bodies {
            config.body_count = bodies;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if self.no_animate {
            config.animate = false;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from(["tubes", "--headless", "--bodies", "7", "--seed", "3", "--no-animate"]).unwrap();
        assert!(cli.headless);
        assert_eq!(cli.frames, 600);
        let config = cli.scene_config().unwrap();
        assert_eq!(config.body_count, 7);
        assert_eq!(config.seed, 3);
        assert!(!config.animate);
        assert_eq!(config.debounce_ms, 200.0);
    }

    #[test]
    fn printed_config_carries_the_overrides() {
        let cli = Cli::try_parse_from(["tubes", "--print-config", "--bodies", "11"]).unwrap();
        assert!(cli.print_config);
        let json = cli.scene_config().unwrap().to_json_pretty().unwrap();
        assert_eq!(SceneConfig::from_json_str(&json).unwrap().body_count, 11);
    }

    #[test]
    fn missing_config_file_is_reported() {
        let cli = Cli::try_parse_from(["tubes", "--config", "/no/such/scene.json"]).unwrap();
        let err = cli.scene_config().unwrap_err();
        assert!(format!("{err:#}").contains("/no/such/scene.json"));
    }
}
