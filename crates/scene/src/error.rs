use std::path::PathBuf;

use physics::PhysicsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SceneError {
    #[error(transparent)]
    Physics(#[from] PhysicsError),
    #[error("invalid scene configuration: {0}")]
    Config(#[from] serde_json::Error),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
