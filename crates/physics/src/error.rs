use thiserror::Error;

use crate::engine::BodyHandle;

/// Errors surfaced by the physics layer.
///
/// Initialization failures are fatal for the caller; nothing in this crate
/// retries them.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PhysicsError {
    #[error("physics engine failed to initialize: {0}")]
    EngineInit(String),
    #[error("collision shape could not be built: {0}")]
    InvalidShape(&'static str),
    #[error("unknown body handle {0:?}")]
    UnknownBody(BodyHandle),
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),
}
