use thiserror::Error;

/// Failures while bringing up or driving the GPU side.
///
/// Everything except [`RenderError::ShaderCompile`] is fatal at start-up;
/// a failed shader reload leaves the previous pipeline in place.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("required graphics capability missing: {0}")]
    MissingCapability(String),
    #[error("no suitable graphics adapter found")]
    NoAdapter,
    #[error("failed to request device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("shader `{label}` failed to compile: {message}")]
    ShaderCompile { label: String, message: String },
}
