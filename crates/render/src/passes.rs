//! Frame pass ordering.
//!
//! Each frame runs the same four passes. Their render-target reads and
//! writes are declared here: the renderer binds a full-screen pass's first
//! read as its colour input and uses its first write as the attachment, and
//! the order can be checked without a GPU.

use std::path::Path;

/// Render targets a pass may read or write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    SceneColor,
    SceneDepth,
    BlurA,
    BlurB,
    Surface,
}

/// Shader programs, one per WGSL file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderKind {
    Tube,
    Blur,
    Impulse,
}

impl ShaderKind {
    pub const ALL: [Self; 3] = [Self::Tube, Self::Blur, Self::Impulse];

    #[must_use]
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Tube => "tube.wgsl",
            Self::Blur => "blur.wgsl",
            Self::Impulse => "impulse.wgsl",
        }
    }

    /// Source compiled into the binary.
    #[must_use]
    pub fn embedded_source(self) -> &'static str {
        match self {
            Self::Tube => include_str!("shaders/tube.wgsl"),
            Self::Blur => include_str!("shaders/blur.wgsl"),
            Self::Impulse => include_str!("shaders/impulse.wgsl"),
        }
    }

    /// The shader a changed file on disk corresponds to, if any.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        Self::ALL.into_iter().find(|kind| kind.file_name() == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pass {
    Geometry,
    BlurHorizontal,
    BlurVertical,
    ImpulseComposite,
}

/// Execution order of a frame.
pub const FRAME_PASSES: [Pass; 4] = [
    Pass::Geometry,
    Pass::BlurHorizontal,
    Pass::BlurVertical,
    Pass::ImpulseComposite,
];

impl Pass {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Geometry => "geometry pass",
            Self::BlurHorizontal => "horizontal blur pass",
            Self::BlurVertical => "vertical blur pass",
            Self::ImpulseComposite => "impulse composite pass",
        }
    }

    #[must_use]
    pub fn shader(self) -> ShaderKind {
        match self {
            Self::Geometry => ShaderKind::Tube,
            Self::BlurHorizontal | Self::BlurVertical => ShaderKind::Blur,
            Self::ImpulseComposite => ShaderKind::Impulse,
        }
    }

    #[must_use]
    pub fn reads(self) -> &'static [Target] {
        match self {
            Self::Geometry => &[],
            Self::BlurHorizontal => &[Target::SceneColor, Target::SceneDepth],
            Self::BlurVertical => &[Target::BlurA, Target::SceneDepth],
            Self::ImpulseComposite => &[Target::BlurB],
        }
    }

    #[must_use]
    pub fn writes(self) -> &'static [Target] {
        match self {
            Self::Geometry => &[Target::SceneColor, Target::SceneDepth],
            Self::BlurHorizontal => &[Target::BlurA],
            Self::BlurVertical => &[Target::BlurB],
            Self::ImpulseComposite => &[Target::Surface],
        }
    }
}
