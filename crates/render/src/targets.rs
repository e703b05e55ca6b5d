//! Off-screen render targets shared by the frame passes.

use tracing::debug;

use crate::passes::{Pass, Target};

/// Colour format of every intermediate target.
pub const HDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

pub struct RenderTarget {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl RenderTarget {
    fn new(device: &wgpu::Device, label: &str, format: wgpu::TextureFormat, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }
}

/// HDR scene colour and depth from the geometry pass, plus the two blur
/// intermediates. All share the surface's pixel size.
pub struct RenderTargets {
    width: u32,
    height: u32,
    pub scene_color: RenderTarget,
    pub scene_depth: RenderTarget,
    pub blur_a: RenderTarget,
    pub blur_b: RenderTarget,
}

impl RenderTargets {
    #[must_use]
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        debug!(width, height, "allocating render targets");
        Self {
            width,
            height,
            scene_color: RenderTarget::new(device, "scene colour", HDR_FORMAT, width, height),
            scene_depth: RenderTarget::new(device, "scene depth", DEPTH_FORMAT, width, height),
            blur_a: RenderTarget::new(device, "horizontal blur", HDR_FORMAT, width, height),
            blur_b: RenderTarget::new(device, "vertical blur", HDR_FORMAT, width, height),
        }
    }

    /// Reallocate every target at the new size. Returns whether anything changed.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) -> bool {
        if (width.max(1), height.max(1)) == (self.width, self.height) {
            return false;
        }
        *self = Self::new(device, width, height);
        true
    }

    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// View of an off-screen target; `None` for the swapchain surface.
    #[must_use]
    pub fn view(&self, target: Target) -> Option<&wgpu::TextureView> {
        match target {
            Target::SceneColor => Some(&self.scene_color.view),
            Target::SceneDepth => Some(&self.scene_depth.view),
            Target::BlurA => Some(&self.blur_a.view),
            Target::BlurB => Some(&self.blur_b.view),
            Target::Surface => None,
        }
    }

    /// Colour input of a full-screen `pass`: the first target it reads.
    #[must_use]
    pub fn color_input(&self, pass: Pass) -> &wgpu::TextureView {
        pass.reads()
            .first()
            .and_then(|&target| self.view(target))
            .unwrap_or(&self.scene_color.view)
    }

    /// Colour attachment of `pass`: its first write, or `surface` when that
    /// write is the swapchain.
    #[must_use]
    pub fn color_output<'a>(&'a self, pass: Pass, surface: &'a wgpu::TextureView) -> &'a wgpu::TextureView {
        pass.writes()
            .first()
            .and_then(|&target| self.view(target))
            .unwrap_or(surface)
    }
}
