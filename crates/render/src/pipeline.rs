//! Render pipeline creation and management
//!
//! Bind-group layouts and pipelines for the three shader programs. All
//! texture reads go through `textureLoad`, so no samplers are bound.

use crate::gpu_types::{vertex_layout, InstanceRaw};
use crate::passes::ShaderKind;
use crate::targets::{DEPTH_FORMAT, HDR_FORMAT};

fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn texture_entry(binding: u32, sample_type: wgpu::TextureSampleType) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type,
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

/// Bind-group layouts for every pass.
pub struct Layouts {
    /// Camera/animation uniform
    pub geometry: wgpu::BindGroupLayout,
    /// Colour input, scene depth, blur parameters
    pub blur: wgpu::BindGroupLayout,
    /// Blurred scene, effect uniform
    pub composite: wgpu::BindGroupLayout,
}

impl Layouts {
    #[must_use]
    pub fn new(device: &wgpu::Device) -> Self {
        let color = wgpu::TextureSampleType::Float { filterable: false };
        Self {
            geometry: device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Geometry Bind Group Layout"),
                entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT)],
            }),
            blur: device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Blur Bind Group Layout"),
                entries: &[
                    texture_entry(0, color),
                    texture_entry(1, wgpu::TextureSampleType::Depth),
                    uniform_entry(2, wgpu::ShaderStages::FRAGMENT),
                ],
            }),
            composite: device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Composite Bind Group Layout"),
                entries: &[texture_entry(0, color), uniform_entry(1, wgpu::ShaderStages::FRAGMENT)],
            }),
        }
    }
}

/// Compile a WGSL module. Errors surface through the device's error scopes.
pub fn create_shader(device: &wgpu::Device, kind: ShaderKind, source: &str) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(kind.file_name()),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    })
}

/// Instanced tube pipeline writing HDR colour and depth.
pub fn create_geometry_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    shader: &wgpu::ShaderModule,
) -> wgpu::RenderPipeline {
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Geometry Pipeline Layout"),
        bind_group_layouts: &[layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Geometry Pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: "vs_main",
            buffers: &[vertex_layout(), InstanceRaw::layout()],
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: "fs_main",
            targets: &[Some(wgpu::ColorTargetState {
                format: HDR_FORMAT,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
    })
}

/// Fullscreen-triangle pipeline; the vertex shader builds positions from
/// `vertex_index`, so no vertex buffers are bound.
pub fn create_fullscreen_pipeline(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::BindGroupLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: &[layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: "vs_fullscreen",
            buffers: &[],
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: "fs_main",
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
    })
}

/// The three pipelines of a frame.
pub struct Pipelines {
    pub layouts: Layouts,
    pub geometry: wgpu::RenderPipeline,
    pub blur: wgpu::RenderPipeline,
    pub composite: wgpu::RenderPipeline,
    surface_format: wgpu::TextureFormat,
}

impl Pipelines {
    /// Build every pipeline from the embedded shader sources.
    #[must_use]
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        let layouts = Layouts::new(device);
        let build = |kind: ShaderKind| {
            let shader = create_shader(device, kind, kind.embedded_source());
            Self::build(device, &layouts, kind, &shader, surface_format)
        };
        let geometry = build(ShaderKind::Tube);
        let blur = build(ShaderKind::Blur);
        let composite = build(ShaderKind::Impulse);
        Self {
            layouts,
            geometry,
            blur,
            composite,
            surface_format,
        }
    }

    /// Pipeline for `kind` built from an already compiled module.
    #[must_use]
    pub fn build_for(&self, device: &wgpu::Device, kind: ShaderKind, shader: &wgpu::ShaderModule) -> wgpu::RenderPipeline {
        Self::build(device, &self.layouts, kind, shader, self.surface_format)
    }

    pub fn replace(&mut self, kind: ShaderKind, pipeline: wgpu::RenderPipeline) {
        match kind {
            ShaderKind::Tube => self.geometry = pipeline,
            ShaderKind::Blur => self.blur = pipeline,
            ShaderKind::Impulse => self.composite = pipeline,
        }
    }

    fn build(
        device: &wgpu::Device,
        layouts: &Layouts,
        kind: ShaderKind,
        shader: &wgpu::ShaderModule,
        surface_format: wgpu::TextureFormat,
    ) -> wgpu::RenderPipeline {
        match kind {
            ShaderKind::Tube => create_geometry_pipeline(device, &layouts.geometry, shader),
            ShaderKind::Blur => create_fullscreen_pipeline(device, "Blur Pipeline", &layouts.blur, shader, HDR_FORMAT),
            ShaderKind::Impulse => {
                create_fullscreen_pipeline(device, "Composite Pipeline", &layouts.composite, shader, surface_format)
            }
        }
    }
}
