use std::sync::Arc;

use physics::mesh::TriangleMesh;
use tracing::{debug, info, warn};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::error::RenderError;
use crate::gpu_types::{instance_data, BlurUniform, EffectUniform, GeometryUniform, InstanceRaw};
use crate::passes::{Pass, ShaderKind, FRAME_PASSES};
use crate::pipeline::{self, Pipelines};
use crate::targets::{RenderTargets, HDR_FORMAT};
use crate::FrameInputs;

/// Tunables of the post-processing passes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSettings {
    /// Blur kernel half-width in pixels.
    pub blur_radius: f32,
    pub depth_falloff: f32,
    /// Scale of the shockwave distortion and glow.
    pub effect_strength: f32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            blur_radius: 4.0,
            depth_falloff: 60.0,
            effect_strength: 1.0,
        }
    }
}

struct MeshBuffers {
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
}

/// Bind groups referencing the render targets; rebuilt whenever they are.
struct TargetBindGroups {
    blur_horizontal: wgpu::BindGroup,
    blur_vertical: wgpu::BindGroup,
    composite: wgpu::BindGroup,
}

/// The GPU side of the scene: surface, pipelines, targets and buffers.
pub struct Renderer {
    pub window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    settings: RenderSettings,
    pipelines: Pipelines,
    targets: RenderTargets,
    mesh: MeshBuffers,
    instance_buffer: wgpu::Buffer,
    instance_capacity: usize,
    instance_count: u32,
    geometry_buffer: wgpu::Buffer,
    geometry_bind_group: wgpu::BindGroup,
    blur_buffers: [wgpu::Buffer; 2],
    effect_buffer: wgpu::Buffer,
    target_bind_groups: TargetBindGroups,
}

impl Renderer {
    /// Bring up the adapter, device, surface and every GPU resource.
    ///
    /// # Errors
    ///
    /// Fails when no adapter or device is available, or when the adapter
    /// cannot render to and read from floating-point colour targets.
    pub async fn new(window: Arc<Window>, settings: RenderSettings) -> Result<Self, RenderError> {
        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(Arc::clone(&window))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderError::NoAdapter)?;

        check_capabilities(&adapter)?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Renderer Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                },
                None,
            )
            .await?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface_caps
            .formats
            .iter()
            .copied()
            .find(wgpu::TextureFormat::is_srgb)
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| RenderError::MissingCapability("surface reports no formats".into()))?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            desired_maximum_frame_latency: 2,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let pipelines = Pipelines::new(&device, format);
        let targets = RenderTargets::new(&device, config.width, config.height);

        let tube = TriangleMesh::render_tube();
        let mesh = MeshBuffers {
            vertices: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Tube Vertex Buffer"),
                contents: bytemuck::cast_slice(&tube.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            }),
            indices: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Tube Index Buffer"),
                contents: bytemuck::cast_slice(&tube.indices),
                usage: wgpu::BufferUsages::INDEX,
            }),
            index_count: tube.indices.len() as u32,
        };

        let instance_capacity = 16;
        let instance_buffer = create_instance_buffer(&device, instance_capacity);

        let geometry_buffer = uniform_buffer(&device, "Geometry Uniform", std::mem::size_of::<GeometryUniform>());
        let geometry_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Geometry Bind Group"),
            layout: &pipelines.layouts.geometry,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: geometry_buffer.as_entire_binding(),
            }],
        });
        let blur_buffers = [
            uniform_buffer(&device, "Horizontal Blur Uniform", std::mem::size_of::<BlurUniform>()),
            uniform_buffer(&device, "Vertical Blur Uniform", std::mem::size_of::<BlurUniform>()),
        ];
        let effect_buffer = uniform_buffer(&device, "Effect Uniform", std::mem::size_of::<EffectUniform>());
        let target_bind_groups = create_target_bind_groups(&device, &pipelines, &targets, &blur_buffers, &effect_buffer);

        info!(
            adapter = ?adapter.get_info().name,
            ?format,
            width = config.width,
            height = config.height,
            "renderer initialized"
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            settings,
            pipelines,
            targets,
            mesh,
            instance_buffer,
            instance_capacity,
            instance_count: 0,
            geometry_buffer,
            geometry_bind_group,
            blur_buffers,
            effect_buffer,
            target_bind_groups,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    #[must_use]
    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Reconfigure the surface and reallocate every intermediate target.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        if self.targets.resize(&self.device, width, height) {
            self.target_bind_groups = create_target_bind_groups(
                &self.device,
                &self.pipelines,
                &self.targets,
                &self.blur_buffers,
                &self.effect_buffer,
            );
        }
        debug!(width, height, "renderer resized");
    }

    /// Draw one frame: geometry, horizontal blur, vertical blur, composite.
    ///
    /// # Errors
    ///
    /// Surface acquisition errors are returned for the caller to handle.
    pub fn render(&mut self, frame: &FrameInputs<'_>) -> Result<(), wgpu::SurfaceError> {
        self.upload(frame);

        let output = self.surface.get_current_texture()?;
        let surface_view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("Frame Encoder") });
        for pass in FRAME_PASSES {
            let view = self.targets.color_output(pass, &surface_view);
            match pass {
                Pass::Geometry => self.encode_geometry(&mut encoder),
                Pass::BlurHorizontal => self.encode_fullscreen(
                    &mut encoder,
                    pass,
                    view,
                    &self.pipelines.blur,
                    &self.target_bind_groups.blur_horizontal,
                ),
                Pass::BlurVertical => self.encode_fullscreen(
                    &mut encoder,
                    pass,
                    view,
                    &self.pipelines.blur,
                    &self.target_bind_groups.blur_vertical,
                ),
                Pass::ImpulseComposite => self.encode_fullscreen(
                    &mut encoder,
                    pass,
                    view,
                    &self.pipelines.composite,
                    &self.target_bind_groups.composite,
                ),
            }
        }
        self.queue.submit(Some(encoder.finish()));
        output.present();

        Ok(())
    }

    /// Recompile one shader program and swap its pipeline in.
    ///
    /// # Errors
    ///
    /// [`RenderError::ShaderCompile`] when the source does not validate; the
    /// previous pipeline stays active.
    pub fn reload_shader(&mut self, kind: ShaderKind, source: &str) -> Result<(), RenderError> {
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let shader = pipeline::create_shader(&self.device, kind, source);
        let rebuilt = self.pipelines.build_for(&self.device, kind, &shader);
        if let Some(err) = pollster::block_on(self.device.pop_error_scope()) {
            warn!(shader = kind.file_name(), "shader reload rejected");
            return Err(RenderError::ShaderCompile {
                label: kind.file_name().to_owned(),
                message: err.to_string(),
            });
        }
        self.pipelines.replace(kind, rebuilt);
        info!(shader = kind.file_name(), "shader reloaded");
        Ok(())
    }

    fn upload(&mut self, frame: &FrameInputs<'_>) {
        let instances = instance_data(frame.transforms);
        if instances.len() > self.instance_capacity {
            self.instance_capacity = instances.len().next_power_of_two();
            self.instance_buffer.destroy();
            self.instance_buffer = create_instance_buffer(&self.device, self.instance_capacity);
            debug!(capacity = self.instance_capacity, "instance buffer grown");
        }
        if !instances.is_empty() {
            self.queue
                .write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
        }
        self.instance_count = instances.len() as u32;

        let geometry = GeometryUniform::new(frame.camera, frame.frames, frame.time_ms);
        self.queue
            .write_buffer(&self.geometry_buffer, 0, bytemuck::cast_slice(&[geometry]));

        let RenderSettings { blur_radius, depth_falloff, effect_strength } = self.settings;
        self.queue.write_buffer(
            &self.blur_buffers[0],
            0,
            bytemuck::cast_slice(&[BlurUniform::horizontal(blur_radius, depth_falloff)]),
        );
        self.queue.write_buffer(
            &self.blur_buffers[1],
            0,
            bytemuck::cast_slice(&[BlurUniform::vertical(blur_radius, depth_falloff)]),
        );

        let (width, height) = self.targets.size();
        let effect = EffectUniform::new(&frame.impulses, width, height, frame.time_ms, effect_strength);
        self.queue
            .write_buffer(&self.effect_buffer, 0, bytemuck::cast_slice(&[effect]));
    }

    fn encode_geometry(&self, encoder: &mut wgpu::CommandEncoder) {
        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(Pass::Geometry.label()),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.targets.scene_color.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color { r: 0.02, g: 0.02, b: 0.03, a: 1.0 }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.targets.scene_depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        if self.instance_count == 0 {
            return;
        }
        rpass.set_pipeline(&self.pipelines.geometry);
        rpass.set_bind_group(0, &self.geometry_bind_group, &[]);
        rpass.set_vertex_buffer(0, self.mesh.vertices.slice(..));
        rpass.set_vertex_buffer(1, self.instance_buffer.slice(..));
        rpass.set_index_buffer(self.mesh.indices.slice(..), wgpu::IndexFormat::Uint32);
        rpass.draw_indexed(0..self.mesh.index_count, 0, 0..self.instance_count);
    }

    fn encode_fullscreen(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        pass: Pass,
        target: &wgpu::TextureView,
        pipeline: &wgpu::RenderPipeline,
        bind_group: &wgpu::BindGroup,
    ) {
        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(pass.label()),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        rpass.draw(0..3, 0..1);
    }
}

/// Fail fast when floating-point colour targets cannot be rendered to and
/// read back in a later pass.
fn check_capabilities(adapter: &wgpu::Adapter) -> Result<(), RenderError> {
    let features = adapter.get_texture_format_features(HDR_FORMAT);
    let needed = wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING;
    if features.allowed_usages.contains(needed) {
        Ok(())
    } else {
        Err(RenderError::MissingCapability(format!(
            "{HDR_FORMAT:?} render targets are not supported by this adapter"
        )))
    }
}

fn uniform_buffer(device: &wgpu::Device, label: &str, size: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: size as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_instance_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Instance Buffer"),
        size: (capacity.max(1) * std::mem::size_of::<InstanceRaw>()) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_target_bind_groups(
    device: &wgpu::Device,
    pipelines: &Pipelines,
    targets: &RenderTargets,
    blur_buffers: &[wgpu::Buffer; 2],
    effect_buffer: &wgpu::Buffer,
) -> TargetBindGroups {
    let blur = |label: &str, color: &wgpu::TextureView, params: &wgpu::Buffer| {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &pipelines.layouts.blur,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(color),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&targets.scene_depth.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: params.as_entire_binding(),
                },
            ],
        })
    };

    TargetBindGroups {
        blur_horizontal: blur("Horizontal Blur Bind Group", targets.color_input(Pass::BlurHorizontal), &blur_buffers[0]),
        blur_vertical: blur("Vertical Blur Bind Group", targets.color_input(Pass::BlurVertical), &blur_buffers[1]),
        composite: device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Composite Bind Group"),
            layout: &pipelines.layouts.composite,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(targets.color_input(Pass::ImpulseComposite)),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: effect_buffer.as_entire_binding(),
                },
            ],
        }),
    }
}
