//! GPU-compatible type definitions for rendering
//!
//! Every struct here is uploaded verbatim, so each is `Pod`, `#[repr(C)]`
//! and laid out to match the WGSL declarations in `shaders/`.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use physics::mesh::MeshVertex;
use physics::transform;

use crate::camera::CameraState;
use crate::impulse_ring::{ImpulseSlot, IMPULSE_SLOTS};

/// Vertex buffer layout of [`MeshVertex`] (locations 0 and 1).
#[must_use]
pub fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &ATTRIBUTES,
    }
}

/// Per-instance data: the body's world matrix and its inverse-transpose.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct InstanceRaw {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
}

impl InstanceRaw {
    #[must_use]
    pub fn from_world(world: Mat4) -> Self {
        Self {
            model: world.to_cols_array_2d(),
            normal: transform::normal_matrix(world).to_cols_array_2d(),
        }
    }

    /// Instance buffer layout (locations 2..=9, one vec4 per matrix column).
    #[must_use]
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 8] = wgpu::vertex_attr_array![
            2 => Float32x4, 3 => Float32x4, 4 => Float32x4, 5 => Float32x4,
            6 => Float32x4, 7 => Float32x4, 8 => Float32x4, 9 => Float32x4,
        ];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &ATTRIBUTES,
        }
    }
}

/// Instance records for a frame's body transforms, in body-index order.
#[must_use]
pub fn instance_data(transforms: &[Mat4]) -> Vec<InstanceRaw> {
    transforms.iter().copied().map(InstanceRaw::from_world).collect()
}

/// Camera and animation uniforms of the geometry pass.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct GeometryUniform {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    /// xyz = eye position
    pub camera_position: [f32; 4],
    /// x = animation frames, y = elapsed seconds
    pub params: [f32; 4],
}

impl GeometryUniform {
    #[must_use]
    pub fn new(camera: &CameraState, frames: f32, time_ms: f64) -> Self {
        Self {
            view: camera.view().to_cols_array_2d(),
            projection: camera.projection().to_cols_array_2d(),
            camera_position: camera.eye().extend(1.0).to_array(),
            params: [frames, (time_ms / 1000.0) as f32, 0.0, 0.0],
        }
    }
}

/// One direction of the separable depth-aware blur.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct BlurUniform {
    /// Texel step, (1, 0) or (0, 1).
    pub direction: [f32; 2],
    /// Kernel half-width in texels.
    pub radius: f32,
    /// How quickly depth differences suppress a sample.
    pub depth_falloff: f32,
}

impl BlurUniform {
    #[must_use]
    pub fn horizontal(radius: f32, depth_falloff: f32) -> Self {
        Self { direction: [1.0, 0.0], radius, depth_falloff }
    }

    #[must_use]
    pub fn vertical(radius: f32, depth_falloff: f32) -> Self {
        Self { direction: [0.0, 1.0], radius, depth_falloff }
    }
}

/// Impulse composite uniforms: the ring snapshot plus frame data.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct EffectUniform {
    pub slots: [[f32; 4]; IMPULSE_SLOTS],
    pub resolution: [f32; 2],
    pub time: f32,
    pub strength: f32,
}

impl EffectUniform {
    #[must_use]
    pub fn new(slots: &[ImpulseSlot; IMPULSE_SLOTS], width: u32, height: u32, time_ms: f64, strength: f32) -> Self {
        Self {
            slots: (*slots).map(ImpulseSlot::to_vec4),
            resolution: [width as f32, height as f32],
            time: (time_ms / 1000.0) as f32,
            strength,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};

    #[test]
    fn uniform_sizes_match_wgsl() {
        assert_eq!(std::mem::size_of::<GeometryUniform>(), 160);
        assert_eq!(std::mem::size_of::<BlurUniform>(), 16);
        assert_eq!(std::mem::size_of::<EffectUniform>(), 96);
        assert_eq!(std::mem::size_of::<InstanceRaw>(), 128);
    }

    #[test]
    fn instances_keep_body_order() {
        let a = Mat4::from_translation(Vec3::X);
        let b = transform::body_matrix(Vec3::new(0.0, 3.0, 0.0), Quat::from_rotation_x(0.4), 2.0);
        let data = instance_data(&[a, b]);
        assert_eq!(data.len(), 2);
        assert_eq!(data[0].model, a.to_cols_array_2d());
        assert_eq!(data[1].model, b.to_cols_array_2d());
        assert_eq!(data[1].normal, b.inverse().transpose().to_cols_array_2d());
    }

    #[test]
    fn effect_slots_pack_reserved_lane() {
        let slots = [ImpulseSlot { x: 0.5, y: 0.25, age: 0.1 }; IMPULSE_SLOTS];
        let uniform = EffectUniform::new(&slots, 640, 480, 1500.0, 1.0);
        assert!(uniform.slots.iter().all(|s| *s == [0.5, 0.25, 0.1, 0.0]));
        assert_eq!(uniform.resolution, [640.0, 480.0]);
        assert!((uniform.time - 1.5).abs() < 1e-6);
    }
}
