//! # Tube Mesh
//!
//! Procedural tube geometry shared by the renderer and the collision layer.
//! A dense version with smooth normals is drawn; a coarse [`MeshProxy`] is
//! handed to the engine to build the collision hull.

use std::f32::consts::TAU;

use glam::Vec3;

/// Tube radius in mesh units (before the body scale is applied).
pub const TUBE_RADIUS: f32 = 0.12;
/// Half of the tube length in mesh units.
pub const TUBE_HALF_LENGTH: f32 = 0.5;

const RENDER_SEGMENTS: u32 = 32;
const PROXY_SEGMENTS: u32 = 8;

/// Interleaved vertex as uploaded to the GPU.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Indexed triangle mesh with per-vertex normals.
#[derive(Clone, Debug, Default)]
pub struct TriangleMesh {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

/// Positions-only mesh used to build collision shapes.
#[derive(Clone, Debug, Default)]
pub struct MeshProxy {
    pub points: Vec<Vec3>,
    pub triangles: Vec<[u32; 3]>,
}

impl TriangleMesh {
    /// Closed cylinder along the local Y axis, counter-clockwise winding.
    #[must_use]
    pub fn tube(radius: f32, half_length: f32, segments: u32) -> Self {
        let segments = segments.max(3);
        let mut mesh = Self::default();

        // Side wall: one bottom/top pair per ring step, the seam duplicated so
        // normals stay smooth all the way round.
        for i in 0..=segments {
            let angle = i as f32 / segments as f32 * TAU;
            let (sin, cos) = angle.sin_cos();
            let normal = [cos, 0.0, sin];
            mesh.vertices.push(MeshVertex { position: [radius * cos, -half_length, radius * sin], normal });
            mesh.vertices.push(MeshVertex { position: [radius * cos, half_length, radius * sin], normal });
        }
        for i in 0..segments {
            let b0 = 2 * i;
            let t0 = b0 + 1;
            let b1 = b0 + 2;
            let t1 = b0 + 3;
            mesh.indices.extend_from_slice(&[b0, t0, b1, b1, t0, t1]);
        }

        mesh.push_cap(radius, half_length, segments, 1.0);
        mesh.push_cap(radius, -half_length, segments, -1.0);
        mesh
    }

    /// The tube drawn for every body.
    #[must_use]
    pub fn render_tube() -> Self {
        Self::tube(TUBE_RADIUS, TUBE_HALF_LENGTH, RENDER_SEGMENTS)
    }

    fn push_cap(&mut self, radius: f32, y: f32, segments: u32, facing: f32) {
        let normal = [0.0, facing, 0.0];
        let center = self.vertices.len() as u32;
        self.vertices.push(MeshVertex { position: [0.0, y, 0.0], normal });
        for i in 0..segments {
            let angle = i as f32 / segments as f32 * TAU;
            let (sin, cos) = angle.sin_cos();
            self.vertices.push(MeshVertex { position: [radius * cos, y, radius * sin], normal });
        }
        for i in 0..segments {
            let current = center + 1 + i;
            let next = center + 1 + (i + 1) % segments;
            if facing > 0.0 {
                self.indices.extend_from_slice(&[center, next, current]);
            } else {
                self.indices.extend_from_slice(&[center, current, next]);
            }
        }
    }

    /// Strip normals and regroup indices into triangles.
    #[must_use]
    pub fn to_proxy(&self) -> MeshProxy {
        MeshProxy {
            points: self.vertices.iter().map(|v| Vec3::from(v.position)).collect(),
            triangles: self
                .indices
                .chunks_exact(3)
                .map(|t| [t[0], t[1], t[2]])
                .collect(),
        }
    }
}

impl MeshProxy {
    /// Coarse collision proxy matching [`TriangleMesh::render_tube`].
    #[must_use]
    pub fn tube() -> Self {
        TriangleMesh::tube(TUBE_RADIUS, TUBE_HALF_LENGTH, PROXY_SEGMENTS).to_proxy()
    }

    /// Proxy points multiplied by `scale`.
    #[must_use]
    pub fn scaled_points(&self, scale: f32) -> Vec<Vec3> {
        self.points.iter().map(|p| *p * scale).collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tube_indices_reference_existing_vertices() {
        let mesh = TriangleMesh::tube(0.5, 1.0, 12);
        assert_eq!(mesh.indices.len() % 3, 0);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
        // side wall (2 triangles) + two caps (1 triangle each) per segment
        assert_eq!(mesh.indices.len(), 12 * 4 * 3);
    }

    #[test]
    fn tube_triangles_face_outward() {
        let mesh = TriangleMesh::tube(0.5, 1.0, 16);
        for tri in mesh.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from(mesh.vertices[i as usize].position));
            let face_normal = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(face_normal.dot(centroid) > 0.0, "inward triangle {tri:?}");
        }
    }

    #[test]
    fn normals_are_unit_length() {
        let mesh = TriangleMesh::render_tube();
        for v in &mesh.vertices {
            assert!((Vec3::from(v.normal).length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn proxy_scaling_multiplies_extent() {
        let proxy = MeshProxy::tube();
        let scaled = proxy.scaled_points(2.0);
        let max_y = scaled.iter().map(|p| p.y).fold(f32::MIN, f32::max);
        assert!((max_y - 2.0 * TUBE_HALF_LENGTH).abs() < 1e-6);
    }
}
