//! Vertex format, procedural meshes, and GPU mesh buffers.

use glam::Vec3;
use wgpu::util::DeviceExt;

/// Vertex layout shared by every scene pipeline.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    /// Object-space position.
    pub position: [f32; 3],
    /// Object-space normal.
    pub normal: [f32; 3],
    /// Texture coordinate, origin top-left.
    pub uv: [f32; 2],
}

impl MeshVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x2
    ];

    /// Vertex buffer layout for pipeline creation.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Indexed triangle list on the CPU.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    /// Vertices.
    pub vertices: Vec<MeshVertex>,
    /// Triangle indices, counter-clockwise front faces.
    pub indices: Vec<u32>,
}

// (normal, u, v) per face with u x v == normal
const CUBE_FACES: [(Vec3, Vec3, Vec3); 6] = [
    (Vec3::X, Vec3::NEG_Z, Vec3::Y),
    (Vec3::NEG_X, Vec3::Z, Vec3::Y),
    (Vec3::Y, Vec3::X, Vec3::NEG_Z),
    (Vec3::NEG_Y, Vec3::X, Vec3::Z),
    (Vec3::Z, Vec3::X, Vec3::Y),
    (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
];

impl MeshData {
    /// Cube spanning -1..1 with outward-facing triangles.
    #[must_use]
    pub fn cube() -> Self {
        let mut mesh = Self::default();
        for (normal, u, v) in CUBE_FACES {
            let base = mesh.vertices.len() as u32;
            let corners = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];
            for (su, sv) in corners {
                mesh.vertices.push(MeshVertex {
                    position: (normal + u * su + v * sv).to_array(),
                    normal: normal.to_array(),
                    uv: [(su + 1.0) * 0.5, (1.0 - sv) * 0.5],
                });
            }
            mesh.indices.extend_from_slice(&[
                base,
                base + 1,
                base + 2,
                base,
                base + 2,
                base + 3,
            ]);
        }
        mesh
    }

    /// Cube seen from inside, for the skybox.
    #[must_use]
    pub fn skybox_cube() -> Self {
        let mut mesh = Self::cube();
        for tri in mesh.indices.chunks_exact_mut(3) {
            tri.swap(1, 2);
        }
        for vertex in &mut mesh.vertices {
            vertex.normal = (-Vec3::from(vertex.normal)).to_array();
        }
        mesh
    }

    /// Unit quad in the XY plane, x in 0..1 and y in -0.5..0.5, for
    /// billboarded foliage.
    #[must_use]
    pub fn foliage_quad() -> Self {
        let vertex = |x: f32, y: f32, u: f32, v: f32| MeshVertex {
            position: [x, y, 0.0],
            normal: [0.0, 0.0, 1.0],
            uv: [u, v],
        };
        Self {
            vertices: vec![
                vertex(0.0, 0.5, 0.0, 0.0),
                vertex(0.0, -0.5, 0.0, 1.0),
                vertex(1.0, -0.5, 1.0, 1.0),
                vertex(1.0, 0.5, 1.0, 0.0),
            ],
            indices: vec![0, 1, 2, 0, 2, 3],
        }
    }

    /// Iterate triangles as position triples.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).map(|tri| {
            [tri[0], tri[1], tri[2]]
                .map(|i| Vec3::from(self.vertices[i as usize].position))
        })
    }
}

/// Vertex and index buffers for one mesh.
pub struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl GpuMesh {
    /// Upload `mesh`.
    pub fn new(device: &wgpu::Device, label: &str, mesh: &MeshData) -> Self {
        let vertex_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} Vertices")),
                contents: bytemuck::cast_slice(&mesh.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} Indices")),
                contents: bytemuck::cast_slice(&mesh.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
        }
    }

    /// Bind buffers and issue an indexed draw. Pipeline and bind groups
    /// must already be set.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        if self.index_count == 0 {
            return;
        }
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(
            self.index_buffer.slice(..),
            wgpu::IndexFormat::Uint32,
        );
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn winding(tri: [Vec3; 3]) -> Vec3 {
        (tri[1] - tri[0]).cross(tri[2] - tri[0])
    }

    #[test]
    fn cube_faces_point_outward() {
        let cube = MeshData::cube();
        assert_eq!(cube.vertices.len(), 24);
        assert_eq!(cube.indices.len(), 36);
        for tri in cube.triangles() {
            let centroid = (tri[0] + tri[1] + tri[2]) / 3.0;
            assert!(winding(tri).dot(centroid) > 0.0);
        }
    }

    #[test]
    fn skybox_faces_point_inward() {
        for tri in MeshData::skybox_cube().triangles() {
            let centroid = (tri[0] + tri[1] + tri[2]) / 3.0;
            assert!(winding(tri).dot(centroid) < 0.0);
        }
    }

    #[test]
    fn foliage_quad_has_top_left_uv_origin() {
        let quad = MeshData::foliage_quad();
        let top_left = quad.vertices[0];
        assert_eq!(top_left.position, [0.0, 0.5, 0.0]);
        assert_eq!(top_left.uv, [0.0, 0.0]);
        for tri in quad.triangles() {
            assert!(winding(tri).z > 0.0);
        }
    }

    #[test]
    fn vertex_stride_matches_attributes() {
        assert_eq!(MeshVertex::layout().array_stride, 32);
    }
}
