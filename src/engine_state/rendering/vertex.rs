//! Vertex and instance data for cube rendering.
//!
//! Every voxel is drawn as an instance of the same unit cube mesh. The mesh is
//! centred on the origin; the instance supplies the voxel's position and color.

use crate::engine_state::voxels::{block::BlockSide, block::MaterialKind, grid_key::GridKey};

/// A vertex of the unit cube mesh.
///
/// # Memory Layout
/// - Position: 3x f32 (12 bytes)
/// - Normal: 3x f32 (12 bytes)
///
/// Total size: 24 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CubeVertex {
    /// Position relative to the cube centre
    position: [f32; 3],
    /// Outward normal of the face this vertex belongs to
    normal: [f32; 3],
}

impl CubeVertex {
    /// Returns the vertex buffer layout description for the shader pipeline.
    ///
    /// # Shader Attributes
    /// - `location = 0`: position (vec3<f32>)
    /// - `location = 1`: normal (vec3<f32>)
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<CubeVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Per-voxel instance data.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CubeInstance {
    /// World-space centre of the voxel
    offset: [f32; 3],
    /// Linear RGB color of the voxel's material
    color: [f32; 3],
}

impl CubeInstance {
    /// Instance data for the voxel at `key`.
    pub fn new(key: GridKey, material: MaterialKind) -> Self {
        Self {
            offset: key.center().into(),
            color: material.color(),
        }
    }

    /// Returns the instance buffer layout description for the shader pipeline.
    ///
    /// # Shader Attributes
    /// - `location = 2`: offset (vec3<f32>)
    /// - `location = 3`: color (vec3<f32>)
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<CubeInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 3,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Builds the unit cube mesh: four vertices and two counter-clockwise triangles
/// per face, wound so they face outwards.
pub fn cube_mesh() -> (Vec<CubeVertex>, Vec<u16>) {
    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for side in BlockSide::all() {
        let normal = side.normal_f32();
        let (u, v) = side.tangents();
        let centre = normal * 0.5;
        let base = vertices.len() as u16;

        for (su, sv) in [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)] {
            let corner = centre + u * su + v * sv;
            vertices.push(CubeVertex {
                position: corner.into(),
                normal: normal.into(),
            });
        }

        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    (vertices, indices)
}

#[cfg(test)]
mod tests {
    use cgmath::{InnerSpace, Vector3};

    use super::*;

    #[test]
    fn mesh_has_four_vertices_and_two_triangles_per_face() {
        let (vertices, indices) = cube_mesh();
        assert_eq!(vertices.len(), 24);
        assert_eq!(indices.len(), 36);
        assert!(indices.iter().all(|index| (*index as usize) < vertices.len()));
        assert!(vertices
            .iter()
            .flat_map(|vertex| vertex.position)
            .all(|component| component.abs() == 0.5));
    }

    #[test]
    fn triangles_face_outwards() {
        let (vertices, indices) = cube_mesh();
        for triangle in indices.chunks(3) {
            let corner = |i: usize| Vector3::from(vertices[triangle[i] as usize].position);
            let [a, b, c] = [0, 1, 2].map(corner);
            let normal = Vector3::from(vertices[triangle[0] as usize].normal);
            let winding = (b - a).cross(c - a);
            assert!(winding.dot(normal) > 0.0);
            assert!(((a + b + c) / 3.0).dot(normal) > 0.0);
        }
    }

    #[test]
    fn instance_is_placed_at_the_voxel_centre() {
        let instance = CubeInstance::new(GridKey::new(3, -1, 2), MaterialKind::Stone);
        assert_eq!(instance.offset, [3.0, -1.0, 2.0]);
        assert_eq!(instance.color, MaterialKind::Stone.color());
    }
}
