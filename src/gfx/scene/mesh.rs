//! Vertex data and GPU meshes
//!
//! [`VertexData`] is the CPU side: a flat list of 14-float vertices, drawn as a
//! non-indexed triangle list. [`Mesh`] uploads it into one vertex buffer.

use std::ops::Range;

use wgpu::util::DeviceExt;

use super::vertex::{Vertex, FLOATS_PER_VERTEX};
use crate::{
    error::{RenderError, RenderResult},
    gfx::{
        geometry::{face_normal, tangent_frame, GeometryError},
        math::Vec3,
        rendering::RenderContext,
    },
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexData {
    vertices: Vec<Vertex>,
}

impl VertexData {
    pub fn from_vertices(vertices: Vec<Vertex>) -> Self {
        Self { vertices }
    }

    /// Takes pre-expanded vertex records, 14 floats each
    pub fn from_interleaved(floats: Vec<f32>) -> RenderResult<Self> {
        if floats.len() % FLOATS_PER_VERTEX != 0 {
            return Err(RenderError::MalformedLayout { len: floats.len() });
        }

        Ok(Self {
            vertices: bytemuck::cast_slice(&floats).to_vec(),
        })
    }

    /// Flattens 3-tuples into a float list and reads it as interleaved records
    pub fn from_tuples(tuples: &[Vec3]) -> RenderResult<Self> {
        let floats = tuples.iter().flat_map(|t| [t.x, t.y, t.z]).collect();
        Self::from_interleaved(floats)
    }

    /// Builds full vertices from triangle-list positions
    ///
    /// Normals are per face. UVs are a planar projection along the dominant
    /// axis of the face normal, and tangents follow from those UVs.
    pub fn from_positions(positions: &[Vec3]) -> RenderResult<Self> {
        if positions.len() % 3 != 0 {
            return Err(GeometryError::PartialTriangle {
                positions: positions.len(),
            }
            .into());
        }

        let mut vertices = Vec::with_capacity(positions.len());
        for triangle in positions.chunks_exact(3) {
            let corners = [triangle[0], triangle[1], triangle[2]];
            let normal = face_normal(corners);
            let uvs = corners.map(|p| planar_uv(p, normal));
            let (tangent, bitangent) = tangent_frame(corners, uvs, normal);

            for (position, uv) in corners.iter().zip(uvs) {
                vertices.push(Vertex {
                    position: (*position).into(),
                    normal: normal.into(),
                    tangent: tangent.into(),
                    bitangent: bitangent.into(),
                    uv,
                });
            }
        }

        Ok(Self { vertices })
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Vertex range a draw call covers
    pub fn draw_range(&self) -> Range<u32> {
        0..self.vertex_count()
    }
}

/// Projects onto the plane most facing `normal`
fn planar_uv(position: Vec3, normal: Vec3) -> [f32; 2] {
    let n = Vec3::new(normal.x.abs(), normal.y.abs(), normal.z.abs());
    if n.x >= n.y && n.x >= n.z {
        [position.z, position.y]
    } else if n.y >= n.z {
        [position.x, position.z]
    } else {
        [position.x, position.y]
    }
}

/// Vertex buffer on the GPU
#[derive(Debug)]
pub struct Mesh {
    vertex_buffer: wgpu::Buffer,
    vertex_count: u32,
}

impl Mesh {
    pub fn new(ctx: &RenderContext, data: &VertexData, label: &str) -> RenderResult<Self> {
        if data.is_empty() {
            return Err(RenderError::EmptyMesh);
        }

        let vertex_buffer = ctx.allocate("vertex buffer", |device| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{} Vertex Buffer", label)),
                contents: bytemuck::cast_slice(data.vertices()),
                usage: wgpu::BufferUsages::VERTEX,
            })
        })?;

        log::debug!("Uploaded mesh '{}' ({} vertices)", label, data.vertex_count());

        Ok(Self {
            vertex_buffer,
            vertex_count: data.vertex_count(),
        })
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn vertex_buffer(&self) -> &wgpu::Buffer {
        &self.vertex_buffer
    }
}

/// Mesh draw calls on a render pass
pub trait DrawMesh {
    fn draw_mesh(&mut self, mesh: &Mesh);
}

impl DrawMesh for wgpu::RenderPass<'_> {
    fn draw_mesh(&mut self, mesh: &Mesh) {
        self.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        self.draw(0..mesh.vertex_count, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::math;
    use cgmath::InnerSpace;

    #[test]
    fn test_interleaved_length_must_be_multiple_of_fourteen() {
        let data = VertexData::from_interleaved(vec![0.0; 14 * 3]).unwrap();
        assert_eq!(data.vertex_count(), 3);
        assert_eq!(data.draw_range(), 0..3);

        let err = VertexData::from_interleaved(vec![0.0; 15]).unwrap_err();
        assert!(matches!(err, RenderError::MalformedLayout { len: 15 }));
    }

    #[test]
    fn test_interleaved_fields_land_in_order() {
        let floats: Vec<f32> = (0..14).map(|i| i as f32).collect();
        let data = VertexData::from_interleaved(floats.clone()).unwrap();
        let v = data.vertices()[0];

        assert_eq!(v.position, [0.0, 1.0, 2.0]);
        assert_eq!(v.normal, [3.0, 4.0, 5.0]);
        assert_eq!(v.tangent, [6.0, 7.0, 8.0]);
        assert_eq!(v.bitangent, [9.0, 10.0, 11.0]);
        assert_eq!(v.uv, [12.0, 13.0]);
        assert_eq!(data.as_floats(), &floats[..]);
    }

    #[test]
    fn test_tuples_flatten_like_raw_floats() {
        let tuples = vec![math::vec3(0.0, 0.0, 0.0); 14];
        assert_eq!(VertexData::from_tuples(&tuples).unwrap().vertex_count(), 3);

        let three = [
            math::vec3(0.0, 0.0, 0.0),
            math::vec3(1.0, 0.0, 0.0),
            math::vec3(0.0, 1.0, 0.0),
        ];
        assert!(matches!(
            VertexData::from_tuples(&three),
            Err(RenderError::MalformedLayout { len: 9 })
        ));
    }

    #[test]
    fn test_positions_generate_full_vertices() {
        let positions = [
            math::vec3(0.0, 0.0, 0.0),
            math::vec3(1.0, 0.0, 0.0),
            math::vec3(0.0, 1.0, 0.0),
        ];
        let data = VertexData::from_positions(&positions).unwrap();

        assert_eq!(data.vertex_count(), 3);
        assert_eq!(data.as_floats().len(), 3 * FLOATS_PER_VERTEX);
        let v = data.vertices()[1];
        assert_eq!(v.normal, [0.0, 0.0, 1.0]);
        assert_eq!(v.uv, [1.0, 0.0]);
        assert_eq!(v.tangent, [1.0, 0.0, 0.0]);
        assert_eq!(v.bitangent, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_positions_must_form_triangles() {
        let positions = [math::vec3(0.0, 0.0, 0.0), math::vec3(1.0, 0.0, 0.0)];
        assert!(matches!(
            VertexData::from_positions(&positions),
            Err(RenderError::Geometry(GeometryError::PartialTriangle { positions: 2 }))
        ));
    }

    #[test]
    fn test_generated_tangents_are_unit_length() {
        let positions = [
            math::vec3(0.0, 0.0, 0.0),
            math::vec3(0.0, 0.0, 2.0),
            math::vec3(0.0, 3.0, 0.0),
        ];
        let data = VertexData::from_positions(&positions).unwrap();
        for v in data.vertices() {
            assert!((Vec3::from(v.tangent).magnitude() - 1.0).abs() < 1e-5);
            assert!((Vec3::from(v.bitangent).magnitude() - 1.0).abs() < 1e-5);
        }
    }
}
