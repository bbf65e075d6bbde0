//! # Geometry Input
//!
//! Turns geometry into [`VertexData`]: comma-separated coordinate lists read
//! from assets, and procedurally generated primitives.
//!
//! ## Usage
//!
//! ```rust
//! use lumen::gfx::geometry::{generate_cube, parse_coords};
//! use lumen::gfx::scene::mesh::VertexData;
//!
//! let cube = generate_cube().unwrap();
//! assert_eq!(cube.vertex_count(), 36);
//!
//! let positions = parse_coords("0,0,0, 1,0,0, 0,1,0").unwrap();
//! let triangle = VertexData::from_positions(&positions).unwrap();
//! assert_eq!(triangle.vertex_count(), 3);
//! ```

pub mod coords;
pub mod primitives;

pub use coords::{load_vertex_data, parse_coords, parse_floats, GeometryLayout};
pub use primitives::{generate_cube, generate_plane};

use cgmath::InnerSpace;
use thiserror::Error;

use crate::gfx::{
    math::{self, Vec3},
    scene::{mesh::VertexData, vertex::Vertex},
};

/// Malformed geometry input
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Token {index} ('{token}') is not a finite number")]
    InvalidNumber { index: usize, token: String },
    #[error("{len} floats do not form whole 3-component tuples")]
    IncompleteTuple { len: usize },
    #[error("{positions} positions do not form whole triangles")]
    PartialTriangle { positions: usize },
    #[error("Index {index} is out of range for {len} vertices")]
    IndexOutOfRange { index: u32, len: usize },
}

/// Indexed geometry with per-corner normals and UVs
#[derive(Debug, Clone, Default)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Texture coordinates (u, v)
    pub tex_coords: Vec<[f32; 2]>,
    /// Normal vectors (x, y, z)
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices (counter-clockwise winding)
    pub indices: Vec<u32>,
}

impl GeometryData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Expands the index list into a flat triangle list with tangent frames
    ///
    /// Trailing indices that do not complete a triangle are ignored.
    pub fn to_vertex_data(&self) -> Result<VertexData, GeometryError> {
        let mut vertices = Vec::with_capacity(self.indices.len());

        for triangle in self.indices.chunks_exact(3) {
            let mut positions = [math::vec3(0.0, 0.0, 0.0); 3];
            for (position, &index) in positions.iter_mut().zip(triangle) {
                let corner = self
                    .vertices
                    .get(index as usize)
                    .ok_or(GeometryError::IndexOutOfRange {
                        index,
                        len: self.vertices.len(),
                    })?;
                *position = Vec3::from(*corner);
            }
            let corners = [triangle[0], triangle[1], triangle[2]].map(|i| i as usize);
            let uvs = corners.map(|i| self.tex_coords.get(i).copied().unwrap_or([0.0, 0.0]));
            let face_normal = face_normal(positions);

            for (k, &i) in corners.iter().enumerate() {
                let normal = self
                    .normals
                    .get(i)
                    .map(|n| Vec3::from(*n))
                    .unwrap_or(face_normal);
                let (tangent, bitangent) = tangent_frame(positions, uvs, normal);
                vertices.push(Vertex {
                    position: positions[k].into(),
                    normal: normal.into(),
                    tangent: tangent.into(),
                    bitangent: bitangent.into(),
                    uv: uvs[k],
                });
            }
        }

        Ok(VertexData::from_vertices(vertices))
    }
}

/// Unit normal of a counter-clockwise triangle; `+Y` when degenerate
pub fn face_normal(positions: [Vec3; 3]) -> Vec3 {
    let n = (positions[1] - positions[0]).cross(positions[2] - positions[0]);
    if n.magnitude2() < f32::EPSILON {
        math::vec3(0.0, 1.0, 0.0)
    } else {
        n.normalize()
    }
}

/// Tangent and bitangent from the UV derivatives of a triangle
///
/// Falls back to an arbitrary frame around `normal` when the UVs are
/// degenerate.
pub fn tangent_frame(positions: [Vec3; 3], uvs: [[f32; 2]; 3], normal: Vec3) -> (Vec3, Vec3) {
    let e1 = positions[1] - positions[0];
    let e2 = positions[2] - positions[0];
    let (du1, dv1) = (uvs[1][0] - uvs[0][0], uvs[1][1] - uvs[0][1]);
    let (du2, dv2) = (uvs[2][0] - uvs[0][0], uvs[2][1] - uvs[0][1]);

    let det = du1 * dv2 - du2 * dv1;
    if det.abs() > f32::EPSILON {
        let r = 1.0 / det;
        let tangent = (e1 * dv2 - e2 * dv1) * r;
        let bitangent = (e2 * du1 - e1 * du2) * r;
        if tangent.magnitude2() > f32::EPSILON && bitangent.magnitude2() > f32::EPSILON {
            return (tangent.normalize(), bitangent.normalize());
        }
    }

    let helper = if normal.x.abs() < 0.9 {
        math::vec3(1.0, 0.0, 0.0)
    } else {
        math::vec3(0.0, 1.0, 0.0)
    };
    let tangent = helper.cross(normal).normalize();
    (tangent, normal.cross(tangent))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tangent_frame_follows_uv_axes() {
        let positions = [
            math::vec3(0.0, 0.0, 0.0),
            math::vec3(1.0, 0.0, 0.0),
            math::vec3(0.0, 1.0, 0.0),
        ];
        let uvs = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]];
        let (t, b) = tangent_frame(positions, uvs, math::vec3(0.0, 0.0, 1.0));

        assert!((t - math::vec3(1.0, 0.0, 0.0)).magnitude() < 1e-6);
        assert!((b - math::vec3(0.0, 1.0, 0.0)).magnitude() < 1e-6);
    }

    #[test]
    fn test_degenerate_uvs_still_give_perpendicular_frame() {
        let positions = [
            math::vec3(0.0, 0.0, 0.0),
            math::vec3(1.0, 0.0, 0.0),
            math::vec3(0.0, 1.0, 0.0),
        ];
        let normal = math::vec3(0.0, 0.0, 1.0);
        let (t, b) = tangent_frame(positions, [[0.5, 0.5]; 3], normal);

        assert!(t.dot(normal).abs() < 1e-6);
        assert!(b.dot(normal).abs() < 1e-6);
        assert!((t.magnitude() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_collinear_triangle_normal_defaults_up() {
        let positions = [
            math::vec3(0.0, 0.0, 0.0),
            math::vec3(1.0, 0.0, 0.0),
            math::vec3(2.0, 0.0, 0.0),
        ];
        assert_eq!(face_normal(positions), math::vec3(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_out_of_range_index_is_an_error() {
        let mut data = GeometryData::new();
        data.vertices = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        data.indices = vec![0, 1, 2, 2, 1, 7];

        assert_eq!(
            data.to_vertex_data().unwrap_err(),
            GeometryError::IndexOutOfRange { index: 7, len: 3 }
        );
    }

    #[test]
    fn test_missing_normals_and_uvs_use_face_defaults() {
        let mut data = GeometryData::new();
        data.vertices = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        data.indices = vec![0, 1, 2];

        let expanded = data.to_vertex_data().unwrap();
        assert_eq!(expanded.vertex_count(), 3);
        for vertex in expanded.vertices() {
            assert_eq!(vertex.normal, [0.0, 0.0, 1.0]);
            assert_eq!(vertex.uv, [0.0, 0.0]);
        }
    }
}
