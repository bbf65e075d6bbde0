//! # Primitive Shape Generation
//!
//! Built-in shapes used when no coordinate file is available. All shapes are
//! generated with outward normals, UVs and tangent frames.

use super::{GeometryData, GeometryError};
use crate::gfx::scene::mesh::VertexData;

/// Generate a unit cube centered at the origin
///
/// Returns a cube with vertices from -0.5 to 0.5 on all axes, expanded to 36
/// vertices. Each face has UV coordinates from 0 to 1.
pub fn generate_cube() -> Result<VertexData, GeometryError> {
    let mut data = GeometryData::new();

    #[rustfmt::skip]
    let positions = [
        // Front face
        [-0.5, -0.5,  0.5], [ 0.5, -0.5,  0.5], [ 0.5,  0.5,  0.5], [-0.5,  0.5,  0.5],
        // Back face
        [-0.5, -0.5, -0.5], [-0.5,  0.5, -0.5], [ 0.5,  0.5, -0.5], [ 0.5, -0.5, -0.5],
        // Left face
        [-0.5, -0.5, -0.5], [-0.5, -0.5,  0.5], [-0.5,  0.5,  0.5], [-0.5,  0.5, -0.5],
        // Right face
        [ 0.5, -0.5,  0.5], [ 0.5, -0.5, -0.5], [ 0.5,  0.5, -0.5], [ 0.5,  0.5,  0.5],
        // Top face
        [-0.5,  0.5,  0.5], [ 0.5,  0.5,  0.5], [ 0.5,  0.5, -0.5], [-0.5,  0.5, -0.5],
        // Bottom face
        [-0.5, -0.5, -0.5], [ 0.5, -0.5, -0.5], [ 0.5, -0.5,  0.5], [-0.5, -0.5,  0.5],
    ];

    #[rustfmt::skip]
    let tex_coords = [
        [0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0],
        [1.0, 1.0], [1.0, 0.0], [0.0, 0.0], [0.0, 1.0],
        [0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0],
        [0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0],
        [0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0],
        [0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0],
    ];

    let face_normals = [
        [0.0, 0.0, 1.0],
        [0.0, 0.0, -1.0],
        [-1.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, -1.0, 0.0],
    ];

    data.vertices = positions.to_vec();
    data.tex_coords = tex_coords.to_vec();
    data.normals = face_normals.iter().flat_map(|n| [*n; 4]).collect();

    // Two counter-clockwise triangles per face
    data.indices = (0..6u32)
        .flat_map(|face| {
            let i = face * 4;
            [i, i + 1, i + 2, i + 2, i + 3, i]
        })
        .collect();

    data.to_vertex_data()
}

/// Generate a horizontal plane facing +Y
///
/// # Arguments
/// * `width` - Extent along X
/// * `depth` - Extent along Z
/// * `height` - Y coordinate of the plane
/// * `uv_repeat` - How often the texture tiles across the plane
pub fn generate_plane(
    width: f32,
    depth: f32,
    height: f32,
    uv_repeat: f32,
) -> Result<VertexData, GeometryError> {
    let mut data = GeometryData::new();
    let (hw, hd) = (width * 0.5, depth * 0.5);

    data.vertices = vec![
        [-hw, height, hd],
        [hw, height, hd],
        [hw, height, -hd],
        [-hw, height, -hd],
    ];
    data.tex_coords = vec![
        [0.0, uv_repeat],
        [uv_repeat, uv_repeat],
        [uv_repeat, 0.0],
        [0.0, 0.0],
    ];
    data.normals = vec![[0.0, 1.0, 0.0]; 4];
    data.indices = vec![0, 1, 2, 2, 3, 0];

    data.to_vertex_data()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::math::{self, Vec3};
    use cgmath::InnerSpace;

    #[test]
    fn test_cube_has_36_vertices_with_outward_normals() {
        let cube = generate_cube().unwrap();
        assert_eq!(cube.vertex_count(), 36);

        for vertex in cube.vertices() {
            let p = Vec3::from(vertex.position);
            let n = Vec3::from(vertex.normal);
            // Every corner lies on the face its normal points out of
            assert!((p.dot(n) - 0.5).abs() < 1e-6);
        }
    }

    #[test]
    fn test_cube_winding_matches_normals() {
        let cube = generate_cube().unwrap();
        for triangle in cube.vertices().chunks_exact(3) {
            let [a, b, c] = [0, 1, 2].map(|i| Vec3::from(triangle[i].position));
            let winding = (b - a).cross(c - a).normalize();
            assert!((winding - Vec3::from(triangle[0].normal)).magnitude() < 1e-6);
        }
    }

    #[test]
    fn test_plane_faces_up() {
        let plane = generate_plane(10.0, 10.0, -1.0, 4.0).unwrap();
        assert_eq!(plane.vertex_count(), 6);
        for vertex in plane.vertices() {
            assert_eq!(vertex.normal, [0.0, 1.0, 0.0]);
            assert_eq!(vertex.position[1], -1.0);
        }

        let [a, b, c] = [0, 1, 2].map(|i| Vec3::from(plane.vertices()[i].position));
        assert!((b - a).cross(c - a).normalize().dot(math::vec3(0.0, 1.0, 0.0)) > 0.99);
    }
}
