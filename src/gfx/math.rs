//! Vector and transform helpers
//!
//! Positions, Euler rotations (degrees) and light values are all `Vec3`.
//! Matrices follow cgmath's column-vector convention.

use cgmath::{Deg, Matrix4, Vector3};

pub type Vec3 = Vector3<f32>;
pub type Mat4 = Matrix4<f32>;

/// Converts GL clip space (z in -1..1) to wgpu clip space (z in 0..1)
///
/// Arguments are column by column: `z' = 0.5·z + 0.5·w`, x, y and w untouched.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

pub fn vec3(x: f32, y: f32, z: f32) -> Vec3 {
    Vector3::new(x, y, z)
}

/// `Rx · Ry · Rz` for an Euler rotation in degrees
pub fn rotation_xyz(rotation: Vec3) -> Mat4 {
    Matrix4::from_angle_x(Deg(rotation.x))
        * Matrix4::from_angle_y(Deg(rotation.y))
        * Matrix4::from_angle_z(Deg(rotation.z))
}

/// View matrix: translate by `-position`, then rotate Z, Y, X
pub fn view_matrix(position: Vec3, rotation: Vec3) -> Mat4 {
    rotation_xyz(rotation) * Matrix4::from_translation(-position)
}

/// Perspective projection in wgpu clip space
pub fn projection_matrix(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    OPENGL_TO_WGPU_MATRIX * cgmath::perspective(Deg(fov_degrees), aspect, near, far)
}

/// Model matrix for a translation-only transform
pub fn translation_matrix(position: Vec3) -> Mat4 {
    Matrix4::from_translation(position)
}

pub fn convert_matrix4_to_array(matrix4: Mat4) -> [[f32; 4]; 4] {
    matrix4.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{SquareMatrix, Vector4};

    fn assert_vec4_eq(a: Vector4<f32>, b: Vector4<f32>) {
        for i in 0..4 {
            assert!((a[i] - b[i]).abs() < 1e-5, "{:?} != {:?}", a, b);
        }
    }

    #[test]
    fn test_view_matrix_translates_before_rotating() {
        let position = vec3(1.0, 2.0, 3.0);
        let view = view_matrix(position, vec3(0.0, 90.0, 0.0));

        // The camera position itself maps to the view-space origin
        let p = view * Vector4::new(1.0, 2.0, 3.0, 1.0);
        assert_vec4_eq(p, Vector4::new(0.0, 0.0, 0.0, 1.0));

        // A point one unit down -Z from the camera ends up rotated about Y
        let q = view * Vector4::new(1.0, 2.0, 2.0, 1.0);
        assert_vec4_eq(q, Vector4::new(-1.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn test_identity_view_at_origin() {
        let view = view_matrix(vec3(0.0, 0.0, 0.0), vec3(0.0, 0.0, 0.0));
        assert_eq!(view, Matrix4::identity());
    }

    #[test]
    fn test_projection_maps_near_plane_to_zero_depth() {
        let proj = projection_matrix(90.0, 1.0, 0.1, 100.0);
        let near = proj * Vector4::new(0.0, 0.0, -0.1, 1.0);
        let far = proj * Vector4::new(0.0, 0.0, -100.0, 1.0);
        assert!((near.z / near.w).abs() < 1e-5);
        assert!((far.z / far.w - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_projection_keeps_gl_x_and_y() {
        let gl = cgmath::perspective(Deg(90.0), 1.5, 0.1, 100.0);
        let wgpu = projection_matrix(90.0, 1.5, 0.1, 100.0);
        let point = Vector4::new(0.5, -0.25, -1.0, 1.0);

        let a = gl * point;
        let b = wgpu * point;
        assert!((a.x / a.w - b.x / b.w).abs() < 1e-5);
        assert!((a.y / a.w - b.y / b.w).abs() < 1e-5);
        assert!((a.w - b.w).abs() < 1e-6);
    }
}
