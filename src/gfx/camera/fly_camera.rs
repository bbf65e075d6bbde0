//! First-person camera with Euler rotation
//!
//! The view matrix is regenerated on every position or rotation write, so reads
//! are never stale. The projection is fixed at construction.

use cgmath::{Deg, Matrix4, Vector4};

use crate::gfx::math::{self, Mat4, Vec3};

/// Vertical field of view in degrees
pub const FIELD_OF_VIEW: f32 = 90.0;
pub const Z_NEAR: f32 = 0.1;
pub const Z_FAR: f32 = 100.0;

#[derive(Debug, Clone, Copy)]
pub struct Camera {
    position: Vec3,
    /// Pitch, yaw, roll in degrees
    rotation: Vec3,
    view: Mat4,
    projection: Mat4,
    aspect: f32,
}

impl Camera {
    /// Creates a camera at `position` with a projection for a `width × height` target
    pub fn new(position: Vec3, width: u32, height: u32) -> Self {
        let aspect = width as f32 / height.max(1) as f32;
        let rotation = math::vec3(0.0, 0.0, 0.0);

        Self {
            position,
            rotation,
            view: math::view_matrix(position, rotation),
            projection: math::projection_matrix(FIELD_OF_VIEW, aspect, Z_NEAR, Z_FAR),
            aspect,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.update_view();
    }

    pub fn set_rotation(&mut self, rotation: Vec3) {
        self.rotation = rotation;
        self.update_view();
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.view
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    /// Moves by `delta` expressed relative to the camera's yaw and roll
    ///
    /// Pitch is ignored so looking up or down does not change the horizontal
    /// heading. Forward is -Z, hence the subtracted Z component.
    pub fn move_relative_to_facing(&mut self, delta: Vec3) {
        let heading = Matrix4::from_angle_y(Deg(self.rotation.y))
            * Matrix4::from_angle_z(Deg(self.rotation.z));
        let r = heading * Vector4::new(delta.x, delta.y, delta.z, 0.0);

        let p = self.position;
        self.set_position(math::vec3(p.x + r.x, p.y + r.y, p.z - r.z));
    }

    fn update_view(&mut self) {
        self.view = math::view_matrix(self.position, self.rotation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn assert_mat_eq(a: Mat4, b: Mat4) {
        let a: [[f32; 4]; 4] = a.into();
        let b: [[f32; 4]; 4] = b.into();
        for c in 0..4 {
            for r in 0..4 {
                assert!((a[c][r] - b[c][r]).abs() < 1e-5, "{:?} != {:?}", a, b);
            }
        }
    }

    fn expected_view(position: Vec3, rotation: Vec3) -> Mat4 {
        Matrix4::from_angle_x(Deg(rotation.x))
            * Matrix4::from_angle_y(Deg(rotation.y))
            * Matrix4::from_angle_z(Deg(rotation.z))
            * Matrix4::from_translation(-position)
    }

    #[test]
    fn test_view_matrix_follows_every_write() {
        let mut rng = rand::rng();
        let mut camera = Camera::new(math::vec3(0.0, 0.0, 0.0), 1200, 800);

        for _ in 0..64 {
            let position = math::vec3(
                rng.random_range(-10.0..10.0),
                rng.random_range(-10.0..10.0),
                rng.random_range(-10.0..10.0),
            );
            camera.set_position(position);
            assert_mat_eq(camera.view_matrix(), expected_view(position, camera.rotation()));

            let rotation = math::vec3(
                rng.random_range(-180.0..180.0),
                rng.random_range(-180.0..180.0),
                rng.random_range(-180.0..180.0),
            );
            camera.set_rotation(rotation);
            assert_mat_eq(camera.view_matrix(), expected_view(position, rotation));
        }
    }

    #[test]
    fn test_forward_is_negative_z() {
        let mut camera = Camera::new(math::vec3(1.0, 2.0, 3.0), 800, 600);
        camera.move_relative_to_facing(math::vec3(0.0, 0.0, 0.5));

        let p = camera.position();
        assert_eq!(p.x, 1.0);
        assert_eq!(p.y, 2.0);
        assert!((p.z - 2.5).abs() < 1e-6);
    }

    #[test]
    fn test_pitch_does_not_affect_movement() {
        let mut level = Camera::new(math::vec3(0.0, 0.0, 0.0), 800, 600);
        let mut pitched = level;
        pitched.set_rotation(math::vec3(45.0, 0.0, 0.0));

        level.move_relative_to_facing(math::vec3(0.0, 0.0, 1.0));
        pitched.move_relative_to_facing(math::vec3(0.0, 0.0, 1.0));

        let (a, b) = (level.position(), pitched.position());
        assert!((a.x - b.x).abs() < 1e-6);
        assert!((a.y - b.y).abs() < 1e-6);
        assert!((a.z - b.z).abs() < 1e-6);
    }

    #[test]
    fn test_yaw_turns_strafe_direction() {
        let mut camera = Camera::new(math::vec3(0.0, 0.0, 0.0), 800, 600);
        camera.set_rotation(math::vec3(0.0, 90.0, 0.0));
        camera.move_relative_to_facing(math::vec3(1.0, 0.0, 0.0));

        // Ry(90) sends +X to -Z, which is then negated
        let p = camera.position();
        assert!(p.x.abs() < 1e-6);
        assert!((p.z - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_projection_is_fixed_at_construction() {
        let mut camera = Camera::new(math::vec3(0.0, 0.0, 0.0), 35, 35);
        let before = camera.projection_matrix();
        camera.set_position(math::vec3(3.0, 1.0, 0.0));
        camera.set_rotation(math::vec3(0.0, 180.0, 0.0));
        assert_eq!(camera.projection_matrix(), before);
        assert_eq!(camera.aspect(), 1.0);
    }
}
