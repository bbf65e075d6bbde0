use std::collections::HashSet;

use winit::{
    event::{ElementState, KeyEvent},
    keyboard::{Key, NamedKey},
};

use super::fly_camera::Camera;
use crate::gfx::{math, resources::material::MaterialParams};

/// Set of currently pressed keys, keyed by name
///
/// Single characters are stored lower-cased so `W` and `w` are the same key.
/// Longer names (`ArrowLeft`, `Shift`) are stored as-is.
#[derive(Debug, Default, Clone)]
pub struct InputMap {
    pressed: HashSet<String>,
}

impl InputMap {
    pub fn new() -> Self {
        Self::default()
    }

    fn normalize(key: &str) -> String {
        if key.chars().count() == 1 {
            key.to_lowercase()
        } else {
            key.to_string()
        }
    }

    pub fn press(&mut self, key: &str) {
        self.pressed.insert(Self::normalize(key));
    }

    pub fn release(&mut self, key: &str) {
        self.pressed.remove(&Self::normalize(key));
    }

    pub fn is_pressed(&self, key: &str) -> bool {
        self.pressed.contains(&Self::normalize(key))
    }

    /// Records a winit keyboard event
    pub fn process_keyboard_event(&mut self, event: &KeyEvent) {
        let Some(name) = key_name(&event.logical_key) else {
            return;
        };

        match event.state {
            ElementState::Pressed => self.press(&name),
            ElementState::Released => self.release(&name),
        }
    }
}

/// Maps a winit logical key to the name used in [`InputMap`]
pub fn key_name(key: &Key) -> Option<String> {
    match key {
        Key::Character(c) => Some(c.to_string()),
        Key::Named(NamedKey::Space) => Some(" ".to_string()),
        Key::Named(NamedKey::Shift) => Some("Shift".to_string()),
        Key::Named(NamedKey::ArrowLeft) => Some("ArrowLeft".to_string()),
        Key::Named(NamedKey::ArrowRight) => Some("ArrowRight".to_string()),
        Key::Named(NamedKey::ArrowUp) => Some("ArrowUp".to_string()),
        Key::Named(NamedKey::ArrowDown) => Some("ArrowDown".to_string()),
        Key::Named(NamedKey::Escape) => Some("Escape".to_string()),
        _ => None,
    }
}

/// Fly-style keyboard controls for the camera and the live material scalars
pub struct FlyController {
    pub speed: f32,
    pub slow_speed: f32,
    /// Degrees per tick
    pub rotate_speed: f32,
    /// Step applied to metallic / roughness per tick
    pub material_step: f32,
}

impl Default for FlyController {
    fn default() -> Self {
        Self {
            speed: 0.04,
            slow_speed: 0.01,
            rotate_speed: 2.0,
            material_step: 0.01,
        }
    }
}

impl FlyController {
    pub fn new(speed: f32, rotate_speed: f32) -> Self {
        Self {
            speed,
            rotate_speed,
            ..Default::default()
        }
    }

    /// Applies one tick of input
    ///
    /// Must run before the tick's draw calls so every drawable sees the same state.
    pub fn apply(&self, input: &InputMap, camera: &mut Camera, params: &mut MaterialParams) {
        let speed = if input.is_pressed("f") {
            self.slow_speed
        } else {
            self.speed
        };

        if input.is_pressed("w") {
            camera.move_relative_to_facing(math::vec3(0.0, 0.0, speed));
        }
        if input.is_pressed("s") {
            camera.move_relative_to_facing(math::vec3(0.0, 0.0, -speed));
        }
        if input.is_pressed("a") {
            camera.move_relative_to_facing(math::vec3(-speed, 0.0, 0.0));
        }
        if input.is_pressed("d") {
            camera.move_relative_to_facing(math::vec3(speed, 0.0, 0.0));
        }

        let mut position = camera.position();
        if input.is_pressed(" ") {
            position.y += speed;
        }
        if input.is_pressed("Shift") {
            position.y -= speed;
        }
        camera.set_position(position);

        let mut rotation = camera.rotation();
        if input.is_pressed("ArrowLeft") {
            rotation.y -= self.rotate_speed;
        }
        if input.is_pressed("ArrowRight") {
            rotation.y += self.rotate_speed;
        }
        if input.is_pressed("ArrowUp") {
            rotation.x -= self.rotate_speed;
        }
        if input.is_pressed("ArrowDown") {
            rotation.x += self.rotate_speed;
        }
        camera.set_rotation(rotation);

        if input.is_pressed("p") {
            params.adjust_roughness(self.material_step);
        }
        if input.is_pressed("o") {
            params.adjust_roughness(-self.material_step);
        }
        if input.is_pressed("l") {
            params.adjust_metallic(self.material_step);
        }
        if input.is_pressed("k") {
            params.adjust_metallic(-self.material_step);
        }
    }
}
