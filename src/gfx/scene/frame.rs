//! Per-tick state shared by every draw: lights and live material scalars

use crate::gfx::{
    math::{self, Vec3},
    resources::{
        material::MaterialParams,
        uniforms::{UniformBlock, MAX_LIGHTS},
    },
};

/// Point light; `power` is radiant intensity per color channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub position: Vec3,
    pub power: Vec3,
}

impl Light {
    pub fn new(position: Vec3, power: Vec3) -> Self {
        Self { position, power }
    }
}

/// Owned by the driver and mutated by input before any draw of the tick
#[derive(Debug, Clone, PartialEq)]
pub struct FrameContext {
    pub lights: Vec<Light>,
    pub params: MaterialParams,
}

impl Default for FrameContext {
    fn default() -> Self {
        Self::new(default_lights())
    }
}

impl FrameContext {
    pub fn new(lights: Vec<Light>) -> Self {
        Self {
            lights,
            params: MaterialParams::default(),
        }
    }
}

/// Two white lights above the scene, left and right
pub fn default_lights() -> Vec<Light> {
    vec![
        Light::new(math::vec3(-2.0, 3.0, 2.0), math::vec3(40.0, 40.0, 40.0)),
        Light::new(math::vec3(2.0, 3.0, 2.0), math::vec3(40.0, 40.0, 40.0)),
    ]
}

/// Writes `lightsCount` and the `lights[i]` entries; extra lights are dropped
pub fn write_lights(block: &mut UniformBlock, lights: &[Light]) {
    if lights.len() > MAX_LIGHTS {
        log::warn!(
            "{} lights given, only the first {} are used",
            lights.len(),
            MAX_LIGHTS
        );
    }
    let used = &lights[..lights.len().min(MAX_LIGHTS)];

    block.set("lightsCount", used.len() as i32);
    for (i, light) in used.iter().enumerate() {
        block.set(&format!("lights[{i}].position"), light.position);
        block.set(&format!("lights[{i}].power"), light.power);
    }
}
