//! Built-in WGSL programs as (vertex, fragment) source pairs
//!
//! Every stage is prefixed with `frame.wgsl`, which declares the uniform block
//! and the vertex input layout.

pub type ShaderSources = (&'static str, &'static str);

/// Lit PBR surface with optional material maps and an irradiance ambient term
pub const PBR: ShaderSources = (
    concat!(include_str!("shaders/frame.wgsl"), include_str!("shaders/pbr_vertex.wgsl")),
    concat!(include_str!("shaders/frame.wgsl"), include_str!("shaders/pbr_fragment.wgsl")),
);

/// Camera-centered box sampling the baked cubemap
pub const SKYBOX: ShaderSources = (
    concat!(include_str!("shaders/frame.wgsl"), include_str!("shaders/skybox_vertex.wgsl")),
    concat!(include_str!("shaders/frame.wgsl"), include_str!("shaders/skybox_fragment.wgsl")),
);

/// Hemisphere convolution of an equirectangular HDR image
pub const IRRADIANCE: ShaderSources = (
    concat!(include_str!("shaders/frame.wgsl"), include_str!("shaders/irradiance_vertex.wgsl")),
    concat!(include_str!("shaders/frame.wgsl"), include_str!("shaders/irradiance_fragment.wgsl")),
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_stage_has_its_entry_point() {
        for (vertex, fragment) in [PBR, SKYBOX, IRRADIANCE] {
            assert!(vertex.contains("fn vs_main"));
            assert!(fragment.contains("fn fs_main"));
            assert!(vertex.contains("var<uniform> frame: Frame"));
        }
    }
}
