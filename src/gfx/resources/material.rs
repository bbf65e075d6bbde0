//! Material system for PBR rendering
//!
//! A [`Material`] borrows up to five surface maps and carries the two scalar
//! parameters. Materials are built per frame and passed to a draw call; they
//! own nothing on the GPU.

use super::texture::{Texture, TextureUnits};

/// Sampler names of the material maps, indexed by texture unit
pub const MATERIAL_MAPS: [&str; 5] = [
    "albedoMap",
    "roughnessMap",
    "normalMap",
    "displacementMap",
    "aoMap",
];

/// Unit the HDR environment is bound to
pub const HDR_UNIT: u32 = 5;

/// Unit the baked cubemap is bound to when drawing the skybox
pub const CUBEMAP_UNIT: u32 = 7;

/// Surface description for one draw call
#[derive(Debug, Clone, Copy, Default)]
pub struct Material<'a> {
    pub albedo_map: Option<&'a Texture>,
    pub roughness_map: Option<&'a Texture>,
    pub normal_map: Option<&'a Texture>,
    pub displacement_map: Option<&'a Texture>,
    pub ao_map: Option<&'a Texture>,
    pub metallic: Option<f32>,
    pub roughness: Option<f32>,
}

impl<'a> Material<'a> {
    pub const DEFAULT_METALLIC: f32 = 0.0;
    pub const DEFAULT_ROUGHNESS: f32 = 1.0;

    /// Material with no maps and default scalars
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builder pattern: set albedo map
    pub fn with_albedo_map(mut self, texture: &'a Texture) -> Self {
        self.albedo_map = Some(texture);
        self
    }

    /// Builder pattern: set roughness map
    pub fn with_roughness_map(mut self, texture: &'a Texture) -> Self {
        self.roughness_map = Some(texture);
        self
    }

    /// Builder pattern: set normal map
    pub fn with_normal_map(mut self, texture: &'a Texture) -> Self {
        self.normal_map = Some(texture);
        self
    }

    /// Builder pattern: set displacement map
    pub fn with_displacement_map(mut self, texture: &'a Texture) -> Self {
        self.displacement_map = Some(texture);
        self
    }

    /// Builder pattern: set ambient occlusion map
    pub fn with_ao_map(mut self, texture: &'a Texture) -> Self {
        self.ao_map = Some(texture);
        self
    }

    /// Builder pattern: set metallic value
    pub fn with_metallic(mut self, metallic: f32) -> Self {
        self.metallic = Some(metallic);
        self
    }

    /// Builder pattern: set roughness value
    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = Some(roughness);
        self
    }

    /// Builder pattern: take both scalars from the live parameters
    pub fn with_params(self, params: &MaterialParams) -> Self {
        self.with_metallic(params.metallic)
            .with_roughness(params.roughness)
    }

    /// Metallic value sent to the shader; an explicit zero is kept
    pub fn metallic_or_default(&self) -> f32 {
        self.metallic.unwrap_or(Self::DEFAULT_METALLIC)
    }

    /// Roughness value sent to the shader; an explicit zero is kept
    pub fn roughness_or_default(&self) -> f32 {
        self.roughness.unwrap_or(Self::DEFAULT_ROUGHNESS)
    }

    /// Maps in unit order (albedo 0 through ao 4)
    pub fn maps(&self) -> [Option<&'a Texture>; 5] {
        [
            self.albedo_map,
            self.roughness_map,
            self.normal_map,
            self.displacement_map,
            self.ao_map,
        ]
    }

    /// Binds every present map to its unit
    pub fn bind_maps(&self, units: &mut TextureUnits<'a>) {
        for (unit, map) in self.maps().into_iter().enumerate() {
            if let Some(texture) = map {
                texture.set_active(units, unit as u32);
            }
        }
    }
}

/// Live metallic / roughness values adjusted from the keyboard
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialParams {
    pub metallic: f32,
    pub roughness: f32,
}

impl Default for MaterialParams {
    fn default() -> Self {
        Self {
            metallic: Material::DEFAULT_METALLIC,
            roughness: Material::DEFAULT_ROUGHNESS,
        }
    }
}

impl MaterialParams {
    pub fn new(metallic: f32, roughness: f32) -> Self {
        Self {
            metallic,
            roughness,
        }
    }

    pub fn adjust_metallic(&mut self, delta: f32) {
        step_within_unit(&mut self.metallic, delta);
    }

    pub fn adjust_roughness(&mut self, delta: f32) {
        step_within_unit(&mut self.roughness, delta);
    }
}

/// Applies `delta` only if the result stays inside `[0, 1]`
fn step_within_unit(value: &mut f32, delta: f32) {
    let allowed = if delta >= 0.0 {
        *value <= 1.0 - delta
    } else {
        *value >= -delta
    };
    if allowed {
        *value += delta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_material_uses_defaults() {
        let material = Material::empty();
        assert_eq!(material.metallic_or_default(), 0.0);
        assert_eq!(material.roughness_or_default(), 1.0);
        assert!(material.maps().iter().all(Option::is_none));
    }

    #[test]
    fn test_explicit_zero_roughness_is_kept() {
        let material = Material::empty().with_roughness(0.0).with_metallic(1.0);
        assert_eq!(material.roughness_or_default(), 0.0);
        assert_eq!(material.metallic_or_default(), 1.0);
    }

    #[test]
    fn test_params_flow_into_material() {
        let params = MaterialParams::new(0.3, 0.6);
        let material = Material::empty().with_params(&params);
        assert_eq!(material.metallic, Some(0.3));
        assert_eq!(material.roughness, Some(0.6));
    }

    #[test]
    fn test_adjust_stops_at_bounds() {
        let mut params = MaterialParams::new(0.995, 0.005);
        params.adjust_metallic(0.01);
        params.adjust_roughness(-0.01);
        assert_eq!(params, MaterialParams::new(0.995, 0.005));

        params.adjust_metallic(-0.01);
        params.adjust_roughness(0.01);
        assert!((params.metallic - 0.985).abs() < 1e-6);
        assert!((params.roughness - 0.015).abs() < 1e-6);
    }

    #[test]
    fn test_map_names_follow_unit_order() {
        assert_eq!(MATERIAL_MAPS[0], "albedoMap");
        assert_eq!(MATERIAL_MAPS[4], "aoMap");
    }
}
