//! Named uniform storage
//!
//! Programs expose a single uniform block plus a list of sampler slots. Values
//! are written by name into a CPU mirror of the block; the mirror is uploaded
//! right before the program is bound for a draw.

use std::collections::HashMap;

use super::{texture::TextureUnits, texture_resource::TextureKind};
use crate::gfx::math::{self, Mat4, Vec3};

/// Most lights a single draw can see
pub const MAX_LIGHTS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Int(i32),
    UInt(u32),
    Vec3([f32; 3]),
    Mat4([[f32; 4]; 4]),
}

impl UniformValue {
    pub fn ty(&self) -> UniformType {
        match self {
            UniformValue::Float(_) => UniformType::Float,
            UniformValue::Int(_) => UniformType::Int,
            UniformValue::UInt(_) => UniformType::UInt,
            UniformValue::Vec3(_) => UniformType::Vec3,
            UniformValue::Mat4(_) => UniformType::Mat4,
        }
    }

    fn bytes(&self) -> &[u8] {
        match self {
            UniformValue::Float(v) => bytemuck::bytes_of(v),
            UniformValue::Int(v) => bytemuck::bytes_of(v),
            UniformValue::UInt(v) => bytemuck::bytes_of(v),
            UniformValue::Vec3(v) => bytemuck::bytes_of(v),
            UniformValue::Mat4(v) => bytemuck::bytes_of(v),
        }
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        UniformValue::Float(v)
    }
}

impl From<i32> for UniformValue {
    fn from(v: i32) -> Self {
        UniformValue::Int(v)
    }
}

impl From<u32> for UniformValue {
    fn from(v: u32) -> Self {
        UniformValue::UInt(v)
    }
}

impl From<Vec3> for UniformValue {
    fn from(v: Vec3) -> Self {
        UniformValue::Vec3(v.into())
    }
}

impl From<Mat4> for UniformValue {
    fn from(m: Mat4) -> Self {
        UniformValue::Mat4(math::convert_matrix4_to_array(m))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformType {
    Float,
    Int,
    UInt,
    Vec3,
    Mat4,
}

impl UniformType {
    pub fn size(self) -> usize {
        match self {
            UniformType::Float | UniformType::Int | UniformType::UInt => 4,
            UniformType::Vec3 => 12,
            UniformType::Mat4 => 64,
        }
    }

    /// Alignment in the uniform address space
    pub fn align(self) -> usize {
        match self {
            UniformType::Float | UniformType::Int | UniformType::UInt => 4,
            UniformType::Vec3 | UniformType::Mat4 => 16,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformField {
    pub offset: usize,
    pub ty: UniformType,
}

fn round_up(value: usize, align: usize) -> usize {
    value.div_ceil(align) * align
}

/// Byte layout of a uniform block, keyed by field name
///
/// Array elements are addressed as `lights[3].position`.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformLayout {
    fields: HashMap<String, UniformField>,
    size: usize,
}

impl UniformLayout {
    pub fn builder() -> UniformLayoutBuilder {
        UniformLayoutBuilder::default()
    }

    /// Block shared by the built-in PBR, skybox and irradiance shaders
    pub fn standard() -> Self {
        Self::builder()
            .field("model", UniformType::Mat4)
            .field("view", UniformType::Mat4)
            .field("projection", UniformType::Mat4)
            .field("cameraPos", UniformType::Vec3)
            .field("lightsCount", UniformType::Int)
            .field("materialMetallic", UniformType::Float)
            .field("materialRoughness", UniformType::Float)
            .field("materialMaps", UniformType::UInt)
            .struct_array(
                "lights",
                MAX_LIGHTS,
                &[("position", UniformType::Vec3), ("power", UniformType::Vec3)],
            )
            .build()
    }

    pub fn field(&self, name: &str) -> Option<UniformField> {
        self.fields.get(name).copied()
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

/// Lays out fields with WGSL uniform alignment rules
#[derive(Debug, Default)]
pub struct UniformLayoutBuilder {
    fields: HashMap<String, UniformField>,
    cursor: usize,
}

impl UniformLayoutBuilder {
    pub fn field(mut self, name: &str, ty: UniformType) -> Self {
        let offset = round_up(self.cursor, ty.align());
        self.fields.insert(name.to_string(), UniformField { offset, ty });
        self.cursor = offset + ty.size();
        self
    }

    /// Fixed-size array of structs; struct alignment and stride are 16 bytes
    pub fn struct_array(mut self, name: &str, count: usize, members: &[(&str, UniformType)]) -> Self {
        let mut member_offsets = Vec::with_capacity(members.len());
        let mut end = 0;
        for (member, ty) in members {
            let offset = round_up(end, ty.align());
            member_offsets.push((*member, offset, *ty));
            end = offset + ty.size();
        }
        let stride = round_up(end, 16);
        let base = round_up(self.cursor, 16);

        for i in 0..count {
            for (member, offset, ty) in &member_offsets {
                self.fields.insert(
                    format!("{name}[{i}].{member}"),
                    UniformField {
                        offset: base + i * stride + offset,
                        ty: *ty,
                    },
                );
            }
        }
        self.cursor = base + count * stride;
        self
    }

    pub fn build(self) -> UniformLayout {
        UniformLayout {
            fields: self.fields,
            size: round_up(self.cursor.max(16), 16),
        }
    }
}

/// CPU mirror of a uniform block
#[derive(Debug, Clone)]
pub struct UniformBlock {
    layout: UniformLayout,
    data: Vec<u8>,
}

impl UniformBlock {
    pub fn new(layout: UniformLayout) -> Self {
        let data = vec![0; layout.size()];
        Self { layout, data }
    }

    /// Writes a value by name
    ///
    /// Unknown names and type mismatches are ignored and return `false`,
    /// so one shader can skip uniforms another one uses.
    pub fn set(&mut self, name: &str, value: impl Into<UniformValue>) -> bool {
        let value = value.into();
        let Some(field) = self.layout.field(name) else {
            log::trace!("Uniform '{}' not in block, ignoring", name);
            return false;
        };
        if field.ty != value.ty() {
            log::trace!(
                "Uniform '{}' is {:?}, ignoring {:?} write",
                name,
                field.ty,
                value.ty()
            );
            return false;
        }

        let bytes = value.bytes();
        self.data[field.offset..field.offset + bytes.len()].copy_from_slice(bytes);
        true
    }

    pub fn get(&self, name: &str) -> Option<UniformValue> {
        let field = self.layout.field(name)?;
        let bytes = &self.data[field.offset..field.offset + field.ty.size()];

        Some(match field.ty {
            UniformType::Float => UniformValue::Float(bytemuck::pod_read_unaligned(bytes)),
            UniformType::Int => UniformValue::Int(bytemuck::pod_read_unaligned(bytes)),
            UniformType::UInt => UniformValue::UInt(bytemuck::pod_read_unaligned(bytes)),
            UniformType::Vec3 => UniformValue::Vec3(bytemuck::pod_read_unaligned(bytes)),
            UniformType::Mat4 => UniformValue::Mat4(bytemuck::pod_read_unaligned(bytes)),
        })
    }

    pub fn layout(&self) -> &UniformLayout {
        &self.layout
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

/// A named texture input of a program and the unit it reads from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplerSlot {
    pub name: String,
    pub unit: u32,
    pub kind: TextureKind,
}

impl SamplerSlot {
    pub fn new(name: &str, unit: u32, kind: TextureKind) -> Self {
        Self {
            name: name.to_string(),
            unit,
            kind,
        }
    }
}

/// Everything a program reads besides vertices: the uniform block and the
/// sampler slots
#[derive(Debug, Clone)]
pub struct ProgramInterface {
    pub uniforms: UniformBlock,
    samplers: Vec<SamplerSlot>,
}

impl ProgramInterface {
    pub fn new(layout: UniformLayout, samplers: Vec<SamplerSlot>) -> Self {
        Self {
            uniforms: UniformBlock::new(layout),
            samplers,
        }
    }

    /// Writes a uniform by name
    ///
    /// An `Int` written to a sampler name re-targets that slot to the unit.
    pub fn set_uniform(&mut self, name: &str, value: impl Into<UniformValue>) -> bool {
        let value = value.into();
        if let Some(slot) = self.samplers.iter_mut().find(|s| s.name == name) {
            return match value {
                UniformValue::Int(unit) if unit >= 0 => {
                    slot.unit = unit as u32;
                    true
                }
                _ => {
                    log::trace!("Sampler '{}' only accepts a unit number", name);
                    false
                }
            };
        }
        self.uniforms.set(name, value)
    }

    pub fn sampler_unit(&self, name: &str) -> Option<u32> {
        self.samplers.iter().find(|s| s.name == name).map(|s| s.unit)
    }

    pub fn samplers(&self) -> &[SamplerSlot] {
        &self.samplers
    }

    /// Bit `i` is set when slot `i` has a texture of its kind bound
    pub fn bound_mask(&self, units: &TextureUnits) -> u32 {
        self.samplers
            .iter()
            .enumerate()
            .filter(|(_, slot)| units.get(slot.unit).is_some_and(|t| t.kind() == slot.kind))
            .fold(0, |mask, (i, _)| mask | (1 << i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::SquareMatrix;

    #[test]
    fn test_standard_layout_offsets() {
        let layout = UniformLayout::standard();
        let offset = |name: &str| layout.field(name).unwrap().offset;

        assert_eq!(offset("model"), 0);
        assert_eq!(offset("view"), 64);
        assert_eq!(offset("projection"), 128);
        assert_eq!(offset("cameraPos"), 192);
        assert_eq!(offset("lightsCount"), 204);
        assert_eq!(offset("materialMetallic"), 208);
        assert_eq!(offset("materialRoughness"), 212);
        assert_eq!(offset("materialMaps"), 216);
        assert_eq!(offset("lights[0].position"), 224);
        assert_eq!(offset("lights[0].power"), 240);
        assert_eq!(offset("lights[1].position"), 256);
        assert_eq!(offset("lights[15].power"), 224 + 15 * 32 + 16);
        assert_eq!(layout.size(), 736);
    }

    #[test]
    fn test_set_and_get_by_name() {
        let mut block = UniformBlock::new(UniformLayout::standard());

        assert!(block.set("materialRoughness", 0.25f32));
        assert!(block.set("lightsCount", 2i32));
        assert!(block.set("cameraPos", math::vec3(1.0, 2.0, 3.0)));
        assert!(block.set("model", Mat4::identity()));

        assert_eq!(block.get("materialRoughness"), Some(UniformValue::Float(0.25)));
        assert_eq!(block.get("lightsCount"), Some(UniformValue::Int(2)));
        assert_eq!(block.get("cameraPos"), Some(UniformValue::Vec3([1.0, 2.0, 3.0])));
        assert_eq!(block.get("model"), Some(Mat4::identity().into()));
    }

    #[test]
    fn test_unknown_and_mistyped_names_are_ignored() {
        let mut block = UniformBlock::new(UniformLayout::standard());
        let before = block.as_bytes().to_vec();

        assert!(!block.set("doesNotExist", 1.0f32));
        assert!(!block.set("lightsCount", 1.0f32));
        assert!(!block.set("lights[16].position", math::vec3(0.0, 0.0, 0.0)));
        assert_eq!(block.as_bytes(), &before[..]);
        assert_eq!(block.get("doesNotExist"), None);
    }

    #[test]
    fn test_int_on_sampler_name_retargets_unit() {
        let mut interface = ProgramInterface::new(
            UniformLayout::standard(),
            vec![
                SamplerSlot::new("albedoMap", 0, TextureKind::Flat),
                SamplerSlot::new("hdr", 5, TextureKind::Flat),
            ],
        );

        assert!(interface.set_uniform("hdr", 6i32));
        assert_eq!(interface.sampler_unit("hdr"), Some(6));
        assert!(!interface.set_uniform("hdr", 1.0f32));
        assert!(!interface.set_uniform("hdr", -1i32));
        assert_eq!(interface.sampler_unit("hdr"), Some(6));
        assert_eq!(interface.sampler_unit("albedoMap"), Some(0));
    }

    #[test]
    fn test_nothing_bound_gives_empty_mask() {
        let interface = ProgramInterface::new(
            UniformLayout::standard(),
            vec![SamplerSlot::new("albedoMap", 0, TextureKind::Flat)],
        );
        assert_eq!(interface.bound_mask(&TextureUnits::new()), 0);
    }

    #[test]
    fn test_custom_layout_packs_scalars() {
        let layout = UniformLayout::builder()
            .field("a", UniformType::Float)
            .field("b", UniformType::Vec3)
            .field("c", UniformType::Float)
            .build();

        assert_eq!(layout.field("a").unwrap().offset, 0);
        assert_eq!(layout.field("b").unwrap().offset, 16);
        assert_eq!(layout.field("c").unwrap().offset, 28);
        assert_eq!(layout.size(), 32);
    }
}
