//! Shader programs: a linked render pipeline plus its named uniforms
//!
//! Group 0 binding 0 holds the uniform block. Group 1 holds the sampler slots
//! declared in [`ProgramConfig`], slot `k` at bindings `2k` (texture) and
//! `2k + 1` (sampler).

use wgpu::*;

use super::{render_context::RenderContext, shaders::ShaderSources};
use crate::{
    error::RenderResult,
    gfx::{
        resources::{
            material::{CUBEMAP_UNIT, HDR_UNIT, MATERIAL_MAPS},
            uniforms::{ProgramInterface, SamplerSlot, UniformLayout, UniformValue},
            TextureKind, TextureResource, TextureUnits,
        },
        scene::vertex::Vertex,
    },
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
        uniform_buffer::UniformBuffer,
    },
};

/// Configuration for creating a shader program
///
/// Defines the render state and the sampler slots of the program.
#[derive(Debug, Clone)]
pub struct ProgramConfig {
    pub label: String,
    /// `None` targets the context's color format
    pub color_format: Option<TextureFormat>,
    pub depth_format: TextureFormat,
    pub depth_compare: CompareFunction,
    pub depth_write: bool,
    pub cull_mode: Option<Face>,
    pub samplers: Vec<SamplerSlot>,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            label: "Shader Program".to_string(),
            color_format: None,
            depth_format: TextureResource::DEPTH_FORMAT,
            depth_compare: CompareFunction::LessEqual,
            depth_write: true,
            cull_mode: None,
            samplers: Vec::new(),
        }
    }
}

impl ProgramConfig {
    /// Material maps on units 0..=4 and the irradiance cubemap on unit 5
    pub fn pbr() -> Self {
        let mut config = Self::default().with_label("PBR Program");
        for (unit, name) in MATERIAL_MAPS.iter().enumerate() {
            config = config.with_sampler(name, unit as u32, TextureKind::Flat);
        }
        config.with_sampler("hdr", HDR_UNIT, TextureKind::Cube)
    }

    /// Baked cubemap on unit 7
    pub fn skybox() -> Self {
        Self::default()
            .with_label("Skybox Program")
            .with_sampler("cubemap", CUBEMAP_UNIT, TextureKind::Cube)
    }

    /// Offscreen program writing half-float faces from the HDR input on unit 5
    pub fn irradiance() -> Self {
        Self::default()
            .with_label("Irradiance Program")
            .with_color_format(TextureResource::CUBEMAP_FORMAT)
            .with_depth_format(TextureResource::BAKE_DEPTH_FORMAT)
            .with_sampler("hdr", HDR_UNIT, TextureKind::Flat)
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_owned();
        self
    }

    pub fn with_color_format(mut self, format: TextureFormat) -> Self {
        self.color_format = Some(format);
        self
    }

    pub fn with_depth_format(mut self, format: TextureFormat) -> Self {
        self.depth_format = format;
        self
    }

    pub fn with_depth_compare(mut self, compare: CompareFunction) -> Self {
        self.depth_compare = compare;
        self
    }

    pub fn with_cull_mode(mut self, face: Option<Face>) -> Self {
        self.cull_mode = face;
        self
    }

    /// Declares a sampler slot reading from `unit` (builder pattern)
    pub fn with_sampler(mut self, name: &str, unit: u32, kind: TextureKind) -> Self {
        self.samplers.push(SamplerSlot::new(name, unit, kind));
        self
    }
}

pub struct ShaderProgram {
    label: String,
    pipeline: RenderPipeline,
    uniform_buffer: UniformBuffer,
    uniform_bind_group: BindGroup,
    texture_layout: BindGroupLayoutWithDesc,
    interface: ProgramInterface,
    linked: bool,
}

impl ShaderProgram {
    /// Compiles both stages and links them into a pipeline
    ///
    /// Compile and link errors are logged and the program is still returned;
    /// drawing with it reports further errors through the device's handler.
    /// Only a failed buffer allocation is returned as an error.
    pub fn new(ctx: &RenderContext, sources: ShaderSources, config: ProgramConfig) -> RenderResult<Self> {
        let (vertex_source, fragment_source) = sources;
        let label = config.label.clone();

        let (vertex_module, vertex_ok) =
            ctx.capture_validation(&format!("Compiling vertex stage of '{}'", label), |device| {
                device.create_shader_module(ShaderModuleDescriptor {
                    label: Some(&format!("{} (vertex)", label)),
                    source: ShaderSource::Wgsl(vertex_source.into()),
                })
            });
        let (fragment_module, fragment_ok) =
            ctx.capture_validation(&format!("Compiling fragment stage of '{}'", label), |device| {
                device.create_shader_module(ShaderModuleDescriptor {
                    label: Some(&format!("{} (fragment)", label)),
                    source: ShaderSource::Wgsl(fragment_source.into()),
                })
            });

        let uniform_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .create(ctx.device(), &format!("{} Uniform Layout", label));

        let texture_layout = config
            .samplers
            .iter()
            .fold(BindGroupLayoutBuilder::new(), |builder, slot| {
                builder
                    .next_binding_fragment(binding_types::texture(slot.kind))
                    .next_binding_fragment(binding_types::sampler(SamplerBindingType::Filtering))
            })
            .create(ctx.device(), &format!("{} Texture Layout", label));

        let pipeline_layout = ctx.device().create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some(&format!("{} Pipeline Layout", label)),
            bind_group_layouts: &[&uniform_layout.layout, &texture_layout.layout],
            push_constant_ranges: &[],
        });

        let color_format = config.color_format.unwrap_or(ctx.color_format());
        let (pipeline, link_ok) = ctx.capture_validation(&format!("Linking '{}'", label), |device| {
            device.create_render_pipeline(&RenderPipelineDescriptor {
                label: Some(&label),
                layout: Some(&pipeline_layout),
                vertex: VertexState {
                    module: &vertex_module,
                    entry_point: Some("vs_main"),
                    buffers: &[Vertex::desc()],
                    compilation_options: PipelineCompilationOptions::default(),
                },
                fragment: Some(FragmentState {
                    module: &fragment_module,
                    entry_point: Some("fs_main"),
                    targets: &[Some(ColorTargetState {
                        format: color_format,
                        blend: Some(BlendState::REPLACE),
                        write_mask: ColorWrites::ALL,
                    })],
                    compilation_options: PipelineCompilationOptions::default(),
                }),
                primitive: PrimitiveState {
                    topology: PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: FrontFace::Ccw,
                    cull_mode: config.cull_mode,
                    polygon_mode: PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: Some(DepthStencilState {
                    format: config.depth_format,
                    depth_write_enabled: config.depth_write,
                    depth_compare: config.depth_compare,
                    stencil: StencilState::default(),
                    bias: DepthBiasState::default(),
                }),
                multisample: MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        });
        // The stage modules are not needed once the pipeline exists
        drop(vertex_module);
        drop(fragment_module);

        let interface = ProgramInterface::new(UniformLayout::standard(), config.samplers);
        let size = interface.uniforms.as_bytes().len() as u64;
        let uniform_buffer = ctx.allocate("uniform buffer", |device| UniformBuffer::new(device, size, &label))?;
        let uniform_bind_group = BindGroupBuilder::new(&uniform_layout)
            .resource(uniform_buffer.binding_resource())
            .create(ctx.device(), &format!("{} Uniform Bind Group", label));

        let linked = vertex_ok && fragment_ok && link_ok;
        if linked {
            log::info!("Linked shader program '{}'", label);
        }

        Ok(Self {
            label,
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            texture_layout,
            interface,
            linked,
        })
    }

    /// Writes a uniform by name; unknown names and mismatched types are ignored
    pub fn set_uniform(&mut self, name: &str, value: impl Into<UniformValue>) {
        self.interface.set_uniform(name, value);
    }

    pub fn uniform(&self, name: &str) -> Option<UniformValue> {
        self.interface.uniforms.get(name)
    }

    pub fn interface(&self) -> &ProgramInterface {
        &self.interface
    }

    pub fn interface_mut(&mut self) -> &mut ProgramInterface {
        &mut self.interface
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether both stages compiled and the pipeline linked without errors
    pub fn is_linked(&self) -> bool {
        self.linked
    }

    /// Uploads the uniforms and binds pipeline, uniforms and textures to `pass`
    ///
    /// Slots without a texture of the right kind get the context's fallback.
    pub fn bind(&mut self, ctx: &RenderContext, pass: &mut RenderPass<'_>, units: &TextureUnits) {
        let mask = self.interface.bound_mask(units);
        self.interface.uniforms.set("materialMaps", mask);
        self.uniform_buffer
            .update_content(ctx.queue(), self.interface.uniforms.as_bytes());

        let resources: Vec<&TextureResource> = self
            .interface
            .samplers()
            .iter()
            .map(|slot| match units.get(slot.unit) {
                Some(texture) if texture.kind() == slot.kind => texture.resource(),
                Some(texture) => {
                    log::warn!(
                        "'{}' expects a {:?} texture on unit {}, got {:?}",
                        slot.name,
                        slot.kind,
                        slot.unit,
                        texture.kind()
                    );
                    ctx.fallback(slot.kind)
                }
                None => ctx.fallback(slot.kind),
            })
            .collect();

        let texture_bind_group = resources
            .iter()
            .fold(BindGroupBuilder::new(&self.texture_layout), |builder, resource| {
                builder.texture(&resource.view).sampler(&resource.sampler)
            })
            .create(ctx.device(), &format!("{} Texture Bind Group", self.label));

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.uniform_bind_group, &[]);
        pass.set_bind_group(1, &texture_bind_group, &[]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pbr_config_declares_material_and_hdr_slots() {
        let config = ProgramConfig::pbr();
        let names: Vec<(&str, u32)> = config
            .samplers
            .iter()
            .map(|s| (s.name.as_str(), s.unit))
            .collect();

        assert_eq!(
            names,
            vec![
                ("albedoMap", 0),
                ("roughnessMap", 1),
                ("normalMap", 2),
                ("displacementMap", 3),
                ("aoMap", 4),
                ("hdr", 5),
            ]
        );
        assert_eq!(config.samplers[5].kind, TextureKind::Cube);
        assert_eq!(config.depth_compare, CompareFunction::LessEqual);
        assert_eq!(config.cull_mode, None);
    }

    #[test]
    fn test_skybox_reads_cubemap_from_unit_seven() {
        let config = ProgramConfig::skybox();
        assert_eq!(config.samplers, vec![SamplerSlot::new("cubemap", 7, TextureKind::Cube)]);
    }

    #[test]
    fn test_irradiance_renders_offscreen_formats() {
        let config = ProgramConfig::irradiance();
        assert_eq!(config.color_format, Some(TextureFormat::Rgba16Float));
        assert_eq!(config.depth_format, TextureFormat::Depth24Plus);
    }
}
