//! Drawables: a mesh, a program and a placement in the world
//!
//! The three kinds share one type. Entities are placed by position, skyboxes
//! follow the camera, and cubemap sources only render inside the bake pass.

use std::fmt;

use cgmath::SquareMatrix;

use super::{
    frame::{write_lights, Light},
    mesh::{DrawMesh, Mesh, VertexData},
};
use crate::{
    error::{RenderError, RenderResult},
    gfx::{
        camera::Camera,
        math::{self, Mat4, Vec3},
        rendering::{shaders::ShaderSources, ProgramConfig, RenderContext, ShaderProgram},
        resources::{
            material::{Material, CUBEMAP_UNIT, HDR_UNIT, MATERIAL_MAPS},
            uniforms::ProgramInterface,
            Texture, TextureUnits,
        },
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawableKind {
    /// Placed in the world by its position
    Entity,
    /// Drawn around the camera after the entities
    Skybox,
    /// Input geometry of the cubemap bake; never drawn to the screen
    CubemapSource,
}

impl DrawableKind {
    /// Skyboxes and cubemap sources ignore their position
    pub fn has_fixed_model(self) -> bool {
        !matches!(self, DrawableKind::Entity)
    }
}

pub struct Drawable {
    label: String,
    kind: DrawableKind,
    mesh: Mesh,
    program: ShaderProgram,
    position: Vec3,
}

impl fmt::Debug for Drawable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Drawable")
            .field("label", &self.label)
            .field("kind", &self.kind)
            .field("vertices", &self.mesh.vertex_count())
            .field("position", &self.position)
            .finish()
    }
}

impl Drawable {
    pub fn new(
        ctx: &RenderContext,
        kind: DrawableKind,
        label: &str,
        vertices: &VertexData,
        sources: ShaderSources,
        config: ProgramConfig,
    ) -> RenderResult<Self> {
        let mesh = Mesh::new(ctx, vertices, label)?;
        let program = ShaderProgram::new(ctx, sources, config.with_label(label))?;

        log::info!("Created {:?} '{}'", kind, label);

        Ok(Self {
            label: label.to_string(),
            kind,
            mesh,
            program,
            position: math::vec3(0.0, 0.0, 0.0),
        })
    }

    /// PBR entity at `position`
    pub fn entity(
        ctx: &RenderContext,
        label: &str,
        vertices: &VertexData,
        sources: ShaderSources,
        position: Vec3,
    ) -> RenderResult<Self> {
        let mut drawable = Self::new(
            ctx,
            DrawableKind::Entity,
            label,
            vertices,
            sources,
            ProgramConfig::pbr(),
        )?;
        drawable.set_position(position);
        Ok(drawable)
    }

    pub fn skybox(ctx: &RenderContext, vertices: &VertexData, sources: ShaderSources) -> RenderResult<Self> {
        Self::new(
            ctx,
            DrawableKind::Skybox,
            "Skybox",
            vertices,
            sources,
            ProgramConfig::skybox(),
        )
    }

    pub fn cubemap_source(
        ctx: &RenderContext,
        vertices: &VertexData,
        sources: ShaderSources,
    ) -> RenderResult<Self> {
        Self::new(
            ctx,
            DrawableKind::CubemapSource,
            "Cubemap Source",
            vertices,
            sources,
            ProgramConfig::irradiance(),
        )
    }

    pub fn kind(&self) -> DrawableKind {
        self.kind
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        if self.kind.has_fixed_model() {
            log::warn!("'{}' is a {:?} and cannot be moved", self.label, self.kind);
            return;
        }
        self.position = position;
    }

    pub fn model_matrix(&self) -> Mat4 {
        if self.kind.has_fixed_model() {
            Mat4::identity()
        } else {
            math::translation_matrix(self.position)
        }
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn program(&self) -> &ShaderProgram {
        &self.program
    }

    pub fn program_mut(&mut self) -> &mut ShaderProgram {
        &mut self.program
    }

    /// Draws with `material`, lit by `lights`, with `environment` on unit 5
    pub fn draw(
        &mut self,
        ctx: &RenderContext,
        pass: &mut wgpu::RenderPass<'_>,
        material: &Material,
        camera: &Camera,
        environment: &Texture,
        lights: &[Light],
    ) -> RenderResult<()> {
        self.ensure_on_screen()?;

        let mut units = TextureUnits::new();
        material.bind_maps(&mut units);
        environment.set_active(&mut units, HDR_UNIT);

        self.submit(ctx, pass, material, camera, &units, lights);
        Ok(())
    }

    /// Draws with no material, the HDR image on unit 5 and the baked cubemap
    /// on unit 7
    pub fn draw_skybox(
        &mut self,
        ctx: &RenderContext,
        pass: &mut wgpu::RenderPass<'_>,
        camera: &Camera,
        hdr: &Texture,
        cubemap: &Texture,
        lights: &[Light],
    ) -> RenderResult<()> {
        self.ensure_on_screen()?;

        let mut units = TextureUnits::new();
        hdr.set_active(&mut units, HDR_UNIT);
        cubemap.set_active(&mut units, CUBEMAP_UNIT);
        self.program
            .set_uniform("cubemap", CUBEMAP_UNIT as i32);

        self.submit(ctx, pass, &Material::empty(), camera, &units, lights);
        Ok(())
    }

    /// Bake-pass draw of a cubemap source, sampling `hdr` on unit 5
    ///
    /// `model` replaces the fixed identity so each face can orient the cube
    /// onto its own sampling directions.
    pub(crate) fn draw_offscreen(
        &mut self,
        ctx: &RenderContext,
        pass: &mut wgpu::RenderPass<'_>,
        camera: &Camera,
        model: Mat4,
        hdr: &Texture,
    ) {
        let mut units = TextureUnits::new();
        hdr.set_active(&mut units, HDR_UNIT);
        write_draw_uniforms(self.program.interface_mut(), model, &Material::empty(), camera, &[]);
        self.program.bind(ctx, pass, &units);
        pass.draw_mesh(&self.mesh);
    }

    fn ensure_on_screen(&self) -> RenderResult<()> {
        if self.kind == DrawableKind::CubemapSource {
            return Err(RenderError::OffscreenOnly);
        }
        Ok(())
    }

    fn submit(
        &mut self,
        ctx: &RenderContext,
        pass: &mut wgpu::RenderPass<'_>,
        material: &Material,
        camera: &Camera,
        units: &TextureUnits,
        lights: &[Light],
    ) {
        let model = self.model_matrix();
        write_draw_uniforms(self.program.interface_mut(), model, material, camera, lights);
        self.program.bind(ctx, pass, units);
        pass.draw_mesh(&self.mesh);
    }
}

/// Writes everything a draw call sends besides textures
///
/// Sampler names are pointed at their standard units, then the material
/// scalars, transforms, camera position and lights are written.
pub fn write_draw_uniforms(
    interface: &mut ProgramInterface,
    model: Mat4,
    material: &Material,
    camera: &Camera,
    lights: &[Light],
) {
    for (unit, name) in MATERIAL_MAPS.iter().enumerate() {
        interface.set_uniform(name, unit as i32);
    }
    interface.set_uniform("hdr", HDR_UNIT as i32);

    interface.set_uniform("materialMetallic", material.metallic_or_default());
    interface.set_uniform("materialRoughness", material.roughness_or_default());

    interface.set_uniform("model", model);
    interface.set_uniform("view", camera.view_matrix());
    interface.set_uniform("projection", camera.projection_matrix());
    interface.set_uniform("cameraPos", camera.position());

    write_lights(&mut interface.uniforms, lights);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::{
        rendering::ProgramConfig,
        resources::uniforms::{UniformLayout, UniformValue},
        scene::frame::default_lights,
    };

    fn pbr_interface() -> ProgramInterface {
        ProgramInterface::new(UniformLayout::standard(), ProgramConfig::pbr().samplers)
    }

    #[test]
    fn test_default_material_writes_default_scalars() {
        let mut interface = pbr_interface();
        let camera = Camera::new(math::vec3(0.0, 0.0, 0.0), 800, 600);

        write_draw_uniforms(&mut interface, Mat4::identity(), &Material::empty(), &camera, &[]);

        assert_eq!(
            interface.uniforms.get("materialMetallic"),
            Some(UniformValue::Float(0.0))
        );
        assert_eq!(
            interface.uniforms.get("materialRoughness"),
            Some(UniformValue::Float(1.0))
        );
        assert_eq!(interface.uniforms.get("lightsCount"), Some(UniformValue::Int(0)));
    }

    #[test]
    fn test_explicit_zero_roughness_reaches_shader() {
        let mut interface = pbr_interface();
        let camera = Camera::new(math::vec3(0.0, 0.0, 0.0), 800, 600);
        let material = Material::empty().with_roughness(0.0).with_metallic(0.7);

        write_draw_uniforms(&mut interface, Mat4::identity(), &material, &camera, &[]);

        assert_eq!(
            interface.uniforms.get("materialRoughness"),
            Some(UniformValue::Float(0.0))
        );
        assert_eq!(
            interface.uniforms.get("materialMetallic"),
            Some(UniformValue::Float(0.7))
        );
    }

    #[test]
    fn test_transforms_camera_and_lights_are_written() {
        let mut interface = pbr_interface();
        let mut camera = Camera::new(math::vec3(1.0, 2.0, 3.0), 800, 600);
        camera.set_rotation(math::vec3(10.0, 20.0, 0.0));
        let model = math::translation_matrix(math::vec3(0.0, 0.0, -2.0));

        write_draw_uniforms(&mut interface, model, &Material::empty(), &camera, &default_lights());

        assert_eq!(interface.uniforms.get("model"), Some(model.into()));
        assert_eq!(interface.uniforms.get("view"), Some(camera.view_matrix().into()));
        assert_eq!(
            interface.uniforms.get("projection"),
            Some(camera.projection_matrix().into())
        );
        assert_eq!(
            interface.uniforms.get("cameraPos"),
            Some(UniformValue::Vec3([1.0, 2.0, 3.0]))
        );
        assert_eq!(interface.uniforms.get("lightsCount"), Some(UniformValue::Int(2)));
    }

    #[test]
    fn test_sampler_names_point_at_standard_units() {
        let mut interface = pbr_interface();
        interface.set_uniform("albedoMap", 6i32);
        interface.set_uniform("hdr", 0i32);
        let camera = Camera::new(math::vec3(0.0, 0.0, 0.0), 800, 600);

        write_draw_uniforms(&mut interface, Mat4::identity(), &Material::empty(), &camera, &[]);

        assert_eq!(interface.sampler_unit("albedoMap"), Some(0));
        assert_eq!(interface.sampler_unit("aoMap"), Some(4));
        assert_eq!(interface.sampler_unit("hdr"), Some(5));
    }

    #[test]
    fn test_fixed_model_kinds() {
        assert!(!DrawableKind::Entity.has_fixed_model());
        assert!(DrawableKind::Skybox.has_fixed_model());
        assert!(DrawableKind::CubemapSource.has_fixed_model());
    }
}
