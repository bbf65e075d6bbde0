//! Interactive viewer: a PBR cube on a textured plane, lit by two point lights
//! and an irradiance map baked from an HDR environment.

use std::{
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::Context;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::{
    assets::{AssetSource, FileSystemSource},
    error::RenderResult,
    gfx::{
        camera::{Camera, FlyController, InputMap},
        geometry::{generate_cube, generate_plane, load_vertex_data, GeometryError, GeometryLayout},
        math,
        rendering::{shaders, CubemapGenerator, RenderContext, RenderEngine},
        resources::{Material, MaterialParams, Texture},
        scene::{frame::default_lights, Drawable, FrameContext, Light, VertexData},
    },
};

const HDR_PATH: &str = "resources/HDR/attic.hdr";

/// Viewer settings
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Directory geometry lists and textures are read from
    pub asset_root: PathBuf,
    /// Edge length of each irradiance cubemap face
    pub irradiance_resolution: u32,
    /// Ticks per second
    pub tick_rate: u32,
    pub lights: Vec<Light>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "Lumen".to_string(),
            width: 1200,
            height: 800,
            asset_root: PathBuf::from("assets"),
            irradiance_resolution: 35,
            tick_rate: 60,
            lights: default_lights(),
        }
    }
}

impl ViewerConfig {
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_asset_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.asset_root = root.into();
        self
    }

    pub fn with_irradiance_resolution(mut self, resolution: u32) -> Self {
        self.irradiance_resolution = resolution;
        self
    }

    pub fn with_tick_rate(mut self, tick_rate: u32) -> Self {
        self.tick_rate = tick_rate;
        self
    }

    pub fn with_lights(mut self, lights: Vec<Light>) -> Self {
        self.lights = lights;
        self
    }

    /// Time between two ticks
    pub fn tick_period(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / self.tick_rate.max(1) as u64)
    }
}

pub struct Viewer {
    config: ViewerConfig,
}

impl Viewer {
    pub fn new(config: ViewerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Opens the window and runs until it is closed or Escape is pressed
    pub fn run(self) -> anyhow::Result<()> {
        let event_loop = EventLoop::new().context("Failed to create event loop")?;
        let mut state = ViewerState::new(self.config);

        event_loop
            .run_app(&mut state)
            .context("Event loop terminated abnormally")?;

        match state.error.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

/// Surface maps of one material
struct MaterialTextures {
    albedo: Texture,
    roughness: Texture,
    normal: Texture,
    displacement: Texture,
}

impl MaterialTextures {
    fn load(ctx: &RenderContext, source: &Arc<dyn AssetSource>, paths: [&str; 4]) -> RenderResult<Self> {
        let [albedo, roughness, normal, displacement] = paths;
        Ok(Self {
            albedo: Texture::load(ctx, source.clone(), albedo, true)?,
            roughness: Texture::load(ctx, source.clone(), roughness, false)?,
            normal: Texture::load(ctx, source.clone(), normal, false)?,
            displacement: Texture::load(ctx, source.clone(), displacement, false)?,
        })
    }

    fn update(&mut self, ctx: &RenderContext) -> RenderResult<()> {
        for texture in [
            &mut self.albedo,
            &mut self.roughness,
            &mut self.normal,
            &mut self.displacement,
        ] {
            texture.update(ctx)?;
        }
        Ok(())
    }

    fn material<'a>(&'a self, ao: &'a Texture) -> Material<'a> {
        Material::empty()
            .with_albedo_map(&self.albedo)
            .with_roughness_map(&self.roughness)
            .with_normal_map(&self.normal)
            .with_displacement_map(&self.displacement)
            .with_ao_map(ao)
    }
}

struct Scene {
    camera: Camera,
    cube: Drawable,
    plane: Drawable,
    skybox: Drawable,
    generator: CubemapGenerator,
    hdr: Texture,
    irradiance: Texture,
    pavement: MaterialTextures,
    rock: MaterialTextures,
    ao: Texture,
}

impl Scene {
    fn load(ctx: &RenderContext, config: &ViewerConfig) -> RenderResult<Self> {
        let source: Arc<dyn AssetSource> = Arc::new(FileSystemSource::new(&config.asset_root));

        let cube_data = load_geometry(source.as_ref(), "coords/cube.txt", generate_cube)?;
        let plane_data = load_geometry(source.as_ref(), "coords/plane.txt", || {
            generate_plane(10.0, 10.0, -1.0, 4.0)
        })?;

        let position = math::vec3(0.0, 0.0, -2.0);
        let cube = Drawable::entity(ctx, "Cube", &cube_data, shaders::PBR, position)?;
        let plane = Drawable::entity(ctx, "Plane", &plane_data, shaders::PBR, position)?;
        let skybox = Drawable::skybox(ctx, &cube_data, shaders::SKYBOX)?;
        let mut generator = CubemapGenerator::new(ctx, &cube_data, shaders::IRRADIANCE)?;

        let hdr = Texture::load(ctx, source.clone(), HDR_PATH, false)?;
        // Baked from the placeholder until the HDR decode lands
        let irradiance = generator.bake(ctx, &hdr, config.irradiance_resolution)?;

        let pavement = MaterialTextures::load(
            ctx,
            &source,
            [
                "resources/pavement/diffuse.jpg",
                "resources/pavement/roughness.jpg",
                "resources/pavement/normal.jpg",
                "resources/pavement/displacement.jpg",
            ],
        )?;
        let rock = MaterialTextures::load(
            ctx,
            &source,
            [
                "resources/rockDiffuse.jpg",
                "resources/rockRoughness.png",
                "resources/rockNormal.png",
                "resources/rockDisplacement.png",
            ],
        )?;
        let ao = Texture::load(ctx, source, "resources/pavement/ao.jpg", false)?;

        Ok(Self {
            camera: Camera::new(math::vec3(0.0, 0.0, 0.0), config.width, config.height),
            cube,
            plane,
            skybox,
            generator,
            hdr,
            irradiance,
            pavement,
            rock,
            ao,
        })
    }

    /// Uploads finished decodes and re-bakes the irradiance map once the HDR
    /// image is in
    fn update_textures(&mut self, ctx: &RenderContext, resolution: u32) -> RenderResult<()> {
        if self.hdr.update(ctx)? {
            self.irradiance = self.generator.bake(ctx, &self.hdr, resolution)?;
        }
        self.pavement.update(ctx)?;
        self.rock.update(ctx)?;
        self.ao.update(ctx)?;
        Ok(())
    }

    /// Entities first, then the skybox
    fn draw(
        &mut self,
        ctx: &RenderContext,
        pass: &mut wgpu::RenderPass<'_>,
        frame: &FrameContext,
    ) -> RenderResult<()> {
        let (rock, pavement) = live_materials(
            self.rock.material(&self.ao),
            self.pavement.material(&self.ao),
            &frame.params,
        );

        self.cube
            .draw(ctx, pass, &rock, &self.camera, &self.irradiance, &frame.lights)?;
        self.plane
            .draw(ctx, pass, &pavement, &self.camera, &self.irradiance, &frame.lights)?;
        self.skybox.draw_skybox(
            ctx,
            pass,
            &self.camera,
            &self.hdr,
            &self.irradiance,
            &frame.lights,
        )
    }
}

/// Keyboard-adjusted scalars apply to the plane only; the cube keeps the
/// material defaults
fn live_materials<'a>(
    cube: Material<'a>,
    plane: Material<'a>,
    params: &MaterialParams,
) -> (Material<'a>, Material<'a>) {
    (cube, plane.with_params(params))
}

/// Reads a coordinate list, falling back to a built-in primitive
fn load_geometry(
    source: &dyn AssetSource,
    path: &str,
    fallback: impl FnOnce() -> Result<VertexData, GeometryError>,
) -> RenderResult<VertexData> {
    match load_vertex_data(source, path, GeometryLayout::Interleaved) {
        Ok(data) => Ok(data),
        Err(e) => {
            log::warn!("Using built-in geometry for '{}': {}", path, e);
            Ok(fallback()?)
        }
    }
}

struct ViewerState {
    config: ViewerConfig,
    window: Option<Arc<Window>>,
    engine: Option<RenderEngine>,
    scene: Option<Scene>,
    frame: FrameContext,
    input: InputMap,
    controller: FlyController,
    next_tick: Instant,
    error: Option<anyhow::Error>,
}

impl ViewerState {
    fn new(config: ViewerConfig) -> Self {
        let frame = FrameContext::new(config.lights.clone());
        Self {
            config,
            window: None,
            engine: None,
            scene: None,
            frame,
            input: InputMap::new(),
            controller: FlyController::default(),
            next_tick: Instant::now(),
            error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let attributes = WindowAttributes::default()
            .with_title(self.config.title.clone())
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height));
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .context("Failed to create window")?,
        );

        let (width, height) = window.inner_size().into();
        let engine = pollster::block_on(RenderEngine::new(window.clone(), width, height))
            .context("Failed to initialize renderer")?;
        let scene = Scene::load(engine.context(), &self.config).context("Failed to load scene")?;

        self.window = Some(window);
        self.engine = Some(engine);
        self.scene = Some(scene);
        self.next_tick = Instant::now();
        Ok(())
    }

    /// Input, then texture updates, then draws
    fn tick(&mut self) -> anyhow::Result<()> {
        let (Some(engine), Some(scene)) = (self.engine.as_mut(), self.scene.as_mut()) else {
            return Ok(());
        };

        self.controller
            .apply(&self.input, &mut scene.camera, &mut self.frame.params);

        scene
            .update_textures(engine.context(), self.config.irradiance_resolution)
            .context("Failed to update textures")?;

        let frame = &self.frame;
        engine
            .render_frame(|ctx, pass| scene.draw(ctx, pass, frame))
            .context("Failed to render frame")?;
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{:#}", error);
        self.error = Some(error);
        event_loop.exit();
    }
}

impl ApplicationHandler for ViewerState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(error) = self.init(event_loop) {
            self.fail(event_loop, error);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if event.physical_key == PhysicalKey::Code(KeyCode::Escape) {
                    event_loop.exit();
                    return;
                }
                self.input.process_keyboard_event(&event);
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                if let Some(engine) = self.engine.as_mut() {
                    if let Err(error) = engine.resize(width, height) {
                        self.fail(event_loop, error.into());
                    }
                }
            }
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                if let Err(error) = self.tick() {
                    self.fail(event_loop, error);
                }
            }
            _ => (),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        if now >= self.next_tick {
            if let Some(window) = self.window.as_ref() {
                window.request_redraw();
            }
            self.next_tick += self.config.tick_period();
            // Do not try to catch up after a stall
            if self.next_tick < now {
                self.next_tick = now + self.config.tick_period();
            }
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_tick));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ViewerConfig::default();
        assert_eq!(config.irradiance_resolution, 35);
        assert_eq!(config.tick_rate, 60);
        assert_eq!(config.asset_root, PathBuf::from("assets"));
        assert_eq!(config.lights, default_lights());
    }

    #[test]
    fn test_tick_period_follows_rate() {
        let config = ViewerConfig::default().with_tick_rate(50);
        assert_eq!(config.tick_period(), Duration::from_millis(20));

        // A zero rate is treated as one tick per second
        let config = ViewerConfig::default().with_tick_rate(0);
        assert_eq!(config.tick_period(), Duration::from_secs(1));
    }

    #[test]
    fn test_builders() {
        let config = ViewerConfig::default()
            .with_window_size(640, 480)
            .with_asset_root("data")
            .with_irradiance_resolution(64)
            .with_lights(vec![]);

        assert_eq!((config.width, config.height), (640, 480));
        assert_eq!(config.asset_root, PathBuf::from("data"));
        assert_eq!(config.irradiance_resolution, 64);
        assert!(config.lights.is_empty());
    }

    #[test]
    fn test_live_params_only_reach_the_plane() {
        let params = MaterialParams {
            metallic: 0.75,
            roughness: 0.0,
        };
        let (cube, plane) = live_materials(Material::empty(), Material::empty(), &params);

        assert_eq!(cube.metallic_or_default(), 0.0);
        assert_eq!(cube.roughness_or_default(), 1.0);
        assert_eq!(plane.metallic_or_default(), 0.75);
        assert_eq!(plane.roughness_or_default(), 0.0);
    }

    #[test]
    fn test_missing_geometry_falls_back() {
        let source = crate::assets::MemorySource::new();
        let data = load_geometry(&source, "coords/cube.txt", generate_cube).unwrap();
        assert_eq!(data.vertex_count(), 36);
    }
}
