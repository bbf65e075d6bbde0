//! Irradiance cubemap bake
//!
//! Renders a cube around the origin six times, once into each face of a
//! half-float cubemap, with a 90° camera turned toward that face. The source
//! program convolves the HDR environment on unit 5.
//!
//! The face rotations are Euler angles in the camera's `Rx·Ry·Rz` convention,
//! which points the Y and Z faces the wrong way and does not match the texel
//! orientation cube sampling expects. Each pass therefore carries a model
//! matrix that maps the rendered view onto the face's sampling directions.

use cgmath::{Matrix, Matrix3, Matrix4};

use super::{render_context::RenderContext, shaders::ShaderSources};
use crate::{
    error::{RenderError, RenderResult},
    gfx::{
        camera::Camera,
        math::{self, Mat4, Vec3},
        resources::{Texture, TextureKind, TextureResource},
        scene::{Drawable, VertexData},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CubeFace {
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
    PositiveZ,
    NegativeZ,
}

impl CubeFace {
    /// Faces in array-layer order
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PositiveX,
        CubeFace::NegativeX,
        CubeFace::PositiveY,
        CubeFace::NegativeY,
        CubeFace::PositiveZ,
        CubeFace::NegativeZ,
    ];

    pub fn layer(self) -> u32 {
        self as u32
    }

    /// Camera rotation in degrees that looks at this face
    pub fn rotation(self) -> Vec3 {
        match self {
            CubeFace::PositiveX => math::vec3(0.0, 90.0, 0.0),
            CubeFace::NegativeX => math::vec3(0.0, -90.0, 0.0),
            CubeFace::PositiveY => math::vec3(90.0, 0.0, 0.0),
            CubeFace::NegativeY => math::vec3(-90.0, 0.0, 0.0),
            CubeFace::PositiveZ => math::vec3(0.0, 0.0, 0.0),
            CubeFace::NegativeZ => math::vec3(0.0, 180.0, 0.0),
        }
    }

    /// `(right, up, forward)` of the face as cube sampling sees it
    ///
    /// The texel at NDC `(x, y)` of this layer is looked up by the direction
    /// `x·right + y·up + forward`.
    pub fn basis(self) -> (Vec3, Vec3, Vec3) {
        let v = math::vec3;
        match self {
            CubeFace::PositiveX => (v(0.0, 0.0, -1.0), v(0.0, 1.0, 0.0), v(1.0, 0.0, 0.0)),
            CubeFace::NegativeX => (v(0.0, 0.0, 1.0), v(0.0, 1.0, 0.0), v(-1.0, 0.0, 0.0)),
            CubeFace::PositiveY => (v(1.0, 0.0, 0.0), v(0.0, 0.0, -1.0), v(0.0, 1.0, 0.0)),
            CubeFace::NegativeY => (v(1.0, 0.0, 0.0), v(0.0, 0.0, 1.0), v(0.0, -1.0, 0.0)),
            CubeFace::PositiveZ => (v(1.0, 0.0, 0.0), v(0.0, 1.0, 0.0), v(0.0, 0.0, 1.0)),
            CubeFace::NegativeZ => (v(-1.0, 0.0, 0.0), v(0.0, 1.0, 0.0), v(0.0, 0.0, -1.0)),
        }
    }

    /// Outward axis of the face
    pub fn axis(self) -> Vec3 {
        self.basis().2
    }

    /// Model matrix for the source cube while this face renders
    ///
    /// With `V` the face camera's rotation and `B = [right | up | -forward]`,
    /// the model is `(B·V)ᵀ`, so the view ray through NDC `(x, y)` meets the
    /// cube at `B·(x, y, -1)`, the direction this texel is sampled with.
    pub fn correction(self) -> Mat4 {
        let (right, up, forward) = self.basis();
        let basis = Matrix4::from(Matrix3::from_cols(right, up, -forward));
        (basis * math::rotation_xyz(self.rotation())).transpose()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BakeState {
    Idle,
    FaceRender(u32),
}

/// Everything one face pass needs
#[derive(Debug, Clone, Copy)]
pub struct FacePass {
    pub face: CubeFace,
    pub camera: Camera,
    /// Model matrix of the source cube, see [`CubeFace::correction`]
    pub model: Mat4,
    pub clear_color: bool,
    pub clear_depth: bool,
}

/// The sequence of face passes of one bake
///
/// Iterating yields the six passes in layer order, then returns to
/// [`BakeState::Idle`].
#[derive(Debug, Clone)]
pub struct CubemapBake {
    resolution: u32,
    state: BakeState,
    next_face: usize,
    camera: Camera,
}

impl CubemapBake {
    pub fn new(resolution: u32) -> RenderResult<Self> {
        if resolution == 0 {
            return Err(RenderError::InvalidResolution);
        }

        Ok(Self {
            resolution,
            state: BakeState::Idle,
            next_face: 0,
            camera: Camera::new(math::vec3(0.0, 0.0, 0.0), resolution, resolution),
        })
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    pub fn state(&self) -> BakeState {
        self.state
    }
}

impl Iterator for CubemapBake {
    type Item = FacePass;

    fn next(&mut self) -> Option<FacePass> {
        let Some(&face) = CubeFace::ALL.get(self.next_face) else {
            self.state = BakeState::Idle;
            return None;
        };

        self.state = BakeState::FaceRender(face.layer());
        self.next_face += 1;
        self.camera.set_rotation(face.rotation());

        Some(FacePass {
            face,
            camera: self.camera,
            model: face.correction(),
            clear_color: true,
            clear_depth: true,
        })
    }
}

/// Bakes irradiance cubemaps from an HDR environment
pub struct CubemapGenerator {
    source: Drawable,
}

impl CubemapGenerator {
    /// Creates the cube source drawable with the given program
    pub fn new(ctx: &RenderContext, vertices: &VertexData, sources: ShaderSources) -> RenderResult<Self> {
        Ok(Self {
            source: Drawable::cubemap_source(ctx, vertices, sources)?,
        })
    }

    /// Renders all six faces at `resolution` and returns the cubemap
    ///
    /// Each face is submitted on its own so the per-face uniforms are applied
    /// in order. Mip levels are generated once every face is written.
    pub fn bake(&mut self, ctx: &RenderContext, hdr: &Texture, resolution: u32) -> RenderResult<Texture> {
        let plan = CubemapBake::new(resolution)?;

        let depth = ctx.allocate("bake depth target", |device| {
            TextureResource::create_depth_texture(
                device,
                resolution,
                resolution,
                TextureResource::BAKE_DEPTH_FORMAT,
                "Cubemap Bake Depth",
            )
        })?;
        let cubemap = ctx.allocate("irradiance cubemap", |device| {
            TextureResource::create_cubemap(device, resolution)
        })?;

        log::info!("Baking {}x{} irradiance cubemap", resolution, resolution);

        for pass in plan {
            let face_view = cubemap.face_view(pass.face.layer());
            let mut encoder = ctx
                .device()
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Cubemap Face Encoder"),
                });

            {
                let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Cubemap Face Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &face_view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: if pass.clear_color {
                                wgpu::LoadOp::Clear(wgpu::Color::BLACK)
                            } else {
                                wgpu::LoadOp::Load
                            },
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                        view: &depth.view,
                        depth_ops: Some(wgpu::Operations {
                            load: if pass.clear_depth {
                                wgpu::LoadOp::Clear(1.0)
                            } else {
                                wgpu::LoadOp::Load
                            },
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }),
                    occlusion_query_set: None,
                    timestamp_writes: None,
                });

                self.source
                    .draw_offscreen(ctx, &mut render_pass, &pass.camera, pass.model, hdr);
            }

            ctx.queue().submit(std::iter::once(encoder.finish()));
            log::debug!("Baked cubemap face {:?}", pass.face);
        }

        ctx.mipmaps()
            .generate(ctx.device(), ctx.queue(), &cubemap.texture);

        Ok(Texture::adopt(cubemap, TextureKind::Cube))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{InnerSpace, SquareMatrix};

    #[test]
    fn test_bake_yields_six_clearing_passes() {
        let passes: Vec<FacePass> = CubemapBake::new(35).unwrap().collect();

        assert_eq!(passes.len(), 6);
        for (i, pass) in passes.iter().enumerate() {
            assert_eq!(pass.face.layer(), i as u32);
            assert!(pass.clear_color);
            assert!(pass.clear_depth);
        }
    }

    #[test]
    fn test_face_rotations() {
        let rotations: Vec<Vec3> = CubemapBake::new(8)
            .unwrap()
            .map(|pass| pass.camera.rotation())
            .collect();

        assert_eq!(
            rotations,
            vec![
                math::vec3(0.0, 90.0, 0.0),
                math::vec3(0.0, -90.0, 0.0),
                math::vec3(90.0, 0.0, 0.0),
                math::vec3(-90.0, 0.0, 0.0),
                math::vec3(0.0, 0.0, 0.0),
                math::vec3(0.0, 180.0, 0.0),
            ]
        );
    }

    #[test]
    fn test_state_machine_returns_to_idle() {
        let mut bake = CubemapBake::new(4).unwrap();
        assert_eq!(bake.state(), BakeState::Idle);

        bake.next();
        assert_eq!(bake.state(), BakeState::FaceRender(0));
        for _ in 0..5 {
            bake.next();
        }
        assert_eq!(bake.state(), BakeState::FaceRender(5));

        assert!(bake.next().is_none());
        assert_eq!(bake.state(), BakeState::Idle);
        assert!(bake.next().is_none());
    }

    /// Cube-local direction the bake writes at NDC `(x, y)` of a pass
    fn written_direction(pass: &FacePass, x: f32, y: f32) -> Vec3 {
        let view = pass.camera.view_matrix();
        let ray = view.invert().unwrap() * cgmath::Vector4::new(x, y, -1.0, 0.0);
        (pass.model.invert().unwrap() * ray).truncate()
    }

    fn assert_vec3_eq(a: Vec3, b: Vec3, face: CubeFace) {
        assert!((a - b).magnitude() < 1e-5, "{:?}: {:?} != {:?}", face, a, b);
    }

    #[test]
    fn test_each_pass_writes_its_own_face() {
        for pass in CubemapBake::new(16).unwrap() {
            let (right, up, forward) = pass.face.basis();
            assert_vec3_eq(written_direction(&pass, 0.0, 0.0), pass.face.axis(), pass.face);
            assert_vec3_eq(written_direction(&pass, 1.0, 0.0), forward + right, pass.face);
            assert_vec3_eq(written_direction(&pass, 0.0, 1.0), forward + up, pass.face);
        }
    }

    #[test]
    fn test_face_bases_tile_the_cube() {
        let axes: Vec<Vec3> = CubeFace::ALL.iter().map(|face| face.axis()).collect();
        assert_eq!(
            axes,
            vec![
                math::vec3(1.0, 0.0, 0.0),
                math::vec3(-1.0, 0.0, 0.0),
                math::vec3(0.0, 1.0, 0.0),
                math::vec3(0.0, -1.0, 0.0),
                math::vec3(0.0, 0.0, 1.0),
                math::vec3(0.0, 0.0, -1.0),
            ]
        );
        for face in CubeFace::ALL {
            let (right, up, forward) = face.basis();
            // Cube faces are mirrored frames: right × up is the outward axis
            assert_vec3_eq(right.cross(up), forward, face);
        }
    }

    #[test]
    fn test_bake_camera_is_square_at_origin() {
        let pass = CubemapBake::new(35).unwrap().next().unwrap();
        assert_eq!(pass.camera.position(), math::vec3(0.0, 0.0, 0.0));
        assert_eq!(pass.camera.aspect(), 1.0);
    }

    #[test]
    fn test_zero_resolution_is_rejected() {
        assert!(matches!(
            CubemapBake::new(0),
            Err(RenderError::InvalidResolution)
        ));
    }

    #[test]
    fn test_bake_target_descriptor() {
        let bake = CubemapBake::new(35).unwrap();
        let desc = TextureResource::cubemap_descriptor(bake.resolution());
        assert_eq!(desc.size.depth_or_array_layers, 6);
        assert_eq!(desc.format, wgpu::TextureFormat::Rgba16Float);
        assert!(desc.mip_level_count > 1);
    }
}
