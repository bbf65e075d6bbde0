//! # Graphics Module
//!
//! GPU resource wrappers and the drawable model for the Lumen rendering layer.
//!
//! ## Architecture Overview
//!
//! - **Math** ([`math`]) - `Vec3`/`Mat4` aliases and view/projection builders
//! - **Camera System** ([`camera`]) - Euler fly camera and keyboard controls
//! - **Geometry** ([`geometry`]) - Coordinate list parsing and built-in primitives
//! - **Resource Management** ([`resources`]) - Textures, decoding, mipmaps, uniforms, materials
//! - **Rendering** ([`rendering`]) - Device context, shader programs, the cubemap bake pass
//! - **Scene** ([`scene`]) - Vertex data, meshes, drawables and per-frame context
//!
//! ## Usage
//!
//! ```no_run
//! use lumen::gfx::{camera::Camera, math::vec3};
//!
//! let mut camera = Camera::new(vec3(0.0, 0.0, 0.0), 1200, 800);
//! camera.move_relative_to_facing(vec3(0.0, 0.0, 0.04));
//! let view = camera.view_matrix();
//! ```

pub mod camera;
pub mod geometry;
pub mod math;
pub mod rendering;
pub mod resources;
pub mod scene;

// Re-export commonly used types
pub use camera::Camera;
pub use rendering::{CubemapGenerator, RenderContext, ShaderProgram};
pub use resources::{Material, Texture};
pub use scene::{Drawable, DrawableKind, Mesh};
