// src/gfx/resources/mod.rs
//! GPU resource management
//!
//! Handles textures, materials, uniforms, and image decoding for rendering.

pub mod decode;
pub mod material;
pub mod mipmap;
pub mod texture;
pub mod texture_resource;
pub mod uniforms;

// Re-export main types
pub use material::{Material, MaterialParams};
pub use texture::{LoadState, Texture, TextureUnits};
pub use texture_resource::{TextureKind, TextureResource};
pub use uniforms::{ProgramInterface, UniformValue};
