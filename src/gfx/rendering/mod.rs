// src/gfx/rendering/mod.rs
//! Core rendering functionality
//!
//! Handles the GPU context, shader programs, the irradiance bake, and frame
//! rendering.

pub mod cubemap_generator;
pub mod render_context;
pub mod render_engine;
pub mod shader_program;
pub mod shaders;

// Re-export main types
pub use cubemap_generator::CubemapGenerator;
pub use render_context::RenderContext;
pub use render_engine::RenderEngine;
pub use shader_program::{ProgramConfig, ShaderProgram};
