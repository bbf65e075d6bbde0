// src/lib.rs
//! Lumen Rendering Layer
//!
//! GPU resource wrappers, a drawable/material model and an irradiance cubemap
//! bake pass, built on wgpu and winit.

pub mod app;
pub mod assets;
pub mod error;
pub mod gfx;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::{Viewer, ViewerConfig};
pub use error::{RenderError, RenderResult};

/// Creates a viewer with the default configuration
pub fn default() -> Viewer {
    Viewer::new(ViewerConfig::default())
}
