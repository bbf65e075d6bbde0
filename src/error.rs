//! Error types for the rendering layer

use thiserror::Error;

use crate::gfx::geometry::GeometryError;

/// Errors raised by GPU resource creation, asset loading and the bake pass
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to allocate {what}: {reason}")]
    ResourceAllocation { what: String, reason: String },
    #[error("Cubemap resolution must be greater than zero")]
    InvalidResolution,
    #[error("Vertex buffer holds {len} floats, which is not a whole number of 14-float vertices")]
    MalformedLayout { len: usize },
    #[error("Mesh has no vertices")]
    EmptyMesh,
    #[error("Cubemap sources are only drawn by the bake pass")]
    OffscreenOnly,
    #[error("Failed to read asset '{path}': {source}")]
    Asset {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Image is {width}x{height}, outside the device's 1..={max} texture size")]
    TextureTooLarge { width: u32, height: u32, max: u32 },
    #[error("Failed to decode image '{path}': {reason}")]
    Decode { path: String, reason: String },
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

pub type RenderResult<T> = Result<T, RenderError>;
