//! # Scene Module
//!
//! Everything that ends up in a draw call: vertex data and meshes, drawables
//! and the per-tick frame state.
//!
//! ## Key Components
//!
//! - [`Drawable`] - A mesh, a shader program and a placement, tagged by [`DrawableKind`]
//! - [`Mesh`] - One GPU vertex buffer drawn as a non-indexed triangle list
//! - [`VertexData`] - CPU-side 14-float vertices
//! - [`FrameContext`] - Lights and live material scalars for the current tick

pub mod drawable;
pub mod frame;
pub mod mesh;
pub mod vertex;

// Re-export main types
pub use drawable::{Drawable, DrawableKind};
pub use frame::{FrameContext, Light};
pub use mesh::{DrawMesh, Mesh, VertexData};
pub use vertex::Vertex;
