//! # Vertex Data Structures
//!
//! GPU vertex format shared by every mesh: 14 floats per vertex.

/// Number of `f32` components in one [`Vertex`]
pub const FLOATS_PER_VERTEX: usize = 14;

/// A vertex with the full tangent frame and one UV set.
///
/// # Memory Layout
///
/// The `#[repr(C)]` attribute ensures the struct has a C-compatible memory
/// layout, which is required for GPU buffer operations.
///
/// # Examples
///
/// ```no_run
/// use lumen::gfx::scene::vertex::Vertex;
///
/// let vertex = Vertex {
///     position: [0.0, 1.0, 0.0],
///     normal: [0.0, 0.0, 1.0],
///     tangent: [1.0, 0.0, 0.0],
///     bitangent: [0.0, 1.0, 0.0],
///     uv: [0.0, 1.0],
/// };
/// ```
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tangent: [f32; 3],
    pub bitangent: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    /// Returns the vertex buffer layout for wgpu rendering.
    ///
    /// - Attribute 0: position (Float32x3) at offset 0
    /// - Attribute 1: normal (Float32x3) at offset 12
    /// - Attribute 2: tangent (Float32x3) at offset 24
    /// - Attribute 3: bitangent (Float32x3) at offset 36
    /// - Attribute 4: uv (Float32x2) at offset 48
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
            0 => Float32x3,
            1 => Float32x3,
            2 => Float32x3,
            3 => Float32x3,
            4 => Float32x2,
        ];

        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_matches_fourteen_float_records() {
        assert_eq!(std::mem::size_of::<Vertex>(), FLOATS_PER_VERTEX * 4);

        let desc = Vertex::desc();
        assert_eq!(desc.array_stride, 56);
        let offsets: Vec<u64> = desc.attributes.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![0, 12, 24, 36, 48]);
        let locations: Vec<u32> = desc.attributes.iter().map(|a| a.shader_location).collect();
        assert_eq!(locations, vec![0, 1, 2, 3, 4]);
    }
}
