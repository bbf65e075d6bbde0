//! Texture resource management for wgpu
//!
//! Provides utilities for creating GPU textures, views, and samplers: depth
//! targets, 1×1 placeholders, decoded images with a full mip chain, and
//! renderable cubemaps for the bake pass.

use half::f16;

use super::decode::{DecodedImage, Pixels};
use crate::error::{RenderError, RenderResult};

/// Sampling dimension of a texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureKind {
    /// 2D image
    Flat,
    /// Six-layer cube map
    Cube,
}

impl TextureKind {
    pub fn view_dimension(self) -> wgpu::TextureViewDimension {
        match self {
            TextureKind::Flat => wgpu::TextureViewDimension::D2,
            TextureKind::Cube => wgpu::TextureViewDimension::Cube,
        }
    }

    pub fn layer_count(self) -> u32 {
        match self {
            TextureKind::Flat => 1,
            TextureKind::Cube => 6,
        }
    }
}

/// Checks that an image fits a 2D texture on a device allowing `max_dimension`
pub fn check_texture_size(width: u32, height: u32, max_dimension: u32) -> RenderResult<()> {
    if width == 0 || height == 0 || width > max_dimension || height > max_dimension {
        return Err(RenderError::TextureTooLarge {
            width,
            height,
            max: max_dimension,
        });
    }
    Ok(())
}

/// Number of mip levels in a full chain for the given size
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

/// GPU texture resource containing texture, view, and sampler
///
/// Bundles the three main components needed for texture operations:
/// - Texture: The actual GPU memory allocation
/// - View: Interface for shader access
/// - Sampler: Filtering and addressing configuration
#[derive(Debug, Clone)]
pub struct TextureResource {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl TextureResource {
    /// Depth format of the main color pass
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Depth format of the cubemap bake target
    pub const BAKE_DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

    /// Color format of baked cubemaps, wide enough for HDR irradiance
    pub const CUBEMAP_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

    /// Opaque blue shown until a decode lands
    pub const PLACEHOLDER_PIXEL: [u8; 4] = [0, 0, 255, 255];

    /// Creates a depth texture of the given size
    ///
    /// # Arguments
    /// * `device` - WGPU device for creating resources
    /// * `width` - Width in pixels
    /// * `height` - Height in pixels
    /// * `format` - One of the depth formats above
    /// * `label` - Debug label for the texture
    pub fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
        label: &str,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            compare: Some(wgpu::CompareFunction::LessEqual),
            lod_min_clamp: 0.0,
            lod_max_clamp: 100.0,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Sampler for LDR images: repeat wrapping, trilinear filtering
    pub fn image_sampler_descriptor() -> wgpu::SamplerDescriptor<'static> {
        wgpu::SamplerDescriptor {
            label: Some("Image Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        }
    }

    /// Sampler for a loaded HDR environment: plain linear, mips not sampled
    pub fn hdr_sampler_descriptor() -> wgpu::SamplerDescriptor<'static> {
        wgpu::SamplerDescriptor {
            label: Some("HDR Sampler"),
            mipmap_filter: wgpu::FilterMode::Nearest,
            lod_max_clamp: 0.0,
            ..Self::image_sampler_descriptor()
        }
    }

    /// Sampler for baked cubemaps: clamp to edge on all axes, trilinear
    pub fn cubemap_sampler_descriptor() -> wgpu::SamplerDescriptor<'static> {
        wgpu::SamplerDescriptor {
            label: Some("Cubemap Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        }
    }

    /// Descriptor of a renderable, mipmapped `resolution × resolution` cubemap
    pub fn cubemap_descriptor(resolution: u32) -> wgpu::TextureDescriptor<'static> {
        wgpu::TextureDescriptor {
            label: Some("Baked Cubemap"),
            size: wgpu::Extent3d {
                width: resolution,
                height: resolution,
                depth_or_array_layers: 6,
            },
            mip_level_count: mip_level_count(resolution, resolution),
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::CUBEMAP_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        }
    }

    /// Allocates all six faces of a cubemap up front
    pub fn create_cubemap(device: &wgpu::Device, resolution: u32) -> Self {
        let texture = device.create_texture(&Self::cubemap_descriptor(resolution));
        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Baked Cubemap View"),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });
        let sampler = device.create_sampler(&Self::cubemap_sampler_descriptor());

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Single-layer, single-mip view of one cube face, used as a color target
    pub fn face_view(&self, layer: u32) -> wgpu::TextureView {
        self.texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Cubemap Face View"),
            dimension: Some(wgpu::TextureViewDimension::D2),
            base_mip_level: 0,
            mip_level_count: Some(1),
            base_array_layer: layer,
            array_layer_count: Some(1),
            ..Default::default()
        })
    }

    /// Creates a 1×1 texture holding the placeholder pixel
    ///
    /// Cube placeholders repeat the pixel on all six layers. Half-float formats
    /// receive the same color as `f16` components.
    pub fn create_placeholder(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        format: wgpu::TextureFormat,
        kind: TextureKind,
        sampler: &wgpu::SamplerDescriptor,
        label: &str,
    ) -> Self {
        let pixels = match format {
            wgpu::TextureFormat::Rgba16Float => {
                let components = Self::PLACEHOLDER_PIXEL.map(|c| f16::from_f32(c as f32 / 255.0));
                Pixels::Rgba16Float(components.to_vec())
            }
            _ => Pixels::Rgba8(Self::PLACEHOLDER_PIXEL.to_vec()),
        };
        let image = DecodedImage {
            width: 1,
            height: 1,
            pixels,
        };

        let layers = kind.layer_count();
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: layers,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for layer in 0..layers {
            write_level_zero(queue, &texture, &image, layer);
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(label),
            dimension: Some(kind.view_dimension()),
            ..Default::default()
        });
        let sampler = device.create_sampler(sampler);

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Creates a 2D texture from decoded pixels with room for a full mip chain
    ///
    /// Only level 0 is written; the caller generates the remaining levels.
    pub fn create_from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &DecodedImage,
        format: wgpu::TextureFormat,
        sampler: &wgpu::SamplerDescriptor,
        label: &str,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: image.width,
                height: image.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: mip_level_count(image.width, image.height),
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST
                | wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        write_level_zero(queue, &texture, image, 0);

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(sampler);

        Self {
            texture,
            view,
            sampler,
        }
    }
}

fn write_level_zero(queue: &wgpu::Queue, texture: &wgpu::Texture, image: &DecodedImage, layer: u32) {
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d {
                x: 0,
                y: 0,
                z: layer,
            },
            aspect: wgpu::TextureAspect::All,
        },
        image.bytes(),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(image.bytes_per_pixel() * image.width),
            rows_per_image: Some(image.height),
        },
        wgpu::Extent3d {
            width: image.width,
            height: image.height,
            depth_or_array_layers: 1,
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mip_level_count() {
        assert_eq!(mip_level_count(1, 1), 1);
        assert_eq!(mip_level_count(35, 35), 6);
        assert_eq!(mip_level_count(1024, 512), 11);
        assert_eq!(mip_level_count(0, 0), 1);
    }

    #[test]
    fn test_texture_size_must_fit_device_limit() {
        assert!(check_texture_size(4096, 2048, 4096).is_ok());
        assert!(check_texture_size(1, 1, 4096).is_ok());
        assert!(matches!(
            check_texture_size(8192, 4096, 4096),
            Err(RenderError::TextureTooLarge {
                width: 8192,
                height: 4096,
                max: 4096
            })
        ));
        assert!(check_texture_size(16, 4097, 4096).is_err());
        assert!(check_texture_size(0, 16, 4096).is_err());
    }

    #[test]
    fn test_cubemap_descriptor_declares_six_square_faces() {
        let desc = TextureResource::cubemap_descriptor(35);
        assert_eq!(desc.size.width, 35);
        assert_eq!(desc.size.height, 35);
        assert_eq!(desc.size.depth_or_array_layers, 6);
        assert_eq!(desc.mip_level_count, 6);
        assert_eq!(desc.format, wgpu::TextureFormat::Rgba16Float);
        assert!(desc.usage.contains(wgpu::TextureUsages::RENDER_ATTACHMENT));
        assert!(desc.usage.contains(wgpu::TextureUsages::TEXTURE_BINDING));
    }

    #[test]
    fn test_cubemap_sampler_clamps_and_filters_trilinearly() {
        let desc = TextureResource::cubemap_sampler_descriptor();
        assert_eq!(desc.address_mode_u, wgpu::AddressMode::ClampToEdge);
        assert_eq!(desc.address_mode_v, wgpu::AddressMode::ClampToEdge);
        assert_eq!(desc.address_mode_w, wgpu::AddressMode::ClampToEdge);
        assert_eq!(desc.min_filter, wgpu::FilterMode::Linear);
        assert_eq!(desc.mipmap_filter, wgpu::FilterMode::Linear);
    }

    #[test]
    fn test_hdr_sampler_stops_sampling_mips() {
        let desc = TextureResource::hdr_sampler_descriptor();
        assert_eq!(desc.min_filter, wgpu::FilterMode::Linear);
        assert_eq!(desc.mipmap_filter, wgpu::FilterMode::Nearest);
        assert_eq!(desc.lod_max_clamp, 0.0);
        assert_eq!(desc.address_mode_u, wgpu::AddressMode::Repeat);
    }

    #[test]
    fn test_cube_kind_has_six_layers() {
        assert_eq!(TextureKind::Cube.layer_count(), 6);
        assert_eq!(TextureKind::Flat.layer_count(), 1);
        assert_eq!(
            TextureKind::Cube.view_dimension(),
            wgpu::TextureViewDimension::Cube
        );
    }
}
