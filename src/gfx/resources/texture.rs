//! Textures and texture units
//!
//! A [`Texture`] is usable as soon as it exists: loads start out as a 1×1
//! placeholder and the decoded image replaces it on a later
//! [`Texture::update`]. Binding goes through [`TextureUnits`], a per-draw table
//! of numbered slots that programs read their samplers from.

use std::sync::Arc;

use super::{
    decode::{DecodePath, PendingDecode},
    texture_resource::{check_texture_size, TextureKind, TextureResource},
};
use crate::{assets::AssetSource, error::RenderResult, gfx::rendering::RenderContext};

/// Number of texture units a draw can bind
pub const TEXTURE_UNITS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// Decode still running; the placeholder is bound
    Pending,
    Ready,
    /// Decode failed; the placeholder stays bound
    Failed,
}

#[derive(Debug)]
pub struct Texture {
    resource: TextureResource,
    kind: TextureKind,
    format: wgpu::TextureFormat,
    decode_path: Option<DecodePath>,
    pending: Option<PendingDecode>,
    state: LoadState,
}

impl Texture {
    /// Wraps an existing GPU texture, e.g. the output of a bake
    pub fn adopt(resource: TextureResource, kind: TextureKind) -> Self {
        let format = resource.texture.format();
        Self {
            resource,
            kind,
            format,
            decode_path: None,
            pending: None,
            state: LoadState::Ready,
        }
    }

    /// Starts loading an image and returns a placeholder-backed texture
    ///
    /// Paths ending in `.hdr` decode to half-float and ignore `gamma_correct`.
    /// Everything else decodes to 8-bit RGBA, sRGB when `gamma_correct` is set.
    pub fn load(
        ctx: &RenderContext,
        source: Arc<dyn AssetSource>,
        path: &str,
        gamma_correct: bool,
    ) -> RenderResult<Self> {
        let decode_path = DecodePath::from_path(path);
        let format = decode_path.texture_format(gamma_correct);

        let resource = ctx.allocate("texture placeholder", |device| {
            TextureResource::create_placeholder(
                device,
                ctx.queue(),
                format,
                TextureKind::Flat,
                &TextureResource::image_sampler_descriptor(),
                path,
            )
        })?;

        log::debug!("Loading texture '{}' as {:?}", path, format);

        Ok(Self {
            resource,
            kind: TextureKind::Flat,
            format,
            decode_path: Some(decode_path),
            pending: Some(PendingDecode::spawn(source, path, decode_path)),
            state: LoadState::Pending,
        })
    }

    /// Uploads a finished decode, if there is one
    ///
    /// Returns `Ok(true)` when the GPU texture was replaced this call. Failed
    /// decodes and uploads, oversized images included, are logged and leave
    /// the placeholder in place.
    pub fn update(&mut self, ctx: &RenderContext) -> RenderResult<bool> {
        let Some(pending) = self.pending.as_mut() else {
            return Ok(false);
        };
        let Some(result) = pending.try_take() else {
            return Ok(false);
        };
        let path = pending.path().to_string();
        self.pending = None;

        let image = match result.and_then(|image| {
            check_texture_size(image.width, image.height, ctx.max_texture_dimension())?;
            Ok(image)
        }) {
            Ok(image) => image,
            Err(e) => {
                log::error!("Failed to load texture '{}': {}", path, e);
                self.state = LoadState::Failed;
                return Ok(false);
            }
        };

        let sampler = match self.decode_path {
            Some(DecodePath::Radiance) => TextureResource::hdr_sampler_descriptor(),
            _ => TextureResource::image_sampler_descriptor(),
        };

        let upload = ctx.allocate("texture upload", |device| {
            TextureResource::create_from_image(device, ctx.queue(), &image, self.format, &sampler, &path)
        });
        let resource = match upload {
            Ok(resource) => resource,
            Err(e) => {
                log::error!("Failed to upload texture '{}': {}", path, e);
                self.state = LoadState::Failed;
                return Ok(false);
            }
        };
        ctx.mipmaps()
            .generate(ctx.device(), ctx.queue(), &resource.texture);

        self.resource = resource;
        self.state = LoadState::Ready;
        log::info!("Loaded texture '{}' ({}x{})", path, image.width, image.height);
        Ok(true)
    }

    /// Binds this texture to a numbered unit for the next draw
    pub fn set_active<'a>(&'a self, units: &mut TextureUnits<'a>, unit: u32) {
        units.bind(unit, self);
    }

    pub fn kind(&self) -> TextureKind {
        self.kind
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn resource(&self) -> &TextureResource {
        &self.resource
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.resource.view
    }

    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.resource.sampler
    }
}

/// Numbered texture slots for one draw call
#[derive(Debug, Clone, Copy, Default)]
pub struct TextureUnits<'a> {
    units: [Option<&'a Texture>; TEXTURE_UNITS],
}

impl<'a> TextureUnits<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later binds to the same unit replace earlier ones
    pub fn bind(&mut self, unit: u32, texture: &'a Texture) {
        match self.units.get_mut(unit as usize) {
            Some(slot) => *slot = Some(texture),
            None => log::warn!(
                "Texture unit {} out of range (0..{}), ignoring bind",
                unit,
                TEXTURE_UNITS
            ),
        }
    }

    pub fn get(&self, unit: u32) -> Option<&'a Texture> {
        self.units.get(unit as usize).copied().flatten()
    }

    pub fn bound_count(&self) -> usize {
        self.units.iter().filter(|u| u.is_some()).count()
    }
}
