//! Shared GPU state handed to every resource constructor and draw call
//!
//! Owns the device and queue, the mipmap generator and the fallback textures
//! bound to sampler slots nothing was bound to.

use std::sync::Arc;

use crate::{
    error::{RenderError, RenderResult},
    gfx::resources::{mipmap::MipmapGenerator, TextureKind, TextureResource},
};

pub struct RenderContext {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    color_format: wgpu::TextureFormat,
    canvas_size: (u32, u32),
    mipmaps: MipmapGenerator,
    fallback_flat: TextureResource,
    fallback_cube: TextureResource,
}

impl RenderContext {
    /// Wraps an existing device and queue
    ///
    /// Installs an uncaptured-error handler that logs instead of panicking, so
    /// a broken shader leaves the application running.
    pub fn new(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        color_format: wgpu::TextureFormat,
        canvas_size: (u32, u32),
    ) -> Self {
        device.on_uncaptured_error(Box::new(|error| {
            log::error!("Uncaptured GPU error: {}", error);
        }));

        let mipmaps = MipmapGenerator::new(&device);
        let fallback_sampler = TextureResource::image_sampler_descriptor();
        let fallback_flat = TextureResource::create_placeholder(
            &device,
            &queue,
            wgpu::TextureFormat::Rgba8Unorm,
            TextureKind::Flat,
            &fallback_sampler,
            "Fallback 2D Texture",
        );
        let fallback_cube = TextureResource::create_placeholder(
            &device,
            &queue,
            wgpu::TextureFormat::Rgba8Unorm,
            TextureKind::Cube,
            &fallback_sampler,
            "Fallback Cube Texture",
        );

        Self {
            device,
            queue,
            color_format,
            canvas_size,
            mipmaps,
            fallback_flat,
            fallback_cube,
        }
    }

    /// Creates a context without a window, for offline bakes and tools
    pub async fn headless(color_format: wgpu::TextureFormat, canvas_size: (u32, u32)) -> RenderResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let (_adapter, device, queue) = request_device(&instance, None).await?;
        Ok(Self::new(
            Arc::new(device),
            Arc::new(queue),
            color_format,
            canvas_size,
        ))
    }

    /// Runs a GPU allocation and reports out-of-memory or validation failures
    /// as an error
    ///
    /// Scopes pop innermost first, so validation is checked before memory.
    pub fn allocate<T>(&self, what: &str, create: impl FnOnce(&wgpu::Device) -> T) -> RenderResult<T> {
        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let resource = create(&self.device);
        let validation = pollster::block_on(self.device.pop_error_scope());
        let out_of_memory = pollster::block_on(self.device.pop_error_scope());
        match validation.or(out_of_memory) {
            None => Ok(resource),
            Some(error) => Err(RenderError::ResourceAllocation {
                what: what.to_string(),
                reason: error.to_string(),
            }),
        }
    }

    /// Largest width or height a 2D texture may have on this device
    pub fn max_texture_dimension(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }

    /// Runs `create` and logs any validation error it raised
    ///
    /// Returns the value either way; wgpu hands back an invalid object on
    /// failure and later uses of it are reported through the same handler.
    pub fn capture_validation<T>(&self, what: &str, create: impl FnOnce(&wgpu::Device) -> T) -> (T, bool) {
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let value = create(&self.device);
        let error = pollster::block_on(self.device.pop_error_scope());
        if let Some(error) = &error {
            log::error!("{} failed: {}", what, error);
        }
        (value, error.is_none())
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Format of the on-screen color target
    pub fn color_format(&self) -> wgpu::TextureFormat {
        self.color_format
    }

    pub fn canvas_size(&self) -> (u32, u32) {
        self.canvas_size
    }

    /// Width over height of the canvas
    pub fn aspect(&self) -> f32 {
        let (width, height) = self.canvas_size;
        width.max(1) as f32 / height.max(1) as f32
    }

    pub fn set_canvas_size(&mut self, width: u32, height: u32) {
        self.canvas_size = (width, height);
    }

    pub fn mipmaps(&self) -> &MipmapGenerator {
        &self.mipmaps
    }

    /// Texture bound to sampler slots of `kind` that nothing was bound to
    pub fn fallback(&self, kind: TextureKind) -> &TextureResource {
        match kind {
            TextureKind::Flat => &self.fallback_flat,
            TextureKind::Cube => &self.fallback_cube,
        }
    }
}

/// Picks an adapter and opens a device on it
pub async fn request_device(
    instance: &wgpu::Instance,
    compatible_surface: Option<&wgpu::Surface<'_>>,
) -> RenderResult<(wgpu::Adapter, wgpu::Device, wgpu::Queue)> {
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface,
            force_fallback_adapter: false,
        })
        .await
        .map_err(|e| RenderError::ResourceAllocation {
            what: "adapter".to_string(),
            reason: e.to_string(),
        })?;

    log::info!("Using adapter: {}", adapter.get_info().name);

    let (device, queue) = adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: Some("WGPU Device"),
            required_features: wgpu::Features::default(),
            required_limits: wgpu::Limits {
                max_texture_dimension_2d: adapter.limits().max_texture_dimension_2d,
                ..wgpu::Limits::downlevel_defaults()
            },
            memory_hints: wgpu::MemoryHints::default(),
            trace: wgpu::Trace::Off,
        })
        .await
        .map_err(|e| RenderError::ResourceAllocation {
            what: "device".to_string(),
            reason: e.to_string(),
        })?;

    Ok((adapter, device, queue))
}
