//! Window-backed rendering engine
//!
//! Owns the surface, its configuration and the main depth buffer, and hands a
//! [`RenderContext`] plus an open render pass to the caller every frame.

use std::sync::Arc;

use super::render_context::{request_device, RenderContext};
use crate::{
    error::{RenderError, RenderResult},
    gfx::resources::TextureResource,
};

/// Background the main pass clears to
pub const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.1,
    g: 0.1,
    b: 0.1,
    a: 1.0,
};

pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    depth_texture: TextureResource,
    ctx: RenderContext,
}

impl RenderEngine {
    /// Creates a render engine for the given window
    ///
    /// Picks a non-sRGB surface format; the PBR shader applies gamma itself.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> RenderResult<RenderEngine> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window)
            .map_err(|e| RenderError::ResourceAllocation {
                what: "surface".to_string(),
                reason: e.to_string(),
            })?;

        let (adapter, device, queue) = request_device(&instance, Some(&surface)).await?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .ok_or_else(|| RenderError::ResourceAllocation {
                what: "surface".to_string(),
                reason: "adapter reports no surface formats".to_string(),
            })?;
        let alpha_mode = surface_capabilities
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let width = width.max(1);
        let height = height.max(1);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let ctx = RenderContext::new(Arc::new(device), Arc::new(queue), format, (width, height));
        let depth_texture = ctx.allocate("depth buffer", |device| {
            TextureResource::create_depth_texture(
                device,
                width,
                height,
                TextureResource::DEPTH_FORMAT,
                "depth_texture",
            )
        })?;

        log::info!("Render engine ready: {}x{} {:?}", width, height, format);

        Ok(Self {
            surface,
            config,
            depth_texture,
            ctx,
        })
    }

    /// Records one frame
    ///
    /// Clears color and depth, then runs `draw` inside the main pass and
    /// presents. A lost or outdated surface is reconfigured and the frame is
    /// skipped.
    pub fn render_frame<F>(&mut self, draw: F) -> RenderResult<()>
    where
        F: FnOnce(&RenderContext, &mut wgpu::RenderPass<'_>) -> RenderResult<()>,
    {
        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost, reconfiguring");
                self.surface.configure(self.ctx.device(), &self.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Timed out acquiring surface texture, skipping frame");
                return Ok(());
            }
            Err(e) => {
                return Err(RenderError::ResourceAllocation {
                    what: "surface texture".to_string(),
                    reason: e.to_string(),
                })
            }
        };

        let surface_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .ctx
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            draw(&self.ctx, &mut render_pass)?;
        }

        self.ctx.queue().submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    /// Reconfigures the surface and recreates the depth buffer
    ///
    /// Zero-sized requests (minimized windows) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) -> RenderResult<()> {
        if width == 0 || height == 0 {
            return Ok(());
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(self.ctx.device(), &self.config);
        self.ctx.set_canvas_size(width, height);

        self.depth_texture = self.ctx.allocate("depth buffer", |device| {
            TextureResource::create_depth_texture(
                device,
                width,
                height,
                TextureResource::DEPTH_FORMAT,
                "depth_texture",
            )
        })?;
        Ok(())
    }

    pub fn context(&self) -> &RenderContext {
        &self.ctx
    }
}
