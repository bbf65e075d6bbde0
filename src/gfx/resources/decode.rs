//! Off-thread image decoding
//!
//! Decoding runs on a worker thread and hands its result back through a
//! oneshot channel. The render thread polls [`PendingDecode::try_take`] once
//! per tick, so GPU uploads always happen on the thread that owns the queue.

use std::{path::Path, sync::Arc};

use futures::channel::oneshot;
use half::f16;

use crate::{
    assets::AssetSource,
    error::{RenderError, RenderResult},
};

/// Which decoder a path is routed to
///
/// Chosen by file extension alone: `.hdr` (any case) selects the Radiance
/// decoder, everything else goes through the standard image decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodePath {
    Radiance,
    Standard,
}

impl DecodePath {
    pub fn from_path(path: &str) -> Self {
        let is_hdr = Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("hdr"));

        if is_hdr {
            DecodePath::Radiance
        } else {
            DecodePath::Standard
        }
    }

    /// GPU format a decoded image is stored in
    ///
    /// Radiance images are always linear half-float; `gamma_correct` only
    /// applies to the standard path.
    pub fn texture_format(self, gamma_correct: bool) -> wgpu::TextureFormat {
        match self {
            DecodePath::Radiance => wgpu::TextureFormat::Rgba16Float,
            DecodePath::Standard if gamma_correct => wgpu::TextureFormat::Rgba8UnormSrgb,
            DecodePath::Standard => wgpu::TextureFormat::Rgba8Unorm,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Pixels {
    Rgba8(Vec<u8>),
    Rgba16Float(Vec<f16>),
}

/// Decoded pixel data, rows top to bottom
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Pixels,
}

impl DecodedImage {
    pub fn bytes(&self) -> &[u8] {
        match &self.pixels {
            Pixels::Rgba8(data) => data,
            Pixels::Rgba16Float(data) => bytemuck::cast_slice(data),
        }
    }

    pub fn bytes_per_pixel(&self) -> u32 {
        match self.pixels {
            Pixels::Rgba8(_) => 4,
            Pixels::Rgba16Float(_) => 8,
        }
    }
}

/// Decodes an encoded image held in memory
pub fn decode_image(path: &str, bytes: &[u8], decode_path: DecodePath) -> RenderResult<DecodedImage> {
    let decode_error = |e: image::ImageError| RenderError::Decode {
        path: path.to_string(),
        reason: e.to_string(),
    };

    match decode_path {
        DecodePath::Radiance => {
            let img = image::load_from_memory_with_format(bytes, image::ImageFormat::Hdr)
                .map_err(decode_error)?
                .to_rgba32f();
            let (width, height) = img.dimensions();
            let pixels = img.into_raw().into_iter().map(f16::from_f32).collect();

            Ok(DecodedImage {
                width,
                height,
                pixels: Pixels::Rgba16Float(pixels),
            })
        }
        DecodePath::Standard => {
            let img = image::load_from_memory(bytes).map_err(decode_error)?.to_rgba8();
            let (width, height) = img.dimensions();

            Ok(DecodedImage {
                width,
                height,
                pixels: Pixels::Rgba8(img.into_raw()),
            })
        }
    }
}

/// Decode running on a worker thread
///
/// Dropping this before the worker finishes is fine: the worker's send fails
/// and the decoded pixels are discarded with it.
#[derive(Debug)]
pub struct PendingDecode {
    path: String,
    receiver: oneshot::Receiver<RenderResult<DecodedImage>>,
}

impl PendingDecode {
    /// Reads and decodes `path` from `source` on a new worker thread
    pub fn spawn(source: Arc<dyn AssetSource>, path: &str, decode_path: DecodePath) -> Self {
        let (sender, receiver) = oneshot::channel();
        let worker_path = path.to_string();

        let spawned = std::thread::Builder::new()
            .name(format!("decode {path}"))
            .spawn(move || {
                let result = source
                    .read_bytes(&worker_path)
                    .and_then(|bytes| decode_image(&worker_path, &bytes, decode_path));
                if sender.send(result).is_err() {
                    log::debug!("Decode of '{}' finished after its texture was dropped", worker_path);
                }
            });

        if let Err(e) = spawned {
            log::error!("Failed to spawn decode worker for '{}': {}", path, e);
        }

        Self {
            path: path.to_string(),
            receiver,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Non-blocking poll; `Some` exactly once when the worker has finished
    pub fn try_take(&mut self) -> Option<RenderResult<DecodedImage>> {
        match self.receiver.try_recv() {
            Ok(result) => result,
            Err(oneshot::Canceled) => Some(Err(self.worker_lost())),
        }
    }

    /// Blocks until the worker finishes
    pub fn wait(self) -> RenderResult<DecodedImage> {
        let lost = self.worker_lost();
        futures::executor::block_on(self.receiver).unwrap_or(Err(lost))
    }

    fn worker_lost(&self) -> RenderError {
        RenderError::Decode {
            path: self.path.clone(),
            reason: "decode worker exited without a result".to_string(),
        }
    }
}
