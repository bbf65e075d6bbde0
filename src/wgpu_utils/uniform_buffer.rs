// src/wgpu_utils/uniform_buffer.rs
//! Uniform buffer backed by a byte block whose layout is known at runtime

/// Uniform buffer that skips uploads when the content did not change
#[derive(Debug)]
pub struct UniformBuffer {
    buffer: wgpu::Buffer,
    previous_content: Vec<u8>,
}

impl UniformBuffer {
    /// Create a new zero-initialized uniform buffer of `size` bytes
    pub fn new(device: &wgpu::Device, size: u64, label: &str) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("UniformBuffer: {}", label)),
            size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        UniformBuffer {
            buffer,
            previous_content: vec![0; size as usize],
        }
    }

    /// Update buffer content (optimized to skip unnecessary writes)
    ///
    /// Returns `true` if a write was queued.
    pub fn update_content(&mut self, queue: &wgpu::Queue, content: &[u8]) -> bool {
        if self.previous_content == content {
            return false;
        }
        self.force_update_content(queue, content);
        true
    }

    /// Force update buffer content (skips optimization check)
    pub fn force_update_content(&mut self, queue: &wgpu::Queue, content: &[u8]) {
        queue.write_buffer(&self.buffer, 0, content);
        self.previous_content.clear();
        self.previous_content.extend_from_slice(content);
    }

    /// Get binding resource
    pub fn binding_resource(&self) -> wgpu::BindingResource {
        self.buffer.as_entire_binding()
    }
}
