//! Borrowed resource handles.
//!
//! Textures, samplers and storage buffers are created and owned by the
//! collaborator that allocated them; this layer holds cloned `wgpu` handles
//! (internally reference-counted), creates views into them at bind time, and
//! never resizes, writes or frees them.

/// A texture-like input: a view plus an optional sampler that travels with it.
///
/// When the sampler is absent and the shader declares one, the drawable falls
/// back to an explicitly registered sampler of the resolved name, then to the
/// context default sampler.
#[derive(Debug, Clone)]
pub struct TextureSlot {
    /// The view that gets bound.
    pub view: wgpu::TextureView,
    /// Sampler used when the shader declares a matching sampler binding.
    pub sampler: Option<wgpu::Sampler>,
}

impl TextureSlot {
    /// A texture slot with an attached sampler.
    #[must_use]
    pub fn with_sampler(view: wgpu::TextureView, sampler: wgpu::Sampler) -> Self {
        Self {
            view,
            sampler: Some(sampler),
        }
    }
}

impl From<wgpu::TextureView> for TextureSlot {
    fn from(view: wgpu::TextureView) -> Self {
        Self {
            view,
            sampler: None,
        }
    }
}

/// A storage-buffer input registered under a name via `drawable.storage`.
#[derive(Debug, Clone)]
pub struct StorageBufferSlot {
    /// The underlying buffer handle. Must carry `BufferUsages::STORAGE`.
    pub buffer: wgpu::Buffer,
}

impl StorageBufferSlot {
    /// Wraps an existing buffer handle.
    #[must_use]
    pub fn new(buffer: wgpu::Buffer) -> Self {
        Self { buffer }
    }

    /// Writes `bytes` into the buffer at `offset` through the queue.
    pub fn write(&self, queue: &wgpu::Queue, offset: u64, bytes: &[u8]) {
        queue.write_buffer(&self.buffer, offset, bytes);
    }
}

impl From<wgpu::Buffer> for StorageBufferSlot {
    fn from(buffer: wgpu::Buffer) -> Self {
        Self { buffer }
    }
}
