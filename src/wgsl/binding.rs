//! The resolved binding table.
//!
//! Both discovery modes produce the same structure: a map from resource name
//! to binding index, partitioned by resource kind. Simple mode fills it while
//! generating declarations; manual mode fills it by parsing hand-written
//! shader source.

use rustc_hash::FxHashMap;

/// A storage-buffer declaration discovered in shader source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageBufferBinding {
    /// Binding index within the group.
    pub binding: u32,
    /// False only for `var<storage, read_write>`.
    pub read_only: bool,
}

/// A storage-texture declaration discovered in shader source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageTextureBinding {
    /// Binding index within the group.
    pub binding: u32,
    /// Texel format parsed from the type expression, when recognized.
    pub format: Option<wgpu::TextureFormat>,
}

/// Name → binding-index table for one binding group.
///
/// Invariants: indices are unique within the group, and a name appears in at
/// most one of the partitions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BindingTable {
    /// Index of the single uniform-buffer declaration, when one exists.
    pub uniform_buffer: Option<u32>,
    /// Sampled-texture declarations.
    pub textures: FxHashMap<String, u32>,
    /// Sampler declarations.
    pub samplers: FxHashMap<String, u32>,
    /// Storage-buffer declarations.
    pub storage_buffers: FxHashMap<String, StorageBufferBinding>,
    /// Storage-texture declarations. These are write-only targets and never
    /// receive a sampler entry.
    pub storage_textures: FxHashMap<String, StorageTextureBinding>,
}

impl BindingTable {
    /// True when no declaration of any kind was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.uniform_buffer.is_none()
            && self.textures.is_empty()
            && self.samplers.is_empty()
            && self.storage_buffers.is_empty()
            && self.storage_textures.is_empty()
    }

    /// Total number of declarations across all partitions.
    #[must_use]
    pub fn len(&self) -> usize {
        usize::from(self.uniform_buffer.is_some())
            + self.textures.len()
            + self.samplers.len()
            + self.storage_buffers.len()
            + self.storage_textures.len()
    }
}
