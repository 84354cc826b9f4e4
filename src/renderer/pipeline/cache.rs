//! Per-drawable pipeline caches.
//!
//! Each drawable owns one cache, keyed by output shape: output format for
//! fullscreen passes, format + primitive topology for custom-geometry
//! materials, a single slot for compute. A key moves from unbuilt to built on
//! first draw/dispatch; registering or removing a storage buffer clears the
//! whole cache (the binding shape changed), while value updates and texture
//! re-renders never do.
//!
//! Shader modules are deduplicated separately by an xxh3 hash of the final
//! WGSL source, so rebuilds after an invalidation reuse compiled modules when
//! the source came out identical.

use std::hash::{Hash, Hasher};

use rustc_hash::{FxHashMap, FxHasher};
use xxhash_rust::xxh3::xxh3_64;

/// Hashes a canonical pipeline key to the cache lookup key.
#[must_use]
pub fn fx_hash_key<K: Hash>(key: &K) -> u64 {
    let mut hasher = FxHasher::default();
    key.hash(&mut hasher);
    hasher.finish()
}

// ─── Shader Module Cache ─────────────────────────────────────────────────────

/// Content-addressed `ShaderModule` cache.
#[derive(Default)]
pub struct ShaderModuleCache {
    modules: FxHashMap<u64, wgpu::ShaderModule>,
}

impl ShaderModuleCache {
    /// Returns the module for `source`, compiling it on first sight.
    pub fn get_or_compile(
        &mut self,
        device: &wgpu::Device,
        source: &str,
        label: &str,
    ) -> wgpu::ShaderModule {
        let hash = xxh3_64(source.as_bytes());
        if let Some(module) = self.modules.get(&hash) {
            return module.clone();
        }

        log::debug!("compiling shader module '{label}' ({} bytes)", source.len());
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        self.modules.insert(hash, module.clone());
        module
    }
}

// ─── Render Pipelines ────────────────────────────────────────────────────────

/// Cache key for render pipelines: the output shape.
///
/// Fullscreen passes key on format only and pin the topology to the default;
/// custom-geometry materials key on both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderPipelineKey {
    /// Color target format of the render target being drawn to.
    pub format: wgpu::TextureFormat,
    /// Primitive topology of the geometry.
    pub topology: wgpu::PrimitiveTopology,
}

/// Output-shape keyed render pipeline cache.
#[derive(Default)]
pub struct RenderPipelineCache {
    /// Module dedupe shared across all keys of this drawable.
    pub modules: ShaderModuleCache,
    pipelines: FxHashMap<u64, wgpu::RenderPipeline>,
}

impl RenderPipelineCache {
    /// Looks up the pipeline built for `key`, if any.
    #[must_use]
    pub fn get(&self, key: &RenderPipelineKey) -> Option<&wgpu::RenderPipeline> {
        self.pipelines.get(&fx_hash_key(key))
    }

    /// Stores the pipeline built for `key`.
    pub fn insert(&mut self, key: &RenderPipelineKey, pipeline: wgpu::RenderPipeline) {
        self.pipelines.insert(fx_hash_key(key), pipeline);
    }

    /// Number of built keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    /// True when no key has been built.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }

    /// Drops every built pipeline, sending all keys back to unbuilt.
    pub fn clear(&mut self) {
        self.pipelines.clear();
    }
}

// ─── Compute Pipelines ───────────────────────────────────────────────────────

/// Single-slot compute pipeline cache. Compute has no output shape, so the
/// only invalidation source is a binding-shape change.
#[derive(Default)]
pub struct ComputePipelineCache {
    /// Module dedupe.
    pub modules: ShaderModuleCache,
    pipeline: Option<wgpu::ComputePipeline>,
}

impl ComputePipelineCache {
    /// The built pipeline, if any.
    #[must_use]
    pub fn get(&self) -> Option<&wgpu::ComputePipeline> {
        self.pipeline.as_ref()
    }

    /// Stores the built pipeline.
    pub fn insert(&mut self, pipeline: wgpu::ComputePipeline) {
        self.pipeline = Some(pipeline);
    }

    /// True when the pipeline has been built.
    #[must_use]
    pub fn is_built(&self) -> bool {
        self.pipeline.is_some()
    }

    /// Drops the built pipeline.
    pub fn clear(&mut self) {
        self.pipeline = None;
    }
}
