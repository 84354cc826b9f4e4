//! Pipeline caching.

pub mod cache;

pub use cache::{ComputePipelineCache, RenderPipelineCache, RenderPipelineKey, ShaderModuleCache};
