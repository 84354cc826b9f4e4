//! GPU-facing layer: context, uniform serialization, bind-group assembly,
//! pipeline caches and the three drawable types.

pub mod bind_group;
pub mod drawable;
pub mod pipeline;
pub mod uniform_writer;
pub mod validate;

use std::sync::OnceLock;

pub use bind_group::{PlannedEntry, PlannedResource, layout_entries, plan_bind_group};
pub use drawable::{BindingMode, Compute, GeometryInput, Inputs, Material, Pass, VertexLayout};
pub use pipeline::{ComputePipelineCache, RenderPipelineCache, RenderPipelineKey};
pub use uniform_writer::write_uniforms;
pub use validate::{BindingDiagnostic, BindingIssue, IssueKind};

/// Device + queue handles borrowed from the collaborator that acquired them.
///
/// This layer never creates or configures the device; it only consumes the
/// handles (internally reference-counted by wgpu) and a lazily-created shared
/// default sampler.
pub struct WgpuContext {
    /// The device all pipelines and bind groups are created on.
    pub device: wgpu::Device,
    /// The queue uniform writes go through.
    pub queue: wgpu::Queue,
    default_sampler: OnceLock<wgpu::Sampler>,
}

impl WgpuContext {
    /// Wraps existing device and queue handles.
    #[must_use]
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        Self {
            device,
            queue,
            default_sampler: OnceLock::new(),
        }
    }

    /// Linear-filtering clamp sampler used when a texture input carries no
    /// sampler of its own and none was registered under the resolved name.
    pub fn default_sampler(&self) -> &wgpu::Sampler {
        self.default_sampler.get_or_init(|| {
            self.device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some("Lucent Default Sampler"),
                address_mode_u: wgpu::AddressMode::ClampToEdge,
                address_mode_v: wgpu::AddressMode::ClampToEdge,
                address_mode_w: wgpu::AddressMode::ClampToEdge,
                mag_filter: wgpu::FilterMode::Linear,
                min_filter: wgpu::FilterMode::Linear,
                ..Default::default()
            })
        })
    }
}

/// Where a draw call renders to. The view is borrowed per call; the format
/// doubles as the pipeline-cache key.
pub struct RenderTarget<'a> {
    /// Color attachment view.
    pub view: &'a wgpu::TextureView,
    /// Format of that view.
    pub format: wgpu::TextureFormat,
    /// Clear color; `None` loads the existing contents.
    pub clear: Option<wgpu::Color>,
}

impl RenderTarget<'_> {
    pub(crate) fn load_op(&self) -> wgpu::LoadOp<wgpu::Color> {
        match self.clear {
            Some(color) => wgpu::LoadOp::Clear(color),
            None => wgpu::LoadOp::Load,
        }
    }
}
