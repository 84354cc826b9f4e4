//! Fullscreen pass drawable.
//!
//! A `Pass` draws one screen-covering triangle with a caller-supplied fragment
//! stage. In simple mode the caller writes only the fragment entry point and
//! the binding declarations are generated and prepended, together with the
//! built-in vertex stage. In manual mode the caller supplies the complete
//! shader, both entry points included, and declarations are discovered by
//! parsing.
//!
//! Pipelines are cached per output format; the topology is pinned to a
//! triangle list.

use crate::errors::{LucentError, Result};
use crate::renderer::drawable::{BindingMode, BindingSet, Inputs, impl_input_api};
use crate::renderer::pipeline::{RenderPipelineCache, RenderPipelineKey};
use crate::renderer::{RenderTarget, WgpuContext};
use crate::wgsl::parser::{declares_group, has_entry_point};

/// Vertex entry point every pass pipeline uses.
pub const VERTEX_ENTRY: &str = "vs_main";

/// Fragment entry point every pass pipeline uses.
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// Built-in vertex stage: one triangle covering the whole target, `uv` in
/// `[0, 1]` with the origin at the top left.
const FULLSCREEN_VERTEX: &str = "\
struct VsOut {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(@builtin(vertex_index) index: u32) -> VsOut {
    let uv = vec2<f32>(f32((index << 1u) & 2u), f32(index & 2u));
    var out: VsOut;
    out.uv = uv;
    out.position = vec4<f32>(uv * vec2<f32>(2.0, -2.0) + vec2<f32>(-1.0, 1.0), 0.0, 1.0);
    return out;
}
";

/// Construction options for a [`Pass`].
pub struct PassDescriptor<'a> {
    /// Debug label used for every GPU object the pass creates.
    pub label: &'a str,
    /// Fragment source (simple mode) or the complete shader (manual mode).
    pub source: &'a str,
    /// Binding discovery mode.
    pub mode: BindingMode,
    /// Bind group index the pass binds its resources to.
    pub group: u32,
}

impl<'a> PassDescriptor<'a> {
    /// Simple-mode pass on group 0.
    #[must_use]
    pub fn new(label: &'a str, source: &'a str) -> Self {
        Self {
            label,
            source,
            mode: BindingMode::Simple,
            group: 0,
        }
    }
}

/// Fullscreen drawable with a per-output-format pipeline cache.
pub struct Pass {
    label: String,
    source: String,
    bindings: BindingSet,
    cache: RenderPipelineCache,
}

impl Pass {
    /// Creates a pass from a descriptor and its named inputs.
    ///
    /// Simple mode fails with [`LucentError::ReservedGroupConflict`] when the
    /// fragment source already declares bindings in the group reserved for
    /// generation, and the table is generated eagerly. Manual mode discovers
    /// lazily, on first draw or [`Self::discover_bindings`].
    pub fn new(descriptor: &PassDescriptor<'_>, inputs: Inputs) -> Result<Self> {
        if descriptor.source.trim().is_empty() {
            return Err(LucentError::EmptyShader);
        }
        if descriptor.mode == BindingMode::Simple
            && declares_group(descriptor.source, descriptor.group)
        {
            return Err(LucentError::ReservedGroupConflict {
                group: descriptor.group,
            });
        }

        let mut bindings = BindingSet::new(inputs, descriptor.mode, descriptor.group)?;
        let source = descriptor.source.to_string();
        if descriptor.mode == BindingMode::Simple {
            bindings.ensure_table(&source);
        }

        Ok(Self {
            label: descriptor.label.to_string(),
            source,
            bindings,
            cache: RenderPipelineCache::default(),
        })
    }

    /// True when a pipeline has been built for `format`.
    #[must_use]
    pub fn is_built(&self, format: wgpu::TextureFormat) -> bool {
        self.cache
            .get(&RenderPipelineKey {
                format,
                topology: wgpu::PrimitiveTopology::TriangleList,
            })
            .is_some()
    }

    /// The final WGSL handed to the device.
    fn composed_source(&self) -> Result<String> {
        match self.bindings.mode() {
            BindingMode::Simple => {
                if !has_entry_point(&self.source, FRAGMENT_ENTRY) {
                    return Err(LucentError::MissingEntryPoint(FRAGMENT_ENTRY.to_string()));
                }
                let declarations = self.bindings.generated_wgsl().unwrap_or_default();
                Ok(format!("{declarations}\n{FULLSCREEN_VERTEX}\n{}", self.source))
            }
            BindingMode::Manual => {
                for entry in [VERTEX_ENTRY, FRAGMENT_ENTRY] {
                    if !has_entry_point(&self.source, entry) {
                        return Err(LucentError::MissingEntryPoint(entry.to_string()));
                    }
                }
                Ok(self.source.clone())
            }
        }
    }

    /// Records one fullscreen draw into `encoder`.
    ///
    /// Discovers bindings if needed, uploads the packed values, builds the
    /// pipeline for the target's format on first use, assembles the bind
    /// group fresh and draws the triangle.
    pub fn draw(
        &mut self,
        ctx: &WgpuContext,
        encoder: &mut wgpu::CommandEncoder,
        target: &RenderTarget<'_>,
    ) -> Result<()> {
        self.bindings.ensure_table(&self.source);
        self.bindings.validate_and_log(&self.label);
        self.bindings.write_uniforms(ctx, &self.label);

        let plan = self.bindings.plan();
        let bind_group_layout = self.bindings.ensure_bind_group_layout(
            &ctx.device,
            &plan,
            wgpu::ShaderStages::VERTEX_FRAGMENT,
            &self.label,
        );

        let key = RenderPipelineKey {
            format: target.format,
            topology: wgpu::PrimitiveTopology::TriangleList,
        };
        if self.cache.get(&key).is_none() {
            let source = self.composed_source()?;
            let module = self
                .cache
                .modules
                .get_or_compile(&ctx.device, &source, &self.label);
            let pipeline = build_render_pipeline(
                ctx,
                &self.label,
                &module,
                &bind_group_layout,
                self.bindings.group(),
                &[],
                &key,
            );
            self.cache.insert(&key, pipeline);
        }

        let placeholders = empty_bind_groups(ctx, self.bindings.group(), &self.label);
        let bind_group = self.bindings.create_bind_group(ctx, &plan, &self.label);
        let pipeline = self.cache.get(&key).expect("pipeline built above");

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(self.label.as_str()),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: target.load_op(),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            ..Default::default()
        });
        pass.set_pipeline(pipeline);
        for (index, group) in placeholders.iter().enumerate() {
            pass.set_bind_group(index as u32, group, &[]);
        }
        pass.set_bind_group(self.bindings.group(), &bind_group, &[]);
        pass.draw(0..3, 0..1);

        Ok(())
    }
}

impl_input_api!(Pass);

/// Empty bind groups filling the indices below the drawable's group, so a
/// drawable bound on group 1+ still gets a complete pipeline layout.
pub(crate) fn empty_bind_groups(
    ctx: &WgpuContext,
    group: u32,
    label: &str,
) -> Vec<wgpu::BindGroup> {
    (0..group)
        .map(|_| {
            let layout = ctx
                .device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some(label),
                    entries: &[],
                });
            ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout: &layout,
                entries: &[],
            })
        })
        .collect()
}

/// Shared render-pipeline construction for passes and materials.
pub(crate) fn build_render_pipeline(
    ctx: &WgpuContext,
    label: &str,
    module: &wgpu::ShaderModule,
    bind_group_layout: &wgpu::BindGroupLayout,
    group: u32,
    vertex_buffers: &[wgpu::VertexBufferLayout<'_>],
    key: &RenderPipelineKey,
) -> wgpu::RenderPipeline {
    let empty_layouts: Vec<wgpu::BindGroupLayout> = (0..group)
        .map(|_| {
            ctx.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some(label),
                    entries: &[],
                })
        })
        .collect();
    let mut layouts: Vec<Option<&wgpu::BindGroupLayout>> =
        empty_layouts.iter().map(Some).collect();
    layouts.push(Some(bind_group_layout));

    let pipeline_layout = ctx
        .device
        .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(label),
            bind_group_layouts: &layouts,
            immediate_size: 0,
        });

    log::debug!(
        "building render pipeline '{label}' (format {:?}, topology {:?})",
        key.format,
        key.topology
    );

    ctx.device
        .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module,
                entry_point: Some(VERTEX_ENTRY),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                buffers: vertex_buffers,
            },
            primitive: wgpu::PrimitiveState {
                topology: key.topology,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module,
                entry_point: Some(FRAGMENT_ENTRY),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: key.format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            multiview_mask: None,
            cache: None,
        })
}
