//! Custom-geometry drawable.
//!
//! A `Material` draws caller-supplied vertex buffers with a caller-supplied
//! shader. Unlike [`Pass`](crate::renderer::drawable::Pass) the vertex stage
//! is always the caller's, so in simple mode the generated declarations are
//! prepended to the complete user shader. Pipelines are cached per output
//! format *and* primitive topology, since the same material may draw both
//! triangle meshes and line overlays.

use crate::errors::{LucentError, Result};
use crate::renderer::drawable::pass::{
    FRAGMENT_ENTRY, VERTEX_ENTRY, build_render_pipeline, empty_bind_groups,
};
use crate::renderer::drawable::{BindingMode, BindingSet, Inputs, impl_input_api};
use crate::renderer::pipeline::{RenderPipelineCache, RenderPipelineKey};
use crate::renderer::{RenderTarget, WgpuContext};
use crate::wgsl::parser::{declares_group, has_entry_point};

/// One vertex buffer's memory layout.
#[derive(Debug, Clone)]
pub struct VertexLayout {
    /// Byte stride between consecutive elements.
    pub array_stride: u64,
    /// Per-vertex or per-instance advance.
    pub step_mode: wgpu::VertexStepMode,
    /// Attributes read from this buffer.
    pub attributes: Vec<wgpu::VertexAttribute>,
}

impl VertexLayout {
    /// Per-vertex layout from a stride and attribute list.
    #[must_use]
    pub fn vertex(array_stride: u64, attributes: Vec<wgpu::VertexAttribute>) -> Self {
        Self {
            array_stride,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes,
        }
    }

    pub(crate) fn as_wgpu(&self) -> wgpu::VertexBufferLayout<'_> {
        wgpu::VertexBufferLayout {
            array_stride: self.array_stride,
            step_mode: self.step_mode,
            attributes: &self.attributes,
        }
    }
}

/// Index buffer handed to an indexed draw.
pub struct IndexInput<'a> {
    /// Buffer holding the indices.
    pub buffer: &'a wgpu::Buffer,
    /// Index element format.
    pub format: wgpu::IndexFormat,
    /// Number of indices to draw.
    pub count: u32,
}

/// The geometry of one draw call. Buffers are borrowed per call and bound in
/// slot order matching the material's vertex layouts.
pub struct GeometryInput<'a> {
    /// One buffer per declared vertex layout, in order.
    pub vertex_buffers: &'a [&'a wgpu::Buffer],
    /// Indices; `None` draws non-indexed.
    pub index: Option<IndexInput<'a>>,
    /// Number of vertices for a non-indexed draw.
    pub vertex_count: u32,
    /// Instances to draw.
    pub instance_count: u32,
    /// Primitive topology, part of the pipeline-cache key.
    pub topology: wgpu::PrimitiveTopology,
}

/// Construction options for a [`Material`].
pub struct MaterialDescriptor<'a> {
    /// Debug label used for every GPU object the material creates.
    pub label: &'a str,
    /// The complete shader, vertex and fragment entry points included.
    pub source: &'a str,
    /// Binding discovery mode.
    pub mode: BindingMode,
    /// Bind group index the material binds its resources to.
    pub group: u32,
    /// Vertex buffer layouts, fixed at construction.
    pub vertex_layouts: Vec<VertexLayout>,
}

/// Custom-geometry drawable with a per-format-and-topology pipeline cache.
pub struct Material {
    label: String,
    source: String,
    vertex_layouts: Vec<VertexLayout>,
    bindings: BindingSet,
    cache: RenderPipelineCache,
}

impl Material {
    /// Creates a material from a descriptor and its named inputs.
    ///
    /// Both entry points must exist in the source regardless of mode; simple
    /// mode additionally rejects sources that already declare bindings in the
    /// reserved group.
    pub fn new(descriptor: &MaterialDescriptor<'_>, inputs: Inputs) -> Result<Self> {
        if descriptor.source.trim().is_empty() {
            return Err(LucentError::EmptyShader);
        }
        for entry in [VERTEX_ENTRY, FRAGMENT_ENTRY] {
            if !has_entry_point(descriptor.source, entry) {
                return Err(LucentError::MissingEntryPoint(entry.to_string()));
            }
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
            vertex_layouts: descriptor.vertex_layouts.clone(),
            bindings,
            cache: RenderPipelineCache::default(),
        })
    }

    /// True when a pipeline has been built for the given output shape.
    #[must_use]
    pub fn is_built(
        &self,
        format: wgpu::TextureFormat,
        topology: wgpu::PrimitiveTopology,
    ) -> bool {
        self.cache
            .get(&RenderPipelineKey { format, topology })
            .is_some()
    }

    fn composed_source(&self) -> String {
        match self.bindings.mode() {
            BindingMode::Simple => {
                let declarations = self.bindings.generated_wgsl().unwrap_or_default();
                format!("{declarations}\n{}", self.source)
            }
            BindingMode::Manual => self.source.clone(),
        }
    }

    /// Records one draw of `geometry` into `encoder`.
    pub fn draw(
        &mut self,
        ctx: &WgpuContext,
        encoder: &mut wgpu::CommandEncoder,
        target: &RenderTarget<'_>,
        geometry: &GeometryInput<'_>,
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
            topology: geometry.topology,
        };
        if self.cache.get(&key).is_none() {
            let source = self.composed_source();
            let module = self
                .cache
                .modules
                .get_or_compile(&ctx.device, &source, &self.label);
            let buffers: Vec<wgpu::VertexBufferLayout<'_>> =
                self.vertex_layouts.iter().map(VertexLayout::as_wgpu).collect();
            let pipeline = build_render_pipeline(
                ctx,
                &self.label,
                &module,
                &bind_group_layout,
                self.bindings.group(),
                &buffers,
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
        for (slot, buffer) in geometry.vertex_buffers.iter().enumerate() {
            pass.set_vertex_buffer(slot as u32, buffer.slice(..));
        }
        match &geometry.index {
            Some(index) => {
                pass.set_index_buffer(index.buffer.slice(..), index.format);
                pass.draw_indexed(0..index.count, 0, 0..geometry.instance_count);
            }
            None => pass.draw(0..geometry.vertex_count, 0..geometry.instance_count),
        }

        Ok(())
    }
}

impl_input_api!(Material);
