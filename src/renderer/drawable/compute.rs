//! Compute drawable.
//!
//! A `Compute` wraps one compute entry point. It has no output shape, so the
//! pipeline cache is a single slot; the only invalidation source is a change
//! to the bound storage-buffer set.

use crate::errors::{LucentError, Result};
use crate::renderer::drawable::pass::empty_bind_groups;
use crate::renderer::drawable::{BindingMode, BindingSet, Inputs, impl_input_api};
use crate::renderer::pipeline::ComputePipelineCache;
use crate::renderer::WgpuContext;
use crate::wgsl::parser::{declares_group, has_entry_point};

/// Construction options for a [`Compute`].
pub struct ComputeDescriptor<'a> {
    /// Debug label used for every GPU object the drawable creates.
    pub label: &'a str,
    /// Compute shader source.
    pub source: &'a str,
    /// Binding discovery mode.
    pub mode: BindingMode,
    /// Bind group index the drawable binds its resources to.
    pub group: u32,
    /// Compute entry point name.
    pub entry: &'a str,
}

impl<'a> ComputeDescriptor<'a> {
    /// Simple-mode drawable on group 0 with the conventional `main` entry.
    #[must_use]
    pub fn new(label: &'a str, source: &'a str) -> Self {
        Self {
            label,
            source,
            mode: BindingMode::Simple,
            group: 0,
            entry: "main",
        }
    }
}

/// Compute drawable with a single-slot pipeline cache.
pub struct Compute {
    label: String,
    source: String,
    entry: String,
    bindings: BindingSet,
    cache: ComputePipelineCache,
}

impl Compute {
    /// Creates a compute drawable from a descriptor and its named inputs.
    pub fn new(descriptor: &ComputeDescriptor<'_>, inputs: Inputs) -> Result<Self> {
        if descriptor.source.trim().is_empty() {
            return Err(LucentError::EmptyShader);
        }
        if !has_entry_point(descriptor.source, descriptor.entry) {
            return Err(LucentError::MissingEntryPoint(descriptor.entry.to_string()));
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
            entry: descriptor.entry.to_string(),
            bindings,
            cache: ComputePipelineCache::default(),
        })
    }

    /// True when the pipeline has been built.
    #[must_use]
    pub fn is_built(&self) -> bool {
        self.cache.is_built()
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

    /// Records one dispatch of `workgroups` into `encoder`.
    pub fn dispatch(
        &mut self,
        ctx: &WgpuContext,
        encoder: &mut wgpu::CommandEncoder,
        workgroups: [u32; 3],
    ) -> Result<()> {
        self.bindings.ensure_table(&self.source);
        self.bindings.validate_and_log(&self.label);
        self.bindings.write_uniforms(ctx, &self.label);

        let plan = self.bindings.plan();
        let bind_group_layout = self.bindings.ensure_bind_group_layout(
            &ctx.device,
            &plan,
            wgpu::ShaderStages::COMPUTE,
            &self.label,
        );

        if !self.cache.is_built() {
            let source = self.composed_source();
            let module = self
                .cache
                .modules
                .get_or_compile(&ctx.device, &source, &self.label);

            let empty_layouts: Vec<wgpu::BindGroupLayout> = (0..self.bindings.group())
                .map(|_| {
                    ctx.device
                        .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                            label: Some(self.label.as_str()),
                            entries: &[],
                        })
                })
                .collect();
            let mut layouts: Vec<Option<&wgpu::BindGroupLayout>> =
                empty_layouts.iter().map(Some).collect();
            layouts.push(Some(&bind_group_layout));

            let pipeline_layout =
                ctx.device
                    .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                        label: Some(self.label.as_str()),
                        bind_group_layouts: &layouts,
                        immediate_size: 0,
                    });

            log::debug!("building compute pipeline '{}'", self.label);
            let pipeline = ctx
                .device
                .create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                    label: Some(self.label.as_str()),
                    layout: Some(&pipeline_layout),
                    module: &module,
                    entry_point: Some(self.entry.as_str()),
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                    cache: None,
                });
            self.cache.insert(pipeline);
        }

        let placeholders = empty_bind_groups(ctx, self.bindings.group(), &self.label);
        let bind_group = self.bindings.create_bind_group(ctx, &plan, &self.label);
        let pipeline = self.cache.get().expect("pipeline built above");

        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some(self.label.as_str()),
            timestamp_writes: None,
        });
        pass.set_pipeline(pipeline);
        for (index, group) in placeholders.iter().enumerate() {
            pass.set_bind_group(index as u32, group, &[]);
        }
        pass.set_bind_group(self.bindings.group(), &bind_group, &[]);
        pass.dispatch_workgroups(workgroups[0], workgroups[1], workgroups[2]);

        Ok(())
    }
}

impl_input_api!(Compute);
