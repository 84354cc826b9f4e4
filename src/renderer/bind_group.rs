//! Bind-group planning.
//!
//! Combines a binding table with the names of the resources actually bound
//! into an ordered list of `(binding index, resource)` entries. The plan is
//! pure data: it names which resource goes where, and the drawable
//! materializes it against its borrowed `wgpu` handles. Planning happens
//! fresh on every draw/dispatch call — textures may have been re-rendered
//! since the previous call, so resource views are never cached across frames.
//!
//! Mismatches are handled gracefully: a name present in the inputs but absent
//! from the table is skipped (the shader simply does not reference it), and a
//! declared binding with no matching input is left to the validator to
//! report.

use smallvec::SmallVec;

use crate::wgsl::binding::BindingTable;
use crate::wgsl::naming::resolve_sampler;

/// What gets attached at one binding index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedResource {
    /// The drawable's packed uniform buffer.
    UniformBuffer,
    /// The view of the texture input `name`.
    TextureView {
        /// Texture input name.
        name: String,
    },
    /// A sampler serving the texture input `texture`, resolved to the
    /// declaration `binding_name`.
    Sampler {
        /// Texture input the sampler was resolved for.
        texture: String,
        /// The sampler declaration name that matched.
        binding_name: String,
    },
    /// The storage buffer registered under `name`.
    StorageBuffer {
        /// Registered storage-buffer name.
        name: String,
    },
    /// The view of the texture input `name`, bound as a write-only storage
    /// texture. Never paired with a sampler.
    StorageTexture {
        /// Texture input name.
        name: String,
    },
}

/// One entry of the bind-group plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedEntry {
    /// Binding index within the drawable's group.
    pub binding: u32,
    /// The resource to attach there.
    pub resource: PlannedResource,
}

/// Builds the bind-group plan for one draw/dispatch call.
///
/// - the uniform buffer is included iff the table declares one *and* data
///   values exist to fill it;
/// - each texture input is checked against `storage_textures` first — a name
///   declared as a storage texture never receives a sampler entry, even when
///   a matching sampler exists;
/// - sampled textures emit the view, then a sampler entry only when the
///   naming chain resolves one;
/// - storage buffers are emitted iff registered under the declared name.
///
/// Entries come back sorted by binding index.
pub fn plan_bind_group<'a>(
    table: &BindingTable,
    texture_inputs: impl Iterator<Item = &'a str>,
    storage_inputs: impl Iterator<Item = &'a str>,
    has_uniform_values: bool,
) -> SmallVec<[PlannedEntry; 8]> {
    let mut plan: SmallVec<[PlannedEntry; 8]> = SmallVec::new();

    if let Some(binding) = table.uniform_buffer
        && has_uniform_values
    {
        plan.push(PlannedEntry {
            binding,
            resource: PlannedResource::UniformBuffer,
        });
    }

    for name in texture_inputs {
        if let Some(storage) = table.storage_textures.get(name) {
            plan.push(PlannedEntry {
                binding: storage.binding,
                resource: PlannedResource::StorageTexture { name: name.to_string() },
            });
        } else if let Some(&binding) = table.textures.get(name) {
            plan.push(PlannedEntry {
                binding,
                resource: PlannedResource::TextureView { name: name.to_string() },
            });

            if let Some(binding_name) = resolve_sampler(name, &table.samplers) {
                plan.push(PlannedEntry {
                    binding: table.samplers[&binding_name],
                    resource: PlannedResource::Sampler {
                        texture: name.to_string(),
                        binding_name,
                    },
                });
            }
        }
        // Not declared anywhere: the shader does not reference it. Skip.
    }

    for name in storage_inputs {
        if let Some(storage) = table.storage_buffers.get(name) {
            plan.push(PlannedEntry {
                binding: storage.binding,
                resource: PlannedResource::StorageBuffer { name: name.to_string() },
            });
        }
    }

    plan.sort_by_key(|entry| entry.binding);
    plan
}

/// Derives the bind-group-layout entries matching a plan.
///
/// The layout is inferred from the combination of declared shader bindings
/// and resources actually bound, which is why registering or removing a
/// storage buffer sends the owning drawable back to the unbuilt state.
pub fn layout_entries(
    table: &BindingTable,
    plan: &[PlannedEntry],
    visibility: wgpu::ShaderStages,
) -> Vec<wgpu::BindGroupLayoutEntry> {
    plan.iter()
        .map(|entry| {
            let ty = match &entry.resource {
                PlannedResource::UniformBuffer => wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                PlannedResource::TextureView { .. } => wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                PlannedResource::Sampler { .. } => {
                    wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering)
                }
                PlannedResource::StorageBuffer { name } => {
                    let read_only = table
                        .storage_buffers
                        .get(name)
                        .is_none_or(|b| b.read_only);
                    wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    }
                }
                PlannedResource::StorageTexture { name } => {
                    let format = table
                        .storage_textures
                        .get(name)
                        .and_then(|b| b.format)
                        .unwrap_or(wgpu::TextureFormat::Rgba8Unorm);
                    wgpu::BindingType::StorageTexture {
                        access: wgpu::StorageTextureAccess::WriteOnly,
                        format,
                        view_dimension: wgpu::TextureViewDimension::D2,
                    }
                }
            };

            wgpu::BindGroupLayoutEntry {
                binding: entry.binding,
                visibility,
                ty,
                count: None,
            }
        })
        .collect()
}
