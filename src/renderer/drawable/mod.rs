//! The three drawable types and their shared binding state.
//!
//! A drawable owns everything derived from its named inputs: the frozen
//! buffer layout, the discovered (or generated) binding table, the packed
//! uniform buffer, and a per-output-shape pipeline cache. [`BindingSet`]
//! carries the parts common to all three; `Pass`, `Material` and `Compute`
//! add the pipeline flavour.
//!
//! Per cache key a drawable is *unbuilt* until the first draw/dispatch and
//! *built* afterwards. Registering or removing a storage buffer forces every
//! key back to unbuilt, because the binding layout is inferred from the
//! combination of declared shader bindings and resources actually bound.
//! Value updates and texture re-renders never invalidate a built pipeline —
//! they only affect the uniform write and the per-call bind group.

pub mod compute;
pub mod material;
pub mod pass;

pub use compute::{Compute, ComputeDescriptor};
pub use material::{GeometryInput, IndexInput, Material, MaterialDescriptor, VertexLayout};
pub use pass::{Pass, PassDescriptor};

use smallvec::SmallVec;

use crate::errors::{LucentError, Result};
use crate::renderer::WgpuContext;
use crate::renderer::bind_group::{PlannedEntry, PlannedResource, layout_entries, plan_bind_group};
use crate::renderer::uniform_writer;
use crate::renderer::validate::{self, BindingDiagnostic};
use crate::resources::layout::{LayoutEntry, compute_layout};
use crate::resources::texture::{StorageBufferSlot, TextureSlot};
use crate::resources::value::{UniformMap, UniformValue};
use crate::wgsl::binding::BindingTable;
use crate::wgsl::generator::generate_bindings;
use crate::wgsl::parser::parse_bindings;

/// How the drawable's binding declarations come into existence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BindingMode {
    /// Declarations and layout are generated from the inputs and prepended
    /// to the shader body.
    #[default]
    Simple,
    /// Declarations are hand-written in the shader source and discovered by
    /// parsing.
    Manual,
}

// ─── Construction-Time Inputs ────────────────────────────────────────────────

/// Named inputs supplied at construction. Order of the builder calls is the
/// order fields pack into the buffer and texture pairs take binding indices.
#[derive(Default)]
pub struct Inputs {
    pub(crate) values: UniformMap,
    pub(crate) textures: Vec<(String, TextureSlot)>,
    pub(crate) samplers: Vec<(String, wgpu::Sampler)>,
    pub(crate) storage: Vec<(String, StorageBufferSlot)>,
}

impl Inputs {
    /// An empty input set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a data value.
    #[must_use]
    pub fn value(mut self, name: impl Into<String>, value: impl Into<UniformValue>) -> Self {
        self.values.insert(name, value);
        self
    }

    /// Adds a texture-like input.
    #[must_use]
    pub fn texture(mut self, name: impl Into<String>, slot: impl Into<TextureSlot>) -> Self {
        self.textures.push((name.into(), slot.into()));
        self
    }

    /// Registers a sampler under an explicit declaration name.
    #[must_use]
    pub fn sampler(mut self, name: impl Into<String>, sampler: wgpu::Sampler) -> Self {
        self.samplers.push((name.into(), sampler));
        self
    }

    /// Registers a storage buffer under a declaration name.
    #[must_use]
    pub fn storage(mut self, name: impl Into<String>, buffer: impl Into<StorageBufferSlot>) -> Self {
        self.storage.push((name.into(), buffer.into()));
        self
    }
}

// ─── Shared Binding State ────────────────────────────────────────────────────

/// Input state, discovered bindings and GPU-side buffer of one drawable.
pub(crate) struct BindingSet {
    mode: BindingMode,
    group: u32,

    values: UniformMap,
    layout: Vec<LayoutEntry>,
    buffer_size: u64,

    textures: Vec<(String, TextureSlot)>,
    samplers: Vec<(String, wgpu::Sampler)>,
    storage: Vec<(String, StorageBufferSlot)>,

    table: Option<BindingTable>,
    generated_wgsl: Option<String>,
    bind_group_layout: Option<wgpu::BindGroupLayout>,

    uniform_buffer: Option<wgpu::Buffer>,
    staging: Vec<u8>,

    next_diagnostic_id: u64,
    validated: bool,
}

impl BindingSet {
    pub(crate) fn new(inputs: Inputs, mode: BindingMode, group: u32) -> Result<Self> {
        let mut seen = rustc_hash::FxHashSet::default();
        let names = inputs
            .values
            .iter()
            .map(|(n, _)| n)
            .chain(inputs.textures.iter().map(|(n, _)| n.as_str()))
            .chain(inputs.samplers.iter().map(|(n, _)| n.as_str()))
            .chain(inputs.storage.iter().map(|(n, _)| n.as_str()));
        for name in names {
            if !seen.insert(name) {
                return Err(LucentError::DuplicateInput(name.to_string()));
            }
        }

        // The buffer shape is frozen here; later `set` calls only replace
        // values.
        let (layout, buffer_size) = compute_layout(inputs.values.field_types());

        Ok(Self {
            mode,
            group,
            values: inputs.values,
            layout,
            buffer_size,
            textures: inputs.textures,
            samplers: inputs.samplers,
            storage: inputs.storage,
            table: None,
            generated_wgsl: None,
            bind_group_layout: None,
            uniform_buffer: None,
            staging: vec![0; buffer_size as usize],
            next_diagnostic_id: 0,
            validated: false,
        })
    }

    pub(crate) fn mode(&self) -> BindingMode {
        self.mode
    }

    pub(crate) fn group(&self) -> u32 {
        self.group
    }

    pub(crate) fn buffer_size(&self) -> u64 {
        self.buffer_size
    }

    pub(crate) fn layout(&self) -> &[LayoutEntry] {
        &self.layout
    }

    pub(crate) fn table(&self) -> Option<&BindingTable> {
        self.table.as_ref()
    }

    // ---- Input updates -----------------------------------------------------

    pub(crate) fn set(&mut self, name: &str, value: impl Into<UniformValue>) -> Result<()> {
        let value = value.into();
        let Some(slot) = self.values.get_mut(name) else {
            return Err(LucentError::UnknownUniform(name.to_string()));
        };
        if slot.value_type() != value.value_type() {
            return Err(LucentError::ValueTypeMismatch {
                name: name.to_string(),
                expected: slot.value_type(),
                found: value.value_type(),
            });
        }
        *slot = value;
        Ok(())
    }

    pub(crate) fn set_texture(&mut self, name: &str, slot: TextureSlot) {
        match self.textures.iter_mut().find(|(n, _)| n == name) {
            Some(existing) => existing.1 = slot,
            None => self.textures.push((name.to_string(), slot)),
        }
    }

    pub(crate) fn set_sampler(&mut self, name: &str, sampler: wgpu::Sampler) {
        match self.samplers.iter_mut().find(|(n, _)| n == name) {
            Some(existing) => existing.1 = sampler,
            None => self.samplers.push((name.to_string(), sampler)),
        }
    }

    pub(crate) fn set_storage(&mut self, name: &str, buffer: StorageBufferSlot) {
        match self.storage.iter_mut().find(|(n, _)| n == name) {
            Some(existing) => existing.1 = buffer,
            None => self.storage.push((name.to_string(), buffer)),
        }
    }

    pub(crate) fn remove_storage(&mut self, name: &str) -> bool {
        let before = self.storage.len();
        self.storage.retain(|(n, _)| n != name);
        self.storage.len() != before
    }

    /// Drops everything derived from the binding shape. Called when the
    /// bound storage-buffer set changes.
    pub(crate) fn invalidate(&mut self) {
        self.table = None;
        self.generated_wgsl = None;
        self.bind_group_layout = None;
        self.validated = false;
    }

    // ---- Binding discovery -------------------------------------------------

    /// Computes the binding table on first use: generated from the inputs in
    /// simple mode, parsed from `source` in manual mode.
    pub(crate) fn ensure_table(&mut self, source: &str) -> &BindingTable {
        if self.table.is_none() {
            let table = match self.mode {
                BindingMode::Simple => {
                    let generated = generate_bindings(
                        self.group,
                        self.textures.iter().map(|(n, _)| n.as_str()),
                        self.values.field_types(),
                    );
                    self.generated_wgsl = Some(generated.wgsl);
                    generated.table
                }
                BindingMode::Manual => parse_bindings(source, self.group),
            };
            self.validated = false;
            self.table = Some(table);
        }
        self.table.as_ref().expect("binding table just ensured")
    }

    /// The generated declaration block (simple mode, after `ensure_table`).
    pub(crate) fn generated_wgsl(&self) -> Option<&str> {
        self.generated_wgsl.as_deref()
    }

    // ---- Per-call assembly -------------------------------------------------

    /// Serializes the value map and uploads it. Runs unconditionally on every
    /// call whenever any data value exists.
    pub(crate) fn write_uniforms(&mut self, ctx: &WgpuContext, label: &str) {
        if self.buffer_size == 0 {
            return;
        }
        let buffer = self.uniform_buffer.get_or_insert_with(|| {
            ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: self.buffer_size,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        });
        uniform_writer::write_uniforms(&self.values, &mut self.staging);
        ctx.queue.write_buffer(buffer, 0, &self.staging);
    }

    pub(crate) fn plan(&self) -> SmallVec<[PlannedEntry; 8]> {
        let table = self.table.as_ref().expect("plan() requires a discovered table");
        plan_bind_group(
            table,
            self.textures.iter().map(|(n, _)| n.as_str()),
            self.storage.iter().map(|(n, _)| n.as_str()),
            !self.values.is_empty(),
        )
    }

    /// Creates (once per build) the bind-group layout matching the plan.
    pub(crate) fn ensure_bind_group_layout(
        &mut self,
        device: &wgpu::Device,
        plan: &[PlannedEntry],
        visibility: wgpu::ShaderStages,
        label: &str,
    ) -> wgpu::BindGroupLayout {
        if self.bind_group_layout.is_none() {
            let table = self.table.as_ref().expect("layout requires a discovered table");
            let entries = layout_entries(table, plan, visibility);
            self.bind_group_layout =
                Some(device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some(label),
                    entries: &entries,
                }));
        }
        self.bind_group_layout
            .as_ref()
            .expect("bind group layout just ensured")
            .clone()
    }

    /// Resolves the plan against the borrowed resource handles. Entries whose
    /// resource went missing are skipped; the validator already reported
    /// them, and the graphics API raises the authoritative error.
    pub(crate) fn create_bind_group(
        &self,
        ctx: &WgpuContext,
        plan: &[PlannedEntry],
        label: &str,
    ) -> wgpu::BindGroup {
        let layout = self
            .bind_group_layout
            .as_ref()
            .expect("bind group requires a built layout");

        let mut entries = Vec::with_capacity(plan.len());
        for entry in plan {
            let resource = match &entry.resource {
                PlannedResource::UniformBuffer => match &self.uniform_buffer {
                    Some(buffer) => buffer.as_entire_binding(),
                    None => continue,
                },
                PlannedResource::TextureView { name }
                | PlannedResource::StorageTexture { name } => {
                    match self.textures.iter().find(|(n, _)| n == name) {
                        Some((_, slot)) => wgpu::BindingResource::TextureView(&slot.view),
                        None => continue,
                    }
                }
                PlannedResource::Sampler {
                    texture,
                    binding_name,
                } => {
                    let explicit = self
                        .samplers
                        .iter()
                        .find(|(n, _)| n == binding_name)
                        .map(|(_, s)| s);
                    let attached = self
                        .textures
                        .iter()
                        .find(|(n, _)| n == texture)
                        .and_then(|(_, slot)| slot.sampler.as_ref());
                    wgpu::BindingResource::Sampler(
                        explicit.or(attached).unwrap_or_else(|| ctx.default_sampler()),
                    )
                }
                PlannedResource::StorageBuffer { name } => {
                    match self.storage.iter().find(|(n, _)| n == name) {
                        Some((_, slot)) => slot.buffer.as_entire_binding(),
                        None => continue,
                    }
                }
            };
            entries.push(wgpu::BindGroupEntry {
                binding: entry.binding,
                resource,
            });
        }

        ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &entries,
        })
    }

    /// Runs the validator once per discovered table and logs the report.
    /// Mismatches never abort the call.
    pub(crate) fn validate_and_log(&mut self, label: &str) -> Option<BindingDiagnostic> {
        if self.validated {
            return None;
        }
        self.validated = true;

        let table = self.table.as_ref().expect("validation requires a discovered table");
        let texture_names: Vec<&str> = self.textures.iter().map(|(n, _)| n.as_str()).collect();
        let storage_names: Vec<&str> = self.storage.iter().map(|(n, _)| n.as_str()).collect();

        let diagnostic = validate::validate(
            table,
            &self.values,
            &texture_names,
            &storage_names,
            self.next_diagnostic_id,
        )?;
        self.next_diagnostic_id += 1;

        if diagnostic.errors.is_empty() {
            log::warn!("[{label}] {diagnostic}");
        } else {
            log::error!("[{label}] {diagnostic}");
        }
        Some(diagnostic)
    }
}

// ─── Shared Input API ────────────────────────────────────────────────────────

/// Implements the input-facing surface shared by all drawable types. Each
/// drawable stores its `BindingSet` as `bindings`, its pipeline cache as
/// `cache` and its shader text as `source`.
macro_rules! impl_input_api {
    ($drawable:ty) => {
        impl $drawable {
            /// Replaces a data value. The name must have been part of the
            /// construction-time inputs and the value must keep its type —
            /// the packed buffer shape never changes after construction.
            pub fn set(
                &mut self,
                name: &str,
                value: impl Into<$crate::resources::value::UniformValue>,
            ) -> $crate::errors::Result<()> {
                self.bindings.set(name, value)
            }

            /// Adds or replaces a texture input. Built pipelines stay valid;
            /// only the per-call bind group changes.
            pub fn texture(
                &mut self,
                name: &str,
                slot: impl Into<$crate::resources::texture::TextureSlot>,
            ) {
                self.bindings.set_texture(name, slot.into());
            }

            /// Registers a sampler under an explicit declaration name. It
            /// wins over a texture-attached sampler when the naming chain
            /// resolves to it.
            pub fn sampler(&mut self, name: &str, sampler: wgpu::Sampler) {
                self.bindings.set_sampler(name, sampler);
            }

            /// Registers or replaces a storage buffer. This changes the
            /// binding shape: the binding table is re-discovered and every
            /// cached pipeline is dropped.
            pub fn storage(
                &mut self,
                name: &str,
                buffer: impl Into<$crate::resources::texture::StorageBufferSlot>,
            ) {
                self.bindings.set_storage(name, buffer.into());
                self.bindings.invalidate();
                self.cache.clear();
            }

            /// Removes a storage buffer, invalidating like [`Self::storage`].
            /// Returns whether anything was removed.
            pub fn remove_storage(&mut self, name: &str) -> bool {
                let removed = self.bindings.remove_storage(name);
                if removed {
                    self.bindings.invalidate();
                    self.cache.clear();
                }
                removed
            }

            /// The discovered binding table, `None` before first use (manual
            /// mode discovers lazily) or after a storage-set change.
            #[must_use]
            pub fn binding_table(&self) -> Option<&$crate::wgsl::binding::BindingTable> {
                self.bindings.table()
            }

            /// Discovers the binding table now, without touching the GPU.
            pub fn discover_bindings(&mut self) -> &$crate::wgsl::binding::BindingTable {
                self.bindings.ensure_table(&self.source)
            }

            /// Byte size of the packed uniform buffer (0 when there are no
            /// data values).
            #[must_use]
            pub fn buffer_size(&self) -> u64 {
                self.bindings.buffer_size()
            }

            /// Offsets and sizes of the packed fields, in input order.
            #[must_use]
            pub fn buffer_layout(&self) -> &[$crate::resources::layout::LayoutEntry] {
                self.bindings.layout()
            }
        }
    };
}
pub(crate) use impl_input_api;
