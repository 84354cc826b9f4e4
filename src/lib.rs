#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

//! Lucent turns a plain named-value map into GPU shader bindings.
//!
//! A drawable is described by its inputs — scalars, vectors, matrices,
//! textures, samplers, storage buffers — and either generates matching WGSL
//! binding declarations plus a correctly packed uniform buffer (*simple
//! mode*), or discovers the same binding table by parsing hand-written
//! declarations (*manual mode*). At draw/dispatch time the values are
//! serialized, a bind group is assembled fresh, and a per-output-shape
//! pipeline cache keeps compiled pipelines in sync with the binding shape.

pub mod errors;
pub mod renderer;
pub mod resources;
pub mod wgsl;

pub use errors::{LucentError, Result};
pub use renderer::{
    BindingMode, Compute, GeometryInput, Inputs, Material, Pass, RenderTarget, VertexLayout,
    WgpuContext,
};
pub use renderer::drawable::{ComputeDescriptor, IndexInput, MaterialDescriptor, PassDescriptor};
pub use resources::{StorageBufferSlot, TextureSlot, UniformValue};
