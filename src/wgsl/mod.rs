//! WGSL binding declarations: generation (simple mode), discovery by parsing
//! (manual mode), and the naming conventions tying textures to samplers.

pub mod binding;
pub mod generator;
pub mod naming;
pub mod parser;

pub use binding::{BindingTable, StorageBufferBinding, StorageTextureBinding};
pub use generator::{GeneratedBindings, generate_bindings};
pub use naming::resolve_sampler;
pub use parser::{declares_group, has_entry_point, parse_bindings};
