//! Input descriptions: tagged values, resource slots and buffer layout.

pub mod layout;
pub mod texture;
pub mod value;

pub use layout::{LayoutEntry, align_up, compute_layout, packed_size};
pub use texture::{StorageBufferSlot, TextureSlot};
pub use value::{UniformMap, UniformValue, ValueType};
