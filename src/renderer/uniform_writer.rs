//! Packed uniform buffer serialization.
//!
//! Replays the same offset/alignment walk as the layout calculator and writes
//! each data value at its computed offset:
//!
//! - scalar → one `f32`
//! - bool → one `u32`, 0 or 1
//! - vecN → N contiguous `f32` (vec3 writes only three; the fourth slot is
//!   padding and stays untouched)
//! - mat3 → three columns of three floats at a four-float stride
//! - mat4 → four contiguous four-float columns
//!
//! Called once per draw/dispatch whenever any data value exists. Rewriting
//! unconditionally keeps the model simple at the cost of redundant writes
//! when nothing changed.

use crate::resources::layout::align_up;
use crate::resources::value::{UniformMap, UniformValue};

fn write_floats(out: &mut [u8], offset: u64, values: &[f32]) {
    let start = offset as usize;
    let bytes = bytemuck::cast_slice(values);
    out[start..start + bytes.len()].copy_from_slice(bytes);
}

/// Serializes `values` into `out` at the offsets the layout walk computes.
///
/// `out` must be at least `packed_size` bytes (the drawable's staging buffer
/// is allocated from the same walk, so this holds by construction).
pub fn write_uniforms(values: &UniformMap, out: &mut [u8]) {
    let mut offset = 0u64;

    for (_, value) in values.iter() {
        let ty = value.value_type();
        offset = align_up(offset, ty.align());

        match value {
            UniformValue::Scalar(v) => write_floats(out, offset, &[*v]),
            UniformValue::Bool(v) => {
                let word: u32 = u32::from(*v);
                let start = offset as usize;
                out[start..start + 4].copy_from_slice(&word.to_le_bytes());
            }
            UniformValue::Vec2(v) => write_floats(out, offset, &v.to_array()),
            UniformValue::Vec3(v) => write_floats(out, offset, &v.to_array()),
            UniformValue::Vec4(v) => write_floats(out, offset, &v.to_array()),
            UniformValue::Mat3(m) => {
                // Columns land at vec4 stride; the trailing float per column
                // is padding.
                for (column, axis) in [m.x_axis, m.y_axis, m.z_axis].into_iter().enumerate() {
                    write_floats(out, offset + column as u64 * 16, &axis.to_array());
                }
            }
            UniformValue::Mat4(m) => write_floats(out, offset, &m.to_cols_array()),
        }

        offset += ty.size();
    }
}
