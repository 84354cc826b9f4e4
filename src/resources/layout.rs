//! Host-shareable buffer layout calculation.
//!
//! Pure functions mapping tagged values to byte size + alignment, and folding
//! an ordered field sequence into offsets and a total packed size. The rules
//! follow the WGSL uniform address-space layout: fields are aligned up to
//! their own alignment, and the final buffer size is rounded up to the next
//! multiple of 16 regardless of the last field's alignment (minimum
//! buffer-size alignment rule).

use crate::resources::value::ValueType;

/// One field of the packed uniform buffer, in value-map insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutEntry {
    /// Field name as supplied by the caller.
    pub name: String,
    /// Byte offset of the field's first byte. Always a multiple of `align`.
    pub offset: u64,
    /// Byte size of the field's data (12 for vec3, padding excluded).
    pub size: u64,
    /// Required alignment of the field.
    pub align: u64,
}

/// Rounds `value` up to the next multiple of `align` (a power of two).
#[must_use]
pub const fn align_up(value: u64, align: u64) -> u64 {
    value.div_ceil(align) * align
}

/// Folds `fields` in order into layout entries and the total packed size.
///
/// The size is the smallest multiple of 16 that holds the last field's end
/// offset; an empty field list packs to zero bytes.
pub fn compute_layout<'a>(
    fields: impl Iterator<Item = (&'a str, ValueType)>,
) -> (Vec<LayoutEntry>, u64) {
    let mut entries = Vec::new();
    let mut offset = 0u64;

    for (name, ty) in fields {
        offset = align_up(offset, ty.align());
        entries.push(LayoutEntry {
            name: name.to_string(),
            offset,
            size: ty.size(),
            align: ty.align(),
        });
        offset += ty.size();
    }

    if entries.is_empty() {
        (entries, 0)
    } else {
        (entries, align_up(offset, 16))
    }
}

/// Total packed size of an ordered field sequence, without the entries.
pub fn packed_size<'a>(fields: impl Iterator<Item = (&'a str, ValueType)>) -> u64 {
    compute_layout(fields).1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec3_then_scalar_packs_into_sixteen_bytes() {
        let (entries, size) =
            compute_layout([("a", ValueType::Vec3), ("b", ValueType::Scalar)].into_iter());
        assert_eq!(entries[0].offset, 0);
        assert_eq!(entries[0].size, 12);
        assert_eq!(entries[1].offset, 12);
        assert_eq!(size, 16);
    }

    #[test]
    fn scalar_then_vec3_pushes_the_vector_to_sixteen() {
        let (entries, size) =
            compute_layout([("a", ValueType::Scalar), ("b", ValueType::Vec3)].into_iter());
        assert_eq!(entries[0].offset, 0);
        assert_eq!(entries[1].offset, 16);
        assert_eq!(size, 32);
    }

    #[test]
    fn empty_map_packs_to_zero() {
        let (entries, size) = compute_layout(std::iter::empty());
        assert!(entries.is_empty());
        assert_eq!(size, 0);
    }
}
