//! Tagged uniform values and the insertion-ordered value map.
//!
//! Callers describe shader inputs as plain named values. Every data value is
//! an explicit [`UniformValue`] variant at the API boundary — there is no
//! runtime "is this 3-element array a colour or a texture?" dispatch, so a
//! value can never be mistaken for a resource handle.
//!
//! [`UniformMap`] preserves insertion order, which is the order every layout,
//! generation and serialization step walks the fields in.

use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};
use rustc_hash::FxHashMap;

// ============================================================================
// 1. Value Types (Rust Type -> WGSL Type String + host-shareable layout)
// ============================================================================

/// The closed set of data value shapes that can live in the packed uniform
/// buffer. Texture-like and sampler-like inputs are separate collections and
/// never appear here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// One `f32`.
    Scalar,
    /// One `u32` holding 0 or 1 (`bool` is not host-shareable in WGSL).
    Bool,
    /// `vec2<f32>`.
    Vec2,
    /// `vec3<f32>` — 12 bytes of data, 16-byte alignment.
    Vec3,
    /// `vec4<f32>`.
    Vec4,
    /// `mat3x3<f32>` — three vec4-aligned columns of 12 used bytes each.
    Mat3,
    /// `mat4x4<f32>`.
    Mat4,
}

impl ValueType {
    /// Byte size of the value's data in a host-shareable buffer.
    ///
    /// For `Vec3` this is the 12 *used* bytes; the 4 trailing bytes before the
    /// next field are padding, not storage.
    #[must_use]
    pub const fn size(self) -> u64 {
        match self {
            Self::Scalar | Self::Bool => 4,
            Self::Vec2 => 8,
            Self::Vec3 => 12,
            Self::Vec4 => 16,
            Self::Mat3 => 48,
            Self::Mat4 => 64,
        }
    }

    /// Required byte alignment in a host-shareable buffer.
    #[must_use]
    pub const fn align(self) -> u64 {
        match self {
            Self::Scalar | Self::Bool => 4,
            Self::Vec2 => 8,
            Self::Vec3 | Self::Vec4 | Self::Mat3 | Self::Mat4 => 16,
        }
    }

    /// The WGSL type the field is declared as in a generated struct.
    #[must_use]
    pub const fn wgsl_type_name(self) -> &'static str {
        match self {
            Self::Scalar => "f32",
            Self::Bool => "u32",
            Self::Vec2 => "vec2<f32>",
            Self::Vec3 => "vec3<f32>",
            Self::Vec4 => "vec4<f32>",
            Self::Mat3 => "mat3x3<f32>",
            Self::Mat4 => "mat4x4<f32>",
        }
    }
}

// ============================================================================
// 2. Tagged Values
// ============================================================================

/// A single tagged data value. Exactly one variant is active.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// One `f32`.
    Scalar(f32),
    /// Serialized as one `u32`, 0 or 1.
    Bool(bool),
    /// Two contiguous `f32`.
    Vec2(Vec2),
    /// Three contiguous `f32`; the fourth slot is padding.
    Vec3(Vec3),
    /// Four contiguous `f32`.
    Vec4(Vec4),
    /// Three columns of three `f32` at a four-float stride.
    Mat3(Mat3),
    /// Four contiguous four-float columns.
    Mat4(Mat4),
}

impl UniformValue {
    /// The shape tag of this value.
    #[must_use]
    pub const fn value_type(&self) -> ValueType {
        match self {
            Self::Scalar(_) => ValueType::Scalar,
            Self::Bool(_) => ValueType::Bool,
            Self::Vec2(_) => ValueType::Vec2,
            Self::Vec3(_) => ValueType::Vec3,
            Self::Vec4(_) => ValueType::Vec4,
            Self::Mat3(_) => ValueType::Mat3,
            Self::Mat4(_) => ValueType::Mat4,
        }
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        Self::Scalar(v)
    }
}

impl From<bool> for UniformValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<Vec2> for UniformValue {
    fn from(v: Vec2) -> Self {
        Self::Vec2(v)
    }
}

impl From<Vec3> for UniformValue {
    fn from(v: Vec3) -> Self {
        Self::Vec3(v)
    }
}

impl From<Vec4> for UniformValue {
    fn from(v: Vec4) -> Self {
        Self::Vec4(v)
    }
}

impl From<Mat3> for UniformValue {
    fn from(v: Mat3) -> Self {
        Self::Mat3(v)
    }
}

impl From<Mat4> for UniformValue {
    fn from(v: Mat4) -> Self {
        Self::Mat4(v)
    }
}

impl From<[f32; 2]> for UniformValue {
    fn from(v: [f32; 2]) -> Self {
        Self::Vec2(Vec2::from_array(v))
    }
}

impl From<[f32; 3]> for UniformValue {
    fn from(v: [f32; 3]) -> Self {
        Self::Vec3(Vec3::from_array(v))
    }
}

impl From<[f32; 4]> for UniformValue {
    fn from(v: [f32; 4]) -> Self {
        Self::Vec4(Vec4::from_array(v))
    }
}

// ============================================================================
// 3. Insertion-Ordered Value Map
// ============================================================================

/// Name → value map that iterates in insertion order.
///
/// Backed by a `Vec` of entries plus an `FxHashMap` name index. Replacing an
/// existing name keeps its original position, so the buffer layout derived
/// from the map is stable across value updates.
#[derive(Debug, Clone, Default)]
pub struct UniformMap {
    entries: Vec<(String, UniformValue)>,
    index: FxHashMap<String, usize>,
}

impl UniformMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, or replaces the value of an existing name in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<UniformValue>) {
        let name = name.into();
        let value = value.into();
        if let Some(&i) = self.index.get(&name) {
            self.entries[i].1 = value;
        } else {
            self.index.insert(name.clone(), self.entries.len());
            self.entries.push((name, value));
        }
    }

    /// Looks a value up by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&UniformValue> {
        self.index.get(name).map(|&i| &self.entries[i].1)
    }

    /// True when the map holds a value under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the map holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &UniformValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Iterates `(name, type)` pairs in insertion order.
    pub fn field_types(&self) -> impl Iterator<Item = (&str, ValueType)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.value_type()))
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut UniformValue> {
        self.index.get(name).map(|&i| &mut self.entries[i].1)
    }
}
