//! Error Types
//!
//! The main error type [`LucentError`] covers the synchronous failure modes of
//! the drawing layer. Binding mismatches are deliberately *not* errors — they
//! are reported as [`BindingDiagnostic`]s and the draw proceeds, because the
//! underlying graphics API raises its own authoritative validation error when
//! the mismatch is real.
//!
//! All public APIs return [`Result<T>`], an alias for
//! `std::result::Result<T, LucentError>`.
//!
//! [`BindingDiagnostic`]: crate::renderer::validate::BindingDiagnostic

use thiserror::Error;

use crate::resources::value::ValueType;

/// The main error type for the Lucent drawing layer.
#[derive(Error, Debug)]
pub enum LucentError {
    // ========================================================================
    // Input Shape Errors (fatal, raised synchronously)
    // ========================================================================
    /// `set` was called with a name that was not part of the construction-time
    /// value map. The packed buffer shape is frozen at construction; only
    /// values change afterwards.
    #[error("Unknown uniform '{0}': the value map shape is fixed at construction")]
    UnknownUniform(String),

    /// `set` was called with a value of a different type than the one the
    /// field was declared with.
    #[error("Uniform '{name}' was declared as {expected:?} but a {found:?} was supplied")]
    ValueTypeMismatch {
        /// The field name.
        name: String,
        /// The type recorded at construction.
        expected: ValueType,
        /// The type of the supplied value.
        found: ValueType,
    },

    /// The same name was supplied for two different input kinds
    /// (for example both a data value and a texture).
    #[error("Input name '{0}' was supplied more than once")]
    DuplicateInput(String),

    // ========================================================================
    // Shader Source Errors
    // ========================================================================
    /// An empty shader source was supplied.
    #[error("Shader source is empty")]
    EmptyShader,

    /// In simple mode the drawable owns one binding group; the supplied
    /// source already declares bindings there.
    #[error("Shader source already declares bindings for group {group}, which is reserved for generated bindings")]
    ReservedGroupConflict {
        /// The reserved group index.
        group: u32,
    },

    // ========================================================================
    // Pipeline Construction Errors (fatal)
    // ========================================================================
    /// The shader source does not contain the requested entry point. Detected
    /// lexically before pipeline creation so the failure is synchronous.
    #[error("Entry point 'fn {0}' not found in shader source")]
    MissingEntryPoint(String),
}

/// Alias for `Result<T, LucentError>`.
pub type Result<T> = std::result::Result<T, LucentError>;
