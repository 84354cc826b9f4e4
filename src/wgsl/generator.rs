//! Binding declaration generation (simple mode).
//!
//! Given the drawable's named inputs, emits WGSL declaration text plus the
//! matching [`BindingTable`] in two passes, both in insertion order:
//!
//! 1. one texture + one sampler declaration per texture-like input, at two
//!    consecutive binding indices. Textures come first so that index
//!    assignment is deterministic and independent of how many data fields
//!    exist.
//! 2. every data value folded into a single generated `Uniforms` struct and
//!    one `var<uniform>` declaration at the next free index. With no data
//!    values, no struct or uniform declaration is emitted at all.

use std::fmt::Write;

use crate::resources::value::ValueType;
use crate::wgsl::binding::BindingTable;

/// Variable name of the generated uniform declaration.
pub const UNIFORM_VAR: &str = "uniforms";

/// Struct name of the generated uniform block.
pub const UNIFORM_STRUCT: &str = "Uniforms";

/// Declaration text plus the binding table it encodes.
#[derive(Debug, Clone)]
pub struct GeneratedBindings {
    /// WGSL declaration block, ready to prepend to a shader body.
    pub wgsl: String,
    /// The table recording every assigned binding index.
    pub table: BindingTable,
}

/// Emits declarations for `group` from ordered texture names and data fields.
pub fn generate_bindings<'a>(
    group: u32,
    textures: impl Iterator<Item = &'a str>,
    values: impl Iterator<Item = (&'a str, ValueType)>,
) -> GeneratedBindings {
    let mut wgsl = format!("// --- Auto Generated Bindings (Group {group}) ---\n");
    let mut table = BindingTable::default();
    let mut binding = 0u32;

    // Pass 1: texture + sampler pairs.
    for name in textures {
        let _ = writeln!(
            wgsl,
            "@group({group}) @binding({binding}) var {name}: texture_2d<f32>;"
        );
        table.textures.insert(name.to_string(), binding);
        binding += 1;

        let sampler_name = format!("{name}Sampler");
        let _ = writeln!(
            wgsl,
            "@group({group}) @binding({binding}) var {sampler_name}: sampler;"
        );
        table.samplers.insert(sampler_name, binding);
        binding += 1;
    }

    // Pass 2: one aggregate struct for all data values.
    let mut struct_body = String::new();
    let mut field_count = 0usize;
    for (name, ty) in values {
        let _ = writeln!(struct_body, "    {name}: {},", ty.wgsl_type_name());
        field_count += 1;
    }

    if field_count > 0 {
        let _ = writeln!(wgsl, "struct {UNIFORM_STRUCT} {{\n{struct_body}}};");
        let _ = writeln!(
            wgsl,
            "@group({group}) @binding({binding}) var<uniform> {UNIFORM_VAR}: {UNIFORM_STRUCT};"
        );
        table.uniform_buffer = Some(binding);
    }

    GeneratedBindings { wgsl, table }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_data_values_emits_no_uniform_declaration() {
        let generated = generate_bindings(0, ["map"].into_iter(), std::iter::empty());
        assert_eq!(generated.table.uniform_buffer, None);
        assert!(!generated.wgsl.contains("var<uniform>"));
        assert_eq!(generated.table.textures["map"], 0);
        assert_eq!(generated.table.samplers["mapSampler"], 1);
    }
}
