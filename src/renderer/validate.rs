//! Binding mismatch diagnostics.
//!
//! Diagnoses binding-table vs. input mismatches before assembly so the caller
//! gets an actionable report instead of (or ahead of) the graphics API's own
//! validation error. Diagnostics are advisory only: the draw proceeds
//! regardless, because the underlying API raises the authoritative error when
//! the mismatch is real.
//!
//! Diagnostic ids come from a counter owned by each drawable, so independent
//! drawables stay deterministic and testable in isolation.

use std::fmt;

use crate::resources::value::UniformMap;
use crate::wgsl::binding::BindingTable;
use crate::wgsl::naming::resolve_sampler;

/// Category of one reported issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueKind {
    /// A declared texture binding has no matching texture input.
    MissingTexture,
    /// A declared storage-buffer binding has no registered buffer.
    MissingStorageBuffer,
    /// A declared uniform block exists but the value map is empty.
    EmptyUniformBlock,
    /// A data value was supplied where the shader declared a resource.
    WrongShape,
    /// A texture input found no sampler declaration via the naming chain,
    /// although the shader does declare samplers. Warning only.
    UnresolvedSampler,
}

/// One issue with an actionable fix example.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingIssue {
    /// Category.
    pub kind: IssueKind,
    /// The binding or input name concerned.
    pub name: String,
    /// One concrete fix suggestion.
    pub fix: String,
}

/// Structured mismatch report for one drawable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingDiagnostic {
    /// Per-drawable sequence number.
    pub id: u64,
    /// Mismatches that the graphics API would also reject.
    pub errors: Vec<BindingIssue>,
    /// Suspicious but drawable states.
    pub warnings: Vec<BindingIssue>,
}

impl fmt::Display for BindingDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "binding diagnostic #{}: {} error(s), {} warning(s)",
            self.id,
            self.errors.len(),
            self.warnings.len()
        )?;
        for issue in &self.errors {
            writeln!(f, "  error[{:?}] '{}': {}", issue.kind, issue.name, issue.fix)?;
        }
        for issue in &self.warnings {
            writeln!(f, "  warn[{:?}] '{}': {}", issue.kind, issue.name, issue.fix)?;
        }
        Ok(())
    }
}

fn sorted_keys<V>(map: &rustc_hash::FxHashMap<String, V>) -> Vec<&str> {
    let mut keys: Vec<&str> = map.keys().map(String::as_str).collect();
    keys.sort_unstable();
    keys
}

/// Compares the binding table against the supplied inputs.
///
/// Returns `None` when everything matches. `id` is the drawable's next
/// diagnostic sequence number.
#[must_use]
pub fn validate(
    table: &BindingTable,
    values: &UniformMap,
    texture_inputs: &[&str],
    storage_inputs: &[&str],
    id: u64,
) -> Option<BindingDiagnostic> {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for name in sorted_keys(&table.textures) {
        if texture_inputs.contains(&name) {
            continue;
        }
        if values.contains(name) {
            errors.push(BindingIssue {
                kind: IssueKind::WrongShape,
                name: name.to_string(),
                fix: format!(
                    "'{name}' is declared as a texture but was supplied as a data value; \
                     pass it via drawable.texture(\"{name}\", TextureSlot::from(view))"
                ),
            });
        } else {
            errors.push(BindingIssue {
                kind: IssueKind::MissingTexture,
                name: name.to_string(),
                fix: format!("add drawable.texture(\"{name}\", TextureSlot::from(view))"),
            });
        }
    }

    for name in sorted_keys(&table.storage_textures) {
        if !texture_inputs.contains(&name) {
            errors.push(BindingIssue {
                kind: IssueKind::MissingTexture,
                name: name.to_string(),
                fix: format!("add drawable.texture(\"{name}\", TextureSlot::from(view))"),
            });
        }
    }

    for name in sorted_keys(&table.storage_buffers) {
        if !storage_inputs.contains(&name) {
            let issue = if values.contains(name) {
                BindingIssue {
                    kind: IssueKind::WrongShape,
                    name: name.to_string(),
                    fix: format!(
                        "'{name}' is declared as a storage buffer but was supplied as a data \
                         value; register it via drawable.storage(\"{name}\", \
                         StorageBufferSlot::new(buffer))"
                    ),
                }
            } else {
                BindingIssue {
                    kind: IssueKind::MissingStorageBuffer,
                    name: name.to_string(),
                    fix: format!(
                        "add drawable.storage(\"{name}\", StorageBufferSlot::new(buffer))"
                    ),
                }
            };
            errors.push(issue);
        }
    }

    if table.uniform_buffer.is_some() && values.is_empty() {
        errors.push(BindingIssue {
            kind: IssueKind::EmptyUniformBlock,
            name: "uniforms".to_string(),
            fix: "the shader declares a uniform block but no data values were supplied; \
                  add them to the construction-time inputs"
                .to_string(),
        });
    }

    for &name in texture_inputs {
        if table.textures.contains_key(name)
            && !table.samplers.is_empty()
            && resolve_sampler(name, &table.samplers).is_none()
        {
            warnings.push(BindingIssue {
                kind: IssueKind::UnresolvedSampler,
                name: name.to_string(),
                fix: format!(
                    "no declared sampler matches '{name}'; name one '{name}Sampler' to pick \
                     it up automatically"
                ),
            });
        }
    }

    if errors.is_empty() && warnings.is_empty() {
        None
    } else {
        Some(BindingDiagnostic {
            id,
            errors,
            warnings,
        })
    }
}
