//! Texture → sampler naming convention resolution.
//!
//! Maps a texture-like name to the sampler declaration that serves it, via a
//! fixed suffix-resolution chain. Simple mode always generates `{name}Sampler`
//! pairs, so the first rule covers generated code; the remaining rules cover
//! common hand-written conventions.

use rustc_hash::FxHashMap;

/// Resolves the sampler declaration name for `texture_name`, first match wins:
///
/// 1. `{texture_name}Sampler`
/// 2. `{texture_name}_sampler`
/// 3. if the name ends in `Tex`: `{stem}Sampler`
/// 4. if the name ends in `Texture`: `{stem}Sampler`
///
/// Returns `None` when nothing matches. The caller decides whether that is
/// worth a warning: a table with no sampler declarations at all is a shader
/// that loads texels directly, which is fine.
#[must_use]
pub fn resolve_sampler(texture_name: &str, samplers: &FxHashMap<String, u32>) -> Option<String> {
    if samplers.is_empty() {
        return None;
    }

    let mut candidates = vec![
        format!("{texture_name}Sampler"),
        format!("{texture_name}_sampler"),
    ];
    if let Some(stem) = texture_name.strip_suffix("Tex") {
        candidates.push(format!("{stem}Sampler"));
    }
    if let Some(stem) = texture_name.strip_suffix("Texture") {
        candidates.push(format!("{stem}Sampler"));
    }

    candidates.into_iter().find(|c| samplers.contains_key(c))
}
