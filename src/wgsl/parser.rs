//! Binding declaration discovery (manual mode).
//!
//! Extracts a [`BindingTable`] from hand-written shader source. The grammar
//! recognized is the resource-declaration form
//!
//! ```text
//! @group(g) @binding(b) var<QUALIFIER,...>? NAME : TYPE... ;
//! ```
//!
//! Rather than regex matching over raw text, the source is tokenized first
//! (comments stripped, idents/ints/punctuation separated) and a single-pass
//! state machine walks the token stream. This keeps the classification purely
//! lexical while staying robust against comments containing `@group`, nested
//! angle brackets in type expressions, and attribute order variations.
//!
//! Classification priority per declaration:
//!
//! 1. qualifier `uniform` → uniform buffer
//! 2. qualifier starting with `storage` → storage buffer
//! 3. type containing a `texture_storage_*` ident → storage texture
//! 4. type containing a `texture_*` ident → sampled texture
//! 5. type `sampler` / `sampler_comparison` → sampler
//!
//! A `var` with no address-space qualifier is never classified as a storage
//! buffer, even when its type is an array: WGSL requires an explicit address
//! space for buffer bindings, so the unqualified form is skipped.
//!
//! The parse is re-run independently per requested group index; a shader with
//! multiple declaration groups is queried once per group.

use crate::wgsl::binding::{BindingTable, StorageBufferBinding, StorageTextureBinding};

// ─── Tokenizer ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Ident(&'a str),
    Int(u32),
    Punct(char),
}

/// Splits source into idents, integers and punctuation, skipping whitespace
/// and both comment forms (block comments nest, as in WGSL).
fn tokenize(source: &str) -> Vec<Token<'_>> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i] as char;

        if c.is_ascii_whitespace() {
            i += 1;
        } else if c == '/' && bytes.get(i + 1) == Some(&b'/') {
            while i < bytes.len() && bytes[i] != b'\n' {
                i += 1;
            }
        } else if c == '/' && bytes.get(i + 1) == Some(&b'*') {
            let mut depth = 1;
            i += 2;
            while i < bytes.len() && depth > 0 {
                if bytes[i] == b'/' && bytes.get(i + 1) == Some(&b'*') {
                    depth += 1;
                    i += 2;
                } else if bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/') {
                    depth -= 1;
                    i += 2;
                } else {
                    i += 1;
                }
            }
        } else if c.is_ascii_alphabetic() || c == '_' {
            let start = i;
            while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                i += 1;
            }
            tokens.push(Token::Ident(&source[start..i]));
        } else if c.is_ascii_digit() {
            let start = i;
            // Consume the whole numeric literal (floats, suffixes, hex) so a
            // body like `1.5e3` never leaks digits into the token stream.
            while i < bytes.len()
                && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'.')
            {
                i += 1;
            }
            let lexeme = &source[start..i];
            match lexeme.parse::<u32>() {
                Ok(v) => tokens.push(Token::Int(v)),
                Err(_) => tokens.push(Token::Ident(lexeme)),
            }
        } else {
            tokens.push(Token::Punct(c));
            i += 1;
        }
    }

    tokens
}

// ─── Declaration State Machine ───────────────────────────────────────────────

/// One recognized resource declaration, before classification.
struct RawDeclaration<'a> {
    group: u32,
    binding: u32,
    qualifiers: Vec<&'a str>,
    name: &'a str,
    type_tokens: Vec<Token<'a>>,
}

/// Scans an attribute run (`@group(1) @binding(2) @foo ...`) starting at
/// `pos` (which points at `@`). Returns the position after the run plus any
/// group/binding values found.
fn scan_attributes(tokens: &[Token<'_>], mut pos: usize) -> (usize, Option<u32>, Option<u32>) {
    let mut group = None;
    let mut binding = None;

    while pos < tokens.len() && tokens[pos] == Token::Punct('@') {
        let Some(Token::Ident(attr)) = tokens.get(pos + 1) else {
            return (pos + 1, group, binding);
        };
        pos += 2;

        if tokens.get(pos) == Some(&Token::Punct('(')) {
            // Single-int attributes are inspected; everything else
            // (`@workgroup_size(8, 8)`, …) is skipped over by paren depth.
            if let (Some(Token::Int(v)), Some(Token::Punct(')'))) =
                (tokens.get(pos + 1), tokens.get(pos + 2))
            {
                match *attr {
                    "group" => group = Some(*v),
                    "binding" => binding = Some(*v),
                    _ => {}
                }
                pos += 3;
            } else {
                let mut depth = 0usize;
                while pos < tokens.len() {
                    match tokens[pos] {
                        Token::Punct('(') => depth += 1,
                        Token::Punct(')') => {
                            depth -= 1;
                            if depth == 0 {
                                pos += 1;
                                break;
                            }
                        }
                        _ => {}
                    }
                    pos += 1;
                }
            }
        }
    }

    (pos, group, binding)
}

/// Parses one `var` declaration at `pos` (pointing at the `var` ident).
/// Returns the position after the terminating `;` and the declaration parts,
/// or `None` when the shape does not match.
fn scan_var<'a>(
    tokens: &[Token<'a>],
    mut pos: usize,
) -> Option<(usize, Vec<&'a str>, &'a str, Vec<Token<'a>>)> {
    if tokens.get(pos) != Some(&Token::Ident("var")) {
        return None;
    }
    pos += 1;

    let mut qualifiers = Vec::new();
    if tokens.get(pos) == Some(&Token::Punct('<')) {
        pos += 1;
        while pos < tokens.len() && tokens[pos] != Token::Punct('>') {
            if let Token::Ident(q) = tokens[pos] {
                qualifiers.push(q);
            }
            pos += 1;
        }
        pos += 1; // '>'
    }

    let Some(Token::Ident(name)) = tokens.get(pos) else {
        return None;
    };
    pos += 1;

    if tokens.get(pos) != Some(&Token::Punct(':')) {
        return None;
    }
    pos += 1;

    let type_start = pos;
    while pos < tokens.len() && tokens[pos] != Token::Punct(';') {
        pos += 1;
    }
    let type_tokens = tokens[type_start..pos].to_vec();

    Some((pos + 1, qualifiers, name, type_tokens))
}

fn scan_declarations<'a>(tokens: &'a [Token<'a>]) -> Vec<RawDeclaration<'a>> {
    let mut declarations = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        if tokens[i] != Token::Punct('@') {
            i += 1;
            continue;
        }

        let (after_attrs, group, binding) = scan_attributes(tokens, i);
        let (Some(group), Some(binding)) = (group, binding) else {
            i = after_attrs.max(i + 1);
            continue;
        };

        match scan_var(tokens, after_attrs) {
            Some((next, qualifiers, name, type_tokens)) => {
                declarations.push(RawDeclaration {
                    group,
                    binding,
                    qualifiers,
                    name,
                    type_tokens,
                });
                i = next;
            }
            None => i = after_attrs.max(i + 1),
        }
    }

    declarations
}

// ─── Classification ──────────────────────────────────────────────────────────

/// Maps a WGSL storage-texture texel format ident to its wgpu format.
fn texel_format(ident: &str) -> Option<wgpu::TextureFormat> {
    use wgpu::TextureFormat as F;
    match ident {
        "rgba8unorm" => Some(F::Rgba8Unorm),
        "rgba8snorm" => Some(F::Rgba8Snorm),
        "rgba8uint" => Some(F::Rgba8Uint),
        "rgba8sint" => Some(F::Rgba8Sint),
        "rgba16float" => Some(F::Rgba16Float),
        "rgba16uint" => Some(F::Rgba16Uint),
        "rgba16sint" => Some(F::Rgba16Sint),
        "rgba32float" => Some(F::Rgba32Float),
        "rgba32uint" => Some(F::Rgba32Uint),
        "rgba32sint" => Some(F::Rgba32Sint),
        "r32float" => Some(F::R32Float),
        "r32uint" => Some(F::R32Uint),
        "r32sint" => Some(F::R32Sint),
        "rg32float" => Some(F::Rg32Float),
        "rg32uint" => Some(F::Rg32Uint),
        "rg32sint" => Some(F::Rg32Sint),
        "bgra8unorm" => Some(F::Bgra8Unorm),
        _ => None,
    }
}

/// The format ident sits directly inside the storage-texture template:
/// `texture_storage_2d<rgba8unorm, write>`.
fn storage_texture_format(type_tokens: &[Token<'_>]) -> Option<wgpu::TextureFormat> {
    let at = type_tokens.iter().position(
        |t| matches!(t, Token::Ident(id) if id.starts_with("texture_storage")),
    )?;
    match (type_tokens.get(at + 1), type_tokens.get(at + 2)) {
        (Some(Token::Punct('<')), Some(Token::Ident(fmt))) => texel_format(fmt),
        _ => None,
    }
}

fn classify(table: &mut BindingTable, declaration: &RawDeclaration<'_>) {
    let name = declaration.name.to_string();
    let binding = declaration.binding;
    let ty = &declaration.type_tokens;

    match declaration.qualifiers.first() {
        Some(&"uniform") => {
            table.uniform_buffer = Some(binding);
            return;
        }
        Some(q) if q.starts_with("storage") => {
            let read_only = !declaration.qualifiers.contains(&"read_write");
            table
                .storage_buffers
                .insert(name, StorageBufferBinding { binding, read_only });
            return;
        }
        _ => {}
    }

    let has_ident = |pred: fn(&str) -> bool| {
        ty.iter()
            .any(|t| matches!(t, Token::Ident(id) if pred(id)))
    };

    if has_ident(|id| id.starts_with("texture_storage")) {
        let format = storage_texture_format(ty);
        table
            .storage_textures
            .insert(name, StorageTextureBinding { binding, format });
    } else if has_ident(|id| id.starts_with("texture_")) {
        table.textures.insert(name, binding);
    } else if matches!(
        ty.first(),
        Some(Token::Ident("sampler")) | Some(Token::Ident("sampler_comparison"))
    ) {
        table.samplers.insert(name, binding);
    }
    // Anything else — plain module-scope vars, unqualified arrays — is not a
    // resource binding and is skipped.
}

// ─── Public Entry Points ─────────────────────────────────────────────────────

/// Extracts the binding table for one declaration group from shader source.
#[must_use]
pub fn parse_bindings(source: &str, group: u32) -> BindingTable {
    let tokens = tokenize(source);
    let mut table = BindingTable::default();

    for declaration in scan_declarations(&tokens) {
        if declaration.group == group {
            classify(&mut table, &declaration);
        }
    }

    table
}

/// True when the source declares any binding in `group`.
#[must_use]
pub fn declares_group(source: &str, group: u32) -> bool {
    !parse_bindings(source, group).is_empty()
}

/// Lexical check that `fn entry` exists in the source, used to turn a missing
/// entry point into a synchronous error instead of a deferred device error.
#[must_use]
pub fn has_entry_point(source: &str, entry: &str) -> bool {
    let tokens = tokenize(source);
    tokens
        .windows(2)
        .any(|w| w[0] == Token::Ident("fn") && w[1] == Token::Ident(entry))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizer_strips_nested_block_comments() {
        let tokens = tokenize("/* outer /* inner */ still */ var");
        assert_eq!(tokens, vec![Token::Ident("var")]);
    }

    #[test]
    fn tokenizer_keeps_float_literals_whole() {
        let tokens = tokenize("let x = 1.5e3;");
        assert!(tokens.contains(&Token::Ident("1.5e3")));
    }

    #[test]
    fn attribute_order_does_not_matter() {
        let table = parse_bindings("@binding(3) @group(1) var t: texture_2d<f32>;", 1);
        assert_eq!(table.textures.get("t"), Some(&3));
    }

    #[test]
    fn commented_out_declarations_are_ignored() {
        let source = "// @group(0) @binding(0) var ghost: texture_2d<f32>;\n\
                      @group(0) @binding(0) var real: sampler;";
        let table = parse_bindings(source, 0);
        assert!(table.textures.is_empty());
        assert_eq!(table.samplers.get("real"), Some(&0));
    }
}
