//! WGSL Binding Tests
//!
//! Tests for:
//! - generate_bindings: texture/sampler pair indices, uniform struct placement
//! - parse_bindings: qualifier/type classification, group filtering,
//!   robustness against comments and attribute order
//! - resolve_sampler: the four-step naming chain
//! - has_entry_point / declares_group

use rustc_hash::FxHashMap;

use lucent::resources::value::ValueType;
use lucent::wgsl::{
    declares_group, generate_bindings, has_entry_point, parse_bindings, resolve_sampler,
};

fn samplers(names: &[&str]) -> FxHashMap<String, u32> {
    names
        .iter()
        .enumerate()
        .map(|(i, n)| ((*n).to_string(), i as u32))
        .collect()
}

// ============================================================================
// Generation (Simple Mode)
// ============================================================================

#[test]
fn values_only_assigns_uniform_buffer_binding_zero() {
    let generated = generate_bindings(
        0,
        std::iter::empty(),
        [("radius", ValueType::Scalar), ("color", ValueType::Vec3)].into_iter(),
    );
    assert_eq!(generated.table.uniform_buffer, Some(0));
    assert!(generated.table.textures.is_empty());
    assert!(generated.wgsl.contains("radius: f32"));
    assert!(generated.wgsl.contains("color: vec3<f32>"));
    assert!(generated.wgsl.contains("@group(0) @binding(0) var<uniform>"));
}

#[test]
fn texture_pairs_take_consecutive_indices_before_the_uniform() {
    let generated = generate_bindings(
        0,
        ["albedo", "normal"].into_iter(),
        [("strength", ValueType::Scalar)].into_iter(),
    );
    assert_eq!(generated.table.textures["albedo"], 0);
    assert_eq!(generated.table.samplers["albedoSampler"], 1);
    assert_eq!(generated.table.textures["normal"], 2);
    assert_eq!(generated.table.samplers["normalSampler"], 3);
    assert_eq!(generated.table.uniform_buffer, Some(4));
}

#[test]
fn index_assignment_is_independent_of_data_field_count() {
    let few = generate_bindings(
        0,
        ["map"].into_iter(),
        [("a", ValueType::Scalar)].into_iter(),
    );
    let many = generate_bindings(
        0,
        ["map"].into_iter(),
        [
            ("a", ValueType::Scalar),
            ("b", ValueType::Vec4),
            ("c", ValueType::Mat4),
        ]
        .into_iter(),
    );
    assert_eq!(few.table.textures["map"], many.table.textures["map"]);
    assert_eq!(few.table.uniform_buffer, many.table.uniform_buffer);
}

#[test]
fn generated_declarations_parse_back_to_the_same_table() {
    let generated = generate_bindings(
        2,
        ["map"].into_iter(),
        [("tint", ValueType::Vec4)].into_iter(),
    );
    let parsed = parse_bindings(&generated.wgsl, 2);
    assert_eq!(parsed.textures, generated.table.textures);
    assert_eq!(parsed.samplers, generated.table.samplers);
    assert_eq!(parsed.uniform_buffer, generated.table.uniform_buffer);
}

// ============================================================================
// Parsing (Manual Mode)
// ============================================================================

#[test]
fn read_write_storage_classifies_as_storage_buffer() {
    let table = parse_bindings(
        "@group(1) @binding(2) var<storage, read_write> data: array<f32>;",
        1,
    );
    let binding = &table.storage_buffers["data"];
    assert_eq!(binding.binding, 2);
    assert!(!binding.read_only);
    assert!(table.textures.is_empty());
    assert!(table.samplers.is_empty());
}

#[test]
fn storage_without_read_write_defaults_to_read_only() {
    let table = parse_bindings("@group(0) @binding(0) var<storage> data: array<u32>;", 0);
    assert!(table.storage_buffers["data"].read_only);

    let explicit = parse_bindings(
        "@group(0) @binding(0) var<storage, read> data: array<u32>;",
        0,
    );
    assert!(explicit.storage_buffers["data"].read_only);
}

#[test]
fn storage_texture_never_lands_in_textures() {
    let table = parse_bindings(
        "@group(0) @binding(0) var output: texture_storage_2d<rgba8unorm, write>;",
        0,
    );
    assert!(table.textures.is_empty());
    let binding = &table.storage_textures["output"];
    assert_eq!(binding.binding, 0);
    assert_eq!(binding.format, Some(wgpu::TextureFormat::Rgba8Unorm));
}

#[test]
fn unqualified_array_is_not_a_storage_buffer() {
    let table = parse_bindings("@group(0) @binding(0) var data: array<f32>;", 0);
    assert!(table.is_empty());
}

#[test]
fn full_shader_parses_every_kind() {
    let source = "
        struct Params { strength: f32, };
        @group(0) @binding(0) var<uniform> params: Params;
        @group(0) @binding(1) var sceneTex: texture_2d<f32>;
        @group(0) @binding(2) var sceneSampler: sampler;
        @group(0) @binding(3) var<storage, read> lights: array<vec4<f32>>;
        @group(0) @binding(4) var target: texture_storage_2d<rgba16float, write>;

        @fragment
        fn fs_main(@location(0) uv: vec2<f32>) -> @location(0) vec4<f32> {
            return vec4<f32>(uv, 0.0, 1.0);
        }
    ";
    let table = parse_bindings(source, 0);
    assert_eq!(table.uniform_buffer, Some(0));
    assert_eq!(table.textures["sceneTex"], 1);
    assert_eq!(table.samplers["sceneSampler"], 2);
    assert_eq!(table.storage_buffers["lights"].binding, 3);
    assert_eq!(
        table.storage_textures["target"].format,
        Some(wgpu::TextureFormat::Rgba16Float)
    );
    assert_eq!(table.len(), 5);
}

#[test]
fn groups_are_queried_independently() {
    let source = "
        @group(0) @binding(0) var a: texture_2d<f32>;
        @group(1) @binding(0) var b: sampler;
    ";
    let group0 = parse_bindings(source, 0);
    let group1 = parse_bindings(source, 1);
    assert_eq!(group0.textures["a"], 0);
    assert!(group0.samplers.is_empty());
    assert_eq!(group1.samplers["b"], 0);
    assert!(group1.textures.is_empty());

    assert!(declares_group(source, 0));
    assert!(declares_group(source, 1));
    assert!(!declares_group(source, 2));
}

#[test]
fn comments_mentioning_declarations_are_ignored() {
    let source = "
        // @group(0) @binding(7) var ghost: texture_2d<f32>;
        /* @group(0) @binding(8) var<storage> phantom: array<f32>;
           /* nested, still a comment */
        */
        @group(0) @binding(1) var real: texture_2d<f32>;
    ";
    let table = parse_bindings(source, 0);
    assert_eq!(table.len(), 1);
    assert_eq!(table.textures["real"], 1);
}

#[test]
fn attribute_order_and_spacing_do_not_matter() {
    let table = parse_bindings(
        "@binding( 5 )   @group(3)\nvar  tex :\n texture_2d<f32> ;",
        3,
    );
    assert_eq!(table.textures["tex"], 5);
}

#[test]
fn entry_point_lookup_is_lexical() {
    let source = "
        fn helper() -> f32 { return 1.5e3; }
        @compute @workgroup_size(8, 8)
        fn main(@builtin(global_invocation_id) id: vec3<u32>) {}
    ";
    assert!(has_entry_point(source, "main"));
    assert!(has_entry_point(source, "helper"));
    assert!(!has_entry_point(source, "missing"));
}

// ============================================================================
// Sampler Name Resolution
// ============================================================================

#[test]
fn direct_suffix_matches_first() {
    let s = samplers(&["depthTexSampler"]);
    assert_eq!(
        resolve_sampler("depthTex", &s),
        Some("depthTexSampler".into())
    );
}

#[test]
fn snake_case_suffix_matches_second() {
    let s = samplers(&["depth_sampler"]);
    assert_eq!(resolve_sampler("depth", &s), Some("depth_sampler".into()));
}

#[test]
fn tex_stem_resolves_to_stem_sampler() {
    let s = samplers(&["depthSampler"]);
    assert_eq!(resolve_sampler("depthTex", &s), Some("depthSampler".into()));
}

#[test]
fn texture_stem_resolves_to_stem_sampler() {
    let s = samplers(&["shadowSampler"]);
    assert_eq!(
        resolve_sampler("shadowTexture", &s),
        Some("shadowSampler".into())
    );
}

#[test]
fn no_samplers_at_all_resolves_to_none() {
    assert_eq!(resolve_sampler("depthTex", &samplers(&[])), None);
}

#[test]
fn unmatched_name_resolves_to_none() {
    let s = samplers(&["otherSampler"]);
    assert_eq!(resolve_sampler("depthTex", &s), None);
}
