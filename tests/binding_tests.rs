//! Bind-Group Planning + Drawable Surface Tests
//!
//! Tests for:
//! - plan_bind_group: entry ordering, uniform inclusion rule, storage-texture
//!   sampler exclusion, graceful skipping of unknown names
//! - validate: error/warning categories, per-drawable diagnostic ids
//! - Pass/Material/Compute construction errors and the device-free parts of
//!   the input API (set, binding_table, buffer_layout)

use glam::Vec3;

use lucent::renderer::validate::{IssueKind, validate};
use lucent::renderer::{PlannedResource, plan_bind_group};
use lucent::resources::value::UniformMap;
use lucent::wgsl::binding::{BindingTable, StorageBufferBinding, StorageTextureBinding};
use lucent::{
    BindingMode, Compute, ComputeDescriptor, Inputs, LucentError, Material, MaterialDescriptor,
    Pass, PassDescriptor,
};

fn table_with_texture_pair() -> BindingTable {
    let mut table = BindingTable::default();
    table.textures.insert("sceneTex".into(), 0);
    table.samplers.insert("sceneSampler".into(), 1);
    table.uniform_buffer = Some(2);
    table
}

// ============================================================================
// Plan Assembly
// ============================================================================

#[test]
fn plan_orders_entries_by_binding_index() {
    let table = table_with_texture_pair();
    let plan = plan_bind_group(&table, ["sceneTex"].into_iter(), std::iter::empty(), true);

    let bindings: Vec<u32> = plan.iter().map(|e| e.binding).collect();
    assert_eq!(bindings, [0, 1, 2]);
    assert!(matches!(
        plan[1].resource,
        PlannedResource::Sampler { ref binding_name, .. } if binding_name == "sceneSampler"
    ));
}

#[test]
fn uniform_entry_requires_declared_binding_and_values() {
    let table = table_with_texture_pair();
    let without_values =
        plan_bind_group(&table, ["sceneTex"].into_iter(), std::iter::empty(), false);
    assert!(
        !without_values
            .iter()
            .any(|e| e.resource == PlannedResource::UniformBuffer)
    );

    let mut undeclared = table_with_texture_pair();
    undeclared.uniform_buffer = None;
    let plan = plan_bind_group(&undeclared, ["sceneTex"].into_iter(), std::iter::empty(), true);
    assert!(!plan.iter().any(|e| e.resource == PlannedResource::UniformBuffer));
}

#[test]
fn storage_texture_never_gets_a_sampler_entry() {
    let mut table = BindingTable::default();
    table
        .storage_textures
        .insert("outputTex".into(), StorageTextureBinding {
            binding: 0,
            format: None,
        });
    // A sampler that the naming chain would resolve for "outputTex".
    table.samplers.insert("outputTexSampler".into(), 1);

    let plan = plan_bind_group(&table, ["outputTex"].into_iter(), std::iter::empty(), false);
    assert_eq!(plan.len(), 1);
    assert!(matches!(
        plan[0].resource,
        PlannedResource::StorageTexture { ref name } if name == "outputTex"
    ));
}

#[test]
fn sampled_texture_without_resolvable_sampler_emits_view_only() {
    let mut table = BindingTable::default();
    table.textures.insert("noise".into(), 0);
    let plan = plan_bind_group(&table, ["noise"].into_iter(), std::iter::empty(), false);
    assert_eq!(plan.len(), 1);
    assert!(matches!(plan[0].resource, PlannedResource::TextureView { .. }));
}

#[test]
fn names_absent_from_the_table_are_skipped_silently() {
    let table = table_with_texture_pair();
    let plan = plan_bind_group(
        &table,
        ["sceneTex", "unusedTex"].into_iter(),
        ["unusedBuffer"].into_iter(),
        true,
    );
    assert_eq!(plan.len(), 3);
}

#[test]
fn storage_buffers_are_planned_iff_registered() {
    let mut table = BindingTable::default();
    table.storage_buffers.insert("particles".into(), StorageBufferBinding {
        binding: 0,
        read_only: false,
    });

    let empty = plan_bind_group(&table, std::iter::empty(), std::iter::empty(), false);
    assert!(empty.is_empty());

    let plan = plan_bind_group(&table, std::iter::empty(), ["particles"].into_iter(), false);
    assert!(matches!(
        plan[0].resource,
        PlannedResource::StorageBuffer { ref name } if name == "particles"
    ));
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn matching_inputs_produce_no_diagnostic() {
    let table = table_with_texture_pair();
    let mut values = UniformMap::new();
    values.insert("strength", 1.0f32);
    assert!(validate(&table, &values, &["sceneTex"], &[], 0).is_none());
}

#[test]
fn missing_texture_is_an_error() {
    let table = table_with_texture_pair();
    let mut values = UniformMap::new();
    values.insert("strength", 1.0f32);

    let diagnostic = validate(&table, &values, &[], &[], 0).unwrap();
    assert_eq!(diagnostic.errors.len(), 1);
    assert_eq!(diagnostic.errors[0].kind, IssueKind::MissingTexture);
    assert_eq!(diagnostic.errors[0].name, "sceneTex");
    assert!(diagnostic.errors[0].fix.contains("sceneTex"));
}

#[test]
fn data_value_under_a_texture_name_is_a_shape_error() {
    let table = table_with_texture_pair();
    let mut values = UniformMap::new();
    values.insert("sceneTex", Vec3::ONE);

    let diagnostic = validate(&table, &values, &[], &[], 0).unwrap();
    assert!(
        diagnostic
            .errors
            .iter()
            .any(|issue| issue.kind == IssueKind::WrongShape && issue.name == "sceneTex")
    );
}

#[test]
fn declared_uniform_block_with_no_values_is_an_error() {
    let table = table_with_texture_pair();
    let diagnostic = validate(&table, &UniformMap::new(), &["sceneTex"], &[], 0).unwrap();
    assert!(
        diagnostic
            .errors
            .iter()
            .any(|issue| issue.kind == IssueKind::EmptyUniformBlock)
    );
}

#[test]
fn missing_storage_buffer_is_an_error() {
    let mut table = BindingTable::default();
    table.storage_buffers.insert("lights".into(), StorageBufferBinding {
        binding: 0,
        read_only: true,
    });
    let diagnostic = validate(&table, &UniformMap::new(), &[], &[], 3).unwrap();
    assert_eq!(diagnostic.id, 3);
    assert_eq!(diagnostic.errors[0].kind, IssueKind::MissingStorageBuffer);
}

#[test]
fn unresolvable_sampler_is_a_warning_not_an_error() {
    let mut table = BindingTable::default();
    table.textures.insert("depthTex".into(), 0);
    table.samplers.insert("unrelatedSampler".into(), 1);

    let diagnostic = validate(&table, &UniformMap::new(), &["depthTex"], &[], 0).unwrap();
    assert!(diagnostic.errors.is_empty());
    assert_eq!(diagnostic.warnings[0].kind, IssueKind::UnresolvedSampler);
}

#[test]
fn texture_without_any_declared_samplers_is_fine() {
    let mut table = BindingTable::default();
    table.textures.insert("depthTex".into(), 0);
    assert!(validate(&table, &UniformMap::new(), &["depthTex"], &[], 0).is_none());
}

// ============================================================================
// Drawable Construction
// ============================================================================

const FRAGMENT: &str = "
    @fragment
    fn fs_main(@location(0) uv: vec2<f32>) -> @location(0) vec4<f32> {
        return vec4<f32>(uniforms.color, uniforms.radius);
    }
";

const FULL_SHADER: &str = "
    @group(0) @binding(0) var<uniform> radius: f32;

    @vertex
    fn vs_main(@builtin(vertex_index) i: u32) -> @builtin(position) vec4<f32> {
        return vec4<f32>(0.0);
    }

    @fragment
    fn fs_main() -> @location(0) vec4<f32> {
        return vec4<f32>(radius);
    }
";

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn simple_pass() -> Pass {
    init_logs();
    Pass::new(
        &PassDescriptor::new("test pass", FRAGMENT),
        Inputs::new()
            .value("radius", 0.5f32)
            .value("color", Vec3::new(1.0, 0.0, 0.0)),
    )
    .unwrap()
}

#[test]
fn empty_source_is_rejected() {
    let result = Pass::new(&PassDescriptor::new("empty", "   \n"), Inputs::new());
    assert!(matches!(result, Err(LucentError::EmptyShader)));
}

#[test]
fn simple_mode_rejects_sources_declaring_the_reserved_group() {
    let result = Pass::new(
        &PassDescriptor::new("conflict", FULL_SHADER),
        Inputs::new().value("radius", 0.5f32),
    );
    assert!(matches!(
        result,
        Err(LucentError::ReservedGroupConflict { group: 0 })
    ));
}

#[test]
fn simple_mode_discovers_eagerly() {
    let pass = simple_pass();
    let table = pass.binding_table().unwrap();
    assert_eq!(table.uniform_buffer, Some(0));
    assert_eq!(pass.buffer_size(), 32);

    let layout = pass.buffer_layout();
    assert_eq!(layout[0].name, "radius");
    assert_eq!(layout[0].offset, 0);
    assert_eq!(layout[1].name, "color");
    assert_eq!(layout[1].offset, 16);
}

#[test]
fn manual_mode_discovers_lazily() {
    let mut pass = Pass::new(
        &PassDescriptor {
            label: "manual",
            source: FULL_SHADER,
            mode: BindingMode::Manual,
            group: 0,
        },
        Inputs::new().value("radius", 0.5f32),
    )
    .unwrap();

    assert!(pass.binding_table().is_none());
    let table = pass.discover_bindings();
    assert_eq!(table.uniform_buffer, Some(0));
}

#[test]
fn set_rejects_unknown_names_and_type_changes() {
    let mut pass = simple_pass();

    assert!(pass.set("radius", 0.75f32).is_ok());
    assert!(matches!(
        pass.set("missing", 1.0f32),
        Err(LucentError::UnknownUniform(name)) if name == "missing"
    ));
    assert!(matches!(
        pass.set("radius", Vec3::ONE),
        Err(LucentError::ValueTypeMismatch { .. })
    ));
}

#[test]
fn removing_an_unregistered_storage_buffer_keeps_the_table() {
    let mut pass = simple_pass();
    assert!(pass.binding_table().is_some());
    assert!(!pass.remove_storage("missing"));
    // Nothing was removed, so the discovered table survives.
    assert!(pass.binding_table().is_some());
}

#[test]
fn material_requires_both_entry_points() {
    let descriptor = MaterialDescriptor {
        label: "mesh",
        source: FRAGMENT, // no vertex stage
        mode: BindingMode::Manual,
        group: 0,
        vertex_layouts: Vec::new(),
    };
    let result = Material::new(&descriptor, Inputs::new());
    assert!(matches!(
        result,
        Err(LucentError::MissingEntryPoint(entry)) if entry == "vs_main"
    ));
}

#[test]
fn compute_requires_its_entry_point() {
    let result = Compute::new(
        &ComputeDescriptor::new("sim", "fn other() {}"),
        Inputs::new(),
    );
    assert!(matches!(
        result,
        Err(LucentError::MissingEntryPoint(entry)) if entry == "main"
    ));
}

#[test]
fn compute_accepts_a_custom_entry_point() {
    let source = "
        @compute @workgroup_size(64)
        fn simulate(@builtin(global_invocation_id) id: vec3<u32>) {}
    ";
    let compute = Compute::new(
        &ComputeDescriptor {
            label: "sim",
            source,
            mode: BindingMode::Simple,
            group: 0,
            entry: "simulate",
        },
        Inputs::new().value("dt", 0.016f32),
    )
    .unwrap();
    assert!(!compute.is_built());
    assert_eq!(compute.binding_table().unwrap().uniform_buffer, Some(0));
}
