/// Tests for Material
///
/// Keyword toggle accounting, variant generation, and typed parameters.

use glam::Vec3;
use super::*;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
struct TestBlock {
    a: f32,
    b: u32,
}

// ============================================================================
// Keywords
// ============================================================================

#[test]
fn test_new_material_has_no_keywords() {
    let material = Material::new("Hidden/Tonemap");
    assert_eq!(material.shader(), "Hidden/Tonemap");
    assert!(material.keywords().is_empty());
    assert_eq!(material.keyword_toggle_count(), 0);
    assert_eq!(material.variant_generation(), 0);
}

#[test]
fn test_set_keyword_counts_effective_changes_only() {
    let mut material = Material::new("Hidden/Tonemap");

    assert!(material.set_keyword("TONEMAP_ACES", true));
    assert!(!material.set_keyword("TONEMAP_ACES", true));
    assert_eq!(material.keyword_toggle_count(), 1);

    assert!(material.set_keyword("TONEMAP_ACES", false));
    assert!(!material.set_keyword("TONEMAP_ACES", false));
    assert_eq!(material.keyword_toggle_count(), 2);
    assert_eq!(material.variant_generation(), 2);
}

#[test]
fn test_keywords_are_sorted() {
    let mut material = Material::new("Hidden/Test");
    material.set_keyword("B", true);
    material.set_keyword("A", true);
    assert_eq!(material.keywords(), vec!["A", "B"]);
    assert!(material.has_keyword("A"));
    assert!(!material.has_keyword("C"));
}

// ============================================================================
// Parameters
// ============================================================================

#[test]
fn test_typed_parameters() {
    let mut material = Material::new("Hidden/Test");
    material.set_float("_Exposure", 1.5);
    material.set_texture("_MainTex", TextureId(9));
    material.set_vec3("_LightDir", Vec3::Y);

    assert_eq!(material.float("_Exposure"), Some(1.5));
    assert_eq!(material.texture("_MainTex"), Some(TextureId(9)));
    assert_eq!(material.param("_LightDir"), Some(&ParamValue::Vec3(Vec3::Y)));
    assert_eq!(material.float("_MainTex"), None);
    assert_eq!(material.param_count(), 3);
}

#[test]
fn test_parameter_overwrite_keeps_count() {
    let mut material = Material::new("Hidden/Test");
    material.set_float("_Value", 1.0);
    material.set_float("_Value", 2.0);
    assert_eq!(material.float("_Value"), Some(2.0));
    assert_eq!(material.param_count(), 1);
}

#[test]
fn test_uniform_block_roundtrip_through_bytes() {
    let mut material = Material::new("Hidden/Test");
    let block = TestBlock { a: 0.25, b: 16 };
    material.set_block("_Params", &block);

    assert_eq!(material.block::<TestBlock>("_Params"), Some(block));
    // Wrong size is rejected rather than reinterpreted
    assert_eq!(material.block::<[u32; 3]>("_Params"), None);
}
