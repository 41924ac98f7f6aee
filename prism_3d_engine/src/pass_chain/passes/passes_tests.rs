//! Unit tests for the concrete passes
//!
//! Each pass is driven through a `PassContext` over the mock device, checking
//! what it hands to the next pass and what it leaves checked out.

use glam::{Vec2, Vec4};
use crate::graphics_device::{ParamValue, TextureFormat};
use crate::pass_chain::passes::*;
use crate::pass_chain::test_harness::{frame_state, PassHarness};

// ============================================================================
// LIGHTING / COMBINE / UNLIT RECOMBINE
// ============================================================================

#[test]
fn test_lighting_without_gbuffer_yields_none_and_releases_input() {
    let mut h = PassHarness::without_gbuffer(64, 32);
    let input = h.input();

    let result = LightingPass::new().render(&mut h.ctx(), Some(input)).unwrap();

    assert_eq!(result, None);
    assert_eq!(h.pool.checked_out_count(), 0);
}

#[test]
fn test_lighting_produces_light_buffer_from_nothing() {
    let mut h = PassHarness::new(64, 32);

    let result = LightingPass::new().render(&mut h.ctx(), None).unwrap().unwrap();

    let target = h.pool.target(result).unwrap();
    assert_eq!(target.formats(), &[LIGHT_BUFFER_FORMAT]);
    assert_eq!((target.width(), target.height()), (64, 32));
    assert_eq!(h.pool.checked_out_count(), 1);
}

#[test]
fn test_combine_consumes_lighting() {
    let mut h = PassHarness::new(64, 32);
    let lighting = LightingPass::new().render(&mut h.ctx(), None).unwrap();

    let result = CombinePass::new().render(&mut h.ctx(), lighting).unwrap().unwrap();

    assert!(!h.pool.is_checked_out(lighting.unwrap()));
    assert!(h.pool.is_checked_out(result));
    assert_eq!(h.pool.target(result).unwrap().formats(), &[SCENE_COLOR_FORMAT]);
    assert_eq!(h.device.blit_count("Hidden/DeferredCombine"), 1);
}

#[test]
fn test_combine_none_in_none_out() {
    let mut h = PassHarness::new(64, 32);
    assert_eq!(CombinePass::new().render(&mut h.ctx(), None).unwrap(), None);
    assert_eq!(h.device.blits().len(), 0);
}

#[test]
fn test_unlit_recombine_passes_through_without_gbuffer() {
    let mut h = PassHarness::without_gbuffer(64, 32);
    let input = h.input();

    let result = UnlitRecombinePass::new().render(&mut h.ctx(), Some(input)).unwrap();

    assert_eq!(result, Some(input));
    assert_eq!(h.pool.checked_out_count(), 1);
}

// ============================================================================
// PROCEDURAL SKY
// ============================================================================

#[test]
fn test_sky_fog_density_clamped() {
    let mut settings = SkySettings::default();
    settings.fog_density = -3.0;
    assert_eq!(settings.effective_fog_density(), 0.0);
    settings.fog_density = f32::NAN;
    assert_eq!(settings.effective_fog_density(), 0.0);
    settings.fog_density = 0.25;
    assert_eq!(settings.effective_fog_density(), 0.25);
}

#[test]
fn test_sky_uses_default_sun_without_directional_light() {
    let mut h = PassHarness::new(16, 16);
    let ctx = h.ctx();
    let sun = ProceduralSkyPass::sun_direction(&ctx);
    assert!((sun - DEFAULT_SUN_DIRECTION.normalize()).length() < 1e-6);
}

#[test]
fn test_sky_sun_color_defaults_to_white() {
    let mut h = PassHarness::new(16, 16);
    let input = h.input();
    let mut sky = ProceduralSkyPass::default();

    sky.render(&mut h.ctx(), Some(input)).unwrap();

    let material = sky.material().unwrap();
    assert_eq!(material.param("_SunColor"), Some(&ParamValue::Vec4(Vec4::ONE)));
}

#[test]
fn test_sky_replaces_input() {
    let mut h = PassHarness::new(16, 16);
    let input = h.input();

    let result = ProceduralSkyPass::default().render(&mut h.ctx(), Some(input)).unwrap().unwrap();

    assert_ne!(result, input);
    assert!(!h.pool.is_checked_out(input));
    assert_eq!(h.device.blit_count("Hidden/ProceduralSky"), 1);
}

// ============================================================================
// SCREEN-SPACE REFLECTION / DEPTH OF FIELD
// ============================================================================

#[test]
fn test_ssr_params_clamped() {
    let settings = SsrSettings { threshold: 4.0, steps: 2, refine_steps: 100, max_distance: -1.0 };
    let params = settings.params();
    assert_eq!(params.threshold, 1.0);
    assert_eq!(params.steps, 16);
    assert_eq!(params.refine_steps, 16);
    assert_eq!(params.max_distance, 0.0);

    let settings = SsrSettings { steps: 64, ..settings };
    assert_eq!(settings.params().steps, 32);
}

#[test]
fn test_dof_params_clamped() {
    let settings = DepthOfFieldSettings { focus_distance: 0.01, strength: 2.0, radius: 0.0, quality: 9 };
    let params = settings.params(0.1, 100.0);
    assert_eq!(params.focus_distance, 0.1);
    assert_eq!(params.strength, 1.0);
    assert_eq!(params.radius, 1.0);
    assert_eq!(params.quality, 4);
    assert_eq!((params.near, params.far), (0.1, 100.0));
}

#[test]
fn test_dof_nan_focus_falls_back_to_near() {
    let settings = DepthOfFieldSettings { focus_distance: f32::NAN, ..DepthOfFieldSettings::default() };
    assert_eq!(settings.params(0.5, 10.0).focus_distance, 0.5);
}

// ============================================================================
// TEMPORAL ANTI-ALIASING
// ============================================================================

#[test]
fn test_jitter_sequence_is_centered_halton() {
    let sequence = jitter_sequence();
    assert!((sequence[0] - Vec2::new(0.0, 1.0 / 3.0 - 0.5)).length() < 1e-6);
    assert!((sequence[1] - Vec2::new(0.25 - 0.5, 2.0 / 3.0 - 0.5)).length() < 1e-6);
    for offset in sequence {
        assert!(offset.x.abs() <= 0.5 && offset.y.abs() <= 0.5);
    }
}

#[test]
fn test_jitter_wraps_every_sequence_length() {
    let pass = TemporalAntiAliasingPass::default();
    assert_eq!(pass.jitter_for_frame(3), pass.jitter_for_frame(3 + JITTER_SEQUENCE_LENGTH as u64));
}

#[test]
fn test_taa_params_block_layout() {
    let mut pass = TemporalAntiAliasingPass::default();
    pass.prepare(&mut frame_state(2, 64, 64));
    let params = pass.params();

    let words: [f32; 4] = bytemuck::cast(params);
    assert_eq!(Vec2::new(words[0], words[1]), pass.current_jitter());
    assert_eq!(words[2], params.feedback);
    assert_eq!(words[3], params.clamp_radius);
}

#[test]
fn test_jitter_2x_doubles_offset_and_clamp() {
    let single = TemporalAntiAliasingPass::default();
    let double = TemporalAntiAliasingPass::new(TaaSettings { jitter_2x: true, ..TaaSettings::default() });

    assert_eq!(double.jitter_for_frame(5), single.jitter_for_frame(5) * 2.0);
    assert_eq!(double.params().clamp_radius, single.params().clamp_radius * 2.0);
}

#[test]
fn test_taa_prepare_jitters_projection() {
    let mut pass = TemporalAntiAliasingPass::default();
    let mut state = frame_state(1, 64, 64);

    pass.prepare(&mut state);

    assert_eq!(state.jitter, pass.jitter_for_frame(1));
    assert_eq!(pass.current_jitter(), state.jitter);
    assert_ne!(state.jittered_projection, state.projection);
}

#[test]
fn test_taa_seeds_history_then_resolves() {
    let mut h = PassHarness::new(32, 32);
    let mut pass = TemporalAntiAliasingPass::default();

    // Fresh history: seeded, input passes through
    let input = h.input();
    let first = pass.render(&mut h.ctx(), Some(input)).unwrap();
    assert_eq!(first, Some(input));
    assert!(h.history.contains(TAA_HISTORY));
    assert_eq!(h.device.blit_count("Hidden/TemporalAntiAliasing"), 0);
    h.ctx().release(input).unwrap();

    // Second frame: resolved into a new target
    h.set_frame(2);
    let input = h.input();
    let second = pass.render(&mut h.ctx(), Some(input)).unwrap().unwrap();
    assert_ne!(second, input);
    assert!(!h.pool.is_checked_out(input));
    assert_eq!(h.pool.checked_out_count(), 1);
    assert_eq!(h.device.blit_count("Hidden/TemporalAntiAliasing"), 1);
}

#[test]
fn test_taa_without_passthrough_short_circuits_on_seed() {
    let mut h = PassHarness::new(32, 32);
    let mut pass = TemporalAntiAliasingPass::new(TaaSettings { passthrough_on_reset: false, ..TaaSettings::default() });

    let input = h.input();
    let result = pass.render(&mut h.ctx(), Some(input)).unwrap();

    assert_eq!(result, None);
    assert_eq!(h.pool.checked_out_count(), 0);
}

#[test]
fn test_taa_reseeds_after_history_invalidation() {
    let mut h = PassHarness::new(32, 32);
    let mut pass = TemporalAntiAliasingPass::default();

    let input = h.input();
    pass.render(&mut h.ctx(), Some(input)).unwrap();
    h.ctx().release(input).unwrap();

    h.history.invalidate_all();
    let input = h.input();
    assert_eq!(pass.render(&mut h.ctx(), Some(input)).unwrap(), Some(input));
}

// ============================================================================
// BLOOM
// ============================================================================

#[test]
fn test_bloom_settings_clamped() {
    let settings = BloomSettings { passes: 0, ..BloomSettings::default() };
    assert_eq!(settings.iterations(), 1);
    let settings = BloomSettings { passes: 100, ..BloomSettings::default() };
    assert_eq!(settings.iterations(), 16);

    let settings = BloomSettings { radius_growth: 100.0, ..BloomSettings::default() };
    assert_eq!(settings.radius(0), 1.0);
    assert_eq!(settings.radius(1), 33.0);
    let settings = BloomSettings { radius_growth: -5.0, ..BloomSettings::default() };
    assert_eq!(settings.radius(3), 1.0);
}

#[test]
fn test_bloom_uses_exactly_two_ping_pong_targets() {
    let mut h = PassHarness::new(64, 64);
    let input = h.input();
    let allocations_before = h.pool.allocation_count();

    let mut pass = BloomPass::new(BloomSettings { passes: 3, ..BloomSettings::default() });
    let output = pass.render(&mut h.ctx(), Some(input)).unwrap().unwrap();

    assert_eq!(h.pool.allocation_count() - allocations_before, 2);
    // Ping released, input released, pong is the output
    assert_eq!(h.pool.checked_out_count(), 1);
    assert!(h.pool.is_checked_out(output));
    assert!(!h.pool.is_checked_out(input));
    assert_eq!(h.device.blit_count("Hidden/BloomThreshold"), 1);
    assert_eq!(h.device.blit_count("Hidden/BloomBlur"), 6);
    assert_eq!(h.device.blit_count("Hidden/BloomComposite"), 1);
}

#[test]
fn test_bloom_reuses_pool_on_next_frame() {
    let mut h = PassHarness::new(64, 64);
    let mut pass = BloomPass::default();

    let input = h.input();
    let output = pass.render(&mut h.ctx(), Some(input)).unwrap().unwrap();
    h.ctx().release(output).unwrap();
    let allocations = h.pool.allocation_count();

    h.set_frame(2);
    let input = h.input();
    let output = pass.render(&mut h.ctx(), Some(input)).unwrap().unwrap();
    h.ctx().release(output).unwrap();

    assert_eq!(h.pool.allocation_count(), allocations);
}

// ============================================================================
// TONEMAP
// ============================================================================

#[test]
fn test_tonemap_outputs_ldr() {
    let mut h = PassHarness::new(16, 16);
    let input = h.input();

    let output = TonemapPass::default().render(&mut h.ctx(), Some(input)).unwrap().unwrap();

    assert_eq!(h.pool.target(output).unwrap().formats(), &[LDR_FORMAT]);
    assert_eq!(LDR_FORMAT, TextureFormat::Rgba8);
    assert!(!h.pool.is_checked_out(input));
}

#[test]
fn test_tonemap_keywords_stable_across_frames() {
    let mut h = PassHarness::new(16, 16);
    let mut pass = TonemapPass::default();

    let input = h.input();
    let output = pass.render(&mut h.ctx(), Some(input)).unwrap().unwrap();
    h.ctx().release(output).unwrap();
    let toggles = pass.material().unwrap().keyword_toggle_count();
    let generation = pass.material().unwrap().variant_generation();
    assert_eq!(toggles, 1);

    h.set_frame(2);
    let input = h.input();
    let output = pass.render(&mut h.ctx(), Some(input)).unwrap().unwrap();
    h.ctx().release(output).unwrap();

    assert_eq!(pass.material().unwrap().keyword_toggle_count(), toggles);
    assert_eq!(pass.material().unwrap().variant_generation(), generation);
}

#[test]
fn test_tonemap_operator_switch_enables_exactly_one_keyword() {
    let mut h = PassHarness::new(16, 16);
    let mut pass = TonemapPass::default();

    let input = h.input();
    let output = pass.render(&mut h.ctx(), Some(input)).unwrap().unwrap();
    h.ctx().release(output).unwrap();

    pass.settings.operator = TonemapOperator::Filmic;
    let input = h.input();
    pass.render(&mut h.ctx(), Some(input)).unwrap();

    let material = pass.material().unwrap();
    assert_eq!(material.keyword_toggle_count(), 3);
    assert_eq!(material.keywords(), vec!["TONEMAP_FILMIC"]);
}

#[test]
fn test_tonemap_reset_forgets_operator() {
    let mut h = PassHarness::new(16, 16);
    let mut pass = TonemapPass::default();

    let input = h.input();
    pass.render(&mut h.ctx(), Some(input)).unwrap();
    pass.reset();

    assert!(pass.material().is_none());
    let input = h.input();
    pass.render(&mut h.ctx(), Some(input)).unwrap();
    assert_eq!(pass.material().unwrap().keyword_toggle_count(), 1);
}

#[test]
fn test_passes_pass_none_through() {
    let mut h = PassHarness::new(16, 16);
    assert_eq!(UnlitRecombinePass::new().render(&mut h.ctx(), None).unwrap(), None);
    assert_eq!(ProceduralSkyPass::default().render(&mut h.ctx(), None).unwrap(), None);
    assert_eq!(ScreenSpaceReflectionPass::default().render(&mut h.ctx(), None).unwrap(), None);
    assert_eq!(TemporalAntiAliasingPass::default().render(&mut h.ctx(), None).unwrap(), None);
    assert_eq!(DepthOfFieldPass::default().render(&mut h.ctx(), None).unwrap(), None);
    assert_eq!(BloomPass::default().render(&mut h.ctx(), None).unwrap(), None);
    assert_eq!(TonemapPass::default().render(&mut h.ctx(), None).unwrap(), None);
    assert_eq!(h.pool.checked_out_count(), 0);
}
