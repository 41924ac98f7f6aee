/// Temporal anti-aliasing.
///
/// `prepare` offsets the projection by a Halton(2,3) sub-pixel jitter before
/// the geometry pass draws; `render` blends the jittered frame with a
/// persistent per-camera history target. The jitter therefore has to be in
/// place before any geometry is captured, which is why it lives in the
/// prepare phase and not in `render`.
///
/// History content is undefined after creation, resize or a chain reset.
/// On those frames the history is seeded with the current image; the input
/// then passes through untouched, or the chain short-circuits to `None`
/// when `passthrough_on_reset` is off.

use glam::Vec2;
use crate::camera::{apply_jitter, halton};
use crate::error::Result;
use crate::graphics_device::{BlitSource, Material};
use crate::pass_chain::passes::SCENE_COLOR_FORMAT;
use crate::pass_chain::{FrameState, PassContext};
use crate::target::RenderTargetKey;

/// Number of entries in the jitter sequence
pub const JITTER_SEQUENCE_LENGTH: usize = 16;

/// Name of the history target in the camera's persistent cache
pub const TAA_HISTORY: &str = "taa_history";

/// Halton(2,3) offsets in pixels, centered on zero
pub fn jitter_sequence() -> [Vec2; JITTER_SEQUENCE_LENGTH] {
    let mut sequence = [Vec2::ZERO; JITTER_SEQUENCE_LENGTH];
    for (i, entry) in sequence.iter_mut().enumerate() {
        let index = i as u32 + 1;
        *entry = Vec2::new(halton(index, 2) - 0.5, halton(index, 3) - 0.5);
    }
    sequence
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaaSettings {
    /// Double jitter magnitude and neighborhood clamp radius
    pub jitter_2x: bool,
    /// Weight of the history in the blend, [0, 1]
    pub feedback: f32,
    /// Neighborhood clamp radius in pixels before `jitter_2x`
    pub clamp_radius: f32,
    /// Present the unresolved frame while the history is being seeded
    pub passthrough_on_reset: bool,
}

impl Default for TaaSettings {
    fn default() -> Self {
        Self { jitter_2x: false, feedback: 0.9, clamp_radius: 1.0, passthrough_on_reset: true }
    }
}

/// Uniform block uploaded to the TAA resolve shader
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TaaParams {
    pub jitter: Vec2,
    pub feedback: f32,
    pub clamp_radius: f32,
}

#[derive(Debug, Clone)]
pub struct TemporalAntiAliasingPass {
    pub settings: TaaSettings,
    sequence: [Vec2; JITTER_SEQUENCE_LENGTH],
    /// Jitter applied in the last `prepare`
    current_jitter: Vec2,
    material: Option<Material>,
}

impl Default for TemporalAntiAliasingPass {
    fn default() -> Self {
        Self::new(TaaSettings::default())
    }
}

impl TemporalAntiAliasingPass {
    pub fn new(settings: TaaSettings) -> Self {
        Self {
            settings,
            sequence: jitter_sequence(),
            current_jitter: Vec2::ZERO,
            material: None,
        }
    }

    fn scale(&self) -> f32 {
        if self.settings.jitter_2x { 2.0 } else { 1.0 }
    }

    /// Jitter for a frame, in pixels
    pub fn jitter_for_frame(&self, frame_index: u64) -> Vec2 {
        self.sequence[(frame_index % JITTER_SEQUENCE_LENGTH as u64) as usize] * self.scale()
    }

    pub fn current_jitter(&self) -> Vec2 {
        self.current_jitter
    }

    pub fn params(&self) -> TaaParams {
        let feedback = if self.settings.feedback.is_nan() { 0.0 } else { self.settings.feedback.clamp(0.0, 1.0) };
        TaaParams {
            jitter: self.current_jitter,
            feedback,
            clamp_radius: self.settings.clamp_radius.max(0.0) * self.scale(),
        }
    }

    /// Jitter the projection the geometry pass will use
    pub fn prepare(&mut self, state: &mut FrameState) {
        let jitter = self.jitter_for_frame(state.frame_index);
        self.current_jitter = jitter;
        state.jitter += jitter;
        state.jittered_projection = apply_jitter(state.projection, state.jitter, state.width, state.height);
    }

    pub fn reset(&mut self) {
        self.current_jitter = Vec2::ZERO;
        self.material = None;
    }

    pub fn render(&mut self, ctx: &mut PassContext<'_>, input: Option<RenderTargetKey>) -> Result<Option<RenderTargetKey>> {
        let Some(source) = input else {
            return Ok(None);
        };
        let source_texture = ctx.texture(source)?;
        let (history_texture, history_is_new) = ctx.history(TAA_HISTORY, &[SCENE_COLOR_FORMAT])?;

        if history_is_new {
            crate::engine_debug!("prism3d::TemporalAntiAliasing",
                "Seeding history for camera '{}'", ctx.render.camera_name);
            ctx.blit_to_history(BlitSource::Texture(source_texture), TAA_HISTORY, None)?;
            if self.settings.passthrough_on_reset {
                return Ok(Some(source));
            }
            ctx.release(source)?;
            return Ok(None);
        }

        let params = self.params();
        let velocity = ctx.gbuffer.velocity();
        let material = self.material.get_or_insert_with(|| Material::new("Hidden/TemporalAntiAliasing"));
        material.set_texture("_MainTex", source_texture);
        material.set_texture("_History", history_texture);
        if let Some(velocity) = velocity {
            material.set_texture("_Velocity", velocity);
        }
        material.set_block("_TaaParams", &params);

        let output = ctx.acquire_color(SCENE_COLOR_FORMAT)?;
        ctx.blit(BlitSource::Texture(source_texture), output, Some(&*material))?;
        let resolved = ctx.texture(output)?;
        ctx.blit_to_history(BlitSource::Texture(resolved), TAA_HISTORY, None)?;
        ctx.release(source)?;
        Ok(Some(output))
    }
}
