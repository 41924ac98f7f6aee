/// Bloom - bright-pass threshold, iterative separable blur, additive composite.
///
/// Uses exactly two ping-pong targets whatever the iteration count:
///
/// ```text
/// input ──threshold──► A
///   for each iteration:  A ──blur H──► B ──blur V──► A
/// input + A ──composite──► B
/// release A, release input, output B
/// ```

use crate::error::Result;
use crate::graphics_device::{BlitSource, Material};
use crate::pass_chain::passes::SCENE_COLOR_FORMAT;
use crate::pass_chain::PassContext;
use crate::target::RenderTargetKey;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BloomSettings {
    /// Luminance above which pixels bloom, >= 0
    pub threshold: f32,
    /// Soft knee width around the threshold, [0, 1]
    pub soft_knee: f32,
    /// Strength of the composite, >= 0
    pub intensity: f32,
    /// Blur iterations, [1, 16]
    pub passes: u32,
    /// Blur radius growth per iteration in pixels, [0, 32]
    pub radius_growth: f32,
}

impl Default for BloomSettings {
    fn default() -> Self {
        Self { threshold: 1.0, soft_knee: 0.5, intensity: 0.8, passes: 4, radius_growth: 1.0 }
    }
}

/// Uniform block uploaded to the bloom shaders
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BloomParams {
    pub threshold: f32,
    pub soft_knee: f32,
    pub intensity: f32,
    pub radius: f32,
}

fn non_negative(value: f32) -> f32 {
    if value.is_nan() { 0.0 } else { value.max(0.0) }
}

impl BloomSettings {
    pub fn iterations(&self) -> u32 {
        self.passes.clamp(1, 16)
    }

    /// Blur radius used by `iteration` (0-based)
    pub fn radius(&self, iteration: u32) -> f32 {
        1.0 + iteration as f32 * non_negative(self.radius_growth).min(32.0)
    }

    pub fn params(&self, iteration: u32) -> BloomParams {
        BloomParams {
            threshold: non_negative(self.threshold),
            soft_knee: non_negative(self.soft_knee).min(1.0),
            intensity: non_negative(self.intensity),
            radius: self.radius(iteration),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BloomPass {
    pub settings: BloomSettings,
    threshold_material: Option<Material>,
    blur_material: Option<Material>,
    composite_material: Option<Material>,
}

impl BloomPass {
    pub fn new(settings: BloomSettings) -> Self {
        Self { settings, ..Default::default() }
    }

    pub fn reset(&mut self) {
        self.threshold_material = None;
        self.blur_material = None;
        self.composite_material = None;
    }

    pub fn render(&mut self, ctx: &mut PassContext<'_>, input: Option<RenderTargetKey>) -> Result<Option<RenderTargetKey>> {
        let Some(source) = input else {
            return Ok(None);
        };
        let source_texture = ctx.texture(source)?;

        let ping = ctx.acquire_color(SCENE_COLOR_FORMAT)?;
        let pong = ctx.acquire_color(SCENE_COLOR_FORMAT)?;
        let ping_texture = ctx.texture(ping)?;
        let pong_texture = ctx.texture(pong)?;

        let threshold = self.threshold_material.get_or_insert_with(|| Material::new("Hidden/BloomThreshold"));
        threshold.set_texture("_MainTex", source_texture);
        threshold.set_block("_BloomParams", &self.settings.params(0));
        ctx.blit(BlitSource::Texture(source_texture), ping, Some(&*threshold))?;

        let blur = self.blur_material.get_or_insert_with(|| Material::new("Hidden/BloomBlur"));
        for iteration in 0..self.settings.iterations() {
            blur.set_block("_BloomParams", &self.settings.params(iteration));

            blur.set_vec2("_Direction", glam::Vec2::X);
            blur.set_texture("_MainTex", ping_texture);
            ctx.blit(BlitSource::Texture(ping_texture), pong, Some(&*blur))?;

            blur.set_vec2("_Direction", glam::Vec2::Y);
            blur.set_texture("_MainTex", pong_texture);
            ctx.blit(BlitSource::Texture(pong_texture), ping, Some(&*blur))?;
        }

        let composite = self.composite_material.get_or_insert_with(|| Material::new("Hidden/BloomComposite"));
        composite.set_texture("_MainTex", source_texture);
        composite.set_texture("_Bloom", ping_texture);
        composite.set_block("_BloomParams", &self.settings.params(0));
        ctx.blit(BlitSource::Texture(source_texture), pong, Some(&*composite))?;

        ctx.release(ping)?;
        ctx.release(source)?;
        Ok(Some(pong))
    }
}
