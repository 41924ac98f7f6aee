/// Depth of field - circle-of-confusion blur driven by G-buffer depth.

use crate::error::Result;
use crate::graphics_device::{BlitSource, Material};
use crate::pass_chain::passes::SCENE_COLOR_FORMAT;
use crate::pass_chain::PassContext;
use crate::target::RenderTargetKey;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthOfFieldSettings {
    /// Distance to the plane in focus, at least the camera's near plane
    pub focus_distance: f32,
    /// Blend between sharp and blurred image, [0, 1]
    pub strength: f32,
    /// Maximum blur radius in pixels, [1, 32]
    pub radius: f32,
    /// Sample ring count, [1, 4]
    pub quality: u32,
}

impl Default for DepthOfFieldSettings {
    fn default() -> Self {
        Self { focus_distance: 10.0, strength: 1.0, radius: 8.0, quality: 2 }
    }
}

/// Uniform block uploaded to the DoF shader
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DepthOfFieldParams {
    pub focus_distance: f32,
    pub strength: f32,
    pub radius: f32,
    pub quality: u32,
    pub near: f32,
    pub far: f32,
    pub _padding: [f32; 2],
}

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() { value } else { fallback }
}

impl DepthOfFieldSettings {
    pub fn params(&self, near: f32, far: f32) -> DepthOfFieldParams {
        DepthOfFieldParams {
            focus_distance: finite_or(self.focus_distance, near).max(near),
            strength: finite_or(self.strength, 0.0).clamp(0.0, 1.0),
            radius: finite_or(self.radius, 1.0).clamp(1.0, 32.0),
            quality: self.quality.clamp(1, 4),
            near,
            far,
            _padding: [0.0; 2],
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DepthOfFieldPass {
    pub settings: DepthOfFieldSettings,
    material: Option<Material>,
}

impl DepthOfFieldPass {
    pub fn new(settings: DepthOfFieldSettings) -> Self {
        Self { settings, material: None }
    }

    pub fn reset(&mut self) {
        self.material = None;
    }

    pub fn render(&mut self, ctx: &mut PassContext<'_>, input: Option<RenderTargetKey>) -> Result<Option<RenderTargetKey>> {
        let Some(source) = input else {
            return Ok(None);
        };
        let Some(depth) = ctx.gbuffer.depth() else {
            return Ok(Some(source));
        };

        let source_texture = ctx.texture(source)?;
        let params = self.settings.params(ctx.render.near, ctx.render.far);
        let material = self.material.get_or_insert_with(|| Material::new("Hidden/DepthOfField"));
        material.set_texture("_MainTex", source_texture);
        material.set_texture("_Depth", depth);
        material.set_block("_DofParams", &params);

        let output = ctx.acquire_color(SCENE_COLOR_FORMAT)?;
        ctx.blit(BlitSource::Texture(source_texture), output, Some(&*material))?;
        ctx.release(source)?;
        Ok(Some(output))
    }
}
