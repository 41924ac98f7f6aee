/// Screen-space reflections - ray marches the depth buffer along the
/// reflected view ray and blends the hit color by roughness.

use crate::error::Result;
use crate::graphics_device::{BlitSource, Material};
use crate::pass_chain::passes::SCENE_COLOR_FORMAT;
use crate::pass_chain::PassContext;
use crate::target::RenderTargetKey;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SsrSettings {
    /// Roughness above which surfaces do not reflect, [0, 1]
    pub threshold: f32,
    /// Coarse march steps, [16, 32]
    pub steps: u32,
    /// Binary-search refinement steps after a hit, [0, 16]
    pub refine_steps: u32,
    /// Maximum ray length in world units
    pub max_distance: f32,
}

impl Default for SsrSettings {
    fn default() -> Self {
        Self { threshold: 0.5, steps: 24, refine_steps: 4, max_distance: 50.0 }
    }
}

/// Uniform block uploaded to the SSR shader
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SsrParams {
    pub threshold: f32,
    pub steps: u32,
    pub refine_steps: u32,
    pub max_distance: f32,
}

impl SsrSettings {
    /// Clamp into the ranges the shader supports
    pub fn params(&self) -> SsrParams {
        SsrParams {
            threshold: if self.threshold.is_nan() { 0.0 } else { self.threshold.clamp(0.0, 1.0) },
            steps: self.steps.clamp(16, 32),
            refine_steps: self.refine_steps.min(16),
            max_distance: self.max_distance.max(0.0),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScreenSpaceReflectionPass {
    pub settings: SsrSettings,
    material: Option<Material>,
}

impl ScreenSpaceReflectionPass {
    pub fn new(settings: SsrSettings) -> Self {
        Self { settings, material: None }
    }

    pub fn reset(&mut self) {
        self.material = None;
    }

    pub fn render(&mut self, ctx: &mut PassContext<'_>, input: Option<RenderTargetKey>) -> Result<Option<RenderTargetKey>> {
        let Some(source) = input else {
            return Ok(None);
        };
        let gbuffer = ctx.gbuffer;
        let (Some(normal), Some(position), Some(depth)) =
            (gbuffer.normal_metallic(), gbuffer.position_roughness(), gbuffer.depth())
        else {
            return Ok(Some(source));
        };

        let source_texture = ctx.texture(source)?;
        let material = self.material.get_or_insert_with(|| Material::new("Hidden/ScreenSpaceReflection"));
        material.set_texture("_MainTex", source_texture);
        material.set_texture("_NormalMetallic", normal);
        material.set_texture("_PositionRoughness", position);
        material.set_texture("_Depth", depth);
        material.set_mat4("_View", ctx.render.world_view());
        material.set_mat4("_Projection", ctx.render.unjittered_projection);
        material.set_block("_SsrParams", &self.settings.params());

        let output = ctx.acquire_color(SCENE_COLOR_FORMAT)?;
        ctx.blit(BlitSource::Texture(source_texture), output, Some(&*material))?;
        ctx.release(source)?;
        Ok(Some(output))
    }
}
