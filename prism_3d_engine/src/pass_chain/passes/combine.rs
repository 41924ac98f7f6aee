/// Combine - albedo x lighting + emission into the HDR scene color.

use crate::error::Result;
use crate::graphics_device::{BlitSource, Material, TextureFormat};
use crate::pass_chain::PassContext;
use crate::target::RenderTargetKey;

/// HDR scene color format used from here to the tonemapper
pub const SCENE_COLOR_FORMAT: TextureFormat = TextureFormat::Rgba16F;

#[derive(Debug, Clone, Default)]
pub struct CombinePass {
    material: Option<Material>,
}

impl CombinePass {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.material = None;
    }

    pub fn render(&mut self, ctx: &mut PassContext<'_>, input: Option<RenderTargetKey>) -> Result<Option<RenderTargetKey>> {
        let Some(lighting) = input else {
            return Ok(None);
        };
        let (Some(albedo), Some(emission)) = (ctx.gbuffer.albedo_ao(), ctx.gbuffer.emission()) else {
            ctx.release(lighting)?;
            return Ok(None);
        };

        let lighting_texture = ctx.texture(lighting)?;
        let material = self.material.get_or_insert_with(|| Material::new("Hidden/DeferredCombine"));
        material.set_texture("_Lighting", lighting_texture);
        material.set_texture("_AlbedoAO", albedo);
        material.set_texture("_Emission", emission);

        let output = ctx.acquire_color(SCENE_COLOR_FORMAT)?;
        ctx.blit(BlitSource::Texture(lighting_texture), output, Some(&*material))?;
        ctx.release(lighting)?;
        Ok(Some(output))
    }
}
