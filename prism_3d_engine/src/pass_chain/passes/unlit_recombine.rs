/// Unlit recombine - restores unlit surfaces over the lit scene color.
///
/// Surfaces flagged unlit in the G-buffer keep their albedo untouched by
/// the lighting pass.

use crate::error::Result;
use crate::graphics_device::{BlitSource, Material};
use crate::pass_chain::passes::SCENE_COLOR_FORMAT;
use crate::pass_chain::PassContext;
use crate::target::RenderTargetKey;

#[derive(Debug, Clone, Default)]
pub struct UnlitRecombinePass {
    material: Option<Material>,
}

impl UnlitRecombinePass {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.material = None;
    }

    pub fn render(&mut self, ctx: &mut PassContext<'_>, input: Option<RenderTargetKey>) -> Result<Option<RenderTargetKey>> {
        let Some(source) = input else {
            return Ok(None);
        };
        let (Some(albedo), Some(normal)) = (ctx.gbuffer.albedo_ao(), ctx.gbuffer.normal_metallic()) else {
            return Ok(Some(source));
        };

        let source_texture = ctx.texture(source)?;
        let material = self.material.get_or_insert_with(|| Material::new("Hidden/UnlitRecombine"));
        material.set_texture("_MainTex", source_texture);
        material.set_texture("_AlbedoAO", albedo);
        material.set_texture("_NormalMetallic", normal);

        let output = ctx.acquire_color(SCENE_COLOR_FORMAT)?;
        ctx.blit(BlitSource::Texture(source_texture), output, Some(&*material))?;
        ctx.release(source)?;
        Ok(Some(output))
    }
}
