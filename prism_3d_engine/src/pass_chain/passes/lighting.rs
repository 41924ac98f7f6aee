/// Lighting - accumulates every light into an RGB16F target.
///
/// Ignores its input (lighting always starts from the G-buffer) and hands
/// the light buffer to the next pass.

use crate::error::Result;
use crate::graphics_device::TextureFormat;
use crate::pass_chain::PassContext;
use crate::target::RenderTargetKey;

/// Light accumulation buffer format
pub const LIGHT_BUFFER_FORMAT: TextureFormat = TextureFormat::Rgb16F;

#[derive(Debug, Clone, Default)]
pub struct LightingPass {
    /// Ambient term the light buffer is cleared to
    pub ambient: [f32; 3],
}

impl LightingPass {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, ctx: &mut PassContext<'_>, input: Option<RenderTargetKey>) -> Result<Option<RenderTargetKey>> {
        ctx.release_input(input)?;

        if ctx.gbuffer.albedo_ao().is_none() {
            return Ok(None);
        }

        let output = ctx.acquire_color(LIGHT_BUFFER_FORMAT)?;
        ctx.bind(output, Some([self.ambient[0], self.ambient[1], self.ambient[2], 0.0]))?;
        ctx.scene.render_lighting(ctx.render, ctx.gbuffer, ctx.device)?;
        Ok(Some(output))
    }
}
