/// Tonemap - HDR scene color to display-ready LDR.
///
/// The operator is a shader variant selected by keyword. Exactly one
/// operator keyword is enabled at a time. Every keyword toggle invalidates
/// the variant's uniform cache on the device, so the pass remembers the
/// operator it last configured and leaves the keywords alone while the
/// selection is unchanged.

use crate::error::Result;
use crate::graphics_device::{BlitSource, Material, TextureFormat};
use crate::pass_chain::PassContext;
use crate::target::RenderTargetKey;

/// Display-ready output format
pub const LDR_FORMAT: TextureFormat = TextureFormat::Rgba8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TonemapOperator {
    /// Clamp only
    Linear,
    Reinhard,
    ReinhardExtended,
    #[default]
    Aces,
    Filmic,
    Uncharted2,
}

impl TonemapOperator {
    pub const ALL: [TonemapOperator; 6] = [
        TonemapOperator::Linear,
        TonemapOperator::Reinhard,
        TonemapOperator::ReinhardExtended,
        TonemapOperator::Aces,
        TonemapOperator::Filmic,
        TonemapOperator::Uncharted2,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            TonemapOperator::Linear => "TONEMAP_LINEAR",
            TonemapOperator::Reinhard => "TONEMAP_REINHARD",
            TonemapOperator::ReinhardExtended => "TONEMAP_REINHARD_EXTENDED",
            TonemapOperator::Aces => "TONEMAP_ACES",
            TonemapOperator::Filmic => "TONEMAP_FILMIC",
            TonemapOperator::Uncharted2 => "TONEMAP_UNCHARTED2",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TonemapSettings {
    pub operator: TonemapOperator,
    /// Linear exposure multiplier, >= 0
    pub exposure: f32,
    /// White point for `ReinhardExtended`, > 0
    pub white_point: f32,
}

impl Default for TonemapSettings {
    fn default() -> Self {
        Self { operator: TonemapOperator::default(), exposure: 1.0, white_point: 4.0 }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TonemapPass {
    pub settings: TonemapSettings,
    material: Option<Material>,
    /// Operator the material's keywords currently select
    last_operator: Option<TonemapOperator>,
}

impl TonemapPass {
    pub fn new(settings: TonemapSettings) -> Self {
        Self { settings, material: None, last_operator: None }
    }

    pub fn reset(&mut self) {
        self.material = None;
        self.last_operator = None;
    }

    /// The pass's material, once created by the first render
    pub fn material(&self) -> Option<&Material> {
        self.material.as_ref()
    }

    /// Select the operator's keyword on `material`, skipped when unchanged.
    ///
    /// Returns the number of keyword toggles performed.
    fn apply_operator(material: &mut Material, last: &mut Option<TonemapOperator>, operator: TonemapOperator) -> u64 {
        if *last == Some(operator) {
            return 0;
        }
        let before = material.keyword_toggle_count();
        for other in TonemapOperator::ALL {
            if other != operator {
                material.set_keyword(other.keyword(), false);
            }
        }
        material.set_keyword(operator.keyword(), true);
        *last = Some(operator);

        crate::engine_debug!("prism3d::Tonemap", "Operator switched to {:?}", operator);
        material.keyword_toggle_count() - before
    }

    pub fn render(&mut self, ctx: &mut PassContext<'_>, input: Option<RenderTargetKey>) -> Result<Option<RenderTargetKey>> {
        let Some(source) = input else {
            return Ok(None);
        };
        let source_texture = ctx.texture(source)?;

        let material = self.material.get_or_insert_with(|| Material::new("Hidden/Tonemap"));
        Self::apply_operator(material, &mut self.last_operator, self.settings.operator);

        let exposure = self.settings.exposure;
        material.set_texture("_MainTex", source_texture);
        material.set_float("_Exposure", if exposure.is_nan() { 0.0 } else { exposure.max(0.0) });
        material.set_float("_WhitePoint", self.settings.white_point.max(f32::EPSILON));

        let output = ctx.acquire_color(LDR_FORMAT)?;
        ctx.blit(BlitSource::Texture(source_texture), output, Some(&*material))?;
        ctx.release(source)?;
        Ok(Some(output))
    }
}
