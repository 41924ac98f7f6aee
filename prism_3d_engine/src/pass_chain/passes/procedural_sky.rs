/// Procedural sky - sky gradient, sun disk and height-less fog.
///
/// Fills pixels the G-buffer left empty with the sky and fogs the rest by
/// depth. The sun follows the scene's first directional light.

use glam::{Vec3, Vec4};
use crate::error::Result;
use crate::graphics_device::{BlitSource, Material};
use crate::pass_chain::passes::SCENE_COLOR_FORMAT;
use crate::pass_chain::PassContext;
use crate::target::RenderTargetKey;

/// Light direction used when the scene has no directional light
pub const DEFAULT_SUN_DIRECTION: Vec3 = Vec3::new(-0.3, -0.8, -0.52);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkySettings {
    /// Exponential fog density, clamped to [0, inf)
    pub fog_density: f32,
    pub zenith_color: Vec3,
    pub horizon_color: Vec3,
    /// Angular sun disk size in degrees
    pub sun_size: f32,
}

impl Default for SkySettings {
    fn default() -> Self {
        Self {
            fog_density: 0.01,
            zenith_color: Vec3::new(0.18, 0.36, 0.75),
            horizon_color: Vec3::new(0.75, 0.82, 0.9),
            sun_size: 0.5,
        }
    }
}

impl SkySettings {
    /// Fog density as the shader sees it
    pub fn effective_fog_density(&self) -> f32 {
        if self.fog_density.is_nan() { 0.0 } else { self.fog_density.max(0.0) }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProceduralSkyPass {
    pub settings: SkySettings,
    material: Option<Material>,
}

impl ProceduralSkyPass {
    pub fn new(settings: SkySettings) -> Self {
        Self { settings, material: None }
    }

    pub fn reset(&mut self) {
        self.material = None;
    }

    /// Direction the sun light travels this frame
    pub fn sun_direction(ctx: &PassContext<'_>) -> Vec3 {
        ctx.scene
            .find_directional_light()
            .map(|light| light.direction.normalize_or_zero())
            .filter(|dir| *dir != Vec3::ZERO)
            .unwrap_or_else(|| DEFAULT_SUN_DIRECTION.normalize())
    }

    /// Sun color in xyz, intensity in w. White at unit intensity without a light.
    pub fn sun_color(ctx: &PassContext<'_>) -> Vec4 {
        ctx.scene
            .find_directional_light()
            .map_or(Vec4::ONE, |light| light.color.extend(light.intensity.max(0.0)))
    }

    pub fn material(&self) -> Option<&Material> {
        self.material.as_ref()
    }

    pub fn render(&mut self, ctx: &mut PassContext<'_>, input: Option<RenderTargetKey>) -> Result<Option<RenderTargetKey>> {
        let Some(source) = input else {
            return Ok(None);
        };
        let (Some(depth), Some(position)) = (ctx.gbuffer.depth(), ctx.gbuffer.position_roughness()) else {
            return Ok(Some(source));
        };

        let source_texture = ctx.texture(source)?;
        let sun_direction = Self::sun_direction(ctx);
        let sun_color = Self::sun_color(ctx);
        let inverse_view_projection = ctx.render.world_view_projection().inverse();
        let camera_position = ctx.render.camera_position;

        let material = self.material.get_or_insert_with(|| Material::new("Hidden/ProceduralSky"));
        material.set_texture("_MainTex", source_texture);
        material.set_texture("_Depth", depth);
        material.set_texture("_PositionRoughness", position);
        material.set_vec3("_SunDirection", sun_direction);
        material.set_vec4("_SunColor", sun_color);
        material.set_float("_SunSize", self.settings.sun_size.max(0.0));
        material.set_float("_FogDensity", self.settings.effective_fog_density());
        material.set_vec3("_ZenithColor", self.settings.zenith_color);
        material.set_vec3("_HorizonColor", self.settings.horizon_color);
        material.set_vec3("_CameraPosition", camera_position);
        material.set_mat4("_InverseViewProjection", inverse_view_projection);

        let output = ctx.acquire_color(SCENE_COLOR_FORMAT)?;
        ctx.blit(BlitSource::Texture(source_texture), output, Some(&*material))?;
        ctx.release(source)?;
        Ok(Some(output))
    }
}
