/// SceneRenderer - the narrow interface the pipeline consumes from the scene.
///
/// The scene (entities, transforms, renderables) lives outside the pipeline.
/// It only has to draw its visible objects into whatever target is bound,
/// using the matrices of the camera described by the `RenderContext`.
///
/// Every callback receives the context explicitly. There is no global
/// "current camera": whoever needs to know which camera is rendering reads
/// it from the context.

use glam::Vec3;
use crate::camera::RenderContext;
use crate::error::Result;
use crate::gbuffer::GeometryBuffer;
use crate::graphics_device::GraphicsDevice;

/// A directional light as seen by the sky pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    /// Direction the light travels (from the light toward the scene)
    pub direction: Vec3,
    /// Linear RGB color
    pub color: Vec3,
    pub intensity: f32,
}

impl DirectionalLight {
    pub fn new(direction: Vec3, color: Vec3, intensity: f32) -> Self {
        Self { direction, color, intensity }
    }
}

/// Scene callbacks invoked by a camera during its frame
pub trait SceneRenderer {
    /// Draw all visible renderables into the bound G-buffer
    fn render_geometry(&mut self, context: &RenderContext, device: &mut dyn GraphicsDevice) -> Result<()>;

    /// Depth-only draw of all visible renderables (depth prepass)
    fn render_geometry_depth(&mut self, context: &RenderContext, device: &mut dyn GraphicsDevice) -> Result<()>;

    /// Accumulate every light's contribution into the bound target,
    /// sampling the filled G-buffer
    fn render_lighting(
        &mut self,
        context: &RenderContext,
        gbuffer: &GeometryBuffer,
        device: &mut dyn GraphicsDevice,
    ) -> Result<()>;

    /// First directional light in the scene, if any
    fn find_directional_light(&self) -> Option<DirectionalLight> {
        None
    }
}

/// Scene with nothing in it. Every callback draws nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyScene;

impl SceneRenderer for EmptyScene {
    fn render_geometry(&mut self, _context: &RenderContext, _device: &mut dyn GraphicsDevice) -> Result<()> {
        Ok(())
    }

    fn render_geometry_depth(&mut self, _context: &RenderContext, _device: &mut dyn GraphicsDevice) -> Result<()> {
        Ok(())
    }

    fn render_lighting(
        &mut self,
        _context: &RenderContext,
        _gbuffer: &GeometryBuffer,
        _device: &mut dyn GraphicsDevice,
    ) -> Result<()> {
        Ok(())
    }
}
