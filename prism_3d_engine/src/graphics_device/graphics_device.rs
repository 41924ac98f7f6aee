/// GraphicsDevice trait - the low-level graphics API seam
///
/// This is the narrow interface the deferred pipeline consumes from the
/// graphics-API abstraction. Backends (OpenGL, Vulkan, a test mock, ...)
/// implement it; the pipeline never touches native objects directly.
///
/// All calls are made from the single render thread in frame lockstep.
/// GPU execution is asynchronous relative to these calls, which is
/// invisible at this level.

use winit::dpi::PhysicalSize;
use crate::error::Result;
use crate::graphics_device::{
    BlitSource, ClearFlags, Framebuffer, FramebufferDesc, Material, RasterizerState, Viewport,
};

/// Main graphics device trait
pub trait GraphicsDevice: Send {
    /// Create a framebuffer with N color attachments and an optional depth attachment
    ///
    /// # Errors
    ///
    /// Returns `Error::OutOfMemory` when the GPU cannot satisfy the allocation.
    /// The returned framebuffer must carry exactly one texture per requested format.
    fn create_framebuffer(&mut self, desc: &FramebufferDesc) -> Result<Framebuffer>;

    /// Destroy a framebuffer and all of its attachment textures
    fn destroy_framebuffer(&mut self, framebuffer: &Framebuffer);

    /// Bind a framebuffer as the active draw destination
    ///
    /// `None` binds the default framebuffer (the window surface).
    fn bind_framebuffer(&mut self, framebuffer: Option<&Framebuffer>) -> Result<()>;

    /// Clear the currently bound framebuffer
    ///
    /// # Arguments
    ///
    /// * `flags` - Which buffers to clear
    /// * `color` - RGBA clear color (used with `ClearFlags::COLOR`)
    /// * `depth` - Depth clear value (used with `ClearFlags::DEPTH`)
    fn clear(&mut self, flags: ClearFlags, color: [f32; 4], depth: f32) -> Result<()>;

    /// Full-screen blit of a texture or solid color into a destination
    ///
    /// # Arguments
    ///
    /// * `source` - Texture to sample, or a solid color
    /// * `destination` - Target framebuffer (`None` = window surface)
    /// * `material` - Shader-driven blit variant; `None` = plain copy
    fn blit(
        &mut self,
        source: BlitSource,
        destination: Option<&Framebuffer>,
        material: Option<&Material>,
    ) -> Result<()>;

    /// Set the viewport for subsequent draws
    fn set_viewport(&mut self, viewport: Viewport);

    /// Current rasterizer state
    fn rasterizer_state(&self) -> RasterizerState;

    /// Replace the rasterizer state
    fn set_rasterizer_state(&mut self, state: RasterizerState);

    /// Size of the window's default framebuffer in physical pixels
    fn window_framebuffer_size(&self) -> PhysicalSize<u32>;
}
