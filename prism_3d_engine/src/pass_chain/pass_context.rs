/// PassContext - everything a pass may touch while rendering.
///
/// Borrowed from the camera for the duration of one chain evaluation. Every
/// pool acquisition made through the context is recorded so the camera can
/// force-release leaked targets afterwards.

use crate::camera::RenderContext;
use crate::error::Result;
use crate::gbuffer::GeometryBuffer;
use crate::graphics_device::{BlitSource, ClearFlags, GraphicsDevice, Material, TextureFormat, TextureId, Viewport};
use crate::scene::SceneRenderer;
use crate::target::{NamedTargetCache, RenderTarget, RenderTargetKey, RenderTargetPool};

pub struct PassContext<'a> {
    pub device: &'a mut dyn GraphicsDevice,
    pub pool: &'a mut RenderTargetPool,
    pub scene: &'a mut dyn SceneRenderer,
    pub gbuffer: &'a GeometryBuffer,
    /// The camera's persistent targets
    pub history: &'a mut NamedTargetCache,
    /// The camera being rendered
    pub render: &'a RenderContext,
    /// Pool handles acquired and not yet released during this evaluation
    acquired: &'a mut Vec<RenderTargetKey>,
}

impl<'a> PassContext<'a> {
    pub fn new(
        device: &'a mut dyn GraphicsDevice,
        pool: &'a mut RenderTargetPool,
        scene: &'a mut dyn SceneRenderer,
        gbuffer: &'a GeometryBuffer,
        history: &'a mut NamedTargetCache,
        render: &'a RenderContext,
        acquired: &'a mut Vec<RenderTargetKey>,
    ) -> Self {
        Self { device, pool, scene, gbuffer, history, render, acquired }
    }

    pub fn frame_index(&self) -> u64 {
        self.render.frame_index
    }

    /// Scaled render resolution
    pub fn size(&self) -> (u32, u32) {
        (self.render.width, self.render.height)
    }

    // ===== POOL =====

    /// Check out a pooled target and record it
    pub fn acquire(&mut self, width: u32, height: u32, formats: &[TextureFormat]) -> Result<RenderTargetKey> {
        let key = self.pool.acquire(self.device, width, height, formats)?;
        self.acquired.push(key);
        Ok(key)
    }

    /// Check out a single-attachment target at render resolution
    pub fn acquire_color(&mut self, format: TextureFormat) -> Result<RenderTargetKey> {
        let (width, height) = self.size();
        self.acquire(width, height, &[format])
    }

    /// Return a target to the pool
    pub fn release(&mut self, key: RenderTargetKey) -> Result<()> {
        self.pool.release(key)?;
        if let Some(index) = self.acquired.iter().rposition(|&k| k == key) {
            self.acquired.swap_remove(index);
        }
        Ok(())
    }

    /// Release an optional input. Passes call this on inputs they discard.
    pub fn release_input(&mut self, input: Option<RenderTargetKey>) -> Result<()> {
        match input {
            Some(key) => self.release(key),
            None => Ok(()),
        }
    }

    /// Handles acquired through this context and still checked out
    pub fn outstanding(&self) -> Vec<RenderTargetKey> {
        self.acquired.iter().copied().filter(|&k| self.pool.is_checked_out(k)).collect()
    }

    pub fn target(&self, key: RenderTargetKey) -> Result<&RenderTarget> {
        self.pool.target(key)
    }

    /// Main (first color) texture of a pooled target
    pub fn texture(&self, key: RenderTargetKey) -> Result<TextureId> {
        let target = self.pool.target(key)?;
        match target.main_texture() {
            Some(texture) => Ok(texture),
            None => crate::engine_bail!(@InvalidResource, "prism3d::PassContext",
                "Target {:?} has no color attachment to sample", key),
        }
    }

    // ===== DRAWING =====

    /// Bind a pooled target as the draw destination, optionally clearing it
    pub fn bind(&mut self, key: RenderTargetKey, clear: Option<[f32; 4]>) -> Result<()> {
        let target = self.pool.target(key)?;
        self.device.bind_framebuffer(Some(target.framebuffer()))?;
        self.device.set_viewport(Viewport::from_size(target.width(), target.height()));
        if let Some(color) = clear {
            self.device.clear(ClearFlags::COLOR, color, 1.0)?;
        }
        Ok(())
    }

    /// Full-screen blit into a pooled target
    pub fn blit(&mut self, source: BlitSource, destination: RenderTargetKey, material: Option<&Material>) -> Result<()> {
        let target = self.pool.target(destination)?;
        self.device.set_viewport(Viewport::from_size(target.width(), target.height()));
        self.device.blit(source, Some(target.framebuffer()), material)
    }

    // ===== PERSISTENT TARGETS =====

    /// Get or create a persistent render-resolution target owned by the camera.
    ///
    /// Returns its main texture and whether its content is new (must be
    /// seeded before it can be read).
    pub fn history(&mut self, name: &str, formats: &[TextureFormat]) -> Result<(TextureId, bool)> {
        let (width, height) = self.size();
        let frame = self.frame_index();
        let (target, is_new) = self.history.get_or_create(self.device, name, width, height, formats, frame)?;
        match target.main_texture() {
            Some(texture) => Ok((texture, is_new)),
            None => crate::engine_bail!(@InvalidResource, "prism3d::PassContext",
                "Persistent target '{}' has no color attachment", name),
        }
    }

    /// Full-screen blit into a persistent target
    pub fn blit_to_history(&mut self, source: BlitSource, name: &str, material: Option<&Material>) -> Result<()> {
        let Some(target) = self.history.get(name) else {
            crate::engine_bail!(@InvalidResource, "prism3d::PassContext",
                "Unknown persistent target '{}'", name);
        };
        self.device.set_viewport(Viewport::from_size(target.width(), target.height()));
        self.device.blit(source, Some(target.framebuffer()), material)
    }
}
