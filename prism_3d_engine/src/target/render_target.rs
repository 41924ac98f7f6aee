/// RenderTarget - a GPU-backed 2D surface with N color attachments and an
/// optional depth attachment.
///
/// A render target is both a draw destination (its framebuffer) and a set of
/// sampled textures (one per attachment). It is owned by exactly one holder
/// at a time: a camera, the pool, or a pass mid-evaluation.

use crate::error::Result;
use crate::graphics_device::{Framebuffer, FramebufferDesc, GraphicsDevice, TextureFormat, TextureId};
use crate::engine_bail;

// ============================================================================
// TargetShape
// ============================================================================

/// Dimensions and ordered attachment formats of a render target.
///
/// Also the pool key: two shapes are equal only if their format lists are
/// equal element-wise, in order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetShape {
    pub width: u32,
    pub height: u32,
    pub formats: Vec<TextureFormat>,
}

impl TargetShape {
    pub fn new(width: u32, height: u32, formats: &[TextureFormat]) -> Self {
        Self { width, height, formats: formats.to_vec() }
    }

    /// Reject shapes no device can allocate.
    ///
    /// Width and height must be non-zero, the format list non-empty, and at
    /// most one depth format may appear, as the last entry.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            engine_bail!(@InvalidConfiguration, "prism3d::RenderTarget",
                "Render target size must be non-zero, got {}x{}", self.width, self.height);
        }
        if self.formats.is_empty() {
            engine_bail!(@InvalidConfiguration, "prism3d::RenderTarget",
                "Render target needs at least one attachment format");
        }
        let last = self.formats.len() - 1;
        if let Some(index) = self.formats.iter().position(|f| f.is_depth()) {
            if index != last {
                engine_bail!(@InvalidConfiguration, "prism3d::RenderTarget",
                    "Depth format {:?} must be the last attachment (found at {} of {})",
                    self.formats[index], index, self.formats.len());
            }
        }
        Ok(())
    }

    /// Color formats (every format except a trailing depth format)
    pub fn color_formats(&self) -> &[TextureFormat] {
        match self.formats.last() {
            Some(f) if f.is_depth() => &self.formats[..self.formats.len() - 1],
            _ => &self.formats,
        }
    }

    /// Trailing depth format, if any
    pub fn depth_format(&self) -> Option<TextureFormat> {
        self.formats.last().copied().filter(|f| f.is_depth())
    }

    /// Approximate GPU memory footprint in bytes
    pub fn byte_size(&self) -> u64 {
        let per_pixel: u64 = self.formats.iter().map(|f| f.bytes_per_pixel() as u64).sum();
        per_pixel * self.width as u64 * self.height as u64
    }

    fn framebuffer_desc(&self) -> FramebufferDesc {
        FramebufferDesc {
            width: self.width,
            height: self.height,
            color_formats: self.color_formats().to_vec(),
            depth_format: self.depth_format(),
        }
    }
}

// ============================================================================
// RenderTarget
// ============================================================================

/// GPU surface: a framebuffer plus one texture per attachment
#[derive(Debug)]
pub struct RenderTarget {
    shape: TargetShape,
    framebuffer: Framebuffer,
}

impl RenderTarget {
    /// Allocate a render target on the device.
    ///
    /// # Errors
    ///
    /// - `InvalidConfiguration` if the shape is invalid
    /// - `OutOfMemory` / `BackendError` from the device, unchanged
    /// - `InvalidResource` if the device returned a framebuffer whose
    ///   attachment count does not match the format list (it is destroyed)
    pub fn create(device: &mut dyn GraphicsDevice, shape: TargetShape) -> Result<Self> {
        shape.validate()?;

        let framebuffer = device.create_framebuffer(&shape.framebuffer_desc())?;

        if framebuffer.attachment_count() != shape.formats.len()
            || framebuffer.depth_attachment.is_some() != shape.depth_format().is_some()
        {
            let got = framebuffer.attachment_count();
            device.destroy_framebuffer(&framebuffer);
            engine_bail!(@InvalidResource, "prism3d::RenderTarget",
                "Device returned {} attachments for {} requested formats",
                got, shape.formats.len());
        }

        crate::engine_trace!("prism3d::RenderTarget",
            "Created {}x{} target {:?} ({} attachments)",
            shape.width, shape.height, framebuffer.id, shape.formats.len());

        Ok(Self { shape, framebuffer })
    }

    /// Release the GPU resources. Consumes the target.
    pub fn destroy(self, device: &mut dyn GraphicsDevice) {
        crate::engine_trace!("prism3d::RenderTarget",
            "Destroying {}x{} target {:?}", self.shape.width, self.shape.height, self.framebuffer.id);
        device.destroy_framebuffer(&self.framebuffer);
    }

    // ===== ACCESSORS =====

    pub fn shape(&self) -> &TargetShape {
        &self.shape
    }

    pub fn width(&self) -> u32 {
        self.shape.width
    }

    pub fn height(&self) -> u32 {
        self.shape.height
    }

    pub fn formats(&self) -> &[TextureFormat] {
        &self.shape.formats
    }

    /// Framebuffer to bind when drawing into this target
    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    /// Sampled texture of the color attachment at `index`
    pub fn color_texture(&self, index: usize) -> Option<TextureId> {
        self.framebuffer.color_attachments.get(index).copied()
    }

    /// Sampled texture of the depth attachment
    pub fn depth_texture(&self) -> Option<TextureId> {
        self.framebuffer.depth_attachment
    }

    /// First color attachment, the one passes read as "the image"
    pub fn main_texture(&self) -> Option<TextureId> {
        self.color_texture(0)
    }
}

#[cfg(test)]
#[path = "render_target_tests.rs"]
mod tests;
