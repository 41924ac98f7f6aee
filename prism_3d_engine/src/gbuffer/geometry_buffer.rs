/// GeometryBuffer - the deferred shading scratchpad.
///
/// A single render target with seven fixed attachments in fixed order:
///
/// | # | Attachment         | Format  | Content                         |
/// |---|--------------------|---------|---------------------------------|
/// | 0 | albedo_ao          | RGBA16F | base color, ambient occlusion   |
/// | 1 | normal_metallic    | RGBA16F | world normal, metallic          |
/// | 2 | position_roughness | RGBA32F | world position, roughness       |
/// | 3 | emission           | RGB16F  | emitted radiance                |
/// | 4 | velocity           | RG16F   | screen-space motion             |
/// | 5 | object_id          | R32I    | per-object picking id           |
/// | 6 | depth              | D24     | hardware depth                  |
///
/// Sized to the owning camera's scaled render resolution, reallocated
/// whenever that size changes.

use crate::error::Result;
use crate::graphics_device::{ClearFlags, GraphicsDevice, TextureFormat, TextureId, Viewport};
use crate::target::{RenderTarget, TargetShape};

/// Fixed attachment formats, in attachment order
pub const GBUFFER_LAYOUT: [TextureFormat; 7] = [
    TextureFormat::Rgba16F,
    TextureFormat::Rgba16F,
    TextureFormat::Rgba32F,
    TextureFormat::Rgb16F,
    TextureFormat::Rg16F,
    TextureFormat::R32I,
    TextureFormat::Depth24,
];

/// Named G-buffer attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GBufferAttachment {
    AlbedoAo,
    NormalMetallic,
    PositionRoughness,
    Emission,
    Velocity,
    ObjectId,
    Depth,
}

impl GBufferAttachment {
    pub const ALL: [GBufferAttachment; 7] = [
        GBufferAttachment::AlbedoAo,
        GBufferAttachment::NormalMetallic,
        GBufferAttachment::PositionRoughness,
        GBufferAttachment::Emission,
        GBufferAttachment::Velocity,
        GBufferAttachment::ObjectId,
        GBufferAttachment::Depth,
    ];

    /// Index in `GBUFFER_LAYOUT`
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn format(self) -> TextureFormat {
        GBUFFER_LAYOUT[self.index()]
    }
}

/// Seven-attachment geometry buffer
#[derive(Debug, Default)]
pub struct GeometryBuffer {
    target: Option<RenderTarget>,
    bound: bool,
    allocations: u64,
}

impl GeometryBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure the buffer exists at exactly `width` x `height`.
    ///
    /// Returns `true` if a (re)allocation happened. Dependents holding
    /// resolution-matched data (history targets) must be invalidated then.
    ///
    /// # Errors
    ///
    /// Allocation failure propagates. The old buffer is already destroyed at
    /// that point, so the G-buffer is left absent rather than stale.
    pub fn ensure_size(&mut self, device: &mut dyn GraphicsDevice, width: u32, height: u32) -> Result<bool> {
        if self.size() == Some((width, height)) {
            return Ok(false);
        }

        if let Some(old) = self.target.take() {
            crate::engine_debug!("prism3d::GeometryBuffer",
                "Resizing {}x{} -> {}x{}", old.width(), old.height(), width, height);
            old.destroy(device);
        }
        self.bound = false;

        let target = RenderTarget::create(device, TargetShape::new(width, height, &GBUFFER_LAYOUT))?;
        self.target = Some(target);
        self.allocations += 1;
        Ok(true)
    }

    /// Bind as the active draw target, optionally zeroing every attachment
    ///
    /// Color attachments clear to zero; depth clears to the far plane.
    pub fn begin(&mut self, device: &mut dyn GraphicsDevice, clear: bool) -> Result<()> {
        let Some(target) = &self.target else {
            crate::engine_bail!(@InvalidResource, "prism3d::GeometryBuffer",
                "begin() before ensure_size()");
        };

        device.bind_framebuffer(Some(target.framebuffer()))?;
        self.bound = true;
        device.set_viewport(Viewport::from_size(target.width(), target.height()));
        if clear {
            device.clear(ClearFlags::COLOR | ClearFlags::DEPTH, [0.0; 4], 1.0)?;
        }
        Ok(())
    }

    /// Unbind (back to the default framebuffer). No-op when not bound.
    pub fn end(&mut self, device: &mut dyn GraphicsDevice) -> Result<()> {
        if !self.bound {
            return Ok(());
        }
        self.bound = false;
        device.bind_framebuffer(None)
    }

    pub fn is_bound(&self) -> bool {
        self.bound
    }

    /// Current size, or `None` before the first `ensure_size`
    pub fn size(&self) -> Option<(u32, u32)> {
        self.target.as_ref().map(|t| (t.width(), t.height()))
    }

    pub fn target(&self) -> Option<&RenderTarget> {
        self.target.as_ref()
    }

    /// Number of allocations over this buffer's lifetime
    pub fn allocation_count(&self) -> u64 {
        self.allocations
    }

    /// Free the GPU resources. The buffer can be re-created by `ensure_size`.
    pub fn destroy(&mut self, device: &mut dyn GraphicsDevice) {
        if self.bound {
            let _ = self.end(device);
        }
        if let Some(target) = self.target.take() {
            target.destroy(device);
        }
    }

    // ===== SAMPLING ACCESSORS =====

    /// Sampled texture of one attachment
    pub fn attachment(&self, attachment: GBufferAttachment) -> Option<TextureId> {
        let target = self.target.as_ref()?;
        match attachment {
            GBufferAttachment::Depth => target.depth_texture(),
            color => target.color_texture(color.index()),
        }
    }

    pub fn albedo_ao(&self) -> Option<TextureId> {
        self.attachment(GBufferAttachment::AlbedoAo)
    }

    pub fn normal_metallic(&self) -> Option<TextureId> {
        self.attachment(GBufferAttachment::NormalMetallic)
    }

    pub fn position_roughness(&self) -> Option<TextureId> {
        self.attachment(GBufferAttachment::PositionRoughness)
    }

    pub fn emission(&self) -> Option<TextureId> {
        self.attachment(GBufferAttachment::Emission)
    }

    pub fn velocity(&self) -> Option<TextureId> {
        self.attachment(GBufferAttachment::Velocity)
    }

    pub fn object_id(&self) -> Option<TextureId> {
        self.attachment(GBufferAttachment::ObjectId)
    }

    pub fn depth(&self) -> Option<TextureId> {
        self.attachment(GBufferAttachment::Depth)
    }
}

#[cfg(test)]
#[path = "geometry_buffer_tests.rs"]
mod tests;
