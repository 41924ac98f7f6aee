/// Framebuffer handle and descriptor
///
/// A framebuffer binds together color and depth attachments that a draw
/// or blit writes into. Created once and reused; recreated only when the
/// attachment shape changes (e.g., resolution change).

use crate::graphics_device::{TextureFormat, TextureId};

/// Opaque handle to a native framebuffer object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FramebufferId(pub u64);

/// Descriptor for creating a framebuffer
#[derive(Debug, Clone, PartialEq)]
pub struct FramebufferDesc {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Color attachment formats, in attachment order
    pub color_formats: Vec<TextureFormat>,
    /// Optional depth attachment format
    pub depth_format: Option<TextureFormat>,
}

impl FramebufferDesc {
    /// Total number of attachments (color + depth)
    pub fn attachment_count(&self) -> usize {
        self.color_formats.len() + usize::from(self.depth_format.is_some())
    }
}

/// A created framebuffer with its attachment textures
///
/// Returned by `GraphicsDevice::create_framebuffer()`. The device owns the
/// GPU memory; this value only carries the handles.
#[derive(Debug, Clone, PartialEq)]
pub struct Framebuffer {
    /// Native framebuffer handle
    pub id: FramebufferId,
    /// One texture per color attachment, in descriptor order
    pub color_attachments: Vec<TextureId>,
    /// Depth texture, if the descriptor requested one
    pub depth_attachment: Option<TextureId>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Framebuffer {
    /// Total number of attachments (color + depth)
    pub fn attachment_count(&self) -> usize {
        self.color_attachments.len() + usize::from(self.depth_attachment.is_some())
    }
}
