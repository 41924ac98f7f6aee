/// Immediate-mode command types: viewport, scissor, clear flags,
/// rasterizer state, blit sources.

use bitflags::bitflags;
use crate::graphics_device::TextureId;

/// Viewport dimensions and depth range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    /// Full-size viewport at the origin with depth range [0, 1]
    pub fn from_size(width: u32, height: u32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: width as f32,
            height: height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

/// 2D rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect2D {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

bitflags! {
    /// Which buffers of the bound framebuffer a clear touches
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClearFlags: u32 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
        const STENCIL = 1 << 2;
    }
}

/// Rasterizer state toggles the pipeline needs to save and restore
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RasterizerState {
    /// Draw triangle edges only
    pub wireframe: bool,
    /// Scissor rectangle; `None` disables the scissor test
    pub scissor: Option<Rect2D>,
}

/// Source of a full-screen blit
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BlitSource {
    /// Sample a texture over the whole destination
    Texture(TextureId),
    /// Fill the destination with a solid RGBA color
    Color([f32; 4]),
}
