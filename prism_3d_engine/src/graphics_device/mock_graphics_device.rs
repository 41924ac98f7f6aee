/// Mock GraphicsDevice for unit tests (no GPU required)
///
/// Records every command, tracks live framebuffers, and can simulate
/// GPU memory exhaustion after a fixed number of allocations.

use rustc_hash::FxHashSet;
use winit::dpi::PhysicalSize;
use crate::error::{Error, Result};
use crate::graphics_device::{
    BlitSource, ClearFlags, Framebuffer, FramebufferDesc, FramebufferId, GraphicsDevice,
    Material, RasterizerState, TextureId, Viewport,
};

// ============================================================================
// Mock Command
// ============================================================================

/// One recorded device call
#[derive(Debug, Clone, PartialEq)]
pub enum MockCommand {
    CreateFramebuffer { id: FramebufferId, width: u32, height: u32, attachments: usize },
    DestroyFramebuffer(FramebufferId),
    Bind(Option<FramebufferId>),
    Clear(ClearFlags),
    Blit {
        source: BlitSource,
        destination: Option<FramebufferId>,
        shader: Option<String>,
        keywords: Vec<String>,
    },
    SetViewport { width: u32, height: u32 },
    SetRasterizer(RasterizerState),
}

// ============================================================================
// Mock GraphicsDevice
// ============================================================================

/// Mock device that tracks created resources without a GPU
#[derive(Debug)]
pub struct MockGraphicsDevice {
    /// Every call, in order
    pub commands: Vec<MockCommand>,
    /// Framebuffers created and not yet destroyed
    pub live_framebuffers: FxHashSet<FramebufferId>,
    /// Total framebuffers ever created
    pub created_count: usize,
    /// Total framebuffers destroyed
    pub destroyed_count: usize,
    /// Currently bound framebuffer (`None` = window surface)
    pub bound: Option<FramebufferId>,
    /// Fail with `OutOfMemory` once this many more allocations succeeded
    pub fail_after: Option<usize>,
    /// Return one attachment fewer than requested (malformed backend)
    pub drop_last_attachment: bool,
    window_size: PhysicalSize<u32>,
    rasterizer: RasterizerState,
    next_id: u64,
}

impl MockGraphicsDevice {
    /// Create a mock with an 800x600 window
    pub fn new() -> Self {
        Self::with_window_size(800, 600)
    }

    /// Create a mock with the given window framebuffer size
    pub fn with_window_size(width: u32, height: u32) -> Self {
        Self {
            commands: Vec::new(),
            live_framebuffers: FxHashSet::default(),
            created_count: 0,
            destroyed_count: 0,
            bound: None,
            fail_after: None,
            drop_last_attachment: false,
            window_size: PhysicalSize::new(width, height),
            rasterizer: RasterizerState::default(),
            next_id: 1,
        }
    }

    /// Resize the simulated window
    pub fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_size = PhysicalSize::new(width, height);
    }

    /// Number of live framebuffers
    pub fn live_count(&self) -> usize {
        self.live_framebuffers.len()
    }

    /// All blit commands, in order
    pub fn blits(&self) -> Vec<&MockCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, MockCommand::Blit { .. }))
            .collect()
    }

    /// Blits issued with the given shader
    pub fn blit_count(&self, shader: &str) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, MockCommand::Blit { shader: Some(s), .. } if s == shader))
            .count()
    }

    /// Forget recorded commands (keeps resource tracking)
    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    fn next_handle(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl Default for MockGraphicsDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    fn create_framebuffer(&mut self, desc: &FramebufferDesc) -> Result<Framebuffer> {
        if let Some(remaining) = self.fail_after {
            if remaining == 0 {
                return Err(Error::OutOfMemory);
            }
            self.fail_after = Some(remaining - 1);
        }

        let id = FramebufferId(self.next_handle());
        let mut color_attachments: Vec<TextureId> = (0..desc.color_formats.len())
            .map(|_| TextureId(self.next_handle()))
            .collect();
        let mut depth_attachment = desc.depth_format.map(|_| TextureId(self.next_handle()));

        if self.drop_last_attachment {
            if depth_attachment.is_some() {
                depth_attachment = None;
            } else {
                color_attachments.pop();
            }
        }

        self.live_framebuffers.insert(id);
        self.created_count += 1;
        self.commands.push(MockCommand::CreateFramebuffer {
            id,
            width: desc.width,
            height: desc.height,
            attachments: desc.attachment_count(),
        });

        Ok(Framebuffer {
            id,
            color_attachments,
            depth_attachment,
            width: desc.width,
            height: desc.height,
        })
    }

    fn destroy_framebuffer(&mut self, framebuffer: &Framebuffer) {
        if self.live_framebuffers.remove(&framebuffer.id) {
            self.destroyed_count += 1;
        }
        self.commands.push(MockCommand::DestroyFramebuffer(framebuffer.id));
    }

    fn bind_framebuffer(&mut self, framebuffer: Option<&Framebuffer>) -> Result<()> {
        let id = framebuffer.map(|f| f.id);
        if let Some(id) = id {
            if !self.live_framebuffers.contains(&id) {
                return Err(Error::InvalidResource(format!("bind of destroyed framebuffer {:?}", id)));
            }
        }
        self.bound = id;
        self.commands.push(MockCommand::Bind(id));
        Ok(())
    }

    fn clear(&mut self, flags: ClearFlags, _color: [f32; 4], _depth: f32) -> Result<()> {
        self.commands.push(MockCommand::Clear(flags));
        Ok(())
    }

    fn blit(
        &mut self,
        source: BlitSource,
        destination: Option<&Framebuffer>,
        material: Option<&Material>,
    ) -> Result<()> {
        self.commands.push(MockCommand::Blit {
            source,
            destination: destination.map(|f| f.id),
            shader: material.map(|m| m.shader().to_string()),
            keywords: material
                .map(|m| m.keywords().into_iter().map(str::to_string).collect())
                .unwrap_or_default(),
        });
        Ok(())
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.commands.push(MockCommand::SetViewport {
            width: viewport.width as u32,
            height: viewport.height as u32,
        });
    }

    fn rasterizer_state(&self) -> RasterizerState {
        self.rasterizer
    }

    fn set_rasterizer_state(&mut self, state: RasterizerState) {
        self.rasterizer = state;
        self.commands.push(MockCommand::SetRasterizer(state));
    }

    fn window_framebuffer_size(&self) -> PhysicalSize<u32> {
        self.window_size
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "mock_graphics_device_tests.rs"]
mod tests;
