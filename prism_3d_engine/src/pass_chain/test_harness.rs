/// Owned pass environment for unit tests.
///
/// Holds everything a `PassContext` borrows, backed by the mock device.

use glam::{Mat4, Vec3};
use crate::camera::{DebugDrawMode, RenderContext};
use crate::gbuffer::GeometryBuffer;
use crate::graphics_device::mock_graphics_device::MockGraphicsDevice;
use crate::graphics_device::TextureFormat;
use crate::pass_chain::{FrameState, PassContext};
use crate::scene::EmptyScene;
use crate::target::{NamedTargetCache, RenderTargetKey, RenderTargetPool};

pub struct PassHarness {
    pub device: MockGraphicsDevice,
    pub pool: RenderTargetPool,
    pub scene: EmptyScene,
    pub gbuffer: GeometryBuffer,
    pub history: NamedTargetCache,
    pub render: RenderContext,
    pub acquired: Vec<RenderTargetKey>,
}

pub fn frame_state(frame_index: u64, width: u32, height: u32) -> FrameState {
    let projection = Mat4::perspective_rh(60f32.to_radians(), width as f32 / height as f32, 0.1, 100.0);
    FrameState::new(frame_index, width, height, Mat4::IDENTITY, projection, 0.1, 100.0)
}

impl PassHarness {
    /// Harness at `width` x `height` with an allocated G-buffer
    pub fn new(width: u32, height: u32) -> Self {
        let mut harness = Self::without_gbuffer(width, height);
        harness.gbuffer.ensure_size(&mut harness.device, width, height).unwrap();
        harness
    }

    /// Harness whose G-buffer was never allocated
    pub fn without_gbuffer(width: u32, height: u32) -> Self {
        let mut pool = RenderTargetPool::new();
        pool.begin_frame(1);
        Self {
            device: MockGraphicsDevice::new(),
            pool,
            scene: EmptyScene,
            gbuffer: GeometryBuffer::new(),
            history: NamedTargetCache::new(),
            render: Self::context(1, width, height),
            acquired: Vec::new(),
        }
    }

    fn context(frame_index: u64, width: u32, height: u32) -> RenderContext {
        RenderContext::from_frame_state(
            "test", &frame_state(frame_index, width, height), Vec3::ZERO, false, None, DebugDrawMode::Off,
        )
    }

    /// Move every clock to `frame_index`
    pub fn set_frame(&mut self, frame_index: u64) {
        self.pool.begin_frame(frame_index);
        self.render.frame_index = frame_index;
    }

    pub fn ctx(&mut self) -> PassContext<'_> {
        PassContext::new(
            &mut self.device,
            &mut self.pool,
            &mut self.scene,
            &self.gbuffer,
            &mut self.history,
            &self.render,
            &mut self.acquired,
        )
    }

    /// Check out a scene-color input the way a previous pass would
    pub fn input(&mut self) -> RenderTargetKey {
        let (width, height) = (self.render.width, self.render.height);
        self.ctx().acquire(width, height, &[TextureFormat::Rgba16F]).unwrap()
    }
}
