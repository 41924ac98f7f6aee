/// DeferredRenderer - frame driver for a set of cameras.
///
/// Owns the shared graphics device handle, the transient target pool, the
/// frame counter (the only eviction clock), and the cameras. One
/// `render_frame` call:
///
/// 1. advances the frame counter,
/// 2. renders every enabled camera in `camera_render_order`,
/// 3. sweeps the pool once.
///
/// Cameras render strictly one after another; the pool is never touched
/// by two cameras at the same time.

use std::sync::{Arc, Mutex, MutexGuard};
use slotmap::{new_key_type, SlotMap};
use winit::keyboard::KeyCode;
use crate::camera::{camera_render_order, Camera, FrameResources, RenderOutcome};
use crate::engine::Engine;
use crate::error::Result;
use crate::graphics_device::{ClearFlags, GraphicsDevice};
use crate::renderer::RendererConfig;
use crate::scene::SceneRenderer;
use crate::target::RenderTargetPool;

new_key_type! {
    /// Stable handle to a camera registered with a renderer
    pub struct CameraKey;
}

/// What happened during one `render_frame`
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub frame_index: u64,
    /// Per camera, in render order
    pub outcomes: Vec<(CameraKey, RenderOutcome)>,
    /// Pooled targets destroyed by this frame's sweep
    pub evicted: usize,
}

impl FrameReport {
    /// Number of cameras that presented an image
    pub fn rendered_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| matches!(outcome, RenderOutcome::Rendered { .. }))
            .count()
    }
}

pub struct DeferredRenderer {
    device: Arc<Mutex<dyn GraphicsDevice>>,
    pool: RenderTargetPool,
    cameras: SlotMap<CameraKey, Camera>,
    next_sequence: u64,
    frame_index: u64,
    config: RendererConfig,
}

impl DeferredRenderer {
    pub fn new(device: Arc<Mutex<dyn GraphicsDevice>>, config: RendererConfig) -> Self {
        Self {
            device,
            pool: RenderTargetPool::new(),
            cameras: SlotMap::with_key(),
            next_sequence: 0,
            frame_index: 0,
            config,
        }
    }

    /// Renderer on the device registered with `Engine::create_graphics_device`
    pub fn from_engine(config: RendererConfig) -> Result<Self> {
        Ok(Self::new(Engine::graphics_device()?, config))
    }

    fn lock_device<'a>(device: &'a Mutex<dyn GraphicsDevice + 'static>) -> Result<MutexGuard<'a, dyn GraphicsDevice + 'static>> {
        device.lock().map_err(|_| crate::engine_err!("prism3d::DeferredRenderer",
            "GraphicsDevice lock poisoned"))
    }

    // ===== CAMERAS =====

    /// Register a camera. Cameras with equal priority render in
    /// registration order.
    pub fn add_camera(&mut self, mut camera: Camera) -> CameraKey {
        camera.set_sequence(self.next_sequence);
        self.next_sequence += 1;
        crate::engine_debug!("prism3d::DeferredRenderer",
            "Camera '{}' registered (priority {})", camera.name(), camera.priority());
        self.cameras.insert(camera)
    }

    /// Register a default camera cleared with the configured clear color
    pub fn create_camera(&mut self, name: &str) -> CameraKey {
        let mut camera = Camera::new(name);
        camera.set_clear(ClearFlags::COLOR | ClearFlags::DEPTH, self.config.clear_color);
        self.add_camera(camera)
    }

    pub fn camera(&self, key: CameraKey) -> Option<&Camera> {
        self.cameras.get(key)
    }

    pub fn camera_mut(&mut self, key: CameraKey) -> Option<&mut Camera> {
        self.cameras.get_mut(key)
    }

    pub fn camera_count(&self) -> usize {
        self.cameras.len()
    }

    /// Enabled cameras in the order `render_frame` renders them
    pub fn render_order(&self) -> Vec<CameraKey> {
        let mut keys: Vec<CameraKey> = self.cameras
            .iter()
            .filter(|(_, camera)| camera.is_enabled())
            .map(|(key, _)| key)
            .collect();
        keys.sort_by(|&a, &b| camera_render_order(&self.cameras[a], &self.cameras[b]));
        keys
    }

    /// Unregister a camera and free its GPU resources.
    ///
    /// Returns `false` if the key is stale.
    pub fn remove_camera(&mut self, key: CameraKey) -> Result<bool> {
        let Some(mut camera) = self.cameras.remove(key) else {
            return Ok(false);
        };
        let mut device = Self::lock_device(&self.device)?;
        camera.destroy(&mut *device);
        crate::engine_debug!("prism3d::DeferredRenderer", "Camera '{}' removed", camera.name());
        Ok(true)
    }

    // ===== FRAME =====

    /// Render every enabled camera for a new frame.
    ///
    /// # Errors
    ///
    /// A poisoned device lock, or a camera error that is not frame-fatal
    /// (invalid configuration). Frame-fatal failures are reported per camera
    /// in the `FrameReport` and do not stop the other cameras.
    pub fn render_frame(&mut self, scene: &mut dyn SceneRenderer) -> Result<FrameReport> {
        self.frame_index += 1;
        let frame_index = self.frame_index;
        let order = self.render_order();

        let mut device = Self::lock_device(&self.device)?;
        self.pool.begin_frame(frame_index);

        let mut outcomes = Vec::with_capacity(order.len());
        for key in order {
            let camera = &mut self.cameras[key];
            let mut frame = FrameResources {
                device: &mut *device,
                pool: &mut self.pool,
                scene: &mut *scene,
                frame_index,
                max_idle_frames: self.config.max_idle_frames,
            };
            let outcome = camera.render(&mut frame, None, None)?;
            outcomes.push((key, outcome));
        }

        let evicted = self.pool.sweep(&mut *device, frame_index, self.config.max_idle_frames);

        crate::engine_trace!("prism3d::DeferredRenderer",
            "Frame {}: {} cameras, {} targets evicted", frame_index, outcomes.len(), evicted);

        Ok(FrameReport { frame_index, outcomes, evicted })
    }

    /// Render one camera at an explicit size within the current frame.
    ///
    /// Does not advance the frame counter or sweep the pool.
    pub fn render_camera(
        &mut self,
        key: CameraKey,
        scene: &mut dyn SceneRenderer,
        width: Option<u32>,
        height: Option<u32>,
    ) -> Result<RenderOutcome> {
        let Some(camera) = self.cameras.get_mut(key) else {
            crate::engine_bail!(@InvalidResource, "prism3d::DeferredRenderer",
                "Unknown camera {:?}", key);
        };

        let mut device = Self::lock_device(&self.device)?;
        self.pool.begin_frame(self.frame_index);
        let mut frame = FrameResources {
            device: &mut *device,
            pool: &mut self.pool,
            scene,
            frame_index: self.frame_index,
            max_idle_frames: self.config.max_idle_frames,
        };
        camera.render(&mut frame, width, height)
    }

    /// Forward a key press to every camera's debug-view hotkey.
    ///
    /// Returns whether any camera handled it.
    pub fn handle_key(&mut self, key: KeyCode) -> bool {
        let hotkey = self.config.debug_hotkey;
        let mut handled = false;
        for (_, camera) in self.cameras.iter_mut() {
            handled |= camera.handle_debug_hotkey(key, hotkey);
        }
        handled
    }

    /// Destroy every camera's resources and every pooled target
    pub fn shutdown(&mut self) -> Result<()> {
        let mut device = Self::lock_device(&self.device)?;
        for (_, mut camera) in self.cameras.drain() {
            camera.destroy(&mut *device);
        }
        self.pool.destroy_all(&mut *device);
        crate::engine_info!("prism3d::DeferredRenderer",
            "Shut down after {} frames", self.frame_index);
        Ok(())
    }

    // ===== ACCESSORS =====

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    pub fn pool(&self) -> &RenderTargetPool {
        &self.pool
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn device(&self) -> &Arc<Mutex<dyn GraphicsDevice>> {
        &self.device
    }
}

#[cfg(test)]
#[path = "deferred_renderer_tests.rs"]
mod tests;
