/// Camera - drives one deferred frame from matrices to final composite.
///
/// Each camera owns its G-buffer, its pass chain, and its persistent
/// (history) targets; the pooled scratch targets are shared through the
/// renderer. One `render` call walks the state machine:
///
/// ```text
/// Idle → ComputingMatrices → CapturingGeometry → EvaluatingChain → Compositing → Idle
///   ↑                                                                           │
///   └───────────── early end (allocation / backend failure) ◄───────────────────┘
/// ```
///
/// The early end unbinds the G-buffer, restores the rasterizer state,
/// returns every pooled target this frame still holds, and clears the
/// output, so nothing is left half-bound and no garbled image is presented.

use std::cmp::Ordering;
use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
use winit::keyboard::KeyCode;
use crate::camera::{DebugDrawMode, Frustum, Projection, RenderContext};
use crate::error::{Error, Result};
use crate::gbuffer::GeometryBuffer;
use crate::graphics_device::{
    BlitSource, ClearFlags, GraphicsDevice, Material, RasterizerState, Viewport,
};
use crate::pass_chain::{FrameState, PassChain, PassContext};
use crate::scene::SceneRenderer;
use crate::target::{NamedTargetCache, RenderTarget, RenderTargetKey, RenderTargetPool};
use crate::engine_bail;

// ============================================================================
// Frame plumbing
// ============================================================================

/// Shared resources a camera borrows for one render
pub struct FrameResources<'a> {
    pub device: &'a mut dyn GraphicsDevice,
    pub pool: &'a mut RenderTargetPool,
    pub scene: &'a mut dyn SceneRenderer,
    /// Monotonic frame counter (eviction clock)
    pub frame_index: u64,
    /// Idle frames after which persistent targets are evicted
    pub max_idle_frames: u64,
}

/// Where a camera is in its frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraState {
    #[default]
    Idle,
    ComputingMatrices,
    CapturingGeometry,
    EvaluatingChain,
    Compositing,
}

/// How a render call ended
#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome {
    /// Frame presented; G-buffer size
    Rendered { width: u32, height: u32 },
    /// Zero-sized output (e.g. minimized window), nothing drawn
    Skipped,
    /// Allocation or backend failure; the output shows only a clear
    Aborted(Error),
}

/// World-space ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit direction
    pub direction: Vec3,
}

/// Render order: ascending priority (lower renders first, higher renders
/// later and lands on top), ties broken by registration order.
pub fn camera_render_order(a: &Camera, b: &Camera) -> Ordering {
    a.priority
        .cmp(&b.priority)
        .then_with(|| a.sequence.cmp(&b.sequence))
}

/// Scaled render size: `round(size * scale)`, at least 1 pixel per axis
pub fn scaled_size(width: u32, height: u32, scale: f32) -> (u32, u32) {
    let scale_axis = |v: u32| ((v as f32 * scale).round() as u32).max(1);
    (scale_axis(width), scale_axis(height))
}

// ============================================================================
// Camera
// ============================================================================

#[derive(Debug)]
pub struct Camera {
    name: String,
    enabled: bool,
    priority: i32,
    /// Registration order, tie-break for `priority`
    sequence: u64,

    // Projection
    projection: Projection,
    near: f32,
    far: f32,
    resolution_scale: f32,

    // Transform
    position: Vec3,
    rotation: Quat,
    camera_relative: bool,

    // Output
    clear_flags: ClearFlags,
    clear_color: [f32; 4],
    output: Option<RenderTarget>,

    // Frame pipeline
    depth_prepass: bool,
    debug_mode: DebugDrawMode,
    debug_material: Option<Material>,
    gbuffer: GeometryBuffer,
    chain: PassChain,
    history: NamedTargetCache,

    // Per-frame bookkeeping
    state: CameraState,
    /// Pool targets checked out during the current frame
    transient: Vec<RenderTargetKey>,
    saved_rasterizer: Option<RasterizerState>,
    previous_view_projection: Option<Mat4>,
    /// Unscaled output size of the last render (screen-space queries)
    viewport_size: Option<(u32, u32)>,
    last_context: Option<RenderContext>,
}

impl Camera {
    /// Perspective camera (60° FOV, near 0.1, far 1000) at the origin,
    /// looking down -Z, with the standard chain
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            enabled: true,
            priority: 0,
            sequence: 0,
            projection: Projection::default(),
            near: 0.1,
            far: 1000.0,
            resolution_scale: 1.0,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            camera_relative: false,
            clear_flags: ClearFlags::COLOR | ClearFlags::DEPTH,
            clear_color: [0.0, 0.0, 0.0, 1.0],
            output: None,
            depth_prepass: false,
            debug_mode: DebugDrawMode::Off,
            debug_material: None,
            gbuffer: GeometryBuffer::new(),
            chain: PassChain::standard(),
            history: NamedTargetCache::new(),
            state: CameraState::Idle,
            transient: Vec::new(),
            saved_rasterizer: None,
            previous_view_projection: None,
            viewport_size: None,
            last_context: None,
        }
    }

    // ===== GETTERS =====

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    pub fn resolution_scale(&self) -> f32 {
        self.resolution_scale
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    pub fn state(&self) -> CameraState {
        self.state
    }

    pub fn debug_mode(&self) -> DebugDrawMode {
        self.debug_mode
    }

    pub fn gbuffer(&self) -> &GeometryBuffer {
        &self.gbuffer
    }

    pub fn pass_chain(&self) -> &PassChain {
        &self.chain
    }

    pub fn pass_chain_mut(&mut self) -> &mut PassChain {
        &mut self.chain
    }

    pub fn history(&self) -> &NamedTargetCache {
        &self.history
    }

    pub fn output(&self) -> Option<&RenderTarget> {
        self.output.as_ref()
    }

    /// Context of the last completed render
    pub fn last_context(&self) -> Option<&RenderContext> {
        self.last_context.as_ref()
    }

    // ===== SETTERS =====

    pub fn set_priority(&mut self, priority: i32) {
        self.priority = priority;
    }

    pub(crate) fn set_sequence(&mut self, sequence: u64) {
        self.sequence = sequence;
    }

    pub fn set_projection(&mut self, projection: Projection) {
        self.projection = projection;
    }

    pub fn set_clip_planes(&mut self, near: f32, far: f32) {
        self.near = near;
        self.far = far;
    }

    /// Fraction of the output resolution the G-buffer is rendered at
    pub fn set_resolution_scale(&mut self, scale: f32) {
        self.resolution_scale = scale;
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
    }

    /// Point the camera at `target`
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        let view = Mat4::look_at_rh(self.position, target, up);
        let (_, rotation, _) = view.inverse().to_scale_rotation_translation();
        self.rotation = rotation;
    }

    /// Draw with the camera at the origin (precision far from the origin)
    pub fn set_camera_relative(&mut self, enabled: bool) {
        self.camera_relative = enabled;
    }

    pub fn set_clear(&mut self, flags: ClearFlags, color: [f32; 4]) {
        self.clear_flags = flags;
        self.clear_color = color;
    }

    pub fn set_depth_prepass(&mut self, enabled: bool) {
        self.depth_prepass = enabled;
    }

    pub fn set_debug_mode(&mut self, mode: DebugDrawMode) {
        self.debug_mode = mode;
    }

    /// Render into `output` instead of the screen. Returns the previous one.
    pub fn set_output(&mut self, output: Option<RenderTarget>) -> Option<RenderTarget> {
        std::mem::replace(&mut self.output, output)
    }

    /// Replace the pass chain.
    ///
    /// The new chain starts from a clean state and the persistent targets
    /// are invalidated, since their content was produced by the old chain.
    pub fn set_pass_chain(&mut self, mut chain: PassChain) -> PassChain {
        chain.reset();
        self.history.invalidate_all();
        self.previous_view_projection = None;
        std::mem::replace(&mut self.chain, chain)
    }

    /// Cycle the debug mode when `key` is the debug hotkey.
    ///
    /// Returns whether the key was handled.
    pub fn handle_debug_hotkey(&mut self, key: KeyCode, hotkey: KeyCode) -> bool {
        if key != hotkey {
            return false;
        }
        self.debug_mode = self.debug_mode.next();
        crate::engine_info!("prism3d::Camera", "'{}' debug view: {:?}", self.name, self.debug_mode);
        true
    }

    // ===== MATRICES =====

    /// Reject settings no frame can be rendered with
    pub fn validate(&self) -> Result<()> {
        if !self.enabled {
            engine_bail!(@InvalidConfiguration, "prism3d::Camera",
                "Camera '{}' is disabled", self.name);
        }
        if !(self.resolution_scale > 0.0 && self.resolution_scale.is_finite()) {
            engine_bail!(@InvalidConfiguration, "prism3d::Camera",
                "Camera '{}' resolution scale must be > 0, got {}", self.name, self.resolution_scale);
        }
        self.projection.validate(self.near, self.far)
    }

    /// World-to-view matrix
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position).inverse()
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        self.projection.matrix(aspect, self.near, self.far)
    }

    fn current_aspect(&self) -> f32 {
        let (w, h) = self.viewport_size
            .or_else(|| self.output.as_ref().map(|t| (t.width(), t.height())))
            .unwrap_or((1, 1));
        w as f32 / h.max(1) as f32
    }

    /// Unjittered world-space view-projection at the last rendered aspect
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix(self.current_aspect()) * self.view_matrix()
    }

    /// Culling volume for the current transform. Computed on every call.
    pub fn calculate_frustum(&self) -> Frustum {
        Frustum::from_view_projection(&self.view_projection())
    }

    /// Project a world point to pixel coordinates (origin top-left).
    ///
    /// Returns (x, y, depth) with depth in [0, 1], or `None` if the point is
    /// behind the camera or nothing has been rendered yet.
    pub fn world_to_screen_point(&self, point: Vec3) -> Option<Vec3> {
        let (width, height) = self.viewport_size?;
        let clip = self.view_projection() * point.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some(Vec3::new(
            (ndc.x * 0.5 + 0.5) * width as f32,
            (0.5 - ndc.y * 0.5) * height as f32,
            ndc.z,
        ))
    }

    /// Ray from the near plane through a pixel (origin top-left)
    pub fn screen_point_to_ray(&self, pixel: Vec2) -> Option<Ray> {
        let (width, height) = self.viewport_size?;
        let ndc = Vec2::new(
            pixel.x / width as f32 * 2.0 - 1.0,
            1.0 - pixel.y / height as f32 * 2.0,
        );
        let inverse = self.view_projection().inverse();
        let unproject = |z: f32| {
            let p: Vec4 = inverse * Vec4::new(ndc.x, ndc.y, z, 1.0);
            p.truncate() / p.w
        };
        let near = unproject(0.0);
        let far = unproject(1.0);
        let direction = (far - near).normalize_or_zero();
        if direction == Vec3::ZERO {
            return None;
        }
        Some(Ray { origin: near, direction })
    }

    /// Output size for a render call, before resolution scaling.
    ///
    /// An explicit output target wins; else the given size; else the
    /// window framebuffer.
    pub fn resolve_output_size(&self, device: &dyn GraphicsDevice, width: Option<u32>, height: Option<u32>) -> (u32, u32) {
        if let Some(output) = &self.output {
            return (output.width(), output.height());
        }
        let window = device.window_framebuffer_size();
        (width.unwrap_or(window.width), height.unwrap_or(window.height))
    }

    // ===== RENDER =====

    /// Render one frame.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` before any GPU work if the camera cannot
    /// render. Allocation and backend failures do NOT surface as errors:
    /// they abort the frame through the early end and report
    /// `RenderOutcome::Aborted`. Any other error also runs the early end
    /// before being returned.
    pub fn render(&mut self, frame: &mut FrameResources<'_>, width: Option<u32>, height: Option<u32>) -> Result<RenderOutcome> {
        self.validate()?;

        let (out_w, out_h) = self.resolve_output_size(&*frame.device, width, height);
        if out_w == 0 || out_h == 0 {
            crate::engine_trace!("prism3d::Camera", "'{}' skipped: zero-sized output", self.name);
            return Ok(RenderOutcome::Skipped);
        }
        let (w, h) = scaled_size(out_w, out_h, self.resolution_scale);
        self.viewport_size = Some((out_w, out_h));

        match self.render_frame(frame, (w, h), (out_w, out_h)) {
            Ok(()) => Ok(RenderOutcome::Rendered { width: w, height: h }),
            Err(error) => {
                self.early_end(frame);
                if error.is_frame_fatal() {
                    crate::engine_warn!("prism3d::Camera",
                        "'{}' aborted frame {}: {}", self.name, frame.frame_index, error);
                    Ok(RenderOutcome::Aborted(error))
                } else {
                    Err(error)
                }
            }
        }
    }

    fn render_frame(&mut self, frame: &mut FrameResources<'_>, size: (u32, u32), output_size: (u32, u32)) -> Result<()> {
        let (w, h) = size;
        self.transient.clear();

        // ----- matrices (and the chain's prepare phase) -----
        self.state = CameraState::ComputingMatrices;
        let mut frame_state = FrameState::new(
            frame.frame_index, w, h,
            self.view_matrix(), self.projection_matrix(w as f32 / h as f32),
            self.near, self.far,
        );
        self.chain.prepare(&mut frame_state);
        let context = RenderContext::from_frame_state(
            &self.name, &frame_state, self.position, self.camera_relative,
            self.previous_view_projection, self.debug_mode,
        );

        // ----- geometry -----
        self.state = CameraState::CapturingGeometry;
        if self.gbuffer.ensure_size(frame.device, w, h)? {
            crate::engine_debug!("prism3d::Camera", "'{}' G-buffer now {}x{}", self.name, w, h);
            self.history.invalidate_all();
        }
        self.capture_geometry(frame, &context)?;

        // ----- chain -----
        self.state = CameraState::EvaluatingChain;
        let result = if self.debug_mode.gbuffer_channel().is_some() {
            // History goes stale while the chain is skipped
            self.history.invalidate_all();
            None
        } else {
            let mut ctx = PassContext::new(
                &mut *frame.device, &mut *frame.pool, &mut *frame.scene,
                &self.gbuffer, &mut self.history, &context, &mut self.transient,
            );
            self.chain.evaluate(&mut ctx, None)?
        };
        self.release_leaked(frame.pool, result)?;

        // ----- composite -----
        self.state = CameraState::Compositing;
        self.composite(frame.device, frame.pool, result, output_size)?;
        if let Some(key) = result {
            frame.pool.release(key)?;
            self.transient.clear();
        }

        self.history.sweep(frame.device, frame.frame_index, frame.max_idle_frames);
        self.previous_view_projection = Some(context.world_view_projection());
        self.last_context = Some(context);
        self.state = CameraState::Idle;
        Ok(())
    }

    fn capture_geometry(&mut self, frame: &mut FrameResources<'_>, context: &RenderContext) -> Result<()> {
        self.gbuffer.begin(frame.device, true)?;

        if self.depth_prepass {
            frame.scene.render_geometry_depth(context, frame.device)?;
        }

        let saved = frame.device.rasterizer_state();
        self.saved_rasterizer = Some(saved);
        if self.debug_mode == DebugDrawMode::Wireframe {
            frame.device.set_rasterizer_state(RasterizerState { wireframe: true, ..saved });
        }

        frame.scene.render_geometry(context, frame.device)?;

        if let Some(saved) = self.saved_rasterizer.take() {
            if frame.device.rasterizer_state() != saved {
                frame.device.set_rasterizer_state(saved);
            }
        }
        self.gbuffer.end(frame.device)
    }

    /// Leak backstop: return whatever the chain left checked out
    fn release_leaked(&mut self, pool: &mut RenderTargetPool, result: Option<RenderTargetKey>) -> Result<()> {
        for key in std::mem::take(&mut self.transient) {
            if Some(key) == result {
                self.transient.push(key);
                continue;
            }
            if pool.is_checked_out(key) {
                crate::engine_warn!("prism3d::Camera",
                    "'{}' pass chain leaked target {:?}, releasing", self.name, key);
                pool.release(key)?;
            }
        }
        Ok(())
    }

    fn composite(
        &mut self,
        device: &mut dyn GraphicsDevice,
        pool: &RenderTargetPool,
        result: Option<RenderTargetKey>,
        output_size: (u32, u32),
    ) -> Result<()> {
        let destination = self.output.as_ref().map(|t| t.framebuffer());
        device.bind_framebuffer(destination)?;
        device.set_viewport(Viewport::from_size(output_size.0, output_size.1));
        device.clear(self.clear_flags, self.clear_color, 1.0)?;

        if let Some(channel) = self.debug_mode.gbuffer_channel() {
            if let Some(texture) = self.gbuffer.attachment(channel) {
                let material = self.debug_material.get_or_insert_with(|| Material::new("Hidden/GBufferDebug"));
                for mode in DebugDrawMode::ALL {
                    if let Some(keyword) = mode.keyword() {
                        material.set_keyword(keyword, mode == self.debug_mode);
                    }
                }
                material.set_texture("_MainTex", texture);
                device.blit(BlitSource::Texture(texture), destination, Some(&*material))?;
            }
        } else if let Some(key) = result {
            if let Some(texture) = pool.target(key)?.main_texture() {
                device.blit(BlitSource::Texture(texture), destination, None)?;
            }
        }

        if destination.is_some() {
            device.bind_framebuffer(None)?;
        }
        Ok(())
    }

    /// Abort path: leave nothing bound, nothing checked out, output cleared.
    /// Persistent history is invalidated and its eviction clock still advances.
    fn early_end(&mut self, frame: &mut FrameResources<'_>) {
        let _ = self.gbuffer.end(frame.device);

        if let Some(saved) = self.saved_rasterizer.take() {
            frame.device.set_rasterizer_state(saved);
        }

        for key in self.transient.drain(..) {
            if frame.pool.is_checked_out(key) {
                let _ = frame.pool.release(key);
            }
        }

        let destination = self.output.as_ref().map(|t| t.framebuffer());
        if frame.device.bind_framebuffer(destination).is_ok() {
            let _ = frame.device.clear(self.clear_flags | ClearFlags::COLOR, self.clear_color, 1.0);
            if destination.is_some() {
                let _ = frame.device.bind_framebuffer(None);
            }
        }

        self.history.invalidate_all();
        self.history.sweep(frame.device, frame.frame_index, frame.max_idle_frames);
        self.state = CameraState::Idle;
    }

    // ===== LIFECYCLE =====

    /// Enable rendering again after `disable`
    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Stop rendering and free the G-buffer and persistent targets.
    /// They are recreated lazily after `enable`.
    pub fn disable(&mut self, device: &mut dyn GraphicsDevice) {
        self.enabled = false;
        self.gbuffer.destroy(device);
        self.history.destroy_all(device);
        self.chain.reset();
        self.previous_view_projection = None;
    }

    /// Free every GPU resource the camera owns, output included
    pub fn destroy(&mut self, device: &mut dyn GraphicsDevice) {
        self.disable(device);
        if let Some(output) = self.output.take() {
            output.destroy(device);
        }
    }
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;
