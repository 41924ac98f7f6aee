//! Integration tests for the deferred pipeline through the public API
//!
//! Drives `DeferredRenderer` with a test-local `GraphicsDevice` that only
//! counts what it is asked to do, so no GPU is required.

use std::sync::{Arc, Mutex};
use prism_3d_engine::glam::Vec3;
use prism_3d_engine::prism3d::camera::{Camera, RenderContext, RenderOutcome};
use prism_3d_engine::prism3d::log::{LogEntry, LogSeverity, Logger};
use prism_3d_engine::prism3d::pass_chain::{CombinePass, LightingPass, PassChain, TonemapPass};
use prism_3d_engine::prism3d::render::{
    BlitSource, ClearFlags, Framebuffer, FramebufferDesc, FramebufferId, GraphicsDevice, Material,
    RasterizerState, TextureFormat, TextureId, Viewport,
};
use prism_3d_engine::prism3d::renderer::{DeferredRenderer, RendererConfig};
use prism_3d_engine::prism3d::scene::{DirectionalLight, SceneRenderer};
use prism_3d_engine::prism3d::target::{GeometryBuffer, RenderTarget, TargetShape};
use prism_3d_engine::prism3d::{Engine, Error, Result};
use serial_test::serial;
use winit::dpi::PhysicalSize;

// ============================================================================
// TEST DEVICE
// ============================================================================

#[derive(Default)]
struct CountingDevice {
    next_id: u64,
    live: Vec<FramebufferId>,
    /// Destination of every blit (`None` = screen) and its shader
    blits: Vec<(Option<FramebufferId>, Option<String>)>,
    /// Allocations left before reporting out-of-memory
    budget: Option<usize>,
    rasterizer: RasterizerState,
}

impl CountingDevice {
    fn id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl GraphicsDevice for CountingDevice {
    fn create_framebuffer(&mut self, desc: &FramebufferDesc) -> Result<Framebuffer> {
        if let Some(budget) = self.budget.as_mut() {
            if *budget == 0 {
                return Err(Error::OutOfMemory);
            }
            *budget -= 1;
        }
        let id = FramebufferId(self.id());
        let color_attachments = desc.color_formats.iter().map(|_| TextureId(self.id())).collect();
        let depth_attachment = desc.depth_format.map(|_| TextureId(self.id()));
        self.live.push(id);
        Ok(Framebuffer { id, color_attachments, depth_attachment, width: desc.width, height: desc.height })
    }

    fn destroy_framebuffer(&mut self, framebuffer: &Framebuffer) {
        self.live.retain(|&id| id != framebuffer.id);
    }

    fn bind_framebuffer(&mut self, _framebuffer: Option<&Framebuffer>) -> Result<()> {
        Ok(())
    }

    fn clear(&mut self, _flags: ClearFlags, _color: [f32; 4], _depth: f32) -> Result<()> {
        Ok(())
    }

    fn blit(&mut self, _source: BlitSource, destination: Option<&Framebuffer>, material: Option<&Material>) -> Result<()> {
        self.blits.push((destination.map(|f| f.id), material.map(|m| m.shader().to_string())));
        Ok(())
    }

    fn set_viewport(&mut self, _viewport: Viewport) {}

    fn rasterizer_state(&self) -> RasterizerState {
        self.rasterizer
    }

    fn set_rasterizer_state(&mut self, state: RasterizerState) {
        self.rasterizer = state;
    }

    fn window_framebuffer_size(&self) -> PhysicalSize<u32> {
        PhysicalSize::new(1280, 720)
    }
}

/// Scene recording which camera each geometry callback was for
#[derive(Default)]
struct NamedScene {
    cameras: Vec<String>,
}

impl SceneRenderer for NamedScene {
    fn render_geometry(&mut self, context: &RenderContext, _device: &mut dyn GraphicsDevice) -> Result<()> {
        self.cameras.push(context.camera_name.clone());
        Ok(())
    }

    fn render_geometry_depth(&mut self, _context: &RenderContext, _device: &mut dyn GraphicsDevice) -> Result<()> {
        Ok(())
    }

    fn render_lighting(&mut self, _context: &RenderContext, _gbuffer: &GeometryBuffer, _device: &mut dyn GraphicsDevice) -> Result<()> {
        Ok(())
    }

    fn find_directional_light(&self) -> Option<DirectionalLight> {
        Some(DirectionalLight::new(Vec3::NEG_Y, Vec3::ONE, 3.0))
    }
}

fn setup() -> (DeferredRenderer, Arc<Mutex<CountingDevice>>) {
    let device = Arc::new(Mutex::new(CountingDevice::default()));
    let shared: Arc<Mutex<dyn GraphicsDevice>> = device.clone();
    (DeferredRenderer::new(shared, RendererConfig::default()), device)
}

// ============================================================================
// PIPELINE TESTS
// ============================================================================

#[test]
fn test_integration_two_cameras_over_several_frames() {
    let (mut renderer, device) = setup();

    let minimap_output = {
        let mut device = device.lock().unwrap();
        RenderTarget::create(&mut *device, TargetShape::new(256, 256, &[TextureFormat::Rgba8])).unwrap()
    };
    let minimap_id = minimap_output.framebuffer().id;
    let mut minimap = Camera::new("minimap");
    minimap.set_output(Some(minimap_output));
    minimap.set_resolution_scale(0.5);

    let mut main = Camera::new("main");
    main.set_priority(1);
    main.set_position(Vec3::new(0.0, 2.0, 8.0));

    let main_key = renderer.add_camera(main);
    let minimap_key = renderer.add_camera(minimap);

    let mut scene = NamedScene::default();
    for _ in 0..5 {
        let report = renderer.render_frame(&mut scene).unwrap();
        assert_eq!(report.rendered_count(), 2);
        assert_eq!(report.outcomes[0].0, minimap_key);
        assert_eq!(report.outcomes[1].0, main_key);
        assert_eq!(renderer.pool().checked_out_count(), 0);
    }

    assert_eq!(scene.cameras.len(), 10);
    assert_eq!(&scene.cameras[..2], &["minimap".to_string(), "main".to_string()]);
    assert_eq!(renderer.camera(minimap_key).unwrap().gbuffer().size(), Some((128, 128)));
    assert_eq!(renderer.camera(main_key).unwrap().gbuffer().size(), Some((1280, 720)));

    {
        let device = device.lock().unwrap();
        // Higher priority renders last, straight to the screen
        assert_eq!(device.blits.last(), Some(&(None, None)));
        assert!(device.blits.iter().any(|(dest, shader)| *dest == Some(minimap_id) && shader.is_none()));
    }

    renderer.shutdown().unwrap();
    assert!(device.lock().unwrap().live.is_empty());
}

#[test]
fn test_integration_custom_pass_chain() {
    let (mut renderer, device) = setup();
    let mut camera = Camera::new("main");
    camera.set_pass_chain(
        PassChain::new()
            .with(LightingPass::new())
            .with(CombinePass::new())
            .with(TonemapPass::default()),
    );
    renderer.add_camera(camera);

    let report = renderer.render_frame(&mut NamedScene::default()).unwrap();

    assert_eq!(report.rendered_count(), 1);
    let device = device.lock().unwrap();
    let shaders: Vec<&str> = device.blits.iter().filter_map(|(_, s)| s.as_deref()).collect();
    assert_eq!(shaders, vec!["Hidden/DeferredCombine", "Hidden/Tonemap"]);
}

#[test]
fn test_integration_window_resize_reallocates() {
    let (mut renderer, _device) = setup();
    let key = renderer.create_camera("main");

    renderer.render_frame(&mut NamedScene::default()).unwrap();
    let outcome = renderer.render_camera(key, &mut NamedScene::default(), Some(640), Some(480)).unwrap();

    assert_eq!(outcome, RenderOutcome::Rendered { width: 640, height: 480 });
    assert_eq!(renderer.camera(key).unwrap().gbuffer().allocation_count(), 2);
}

// ============================================================================
// FAILURE AND LOGGING
// ============================================================================

struct WarningCapture(Arc<Mutex<Vec<String>>>);

impl Logger for WarningCapture {
    fn log(&self, entry: &LogEntry) {
        if entry.severity == LogSeverity::Warn && entry.source == "prism3d::Camera" {
            self.0.lock().unwrap().push(entry.message.clone());
        }
    }
}

#[test]
#[serial]
fn test_integration_out_of_memory_aborts_frame_and_warns() {
    let warnings = Arc::new(Mutex::new(Vec::new()));
    Engine::set_logger(WarningCapture(Arc::clone(&warnings)));

    let (mut renderer, device) = setup();
    renderer.create_camera("main");
    device.lock().unwrap().budget = Some(0);

    let report = renderer.render_frame(&mut NamedScene::default()).unwrap();
    Engine::reset_logger();

    assert_eq!(report.rendered_count(), 0);
    assert!(matches!(report.outcomes[0].1, RenderOutcome::Aborted(Error::OutOfMemory)));
    assert_eq!(renderer.pool().checked_out_count(), 0);
    assert_eq!(warnings.lock().unwrap().len(), 1);

    // Memory comes back: the next frame renders
    device.lock().unwrap().budget = None;
    let report = renderer.render_frame(&mut NamedScene::default()).unwrap();
    assert_eq!(report.rendered_count(), 1);
}
