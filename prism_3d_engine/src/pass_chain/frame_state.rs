/// FrameState - frame-global values passes may rewrite during `prepare`.
///
/// The chain calls every pass's `prepare` with the same `&mut FrameState`,
/// in registration order, before the camera captures geometry. A pass that
/// needs to change how geometry is drawn (TAA jitter) does it here; later
/// passes see the changes made by earlier ones.

use glam::{Mat4, Vec2};

#[derive(Debug, Clone, PartialEq)]
pub struct FrameState {
    pub frame_index: u64,
    /// Scaled render resolution
    pub width: u32,
    pub height: u32,
    /// World-to-view matrix
    pub view: Mat4,
    /// Unjittered projection
    pub projection: Mat4,
    /// Projection the geometry pass will draw with
    pub jittered_projection: Mat4,
    /// Sub-pixel offset baked into `jittered_projection`, in pixels
    pub jitter: Vec2,
    pub near: f32,
    pub far: f32,
}

impl FrameState {
    /// Fresh state with no jitter
    pub fn new(frame_index: u64, width: u32, height: u32, view: Mat4, projection: Mat4, near: f32, far: f32) -> Self {
        Self {
            frame_index,
            width,
            height,
            view,
            projection,
            jittered_projection: projection,
            jitter: Vec2::ZERO,
            near,
            far,
        }
    }
}
