/// RenderContext - immutable snapshot of the camera being rendered.
///
/// Built once per camera per frame after the pass chain's prepare phase (so
/// it already carries the TAA-jittered projection) and handed by reference
/// to every scene callback and pass. This is how nested draw code learns
/// which camera it is rendering for.

use glam::{Mat4, Vec2, Vec3};
use crate::camera::{DebugDrawMode, Frustum};
use crate::pass_chain::FrameState;

#[derive(Debug, Clone, PartialEq)]
pub struct RenderContext {
    /// Name of the camera being rendered
    pub camera_name: String,
    /// Monotonic frame counter
    pub frame_index: u64,
    /// Scaled render resolution (G-buffer size)
    pub width: u32,
    pub height: u32,
    /// View matrix used for drawing. With camera-relative rendering the
    /// translation is removed and geometry must be offset by `world_offset()`.
    pub view: Mat4,
    /// Projection used for drawing (jittered when TAA is active)
    pub projection: Mat4,
    /// Projection without jitter
    pub unjittered_projection: Mat4,
    /// Unjittered world-space view-projection of the previous frame, if any
    pub previous_view_projection: Option<Mat4>,
    /// Camera position in world space
    pub camera_position: Vec3,
    pub near: f32,
    pub far: f32,
    /// Sub-pixel jitter applied this frame, in pixels
    pub jitter: Vec2,
    pub camera_relative: bool,
    pub debug_mode: DebugDrawMode,
}

impl RenderContext {
    /// Snapshot a prepared frame state.
    ///
    /// `world_view` is the full world-to-view matrix; it is stripped of its
    /// translation when `camera_relative` is set.
    pub fn from_frame_state(
        camera_name: &str,
        state: &FrameState,
        camera_position: Vec3,
        camera_relative: bool,
        previous_view_projection: Option<Mat4>,
        debug_mode: DebugDrawMode,
    ) -> Self {
        let view = if camera_relative {
            let mut rotation_only = state.view;
            rotation_only.w_axis = glam::Vec4::W;
            rotation_only
        } else {
            state.view
        };

        Self {
            camera_name: camera_name.to_string(),
            frame_index: state.frame_index,
            width: state.width,
            height: state.height,
            view,
            projection: state.jittered_projection,
            unjittered_projection: state.projection,
            previous_view_projection,
            camera_position,
            near: state.near,
            far: state.far,
            jitter: state.jitter,
            camera_relative,
            debug_mode,
        }
    }

    /// Jittered view-projection, as used for drawing
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    /// Unjittered world-space view-projection (history reprojection, culling)
    pub fn world_view_projection(&self) -> Mat4 {
        self.unjittered_projection * self.world_view()
    }

    /// World-to-view matrix regardless of camera-relative mode
    pub fn world_view(&self) -> Mat4 {
        if self.camera_relative {
            self.view * Mat4::from_translation(-self.camera_position)
        } else {
            self.view
        }
    }

    /// Translation to apply to world positions before `view`
    pub fn world_offset(&self) -> Vec3 {
        if self.camera_relative { -self.camera_position } else { Vec3::ZERO }
    }

    /// World-space culling volume for this frame
    pub fn frustum(&self) -> Frustum {
        Frustum::from_view_projection(&self.world_view_projection())
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}
