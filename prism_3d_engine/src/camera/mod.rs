//! Camera module - per-camera frame orchestration, projection, and culling

mod camera;
mod debug_view;
mod frustum;
mod projection;
mod render_context;

pub use camera::{
    Camera, CameraState, FrameResources, RenderOutcome, Ray,
    camera_render_order, scaled_size,
};
pub use debug_view::DebugDrawMode;
pub use frustum::{
    Frustum, FrustumTest,
    PLANE_LEFT, PLANE_RIGHT, PLANE_BOTTOM, PLANE_TOP, PLANE_NEAR, PLANE_FAR,
};
pub use projection::{Projection, apply_jitter, halton};
pub use render_context::RenderContext;
