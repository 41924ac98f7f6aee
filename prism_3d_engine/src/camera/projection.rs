/// Camera projection and sub-pixel jitter

use glam::{Mat4, Vec2, Vec3};
use crate::error::Result;
use crate::engine_bail;

/// Perspective or orthographic projection
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Vertical field of view in degrees, exclusive range (0, 180)
    Perspective { fov_y_degrees: f32 },
    /// Half of the vertical extent in world units
    Orthographic { size: f32 },
}

impl Default for Projection {
    fn default() -> Self {
        Projection::Perspective { fov_y_degrees: 60.0 }
    }
}

impl Projection {
    /// Reject parameters that produce a degenerate matrix
    pub fn validate(&self, near: f32, far: f32) -> Result<()> {
        match *self {
            Projection::Perspective { fov_y_degrees } => {
                if !(fov_y_degrees > 0.0 && fov_y_degrees < 180.0) {
                    engine_bail!(@InvalidConfiguration, "prism3d::Camera",
                        "Field of view must be in (0, 180) degrees, got {}", fov_y_degrees);
                }
                if !(near > 0.0) {
                    engine_bail!(@InvalidConfiguration, "prism3d::Camera",
                        "Perspective near plane must be > 0, got {}", near);
                }
            }
            Projection::Orthographic { size } => {
                if !(size > 0.0 && size.is_finite()) {
                    engine_bail!(@InvalidConfiguration, "prism3d::Camera",
                        "Orthographic size must be > 0, got {}", size);
                }
            }
        }
        if !(far > near && far.is_finite()) {
            engine_bail!(@InvalidConfiguration, "prism3d::Camera",
                "Far plane ({}) must be beyond near plane ({})", far, near);
        }
        Ok(())
    }

    /// Right-handed projection with a [0, 1] depth range
    pub fn matrix(&self, aspect: f32, near: f32, far: f32) -> Mat4 {
        match *self {
            Projection::Perspective { fov_y_degrees } => {
                Mat4::perspective_rh(fov_y_degrees.to_radians(), aspect, near, far)
            }
            Projection::Orthographic { size } => {
                let half_w = size * aspect;
                Mat4::orthographic_rh(-half_w, half_w, -size, size, near, far)
            }
        }
    }
}

/// Offset a projection by `jitter` pixels on a `width` x `height` target.
///
/// The offset is applied in clip space (scaled by w), so it shifts the image
/// by the same sub-pixel amount for perspective and orthographic matrices.
pub fn apply_jitter(projection: Mat4, jitter: Vec2, width: u32, height: u32) -> Mat4 {
    if jitter == Vec2::ZERO {
        return projection;
    }
    let ndc_offset = Vec3::new(
        jitter.x * 2.0 / width.max(1) as f32,
        jitter.y * 2.0 / height.max(1) as f32,
        0.0,
    );
    Mat4::from_translation(ndc_offset) * projection
}

/// Element `index` (1-based) of the Halton low-discrepancy sequence, in [0, 1)
pub fn halton(mut index: u32, base: u32) -> f32 {
    let mut fraction = 1.0_f32;
    let mut result = 0.0_f32;
    while index > 0 {
        fraction /= base as f32;
        result += fraction * (index % base) as f32;
        index /= base;
    }
    result
}

#[cfg(test)]
#[path = "projection_tests.rs"]
mod tests;
