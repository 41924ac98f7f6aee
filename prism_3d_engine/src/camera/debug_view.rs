/// Per-camera debug visualization modes

use crate::gbuffer::GBufferAttachment;

/// What a camera presents instead of (or on top of) the lit image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DebugDrawMode {
    /// Normal rendering
    #[default]
    Off,
    /// Geometry drawn as triangle edges, chain runs normally
    Wireframe,
    Albedo,
    Normal,
    Position,
    Emission,
    Velocity,
    ObjectId,
    Depth,
}

impl DebugDrawMode {
    pub const ALL: [DebugDrawMode; 9] = [
        DebugDrawMode::Off,
        DebugDrawMode::Wireframe,
        DebugDrawMode::Albedo,
        DebugDrawMode::Normal,
        DebugDrawMode::Position,
        DebugDrawMode::Emission,
        DebugDrawMode::Velocity,
        DebugDrawMode::ObjectId,
        DebugDrawMode::Depth,
    ];

    /// Next mode in hotkey order, wrapping back to `Off`
    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|&m| m == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    /// G-buffer channel shown raw by this mode, if any
    ///
    /// Channel modes bypass the pass chain entirely.
    pub fn gbuffer_channel(self) -> Option<GBufferAttachment> {
        match self {
            DebugDrawMode::Albedo => Some(GBufferAttachment::AlbedoAo),
            DebugDrawMode::Normal => Some(GBufferAttachment::NormalMetallic),
            DebugDrawMode::Position => Some(GBufferAttachment::PositionRoughness),
            DebugDrawMode::Emission => Some(GBufferAttachment::Emission),
            DebugDrawMode::Velocity => Some(GBufferAttachment::Velocity),
            DebugDrawMode::ObjectId => Some(GBufferAttachment::ObjectId),
            DebugDrawMode::Depth => Some(GBufferAttachment::Depth),
            DebugDrawMode::Off | DebugDrawMode::Wireframe => None,
        }
    }

    /// Shader keyword selecting the visualization variant
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            DebugDrawMode::Albedo => Some("DEBUG_ALBEDO"),
            DebugDrawMode::Normal => Some("DEBUG_NORMAL"),
            DebugDrawMode::Position => Some("DEBUG_POSITION"),
            DebugDrawMode::Emission => Some("DEBUG_EMISSION"),
            DebugDrawMode::Velocity => Some("DEBUG_VELOCITY"),
            DebugDrawMode::ObjectId => Some("DEBUG_OBJECT_ID"),
            DebugDrawMode::Depth => Some("DEBUG_DEPTH"),
            DebugDrawMode::Off | DebugDrawMode::Wireframe => None,
        }
    }
}
