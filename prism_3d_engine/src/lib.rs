/*!
# Prism 3D Engine

Camera-driven deferred rendering pipeline.

Each camera fills a seven-attachment geometry buffer, runs a linear chain of
screen-space passes over it, and composites the result to the screen or to
its own output target. Scratch targets come from a shape-keyed pool shared by
every camera of a renderer and are evicted after a number of idle frames.

## Architecture

- **GraphicsDevice**: the graphics-API seam (framebuffers, clears, blits, viewport)
- **RenderTargetPool**: transient targets, recycled by shape
- **NamedTargetCache**: per-camera persistent targets (TAA history)
- **GeometryBuffer**: fixed-layout deferred scratchpad
- **PassChain**: two-phase (prepare, render) evaluation of the passes
- **Camera**: per-frame orchestration with an early-end abort path
- **DeferredRenderer**: frame counter, camera ordering, pool sweep

The scene stays outside: it implements `SceneRenderer` and receives the
`RenderContext` of the camera being rendered in every callback.
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod graphics_device;
pub mod target;
pub mod gbuffer;
pub mod camera;
pub mod scene;
pub mod pass_chain;
pub mod renderer;

// Main prism3d namespace module
pub mod prism3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine singleton
    pub use crate::engine::Engine;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Graphics-API seam
    pub mod render {
        pub use crate::graphics_device::*;
    }

    pub mod target {
        pub use crate::target::*;
        pub use crate::gbuffer::*;
    }

    pub mod camera {
        pub use crate::camera::*;
    }

    pub mod pass_chain {
        pub use crate::pass_chain::*;
        pub use crate::pass_chain::passes::*;
    }

    pub mod scene {
        pub use crate::scene::*;
    }

    pub mod renderer {
        pub use crate::renderer::*;
    }
}

// Re-export math library at crate root
pub use glam;
