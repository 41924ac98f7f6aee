//! Renderer module - multi-camera frame driver

mod config;
mod deferred_renderer;

pub use config::RendererConfig;
pub use deferred_renderer::{CameraKey, DeferredRenderer, FrameReport};
