//! Render targets and their two caches.
//!
//! - `RenderTargetPool`: shared scratch targets, keyed by shape, fungible.
//! - `NamedTargetCache`: per-camera persistent targets, keyed by name.

mod render_target;
mod target_pool;
mod named_target_cache;

pub use render_target::{RenderTarget, TargetShape};
pub use target_pool::{RenderTargetKey, RenderTargetPool};
pub use named_target_cache::NamedTargetCache;
