//! Scene-side interfaces consumed by the pipeline

mod aabb;
mod scene_renderer;

pub use aabb::AABB;
pub use scene_renderer::{SceneRenderer, DirectionalLight, EmptyScene};
