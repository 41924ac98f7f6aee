//! Concrete passes of the deferred chain

mod lighting;
mod combine;
mod unlit_recombine;
mod procedural_sky;
mod screen_space_reflection;
mod temporal_anti_aliasing;
mod depth_of_field;
mod bloom;
mod tonemap;

pub use lighting::{LightingPass, LIGHT_BUFFER_FORMAT};
pub use combine::{CombinePass, SCENE_COLOR_FORMAT};
pub use unlit_recombine::UnlitRecombinePass;
pub use procedural_sky::{ProceduralSkyPass, SkySettings, DEFAULT_SUN_DIRECTION};
pub use screen_space_reflection::{ScreenSpaceReflectionPass, SsrSettings, SsrParams};
pub use temporal_anti_aliasing::{
    TemporalAntiAliasingPass, TaaSettings, TaaParams,
    jitter_sequence, JITTER_SEQUENCE_LENGTH, TAA_HISTORY,
};
pub use depth_of_field::{DepthOfFieldPass, DepthOfFieldSettings, DepthOfFieldParams};
pub use bloom::{BloomPass, BloomSettings, BloomParams};
pub use tonemap::{TonemapPass, TonemapSettings, TonemapOperator, LDR_FORMAT};

#[cfg(test)]
#[path = "passes_tests.rs"]
mod tests;
