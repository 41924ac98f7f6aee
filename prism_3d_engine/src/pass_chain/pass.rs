/// Pass - one step of the deferred chain, as a closed set of variants.
///
/// Protocol, driven by `PassChain`:
///
/// 1. `prepare(&mut FrameState)` on every pass, in chain order, before the
///    camera captures geometry. Only frame-global state is touched here.
/// 2. `render(ctx, input)` on every pass, in chain order. A pass takes
///    ownership of `input` and must either release it or return it.
///    Every target it acquires must be released or returned before it
///    returns. `None` in means `None` out.
///
/// `reset()` drops lazily-built materials and any cross-frame state, so a
/// rebuilt chain never trusts state derived for another configuration.

use crate::error::Result;
use crate::pass_chain::passes::*;
use crate::pass_chain::{FrameState, PassContext};
use crate::target::RenderTargetKey;

#[derive(Debug, Clone)]
pub enum Pass {
    Lighting(LightingPass),
    Combine(CombinePass),
    UnlitRecombine(UnlitRecombinePass),
    ProceduralSky(ProceduralSkyPass),
    ScreenSpaceReflection(ScreenSpaceReflectionPass),
    TemporalAntiAliasing(TemporalAntiAliasingPass),
    DepthOfField(DepthOfFieldPass),
    Bloom(BloomPass),
    Tonemap(TonemapPass),
}

impl Pass {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Pass::Lighting(_) => "Lighting",
            Pass::Combine(_) => "Combine",
            Pass::UnlitRecombine(_) => "UnlitRecombine",
            Pass::ProceduralSky(_) => "ProceduralSky",
            Pass::ScreenSpaceReflection(_) => "ScreenSpaceReflection",
            Pass::TemporalAntiAliasing(_) => "TemporalAntiAliasing",
            Pass::DepthOfField(_) => "DepthOfField",
            Pass::Bloom(_) => "Bloom",
            Pass::Tonemap(_) => "Tonemap",
        }
    }

    /// Phase one: adjust frame-global state before geometry capture
    pub fn prepare(&mut self, state: &mut FrameState) {
        match self {
            Pass::TemporalAntiAliasing(pass) => pass.prepare(state),
            Pass::Lighting(_)
            | Pass::Combine(_)
            | Pass::UnlitRecombine(_)
            | Pass::ProceduralSky(_)
            | Pass::ScreenSpaceReflection(_)
            | Pass::DepthOfField(_)
            | Pass::Bloom(_)
            | Pass::Tonemap(_) => {}
        }
    }

    /// Phase two: consume `input`, produce the next pass's input
    pub fn render(&mut self, ctx: &mut PassContext<'_>, input: Option<RenderTargetKey>) -> Result<Option<RenderTargetKey>> {
        match self {
            Pass::Lighting(pass) => pass.render(ctx, input),
            Pass::Combine(pass) => pass.render(ctx, input),
            Pass::UnlitRecombine(pass) => pass.render(ctx, input),
            Pass::ProceduralSky(pass) => pass.render(ctx, input),
            Pass::ScreenSpaceReflection(pass) => pass.render(ctx, input),
            Pass::TemporalAntiAliasing(pass) => pass.render(ctx, input),
            Pass::DepthOfField(pass) => pass.render(ctx, input),
            Pass::Bloom(pass) => pass.render(ctx, input),
            Pass::Tonemap(pass) => pass.render(ctx, input),
        }
    }

    pub fn reset(&mut self) {
        match self {
            Pass::Lighting(_) => {}
            Pass::Combine(pass) => pass.reset(),
            Pass::UnlitRecombine(pass) => pass.reset(),
            Pass::ProceduralSky(pass) => pass.reset(),
            Pass::ScreenSpaceReflection(pass) => pass.reset(),
            Pass::TemporalAntiAliasing(pass) => pass.reset(),
            Pass::DepthOfField(pass) => pass.reset(),
            Pass::Bloom(pass) => pass.reset(),
            Pass::Tonemap(pass) => pass.reset(),
        }
    }
}

impl From<LightingPass> for Pass {
    fn from(pass: LightingPass) -> Self { Pass::Lighting(pass) }
}

impl From<CombinePass> for Pass {
    fn from(pass: CombinePass) -> Self { Pass::Combine(pass) }
}

impl From<UnlitRecombinePass> for Pass {
    fn from(pass: UnlitRecombinePass) -> Self { Pass::UnlitRecombine(pass) }
}

impl From<ProceduralSkyPass> for Pass {
    fn from(pass: ProceduralSkyPass) -> Self { Pass::ProceduralSky(pass) }
}

impl From<ScreenSpaceReflectionPass> for Pass {
    fn from(pass: ScreenSpaceReflectionPass) -> Self { Pass::ScreenSpaceReflection(pass) }
}

impl From<TemporalAntiAliasingPass> for Pass {
    fn from(pass: TemporalAntiAliasingPass) -> Self { Pass::TemporalAntiAliasing(pass) }
}

impl From<DepthOfFieldPass> for Pass {
    fn from(pass: DepthOfFieldPass) -> Self { Pass::DepthOfField(pass) }
}

impl From<BloomPass> for Pass {
    fn from(pass: BloomPass) -> Self { Pass::Bloom(pass) }
}

impl From<TonemapPass> for Pass {
    fn from(pass: TonemapPass) -> Self { Pass::Tonemap(pass) }
}
