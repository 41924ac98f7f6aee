/// PassChain - an ordered, linear sequence of passes.
///
/// Two-phase evaluation, in registration order:
///
/// ```text
/// prepare:   P0.prepare(state) → P1.prepare(state) → ... → Pn.prepare(state)
///            (camera captures geometry with the prepared projection)
/// evaluate:  input → P0.render → P1.render → ... → Pn.render → result
/// ```
///
/// Every `prepare` completes before the first `render`. A later pass's
/// `prepare` sees what earlier ones wrote to the frame state. A `None` result
/// still flows through the remaining passes, which return `None` in turn.

use crate::error::Result;
use crate::pass_chain::passes::*;
use crate::pass_chain::{FrameState, Pass, PassContext};
use crate::target::RenderTargetKey;

#[derive(Debug, Clone, Default)]
pub struct PassChain {
    passes: Vec<Pass>,
    /// Frame whose prepare phase has run
    prepared_frame: Option<u64>,
}

impl PassChain {
    /// Empty chain (evaluates to its input)
    pub fn new() -> Self {
        Self::default()
    }

    /// Full deferred chain: lighting, combine, unlit recombine, sky, SSR,
    /// TAA, depth of field, bloom, tonemap
    pub fn standard() -> Self {
        Self::new()
            .with(LightingPass::new())
            .with(CombinePass::new())
            .with(UnlitRecombinePass::new())
            .with(ProceduralSkyPass::default())
            .with(ScreenSpaceReflectionPass::default())
            .with(TemporalAntiAliasingPass::default())
            .with(DepthOfFieldPass::default())
            .with(BloomPass::default())
            .with(TonemapPass::default())
    }

    /// Builder-style `add`
    pub fn with(mut self, pass: impl Into<Pass>) -> Self {
        self.add(pass);
        self
    }

    /// Append a pass at the end of the chain
    pub fn add(&mut self, pass: impl Into<Pass>) {
        self.passes.push(pass.into());
        self.prepared_frame = None;
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    pub fn passes(&self) -> &[Pass] {
        &self.passes
    }

    pub fn passes_mut(&mut self) -> &mut [Pass] {
        &mut self.passes
    }

    /// Pass names in chain order
    pub fn names(&self) -> Vec<&'static str> {
        self.passes.iter().map(Pass::name).collect()
    }

    /// Phase one: every pass's `prepare`, in order
    pub fn prepare(&mut self, state: &mut FrameState) {
        for pass in &mut self.passes {
            pass.prepare(state);
        }
        self.prepared_frame = Some(state.frame_index);
    }

    /// Whether `prepare` already ran for this frame
    pub fn is_prepared_for(&self, frame_index: u64) -> bool {
        self.prepared_frame == Some(frame_index)
    }

    /// Phase two: thread `input` through every pass.
    ///
    /// Runs the prepare phase first if the caller has not done so for this
    /// frame (the jitter then only affects passes, not geometry).
    ///
    /// # Errors
    ///
    /// The first pass error aborts the evaluation. Targets still checked out
    /// through `ctx` are the caller's to release.
    pub fn evaluate(&mut self, ctx: &mut PassContext<'_>, input: Option<RenderTargetKey>) -> Result<Option<RenderTargetKey>> {
        if !self.is_prepared_for(ctx.frame_index()) {
            let render = ctx.render;
            let mut state = FrameState::new(
                render.frame_index, render.width, render.height,
                render.world_view(), render.unjittered_projection, render.near, render.far,
            );
            self.prepare(&mut state);
        }

        let mut current = input;
        for pass in &mut self.passes {
            let had_input = current.is_some();
            current = pass.render(ctx, current)?;
            if had_input && current.is_none() {
                crate::engine_trace!("prism3d::PassChain",
                    "{} produced no output, chain short-circuits", pass.name());
            }
        }
        Ok(current)
    }

    /// Drop every pass's materials and cross-frame state
    pub fn reset(&mut self) {
        for pass in &mut self.passes {
            pass.reset();
        }
        self.prepared_frame = None;
    }
}

#[cfg(test)]
#[path = "pass_chain_tests.rs"]
mod tests;
