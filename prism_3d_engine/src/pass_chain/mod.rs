//! Linear pass chain evaluated once per camera per frame

mod frame_state;
mod pass_context;
mod pass;
mod pass_chain;
pub mod passes;

#[cfg(test)]
pub(crate) mod test_harness;

pub use frame_state::FrameState;
pub use pass_context::PassContext;
pub use pass::Pass;
pub use pass_chain::PassChain;
