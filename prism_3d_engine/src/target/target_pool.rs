/// RenderTargetPool - shape-keyed recycling of transient render targets.
///
/// Passes borrow scratch targets for the duration of one evaluation and hand
/// them back. Released targets stay allocated and are reused by the next
/// request with an identical shape (width, height, ordered format list).
///
/// ```text
/// acquire(shape) ──► idle[shape].pop()  ──hit──►  CheckedOut
///                          │ miss
///                          └──► RenderTarget::create()
/// release(key)   ──► Idle { last_used: frame } ──► idle[shape].push()
/// sweep(frame)   ──► destroy Idle entries with frame - last_used > max_idle
/// ```
///
/// Handles are slot map keys: stable while the target lives, and never
/// reused for a different target after it is destroyed.
///
/// The pool is driven from the single render thread only; it holds no lock.

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use crate::error::Result;
use crate::graphics_device::{GraphicsDevice, TextureFormat};
use crate::target::{RenderTarget, TargetShape};
use crate::engine_bail;

new_key_type! {
    /// Stable handle to a pooled render target
    pub struct RenderTargetKey;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotState {
    /// Available for reuse, released at `last_used`
    Idle { last_used: u64 },
    /// Owned by a caller; never destroyed by a sweep
    CheckedOut,
}

#[derive(Debug)]
struct PoolSlot {
    target: RenderTarget,
    state: SlotState,
}

/// Shape-keyed pool of transient render targets
#[derive(Debug, Default)]
pub struct RenderTargetPool {
    slots: SlotMap<RenderTargetKey, PoolSlot>,
    /// Idle handles per shape, most recently released last
    idle: FxHashMap<TargetShape, Vec<RenderTargetKey>>,
    current_frame: u64,
    last_sweep_frame: Option<u64>,
    allocations: u64,
}

impl RenderTargetPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the frame stamp used by subsequent releases
    pub fn begin_frame(&mut self, frame: u64) {
        self.current_frame = frame;
    }

    pub fn current_frame(&self) -> u64 {
        self.current_frame
    }

    // ===== ACQUIRE / RELEASE =====

    /// Check out a target with exactly this shape.
    ///
    /// Pops the most recently released idle target if one matches, otherwise
    /// allocates a new one.
    ///
    /// # Errors
    ///
    /// Invalid shapes are rejected; allocation failures propagate unchanged
    /// and leave the pool untouched.
    pub fn acquire(
        &mut self,
        device: &mut dyn GraphicsDevice,
        width: u32,
        height: u32,
        formats: &[TextureFormat],
    ) -> Result<RenderTargetKey> {
        let shape = TargetShape::new(width, height, formats);

        if let Some(key) = self.idle.get_mut(&shape).and_then(|bucket| bucket.pop()) {
            if let Some(slot) = self.slots.get_mut(key) {
                slot.state = SlotState::CheckedOut;
                crate::engine_trace!("prism3d::RenderTargetPool",
                    "Reused {}x{} target {:?}", width, height, key);
                return Ok(key);
            }
        }

        let target = RenderTarget::create(device, shape)?;
        self.allocations += 1;
        let key = self.slots.insert(PoolSlot { target, state: SlotState::CheckedOut });

        crate::engine_debug!("prism3d::RenderTargetPool",
            "Allocated {}x{} target {:?} ({} formats, {} pooled)",
            width, height, key, formats.len(), self.slots.len());

        Ok(key)
    }

    /// Return a checked-out target to the idle list, stamped with the
    /// current frame. The caller must not use the handle afterwards.
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` if the handle is unknown to this pool or already idle.
    /// The pool is left unchanged.
    pub fn release(&mut self, key: RenderTargetKey) -> Result<()> {
        let frame = self.current_frame;
        let Some(slot) = self.slots.get_mut(key) else {
            engine_bail!(@ShapeMismatch, "prism3d::RenderTargetPool",
                "Release of {:?}, which this pool never handed out", key);
        };

        if slot.state != SlotState::CheckedOut {
            engine_bail!(@ShapeMismatch, "prism3d::RenderTargetPool",
                "Release of {:?}, which is not checked out", key);
        }

        slot.state = SlotState::Idle { last_used: frame };
        self.idle.entry(slot.target.shape().clone()).or_default().push(key);

        crate::engine_trace!("prism3d::RenderTargetPool", "Released {:?} at frame {}", key, frame);
        Ok(())
    }

    // ===== EVICTION =====

    /// Destroy idle targets unused for more than `max_idle_frames`.
    ///
    /// A target released at frame F survives every sweep up to and including
    /// F + max_idle_frames. Runs at most once per frame: repeated calls with
    /// the same `current_frame` return 0. Checked-out targets are never
    /// touched.
    ///
    /// Returns the number of destroyed targets.
    pub fn sweep(
        &mut self,
        device: &mut dyn GraphicsDevice,
        current_frame: u64,
        max_idle_frames: u64,
    ) -> usize {
        if self.last_sweep_frame == Some(current_frame) {
            return 0;
        }
        self.last_sweep_frame = Some(current_frame);

        let slots = &self.slots;
        let mut expired = Vec::new();
        for bucket in self.idle.values_mut() {
            bucket.retain(|&key| {
                let stale = matches!(
                    slots.get(key).map(|s| s.state),
                    Some(SlotState::Idle { last_used }) if current_frame.saturating_sub(last_used) > max_idle_frames
                );
                if stale {
                    expired.push(key);
                }
                !stale
            });
        }
        self.idle.retain(|_, bucket| !bucket.is_empty());

        for &key in &expired {
            if let Some(slot) = self.slots.remove(key) {
                slot.target.destroy(device);
            }
        }

        if !expired.is_empty() {
            crate::engine_debug!("prism3d::RenderTargetPool",
                "Evicted {} idle targets at frame {} ({} remain)",
                expired.len(), current_frame, self.slots.len());
        }
        expired.len()
    }

    /// Destroy every target, checked out or not
    pub fn destroy_all(&mut self, device: &mut dyn GraphicsDevice) {
        let outstanding = self.checked_out_count();
        if outstanding > 0 {
            crate::engine_warn!("prism3d::RenderTargetPool",
                "Destroying pool with {} targets still checked out", outstanding);
        }
        for (_, slot) in self.slots.drain() {
            slot.target.destroy(device);
        }
        self.idle.clear();
    }

    // ===== QUERIES =====

    /// Borrow a pooled target
    ///
    /// # Errors
    ///
    /// `InvalidResource` if the handle is stale.
    pub fn target(&self, key: RenderTargetKey) -> Result<&RenderTarget> {
        match self.slots.get(key) {
            Some(slot) => Ok(&slot.target),
            None => engine_bail!(@InvalidResource, "prism3d::RenderTargetPool",
                "Stale render target handle {:?}", key),
        }
    }

    pub fn is_checked_out(&self, key: RenderTargetKey) -> bool {
        matches!(self.slots.get(key), Some(PoolSlot { state: SlotState::CheckedOut, .. }))
    }

    /// Whether the handle refers to a live (idle or checked-out) target
    pub fn contains(&self, key: RenderTargetKey) -> bool {
        self.slots.contains_key(key)
    }

    pub fn idle_count(&self) -> usize {
        self.idle.values().map(Vec::len).sum()
    }

    pub fn checked_out_count(&self) -> usize {
        self.slots.values().filter(|s| s.state == SlotState::CheckedOut).count()
    }

    /// Number of live targets
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Total allocations made over the pool's lifetime
    pub fn allocation_count(&self) -> u64 {
        self.allocations
    }
}

#[cfg(test)]
#[path = "target_pool_tests.rs"]
mod tests;
