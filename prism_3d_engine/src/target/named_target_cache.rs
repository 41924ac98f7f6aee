/// NamedTargetCache - per-camera persistent render targets keyed by name.
///
/// Holds targets whose CONTENT matters across frames (TAA history and the
/// like). Unlike the pool, entries are never handed to another user: each
/// camera owns its own cache, and a name always maps to the same target
/// until its shape changes or it goes unused for too long.

use rustc_hash::FxHashMap;
use crate::error::Result;
use crate::graphics_device::{GraphicsDevice, TextureFormat};
use crate::target::{RenderTarget, TargetShape};

#[derive(Debug)]
struct NamedEntry {
    target: RenderTarget,
    last_used: u64,
    /// Content is undefined (just created, or invalidated)
    fresh: bool,
}

/// Name-keyed cache of persistent render targets
#[derive(Debug, Default)]
pub struct NamedTargetCache {
    entries: FxHashMap<String, NamedEntry>,
}

impl NamedTargetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the target registered under `name`, creating it on first access.
    ///
    /// An existing entry with a different shape is destroyed and recreated.
    /// Returns the target and whether its content is new: created,
    /// recreated, or invalidated since the last access. The flag is reported
    /// once; the next access with the same shape returns `false`.
    pub fn get_or_create(
        &mut self,
        device: &mut dyn GraphicsDevice,
        name: &str,
        width: u32,
        height: u32,
        formats: &[TextureFormat],
        frame: u64,
    ) -> Result<(&RenderTarget, bool)> {
        let shape = TargetShape::new(width, height, formats);

        let reshape = matches!(self.entries.get(name), Some(entry) if *entry.target.shape() != shape);
        if reshape {
            if let Some(old) = self.entries.remove(name) {
                crate::engine_debug!("prism3d::NamedTargetCache",
                    "Recreating '{}' ({}x{} -> {}x{})",
                    name, old.target.width(), old.target.height(), width, height);
                old.target.destroy(device);
            }
        }

        if !self.entries.contains_key(name) {
            let target = RenderTarget::create(device, shape)?;
            crate::engine_debug!("prism3d::NamedTargetCache",
                "Created '{}' ({}x{})", name, width, height);
            self.entries.insert(name.to_string(), NamedEntry { target, last_used: frame, fresh: true });
        }

        match self.entries.get_mut(name) {
            Some(entry) => {
                entry.last_used = frame;
                let is_new = std::mem::replace(&mut entry.fresh, false);
                Ok((&entry.target, is_new))
            }
            None => crate::engine_bail!(@InvalidResource, "prism3d::NamedTargetCache",
                "Entry '{}' vanished after creation", name),
        }
    }

    /// Borrow a target without touching its last-used stamp
    pub fn get(&self, name: &str) -> Option<&RenderTarget> {
        self.entries.get(name).map(|e| &e.target)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Mark every entry's content as undefined (e.g., after a G-buffer resize)
    pub fn invalidate_all(&mut self) {
        for entry in self.entries.values_mut() {
            entry.fresh = true;
        }
    }

    /// Destroy one entry. Returns whether it existed.
    pub fn remove(&mut self, device: &mut dyn GraphicsDevice, name: &str) -> bool {
        match self.entries.remove(name) {
            Some(entry) => {
                entry.target.destroy(device);
                true
            }
            None => false,
        }
    }

    /// Destroy entries unused for more than `max_idle_frames`.
    ///
    /// Same boundary as the pool: an entry last used at frame F survives up
    /// to F + max_idle_frames. Returns the number destroyed.
    pub fn sweep(&mut self, device: &mut dyn GraphicsDevice, current_frame: u64, max_idle_frames: u64) -> usize {
        let expired: Vec<String> = self.entries
            .iter()
            .filter(|(_, e)| current_frame.saturating_sub(e.last_used) > max_idle_frames)
            .map(|(name, _)| name.clone())
            .collect();

        for name in &expired {
            if let Some(entry) = self.entries.remove(name) {
                crate::engine_debug!("prism3d::NamedTargetCache",
                    "Evicted '{}' (last used at frame {})", name, entry.last_used);
                entry.target.destroy(device);
            }
        }
        expired.len()
    }

    pub fn destroy_all(&mut self, device: &mut dyn GraphicsDevice) {
        for (_, entry) in self.entries.drain() {
            entry.target.destroy(device);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "named_target_cache_tests.rs"]
mod tests;
