/// Pass-level material: shader name, variant keywords, and named parameters.
///
/// This is the seam to the shader/material collaborator. The pipeline only
/// describes WHAT a full-screen kernel samples and which variant it wants;
/// compilation and uniform upload belong to the graphics device.
///
/// Keyword changes select a different shader variant. The device's uniform
/// location cache is keyed by `variant_generation()`, so every effective
/// toggle invalidates it. Callers are expected to avoid redundant toggles.

use rustc_hash::{FxHashMap, FxHashSet};
use glam::{Mat4, Vec2, Vec3, Vec4};
use crate::graphics_device::TextureId;

/// A typed parameter value for the material
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat4(Mat4),
    Texture(TextureId),
    /// Raw std140-compatible uniform block
    Block(Vec<u8>),
}

/// Material used by full-screen blits
#[derive(Debug, Clone)]
pub struct Material {
    shader: String,
    keywords: FxHashSet<String>,
    params: FxHashMap<String, ParamValue>,
    keyword_toggles: u64,
    variant_generation: u64,
}

impl Material {
    /// Create a material for the named shader with no keywords or parameters
    pub fn new(shader: &str) -> Self {
        Self {
            shader: shader.to_string(),
            keywords: FxHashSet::default(),
            params: FxHashMap::default(),
            keyword_toggles: 0,
            variant_generation: 0,
        }
    }

    /// Shader name
    pub fn shader(&self) -> &str {
        &self.shader
    }

    // ===== KEYWORDS =====

    /// Enable or disable a variant keyword.
    ///
    /// Returns `true` if the keyword state actually changed. Only effective
    /// changes count as toggles and invalidate the variant's uniform cache.
    pub fn set_keyword(&mut self, keyword: &str, enabled: bool) -> bool {
        let changed = if enabled {
            self.keywords.insert(keyword.to_string())
        } else {
            self.keywords.remove(keyword)
        };

        if changed {
            self.keyword_toggles += 1;
            self.variant_generation += 1;
        }
        changed
    }

    /// Whether a keyword is enabled
    pub fn has_keyword(&self, keyword: &str) -> bool {
        self.keywords.contains(keyword)
    }

    /// Enabled keywords, sorted (stable variant key)
    pub fn keywords(&self) -> Vec<&str> {
        let mut keywords: Vec<&str> = self.keywords.iter().map(|k| k.as_str()).collect();
        keywords.sort_unstable();
        keywords
    }

    /// Number of effective keyword toggles since creation
    pub fn keyword_toggle_count(&self) -> u64 {
        self.keyword_toggles
    }

    /// Bumped on every effective keyword toggle
    pub fn variant_generation(&self) -> u64 {
        self.variant_generation
    }

    // ===== PARAMETERS =====

    pub fn set_float(&mut self, name: &str, value: f32) {
        self.set_param(name, ParamValue::Float(value));
    }

    pub fn set_vec2(&mut self, name: &str, value: Vec2) {
        self.set_param(name, ParamValue::Vec2(value));
    }

    pub fn set_vec3(&mut self, name: &str, value: Vec3) {
        self.set_param(name, ParamValue::Vec3(value));
    }

    pub fn set_vec4(&mut self, name: &str, value: Vec4) {
        self.set_param(name, ParamValue::Vec4(value));
    }

    pub fn set_mat4(&mut self, name: &str, value: Mat4) {
        self.set_param(name, ParamValue::Mat4(value));
    }

    pub fn set_texture(&mut self, name: &str, texture: TextureId) {
        self.set_param(name, ParamValue::Texture(texture));
    }

    /// Store a plain-old-data uniform block by value
    pub fn set_block<T: bytemuck::Pod>(&mut self, name: &str, block: &T) {
        self.set_param(name, ParamValue::Block(bytemuck::bytes_of(block).to_vec()));
    }

    /// Get a parameter by name
    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }

    /// Get a float parameter by name
    pub fn float(&self, name: &str) -> Option<f32> {
        match self.params.get(name) {
            Some(ParamValue::Float(v)) => Some(*v),
            _ => None,
        }
    }

    /// Get a texture parameter by name
    pub fn texture(&self, name: &str) -> Option<TextureId> {
        match self.params.get(name) {
            Some(ParamValue::Texture(t)) => Some(*t),
            _ => None,
        }
    }

    /// Read back a uniform block stored with `set_block`
    pub fn block<T: bytemuck::Pod>(&self, name: &str) -> Option<T> {
        match self.params.get(name) {
            Some(ParamValue::Block(bytes)) if bytes.len() == std::mem::size_of::<T>() => {
                Some(bytemuck::pod_read_unaligned(bytes))
            }
            _ => None,
        }
    }

    /// Number of parameters
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    fn set_param(&mut self, name: &str, value: ParamValue) {
        self.params.insert(name.to_string(), value);
    }
}

#[cfg(test)]
#[path = "material_tests.rs"]
mod tests;
