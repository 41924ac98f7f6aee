/// Renderer-wide configuration

use winit::keyboard::KeyCode;

#[derive(Debug, Clone, PartialEq)]
pub struct RendererConfig {
    /// Idle frames a pooled or persistent target survives before eviction
    pub max_idle_frames: u64,
    /// Key cycling every camera's debug view
    pub debug_hotkey: KeyCode,
    /// Clear color given to cameras created through the renderer
    pub clear_color: [f32; 4],
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            max_idle_frames: 10,
            debug_hotkey: KeyCode::F3,
            clear_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}
