/// Graphics device module - the graphics-API seam consumed by the pipeline

// Module declarations
pub mod graphics_device;
pub mod texture;
pub mod framebuffer;
pub mod command;
pub mod material;

// Re-export everything from graphics_device.rs
pub use graphics_device::*;

// Re-export from other modules
pub use texture::*;
pub use framebuffer::*;
pub use command::*;
pub use material::*;

// Mock graphics device for tests (no GPU required)
#[cfg(test)]
pub mod mock_graphics_device;
