//! Geometry buffer for deferred shading

mod geometry_buffer;

pub use geometry_buffer::{GeometryBuffer, GBufferAttachment, GBUFFER_LAYOUT};
