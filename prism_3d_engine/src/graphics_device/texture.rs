/// Texture handles and attachment formats

/// Opaque handle to a GPU texture owned by the graphics device.
///
/// Handles are only meaningful to the device that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u64);

/// Attachment format (semantic, not API-specific)
///
/// The backend maps each variant to its native internal format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum TextureFormat {
    // 8-bit unsigned normalized
    R8,
    Rg8,
    Rgb8,
    Rgba8,

    // 16-bit float
    R16F,
    Rg16F,
    Rgb16F,
    Rgba16F,

    // 32-bit float
    R32F,
    Rg32F,
    Rgb32F,
    Rgba32F,

    // 32-bit signed integer
    R32I,
    Rg32I,
    Rgba32I,

    // Depth
    Depth24,
    Depth32F,
}

impl TextureFormat {
    /// Whether this format is a depth attachment
    pub fn is_depth(&self) -> bool {
        matches!(self, TextureFormat::Depth24 | TextureFormat::Depth32F)
    }

    /// Whether this format stores integers (not filterable)
    pub fn is_integer(&self) -> bool {
        matches!(self, TextureFormat::R32I | TextureFormat::Rg32I | TextureFormat::Rgba32I)
    }

    /// Number of channels (depth formats count as one)
    pub fn channel_count(&self) -> u32 {
        match self {
            TextureFormat::R8
            | TextureFormat::R16F
            | TextureFormat::R32F
            | TextureFormat::R32I
            | TextureFormat::Depth24
            | TextureFormat::Depth32F => 1,
            TextureFormat::Rg8 | TextureFormat::Rg16F | TextureFormat::Rg32F | TextureFormat::Rg32I => 2,
            TextureFormat::Rgb8 | TextureFormat::Rgb16F | TextureFormat::Rgb32F => 3,
            TextureFormat::Rgba8 | TextureFormat::Rgba16F | TextureFormat::Rgba32F | TextureFormat::Rgba32I => 4,
        }
    }

    /// Bytes per pixel, used for memory accounting
    pub fn bytes_per_pixel(&self) -> u32 {
        let per_channel = match self {
            TextureFormat::R8 | TextureFormat::Rg8 | TextureFormat::Rgb8 | TextureFormat::Rgba8 => 1,
            TextureFormat::R16F | TextureFormat::Rg16F | TextureFormat::Rgb16F | TextureFormat::Rgba16F => 2,
            // Depth24 is stored in a 32-bit word on every backend we target
            TextureFormat::Depth24 | TextureFormat::Depth32F => 4,
            _ => 4,
        };
        per_channel * self.channel_count()
    }
}
