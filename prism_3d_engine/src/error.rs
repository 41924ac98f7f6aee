//! Error types for the Prism3D engine
//!
//! This module defines the error types used throughout the engine,
//! including GPU allocation, configuration, and render target ownership.

use std::fmt;

/// Result type for Prism3D engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Prism3D engine errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Backend-specific error (graphics API call failed)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (framebuffer, texture, render target handle, etc.)
    InvalidResource(String),

    /// Initialization failed (engine, graphics device, subsystems)
    InitializationFailed(String),

    /// Invalid configuration rejected at call time (camera settings, target shape)
    InvalidConfiguration(String),

    /// A render target was handed back to a pool that does not expect it
    ShapeMismatch(String),
}

impl Error {
    /// Whether this error aborts the current frame through the early-end path.
    ///
    /// Allocation and backend failures are fatal to the frame only. Everything
    /// else is a caller mistake and is returned unchanged.
    pub fn is_frame_fatal(&self) -> bool {
        matches!(self, Error::OutOfMemory | Error::BackendError(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::InvalidConfiguration(msg) => write!(f, "Invalid configuration: {}", msg),
            Error::ShapeMismatch(msg) => write!(f, "Shape mismatch: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ===== ERROR MACROS =====

/// Build an error, log it at ERROR severity (with file:line), and yield it.
///
/// Defaults to `Error::BackendError`. Prefix with `@Variant,` to pick another
/// message-carrying variant.
///
/// # Example
///
/// ```ignore
/// let err = engine_err!("prism3d::RenderTargetPool", "unknown handle {:?}", key);
/// let err = engine_err!(@ShapeMismatch, "prism3d::RenderTargetPool", "not checked out");
/// ```
#[macro_export]
macro_rules! engine_err {
    (@$variant:ident, $source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::prism3d::Error::$variant(message)
    }};
    ($source:expr, $($arg:tt)*) => {
        $crate::engine_err!(@BackendError, $source, $($arg)*)
    };
}

/// Log an error and return it from the enclosing function.
///
/// Same forms as [`engine_err!`].
#[macro_export]
macro_rules! engine_bail {
    (@$variant:ident, $source:expr, $($arg:tt)*) => {
        return Err($crate::engine_err!(@$variant, $source, $($arg)*))
    };
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
