use std::path::PathBuf;

use crate::coords::{Rect, Size};

/// Errors surfaced by the blitting layer.
///
/// Every error is returned synchronously from the call that caused it; nothing
/// is retried internally.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// A render surface is already alive on this registry.
    #[error("renderer already set up")]
    AlreadyInitialized,

    /// The device could not allocate an image, buffer or pipeline.
    #[error("failed to allocate {what}: {reason}")]
    DeviceResource { what: &'static str, reason: String },

    /// A shader source file does not exist.
    #[error("shader source not found: {}", path.display())]
    ShaderNotFound { path: PathBuf },

    /// A shader source file exists but could not be read.
    #[error("failed to read shader {}", path.display())]
    ShaderRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A rect or size with non-positive area where a positive area is required.
    #[error("invalid {what}: {width}x{height} has no area")]
    InvalidGeometry { what: &'static str, width: f32, height: f32 },

    /// A blit viewport that does not lie inside its destination.
    #[error("blit viewport {viewport:?} does not fit the {}x{} target", target.width, target.height)]
    ViewportOutOfBounds { viewport: Rect, target: Size },

    /// A vertex format string such as `"2f 2f 4f"` could not be parsed.
    #[error("invalid vertex format: {0}")]
    InvalidVertexFormat(String),

    /// A handle that was never allocated or has already been released.
    #[error("unknown {0} handle #{1}")]
    UnknownHandle(&'static str, u64),

    /// Frame bracket misuse or a failure to acquire the next screen image.
    #[error("frame error: {0}")]
    Frame(String),

    #[error("invalid color: {0}")]
    ColorParse(String),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

impl RenderError {
    pub(crate) fn device(what: &'static str, reason: impl Into<String>) -> Self {
        RenderError::DeviceResource { what, reason: reason.into() }
    }
}

pub type Result<T, E = RenderError> = std::result::Result<T, E>;
