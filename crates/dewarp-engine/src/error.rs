/// Errors produced by device acquisition and frame rendering.
///
/// Recoverable variants reject a single frame or parameter update and leave the
/// previous output and renderer state untouched. Fatal variants invalidate the
/// renderer state; the caller must re-initialize before rendering again.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderError {
    /// No compatible adapter/device could be acquired.
    #[error("gpu initialization failed: {0}")]
    Initialization(String),

    /// `render_frame` was called before `initialize` or after a fatal error.
    #[error("renderer is not initialized")]
    NotInitialized,

    /// Rejected projection parameters or view settings.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// Source frame with a zero dimension.
    #[error("invalid source: {width}x{height}")]
    InvalidSource { width: u32, height: u32 },

    /// Source frame could not be imported as a texture.
    #[error("source import failed: {0}")]
    Source(String),

    /// The surface could not provide a drawable this frame.
    #[error("frame skipped: {0}")]
    FrameSkipped(String),

    /// Lost device or resource exhaustion.
    #[error("gpu device error: {0}")]
    Device(String),
}

impl RenderError {
    /// Returns true when the renderer state can no longer be used.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            RenderError::Initialization(_) | RenderError::NotInitialized | RenderError::Device(_)
        )
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        RenderError::InvalidParameters(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_recoverable() {
        assert!(!RenderError::invalid("hfov").is_fatal());
        assert!(!RenderError::InvalidSource { width: 0, height: 4 }.is_fatal());
        assert!(!RenderError::Source("short buffer".into()).is_fatal());
        assert!(!RenderError::FrameSkipped("timeout".into()).is_fatal());
    }

    #[test]
    fn device_errors_are_fatal() {
        assert!(RenderError::Device("lost".into()).is_fatal());
        assert!(RenderError::Initialization("no adapter".into()).is_fatal());
        assert!(RenderError::NotInitialized.is_fatal());
    }

    #[test]
    fn display_includes_dimensions() {
        let e = RenderError::InvalidSource { width: 0, height: 12 };
        assert_eq!(e.to_string(), "invalid source: 0x12");
    }
}
