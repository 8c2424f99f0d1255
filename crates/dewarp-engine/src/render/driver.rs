use crate::device::RenderSurface;
use crate::error::RenderError;
use crate::source::FrameSource;

use super::FrameRenderer;

/// Outcome of a [`drive`] run.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct DriveStats {
    /// Frames that reached the surface.
    pub rendered: u64,
    /// Frames rejected by validation or skipped by the surface.
    pub skipped: u64,
}

/// Pulls frames from `source` until it is exhausted, rendering each once.
///
/// Recoverable errors skip the offending frame and keep going; the surface
/// still shows the last good frame. Fatal errors stop the loop.
pub fn drive<S>(
    renderer: &mut FrameRenderer,
    surface: &mut dyn RenderSurface,
    source: &mut S,
) -> Result<DriveStats, RenderError>
where
    S: FrameSource + ?Sized,
{
    let mut stats = DriveStats::default();

    while let Some(frame) = source.next_frame() {
        match renderer.render_frame(surface, &frame) {
            Ok(()) => stats.rendered += 1,
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => {
                log::warn!("frame {} skipped: {err}", stats.rendered + stats.skipped);
                stats.skipped += 1;
            }
        }
    }

    log::debug!("source exhausted: {stats:?}");
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{FrameSequence, OwnedFrame};

    struct NullSurface;

    impl RenderSurface for NullSurface {
        fn format(&self) -> wgpu::TextureFormat {
            wgpu::TextureFormat::Rgba8UnormSrgb
        }
        fn size(&self) -> (u32, u32) {
            (8, 8)
        }
        fn resize(&mut self, _: u32, _: u32) {}
        fn acquire(&mut self) -> Result<crate::device::SurfaceFrame, RenderError> {
            Err(RenderError::FrameSkipped("null surface".into()))
        }
    }

    #[test]
    fn uninitialized_renderer_stops_the_loop() {
        let mut renderer = FrameRenderer::default();
        let mut seq = FrameSequence::new([
            OwnedFrame::solid(2, 2, [0; 4]),
            OwnedFrame::solid(2, 2, [0; 4]),
        ]);

        let err = drive(&mut renderer, &mut NullSurface, &mut seq).unwrap_err();
        assert_eq!(err, RenderError::NotInitialized);
        // Only the first frame was pulled.
        assert_eq!(seq.remaining(), 1);
    }

    #[test]
    fn empty_source_renders_nothing() {
        let mut renderer = FrameRenderer::default();
        let mut seq = FrameSequence::default();
        let stats = drive(&mut renderer, &mut NullSurface, &mut seq).unwrap();
        assert_eq!(stats, DriveStats::default());
    }
}
