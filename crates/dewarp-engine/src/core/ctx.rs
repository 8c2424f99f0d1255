use winit::window::Window;

use crate::device::Gpu;
use crate::render::FrameRenderer;
use crate::source::SourceFrame;
use crate::window::RuntimeCtx;

use super::app::AppControl;

/// Per-frame context passed to `core::App::on_frame`.
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by `Gpu<'w>`
pub struct FrameCtx<'a, 'w> {
    pub window: &'a Window,
    pub gpu: &'a mut Gpu<'w>,
    pub runtime: &'a mut RuntimeCtx,
}

impl FrameCtx<'_, '_> {
    /// Renders `source` into the window and presents it.
    ///
    /// Recoverable errors keep the previous image on screen and the loop
    /// running; fatal ones end it.
    pub fn render(&mut self, renderer: &mut FrameRenderer, source: &SourceFrame<'_>) -> AppControl {
        self.window.pre_present_notify();

        match renderer.render_frame(&mut *self.gpu, source) {
            Ok(()) => AppControl::Continue,
            Err(err) if err.is_fatal() => {
                log::error!("rendering stopped: {err}");
                AppControl::Exit
            }
            Err(err) => {
                log::warn!("frame skipped: {err}");
                AppControl::Continue
            }
        }
    }
}
