use winit::event::WindowEvent;
use winit::window::WindowId;

use crate::device::GpuContext;
use crate::error::RenderError;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by higher layers.
pub trait App {
    /// Called once, as soon as the window's device and surface exist.
    ///
    /// This is where renderer session state is created. An error ends the run.
    fn on_device_ready(
        &mut self,
        gpu: &GpuContext,
        format: wgpu::TextureFormat,
    ) -> Result<(), RenderError>;

    /// Called for window events.
    fn on_window_event(&mut self, window_id: WindowId, event: &WindowEvent) -> AppControl {
        let _ = (window_id, event);
        AppControl::Continue
    }

    /// Called once per redraw.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;
}
