use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::error::RenderError;

use super::surface::{choose_alpha_mode, choose_surface_format, classify_surface_error};
use super::{GpuContext, GpuInit, RenderSurface, SurfaceErrorAction, SurfaceFrame};

/// Window-bound GPU context: device plus a configured swapchain surface.
///
/// This type:
/// - creates the wgpu Surface for a window and an adapter compatible with it
/// - keeps the surface configuration in sync with the drawable size
/// - acquires swapchain frames for the renderer
pub struct Gpu<'w> {
    context: GpuContext,

    /// Surface bound to the window.
    ///
    /// Surface lifetime is tied to the window; architecture must ensure the window
    /// outlives the `Gpu` instance.
    surface: wgpu::Surface<'w>,

    /// Active surface configuration.
    config: wgpu::SurfaceConfiguration,

    /// Current drawable size in physical pixels.
    size: PhysicalSize<u32>,
}

impl<'w> Gpu<'w> {
    /// Creates a GPU context bound to a window.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu.
    pub async fn new(window: &'w Window, init: GpuInit) -> Result<Self, RenderError> {
        let size = window.inner_size();
        if size.width == 0 || size.height == 0 {
            return Err(RenderError::Initialization("window has zero size".into()));
        }

        let instance = GpuContext::create_instance(&init);

        // Surface lifetime is tied to `window` via `'w`.
        let surface = instance
            .create_surface(window)
            .map_err(|e| RenderError::Initialization(format!("failed to create surface: {e}")))?;

        let context = GpuContext::with_instance(instance, Some(&surface), &init).await?;

        let caps = surface.get_capabilities(context.adapter());
        let format = choose_surface_format(&caps, init.prefer_srgb)
            .ok_or_else(|| RenderError::Initialization("no supported surface formats".into()))?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode: init.present_mode,
            alpha_mode: choose_alpha_mode(&caps, init.alpha_mode),
            view_formats: vec![],
            desired_maximum_frame_latency: init.desired_maximum_frame_latency,
        };

        surface.configure(context.device(), &config);
        log::debug!("surface configured: {format:?} {}x{}", size.width, size.height);

        Ok(Self {
            context,
            surface,
            config,
            size,
        })
    }

    pub fn context(&self) -> &GpuContext {
        &self.context
    }

    /// Reconfigures the surface after a window resize.
    ///
    /// wgpu does not support configuring a surface with a 0x0 size; in that case,
    /// only internal state is updated and configuration is deferred.
    pub fn resize_to(&mut self, new_size: PhysicalSize<u32>) {
        self.size = new_size;
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }

        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(self.context.device(), &self.config);
    }

    /// Converts a `SurfaceError` into a higher-level action, reconfiguring
    /// the surface where that recovers it.
    pub fn handle_surface_error(&mut self, err: &wgpu::SurfaceError) -> SurfaceErrorAction {
        let action = classify_surface_error(err);
        if action == SurfaceErrorAction::Reconfigured && self.size.width > 0 && self.size.height > 0 {
            self.surface.configure(self.context.device(), &self.config);
        }
        action
    }
}

impl RenderSurface for Gpu<'_> {
    fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    fn size(&self) -> (u32, u32) {
        (self.size.width, self.size.height)
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.resize_to(PhysicalSize::new(width, height));
    }

    fn acquire(&mut self) -> Result<SurfaceFrame, RenderError> {
        if self.size.width == 0 || self.size.height == 0 {
            return Err(RenderError::FrameSkipped("surface is minimized".into()));
        }
        match self.surface.get_current_texture() {
            Ok(texture) => Ok(SurfaceFrame::swapchain(texture)),
            Err(err) => {
                let action = self.handle_surface_error(&err);
                Err(action.into_error(err))
            }
        }
    }
}
