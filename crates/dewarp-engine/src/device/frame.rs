/// Drawable acquired from a [`RenderSurface`](super::RenderSurface) for one frame.
///
/// Short-lived: hand it back through `RenderSurface::present` promptly.
/// Holding a swapchain texture blocks acquisition of the next one.
pub struct SurfaceFrame {
    pub view: wgpu::TextureView,
    pub(crate) surface_texture: Option<wgpu::SurfaceTexture>,
}

impl SurfaceFrame {
    /// Frame backed by a plain texture (no presentation step).
    pub fn offscreen(view: wgpu::TextureView) -> Self {
        Self {
            view,
            surface_texture: None,
        }
    }

    pub(crate) fn swapchain(surface_texture: wgpu::SurfaceTexture) -> Self {
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            view,
            surface_texture: Some(surface_texture),
        }
    }

    /// Presents swapchain frames; a no-op for offscreen frames.
    pub(crate) fn finish(self) {
        let SurfaceFrame { view, surface_texture } = self;
        drop(view);
        if let Some(texture) = surface_texture {
            texture.present();
        }
    }
}
