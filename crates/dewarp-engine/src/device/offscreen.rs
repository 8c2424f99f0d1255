use crate::error::RenderError;

use super::{GpuContext, RenderSurface, SurfaceFrame};

/// Texture-backed render target with CPU readback.
///
/// The readback is the surface's export path: callers encode or stream the
/// returned pixels however they like.
pub struct OffscreenSurface {
    device: wgpu::Device,
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
    texture: wgpu::Texture,
    readback: wgpu::Buffer,
    padded_bytes_per_row: u32,
}

impl OffscreenSurface {
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

    pub fn new(gpu: &GpuContext, width: u32, height: u32) -> Result<Self, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::invalid(format!(
                "offscreen surface must be non-empty, got {width}x{height}"
            )));
        }
        let device = gpu.device().clone();
        let (texture, readback, padded_bytes_per_row) = allocate(&device, width, height);
        Ok(Self {
            device,
            format: Self::FORMAT,
            width,
            height,
            texture,
            readback,
            padded_bytes_per_row,
        })
    }

    /// Copies the current contents back as tightly packed RGBA8 rows.
    ///
    /// Blocks until the GPU has finished all submitted work.
    pub fn read_rgba8(&self, gpu: &GpuContext) -> Result<Vec<u8>, RenderError> {
        let mut encoder = gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("dewarp readback encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &self.readback,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(self.padded_bytes_per_row),
                    rows_per_image: Some(self.height),
                },
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
        gpu.queue().submit(Some(encoder.finish()));

        let slice = self.readback.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |res| {
            let _ = tx.send(res);
        });
        gpu.device()
            .poll(wgpu::PollType::wait_indefinitely())
            .map_err(|e| RenderError::Device(format!("poll failed: {e:?}")))?;
        rx.recv()
            .map_err(|_| RenderError::Device("readback channel closed".into()))?
            .map_err(|e| RenderError::Device(format!("readback map failed: {e:?}")))?;

        let row_bytes = self.width as usize * 4;
        let padded = self.padded_bytes_per_row as usize;
        let mut out = Vec::with_capacity(row_bytes * self.height as usize);
        {
            let mapped = slice.get_mapped_range();
            for row in 0..self.height as usize {
                let start = row * padded;
                out.extend_from_slice(&mapped[start..start + row_bytes]);
            }
        }
        self.readback.unmap();

        Ok(out)
    }
}

impl RenderSurface for OffscreenSurface {
    fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 || (width, height) == (self.width, self.height) {
            return;
        }
        let (texture, readback, padded) = allocate(&self.device, width, height);
        self.texture = texture;
        self.readback = readback;
        self.padded_bytes_per_row = padded;
        self.width = width;
        self.height = height;
    }

    fn acquire(&mut self) -> Result<SurfaceFrame, RenderError> {
        let view = self
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        Ok(SurfaceFrame::offscreen(view))
    }
}

fn allocate(device: &wgpu::Device, width: u32, height: u32) -> (wgpu::Texture, wgpu::Buffer, u32) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("dewarp offscreen target"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: OffscreenSurface::FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });

    let padded = align_to(width * 4, wgpu::COPY_BYTES_PER_ROW_ALIGNMENT);
    let readback = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("dewarp readback"),
        size: padded as u64 * height as u64,
        usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    (texture, readback, padded)
}

fn align_to(value: u32, alignment: u32) -> u32 {
    let mask = alignment - 1;
    (value + mask) & !mask
}

#[cfg(test)]
mod tests {
    use super::align_to;

    #[test]
    fn rows_align_to_copy_alignment() {
        assert_eq!(align_to(4, 256), 256);
        assert_eq!(align_to(256, 256), 256);
        assert_eq!(align_to(1028, 256), 1280);
    }
}
