use crate::error::RenderError;

/// High-level response after a surface error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; rendering may resume next frame.
    Reconfigured,
    /// Transient error; skip the current frame.
    SkipFrame,
    /// Fatal error (commonly OOM); the device must be re-acquired.
    Fatal,
}

impl SurfaceErrorAction {
    /// Converts the action into the error reported for the current frame.
    pub(crate) fn into_error(self, err: wgpu::SurfaceError) -> RenderError {
        match self {
            SurfaceErrorAction::Fatal => RenderError::Device(format!("surface: {err}")),
            SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => {
                RenderError::FrameSkipped(format!("surface: {err}"))
            }
        }
    }
}

/// Captures validation and out-of-memory errors raised on the current thread
/// between [`begin`](Self::begin) and [`finish`](Self::finish).
///
/// Dropping the scope without finishing discards whatever it caught.
pub(crate) struct DeviceErrorScope {
    // Field order is drop order: scopes must pop innermost first.
    validation: wgpu::ErrorScopeGuard,
    out_of_memory: wgpu::ErrorScopeGuard,
}

impl DeviceErrorScope {
    pub(crate) fn begin(device: &wgpu::Device) -> Self {
        let out_of_memory = device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        let validation = device.push_error_scope(wgpu::ErrorFilter::Validation);
        Self {
            validation,
            out_of_memory,
        }
    }

    /// Pops both scopes; a captured error becomes `RenderError::Device`.
    pub(crate) fn finish(self, what: &str) -> Result<(), RenderError> {
        let Self {
            validation,
            out_of_memory,
        } = self;
        let validation = pollster::block_on(validation.pop());
        let out_of_memory = pollster::block_on(out_of_memory.pop());

        match validation.or(out_of_memory) {
            Some(err) => Err(RenderError::Device(format!("{what}: {err}"))),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{GpuContext, GpuInit};

    fn headless() -> Option<GpuContext> {
        pollster::block_on(GpuContext::headless(&GpuInit::default())).ok()
    }

    fn zero_sized_texture(device: &wgpu::Device) -> wgpu::Texture {
        device.create_texture(&wgpu::TextureDescriptor {
            label: Some("zero sized"),
            size: wgpu::Extent3d {
                width: 0,
                height: 4,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        })
    }

    #[test]
    fn out_of_memory_surface_error_is_fatal() {
        let err = SurfaceErrorAction::Fatal.into_error(wgpu::SurfaceError::OutOfMemory);
        assert!(err.is_fatal());
        let err = SurfaceErrorAction::SkipFrame.into_error(wgpu::SurfaceError::Timeout);
        assert!(matches!(err, RenderError::FrameSkipped(_)));
    }

    #[test]
    fn scope_reports_validation_error_as_device_error() {
        let Some(gpu) = headless() else { return };

        let scope = DeviceErrorScope::begin(gpu.device());
        let _texture = zero_sized_texture(gpu.device());
        let err = scope.finish("texture").unwrap_err();

        assert!(matches!(err, RenderError::Device(_)));
        // Captured by the scope, so the device stays usable.
        assert!(!gpu.is_lost());
    }

    #[test]
    fn clean_scope_finishes_ok() {
        let Some(gpu) = headless() else { return };

        let scope = DeviceErrorScope::begin(gpu.device());
        let _buffer = gpu.device().create_buffer(&wgpu::BufferDescriptor {
            label: None,
            size: 16,
            usage: wgpu::BufferUsages::UNIFORM,
            mapped_at_creation: false,
        });
        assert_eq!(scope.finish("buffer"), Ok(()));
    }

    #[test]
    fn error_outside_any_scope_marks_device_unusable() {
        let Some(gpu) = headless() else { return };

        let _texture = zero_sized_texture(gpu.device());

        assert!(gpu.is_lost());
    }
}
