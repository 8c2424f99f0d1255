use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::RenderError;

use super::GpuInit;

/// Shared flag raised when the device becomes unusable: wgpu's device-lost
/// callback fired, or an error escaped every error scope.
#[derive(Debug, Clone, Default)]
pub struct DeviceLost(Arc<AtomicBool>);

impl DeviceLost {
    pub fn is_lost(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub(crate) fn mark(&self) {
        self.0.store(true, Ordering::Release);
    }
}

/// Owns the wgpu instance, adapter, device and queue.
///
/// Acquired once per session. Acquisition is asynchronous under wgpu; callers
/// outside async code block on it with `pollster`.
pub struct GpuContext {
    instance: wgpu::Instance,
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
    lost: DeviceLost,
}

impl GpuContext {
    /// Creates an instance configured from `init`.
    pub fn create_instance(init: &GpuInit) -> wgpu::Instance {
        wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: init.backends,
            ..Default::default()
        })
    }

    /// Acquires a device with no presentation surface (offscreen rendering).
    pub async fn headless(init: &GpuInit) -> Result<Self, RenderError> {
        let instance = Self::create_instance(init);
        Self::with_instance(instance, None, init).await
    }

    /// Acquires an adapter (compatible with `surface` when given) and a device.
    pub async fn with_instance(
        instance: wgpu::Instance,
        surface: Option<&wgpu::Surface<'_>>,
        init: &GpuInit,
    ) -> Result<Self, RenderError> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: init.power_preference,
                compatible_surface: surface,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| RenderError::Initialization(format!("no suitable adapter: {e}")))?;

        let info = adapter.get_info();
        log::info!("using adapter {:?} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("dewarp device"),
                required_features: init.required_features,
                required_limits: init.required_limits.clone(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| RenderError::Initialization(format!("device request failed: {e}")))?;

        let lost = DeviceLost::default();
        let flag = lost.clone();
        device.set_device_lost_callback(move |reason, message| {
            log::error!("gpu device lost ({reason:?}): {message}");
            flag.mark();
        });
        let flag = lost.clone();
        device.on_uncaptured_error(Arc::new(move |err| {
            log::error!("uncaptured gpu error: {err}");
            flag.mark();
        }));

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
            lost,
        })
    }

    pub fn instance(&self) -> &wgpu::Instance {
        &self.instance
    }

    pub fn adapter(&self) -> &wgpu::Adapter {
        &self.adapter
    }

    /// Returns a reference to the logical device.
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Returns a reference to the command queue.
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Handle to the device-lost flag; clones observe the same device.
    pub fn lost(&self) -> &DeviceLost {
        &self.lost
    }

    pub fn is_lost(&self) -> bool {
        self.lost.is_lost()
    }
}
