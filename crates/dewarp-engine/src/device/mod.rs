//! GPU device + surface management.
//!
//! This module is responsible for:
//! - acquiring the wgpu Instance/Adapter/Device/Queue
//! - creating & configuring window surfaces (swapchain) and offscreen targets
//! - handing out one drawable per frame through [`RenderSurface`]

mod context;
mod error;
mod frame;
mod gpu;
mod init;
mod offscreen;
mod surface;

pub use context::{DeviceLost, GpuContext};
pub(crate) use error::DeviceErrorScope;
pub use error::SurfaceErrorAction;
pub use frame::SurfaceFrame;
pub use gpu::Gpu;
pub use init::GpuInit;
pub use offscreen::OffscreenSurface;
pub use surface::RenderSurface;
