//! Frame renderer.
//!
//! Owns the GPU-resident projection state and issues one full-surface draw per
//! source frame. The per-pixel math lives in `shaders/projection.wgsl` and
//! mirrors [`crate::projection::project`].

mod driver;
mod renderer;
mod uniform;

pub use driver::{drive, DriveStats};
pub use renderer::{FrameRenderer, RendererConfig};
