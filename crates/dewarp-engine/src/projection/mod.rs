//! Projection kernel.
//!
//! Pure math, no GPU state. For every output pixel a longitude/latitude
//! direction is synthesized and projected through a pinhole camera matching
//! the source's horizontal field of view (inverse mapping, output → source).
//!
//! The WGSL fragment shader evaluates the same mapping on the GPU; [`cpu`]
//! provides a reference evaluation over a whole frame.

pub mod cpu;
mod kernel;
mod params;
mod settings;

pub use kernel::project;
pub use params::{Frustum, ProjectionParameters};
pub use settings::{Resolution, ViewSettings, DEFAULT_HFOV_DEGREES};
