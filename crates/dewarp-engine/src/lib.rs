//! Dewarp engine crate.
//!
//! Reprojects flat frames captured with a known horizontal field of view
//! into a wide-angle longitude/latitude view, on the GPU. Also owns the
//! platform + GPU runtime pieces used by the viewer.

pub mod core;
pub mod device;
pub mod logging;
pub mod projection;
pub mod render;
pub mod source;
pub mod window;

mod error;

pub use error::RenderError;
pub use wgpu;
