//! Core engine-facing contracts.
//!
//! This module defines the stable interface between the window runtime and
//! the application driving the renderer, and provides a consistent per-frame
//! context.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::FrameCtx;
