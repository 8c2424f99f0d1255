//! Frame sources.
//!
//! Still images, video frames and externally supplied frames all reduce to a
//! borrowed [`SourceFrame`]: pixel dimensions plus tightly packed RGBA8 data.
//! Decoding and playback live outside this crate.

mod frame;
mod stream;

pub use frame::{OwnedFrame, SourceFrame, BYTES_PER_PIXEL};
pub use stream::{FrameSequence, FrameSource, StillImage};
