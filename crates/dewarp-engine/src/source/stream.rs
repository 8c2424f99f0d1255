use std::collections::VecDeque;

use super::frame::{OwnedFrame, SourceFrame};

/// Pull-based producer of source frames.
///
/// A live source returns the frame that is current at the time of the call;
/// frames the caller never pulls are simply never rendered.
pub trait FrameSource {
    /// Returns the next frame, or `None` when the source is exhausted.
    ///
    /// The returned frame is only valid until the next call.
    fn next_frame(&mut self) -> Option<SourceFrame<'_>>;
}

/// Still image: yields its single frame once.
#[derive(Debug, Clone)]
pub struct StillImage {
    frame: OwnedFrame,
    taken: bool,
}

impl StillImage {
    pub fn new(frame: OwnedFrame) -> Self {
        Self { frame, taken: false }
    }

    /// Borrows the image for direct re-rendering (e.g. after a resize).
    pub fn frame(&self) -> SourceFrame<'_> {
        self.frame.as_source()
    }

    /// Makes the image available to `next_frame` again.
    pub fn rewind(&mut self) {
        self.taken = false;
    }
}

impl FrameSource for StillImage {
    fn next_frame(&mut self) -> Option<SourceFrame<'_>> {
        if self.taken {
            return None;
        }
        self.taken = true;
        Some(self.frame.as_source())
    }
}

/// Finite, ordered frame stream (decoded video, captured external frames).
///
/// Frame dimensions may change between entries.
#[derive(Debug, Clone, Default)]
pub struct FrameSequence {
    pending: VecDeque<OwnedFrame>,
    current: Option<OwnedFrame>,
}

impl FrameSequence {
    pub fn new(frames: impl IntoIterator<Item = OwnedFrame>) -> Self {
        Self {
            pending: frames.into_iter().collect(),
            current: None,
        }
    }

    pub fn push(&mut self, frame: OwnedFrame) {
        self.pending.push_back(frame);
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

impl FrameSource for FrameSequence {
    fn next_frame(&mut self) -> Option<SourceFrame<'_>> {
        // The previous frame is released here, once its draw has been submitted.
        self.current = Some(self.pending.pop_front()?);
        self.current.as_ref().map(OwnedFrame::as_source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn still_image_yields_once_until_rewound() {
        let mut s = StillImage::new(OwnedFrame::solid(2, 2, [1, 2, 3, 4]));
        assert!(s.next_frame().is_some());
        assert!(s.next_frame().is_none());
        s.rewind();
        assert_eq!(s.next_frame().map(|f| f.width), Some(2));
    }

    #[test]
    fn sequence_preserves_order_and_dimensions() {
        let mut seq = FrameSequence::new([
            OwnedFrame::solid(4, 2, [0; 4]),
            OwnedFrame::solid(3, 3, [0; 4]),
        ]);
        seq.push(OwnedFrame::solid(1, 5, [0; 4]));

        let mut dims = Vec::new();
        while let Some(f) = seq.next_frame() {
            dims.push((f.width, f.height));
        }
        assert_eq!(dims, vec![(4, 2), (3, 3), (1, 5)]);
        assert_eq!(seq.remaining(), 0);
    }
}
