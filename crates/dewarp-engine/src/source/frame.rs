use crate::error::RenderError;

/// Bytes per RGBA8 texel.
pub const BYTES_PER_PIXEL: usize = 4;

/// One still image or one instant of a video/external stream.
///
/// Pixels are tightly packed RGBA8 in sRGB, rows top to bottom. The renderer
/// borrows a frame for a single draw and keeps no reference to it afterwards.
#[derive(Debug, Copy, Clone)]
pub struct SourceFrame<'a> {
    pub width: u32,
    pub height: u32,
    pub pixels: &'a [u8],
}

impl<'a> SourceFrame<'a> {
    #[inline]
    pub const fn new(width: u32, height: u32, pixels: &'a [u8]) -> Self {
        Self { width, height, pixels }
    }

    /// Checks dimensions and buffer length.
    ///
    /// Zero-sized frames are `InvalidSource`; a buffer that does not hold
    /// exactly `width * height` texels is an import failure (`Source`).
    pub fn validate(&self) -> Result<(), RenderError> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::InvalidSource {
                width: self.width,
                height: self.height,
            });
        }
        let expected = (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|n| n.checked_mul(BYTES_PER_PIXEL))
            .ok_or_else(|| RenderError::Source("frame size overflow".into()))?;
        if self.pixels.len() != expected {
            return Err(RenderError::Source(format!(
                "expected {expected} bytes for {}x{} rgba8, got {}",
                self.width,
                self.height,
                self.pixels.len()
            )));
        }
        Ok(())
    }

    /// Source height / source width.
    #[inline]
    pub fn aspect_ratio(&self) -> f32 {
        self.height as f32 / self.width as f32
    }

    /// Returns the texel at `(x, y)`. Caller guarantees bounds.
    #[inline]
    pub(crate) fn texel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }
}

/// Frame that owns its pixel buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedFrame {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl OwnedFrame {
    /// Wraps an RGBA8 buffer, rejecting size mismatches.
    pub fn from_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, RenderError> {
        SourceFrame::new(width, height, &pixels).validate()?;
        Ok(Self { width, height, pixels })
    }

    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        Self::from_fn(width, height, |_, _| rgba)
    }

    /// Builds a frame by evaluating `f(x, y)` for every texel.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> [u8; 4]) -> Self {
        let mut pixels = Vec::with_capacity(width as usize * height as usize * BYTES_PER_PIXEL);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&f(x, y));
            }
        }
        Self { width, height, pixels }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn as_source(&self) -> SourceFrame<'_> {
        SourceFrame::new(self.width, self.height, &self.pixels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_accepts_exact_buffer() {
        let px = vec![0u8; 3 * 2 * 4];
        assert!(SourceFrame::new(3, 2, &px).validate().is_ok());
    }

    #[test]
    fn validate_zero_dimension_is_invalid_source() {
        let err = SourceFrame::new(0, 2, &[]).validate().unwrap_err();
        assert_eq!(err, RenderError::InvalidSource { width: 0, height: 2 });
    }

    #[test]
    fn validate_length_mismatch_is_source_error() {
        let px = vec![0u8; 7];
        let err = SourceFrame::new(1, 2, &px).validate().unwrap_err();
        assert!(matches!(err, RenderError::Source(_)));
    }

    #[test]
    fn from_fn_is_row_major() {
        let f = OwnedFrame::from_fn(2, 2, |x, y| [x as u8, y as u8, 0, 255]);
        let s = f.as_source();
        assert_eq!(s.texel(1, 0), [1, 0, 0, 255]);
        assert_eq!(s.texel(0, 1), [0, 1, 0, 255]);
    }

    #[test]
    fn aspect_ratio_is_height_over_width() {
        let f = OwnedFrame::solid(1024, 564, [0; 4]);
        assert!((f.as_source().aspect_ratio() - 0.55078125).abs() < 1e-6);
    }

    #[test]
    fn from_rgba8_rejects_mismatch() {
        assert!(OwnedFrame::from_rgba8(2, 2, vec![0; 15]).is_err());
        assert!(OwnedFrame::from_rgba8(2, 2, vec![0; 16]).is_ok());
    }
}
