use std::f32::consts::PI;

use crate::error::RenderError;
use crate::source::SourceFrame;

/// Scalar inputs of one projection draw.
///
/// Built fresh every frame from the current source and output surface; never
/// carried across frames.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ProjectionParameters {
    /// Source height / source width.
    pub source_aspect_ratio: f32,
    /// Horizontal field of view of the source camera, in (0, π).
    pub horizontal_fov_radians: f32,
    pub output_width: u32,
    pub output_height: u32,
}

/// Virtual image plane of the source camera, in unit-sphere units.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frustum {
    pub width: f32,
    pub height: f32,
    /// Distance from the camera to the image plane.
    pub focal: f32,
}

impl ProjectionParameters {
    /// Validates and builds parameters.
    ///
    /// HFoV outside (0, π) is rejected rather than clamped: at π the focal
    /// distance collapses to zero and the plane extent stops growing.
    pub fn new(
        source_aspect_ratio: f32,
        horizontal_fov_radians: f32,
        output_width: u32,
        output_height: u32,
    ) -> Result<Self, RenderError> {
        if !(source_aspect_ratio.is_finite() && source_aspect_ratio > 0.0) {
            return Err(RenderError::invalid(format!(
                "source aspect ratio must be positive, got {source_aspect_ratio}"
            )));
        }
        if !(horizontal_fov_radians.is_finite()
            && horizontal_fov_radians > 0.0
            && horizontal_fov_radians < PI)
        {
            return Err(RenderError::invalid(format!(
                "horizontal fov must lie in (0, pi), got {horizontal_fov_radians}"
            )));
        }
        if output_width == 0 || output_height == 0 {
            return Err(RenderError::invalid(format!(
                "output surface has zero size ({output_width}x{output_height})"
            )));
        }

        Ok(Self {
            source_aspect_ratio,
            horizontal_fov_radians,
            output_width,
            output_height,
        })
    }

    /// Derives parameters for one frame from source and surface dimensions.
    pub fn for_frame(
        source: &SourceFrame<'_>,
        horizontal_fov_radians: f32,
        output_width: u32,
        output_height: u32,
    ) -> Result<Self, RenderError> {
        if source.width == 0 || source.height == 0 {
            return Err(RenderError::InvalidSource {
                width: source.width,
                height: source.height,
            });
        }
        Self::new(
            source.aspect_ratio(),
            horizontal_fov_radians,
            output_width,
            output_height,
        )
    }

    pub fn frustum(&self) -> Frustum {
        let half = self.horizontal_fov_radians / 2.0;
        let width = 2.0 * half.sin();
        Frustum {
            width,
            height: width * self.source_aspect_ratio,
            focal: width / (2.0 * half.tan()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_typical_values() {
        let p = ProjectionParameters::new(0.5625, PI / 2.0, 1280, 720).unwrap();
        assert_eq!(p.output_width, 1280);
    }

    #[test]
    fn rejects_degenerate_fov() {
        for hfov in [0.0, -0.1, PI, 4.0, f32::NAN, f32::INFINITY] {
            let err = ProjectionParameters::new(1.0, hfov, 64, 64).unwrap_err();
            assert!(matches!(err, RenderError::InvalidParameters(_)), "hfov {hfov}");
        }
    }

    #[test]
    fn rejects_bad_ratio_and_zero_output() {
        assert!(ProjectionParameters::new(0.0, 1.0, 64, 64).is_err());
        assert!(ProjectionParameters::new(f32::NAN, 1.0, 64, 64).is_err());
        assert!(ProjectionParameters::new(1.0, 1.0, 0, 64).is_err());
        assert!(ProjectionParameters::new(1.0, 1.0, 64, 0).is_err());
    }

    #[test]
    fn for_frame_derives_ratio() {
        let px = vec![0u8; 1024 * 564 * 4];
        let src = SourceFrame::new(1024, 564, &px);
        let p = ProjectionParameters::for_frame(&src, 1.0, 10, 10).unwrap();
        assert!((p.source_aspect_ratio - 564.0 / 1024.0).abs() < 1e-6);
    }

    #[test]
    fn for_frame_rejects_zero_source() {
        let src = SourceFrame::new(0, 10, &[]);
        let err = ProjectionParameters::for_frame(&src, 1.0, 10, 10).unwrap_err();
        assert_eq!(err, RenderError::InvalidSource { width: 0, height: 10 });
    }

    #[test]
    fn frustum_at_right_angle() {
        let p = ProjectionParameters::new(1.0, PI / 2.0, 8, 8).unwrap();
        let f = p.frustum();
        let expected = 2.0 * (PI / 4.0).sin();
        assert!((f.width - expected).abs() < 1e-6);
        assert!((f.height - expected).abs() < 1e-6);
        // tan(45°) = 1
        assert!((f.focal - expected / 2.0).abs() < 1e-6);
    }
}
