use crate::error::RenderError;

/// Default source HFoV in degrees.
pub const DEFAULT_HFOV_DEGREES: f32 = 90.0;

/// Output resolution in physical pixels.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Result<Self, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::invalid(format!(
                "resolution must be positive, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }
}

/// User-editable projection controls.
///
/// HFoV is kept in degrees at this edge and converted to radians when a frame
/// is rendered. `resolution = None` follows the surface's own size.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewSettings {
    hfov_degrees: f32,
    resolution: Option<Resolution>,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            hfov_degrees: DEFAULT_HFOV_DEGREES,
            resolution: None,
        }
    }
}

impl ViewSettings {
    pub fn new(hfov_degrees: f32, resolution: Option<Resolution>) -> Result<Self, RenderError> {
        if !(hfov_degrees.is_finite() && hfov_degrees > 0.0 && hfov_degrees < 180.0) {
            return Err(RenderError::invalid(format!(
                "hfov must lie in (0, 180) degrees, got {hfov_degrees}"
            )));
        }
        if let Some(r) = resolution {
            Resolution::new(r.width, r.height)?;
        }
        Ok(Self {
            hfov_degrees,
            resolution,
        })
    }

    /// Parses raw user text (e.g. from a prompt or command line).
    pub fn parse(hfov: &str, resolution: Option<(&str, &str)>) -> Result<Self, RenderError> {
        let hfov_degrees: f32 = hfov
            .trim()
            .parse()
            .map_err(|_| RenderError::invalid(format!("hfov is not a number: {hfov:?}")))?;

        let resolution = match resolution {
            Some((w, h)) => Some(Resolution::new(parse_dim(w)?, parse_dim(h)?)?),
            None => None,
        };

        Self::new(hfov_degrees, resolution)
    }

    pub fn hfov_degrees(&self) -> f32 {
        self.hfov_degrees
    }

    pub fn hfov_radians(&self) -> f32 {
        self.hfov_degrees.to_radians()
    }

    pub fn resolution(&self) -> Option<Resolution> {
        self.resolution
    }
}

fn parse_dim(s: &str) -> Result<u32, RenderError> {
    s.trim()
        .parse()
        .map_err(|_| RenderError::invalid(format!("resolution is not a positive integer: {s:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_ninety_degrees() {
        let s = ViewSettings::default();
        assert_eq!(s.hfov_degrees(), 90.0);
        assert!((s.hfov_radians() - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert_eq!(s.resolution(), None);
    }

    #[test]
    fn parse_accepts_padded_numbers() {
        let s = ViewSettings::parse(" 120 ", Some(("1920", " 1080"))).unwrap();
        assert_eq!(s.hfov_degrees(), 120.0);
        assert_eq!(s.resolution(), Some(Resolution { width: 1920, height: 1080 }));
    }

    #[test]
    fn parse_rejects_bad_hfov() {
        for bad in ["", "abc", "0", "-5", "180", "200", "NaN", "inf"] {
            assert!(ViewSettings::parse(bad, None).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn parse_rejects_bad_resolution() {
        for (w, h) in [("0", "10"), ("10", "0"), ("-1", "10"), ("ten", "10"), ("1.5", "10")] {
            assert!(ViewSettings::parse("90", Some((w, h))).is_err(), "accepted {w}x{h}");
        }
    }

    #[test]
    fn new_rejects_zero_resolution() {
        let r = Resolution { width: 0, height: 1 };
        assert!(ViewSettings::new(90.0, Some(r)).is_err());
    }
}
