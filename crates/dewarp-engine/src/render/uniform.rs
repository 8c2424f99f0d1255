use bytemuck::{Pod, Zeroable};

use crate::projection::ProjectionParameters;

/// GPU layout of `Settings` in `projection.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct ProjectionUniform {
    pub ratio: f32,
    pub hfov: f32,
    pub canvas: [f32; 2],
}

impl ProjectionUniform {
    pub const SIZE: u64 = std::mem::size_of::<Self>() as u64;

    /// Returns the `wgpu` minimum binding size for the uniform buffer.
    pub fn min_binding_size() -> std::num::NonZeroU64 {
        std::num::NonZeroU64::new(Self::SIZE).unwrap_or(std::num::NonZeroU64::MIN)
    }
}

impl From<&ProjectionParameters> for ProjectionUniform {
    fn from(p: &ProjectionParameters) -> Self {
        Self {
            ratio: p.source_aspect_ratio,
            hfov: p.horizontal_fov_radians,
            canvas: [p.output_width as f32, p.output_height as f32],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_four_floats() {
        assert_eq!(ProjectionUniform::SIZE, 16);
        assert_eq!(ProjectionUniform::min_binding_size().get(), 16);
    }

    #[test]
    fn bytes_follow_field_order() {
        let p = ProjectionParameters::new(0.5, 1.25, 640, 480).unwrap();
        let u = ProjectionUniform::from(&p);
        let floats: &[f32] = bytemuck::cast_slice(bytemuck::bytes_of(&u));
        assert_eq!(floats, &[0.5, 1.25, 640.0, 480.0]);
    }
}
