use crate::error::RenderError;
use crate::source::SourceFrame;

use super::kernel::project;
use super::params::ProjectionParameters;

/// Reprojects `source` on the CPU.
///
/// Evaluates the kernel at every output pixel center and samples the source
/// bilinearly with clamp-to-edge addressing. Pixels outside the frustum get
/// `background`. Returns tightly packed RGBA8 of
/// `params.output_width * params.output_height` pixels.
///
/// Filtering happens on the stored sRGB bytes, so results differ slightly
/// from the GPU path (which filters in linear space) near sharp edges.
pub fn reproject(
    source: &SourceFrame<'_>,
    params: &ProjectionParameters,
    background: [u8; 4],
) -> Result<Vec<u8>, RenderError> {
    source.validate()?;

    let (w, h) = (params.output_width as usize, params.output_height as usize);
    let mut out = Vec::with_capacity(w * h * 4);

    for y in 0..h {
        let v = (y as f32 + 0.5) / h as f32;
        for x in 0..w {
            let u = (x as f32 + 0.5) / w as f32;
            let px = match project((u, v), params) {
                Some((su, sv)) => sample_bilinear(source, su, sv),
                None => background,
            };
            out.extend_from_slice(&px);
        }
    }

    Ok(out)
}

fn sample_bilinear(source: &SourceFrame<'_>, u: f32, v: f32) -> [u8; 4] {
    let (sw, sh) = (source.width as f32, source.height as f32);

    let fx = (u * sw - 0.5).clamp(0.0, sw - 1.0);
    let fy = (v * sh - 0.5).clamp(0.0, sh - 1.0);

    let x0 = fx.floor() as u32;
    let y0 = fy.floor() as u32;
    let x1 = (x0 + 1).min(source.width - 1);
    let y1 = (y0 + 1).min(source.height - 1);
    let tx = fx - x0 as f32;
    let ty = fy - y0 as f32;

    let p00 = source.texel(x0, y0);
    let p10 = source.texel(x1, y0);
    let p01 = source.texel(x0, y1);
    let p11 = source.texel(x1, y1);

    let mut out = [0u8; 4];
    for c in 0..4 {
        let top = p00[c] as f32 * (1.0 - tx) + p10[c] as f32 * tx;
        let bottom = p01[c] as f32 * (1.0 - tx) + p11[c] as f32 * tx;
        out[c] = (top * (1.0 - ty) + bottom * ty).round().clamp(0.0, 255.0) as u8;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::OwnedFrame;

    const BLACK: [u8; 4] = [0, 0, 0, 255];

    fn params_for(src: &OwnedFrame, hfov_deg: f32, w: u32, h: u32) -> ProjectionParameters {
        ProjectionParameters::for_frame(&src.as_source(), hfov_deg.to_radians(), w, h)
            .unwrap()
    }

    /// Left half red, right half blue.
    fn split(width: u32, height: u32) -> OwnedFrame {
        OwnedFrame::from_fn(width, height, |x, _| {
            if x < width / 2 { [255, 0, 0, 255] } else { [0, 0, 255, 255] }
        })
    }

    #[test]
    fn output_has_requested_size() {
        let src = OwnedFrame::solid(8, 8, [10, 20, 30, 255]);
        let p = params_for(&src, 90.0, 17, 9);
        let out = reproject(&src.as_source(), &p, BLACK).unwrap();
        assert_eq!(out.len(), 17 * 9 * 4);
    }

    #[test]
    fn solid_source_keeps_color_inside_and_background_outside() {
        let src = OwnedFrame::solid(16, 16, [200, 100, 50, 255]);
        let p = params_for(&src, 30.0, 33, 33);
        let out = reproject(&src.as_source(), &p, BLACK).unwrap();

        let at = |x: usize, y: usize| {
            let i = (y * 33 + x) * 4;
            [out[i], out[i + 1], out[i + 2], out[i + 3]]
        };
        assert_eq!(at(16, 16), [200, 100, 50, 255]);
        assert_eq!(at(0, 0), BLACK);
    }

    #[test]
    fn left_half_of_output_samples_left_half_of_source() {
        let src = split(32, 32);
        let p = params_for(&src, 120.0, 32, 32);
        let out = reproject(&src.as_source(), &p, BLACK).unwrap();
        let row = 16 * 32 * 4;
        assert_eq!(&out[row + 12 * 4..row + 12 * 4 + 4], &[255, 0, 0, 255]);
        assert_eq!(&out[row + 20 * 4..row + 20 * 4 + 4], &[0, 0, 255, 255]);
    }

    #[test]
    fn second_source_fully_replaces_first() {
        let first = OwnedFrame::solid(64, 32, [255, 0, 0, 255]);
        let second = OwnedFrame::solid(16, 16, [0, 255, 0, 255]);

        let p1 = params_for(&first, 90.0, 24, 24);
        reproject(&first.as_source(), &p1, BLACK).unwrap();

        let p2 = params_for(&second, 90.0, 24, 24);
        let out = reproject(&second.as_source(), &p2, BLACK).unwrap();
        assert!(out.chunks_exact(4).all(|px| px == [0, 255, 0, 255] || px == BLACK));
    }

    #[test]
    fn aspect_ratio_changes_output() {
        let wide = OwnedFrame::solid(1024, 564, [255, 255, 255, 255]);
        let square = OwnedFrame::solid(1024, 1024, [255, 255, 255, 255]);

        let pw = params_for(&wide, 90.0, 32, 32);
        let ps = params_for(&square, 90.0, 32, 32);
        let a = reproject(&wide.as_source(), &pw, BLACK).unwrap();
        let b = reproject(&square.as_source(), &ps, BLACK).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn rejects_short_pixel_buffer() {
        let pixels = vec![0u8; 10];
        let src = SourceFrame::new(4, 4, &pixels);
        let p = ProjectionParameters::new(1.0, 1.0, 4, 4).unwrap();
        assert!(matches!(reproject(&src, &p, BLACK), Err(RenderError::Source(_))));
    }
}
