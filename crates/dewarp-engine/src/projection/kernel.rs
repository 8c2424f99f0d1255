use std::f32::consts::PI;

use super::params::ProjectionParameters;

/// Maps a normalized output position to a normalized source sampling position.
///
/// `uv` spans the output surface in `[0, 1]²` (origin top-left). The output
/// is read as a longitude/latitude grid over a half sphere; each direction is
/// projected through a pinhole camera with the source's HFoV. Returns `None`
/// when the direction misses the source's image plane.
///
/// Must stay in sync with `fs_main` in `render/shaders/projection.wgsl`.
pub fn project(uv: (f32, f32), params: &ProjectionParameters) -> Option<(f32, f32)> {
    let frustum = params.frustum();

    let lon = (uv.0 - 0.5) * PI;
    let lat = (uv.1 - 0.5) * PI;

    let [right, up, forward] = direction(lon, lat);

    // Behind or parallel to the image plane.
    if forward <= 0.0 {
        return None;
    }

    let px = right / forward * frustum.focal;
    let py = up / forward * frustum.focal;

    let half_w = frustum.width / 2.0;
    let half_h = frustum.height / 2.0;
    if !(within(px, half_w) && within(py, half_h)) {
        return None;
    }

    Some(((px + half_w) / frustum.width, (py + half_h) / frustum.height))
}

/// Unit direction for (lon, lat) in camera axes: right, up, forward.
#[inline]
fn direction(lon: f32, lat: f32) -> [f32; 3] {
    let x = lat.cos() * lon.cos();
    let y = lat.cos() * lon.sin();
    let z = lat.sin();
    [y, z, x]
}

/// Open interval test: boundary values are outside.
#[inline]
fn within(value: f32, limit: f32) -> bool {
    value < limit && value > -limit
}
