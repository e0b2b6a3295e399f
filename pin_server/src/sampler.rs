//! Quadratic sampling of depth buffers at fractional coordinates.
//!
//! The actuation grid is much coarser than the depth map, so every pin reads
//! the depth field between pixels. A 3x3 quadratic reconstruction keeps the
//! surface smooth while reproducing the original samples exactly at integer
//! coordinates.

/// Clamp a coordinate so the surrounding 3x3 neighborhood stays in bounds.
///
/// `dim` must be at least 3 (guaranteed by `DepthBuffer`).
pub fn clamp_to_interior(coord: f32, dim: usize) -> f32 {
    coord.clamp(1.0, (dim - 2) as f32)
}

/// 1D quadratic Lagrange interpolation through samples at positions 0, 1, 2,
/// evaluated at `t` in `[0, 2]`.
///
/// The denominators are the integer node distances, so no input-derived
/// division happens here.
fn lagrange3(y0: f32, y1: f32, y2: f32, t: f32) -> f32 {
    let c0 = y0 * ((t - 1.0) * (t - 2.0)) / 2.0;
    let c1 = y1 * (t * (t - 2.0)) / -1.0;
    let c2 = y2 * (t * (t - 1.0)) / 2.0;
    c0 + c1 + c2
}

/// Sample a row-major depth buffer at the fractional coordinate `(u, v)`.
///
/// Out-of-range coordinates are clamped into `[1, width-2] x [1, height-2]`.
/// Interpolates along x through each of the three neighborhood rows, then
/// once along y through the row results. Exact polynomial interpolation: at
/// an integer interior coordinate the stored value is returned unchanged.
pub fn sample(data: &[f32], width: usize, height: usize, u: f32, v: f32) -> f32 {
    let u = clamp_to_interior(u, width);
    let v = clamp_to_interior(v, height);

    // Top-left corner of the 3x3 block.
    let x0 = u.floor() as usize - 1;
    let y0 = v.floor() as usize - 1;

    // Fractional offsets relative to the block corner, in [0, 2].
    let fx = u - x0 as f32;
    let fy = v - y0 as f32;

    let d = |x: usize, y: usize| data[y * width + x];

    let row0 = lagrange3(d(x0, y0), d(x0 + 1, y0), d(x0 + 2, y0), fx);
    let row1 = lagrange3(d(x0, y0 + 1), d(x0 + 1, y0 + 1), d(x0 + 2, y0 + 1), fx);
    let row2 = lagrange3(d(x0, y0 + 2), d(x0 + 1, y0 + 2), d(x0 + 2, y0 + 2), fx);

    lagrange3(row0, row1, row2, fy)
}
