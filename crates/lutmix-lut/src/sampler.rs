//! Trilinear sampling of a [`LutDocument`].
//!
//! Queries outside the grid saturate to the nearest valid cell instead of
//! failing. The upper coordinate is held `EPSILON` below `size - 1` so the
//! `floor + 1` corner always stays in bounds.
//!
//! Blending is done along red, then green, then blue. Every backend that
//! renders a chain must follow the same order to stay bit-compatible with
//! export.

use crate::LutDocument;

/// Margin keeping the continuous grid coordinate below the last lattice index.
pub const EPSILON: f32 = 1e-4;

/// Samples `lut` at `rgb` with trilinear interpolation.
///
/// Only RGB is returned; stored alpha does not take part in compositing.
///
/// # Example
///
/// ```rust
/// use lutmix_lut::{LutDocument, sample};
///
/// let lut = LutDocument::identity(33);
/// let out = sample(&lut, [0.5, 0.25, 0.75]);
/// assert!((out[1] - 0.25).abs() < 1e-5);
/// ```
pub fn sample(lut: &LutDocument, rgb: [f32; 3]) -> [f32; 3] {
    let size = lut.size();
    let n = (size - 1) as f32;
    let hi = n - EPSILON;
    let (r, g, b) = normalize(lut, rgb);

    let fr = (r * n).clamp(0.0, hi);
    let fg = (g * n).clamp(0.0, hi);
    let fb = (b * n).clamp(0.0, hi);

    let r0 = fr.floor() as usize;
    let g0 = fg.floor() as usize;
    let b0 = fb.floor() as usize;
    let (r1, g1, b1) = (r0 + 1, g0 + 1, b0 + 1);

    let dr = fr - r0 as f32;
    let dg = fg - g0 as f32;
    let db = fb - b0 as f32;

    let samples = lut.samples();
    let at = |ri: usize, gi: usize, bi: usize| (ri + gi * size + bi * size * size) * 4;

    let c000 = at(r0, g0, b0);
    let c100 = at(r1, g0, b0);
    let c010 = at(r0, g1, b0);
    let c110 = at(r1, g1, b0);
    let c001 = at(r0, g0, b1);
    let c101 = at(r1, g0, b1);
    let c011 = at(r0, g1, b1);
    let c111 = at(r1, g1, b1);

    let mut out = [0.0f32; 3];
    for (ch, value) in out.iter_mut().enumerate() {
        let c00 = lerp(samples[c000 + ch], samples[c100 + ch], dr);
        let c10 = lerp(samples[c010 + ch], samples[c110 + ch], dr);
        let c01 = lerp(samples[c001 + ch], samples[c101 + ch], dr);
        let c11 = lerp(samples[c011 + ch], samples[c111 + ch], dr);

        let c0 = lerp(c00, c10, dg);
        let c1 = lerp(c01, c11, dg);

        *value = lerp(c0, c1, db);
    }
    out
}

/// Per-channel linear blend `a * (1 - t) + b * t`.
///
/// `t = 0` yields `a` and `t = 1` yields `b` exactly.
#[inline]
pub fn mix(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [lerp(a[0], b[0], t), lerp(a[1], b[1], t), lerp(a[2], b[2], t)]
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

/// Maps a query into [0, 1] grid space using the document's domain.
///
/// NaN saturates to the low edge.
#[inline]
fn normalize(lut: &LutDocument, rgb: [f32; 3]) -> (f32, f32, f32) {
    if lut.has_default_domain() {
        return (clean(rgb[0]), clean(rgb[1]), clean(rgb[2]));
    }
    let min = lut.domain_min();
    let max = lut.domain_max();
    let axis = |i: usize| {
        let span = max[i] - min[i];
        if span.abs() <= f32::EPSILON {
            0.0
        } else {
            clean((rgb[i] - min[i]) / span)
        }
    };
    (axis(0), axis(1), axis(2))
}

#[inline]
fn clean(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v }
}
