//! Chain compositor.
//!
//! Each stage samples the *current* color through its LUT, then blends the
//! pre- and post-stage colors by the stage intensity:
//!
//! ```text
//! color = original
//! for (lut, t) in chain[..5]:
//!     color = mix(color, sample(lut, color), t)
//! ```
//!
//! The result is the same whether evaluated once per export pixel, per
//! baked grid point, or per preview fragment.

use lutmix_lut::{mix, sample, LutDocument};
use rayon::prelude::*;
use tracing::debug;

use crate::{EngineError, EngineResult, Image, LutChain, MAX_CHAIN_LEN};

/// Runs `rgb` through at most [`MAX_CHAIN_LEN`] stages.
///
/// An empty iterator leaves the color unchanged.
pub fn composite<'a, I>(stages: I, rgb: [f32; 3]) -> [f32; 3]
where
    I: IntoIterator<Item = (&'a LutDocument, f32)>,
{
    stages
        .into_iter()
        .take(MAX_CHAIN_LEN)
        .fold(rgb, |color, (lut, t)| mix(color, sample(lut, color), t))
}

/// Presentation-level compare mix.
///
/// With `show_original` set the composited color is fully reverted to the
/// pre-chain input. This is not part of the chain math.
#[inline]
pub fn present(original: [f32; 3], composited: [f32; 3], show_original: bool) -> [f32; 3] {
    let t = if show_original { 1.0 } else { 0.0 };
    mix(composited, original, t)
}

/// Applies `chain` to every pixel of `image` in place.
///
/// Channels past RGB (alpha) are left untouched.
pub fn apply_chain(chain: &LutChain, image: &mut Image) -> EngineResult<()> {
    let stages: Vec<(&LutDocument, f32)> = chain.stages().take(MAX_CHAIN_LEN).collect();
    debug!(
        stages = stages.len(),
        width = image.width(),
        height = image.height(),
        "applying chain"
    );
    apply_stages(&stages, image)
}

/// Renders a single-LUT thumbnail of `image`.
///
/// The image is box-downscaled to fit `max_side` (0 keeps the full size)
/// before the LUT is applied at `intensity`.
pub fn render_thumbnail(
    image: &Image,
    lut: &LutDocument,
    intensity: f32,
    max_side: u32,
) -> EngineResult<Image> {
    let mut thumb = image.downscale_to_fit(max_side);
    let t = if intensity.is_nan() { 0.0 } else { intensity.clamp(0.0, 1.0) };
    apply_stages(&[(lut, t)], &mut thumb)?;
    Ok(thumb)
}

pub(crate) fn apply_stages(stages: &[(&LutDocument, f32)], image: &mut Image) -> EngineResult<()> {
    let c = image.channels() as usize;
    if c < 3 {
        return Err(EngineError::UnsupportedChannels(image.channels()));
    }
    if stages.is_empty() || image.data.is_empty() {
        return Ok(());
    }
    let row = image.width() as usize * c;
    image.data.par_chunks_mut(row).for_each(|line| {
        for px in line.chunks_exact_mut(c) {
            let out = composite(stages.iter().copied(), [px[0], px[1], px[2]]);
            px[..3].copy_from_slice(&out);
        }
    });
    Ok(())
}
