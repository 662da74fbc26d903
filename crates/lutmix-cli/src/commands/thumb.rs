//! Single-LUT thumbnail.

use crate::ThumbArgs;
use anyhow::{Context, Result};
use lutmix_engine::render_thumbnail;
use lutmix_lut::cube;

pub fn run(args: ThumbArgs, verbose: u8) -> Result<()> {
    let lut = cube::read(&args.lut)
        .with_context(|| format!("Failed to read LUT: {}", args.lut.display()))?;
    let photo = super::load_photo(&args.input)?;

    let thumb = render_thumbnail(&photo.image, &lut, args.intensity, args.max_side)?;

    if verbose > 0 {
        println!(
            "Thumbnail {}x{} of {} at intensity {:.2}",
            thumb.width(),
            thumb.height(),
            args.lut.display(),
            args.intensity.clamp(0.0, 1.0)
        );
    }
    super::save_photo(&args.output, &thumb, false)
}
