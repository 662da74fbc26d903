//! Apply a LUT chain to a photo (export path).

use crate::ApplyArgs;
use anyhow::{bail, Result};
use tracing::info;

pub fn run(args: ApplyArgs, verbose: u8) -> Result<()> {
    let (specs, _) = super::chain_specs(&args.chain)?;
    if specs.is_empty() {
        bail!("No LUTs given: pass --lut or --chain");
    }
    let session = super::build_session(&specs)?;
    let photo = super::load_photo(&args.input)?;

    if verbose > 0 {
        println!(
            "Applying {} LUT(s) to {} ({}x{})",
            session.chain().len(),
            args.input.display(),
            photo.image.width(),
            photo.image.height()
        );
    }

    let result = session.export_photo(&photo.image)?;
    super::save_photo(&args.output, &result, photo.high_depth)?;
    info!(output = %args.output.display(), "wrote edited photo");

    if verbose > 0 {
        println!("Done.");
    }
    Ok(())
}
