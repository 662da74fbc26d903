//! Bake a LUT chain into one merged .cube file.

use crate::BakeArgs;
use anyhow::{bail, Context, Result};
use lutmix_engine::bake_with_size;
use lutmix_lut::cube;
use tracing::info;

pub fn run(args: BakeArgs, verbose: u8) -> Result<()> {
    let (specs, _) = super::chain_specs(&args.chain)?;
    if specs.is_empty() {
        bail!("No LUTs given: pass --lut or --chain");
    }
    let session = super::build_session(&specs)?;

    let mut merged = bake_with_size(session.chain(), args.size)?;
    if let Some(title) = args.title {
        merged = merged.with_title(title);
    }

    cube::write(&args.output, &merged)
        .with_context(|| format!("Failed to write: {}", args.output.display()))?;
    info!(size = args.size, stages = specs.len(), "wrote merged LUT");

    if verbose > 0 {
        println!(
            "Baked {} LUT(s) into {} ({}^3)",
            specs.len(),
            args.output.display(),
            args.size
        );
    }
    Ok(())
}
