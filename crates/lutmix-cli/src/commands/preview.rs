//! Render the interactive preview path to a file.
//!
//! Goes through the session's cached backend resources and honors the
//! compare toggle, unlike `apply`.

use crate::PreviewArgs;
use anyhow::{bail, Result};
use lutmix_engine::SamplingBackend;
use tracing::debug;

pub fn run(args: PreviewArgs, verbose: u8) -> Result<()> {
    let (specs, from_config) = super::chain_specs(&args.chain)?;
    if specs.is_empty() {
        bail!("No LUTs given: pass --lut or --chain");
    }
    let mut session = super::build_session(&specs)?;
    session.set_show_original(args.show_original || from_config);

    let photo = super::load_photo(&args.input)?;
    let frame = photo.image.downscale_to_fit(args.max_side);
    let rendered = session.preview(&frame)?;

    let stats = session.cache().stats();
    debug!(
        resources = session.cache().len(),
        bytes = session.cache().total_bytes(),
        misses = stats.misses,
        "preview cache"
    );

    if verbose > 0 {
        println!(
            "Preview {}x{} ({}){}",
            rendered.width(),
            rendered.height(),
            session.cache().backend().name(),
            if session.show_original() { ", showing original" } else { "" }
        );
    }
    super::save_photo(&args.output, &rendered, false)
}
