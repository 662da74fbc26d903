//! LUT info command.
//!
//! Displays title, grid size, domain and, with `--stats`, the output value range.

use crate::InfoArgs;
use anyhow::{Context, Result};
use lutmix_lut::{cube, LutDocument};
use std::path::Path;

/// Runs the info command.
pub fn run(args: InfoArgs, verbose: u8) -> Result<()> {
    for path in &args.input {
        let lut = cube::read(path)
            .with_context(|| format!("Failed to read LUT: {}", path.display()))?;
        print_text(path, &lut, args.stats, verbose);

        if args.input.len() > 1 {
            println!();
        }
    }
    Ok(())
}

fn print_text(path: &Path, lut: &LutDocument, stats: bool, verbose: u8) {
    let title = if lut.title().is_empty() { "(untitled)" } else { lut.title() };
    println!("{}", path.display());
    println!("  Title:      {}", title);
    println!("  Size:       {0}x{0}x{0}", lut.size());
    println!("  Entries:    {}", lut.entry_count());

    if verbose > 0 || !lut.has_default_domain() {
        let (min, max) = (lut.domain_min(), lut.domain_max());
        println!("  Domain min: {} {} {}", min[0], min[1], min[2]);
        println!("  Domain max: {} {} {}", max[0], max[1], max[2]);
    }

    if stats {
        let (lo, hi) = lut.value_range();
        println!("  Min value:  {:.6}", lo);
        println!("  Max value:  {:.6}", hi);
        if lo < 0.0 || hi > 1.0 {
            println!("  Range:      extends outside [0, 1]");
        }
    }
}
