//! Merged-LUT export.
//!
//! Bakes a whole chain into one LUT by evaluating the compositor at every
//! grid point with the CPU trilinear sampler. Nothing previously baked is
//! reused, so the result depends only on the chain and the bake size.

use lutmix_lut::{cube, LutDocument};
use rayon::prelude::*;
use tracing::debug;

use crate::{composite, EngineResult, LutChain, MAX_CHAIN_LEN};

/// Grid resolution of exported merged LUTs.
pub const BAKE_SIZE: usize = 32;

/// Title written into merged LUTs.
pub const BAKE_TITLE: &str = "lutmix merged";

/// Bakes `chain` at [`BAKE_SIZE`].
pub fn bake(chain: &LutChain) -> EngineResult<LutDocument> {
    bake_with_size(chain, BAKE_SIZE)
}

/// Bakes `chain` into a `size^3` LUT.
///
/// Grid point `(r, g, b)` is evaluated at `(r, g, b) / (size - 1)`; output
/// alpha is always 1.0.
pub fn bake_with_size(chain: &LutChain, size: usize) -> EngineResult<LutDocument> {
    if !(2..=lutmix_lut::MAX_SIZE).contains(&size) {
        return Err(lutmix_lut::LutError::InvalidSize(size).into());
    }
    let stages: Vec<(&LutDocument, f32)> = chain.stages().take(MAX_CHAIN_LEN).collect();
    debug!(size, stages = stages.len(), "baking merged LUT");

    let n = (size - 1) as f32;
    let slice = size * size * 4;
    let mut samples = vec![0.0f32; size * slice];

    samples.par_chunks_mut(slice).enumerate().for_each(|(b, plane)| {
        let bf = b as f32 / n;
        for g in 0..size {
            let gf = g as f32 / n;
            for r in 0..size {
                let rf = r as f32 / n;
                let out = composite(stages.iter().copied(), [rf, gf, bf]);
                let i = (r + g * size) * 4;
                plane[i..i + 4].copy_from_slice(&[out[0], out[1], out[2], 1.0]);
            }
        }
    });

    Ok(LutDocument::from_rgba(size, samples)?.with_title(BAKE_TITLE))
}

/// Bakes `chain` and serializes it as CUBE text.
pub fn export_cube(chain: &LutChain) -> EngineResult<String> {
    Ok(cube::serialize(&bake(chain)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LutId;
    use approx::assert_abs_diff_eq;
    use std::sync::Arc;

    #[test]
    fn empty_chain_bakes_identity() {
        let lut = bake(&LutChain::new()).unwrap();
        assert_eq!(lut.size(), BAKE_SIZE);
        assert_eq!(lut.samples(), LutDocument::identity(BAKE_SIZE).samples());
    }

    #[test]
    fn grid_points_match_direct_composite() {
        let lut = Arc::new(LutDocument::from_fn(5, |r, g, b| [g, b * 0.5, r]).unwrap());
        let mut chain = LutChain::new();
        chain.push(LutId::from_raw(0), lut.clone()).unwrap();
        chain.set_intensity(0, 0.75).unwrap();

        let baked = bake_with_size(&chain, 8).unwrap();
        let n = 7.0f32;
        for (r, g, b) in [(0, 0, 0), (3, 5, 1), (7, 7, 7), (2, 0, 6)] {
            let q = [r as f32 / n, g as f32 / n, b as f32 / n];
            let expect = composite(chain.stages(), q);
            let t = baked.texel(r, g, b);
            assert_eq!([t[0], t[1], t[2]], expect);
            assert_eq!(t[3], 1.0);
        }
    }

    #[test]
    fn export_cube_parses_back() {
        let mut chain = LutChain::new();
        chain
            .push(LutId::from_raw(0), Arc::new(LutDocument::from_fn(3, |r, g, b| [1.0 - r, g, b]).unwrap()))
            .unwrap();
        let text = export_cube(&chain).unwrap();
        let back = cube::parse(&text).unwrap();
        assert_eq!(back.size(), BAKE_SIZE);
        assert_eq!(back.title(), BAKE_TITLE);
        let t = back.texel(0, 0, 0);
        assert_abs_diff_eq!(t[0], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn rejects_degenerate_size() {
        assert!(bake_with_size(&LutChain::new(), 1).is_err());
    }
}
