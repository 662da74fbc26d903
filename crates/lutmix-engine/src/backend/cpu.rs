//! CPU backend using rayon for parallelization.

use rayon::prelude::*;
use lutmix_lut::LutDocument;
use tracing::trace;

use super::{ChainUniforms, SamplingBackend, SamplingResource};
use crate::composite::present;
use crate::{composite, EngineError, EngineResult, Image};

/// CPU "texture": a private copy of the LUT grid.
pub struct CpuLutTexture {
    lut: LutDocument,
}

impl CpuLutTexture {
    /// Uploaded grid.
    pub fn lut(&self) -> &LutDocument {
        &self.lut
    }
}

impl SamplingResource for CpuLutTexture {
    fn size(&self) -> usize {
        self.lut.size()
    }
}

/// Reference preview backend.
///
/// Renders with the same trilinear sampler as export, so preview and export
/// agree bit for bit.
#[derive(Debug, Default, Clone, Copy)]
pub struct CpuBackend;

impl CpuBackend {
    /// New CPU backend.
    pub fn new() -> Self {
        Self
    }
}

impl SamplingBackend for CpuBackend {
    type Resource = CpuLutTexture;

    fn upload(&self, lut: &LutDocument) -> EngineResult<CpuLutTexture> {
        trace!(size = lut.size(), "uploading CPU LUT texture");
        Ok(CpuLutTexture { lut: lut.clone() })
    }

    fn render(&self, uniforms: &ChainUniforms<'_, CpuLutTexture>, image: &Image) -> EngineResult<Image> {
        let c = image.channels() as usize;
        if c < 3 {
            return Err(EngineError::UnsupportedChannels(image.channels()));
        }
        let stages: Vec<(&LutDocument, f32)> = uniforms
            .stages()
            .iter()
            .map(|(tex, t)| (&tex.lut, *t))
            .collect();
        let show_original = uniforms.show_original();

        let mut dst = image.clone();
        if dst.data.is_empty() {
            return Ok(dst);
        }
        let row = dst.width() as usize * c;
        dst.data.par_chunks_mut(row).for_each(|line| {
            for px in line.chunks_exact_mut(c) {
                let original = [px[0], px[1], px[2]];
                let graded = composite(stages.iter().copied(), original);
                px[..3].copy_from_slice(&present(original, graded, show_original));
            }
        });
        Ok(dst)
    }

    fn name(&self) -> &'static str {
        "CPU"
    }
}
