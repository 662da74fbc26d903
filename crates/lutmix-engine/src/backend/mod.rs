//! Sampling backends for interactive preview.
//!
//! A backend turns a [`LutDocument`] into a resource it can sample quickly
//! (a 3D texture on a GPU, a packed buffer on the CPU) and renders a chain
//! of up to five such resources over an image.
//!
//! # Architecture
//!
//! ```text
//! LutCache<B: SamplingBackend>
//!     +-- B::Resource: SamplingResource  (one per LutId)
//!     +-- B::render(ChainUniforms)       (<= 5 stages + compare flag)
//!             +-- CpuBackend (rayon, same numerics as export)
//! ```
//!
//! A backend may evaluate the chain however it likes as long as it reaches
//! the compositor's numbers: red, green, then blue blending, and a
//! `mix(color, lut(color), t)` per stage.

mod cpu;

pub use cpu::{CpuBackend, CpuLutTexture};

use bytemuck::{Pod, Zeroable};
use lutmix_lut::LutDocument;

use crate::{EngineError, EngineResult, Image, MAX_CHAIN_LEN};

/// A backend-owned, uploaded copy of one LUT grid.
pub trait SamplingResource: Send + Sync {
    /// Grid resolution per axis.
    fn size(&self) -> usize;

    /// Memory used by the resource.
    fn size_bytes(&self) -> u64 {
        let s = self.size() as u64;
        s * s * s * 4 * 4 // RGBA f32
    }
}

/// Core preview operations.
pub trait SamplingBackend {
    /// Backend-specific resource type.
    type Resource: SamplingResource;

    /// Upload a LUT grid.
    fn upload(&self, lut: &LutDocument) -> EngineResult<Self::Resource>;

    /// Release a resource created by [`upload`](Self::upload).
    fn release(&self, resource: Self::Resource) {
        drop(resource);
    }

    /// Render the chain described by `uniforms` over `image`.
    fn render(&self, uniforms: &ChainUniforms<'_, Self::Resource>, image: &Image) -> EngineResult<Image>;

    /// Backend name.
    fn name(&self) -> &'static str;
}

/// Per-frame chain description handed to a backend.
///
/// Holds at most [`MAX_CHAIN_LEN`] `(resource, intensity)` stages plus the
/// global compare flag.
pub struct ChainUniforms<'a, R> {
    stages: Vec<(&'a R, f32)>,
    show_original: bool,
}

impl<'a, R> ChainUniforms<'a, R> {
    /// Empty uniforms.
    pub fn new(show_original: bool) -> Self {
        Self { stages: Vec::with_capacity(MAX_CHAIN_LEN), show_original }
    }

    /// Append a stage.
    pub fn push(&mut self, resource: &'a R, intensity: f32) -> EngineResult<()> {
        if self.stages.len() >= MAX_CHAIN_LEN {
            return Err(EngineError::ChainCapacity { capacity: MAX_CHAIN_LEN });
        }
        self.stages.push((resource, intensity));
        Ok(())
    }

    /// Stages in application order.
    pub fn stages(&self) -> &[(&'a R, f32)] {
        &self.stages
    }

    /// Number of active stages.
    pub fn count(&self) -> usize {
        self.stages.len()
    }

    /// Compare flag.
    pub fn show_original(&self) -> bool {
        self.show_original
    }

    /// Packed uniform block for shader upload.
    pub fn params(&self) -> ChainParams {
        let mut intensity = [0.0f32; 8];
        for (slot, (_, t)) in intensity.iter_mut().zip(&self.stages) {
            *slot = *t;
        }
        ChainParams {
            count: self.stages.len() as u32,
            show_original: self.show_original as u32,
            _pad: [0; 2],
            intensity,
        }
    }
}

/// Uniform block layout: `count`, `show_original`, padding, then five
/// intensities padded to eight for 16-byte alignment.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct ChainParams {
    /// Active stage count (0..=5).
    pub count: u32,
    /// 1 when the original image should be shown.
    pub show_original: u32,
    _pad: [u32; 2],
    /// Per-stage intensity; slots past `count` are zero.
    pub intensity: [f32; 8],
}

impl ChainParams {
    /// Raw bytes for buffer upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}
