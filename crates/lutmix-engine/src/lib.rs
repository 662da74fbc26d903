//! LUT chain compositing engine.
//!
//! Applies an ordered, intensity-weighted chain of 3D LUTs to colors and
//! images, bakes the chain into a single merged LUT, and caches per-LUT
//! sampling resources for preview backends.
//!
//! # Architecture
//!
//! ```text
//! Session<B> (explicit context: library + chain + cache + backend)
//!     +-- Library         (LutId -> Arc<LutDocument>)
//!     +-- LutChain        (<= 5 entries, ordered)
//!     +-- LutCache<B>     (LutId -> B::Resource, no eviction)
//!     +-- B: SamplingBackend
//!             +-- CpuBackend (rayon, reference numerics)
//! ```
//!
//! Export never goes through a backend: [`composite::apply_chain`] and
//! [`bake::bake`] call the trilinear sampler directly.
//!
//! # Example
//!
//! ```rust
//! use lutmix_engine::{CpuBackend, Image, Session};
//!
//! let mut session = Session::new(CpuBackend::new());
//! let text = lutmix_lut::cube::serialize(&lutmix_lut::LutDocument::identity(4));
//! let id = session.import_cube("identity", &text).unwrap();
//! session.add_to_chain(id).unwrap();
//!
//! let photo = Image::from_f32(vec![0.2, 0.4, 0.6], 1, 1, 3).unwrap();
//! let out = session.export_photo(&photo).unwrap();
//! assert!((out.data()[1] - 0.4).abs() < 1e-4);
//! ```

pub mod backend;
pub mod bake;
pub mod cache;
pub mod chain;
pub mod composite;
pub mod image;
pub mod session;

pub use backend::{ChainParams, ChainUniforms, CpuBackend, CpuLutTexture, SamplingBackend, SamplingResource};
pub use bake::{bake, bake_with_size, export_cube, BAKE_SIZE};
pub use cache::{CacheStats, LutCache};
pub use chain::{ChainEntry, LutChain, MAX_CHAIN_LEN};
pub use composite::{apply_chain, composite, present, render_thumbnail};
pub use image::Image;
pub use session::{Library, LibraryEntry, LutId, Session};

use lutmix_lut::LutError;
use thiserror::Error;

/// Engine operation errors
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("chain is full: at most {capacity} LUTs can be stacked")]
    ChainCapacity { capacity: usize },

    #[error("chain index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("unknown LUT id {0}")]
    UnknownLut(LutId),

    #[error("Buffer size mismatch: expected {expected}, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    #[error("Invalid dimensions: {0}x{1}")]
    InvalidDimensions(u32, u32),

    #[error("unsupported channel count {0} (need 3 or 4)")]
    UnsupportedChannels(u32),

    #[error("backend operation failed: {0}")]
    Backend(String),

    #[error(transparent)]
    Lut(#[from] LutError),
}

pub type EngineResult<T> = Result<T, EngineError>;
