//! # lutmix-lut
//!
//! 3D Look-Up Table (LUT) documents for photo grading.
//!
//! This crate holds the numeric core shared by every LUT consumer in
//! lutmix: the immutable [`LutDocument`], the `.cube` codec and the
//! trilinear [`sample`] function.
//!
//! # Usage
//!
//! ```rust
//! use lutmix_lut::{cube, sample, LutDocument};
//!
//! let lut = LutDocument::identity(33);
//! let rgb = sample(&lut, [0.5, 0.3, 0.2]);
//! assert!((rgb[0] - 0.5).abs() < 1e-5);
//!
//! let text = cube::serialize(&lut);
//! let again = cube::parse(&text).unwrap();
//! assert_eq!(again.size(), 33);
//! ```
//!
//! # Dependencies
//!
//! - [`thiserror`] - Error handling
//! - [`tracing`] - Parse diagnostics
//!
//! # Used By
//!
//! - `lutmix-engine` - Chain compositing, baking and backend caching
//! - `lutmix-cli` - LUT import and export

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod document;
mod error;
pub mod cube;
pub mod sampler;

pub use document::{LutDocument, DEFAULT_DOMAIN_MAX, DEFAULT_DOMAIN_MIN, MAX_SIZE};
pub use error::{LutError, LutResult};
pub use sampler::{mix, sample, EPSILON};
