//! In-memory 3D LUT document.
//!
//! A document is the single hand-off structure between the codec, the
//! sampler, the compositor and the backend cache. It is built once (by the
//! CUBE parser or by baking) and never mutated afterwards; callers share it
//! behind an `Arc`.

use crate::{LutError, LutResult};

/// Largest grid resolution accepted per axis.
pub const MAX_SIZE: usize = 256;

/// Default input domain minimum.
pub const DEFAULT_DOMAIN_MIN: [f32; 3] = [0.0, 0.0, 0.0];

/// Default input domain maximum.
pub const DEFAULT_DOMAIN_MAX: [f32; 3] = [1.0, 1.0, 1.0];

/// A parsed 3D lookup table.
///
/// # Structure
///
/// - `size^3` RGBA texels, flattened to `size^3 * 4` floats
/// - R varies fastest, then G, then B: `index = r + g*size + b*size^2`
/// - Alpha is 1.0 unless the source authored it
///
/// Sample values are not range-limited; HDR LUTs may legally produce values
/// outside [0, 1].
///
/// # Example
///
/// ```rust
/// use lutmix_lut::LutDocument;
///
/// let lut = LutDocument::identity(17);
/// assert_eq!(lut.samples().len(), 17 * 17 * 17 * 4);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LutDocument {
    title: String,
    size: usize,
    domain_min: [f32; 3],
    domain_max: [f32; 3],
    samples: Vec<f32>,
}

impl LutDocument {
    /// Creates a document from flattened RGBA samples.
    pub fn from_rgba(size: usize, samples: Vec<f32>) -> LutResult<Self> {
        check_size(size)?;
        let expected = size * size * size * 4;
        if samples.len() != expected {
            return Err(LutError::SampleCountMismatch {
                expected,
                actual: samples.len(),
            });
        }
        if samples.iter().any(|v| !v.is_finite()) {
            return Err(LutError::NonFiniteValue { line: 0 });
        }
        Ok(Self {
            title: String::new(),
            size,
            domain_min: DEFAULT_DOMAIN_MIN,
            domain_max: DEFAULT_DOMAIN_MAX,
            samples,
        })
    }

    /// Creates a document from flattened RGB samples, expanding alpha to 1.0.
    pub fn from_rgb(size: usize, rgb: Vec<f32>) -> LutResult<Self> {
        check_size(size)?;
        let expected = size * size * size * 3;
        if rgb.len() != expected {
            return Err(LutError::SampleCountMismatch {
                expected,
                actual: rgb.len(),
            });
        }
        let mut samples = Vec::with_capacity(expected / 3 * 4);
        for texel in rgb.chunks_exact(3) {
            samples.extend_from_slice(texel);
            samples.push(1.0);
        }
        Self::from_rgba(size, samples)
    }

    /// Creates an identity (pass-through) LUT.
    ///
    /// ```rust
    /// use lutmix_lut::LutDocument;
    ///
    /// let lut = LutDocument::identity(2);
    /// assert_eq!(lut.texel(1, 0, 1), [1.0, 0.0, 1.0, 1.0]);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `size` is outside `2..=MAX_SIZE`.
    pub fn identity(size: usize) -> Self {
        Self::from_fn(size, |r, g, b| [r, g, b])
            .unwrap_or_else(|e| panic!("identity LUT: {e}"))
    }

    /// Builds a LUT by evaluating `f` at every grid point.
    ///
    /// `f` receives the normalized grid coordinate `i / (size - 1)` on each
    /// axis, in R-fastest order.
    pub fn from_fn<F>(size: usize, mut f: F) -> LutResult<Self>
    where
        F: FnMut(f32, f32, f32) -> [f32; 3],
    {
        check_size(size)?;
        let n = (size - 1) as f32;
        let mut samples = Vec::with_capacity(size * size * size * 4);
        for b in 0..size {
            for g in 0..size {
                for r in 0..size {
                    let out = f(r as f32 / n, g as f32 / n, b as f32 / n);
                    samples.extend_from_slice(&[out[0], out[1], out[2], 1.0]);
                }
            }
        }
        Self::from_rgba(size, samples)
    }

    /// Sets the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the input domain.
    pub fn with_domain(mut self, min: [f32; 3], max: [f32; 3]) -> Self {
        self.domain_min = min;
        self.domain_max = max;
        self
    }

    /// Title, empty when the source had none.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Grid resolution per axis.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Input domain minimum.
    #[inline]
    pub fn domain_min(&self) -> [f32; 3] {
        self.domain_min
    }

    /// Input domain maximum.
    #[inline]
    pub fn domain_max(&self) -> [f32; 3] {
        self.domain_max
    }

    /// Flattened RGBA samples.
    #[inline]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Number of grid texels (`size^3`).
    #[inline]
    pub fn entry_count(&self) -> usize {
        self.size * self.size * self.size
    }

    /// Whether the domain is the default unit cube.
    pub fn has_default_domain(&self) -> bool {
        self.domain_min == DEFAULT_DOMAIN_MIN && self.domain_max == DEFAULT_DOMAIN_MAX
    }

    /// Texel index for grid position (r, g, b).
    #[inline]
    pub fn index(&self, r: usize, g: usize, b: usize) -> usize {
        r + g * self.size + b * self.size * self.size
    }

    /// RGBA texel at grid position (r, g, b).
    #[inline]
    pub fn texel(&self, r: usize, g: usize, b: usize) -> [f32; 4] {
        let i = self.index(r, g, b) * 4;
        [
            self.samples[i],
            self.samples[i + 1],
            self.samples[i + 2],
            self.samples[i + 3],
        ]
    }

    /// Smallest and largest RGB value stored in the grid.
    pub fn value_range(&self) -> (f32, f32) {
        self.samples
            .chunks_exact(4)
            .flat_map(|t| t[..3].iter().copied())
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            })
    }
}

fn check_size(size: usize) -> LutResult<()> {
    if !(2..=MAX_SIZE).contains(&size) {
        return Err(LutError::InvalidSize(size));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_layout_is_red_fastest() {
        let lut = LutDocument::identity(3);
        assert_eq!(lut.texel(2, 0, 0), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(lut.texel(0, 2, 0), [0.0, 1.0, 0.0, 1.0]);
        assert_eq!(lut.texel(0, 0, 2), [0.0, 0.0, 1.0, 1.0]);
        assert_eq!(lut.index(1, 0, 0), 1);
        assert_eq!(lut.index(0, 1, 0), 3);
        assert_eq!(lut.index(0, 0, 1), 9);
    }

    #[test]
    fn from_rgb_expands_alpha() {
        let rgb = vec![0.25; 8 * 3];
        let lut = LutDocument::from_rgb(2, rgb).unwrap();
        assert_eq!(lut.samples().len(), 32);
        assert!(lut.samples().chunks_exact(4).all(|t| t[3] == 1.0));
    }

    #[test]
    fn rejects_size_one() {
        assert!(matches!(
            LutDocument::from_rgba(1, vec![0.0; 4]),
            Err(LutError::InvalidSize(1))
        ));
    }

    #[test]
    fn rejects_wrong_length() {
        let err = LutDocument::from_rgba(2, vec![0.0; 31]).unwrap_err();
        assert!(matches!(
            err,
            LutError::SampleCountMismatch { expected: 32, actual: 31 }
        ));
    }

    #[test]
    fn rejects_non_finite() {
        let mut samples = vec![0.0; 32];
        samples[5] = f32::NAN;
        assert!(matches!(
            LutDocument::from_rgba(2, samples),
            Err(LutError::NonFiniteValue { .. })
        ));
    }

    #[test]
    fn value_range_allows_hdr() {
        let lut = LutDocument::from_fn(2, |r, g, b| [r * 4.0, g - 0.5, b]).unwrap();
        assert_eq!(lut.value_range(), (-0.5, 4.0));
    }
}
