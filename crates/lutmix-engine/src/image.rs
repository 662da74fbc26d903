//! Float image buffer used by preview, thumbnail and export paths.

use crate::{EngineError, EngineResult};

/// Interleaved f32 image, values nominally in [0, 1].
///
/// Always non-empty with 3 or 4 channels and `width * height * channels`
/// samples; every constructor checks this.
#[derive(Clone, PartialEq)]
pub struct Image {
    pub(crate) data: Vec<f32>,
    width: u32,
    height: u32,
    channels: u32,
}

impl Image {
    /// Create from f32 data.
    pub fn from_f32(data: Vec<f32>, width: u32, height: u32, channels: u32) -> EngineResult<Self> {
        check_shape(width, height, channels)?;
        let expected = (width as usize) * (height as usize) * (channels as usize);
        if data.len() != expected {
            return Err(EngineError::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { data, width, height, channels })
    }

    /// Create image filled with zeros.
    pub fn new(width: u32, height: u32, channels: u32) -> EngineResult<Self> {
        check_shape(width, height, channels)?;
        Ok(Self::zeroed(width, height, channels))
    }

    fn zeroed(width: u32, height: u32, channels: u32) -> Self {
        let size = (width as usize) * (height as usize) * (channels as usize);
        Self {
            data: vec![0.0; size],
            width,
            height,
            channels,
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Channels per pixel (3 or 4).
    pub fn channels(&self) -> u32 {
        self.channels
    }

    /// Get pixel data.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Get mutable pixel data.
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Consume into raw pixel data.
    pub fn into_data(self) -> Vec<f32> {
        self.data
    }

    /// Image dimensions.
    pub fn dimensions(&self) -> (u32, u32, u32) {
        (self.width, self.height, self.channels)
    }

    /// Size in bytes.
    pub fn size_bytes(&self) -> usize {
        self.data.len() * 4
    }

    /// RGB of pixel (x, y).
    pub fn rgb(&self, x: u32, y: u32) -> [f32; 3] {
        let i = ((y as usize) * (self.width as usize) + x as usize) * self.channels as usize;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    /// Copy out a rectangular region.
    pub fn crop(&self, x: u32, y: u32, w: u32, h: u32) -> EngineResult<Self> {
        if w == 0 || h == 0 || x.saturating_add(w) > self.width || y.saturating_add(h) > self.height {
            return Err(EngineError::InvalidDimensions(w, h));
        }
        let c = self.channels as usize;
        let stride = self.width as usize * c;
        let mut data = Vec::with_capacity(w as usize * h as usize * c);
        for row in y as usize..(y + h) as usize {
            let start = row * stride + x as usize * c;
            data.extend_from_slice(&self.data[start..start + w as usize * c]);
        }
        Ok(Self { data, width: w, height: h, channels: self.channels })
    }

    /// Box-filter downscale so the longer side is at most `max_side`.
    ///
    /// Images already within the bound are returned unchanged.
    pub fn downscale_to_fit(&self, max_side: u32) -> Self {
        let longest = self.width.max(self.height);
        if max_side == 0 || longest <= max_side {
            return self.clone();
        }
        let scale = max_side as f64 / longest as f64;
        let dw = ((self.width as f64 * scale).round() as u32).max(1);
        let dh = ((self.height as f64 * scale).round() as u32).max(1);
        let c = self.channels as usize;
        let (sw, sh) = (self.width as usize, self.height as usize);

        // dw, dh >= 1 and channels are inherited, so the shape stays valid
        let mut out = Self::zeroed(dw, dh, self.channels);
        for dy in 0..dh as usize {
            let y0 = dy * sh / dh as usize;
            let y1 = ((dy + 1) * sh / dh as usize).max(y0 + 1);
            for dx in 0..dw as usize {
                let x0 = dx * sw / dw as usize;
                let x1 = ((dx + 1) * sw / dw as usize).max(x0 + 1);
                let mut acc = [0.0f32; 4];
                for sy in y0..y1 {
                    for sx in x0..x1 {
                        let i = (sy * sw + sx) * c;
                        for (ch, a) in acc.iter_mut().enumerate().take(c) {
                            *a += self.data[i + ch];
                        }
                    }
                }
                let inv = 1.0 / ((y1 - y0) * (x1 - x0)) as f32;
                let o = (dy * dw as usize + dx) * c;
                for ch in 0..c {
                    out.data[o + ch] = acc[ch] * inv;
                }
            }
        }
        out
    }
}

fn check_shape(width: u32, height: u32, channels: u32) -> EngineResult<()> {
    if width == 0 || height == 0 {
        return Err(EngineError::InvalidDimensions(width, height));
    }
    if !(3..=4).contains(&channels) {
        return Err(EngineError::UnsupportedChannels(channels));
    }
    Ok(())
}

impl std::fmt::Debug for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Image")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("channels", &self.channels)
            .field("size_bytes", &self.size_bytes())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_buffers() {
        assert!(matches!(
            Image::from_f32(vec![0.0; 5], 1, 2, 3),
            Err(EngineError::BufferSizeMismatch { expected: 6, actual: 5 })
        ));
        assert!(matches!(
            Image::from_f32(vec![0.0; 2], 1, 1, 2),
            Err(EngineError::UnsupportedChannels(2))
        ));
        assert!(matches!(
            Image::from_f32(vec![], 0, 1, 3),
            Err(EngineError::InvalidDimensions(0, 1))
        ));
    }

    #[test]
    fn new_checks_shape() {
        assert!(matches!(Image::new(0, 5, 3), Err(EngineError::InvalidDimensions(0, 5))));
        assert!(matches!(Image::new(8, 8, 5), Err(EngineError::UnsupportedChannels(5))));
        let img = Image::new(2, 3, 4).unwrap();
        assert_eq!(img.dimensions(), (2, 3, 4));
        assert!(img.data().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn downscale_thin_strip() {
        let img = Image::new(1, 600, 4).unwrap();
        let small = img.downscale_to_fit(100);
        assert_eq!(small.dimensions(), (1, 100, 4));
    }

    #[test]
    fn downscale_averages_blocks() {
        // 4x2 RGB, left half black, right half white
        let mut data = Vec::new();
        for _y in 0..2 {
            for x in 0..4 {
                let v = if x < 2 { 0.0 } else { 1.0 };
                data.extend_from_slice(&[v, v, v]);
            }
        }
        let img = Image::from_f32(data, 4, 2, 3).unwrap();
        let small = img.downscale_to_fit(2);
        assert_eq!(small.dimensions(), (2, 1, 3));
        assert_eq!(small.rgb(0, 0), [0.0, 0.0, 0.0]);
        assert_eq!(small.rgb(1, 0), [1.0, 1.0, 1.0]);
    }

    #[test]
    fn downscale_keeps_small_images() {
        let img = Image::from_f32(vec![0.5; 12], 2, 2, 3).unwrap();
        assert_eq!(img.downscale_to_fit(64), img);
    }

    #[test]
    fn crop_copies_region() {
        let data: Vec<f32> = (0..9 * 3).map(|v| v as f32).collect();
        let img = Image::from_f32(data, 3, 3, 3).unwrap();
        let c = img.crop(1, 1, 2, 2).unwrap();
        assert_eq!(c.rgb(0, 0), img.rgb(1, 1));
        assert_eq!(c.rgb(1, 1), img.rgb(2, 2));
        assert!(img.crop(2, 2, 2, 2).is_err());
    }
}
