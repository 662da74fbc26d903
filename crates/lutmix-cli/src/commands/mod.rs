//! CLI command implementations

pub mod apply;
pub mod bake;
pub mod info;
pub mod preview;
pub mod thumb;

use anyhow::{bail, Context, Result};
use image::{DynamicImage, ImageBuffer, Rgb, Rgba};
use lutmix_engine::{CpuBackend, Image, Session};
use std::path::Path;
use tracing::debug;

use crate::config::{ChainConfig, LutSpec};
use crate::ChainArgs;

/// Decoded photo plus what is needed to write it back.
pub struct Photo {
    pub image: Image,
    /// Source had more than 8 bits per channel.
    pub high_depth: bool,
}

/// Load photo from path as normalized f32 RGB(A).
pub fn load_photo(path: &Path) -> Result<Photo> {
    let decoded = image::open(path)
        .with_context(|| format!("Failed to load: {}", path.display()))?;
    let high_depth = decoded.color().bytes_per_pixel() / decoded.color().channel_count() > 1;
    let (w, h) = (decoded.width(), decoded.height());

    let image = if decoded.color().has_alpha() {
        Image::from_f32(decoded.to_rgba32f().into_raw(), w, h, 4)?
    } else {
        Image::from_f32(decoded.to_rgb32f().into_raw(), w, h, 3)?
    };
    debug!(width = w, height = h, channels = image.channels(), high_depth, "loaded photo");
    Ok(Photo { image, high_depth })
}

/// Save photo, clamping to [0, 1] and quantizing for the output format.
///
/// 16-bit output is used for PNG/TIFF when the source was 16-bit. Alpha is
/// dropped for formats without it.
pub fn save_photo(path: &Path, image: &Image, high_depth: bool) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    let supports_16 = matches!(ext.as_str(), "png" | "tif" | "tiff");
    let supports_alpha = !matches!(ext.as_str(), "jpg" | "jpeg");
    let (w, h, c) = image.dimensions();
    let keep_alpha = c == 4 && supports_alpha;

    let dynamic = if high_depth && supports_16 {
        let data = pack(image, keep_alpha, |v| (v * 65535.0).round() as u16);
        if keep_alpha {
            DynamicImage::ImageRgba16(buffer::<Rgba<u16>>(w, h, data)?)
        } else {
            DynamicImage::ImageRgb16(buffer::<Rgb<u16>>(w, h, data)?)
        }
    } else {
        let data = pack(image, keep_alpha, |v| (v * 255.0).round() as u8);
        if keep_alpha {
            DynamicImage::ImageRgba8(buffer::<Rgba<u8>>(w, h, data)?)
        } else {
            DynamicImage::ImageRgb8(buffer::<Rgb<u8>>(w, h, data)?)
        }
    };

    dynamic
        .save(path)
        .with_context(|| format!("Failed to save: {}", path.display()))
}

fn pack<T>(image: &Image, keep_alpha: bool, quantize: impl Fn(f32) -> T) -> Vec<T> {
    let c = image.channels() as usize;
    let out_c = if keep_alpha { 4 } else { 3 };
    let q = &quantize;
    image
        .data()
        .chunks_exact(c)
        .flat_map(move |px| px[..out_c].iter().map(move |v| q(v.clamp(0.0, 1.0))))
        .collect()
}

fn buffer<P: image::Pixel>(w: u32, h: u32, data: Vec<P::Subpixel>) -> Result<ImageBuffer<P, Vec<P::Subpixel>>> {
    match ImageBuffer::from_raw(w, h, data) {
        Some(buf) => Ok(buf),
        None => bail!("pixel buffer does not match {w}x{h}"),
    }
}

/// Resolve `--lut`/`--chain` into stages and the compare flag.
pub fn chain_specs(args: &ChainArgs) -> Result<(Vec<LutSpec>, bool)> {
    if let Some(path) = &args.chain {
        let config = ChainConfig::load(path)?;
        let show_original = config.show_original;
        return Ok((config.into_specs(), show_original));
    }
    Ok((args.luts.clone(), false))
}

/// Build a session holding every LUT of the chain, in order.
pub fn build_session(specs: &[LutSpec]) -> Result<Session<CpuBackend>> {
    let mut session = Session::new(CpuBackend::new());
    for spec in specs {
        let text = std::fs::read_to_string(&spec.path)
            .with_context(|| format!("Failed to read LUT: {}", spec.path.display()))?;
        let name = spec
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("lut");
        let id = session
            .import_cube(name, &text)
            .with_context(|| format!("Failed to import LUT: {}", spec.path.display()))?;
        session
            .add_to_chain_with(id, spec.intensity)
            .with_context(|| format!("Cannot add {} to chain", spec.path.display()))?;
    }
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn png_round_trip_keeps_alpha_and_depth() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        let img = Image::from_f32(vec![0.0, 0.5, 1.0, 0.25, 1.5, -0.2, 0.3, 1.0], 2, 1, 4).unwrap();

        save_photo(&path, &img, true).unwrap();
        let back = load_photo(&path).unwrap();
        assert!(back.high_depth);
        assert_eq!(back.image.dimensions(), (2, 1, 4));
        let d = back.image.data();
        assert!((d[1] - 0.5).abs() < 1e-4);
        assert!((d[3] - 0.25).abs() < 1e-4);
        // clamped on export
        assert_eq!(d[4], 1.0);
        assert_eq!(d[5], 0.0);
    }

    #[test]
    fn jpeg_drops_alpha() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jpg");
        let img = Image::from_f32(vec![0.5; 4 * 4 * 4], 4, 4, 4).unwrap();

        save_photo(&path, &img, false).unwrap();
        let back = load_photo(&path).unwrap();
        assert!(!back.high_depth);
        assert_eq!(back.image.channels(), 3);
    }
}
