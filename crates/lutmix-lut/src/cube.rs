//! Adobe/Resolve .cube LUT format support.
//!
//! # Format
//!
//! ```text
//! # Comment
//! TITLE "LUT Name"
//! LUT_3D_SIZE 33
//! DOMAIN_MIN 0 0 0
//! DOMAIN_MAX 1 1 1
//!
//! 0.000000 0.000000 0.000000
//! ...
//! 1.000000 1.000000 1.000000
//! ```
//!
//! Directives are matched case-insensitively. Unknown directives (including
//! `LUT_1D_SIZE`) are skipped. Data rows may carry 3 or 4 values; the channel
//! layout is decided once from the total value count, never per row.
//!
//! # Example
//!
//! ```rust
//! use lutmix_lut::{cube, LutDocument};
//!
//! let text = cube::serialize(&LutDocument::identity(2));
//! let lut = cube::parse(&text).unwrap();
//! assert_eq!(lut.size(), 2);
//! ```

use crate::{LutDocument, LutError, LutResult, DEFAULT_DOMAIN_MAX, DEFAULT_DOMAIN_MIN};
use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Cursor, Write};
use std::path::Path;
use tracing::debug;

/// Reads a 3D LUT from a .cube file.
pub fn read<P: AsRef<Path>>(path: P) -> LutResult<LutDocument> {
    let file = File::open(path.as_ref())?;
    parse_reader(BufReader::new(file))
}

/// Parses a 3D LUT from CUBE text.
pub fn parse(text: &str) -> LutResult<LutDocument> {
    parse_reader(Cursor::new(text))
}

/// Parses a 3D LUT from a reader.
pub fn parse_reader<R: BufRead>(reader: R) -> LutResult<LutDocument> {
    let mut title = String::new();
    let mut size: Option<usize> = None;
    let mut domain_min = DEFAULT_DOMAIN_MIN;
    let mut domain_max = DEFAULT_DOMAIN_MAX;
    let mut values: Vec<f32> = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line_no = i + 1;
        let line = line?;
        let line = if i == 0 { line.trim_start_matches('\u{feff}') } else { line.as_str() };
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut tokens = line.split_whitespace();
        let Some(first) = tokens.next() else {
            continue;
        };

        if let Ok(v) = first.parse::<f32>() {
            push_value(&mut values, v, line_no)?;
            for tok in tokens {
                let v = tok.parse::<f32>().map_err(|_| LutError::MalformedRow {
                    line: line_no,
                    text: line.to_string(),
                })?;
                push_value(&mut values, v, line_no)?;
            }
            continue;
        }

        let keyword = first.to_ascii_uppercase();
        match keyword.as_str() {
            "TITLE" => title = parse_title(&line[first.len()..]),
            "LUT_3D_SIZE" => size = Some(parse_size(tokens, line_no, first)?),
            "DOMAIN_MIN" => domain_min = parse_domain(tokens, line_no, first)?,
            "DOMAIN_MAX" => domain_max = parse_domain(tokens, line_no, first)?,
            _ => debug!(line = line_no, keyword = first, "skipping unsupported directive"),
        }
    }

    let size = size.ok_or(LutError::MissingSize)?;
    let entries = size * size * size;

    let lut = if values.len() == entries * 3 {
        debug!(size, title = %title, "parsed RGB cube");
        LutDocument::from_rgb(size, values)?
    } else if values.len() == entries * 4 {
        debug!(size, title = %title, "parsed RGBA cube");
        LutDocument::from_rgba(size, values)?
    } else {
        return Err(LutError::DataSizeMismatch {
            expected_rgb: entries,
            expected_rgba: entries * 4 / 3,
            actual: values.len() / 3,
            values: values.len(),
        });
    };

    Ok(lut.with_title(title).with_domain(domain_min, domain_max))
}

/// Serializes a document to CUBE text.
///
/// Alpha is dropped; RGB is written with 6 decimal digits.
pub fn serialize(lut: &LutDocument) -> String {
    let mut out = String::with_capacity(128 + lut.entry_count() * 27);
    write_header(&mut out, lut.title(), lut.size(), lut.domain_min(), lut.domain_max());
    write_rows(&mut out, lut.samples());
    out
}

/// Serializes a raw RGBA grid to CUBE text with the default domain.
pub fn serialize_samples(title: &str, size: usize, samples: &[f32]) -> LutResult<String> {
    if !(2..=crate::MAX_SIZE).contains(&size) {
        return Err(LutError::InvalidSize(size));
    }
    let expected = size * size * size * 4;
    if samples.len() != expected {
        return Err(LutError::SampleCountMismatch {
            expected,
            actual: samples.len(),
        });
    }
    let mut out = String::with_capacity(128 + samples.len() / 4 * 27);
    write_header(&mut out, title, size, DEFAULT_DOMAIN_MIN, DEFAULT_DOMAIN_MAX);
    write_rows(&mut out, samples);
    Ok(out)
}

/// Writes a 3D LUT to a .cube file.
pub fn write<P: AsRef<Path>>(path: P, lut: &LutDocument) -> LutResult<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    writer.write_all(serialize(lut).as_bytes())?;
    writer.flush()?;
    Ok(())
}

fn write_header(out: &mut String, title: &str, size: usize, min: [f32; 3], max: [f32; 3]) {
    // fmt::Write into a String cannot fail
    let _ = writeln!(out, "# Created by lutmix");
    let _ = writeln!(out, "TITLE \"{}\"", header_title(title));
    let _ = writeln!(out, "LUT_3D_SIZE {size}");
    let _ = writeln!(out, "DOMAIN_MIN {} {} {}", min[0], min[1], min[2]);
    let _ = writeln!(out, "DOMAIN_MAX {} {} {}", max[0], max[1], max[2]);
    let _ = writeln!(out);
}

/// Title text safe for a single quoted header line.
fn header_title(title: &str) -> String {
    title
        .chars()
        .map(|ch| match ch {
            '"' => '\'',
            c if c.is_control() => ' ',
            c => c,
        })
        .collect()
}

fn write_rows(out: &mut String, samples: &[f32]) {
    for t in samples.chunks_exact(4) {
        let _ = writeln!(out, "{:.6} {:.6} {:.6}", t[0], t[1], t[2]);
    }
}

// Helper functions

fn push_value(values: &mut Vec<f32>, v: f32, line: usize) -> LutResult<()> {
    if !v.is_finite() {
        return Err(LutError::NonFiniteValue { line });
    }
    values.push(v);
    Ok(())
}

fn parse_title(rest: &str) -> String {
    let rest = rest.trim();
    let rest = rest.strip_prefix('"').unwrap_or(rest);
    let rest = rest.strip_suffix('"').unwrap_or(rest);
    rest.to_string()
}

fn parse_size<'a>(
    mut tokens: impl Iterator<Item = &'a str>,
    line: usize,
    keyword: &str,
) -> LutResult<usize> {
    let size: usize = tokens
        .next()
        .and_then(|t| t.parse().ok())
        .ok_or_else(|| invalid_directive(line, keyword))?;
    if !(2..=crate::MAX_SIZE).contains(&size) {
        return Err(LutError::InvalidSize(size));
    }
    Ok(size)
}

fn parse_domain<'a>(
    mut tokens: impl Iterator<Item = &'a str>,
    line: usize,
    keyword: &str,
) -> LutResult<[f32; 3]> {
    let mut out = [0.0f32; 3];
    for slot in &mut out {
        let v: f32 = tokens
            .next()
            .and_then(|t| t.parse().ok())
            .ok_or_else(|| invalid_directive(line, keyword))?;
        if !v.is_finite() {
            return Err(LutError::NonFiniteValue { line });
        }
        *slot = v;
    }
    Ok(out)
}

fn invalid_directive(line: usize, keyword: &str) -> LutError {
    LutError::InvalidDirective {
        line,
        keyword: keyword.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const CORNERS: &str = r#"
# Test LUT
TITLE "Test Grade"
LUT_3D_SIZE 2
DOMAIN_MIN 0.0 0.0 0.0
DOMAIN_MAX 1.0 1.0 1.0

0.0 0.0 0.0
1.0 0.0 0.0
0.0 1.0 0.0
1.0 1.0 0.0
0.0 0.0 1.0
1.0 0.0 1.0
0.0 1.0 1.0
1.0 1.0 1.0
"#;

    #[test]
    fn parse_rgb_expands_alpha() {
        let lut = parse(CORNERS).expect("parse failed");
        assert_eq!(lut.size(), 2);
        assert_eq!(lut.title(), "Test Grade");
        assert_eq!(lut.samples().len(), 32);
        assert_eq!(lut.texel(1, 0, 0), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(lut.texel(1, 1, 1), [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn parse_rgba_keeps_alpha() {
        let mut text = String::from("LUT_3D_SIZE 2\n");
        for i in 0..8 {
            text.push_str(&format!("0.5 0.5 0.5 {}\n", i as f32 / 8.0));
        }
        let lut = parse(&text).unwrap();
        assert_eq!(lut.texel(1, 0, 0)[3], 0.125);
    }

    #[test]
    fn keywords_are_case_insensitive() {
        let text = CORNERS
            .replace("LUT_3D_SIZE", "lut_3d_size")
            .replace("TITLE", "Title")
            .replace("DOMAIN_MAX 1.0 1.0 1.0", "domain_max 2 2 2");
        let lut = parse(&text).unwrap();
        assert_eq!(lut.size(), 2);
        assert_eq!(lut.title(), "Test Grade");
        assert_eq!(lut.domain_max(), [2.0, 2.0, 2.0]);
    }

    #[test]
    fn unknown_directives_are_ignored() {
        let text = CORNERS.replace("TITLE", "LUT_1D_SIZE 1024\nLUT_1D_INPUT_RANGE 0 1\nTITLE");
        assert!(parse(&text).is_ok());
    }

    #[test]
    fn missing_title_is_empty() {
        let text = CORNERS.replace("TITLE \"Test Grade\"", "");
        assert_eq!(parse(&text).unwrap().title(), "");
    }

    #[test]
    fn missing_size() {
        let text = CORNERS.replace("LUT_3D_SIZE 2", "");
        assert!(matches!(parse(&text), Err(LutError::MissingSize)));
    }

    #[test]
    fn size_mismatch_reports_rows() {
        let mut text = String::from("LUT_3D_SIZE 3\n");
        for _ in 0..20 {
            text.push_str("0.1 0.2 0.3\n");
        }
        match parse(&text) {
            Err(LutError::DataSizeMismatch {
                expected_rgb,
                expected_rgba,
                actual,
                values,
            }) => {
                assert_eq!(expected_rgb, 27);
                assert_eq!(expected_rgba, 36);
                assert_eq!(actual, 20);
                assert_eq!(values, 60);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn size_mismatch_keeps_raw_value_count() {
        let err = parse("LUT_3D_SIZE 2\n0.1 0.2 0.3 0.4\n").unwrap_err();
        assert!(matches!(err, LutError::DataSizeMismatch { actual: 1, values: 4, .. }));
        let msg = err.to_string();
        assert!(msg.contains("24 or 32 values"), "{msg}");
        assert!(msg.contains("got 4"), "{msg}");
    }

    #[test]
    fn leading_bom_is_ignored() {
        let text = format!("\u{feff}{}", serialize(&LutDocument::identity(2)).replacen("# Created by lutmix\n", "", 1));
        assert!(text.starts_with("\u{feff}TITLE"));
        assert_eq!(parse(&text).unwrap().size(), 2);

        let sized = "\u{feff}LUT_3D_SIZE 2\n".to_string() + &"0 0 0\n".repeat(8);
        assert_eq!(parse(&sized).unwrap().size(), 2);
    }

    #[test]
    fn multiline_title_stays_on_one_line() {
        let lut = LutDocument::identity(2).with_title("look\n0 0 0\r\tend");
        let back = parse(&serialize(&lut)).unwrap();
        assert_eq!(back.title(), "look 0 0 0  end");
        assert_eq!(back.samples(), lut.samples());

        let quoted = LutDocument::identity(2).with_title("say \"hi\"");
        assert_eq!(parse(&serialize(&quoted)).unwrap().title(), "say 'hi'");
    }

    #[test]
    fn serialize_samples_checks_size_first() {
        assert!(matches!(
            serialize_samples("big", usize::MAX / 2, &[]),
            Err(LutError::InvalidSize(_))
        ));
        assert!(matches!(serialize_samples("one", 1, &[]), Err(LutError::InvalidSize(1))));
        assert!(serialize_samples("ok", 2, &[0.0; 32]).is_ok());
    }

    #[test]
    fn ambiguous_total_is_read_as_rgb() {
        // 6 rows of 4 values == 8 rows of 3 values for size 2
        let mut text = String::from("LUT_3D_SIZE 2\n");
        for _ in 0..6 {
            text.push_str("0.1 0.2 0.3 0.4\n");
        }
        let lut = parse(&text).unwrap();
        assert_eq!(lut.texel(0, 0, 0), [0.1, 0.2, 0.3, 1.0]);
        assert_eq!(lut.texel(1, 0, 0), [0.4, 0.1, 0.2, 1.0]);
    }

    #[test]
    fn malformed_payloads() {
        assert!(matches!(
            parse("LUT_3D_SIZE abc\n"),
            Err(LutError::InvalidDirective { line: 1, .. })
        ));
        assert!(matches!(
            parse("LUT_3D_SIZE 1\n0 0 0\n"),
            Err(LutError::InvalidSize(1))
        ));
        assert!(matches!(
            parse("LUT_3D_SIZE 2\nDOMAIN_MIN 0 0\n"),
            Err(LutError::InvalidDirective { line: 2, .. })
        ));
        assert!(matches!(
            parse("LUT_3D_SIZE 2\n0.0 zero 0.0\n"),
            Err(LutError::MalformedRow { line: 2, .. })
        ));
        assert!(matches!(
            parse("LUT_3D_SIZE 2\n0.0 nan 0.0\n"),
            Err(LutError::NonFiniteValue { line: 2 })
        ));
    }

    #[test]
    fn serialize_layout() {
        let text = serialize(&LutDocument::identity(2).with_title("id"));
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with('#'));
        assert_eq!(lines[1], "TITLE \"id\"");
        assert_eq!(lines[2], "LUT_3D_SIZE 2");
        assert_eq!(lines[3], "DOMAIN_MIN 0 0 0");
        assert_eq!(lines[4], "DOMAIN_MAX 1 1 1");
        assert_eq!(lines[5], "");
        assert_eq!(lines[6], "0.000000 0.000000 0.000000");
        assert_eq!(lines[7], "1.000000 0.000000 0.000000");
        assert_eq!(lines.len(), 6 + 8);
    }

    #[test]
    fn serialize_samples_checks_length() {
        assert!(matches!(
            serialize_samples("x", 2, &[0.0; 24]),
            Err(LutError::SampleCountMismatch { expected: 32, actual: 24 })
        ));
    }

    #[test]
    fn round_trip_within_tolerance() {
        let lut = LutDocument::from_fn(7, |r, g, b| {
            [(r * 0.731).sin(), g * g * 0.917, (b + r * 0.3) / 1.3]
        })
        .unwrap()
        .with_title("curve");
        let back = parse(&serialize(&lut)).unwrap();
        assert_eq!(back.size(), 7);
        assert_eq!(back.title(), "curve");
        for (a, b) in lut.samples().iter().zip(back.samples()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-6);
        }
    }
}
