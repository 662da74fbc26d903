//! LUT error types.

use thiserror::Error;

/// Result type for LUT operations.
pub type LutResult<T> = Result<T, LutError>;

/// Errors that can occur while building, parsing or writing a LUT.
#[derive(Debug, Error)]
pub enum LutError {
    /// No `LUT_3D_SIZE` directive was found.
    #[error("missing LUT_3D_SIZE directive")]
    MissingSize,

    /// The number of data values fits neither a 3- nor a 4-channel grid.
    ///
    /// Row counts are parsed values divided by three, rounded down; `values`
    /// keeps the exact total.
    #[error(
        "data size mismatch: expected {} or {} values ({expected_rgb} or {expected_rgba} rows), got {values} ({actual} rows)",
        .expected_rgb * 3,
        .expected_rgb * 4
    )]
    DataSizeMismatch {
        /// Row count for a 3-channel grid (`size^3`).
        expected_rgb: usize,
        /// Row-equivalent count for a 4-channel grid (`size^3 * 4 / 3`).
        expected_rgba: usize,
        /// Row-equivalent count actually collected.
        actual: usize,
        /// Numeric values actually collected.
        values: usize,
    },

    /// Grid size outside the supported range.
    #[error("invalid LUT size: {0} (must be between 2 and 256)")]
    InvalidSize(usize),

    /// Flattened sample buffer has the wrong length for its size.
    #[error("sample count mismatch: expected {expected} floats, got {actual}")]
    SampleCountMismatch {
        /// `size^3 * 4`
        expected: usize,
        /// Supplied length
        actual: usize,
    },

    /// A sample or domain value is NaN or infinite.
    #[error("non-finite value at line {line}")]
    NonFiniteValue {
        /// 1-based source line, 0 when not parsed from text
        line: usize,
    },

    /// A recognized directive carries an unusable payload.
    #[error("invalid {keyword} directive at line {line}")]
    InvalidDirective {
        /// 1-based source line
        line: usize,
        /// Directive keyword as written in the file
        keyword: String,
    },

    /// A data row contains a token that is not a number.
    #[error("malformed data row at line {line}: {text}")]
    MalformedRow {
        /// 1-based source line
        line: usize,
        /// Offending line
        text: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
