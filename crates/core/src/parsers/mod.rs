pub mod metadata;
pub mod series;

pub use metadata::{MetadataParseError, parse_bead_table};
pub use series::{SeriesParseError, parse_series};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("series: {0}")]
    Series(#[from] SeriesParseError),
    #[error("metadata: {0}")]
    Metadata(#[from] MetadataParseError),
}

/// Final path component of `path`, accepting both `/` and `\` separators.
///
/// Archive member names and metadata `file` cells disagree on directory
/// prefixes, so sources are always matched on this.
pub fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Parse an integral cell such as `12` or `12.0` into a non-negative index.
pub(crate) fn parse_index(raw: &str) -> Option<usize> {
    let text = raw.trim();
    if let Ok(n) = text.parse::<usize>() {
        return Some(n);
    }
    let n = text.parse::<f64>().ok()?;
    if n.is_finite() && n >= 0.0 && n.fract() == 0.0 && n < usize::MAX as f64 {
        Some(n as usize)
    } else {
        None
    }
}
