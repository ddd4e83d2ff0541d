use serde::{Deserialize, Serialize};

use crate::types::Color;

/// One of the two signal columns of a raw recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    /// First CSV column.
    Nir,
    /// Second CSV column.
    Vis,
}

impl Channel {
    pub const ALL: [Channel; 2] = [Channel::Nir, Channel::Vis];

    /// Zero-based column position in the raw CSV.
    pub fn column(self) -> usize {
        match self {
            Self::Nir => 0,
            Self::Vis => 1,
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nir => write!(f, "NIR"),
            Self::Vis => write!(f, "VIS"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
}

/// Inclusive index range into a raw series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRange {
    pub start: usize,
    pub end: usize,
}

impl IndexRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// A renderable piece of a line chart: a sub-range of one channel drawn in
/// one color.
///
/// Segments are emitted in draw order; a later segment paints over an
/// earlier one and legend entries appear in the order their segments do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub channel: Channel,
    pub range: IndexRange,
    pub color: Color,
    pub style: LineStyle,
    /// Legend text; `None` keeps the segment out of the legend.
    pub legend: Option<String>,
    pub hover: Option<String>,
    /// Raw class value for bead highlights, `None` for baseline traces.
    pub class: Option<String>,
}

impl Segment {
    pub fn is_baseline(&self) -> bool {
        self.class.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_json_shape() {
        let json = serde_json::to_value(IndexRange::new(2, 4)).unwrap_or_default();
        assert_eq!(json, serde_json::json!({"start": 2, "end": 4}));
    }

    #[test]
    fn channel_columns() {
        assert_eq!(Channel::Nir.column(), 0);
        assert_eq!(Channel::Vis.column(), 1);
        assert_eq!(Channel::Vis.to_string(), "VIS");
    }

    #[test]
    fn segment_json_shape() {
        let seg = Segment {
            channel: Channel::Nir,
            range: IndexRange::new(0, 9),
            color: Color::gray(),
            style: LineStyle::Solid,
            legend: Some("All Data".into()),
            hover: None,
            class: None,
        };
        let json = serde_json::to_value(&seg).unwrap_or_default();
        assert_eq!(json["channel"], "Nir");
        assert_eq!(json["range"]["end"], 9);
        assert_eq!(json["color"], "gray");
        assert!(seg.is_baseline());
    }
}
