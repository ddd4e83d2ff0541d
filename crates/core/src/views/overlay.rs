use std::collections::HashSet;

use bead_view_protocol::{Channel, IndexRange, LineStyle, Segment};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ViewerConfig;
use crate::model::{BeadRecord, BeadTable, ClassValue, IssueKind, RawSeries, RowIssue};

/// Legend text of the baseline traces.
pub const BASELINE_LEGEND: &str = "All Data";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OverlayError {
    #[error("label column '{column}' not found (available: {})", .available.join(", "))]
    InvalidConfiguration {
        column: String,
        available: Vec<String>,
    },
}

/// Everything needed to draw one recording with its bead highlights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Overlay {
    pub source_name: String,
    pub label_column: String,
    /// Two baselines (NIR, VIS) followed by the highlights, in draw order.
    pub segments: Vec<Segment>,
    /// Rows of this source that were left out, with the reason.
    pub skipped: Vec<RowIssue>,
}

impl Overlay {
    pub fn baselines(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter().filter(|s| s.is_baseline())
    }

    pub fn highlights(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter().filter(|s| !s.is_baseline())
    }

    /// Legend entries of the highlights, in legend order.
    pub fn legend(&self) -> Vec<&str> {
        self.highlights()
            .filter_map(|s| s.legend.as_deref())
            .collect()
    }
}

/// Build the bead overlay of one recording.
///
/// Records are matched to `source_name` by basename. Each record with a
/// label in `label_column` yields a NIR and a VIS segment sharing color,
/// style and hover text. Classes listed in the scheme's `prediction_order`
/// are emitted first, in that order; everything else follows in table
/// order. The first NIR segment of every class carries its legend entry.
///
/// Rows whose range does not fit the series are skipped and reported in
/// [`Overlay::skipped`] together with the table's own invalid rows for this
/// source. Only an unknown `label_column` fails the build.
pub fn build_overlay(
    series: &RawSeries,
    table: &BeadTable,
    source_name: &str,
    label_column: &str,
    config: &ViewerConfig,
) -> Result<Overlay, OverlayError> {
    if !table.has_column(label_column) {
        return Err(OverlayError::InvalidConfiguration {
            column: label_column.to_string(),
            available: table.label_options(),
        });
    }

    let mut segments = baselines(series, config);
    let mut skipped: Vec<RowIssue> = table.issues_for(source_name).cloned().collect();

    if config.options.highlight {
        let len = series.len();
        let mut rows: Vec<(&BeadRecord, &ClassValue)> = Vec::new();
        for record in table.records_for(source_name) {
            if record.end_index >= len {
                skipped.push(RowIssue {
                    row: record.row,
                    file: Some(record.file.clone()),
                    kind: IssueKind::OutOfRange {
                        start: record.start_index,
                        end: record.end_index,
                        len,
                    },
                });
                continue;
            }
            if let Some(class) = record.label(label_column) {
                rows.push((record, class));
            }
        }

        order_rows(&mut rows, config.scheme.prediction_order.as_deref());
        segments.extend(highlights(&rows, config));
    }

    if !skipped.is_empty() {
        tracing::warn!(
            source = source_name,
            count = skipped.len(),
            "skipped invalid bead rows"
        );
    }
    tracing::debug!(
        source = source_name,
        label_column,
        segments = segments.len(),
        "built overlay"
    );

    Ok(Overlay {
        source_name: source_name.to_string(),
        label_column: label_column.to_string(),
        segments,
        skipped,
    })
}

fn baselines(series: &RawSeries, config: &ViewerConfig) -> Vec<Segment> {
    let Some(range) = series.full_range() else {
        return Vec::new();
    };
    Channel::ALL
        .into_iter()
        .map(|channel| Segment {
            channel,
            range,
            color: config.baseline_color.clone(),
            style: LineStyle::Solid,
            legend: (channel == Channel::Nir).then(|| BASELINE_LEGEND.to_string()),
            hover: None,
            class: None,
        })
        .collect()
}

/// Stable reorder: classes of the declared order first, by their position in
/// it, then all other classes in their original order.
fn order_rows(rows: &mut [(&BeadRecord, &ClassValue)], order: Option<&[String]>) {
    let Some(order) = order else {
        return;
    };
    let ranks: Vec<ClassValue> = order.iter().filter_map(|c| ClassValue::parse(c)).collect();
    rows.sort_by_key(|(_, class)| {
        ranks
            .iter()
            .position(|ranked| ranked == *class)
            .unwrap_or(ranks.len())
    });
}

fn highlights(rows: &[(&BeadRecord, &ClassValue)], config: &ViewerConfig) -> Vec<Segment> {
    let style = config.scheme.class_style();
    let mut seen: HashSet<&ClassValue> = HashSet::new();
    let mut segments = Vec::with_capacity(rows.len() * 2);

    for &(record, class) in rows {
        let resolved = style.resolve(class);
        if !resolved.mapped {
            tracing::debug!(class = %class, row = record.row, "no style for class, using fallback");
        }
        let line = if config.dash_test_rows() && record.is_test == Some(true) {
            LineStyle::Dashed
        } else {
            LineStyle::Solid
        };
        let hover = format!(
            "Bead Number: {}\nClass: {}",
            record.bead_number, resolved.label
        );
        let first_of_class = seen.insert(class);
        let range = IndexRange::new(record.start_index, record.end_index);

        for channel in Channel::ALL {
            segments.push(Segment {
                channel,
                range,
                color: resolved.color.clone(),
                style: line,
                legend: (first_of_class && channel == Channel::Nir).then(|| resolved.legend()),
                hover: Some(hover.clone()),
                class: Some(class.to_string()),
            });
        }
    }
    segments
}
