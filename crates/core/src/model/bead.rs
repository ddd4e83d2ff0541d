use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::parsers::basename;

/// Columns with a fixed meaning; every other metadata column holds labels.
pub const FILE_COLUMN: &str = "file";
pub const START_COLUMN: &str = "start_index";
pub const END_COLUMN: &str = "end_index";
pub const BEAD_NUMBER_COLUMN: &str = "bead_number";
pub const IS_TEST_COLUMN: &str = "is_test";
pub const RESERVED_COLUMNS: [&str; 5] = [
    FILE_COLUMN,
    START_COLUMN,
    END_COLUMN,
    BEAD_NUMBER_COLUMN,
    IS_TEST_COLUMN,
];

/// Ground-truth column offered ahead of the model predictions.
pub const GROUND_TRUTH_COLUMN: &str = "refined_label";
/// Marker in the names of model prediction columns.
pub const PREDICTION_MARKER: &str = "_Prediction";

const NULL_SPELLINGS: [&str; 6] = ["nan", "na", "n/a", "null", "none", "<na>"];

/// A non-missing class label.
///
/// Numeric labels are canonicalized (`1`, `1.0` and `1.00` all read as
/// `"1.0"`) so that float-coded exports and integer-coded config agree.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassValue(String);

impl ClassValue {
    /// Parse a raw cell. Returns `None` for empty cells and null spellings.
    pub fn parse(raw: &str) -> Option<Self> {
        let text = raw.trim();
        if text.is_empty() || NULL_SPELLINGS.iter().any(|n| text.eq_ignore_ascii_case(n)) {
            return None;
        }
        if let Ok(n) = text.parse::<f64>()
            && n.is_finite()
        {
            return Some(Self(format!("{n:?}")));
        }
        Some(Self(text.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ClassValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One validated row of the bead metadata table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeadRecord {
    /// 1-based data row in the metadata file.
    pub row: usize,
    pub file: String,
    /// Inclusive bounds into the raw series.
    pub start_index: usize,
    pub end_index: usize,
    pub bead_number: String,
    /// Non-missing labels, keyed by column name.
    pub labels: BTreeMap<String, ClassValue>,
    /// `None` when the table has no `is_test` column or the cell is blank.
    pub is_test: Option<bool>,
}

impl BeadRecord {
    pub fn label(&self, column: &str) -> Option<&ClassValue> {
        self.labels.get(column)
    }

    pub fn matches_source(&self, source_name: &str) -> bool {
        basename(&self.file) == basename(source_name)
    }
}

/// Why a metadata row was left out of a render.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum IssueKind {
    #[error("missing value in column '{0}'")]
    MissingField(String),
    #[error("column '{column}' is not a non-negative integer: '{value}'")]
    InvalidIndex { column: String, value: String },
    #[error("start index {start} is after end index {end}")]
    ReversedRange { start: usize, end: usize },
    #[error("range {start}..={end} exceeds series length {len}")]
    OutOfRange { start: usize, end: usize, len: usize },
}

/// An invalid metadata row that was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowIssue {
    pub row: usize,
    /// The row's `file` cell, when it had one.
    pub file: Option<String>,
    pub kind: IssueKind,
}

impl RowIssue {
    /// Whether this issue concerns the given source. Issues with no file
    /// cannot be attributed and count for every source.
    pub fn concerns(&self, source_name: &str) -> bool {
        self.file
            .as_deref()
            .is_none_or(|f| basename(f) == basename(source_name))
    }
}

impl std::fmt::Display for RowIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "row {}: {}", self.row, self.kind)
    }
}

/// The bead metadata table: valid records plus the rows that failed
/// validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BeadTable {
    columns: Vec<String>,
    records: Vec<BeadRecord>,
    issues: Vec<RowIssue>,
}

impl BeadTable {
    pub fn new(columns: Vec<String>, records: Vec<BeadRecord>, issues: Vec<RowIssue>) -> Self {
        Self {
            columns,
            records,
            issues,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[BeadRecord] {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut [BeadRecord] {
        &mut self.records
    }

    pub fn issues(&self) -> &[RowIssue] {
        &self.issues
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn has_test_flags(&self) -> bool {
        self.has_column(IS_TEST_COLUMN)
    }

    /// Every non-reserved column, in file order.
    pub fn label_columns(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .map(String::as_str)
            .filter(|c| !RESERVED_COLUMNS.contains(c))
    }

    /// Columns worth offering for coloring: the ground-truth column first,
    /// then model predictions. Falls back to all label columns when the table
    /// follows neither naming convention.
    pub fn label_options(&self) -> Vec<String> {
        let mut options: Vec<String> = Vec::new();
        if self.has_column(GROUND_TRUTH_COLUMN) {
            options.push(GROUND_TRUTH_COLUMN.to_string());
        }
        options.extend(
            self.label_columns()
                .filter(|c| c.contains(PREDICTION_MARKER))
                .map(str::to_string),
        );
        if options.is_empty() {
            options.extend(self.label_columns().map(str::to_string));
        }
        options
    }

    /// Records belonging to `source_name`, compared by basename.
    pub fn records_for<'a>(
        &'a self,
        source_name: &'a str,
    ) -> impl Iterator<Item = &'a BeadRecord> + 'a {
        self.records
            .iter()
            .filter(move |r| r.matches_source(source_name))
    }

    pub fn issues_for<'a>(&'a self, source_name: &'a str) -> impl Iterator<Item = &'a RowIssue> + 'a {
        self.issues.iter().filter(move |i| i.concerns(source_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(row: usize, file: &str) -> BeadRecord {
        BeadRecord {
            row,
            file: file.into(),
            start_index: 0,
            end_index: 1,
            bead_number: row.to_string(),
            labels: BTreeMap::new(),
            is_test: None,
        }
    }

    #[test]
    fn class_values_canonicalize_numbers() {
        assert_eq!(ClassValue::parse("1").map(|c| c.0), Some("1.0".to_string()));
        assert_eq!(ClassValue::parse(" 1.00 "), ClassValue::parse("1.0"));
        assert_eq!(ClassValue::parse("2.5").map(|c| c.0), Some("2.5".to_string()));
        assert_eq!(
            ClassValue::parse("  Weak Weld ").map(|c| c.0),
            Some("Weak Weld".to_string())
        );
    }

    #[test]
    fn null_spellings_are_missing() {
        for raw in ["", "  ", "nan", "NaN", "NA", "null", "None", "N/A"] {
            assert!(ClassValue::parse(raw).is_none(), "{raw:?} should be missing");
        }
    }

    #[test]
    fn basename_matching() {
        let r = record(1, "part1.csv");
        assert!(r.matches_source("extracted/subdir/part1.csv"));
        assert!(r.matches_source("part1.csv"));
        assert!(!r.matches_source("extracted/part10.csv"));
    }

    #[test]
    fn label_options_put_ground_truth_first() {
        let table = BeadTable::new(
            ["file", "start_index", "end_index", "bead_number", "RF_Prediction", "refined_label", "is_test", "note"]
                .map(String::from)
                .to_vec(),
            Vec::new(),
            Vec::new(),
        );
        assert_eq!(table.label_options(), vec!["refined_label", "RF_Prediction"]);
        assert_eq!(
            table.label_columns().collect::<Vec<_>>(),
            vec!["RF_Prediction", "refined_label", "note"]
        );
        assert!(table.has_test_flags());
    }

    #[test]
    fn label_options_fall_back_to_all_label_columns() {
        let table = BeadTable::new(
            ["file", "start_index", "end_index", "bead_number", "label"]
                .map(String::from)
                .to_vec(),
            Vec::new(),
            Vec::new(),
        );
        assert_eq!(table.label_options(), vec!["label"]);
    }

    #[test]
    fn issues_without_file_concern_every_source() {
        let issue = RowIssue {
            row: 3,
            file: None,
            kind: IssueKind::MissingField("file".into()),
        };
        assert!(issue.concerns("a.csv"));
        let issue = RowIssue {
            file: Some("dir/b.csv".into()),
            ..issue
        };
        assert!(!issue.concerns("a.csv"));
        assert!(issue.concerns("b.csv"));
        assert_eq!(issue.to_string(), "row 3: missing value in column 'file'");
    }

    #[test]
    fn records_for_filters_by_basename() {
        let table = BeadTable::new(
            Vec::new(),
            vec![record(1, "a.csv"), record(2, "b.csv"), record(3, "x/a.csv")],
            Vec::new(),
        );
        let rows: Vec<_> = table.records_for("up/a.csv").map(|r| r.row).collect();
        assert_eq!(rows, vec![1, 3]);
    }
}
