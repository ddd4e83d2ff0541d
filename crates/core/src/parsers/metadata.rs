use std::collections::BTreeMap;

use thiserror::Error;

use super::parse_index;
use crate::model::bead::{
    BEAD_NUMBER_COLUMN, END_COLUMN, FILE_COLUMN, IS_TEST_COLUMN, RESERVED_COLUMNS, START_COLUMN,
};
use crate::model::{BeadRecord, BeadTable, ClassValue, IssueKind, RowIssue};

#[derive(Debug, Error)]
pub enum MetadataParseError {
    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("required column '{0}' is missing")]
    MissingColumn(&'static str),
}

/// Parse the bead metadata CSV.
///
/// Only a broken file or a missing required column fails the parse. Rows
/// with bad cells are collected as [`RowIssue`]s on the table and left out of
/// its records.
pub fn parse_bead_table(data: &[u8]) -> Result<BeadTable, MetadataParseError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data);

    let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let position = |name: &'static str| {
        columns
            .iter()
            .position(|c| c == name)
            .ok_or(MetadataParseError::MissingColumn(name))
    };
    let file_col = position(FILE_COLUMN)?;
    let start_col = position(START_COLUMN)?;
    let end_col = position(END_COLUMN)?;
    let bead_col = position(BEAD_NUMBER_COLUMN)?;
    let test_col = columns.iter().position(|c| c == IS_TEST_COLUMN);
    let label_cols: Vec<(usize, &String)> = columns
        .iter()
        .enumerate()
        .filter(|(_, c)| !RESERVED_COLUMNS.contains(&c.as_str()))
        .collect();

    let mut records = Vec::new();
    let mut issues = Vec::new();

    for (i, record) in reader.records().enumerate() {
        let record = record?;
        let row = i + 1;
        let cell = |col: usize| record.get(col).unwrap_or("");

        let file = Some(cell(file_col)).filter(|f| !f.is_empty());
        let issue = |kind: IssueKind| RowIssue {
            row,
            file: file.map(str::to_string),
            kind,
        };

        let Some(file_name) = file else {
            issues.push(issue(IssueKind::MissingField(FILE_COLUMN.to_string())));
            continue;
        };

        let index = |col: usize, name: &str| -> Result<usize, IssueKind> {
            let raw = cell(col);
            if raw.is_empty() {
                return Err(IssueKind::MissingField(name.to_string()));
            }
            parse_index(raw).ok_or_else(|| IssueKind::InvalidIndex {
                column: name.to_string(),
                value: raw.to_string(),
            })
        };
        let bounds = index(start_col, START_COLUMN)
            .and_then(|start| Ok((start, index(end_col, END_COLUMN)?)));
        let (start_index, end_index) = match bounds {
            Ok((start, end)) if start <= end => (start, end),
            Ok((start, end)) => {
                issues.push(issue(IssueKind::ReversedRange { start, end }));
                continue;
            }
            Err(kind) => {
                issues.push(issue(kind));
                continue;
            }
        };

        let bead_number = cell(bead_col);
        if bead_number.is_empty() {
            issues.push(issue(IssueKind::MissingField(BEAD_NUMBER_COLUMN.to_string())));
            continue;
        }

        let labels: BTreeMap<String, ClassValue> = label_cols
            .iter()
            .filter_map(|(col, name)| Some(((*name).clone(), ClassValue::parse(cell(*col))?)))
            .collect();

        records.push(BeadRecord {
            row,
            file: file_name.to_string(),
            start_index,
            end_index,
            bead_number: canonical_bead_number(bead_number),
            labels,
            is_test: test_col.and_then(|col| parse_flag(cell(col))),
        });
    }

    tracing::info!(
        records = records.len(),
        invalid_rows = issues.len(),
        "loaded bead metadata"
    );
    Ok(BeadTable::new(columns, records, issues))
}

/// Bead numbers exported as floats (`3.0`) read as integers.
fn canonical_bead_number(raw: &str) -> String {
    match parse_index(raw) {
        Some(n) => n.to_string(),
        None => raw.to_string(),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "1.0" | "yes" | "y" | "t" => Some(true),
        "false" | "0" | "0.0" | "no" | "n" | "f" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "file,start_index,end_index,bead_number,refined_label,RF_Prediction,is_test\n";

    fn parse(rows: &str) -> BeadTable {
        parse_bead_table(format!("{HEADER}{rows}").as_bytes()).unwrap()
    }

    #[test]
    fn parses_typed_records() {
        let table = parse("a.csv,2,4,1,OK,1.0,True\nb.csv,10.0,20.0,2.0,Weak Weld,,0\n");
        assert!(table.issues().is_empty());
        let records = table.records();
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].start_index, 2);
        assert_eq!(records[0].end_index, 4);
        assert_eq!(records[0].label("refined_label").map(ClassValue::as_str), Some("OK"));
        assert_eq!(records[0].label("RF_Prediction").map(ClassValue::as_str), Some("1.0"));
        assert_eq!(records[0].is_test, Some(true));

        assert_eq!(records[1].start_index, 10);
        assert_eq!(records[1].bead_number, "2");
        assert!(records[1].label("RF_Prediction").is_none());
        assert_eq!(records[1].is_test, Some(false));
    }

    #[test]
    fn bad_rows_become_issues() {
        let table = parse(
            "a.csv,-1,4,1,OK,,\n\
             a.csv,x,4,2,OK,,\n\
             a.csv,5,3,3,OK,,\n\
             ,1,2,4,OK,,\n\
             a.csv,1,,5,OK,,\n\
             a.csv,1,2,,OK,,\n\
             a.csv,1,2,7,OK,,\n",
        );
        assert_eq!(table.records().len(), 1);
        assert_eq!(table.records()[0].row, 7);

        let kinds: Vec<_> = table.issues().iter().map(|i| i.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                IssueKind::InvalidIndex {
                    column: "start_index".into(),
                    value: "-1".into()
                },
                IssueKind::InvalidIndex {
                    column: "start_index".into(),
                    value: "x".into()
                },
                IssueKind::ReversedRange { start: 5, end: 3 },
                IssueKind::MissingField("file".into()),
                IssueKind::MissingField("end_index".into()),
                IssueKind::MissingField("bead_number".into()),
            ]
        );
        assert_eq!(table.issues()[3].file, None);
        assert_eq!(table.issues()[0].file.as_deref(), Some("a.csv"));
    }

    #[test]
    fn missing_required_column_fails() {
        let err = parse_bead_table(b"file,start_index,bead_number\na.csv,1,1\n").unwrap_err();
        assert!(matches!(err, MetadataParseError::MissingColumn("end_index")));
    }

    #[test]
    fn test_flag_absent_without_column() {
        let table = parse_bead_table(b"file,start_index,end_index,bead_number,label\na.csv,0,1,1,OK\n")
            .unwrap();
        assert!(!table.has_test_flags());
        assert_eq!(table.records()[0].is_test, None);
    }

    #[test]
    fn short_rows_read_as_blank_cells() {
        let table = parse("a.csv,0,1,1\n");
        assert_eq!(table.records().len(), 1);
        assert!(table.records()[0].labels.is_empty());
    }
}
