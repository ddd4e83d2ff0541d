use thiserror::Error;

use crate::model::RawSeries;

#[derive(Debug, Error)]
pub enum SeriesParseError {
    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("expected at least 2 signal columns, found {0}")]
    TooFewColumns(usize),
    #[error("row {row}, column '{column}': not a number: '{value}'")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },
    #[error("no samples found")]
    Empty,
}

/// Parse a raw recording CSV.
///
/// The first column is the NIR signal and the second the VIS signal; further
/// columns are ignored. Blank cells read as NaN (a gap in the trace), any
/// other non-numeric cell is an error.
pub fn parse_series(data: &[u8], name: Option<&str>) -> Result<RawSeries, SeriesParseError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data);

    let headers = reader.headers()?.clone();
    if headers.len() < 2 {
        return Err(SeriesParseError::TooFewColumns(headers.len()));
    }
    let channel_names = [headers[0].to_string(), headers[1].to_string()];

    let mut samples = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        let row = i + 1;
        let cell = |col: usize| -> Result<f64, SeriesParseError> {
            let raw = record.get(col).unwrap_or("");
            if raw.is_empty() {
                return Ok(f64::NAN);
            }
            raw.parse::<f64>()
                .map_err(|_| SeriesParseError::InvalidNumber {
                    row,
                    column: channel_names[col].clone(),
                    value: raw.to_string(),
                })
        };
        samples.push((cell(0)?, cell(1)?));
    }

    if samples.is_empty() {
        return Err(SeriesParseError::Empty);
    }

    tracing::debug!(samples = samples.len(), name, "parsed raw series");
    Ok(RawSeries::from_samples(
        name.map(str::to_string),
        channel_names,
        samples,
    ))
}
