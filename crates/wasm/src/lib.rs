//! Browser bridge. Every call takes the raw CSV bytes it needs and returns
//! JSON or SVG text; nothing is kept between calls.

use bead_view_core::config::{ConfigError, ViewerConfig};
use bead_view_core::model::RawSeries;
use bead_view_core::parsers::{ParseError, parse_bead_table, parse_series};
use bead_view_core::svg::render_svg;
use bead_view_core::views::{Overlay, OverlayError, build_overlay, render_chart};
use bead_view_protocol::Viewport;
use thiserror::Error;
use wasm_bindgen::prelude::*;

#[derive(Debug, Error)]
enum BridgeError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Overlay(#[from] OverlayError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// `scheme` is a preset name, or a full viewer config as JSON.
fn viewer_config(scheme: &str) -> Result<ViewerConfig, ConfigError> {
    let scheme = scheme.trim();
    if scheme.starts_with('{') {
        ViewerConfig::from_json(scheme)
    } else {
        ViewerConfig::preset(scheme)
    }
}

fn overlay_for(
    series_csv: &[u8],
    metadata_csv: &[u8],
    source_name: &str,
    label_column: &str,
    scheme: &str,
) -> Result<(RawSeries, Overlay, ViewerConfig), BridgeError> {
    let config = viewer_config(scheme)?;
    let mut table = parse_bead_table(metadata_csv).map_err(ParseError::from)?;
    config.scheme.prepare(&mut table);
    let series = parse_series(series_csv, Some(source_name)).map_err(ParseError::from)?;
    let overlay = build_overlay(&series, &table, source_name, label_column, &config)?;
    Ok((series, overlay, config))
}

fn label_options_json(metadata_csv: &[u8]) -> Result<String, BridgeError> {
    let table = parse_bead_table(metadata_csv).map_err(ParseError::from)?;
    Ok(serde_json::to_string(&table.label_options())?)
}

fn segments_json(
    series_csv: &[u8],
    metadata_csv: &[u8],
    source_name: &str,
    label_column: &str,
    scheme: &str,
) -> Result<String, BridgeError> {
    let (_, overlay, _) = overlay_for(series_csv, metadata_csv, source_name, label_column, scheme)?;
    Ok(serde_json::to_string(&overlay)?)
}

#[allow(clippy::too_many_arguments)]
fn chart_svg(
    series_csv: &[u8],
    metadata_csv: &[u8],
    source_name: &str,
    label_column: &str,
    scheme: &str,
    width: f64,
    height: f64,
    dark: bool,
) -> Result<String, BridgeError> {
    let (series, overlay, config) =
        overlay_for(series_csv, metadata_csv, source_name, label_column, scheme)?;
    let viewport = Viewport::new(width, height);
    let commands = render_chart(&series, &overlay, &viewport, &config.chart);
    Ok(render_svg(&commands, width, height, dark))
}

/// Label columns offered for coloring, as a JSON array of strings.
#[wasm_bindgen]
pub fn label_options(metadata_csv: &[u8]) -> Result<String, JsError> {
    Ok(label_options_json(metadata_csv)?)
}

/// Build the overlay of one recording and return it as JSON.
#[wasm_bindgen]
pub fn build_segments(
    series_csv: &[u8],
    metadata_csv: &[u8],
    source_name: &str,
    label_column: &str,
    scheme: &str,
) -> Result<String, JsError> {
    Ok(segments_json(
        series_csv,
        metadata_csv,
        source_name,
        label_column,
        scheme,
    )?)
}

/// Build the overlay of one recording and render it as an SVG document.
#[wasm_bindgen]
#[allow(clippy::too_many_arguments)]
pub fn render_chart_svg(
    series_csv: &[u8],
    metadata_csv: &[u8],
    source_name: &str,
    label_column: &str,
    scheme: &str,
    width: f64,
    height: f64,
    dark: bool,
) -> Result<String, JsError> {
    Ok(chart_svg(
        series_csv,
        metadata_csv,
        source_name,
        label_column,
        scheme,
        width,
        height,
        dark,
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERIES: &[u8] = b"NIR,VIS\n1,5\n2,6\n3,7\n4,8\n5,9\n";
    const METADATA: &[u8] = b"file,start_index,end_index,bead_number,refined_label,XGB_Prediction\n\
        upload/part1.csv,0,1,1,OK,1.0\n\
        upload/part1.csv,2,4,2,Hot Melt,0.0\n";

    #[test]
    fn offers_label_columns() {
        let json = label_options_json(METADATA).unwrap();
        assert_eq!(json, r#"["refined_label","XGB_Prediction"]"#);
    }

    #[test]
    fn segments_are_serialized() {
        let json = segments_json(SERIES, METADATA, "part1.csv", "XGB_Prediction", "named").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let segments = value["segments"].as_array().unwrap();
        assert_eq!(segments.len(), 6);
        assert_eq!(segments[2]["legend"], "Class OK");
        assert_eq!(segments[4]["legend"], "Class Hot Melt");
    }

    #[test]
    fn json_config_is_accepted() {
        let config = r#"{"options": {"highlight": false}}"#;
        let json = segments_json(SERIES, METADATA, "part1.csv", "refined_label", config).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["segments"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn unknown_column_and_scheme_fail() {
        assert!(matches!(
            segments_json(SERIES, METADATA, "part1.csv", "nope", "refined"),
            Err(BridgeError::Overlay(_))
        ));
        assert!(matches!(
            segments_json(SERIES, METADATA, "part1.csv", "refined_label", "bogus"),
            Err(BridgeError::Config(_))
        ));
    }

    #[test]
    fn svg_output() {
        let svg = chart_svg(
            SERIES,
            METADATA,
            "part1.csv",
            "refined_label",
            "refined",
            900.0,
            500.0,
            true,
        )
        .unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Class Hot Melt"));
    }
}
