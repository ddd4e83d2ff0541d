//! Labeling schemes and viewer configuration.
//!
//! A scheme bundles everything that depends on how a metadata export labels
//! its beads: the class colors, the order classes are drawn in, and whether
//! prediction codes need translating. Configuration can come from a named
//! preset or a JSON file; every field has a default so partial files work.

use std::path::Path;

use bead_view_protocol::Color;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{BeadTable, ClassEntry, ClassStyle};
use crate::translate::LabelTranslator;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown scheme '{0}' (expected one of: numeric, named, refined)")]
    UnknownPreset(String),
    #[error("cannot read config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScheme {
    pub name: String,
    pub classes: Vec<ClassEntry>,
    /// Classes drawn first, in this order. Rows of other classes follow in
    /// table order.
    #[serde(default)]
    pub prediction_order: Option<Vec<String>>,
    #[serde(default)]
    pub translator: Option<LabelTranslator>,
    /// Column preselected when the caller names none.
    #[serde(default)]
    pub default_label_column: Option<String>,
}

impl LabelScheme {
    /// Float-coded classes straight out of the model exports.
    pub fn numeric() -> Self {
        Self {
            name: "numeric".into(),
            classes: vec![
                ClassEntry::new("0.0", "blue"),
                ClassEntry::new("1.0", "red"),
                ClassEntry::new("2.0", "green"),
                ClassEntry::new("3.0", "purple"),
                ClassEntry::new("4.0", "orange"),
            ],
            prediction_order: None,
            translator: None,
            default_label_column: None,
        }
    }

    /// Named defect classes, with prediction codes translated to names.
    pub fn named() -> Self {
        Self {
            name: "named".into(),
            classes: vec![
                ClassEntry::new("Hot Melt", "blue"),
                ClassEntry::new("OK", "red"),
                ClassEntry::new("Poor Appearance", "green"),
                ClassEntry::new("Weak Weld", "purple"),
            ],
            prediction_order: Some(
                ["OK", "Hot Melt", "Poor Appearance", "Weak Weld"]
                    .map(String::from)
                    .to_vec(),
            ),
            translator: Some(LabelTranslator::weld_defects()),
            default_label_column: None,
        }
    }

    /// Refined ground truth, which adds the `OK-like` class.
    pub fn refined() -> Self {
        Self {
            name: "refined".into(),
            classes: vec![
                ClassEntry::new("OK", "red"),
                ClassEntry::new("OK-like", "orange"),
                ClassEntry::new("Hot Melt", "blue"),
                ClassEntry::new("Poor Appearance", "green"),
                ClassEntry::new("Weak Weld", "purple"),
            ],
            prediction_order: Some(
                ["OK", "OK-like", "Hot Melt", "Poor Appearance", "Weak Weld"]
                    .map(String::from)
                    .to_vec(),
            ),
            translator: None,
            default_label_column: Some("refined_label".into()),
        }
    }

    pub fn preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "numeric" => Ok(Self::numeric()),
            "named" => Ok(Self::named()),
            "refined" => Ok(Self::refined()),
            other => Err(ConfigError::UnknownPreset(other.to_string())),
        }
    }

    /// Whether `is_test` beads are dashed when the options leave it open.
    pub fn dashes_test_rows(&self) -> bool {
        self.name == "numeric"
    }

    pub fn class_style(&self) -> ClassStyle {
        ClassStyle::new(&self.classes)
    }

    /// Apply the scheme's translator, if any, to a freshly loaded table.
    pub fn prepare(&self, table: &mut BeadTable) {
        if let Some(translator) = &self.translator {
            translator.apply(table);
        }
    }
}

impl Default for LabelScheme {
    fn default() -> Self {
        Self::refined()
    }
}

/// Switches that change what the overlay builder emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayOptions {
    /// Draw class highlights. When off only the baselines are emitted.
    pub highlight: bool,
    /// Draw beads flagged `is_test` with a dashed line. Unset leaves it to
    /// the scheme: on for `numeric`, off otherwise.
    pub dash_test_rows: Option<bool>,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            highlight: true,
            dash_test_rows: None,
        }
    }
}

/// Layout knobs of the stacked chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartOptions {
    /// Chart title; `{column}` is replaced by the active label column.
    pub title: String,
    pub line_width: f64,
    pub highlight_width: f64,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            title: "Bead-Level NVH Visualization ({column})".into(),
            line_width: 1.0,
            highlight_width: 1.5,
        }
    }
}

impl ChartOptions {
    pub fn title_for(&self, label_column: &str) -> String {
        self.title.replace("{column}", label_column)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub scheme: LabelScheme,
    pub options: OverlayOptions,
    pub baseline_color: Color,
    pub chart: ChartOptions,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self::from_scheme(LabelScheme::default())
    }
}

impl ViewerConfig {
    pub fn from_scheme(scheme: LabelScheme) -> Self {
        Self {
            scheme,
            options: OverlayOptions::default(),
            baseline_color: Color::gray(),
            chart: ChartOptions::default(),
        }
    }

    /// Effective dashing of `is_test` beads.
    pub fn dash_test_rows(&self) -> bool {
        self.options
            .dash_test_rows
            .unwrap_or_else(|| self.scheme.dashes_test_rows())
    }

    pub fn preset(name: &str) -> Result<Self, ConfigError> {
        LabelScheme::preset(name).map(Self::from_scheme)
    }

    pub fn from_json(data: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(data)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&data)
    }
}
