//! Numeric class code → display name translation for prediction columns.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::BeadTable;
use crate::model::bead::PREDICTION_MARKER;
use crate::model::ClassValue;

/// Maps class codes (as written in prediction columns) to class names.
///
/// Only columns whose name ends in `_Prediction` are rewritten. Values with no
/// mapping are kept as they are.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct LabelTranslator {
    names: BTreeMap<String, String>,
}

impl From<BTreeMap<String, String>> for LabelTranslator {
    fn from(names: BTreeMap<String, String>) -> Self {
        Self::new(names)
    }
}

impl From<LabelTranslator> for BTreeMap<String, String> {
    fn from(translator: LabelTranslator) -> Self {
        translator.names
    }
}

impl LabelTranslator {
    pub fn new<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let names = pairs
            .into_iter()
            .filter_map(|(code, name)| {
                let code = ClassValue::parse(code.as_ref())?;
                Some((code.as_str().to_string(), name.into()))
            })
            .collect();
        Self { names }
    }

    /// The weld defect code table used by the classification models.
    pub fn weld_defects() -> Self {
        Self::new([
            ("0", "Hot Melt"),
            ("1", "OK"),
            ("2", "Poor Appearance"),
            ("3", "Weak Weld"),
        ])
    }

    pub fn translate(&self, value: &ClassValue) -> Option<ClassValue> {
        self.names
            .get(value.as_str())
            .and_then(|name| ClassValue::parse(name))
    }

    /// Rewrite every prediction column of `table` in place. Returns the number
    /// of cells changed.
    pub fn apply(&self, table: &mut BeadTable) -> usize {
        let mut changed = 0;
        for record in table.records_mut() {
            for (column, value) in record.labels.iter_mut() {
                if !column.ends_with(PREDICTION_MARKER) {
                    continue;
                }
                if let Some(name) = self.translate(value) {
                    *value = name;
                    changed += 1;
                }
            }
        }
        tracing::debug!(changed, "translated prediction codes");
        changed
    }
}
