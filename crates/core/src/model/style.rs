use std::collections::HashMap;

use bead_view_protocol::Color;
use serde::{Deserialize, Serialize};

use super::bead::ClassValue;

/// Configured look of one class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassEntry {
    /// Class value as it appears in the label column (`"OK"`, `"1.0"`).
    pub value: String,
    pub color: Color,
    /// Display name; defaults to the value itself.
    #[serde(default)]
    pub label: Option<String>,
}

impl ClassEntry {
    pub fn new(value: impl Into<String>, color: impl Into<Color>) -> Self {
        Self {
            value: value.into(),
            color: color.into(),
            label: None,
        }
    }
}

/// A class's resolved color and display name.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStyle {
    pub color: Color,
    pub label: String,
    /// `false` when the fallback style was used.
    pub mapped: bool,
}

impl ResolvedStyle {
    pub fn legend(&self) -> String {
        format!("Class {}", self.label)
    }
}

/// Lookup from class value to color and display name.
///
/// Unmapped classes are never dropped: they resolve to black with their raw
/// value as display name.
#[derive(Debug, Clone, Default)]
pub struct ClassStyle {
    styles: HashMap<ClassValue, (Color, String)>,
}

impl ClassStyle {
    pub fn new(entries: &[ClassEntry]) -> Self {
        let styles = entries
            .iter()
            .filter_map(|e| {
                let value = ClassValue::parse(&e.value)?;
                let label = e.label.clone().unwrap_or_else(|| value.to_string());
                Some((value, (e.color.clone(), label)))
            })
            .collect();
        Self { styles }
    }

    pub fn resolve(&self, value: &ClassValue) -> ResolvedStyle {
        match self.styles.get(value) {
            Some((color, label)) => ResolvedStyle {
                color: color.clone(),
                label: label.clone(),
                mapped: true,
            },
            None => ResolvedStyle {
                color: Color::black(),
                label: value.to_string(),
                mapped: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(raw: &str) -> ClassValue {
        ClassValue::parse(raw).unwrap_or_else(|| unreachable!("test class must be non-null"))
    }

    #[test]
    fn resolves_configured_class() {
        let style = ClassStyle::new(&[ClassEntry::new("OK", "red")]);
        let resolved = style.resolve(&class("OK"));
        assert_eq!(resolved.color, Color::new("red"));
        assert_eq!(resolved.legend(), "Class OK");
        assert!(resolved.mapped);
    }

    #[test]
    fn unmapped_class_falls_back_to_black() {
        let style = ClassStyle::new(&[ClassEntry::new("OK", "red")]);
        let resolved = style.resolve(&class("Unknown"));
        assert_eq!(resolved.color, Color::black());
        assert_eq!(resolved.legend(), "Class Unknown");
        assert!(!resolved.mapped);
    }

    #[test]
    fn numeric_entries_match_float_codes() {
        let style = ClassStyle::new(&[ClassEntry::new("1", "red")]);
        let resolved = style.resolve(&class("1.0"));
        assert_eq!(resolved.color, Color::new("red"));
        assert_eq!(resolved.legend(), "Class 1.0");
    }

    #[test]
    fn display_label_overrides_value() {
        let mut entry = ClassEntry::new("2.0", "green");
        entry.label = Some("Poor Appearance".into());
        let style = ClassStyle::new(&[entry]);
        assert_eq!(style.resolve(&class("2")).label, "Poor Appearance");
    }
}
