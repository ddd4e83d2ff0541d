use thiserror::Error;

use crate::config::{OverlayOptions, ViewerConfig};
use crate::model::{BeadTable, RawSeries};
use crate::parsers::{ParseError, parse_bead_table, parse_series};
use crate::source::{MetadataSource, SeriesArchive, SourceError};
use crate::views::overlay::{Overlay, OverlayError, build_overlay};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Overlay(#[from] OverlayError),
}

/// A recording together with the overlay last built for it.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub series: RawSeries,
    pub overlay: Overlay,
}

/// Viewer state across render requests.
///
/// Holds the metadata table (translated once, on load) and the last
/// successful render. A failed render leaves the previous one in place.
#[derive(Debug, Clone)]
pub struct Session {
    table: BeadTable,
    config: ViewerConfig,
    current: Option<Rendered>,
}

impl Session {
    pub fn new(mut table: BeadTable, config: ViewerConfig) -> Self {
        config.scheme.prepare(&mut table);
        Self {
            table,
            config,
            current: None,
        }
    }

    /// Fetch and parse the metadata table, then start a session on it.
    pub fn load(metadata: &dyn MetadataSource, config: ViewerConfig) -> Result<Self, SessionError> {
        let data = metadata.fetch()?;
        let table = parse_bead_table(&data).map_err(ParseError::from)?;
        tracing::info!(location = %metadata.location(), "metadata loaded");
        Ok(Self::new(table, config))
    }

    pub fn table(&self) -> &BeadTable {
        &self.table
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn set_options(&mut self, options: OverlayOptions) {
        self.config.options = options;
    }

    pub fn label_options(&self) -> Vec<String> {
        self.table.label_options()
    }

    /// The scheme's preferred column when the table has it, else the first
    /// offered option.
    pub fn default_label_column(&self) -> Option<String> {
        self.config
            .scheme
            .default_label_column
            .clone()
            .filter(|c| self.table.has_column(c))
            .or_else(|| self.label_options().into_iter().next())
    }

    pub fn current(&self) -> Option<&Rendered> {
        self.current.as_ref()
    }

    /// Load `member` from `archive` and build its overlay for `label_column`.
    pub fn render(
        &mut self,
        archive: &dyn SeriesArchive,
        member: &str,
        label_column: &str,
    ) -> Result<&Rendered, SessionError> {
        let data = archive.open_member(member)?;
        let series = parse_series(&data, Some(member)).map_err(ParseError::from)?;
        let overlay = build_overlay(&series, &self.table, member, label_column, &self.config)?;
        Ok(self.current.insert(Rendered { series, overlay }))
    }

    /// Rebuild the current overlay, e.g. after the label column or options
    /// changed. Returns `Ok(None)` when nothing has been rendered yet.
    pub fn refresh(&mut self, label_column: &str) -> Result<Option<&Rendered>, SessionError> {
        let Some(current) = &self.current else {
            return Ok(None);
        };
        let overlay = build_overlay(
            &current.series,
            &self.table,
            &current.overlay.source_name,
            label_column,
            &self.config,
        )?;
        let rendered = self.current.as_mut().map(|r| {
            r.overlay = overlay;
            &*r
        });
        Ok(rendered)
    }
}
