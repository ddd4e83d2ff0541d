mod cli;
mod renderer;

use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use bead_view_core::config::{LabelScheme, ViewerConfig};
use bead_view_core::model::Session;
use bead_view_core::parsers::parse_bead_table;
use bead_view_core::source::{FileMetadata, MetadataSource, SeriesArchive, open_archive};
use bead_view_core::svg::render_svg;
use bead_view_core::views::render_chart;
use bead_view_protocol::Viewport;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, ColumnsArgs, Command, MembersArgs, RenderArgs, SchemeArg, SourceArgs};
use crate::renderer::Dashboard;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // log lines would scribble over the dashboard
    let default_level = match cli.command {
        Command::View(_) => "off",
        _ => "warn",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    match cli.command {
        Command::View(args) => handle_view(&args),
        Command::Render(args) => handle_render(&args),
        Command::Segments(args) => handle_segments(&args),
        Command::Members(args) => handle_members(&args),
        Command::Columns(args) => handle_columns(&args),
    }
}

/// An opened archive and session, with the member and column to start on.
struct Opened {
    archive: Box<dyn SeriesArchive>,
    session: Session,
    members: Vec<String>,
    member: String,
    label_column: String,
}

fn viewer_config(args: &SourceArgs) -> Result<ViewerConfig> {
    let scheme = args.scheme.map(SchemeArg::preset_name);
    let config = match (&args.config, scheme) {
        (Some(path), None) => ViewerConfig::load(path)?,
        (Some(path), Some(name)) => {
            let mut config = ViewerConfig::load(path)?;
            config.scheme = LabelScheme::preset(name)?;
            config
        }
        (None, name) => ViewerConfig::preset(name.unwrap_or("refined"))?,
    };
    Ok(config)
}

fn open(args: &SourceArgs) -> Result<Opened> {
    let config = viewer_config(args)?;
    let archive = open_archive(&args.data)
        .with_context(|| format!("cannot open recordings at {}", args.data.display()))?;
    let members = archive.list_csv_members()?;
    let session = Session::load(&FileMetadata::new(&args.metadata), config)?;

    let member = match &args.member {
        Some(name) => name.clone(),
        None => members
            .first()
            .cloned()
            .ok_or_else(|| anyhow!("no CSV recordings under {}", args.data.display()))?,
    };
    let label_column = match &args.label_column {
        Some(column) => column.clone(),
        None => session
            .default_label_column()
            .ok_or_else(|| anyhow!("metadata has no label columns"))?,
    };
    tracing::info!(members = members.len(), %member, %label_column, "opened sources");

    Ok(Opened {
        archive,
        session,
        members,
        member,
        label_column,
    })
}

fn handle_view(args: &SourceArgs) -> Result<()> {
    let opened = open(args)?;
    let Some(member) = opened.members.iter().position(|m| *m == opened.member) else {
        bail!("recording '{}' not found", opened.member);
    };
    let mut columns = opened.session.label_options();
    if !columns.contains(&opened.label_column) {
        columns.push(opened.label_column.clone());
    }
    let column = columns
        .iter()
        .position(|c| *c == opened.label_column)
        .unwrap_or_default();

    let dashboard = Dashboard::new(
        opened.archive,
        opened.session,
        opened.members,
        columns,
        member,
        column,
    );
    renderer::run(dashboard)
}

fn handle_render(args: &RenderArgs) -> Result<()> {
    let mut opened = open(&args.source)?;
    let chart = opened.session.config().chart.clone();
    let rendered = opened
        .session
        .render(&*opened.archive, &opened.member, &opened.label_column)?;
    for issue in &rendered.overlay.skipped {
        tracing::warn!(%issue, "skipped bead row");
    }

    let viewport = Viewport::new(args.width, args.height);
    let commands = render_chart(&rendered.series, &rendered.overlay, &viewport, &chart);
    let svg = render_svg(&commands, viewport.width, viewport.height, args.dark);
    std::fs::write(&args.out, svg)
        .with_context(|| format!("cannot write {}", args.out.display()))?;
    tracing::info!(out = %args.out.display(), "chart written");
    Ok(())
}

fn handle_segments(args: &SourceArgs) -> Result<()> {
    let mut opened = open(args)?;
    let rendered = opened
        .session
        .render(&*opened.archive, &opened.member, &opened.label_column)?;
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, &rendered.overlay)?;
    writeln!(out)?;
    Ok(())
}

fn handle_members(args: &MembersArgs) -> Result<()> {
    let archive = open_archive(&args.data)
        .with_context(|| format!("cannot open recordings at {}", args.data.display()))?;
    let mut out = io::stdout().lock();
    for member in archive.list_csv_members()? {
        writeln!(out, "{member}")?;
    }
    Ok(())
}

fn handle_columns(args: &ColumnsArgs) -> Result<()> {
    let table = parse_bead_table(&read_metadata(&args.metadata)?)?;
    let mut out = io::stdout().lock();
    for column in table.label_options() {
        writeln!(out, "{column}")?;
    }
    Ok(())
}

fn read_metadata(path: &Path) -> Result<Vec<u8>> {
    Ok(FileMetadata::new(path).fetch()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn source_args(scheme: Option<SchemeArg>, config: Option<PathBuf>) -> SourceArgs {
        SourceArgs {
            data: PathBuf::from("upload"),
            metadata: PathBuf::from("metadata.csv"),
            member: None,
            label_column: None,
            scheme,
            config,
        }
    }

    #[test]
    fn scheme_flag_picks_preset() {
        let config = viewer_config(&source_args(Some(SchemeArg::Named), None)).unwrap();
        assert_eq!(config.scheme.name, "named");
        let config = viewer_config(&source_args(None, None)).unwrap();
        assert_eq!(config.scheme.name, "refined");
    }

    #[test]
    fn scheme_flag_over_config_file_keeps_scheme_dashing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("viewer.json");
        std::fs::write(&path, r#"{"chart": {"line_width": 2.0}}"#).unwrap();

        let config = viewer_config(&source_args(Some(SchemeArg::Numeric), Some(path))).unwrap();
        assert_eq!(config.scheme.name, "numeric");
        assert_eq!(config.chart.line_width, 2.0);
        assert!(config.dash_test_rows());
    }
}
