use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    name = "bead-view",
    version,
    about = "Bead-level overlays for NIR/VIS weld recordings"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactive terminal dashboard.
    View(SourceArgs),
    /// Write the chart of one recording as SVG.
    Render(RenderArgs),
    /// Print the overlay of one recording as JSON.
    Segments(SourceArgs),
    /// List the CSV recordings found under a path.
    Members(MembersArgs),
    /// List the label columns offered by a metadata file.
    Columns(ColumnsArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SchemeArg {
    Numeric,
    Named,
    Refined,
}

impl SchemeArg {
    pub fn preset_name(self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Named => "named",
            Self::Refined => "refined",
        }
    }
}

#[derive(Debug, Args)]
pub struct SourceArgs {
    #[arg(long, help = "Directory of extracted recordings, or a single CSV")]
    pub data: PathBuf,

    #[arg(long, help = "Bead metadata CSV")]
    pub metadata: PathBuf,

    #[arg(long, help = "Recording to show (default: first member)")]
    pub member: Option<String>,

    #[arg(long, help = "Label column used for coloring")]
    pub label_column: Option<String>,

    #[arg(long, value_enum, help = "Labeling preset (default: refined)")]
    pub scheme: Option<SchemeArg>,

    #[arg(long, help = "JSON viewer config; --scheme overrides its scheme")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct RenderArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[arg(long)]
    pub out: PathBuf,

    #[arg(long, default_value_t = 1200.0)]
    pub width: f64,

    #[arg(long, default_value_t = 700.0)]
    pub height: f64,

    #[arg(long, default_value_t = false)]
    pub dark: bool,
}

#[derive(Debug, Args)]
pub struct MembersArgs {
    #[arg(long)]
    pub data: PathBuf,
}

#[derive(Debug, Args)]
pub struct ColumnsArgs {
    #[arg(long)]
    pub metadata: PathBuf,
}
