//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "prezzario")]
#[command(
    version,
    about = "Match construction activity descriptions against Italian price catalogs"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (defaults to the per-user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "cli")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the chunk corpus from a catalog directory
    Build(BuildArgs),

    /// Find the best-matching catalog activity for a query
    Search(SearchArgs),

    /// Show corpus and embedding cache status
    Status,
}

#[derive(Args)]
pub struct BuildArgs {
    /// Directory of catalog .txt files
    pub catalog_dir: PathBuf,

    /// Also encode the corpus and write the embedding cache
    #[arg(long)]
    pub embed: bool,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Free-text description of the construction activity
    pub query: Vec<String>,

    /// Candidates retrieved per refined query
    #[arg(short = 'n', long)]
    pub top_k: Option<usize>,

    /// Lexical weight in score fusion, 0.0 to 1.0
    #[arg(long)]
    pub alpha: Option<f64>,

    /// Judge score (0-100) at which the search stops early
    #[arg(long)]
    pub threshold: Option<u8>,

    /// Include the full chunk text in the output
    #[arg(long)]
    pub full: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Cli,
    Json,
}
