//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Browse and cache paginated catalog listings
#[derive(Parser, Debug)]
#[command(name = "catalog-pager")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// API key (overrides the configuration file and CATALOG_API_KEY)
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Cache database file (overrides the configuration file)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Page through a remote collection without caching
    Browse {
        /// Collection name, e.g. now_playing, popular, top_rated
        #[arg(default_value = "now_playing")]
        collection: String,

        /// Record kind
        #[arg(short, long, default_value = "movie")]
        kind: CatalogKind,

        /// Genre id filter
        #[arg(long)]
        genre: Option<String>,

        /// Number of pages to fetch
        #[arg(short, long, default_value = "1")]
        pages: usize,

        /// First page to fetch
        #[arg(long)]
        start_page: Option<u32>,
    },

    /// Refresh the local cache and append further pages
    Sync {
        /// Collection name, e.g. now_playing, popular, top_rated
        #[arg(default_value = "now_playing")]
        collection: String,

        /// Record kind (movie or tv)
        #[arg(short, long, default_value = "movie")]
        kind: CatalogKind,

        /// Genre id filter
        #[arg(long)]
        genre: Option<String>,

        /// Number of local pages to make visible
        #[arg(short, long, default_value = "1")]
        pages: usize,
    },

    /// Show cached rows
    Cache {
        /// Record kind (movie or tv)
        #[arg(short, long, default_value = "movie")]
        kind: CatalogKind,

        /// First row to show
        #[arg(long, default_value = "0")]
        offset: usize,

        /// Maximum rows to show (defaults to the page size)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Remove every cached row
    Clear {
        /// Record kind (movie or tv)
        #[arg(short, long, default_value = "movie")]
        kind: CatalogKind,
    },

    /// Remove one cached row
    Delete {
        /// Id of the row
        id: i64,

        /// Record kind (movie or tv)
        #[arg(short, long, default_value = "movie")]
        kind: CatalogKind,
    },
}

/// Kind of catalog record
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CatalogKind {
    Movie,
    Tv,
    /// People; remote browsing only
    People,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}
