//! Command line argument parsing for the adict CLI using clap.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_SOURCE, SOURCE_ENV, STORE_ENV};
use crate::suggest::{DEFAULT_SUGGESTIONS, DistanceMetric};

/// adict - look up a word, with suggestions when it is misspelled
#[derive(Parser, Debug, Clone)]
#[command(name = "adict")]
#[command(about = "Look up definitions in a local dictionary")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct AdictArgs {
    /// Word to look up
    #[arg(value_name = "WORD", required_unless_present_any = ["generate", "stats"])]
    pub word: Option<String>,

    /// Path to dictionary.db
    #[arg(long, value_name = "PATH", env = STORE_ENV)]
    pub db: Option<PathBuf>,

    /// Show full results (otherwise defaults to 3 definitions per part of speech)
    #[arg(long, conflicts_with = "depth")]
    pub verbose: bool,

    /// Definitions shown per part of speech
    #[arg(long, value_name = "N")]
    pub depth: Option<usize>,

    /// Number of suggestions offered for an unknown word
    #[arg(long, value_name = "K", default_value_t = DEFAULT_SUGGESTIONS)]
    pub suggestions: usize,

    /// Distance used to rank suggestions
    #[arg(long, value_enum, default_value_t = DistanceMetric::Levenshtein)]
    pub metric: DistanceMetric,

    /// Look up the closest suggestion instead of asking
    #[arg(long)]
    pub auto: bool,

    /// Generate the database from the source word list
    #[arg(long)]
    pub generate: bool,

    /// JSON word list used by --generate
    #[arg(long, value_name = "PATH", env = SOURCE_ENV, default_value = DEFAULT_SOURCE)]
    pub source: PathBuf,

    /// Schema file used by --generate (the bundled schema by default)
    #[arg(long, value_name = "PATH")]
    pub schema: Option<PathBuf>,

    /// Show store statistics
    #[arg(long, conflicts_with = "generate")]
    pub stats: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Log more (-d info, -dd debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub debug: u8,
}

impl AdictArgs {
    /// Get the effective log verbosity (0=errors, 1=warnings, 2=info, 3+=debug)
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.debug.saturating_add(1)
        }
    }

    /// Whether output is machine readable.
    pub fn json_output(&self) -> bool {
        matches!(self.output_format, OutputFormat::Json)
    }
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
