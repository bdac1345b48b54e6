//! Runtime configuration resolved from command line arguments and environment.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::cli::args::AdictArgs;
use crate::cli::select::SelectionMode;
use crate::error::{DictError, Result};
use crate::lookup::{DEFAULT_DEPTH, FULL_DEPTH};
use crate::store::Schema;
use crate::suggest::SuggestConfig;

/// Environment variable overriding the store location.
pub const STORE_ENV: &str = "ADICT_DB";

/// Environment variable overriding the build source location.
pub const SOURCE_ENV: &str = "ADICT_SOURCE";

/// Source used by `--generate` when none is given.
pub const DEFAULT_SOURCE: &str = "data/dictionary.json";

/// File name of the store inside the data directory.
pub const STORE_FILE_NAME: &str = "dictionary.db";

/// Settings for one run of the dictionary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DictConfig {
    /// Location of the SQLite store.
    pub store_path: PathBuf,
    /// JSON word list consumed by a build.
    pub source_path: PathBuf,
    /// Schema file for a build; the bundled schema when `None`.
    pub schema_path: Option<PathBuf>,
    /// Definitions shown per part of speech.
    pub depth: usize,
    /// Suggestion ranking settings.
    pub suggest: SuggestConfig,
    /// How a suggestion is picked when the word is unknown.
    pub selection: SelectionMode,
}

impl Default for DictConfig {
    fn default() -> Self {
        DictConfig {
            store_path: PathBuf::from(STORE_FILE_NAME),
            source_path: PathBuf::from(DEFAULT_SOURCE),
            schema_path: None,
            depth: DEFAULT_DEPTH,
            suggest: SuggestConfig::default(),
            selection: SelectionMode::Interactive,
        }
    }
}

impl DictConfig {
    /// Resolve the configuration for parsed arguments.
    ///
    /// The store path is taken from `--db` (or `ADICT_DB`, which clap folds into
    /// the same argument), falling back to [`default_store_path`].
    pub fn from_args(args: &AdictArgs) -> Result<Self> {
        let store_path = match &args.db {
            Some(path) => path.clone(),
            None => default_store_path()?,
        };

        let depth = if args.verbose {
            FULL_DEPTH
        } else {
            args.depth.unwrap_or(DEFAULT_DEPTH)
        };
        if depth == 0 {
            return Err(DictError::invalid_argument("--depth must be at least 1"));
        }
        if args.suggestions == 0 {
            return Err(DictError::invalid_argument(
                "--suggestions must be at least 1",
            ));
        }

        let selection = if args.auto || args.json_output() {
            SelectionMode::Auto
        } else {
            SelectionMode::Interactive
        };

        Ok(DictConfig {
            store_path,
            source_path: args.source.clone(),
            schema_path: args.schema.clone(),
            depth,
            suggest: SuggestConfig {
                limit: args.suggestions,
                metric: args.metric,
            },
            selection,
        })
    }

    /// Schema to apply when building.
    pub fn schema(&self) -> Schema {
        match &self.schema_path {
            Some(path) => Schema::File(path.clone()),
            None => Schema::Default,
        }
    }
}

/// `<data dir>/adict/dictionary.db`, e.g. `~/.local/share/adict/dictionary.db`.
pub fn default_store_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().ok_or_else(|| {
        DictError::other(format!(
            "could not determine the data directory; pass --db or set {STORE_ENV}"
        ))
    })?;
    Ok(data_dir.join("adict").join(STORE_FILE_NAME))
}
