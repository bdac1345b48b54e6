//! Command implementations for the adict CLI.

use std::io::{self, BufRead, IsTerminal, Write};
use std::time::Instant;

use log::{debug, info};

use crate::builder::{BuildConfig, StoreBuilder};
use crate::cli::args::AdictArgs;
use crate::cli::output::*;
use crate::cli::select::select;
use crate::config::DictConfig;
use crate::error::Result;
use crate::lookup::{Lookup, lookup};
use crate::source::normalize_word;
use crate::store::Store;
use crate::suggest::Suggester;

/// Execute the command described by `args`.
pub fn execute_command(args: AdictArgs) -> Result<()> {
    let config = DictConfig::from_args(&args)?;
    let stdout = io::stdout();
    let style = OutputStyle {
        format: args.output_format,
        pretty: args.pretty,
        styled: stdout.is_terminal(),
    };
    let mut out = stdout.lock();

    if args.generate {
        return generate(&config, style, &mut out);
    }
    if args.stats {
        return show_stats(&config, style, &mut out);
    }

    let word = args.word.as_deref().unwrap_or_default();
    let stdin = io::stdin();
    let result = define_word(&config, word, style.styled, &mut stdin.lock(), &mut out)?;
    write_definition_result(&mut out, &result, style)
}

/// Rebuild the store from the configured source.
pub fn generate<W: Write>(config: &DictConfig, style: OutputStyle, out: &mut W) -> Result<()> {
    let builder = StoreBuilder::with_config(BuildConfig {
        schema: config.schema(),
        ..BuildConfig::default()
    });

    let start = Instant::now();
    let report = builder.build_file(&config.source_path, &config.store_path)?;

    write_build_result(
        out,
        &BuildResult {
            store: config.store_path.to_string_lossy().to_string(),
            source: config.source_path.to_string_lossy().to_string(),
            records: report.records,
            merged: report.merged,
            duration_ms: start.elapsed().as_millis() as u64,
        },
        style,
    )
}

/// Print word and entry counts of the configured store.
pub fn show_stats<W: Write>(config: &DictConfig, style: OutputStyle, out: &mut W) -> Result<()> {
    let store = Store::open_read_only(&config.store_path)?;
    let stats = store.stats()?;
    write_stats(out, &stats, style)
}

/// Look up `word`, falling back to a suggestion when it has no entry.
///
/// The suggestion menu, if any, is written to `output` (bold heading when
/// `styled`) and the choice read from `input`. The returned result carries the definitions that should be shown,
/// which are empty when the user declined every suggestion.
pub fn define_word<R, W>(
    config: &DictConfig,
    word: &str,
    styled: bool,
    input: &mut R,
    output: &mut W,
) -> Result<DefinitionResult>
where
    R: BufRead,
    W: Write,
{
    let query = normalize_word(word);
    let store = Store::open_read_only(&config.store_path)?;

    if let Lookup::Found(results) = lookup(&store, &query, config.depth)? {
        return Ok(DefinitionResult {
            word: Some(query.clone()),
            query,
            results,
            suggestions: Vec::new(),
        });
    }

    debug!("No entry for {query:?}, ranking suggestions");
    let suggestions = Suggester::with_config(config.suggest).suggest(&store, &query)?;
    let mut result = DefinitionResult {
        query,
        ..DefinitionResult::default()
    };

    let chosen = select(&suggestions, config.selection, styled, input, output)?.cloned();
    if let Some(candidate) = chosen {
        info!("Using suggestion {:?} for {:?}", candidate.word, result.query);
        result.results = lookup(&store, &candidate.word, config.depth)?.into_result(&candidate.word)?;
        result.word = Some(candidate.word);
    }
    result.suggestions = suggestions;
    Ok(result)
}
