//! Output formatting for CLI commands.

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::cli::args::OutputFormat;
use crate::error::Result;
use crate::store::{PosDefinitions, StoreStats};
use crate::suggest::Candidate;

pub(crate) const BOLD: &str = "\x1b[1m";
pub(crate) const RESET: &str = "\x1b[0m";

/// Result structure for a word lookup, including any suggestion fallback.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefinitionResult {
    /// The normalized word that was asked for.
    pub query: String,
    /// The word whose definitions are shown; differs from `query` after a
    /// suggestion was taken, absent when nothing was shown.
    pub word: Option<String>,
    pub results: Vec<PosDefinitions>,
    /// Ranked suggestions, only filled on a miss.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub suggestions: Vec<Candidate>,
}

/// Result structure for a build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildResult {
    pub store: String,
    pub source: String,
    pub records: usize,
    pub merged: usize,
    pub duration_ms: u64,
}

/// How results are rendered.
#[derive(Debug, Clone, Copy)]
pub struct OutputStyle {
    pub format: OutputFormat,
    pub pretty: bool,
    /// Emphasize headings with terminal escapes.
    pub styled: bool,
}

impl OutputStyle {
    /// Plain human-readable output.
    pub fn plain() -> Self {
        OutputStyle {
            format: OutputFormat::Human,
            pretty: false,
            styled: false,
        }
    }
}

/// Print the definitions of one word in human format.
///
/// ```text
/// run (noun)
///   1. a sprint
/// ```
pub fn write_definitions<W: Write>(
    out: &mut W,
    word: &str,
    groups: &[PosDefinitions],
    styled: bool,
) -> Result<()> {
    for group in groups {
        if styled {
            writeln!(out, "{BOLD}{word} ({}){RESET}", group.pos)?;
        } else {
            writeln!(out, "{word} ({})", group.pos)?;
        }
        for (i, definition) in group.definitions.iter().enumerate() {
            writeln!(out, "  {}. {}", i + 1, definition)?;
        }
    }
    Ok(())
}

/// Print a lookup result in the requested format.
pub fn write_definition_result<W: Write>(
    out: &mut W,
    result: &DefinitionResult,
    style: OutputStyle,
) -> Result<()> {
    match style.format {
        OutputFormat::Json => write_json(out, result, style.pretty),
        OutputFormat::Human => match &result.word {
            Some(word) => write_definitions(out, word, &result.results, style.styled),
            None if result.suggestions.is_empty() => {
                writeln!(out, "No entry or suggestion found for {:?}", result.query)?;
                Ok(())
            }
            None => Ok(()),
        },
    }
}

/// Print store statistics.
pub fn write_stats<W: Write>(out: &mut W, stats: &StoreStats, style: OutputStyle) -> Result<()> {
    match style.format {
        OutputFormat::Json => write_json(out, stats, style.pretty),
        OutputFormat::Human => {
            writeln!(out, "Dictionary Statistics:")?;
            writeln!(out, "══════════════════════")?;
            writeln!(out, "Words: {}", stats.words)?;
            writeln!(out, "Entries: {}", stats.entries)?;
            Ok(())
        }
    }
}

/// Print a build summary.
pub fn write_build_result<W: Write>(
    out: &mut W,
    result: &BuildResult,
    style: OutputStyle,
) -> Result<()> {
    match style.format {
        OutputFormat::Json => write_json(out, result, style.pretty),
        OutputFormat::Human => {
            writeln!(
                out,
                "Built {} from {}: {} records ({} merged) in {}ms",
                result.store, result.source, result.records, result.merged, result.duration_ms
            )?;
            Ok(())
        }
    }
}

/// Print any serializable value as one JSON document.
pub fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T, pretty: bool) -> Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut *out, value)?;
    } else {
        serde_json::to_writer(&mut *out, value)?;
    }
    writeln!(out)?;
    Ok(())
}
