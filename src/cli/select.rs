//! Picking one suggestion out of a ranked list.
//!
//! Ranking lives in [`crate::suggest`]; this is the caller-side policy that turns
//! the list into at most one word to look up.

use std::io::{BufRead, Write};

use serde::{Deserialize, Serialize};

use crate::cli::output::{BOLD, RESET};
use crate::error::Result;
use crate::suggest::Candidate;

/// How a suggestion is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// Take the best-ranked candidate.
    Auto,
    /// Print a numbered menu and read the choice.
    Interactive,
}

/// Choose a candidate according to `mode`.
///
/// `styled` makes the menu heading bold. Returns `None` when there is nothing to choose, the user picks `0`, the input
/// is closed, or the input is not a valid choice.
pub fn select<'c, R, W>(
    candidates: &'c [Candidate],
    mode: SelectionMode,
    styled: bool,
    input: &mut R,
    output: &mut W,
) -> Result<Option<&'c Candidate>>
where
    R: BufRead,
    W: Write,
{
    if candidates.is_empty() {
        return Ok(None);
    }

    match mode {
        SelectionMode::Auto => Ok(candidates.first()),
        SelectionMode::Interactive => prompt(candidates, styled, input, output),
    }
}

fn prompt<'c, R, W>(
    candidates: &'c [Candidate],
    styled: bool,
    input: &mut R,
    output: &mut W,
) -> Result<Option<&'c Candidate>>
where
    R: BufRead,
    W: Write,
{
    if styled {
        writeln!(output, "{BOLD}Did you mean:{RESET}")?;
    } else {
        writeln!(output, "Did you mean:")?;
    }
    for (i, candidate) in candidates.iter().enumerate() {
        writeln!(output, "{}. {}", i + 1, candidate.word)?;
    }
    writeln!(output, "0. Exit")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }

    match line.trim().parse::<usize>() {
        Ok(0) => Ok(None),
        Ok(n) if n <= candidates.len() => Ok(candidates.get(n - 1)),
        _ => {
            writeln!(output, "Invalid input. Please enter a valid number.")?;
            Ok(None)
        }
    }
}
