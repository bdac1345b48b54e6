//! Exact-match dictionary lookup.

use serde::Serialize;

use crate::error::{DictError, Result};
use crate::store::Store;

pub use crate::store::PosDefinitions;

/// Definitions shown per part of speech unless asked otherwise.
pub const DEFAULT_DEPTH: usize = 3;

/// Depth that shows every definition.
pub const FULL_DEPTH: usize = usize::MAX;

/// Outcome of a lookup. A miss is an ordinary result, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "results", rename_all = "snake_case")]
pub enum Lookup {
    /// One group per part of speech, ordered by part of speech.
    Found(Vec<PosDefinitions>),
    /// The word has no entry.
    NotFound,
}

impl Lookup {
    /// Whether the word was found.
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    /// The grouped definitions, empty on a miss.
    pub fn groups(&self) -> &[PosDefinitions] {
        match self {
            Lookup::Found(groups) => groups,
            Lookup::NotFound => &[],
        }
    }

    /// Convert a miss into [`DictError::NotFound`] for `word`.
    pub fn into_result(self, word: &str) -> Result<Vec<PosDefinitions>> {
        match self {
            Lookup::Found(groups) => Ok(groups),
            Lookup::NotFound => Err(DictError::not_found(word)),
        }
    }
}

/// Look up `word` and keep at most `depth` definitions per part of speech.
///
/// `word` must already be normalized (see [`crate::source::normalize_word`]).
pub fn lookup(store: &Store, word: &str, depth: usize) -> Result<Lookup> {
    if depth == 0 {
        return Err(DictError::invalid_argument("depth must be positive"));
    }

    let mut groups = store.entries_for(word)?;
    if groups.is_empty() {
        return Ok(Lookup::NotFound);
    }

    for group in &mut groups {
        group.definitions.truncate(depth);
    }
    Ok(Lookup::Found(groups))
}
