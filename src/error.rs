//! Error types for the adict library.
//!
//! All errors are represented by the [`DictError`] enum. The variants follow the
//! life of a dictionary: a source that cannot be decoded, a build that cannot be
//! written, a lookup that finds nothing, and a store that cannot be read.
//!
//! # Examples
//!
//! ```
//! use adict::error::{DictError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(DictError::invalid_argument("depth must be positive"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for adict operations.
#[derive(Error, Debug)]
pub enum DictError {
    /// The build source is not a well-formed sequence of records.
    #[error("Malformed source at record {index}: {reason}")]
    MalformedSource { index: usize, reason: String },

    /// Writing a record into the store failed; the build was rolled back.
    #[error("Build failed at record {index} ({word:?}): {reason}")]
    Build {
        index: usize,
        word: String,
        reason: String,
    },

    /// The word has no entry in the store.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The store is unreadable, corrupt, or not a dictionary store.
    #[error("Store error: {0}")]
    Store(String),

    /// A caller supplied an out-of-range argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// I/O errors (source file, schema file, target directory)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// SQLite errors that were not classified by the calling operation
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for operations that may fail with DictError.
pub type Result<T> = std::result::Result<T, DictError>;

impl DictError {
    /// Create a new malformed source error.
    pub fn malformed<S: Into<String>>(index: usize, reason: S) -> Self {
        DictError::MalformedSource {
            index,
            reason: reason.into(),
        }
    }

    /// Create a new build error for the record at `index`.
    pub fn build<W: Into<String>, S: ToString>(index: usize, word: W, reason: S) -> Self {
        DictError::Build {
            index,
            word: word.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a new not found error.
    pub fn not_found<S: Into<String>>(word: S) -> Self {
        DictError::NotFound(word.into())
    }

    /// Create a new store error.
    pub fn store<S: Into<String>>(msg: S) -> Self {
        DictError::Store(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        DictError::InvalidArgument(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        DictError::Other(msg.into())
    }

    /// Whether this error is the expected lookup miss.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DictError::NotFound(_))
    }
}
