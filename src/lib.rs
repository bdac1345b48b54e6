//! # adict
//!
//! A command-line dictionary backed by a single SQLite file.
//!
//! ## Features
//!
//! - Streaming import of a JSON word list, merging repeated (word, part of speech)
//!   records in source order
//! - Atomic whole-file rebuilds
//! - Exact lookups grouped by part of speech with a per-group depth limit
//! - Edit-distance suggestions over the full vocabulary when a word is unknown
//!
//! ## Example
//!
//! ```no_run
//! use adict::prelude::*;
//!
//! # fn main() -> adict::error::Result<()> {
//! StoreBuilder::new().build_file("data/dictionary.json", "dictionary.db")?;
//!
//! let store = Store::open_read_only("dictionary.db")?;
//! match lookup(&store, &normalize_word("Serendipity"), DEFAULT_DEPTH)? {
//!     Lookup::Found(groups) => println!("{groups:?}"),
//!     Lookup::NotFound => println!("{:?}", suggest(&store, "serendipity", 3)?),
//! }
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod cli;
pub mod config;
pub mod error;
pub mod lookup;
pub mod source;
pub mod store;
pub mod suggest;

pub mod prelude {
    pub use crate::builder::{BuildConfig, StoreBuilder};
    pub use crate::error::{DictError, Result};
    pub use crate::lookup::{DEFAULT_DEPTH, FULL_DEPTH, Lookup, PosDefinitions, lookup};
    pub use crate::source::{RawRecord, RecordReader, normalize_word};
    pub use crate::store::{Schema, Store};
    pub use crate::suggest::{Candidate, DistanceMetric, SuggestConfig, Suggester, rank, suggest};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
