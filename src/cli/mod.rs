//! Command Line Interface for the adict dictionary.

pub mod args;
pub mod commands;
pub mod output;
pub mod select;

// Re-export commonly used types
pub use args::*;
pub use commands::*;
pub use output::*;
pub use select::*;
