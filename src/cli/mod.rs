//! Command implementations behind the `jpath` binary.
//!
//! Each command takes its options as a plain struct and returns the text to
//! print, so the commands can be driven without a terminal.

mod convert;
mod mutate;
mod query;
mod walk;

pub use convert::{parse_document, render_document};
pub use mutate::{MutateOptions, Mutation, execute_mutation};
pub use query::{QueryMode, QueryOptions, execute_fmt, execute_query};
pub use walk::{WalkOptions, execute_walk};

use std::io;

use thiserror::Error;

/// Errors reported by the CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Parse error: {0}")]
    Parse(#[from] crate::ParseError),

    #[error("Mutation error: {0}")]
    Mutation(#[from] crate::MutationError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("No input provided. Use --input or pipe JSON to stdin.")]
    NoInput,

    #[error("no match for {0}")]
    NoMatch(String),
}
