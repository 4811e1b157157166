//! Read-only commands: get, first, has and fmt.

use super::{CliError, parse_document, render_document};
use crate::{Value, parse};

/// What a query prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    /// Every match, as a JSON array
    Get,
    /// The first match
    First,
    /// `true` or `false`
    Has,
}

/// Options for the query commands
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// The path expression
    pub path: String,
    /// JSON input string
    pub input: Option<String>,
    /// Pretty-print the output
    pub pretty: bool,
}

/// Runs a query and returns the text to print.
pub fn execute_query(options: &QueryOptions, mode: QueryMode) -> Result<String, CliError> {
    let x = parse(&options.path)?;
    let data = parse_document(options.input.as_deref())?;
    let out = match mode {
        QueryMode::Get => {
            let found = Value::Array(x.get(&data).into_iter().cloned().collect());
            render_document(&found, options.pretty)
        }
        QueryMode::First => match x.first(&data) {
            Some(v) => render_document(v, options.pretty),
            None => return Err(CliError::NoMatch(x.to_string())),
        },
        QueryMode::Has => x.has(&data).to_string(),
    };
    Ok(out)
}

/// Parses a path and returns its canonical form.
pub fn execute_fmt(path: &str) -> Result<String, CliError> {
    Ok(parse(path)?.to_string())
}
