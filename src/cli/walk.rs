//! The walk command.

use super::{CliError, parse_document};
use crate::output::to_json;
use crate::walk;

/// Options for the walk command
#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    /// JSON input string
    pub input: Option<String>,
    /// Only report leaves
    pub leaves: bool,
}

/// Lists `path<TAB>value` for every node, one per line.
pub fn execute_walk(options: &WalkOptions) -> Result<String, CliError> {
    let data = parse_document(options.input.as_deref())?;
    let mut out = String::new();
    walk(
        &data,
        |path, value| {
            out.push_str(&path.to_string());
            out.push('\t');
            out.push_str(&to_json(value));
            out.push('\n');
        },
        options.leaves,
    );
    Ok(out)
}
