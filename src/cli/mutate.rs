//! Commands that change the document: set, del and remove.

use super::{CliError, parse_document, render_document};
use crate::{Value, parse};

/// The change to apply at every match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Write the given JSON value
    Set(String),
    Del,
    Remove,
}

/// Options for the mutation commands
#[derive(Debug, Clone, Default)]
pub struct MutateOptions {
    /// The path expression
    pub path: String,
    /// JSON input string
    pub input: Option<String>,
    /// Pretty-print the output
    pub pretty: bool,
    /// Stop after the first change
    pub one: bool,
}

/// Applies `mutation` and returns the resulting document.
pub fn execute_mutation(options: &MutateOptions, mutation: &Mutation) -> Result<String, CliError> {
    let x = parse(&options.path)?;
    let mut data = parse_document(options.input.as_deref())?;
    match mutation {
        Mutation::Set(json) => {
            let value = Value::from(serde_json::from_str::<serde_json::Value>(json)?);
            if options.one {
                x.set_one(&mut data, value)?;
            } else {
                x.set(&mut data, value)?;
            }
        }
        Mutation::Del if options.one => x.del_one(&mut data)?,
        Mutation::Del => x.del(&mut data)?,
        Mutation::Remove if options.one => x.remove_one(&mut data)?,
        Mutation::Remove => x.remove(&mut data)?,
    }
    Ok(render_document(&data, options.pretty))
}
