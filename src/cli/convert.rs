//! Reading and printing JSON documents.

use super::CliError;
use crate::Value;
use crate::output::{to_json, to_json_pretty};

/// Parses the command input as a JSON document.
pub fn parse_document(input: Option<&str>) -> Result<Value, CliError> {
    let text = input.ok_or(CliError::NoInput)?;
    let json: serde_json::Value = serde_json::from_str(text)?;
    Ok(Value::from(json))
}

pub fn render_document(value: &Value, pretty: bool) -> String {
    if pretty {
        to_json_pretty(value)
    } else {
        to_json(value)
    }
}
