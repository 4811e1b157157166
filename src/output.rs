//! JSON output for [`Value`]s.
//!
//! Both compact and pretty forms keep object keys in iteration order, so a
//! document read, mutated and printed again keeps its layout. User
//! containers are printed through their `Keyed`/`Indexed` capabilities.
//!
//! # Examples
//!
//! ```
//! use jsonpath_engine::Value;
//! use jsonpath_engine::output::{to_json, to_json_pretty};
//! use serde_json::json;
//!
//! let value = Value::from(json!({"b": 1, "a": [true, null]}));
//! assert_eq!(to_json(&value), r#"{"b":1,"a":[true,null]}"#);
//! assert_eq!(to_json_pretty(&Value::Integer(42)), "42");
//! ```

use crate::encode::{append_float, append_string};
use crate::value::{Step, Value};

pub struct JsonPrinter {
    pretty: bool,
}

impl JsonPrinter {
    pub fn new(pretty: bool) -> Self {
        JsonPrinter { pretty }
    }

    pub fn print(&self, value: &Value) -> String {
        let mut buf = String::new();
        self.print_value(&mut buf, value, 0);
        buf
    }

    fn print_value(&self, buf: &mut String, value: &Value, indent: usize) {
        match value {
            Value::Null => buf.push_str("null"),
            Value::Boolean(b) => buf.push_str(if *b { "true" } else { "false" }),
            Value::Integer(n) => buf.push_str(&n.to_string()),
            Value::Float(n) if n.is_finite() => append_float(buf, *n),
            Value::Float(_) => buf.push_str("null"),
            Value::String(s) => append_string(buf, s, '"'),
            Value::Array(_) | Value::Indexed(_) => {
                self.print_array(buf, &value.children(), indent)
            }
            Value::Object(_) | Value::Keyed(_) => {
                let members: Vec<(String, &Value)> = value
                    .entries()
                    .into_iter()
                    .filter_map(|(step, v)| match step {
                        Step::Key(k) => Some((k, v)),
                        Step::Index(_) => None,
                    })
                    .collect();
                self.print_object(buf, &members, indent)
            }
        }
    }

    fn print_array(&self, buf: &mut String, items: &[&Value], indent: usize) {
        if items.is_empty() {
            buf.push_str("[]");
            return;
        }
        buf.push('[');
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                buf.push(',');
            }
            if self.pretty {
                buf.push('\n');
                self.indent(buf, indent + 1);
            }
            self.print_value(buf, item, indent + 1);
        }
        if self.pretty {
            buf.push('\n');
            self.indent(buf, indent);
        }
        buf.push(']');
    }

    fn print_object(&self, buf: &mut String, members: &[(String, &Value)], indent: usize) {
        if members.is_empty() {
            buf.push_str("{}");
            return;
        }
        buf.push('{');
        for (i, (key, item)) in members.iter().enumerate() {
            if i > 0 {
                buf.push(',');
            }
            if self.pretty {
                buf.push('\n');
                self.indent(buf, indent + 1);
            }
            append_string(buf, key, '"');
            buf.push(':');
            if self.pretty {
                buf.push(' ');
            }
            self.print_value(buf, item, indent + 1);
        }
        if self.pretty {
            buf.push('\n');
            self.indent(buf, indent);
        }
        buf.push('}');
    }

    fn indent(&self, buf: &mut String, level: usize) {
        for _ in 0..level {
            buf.push_str("  ");
        }
    }
}

/// Converts a Value to compact JSON.
pub fn to_json(value: &Value) -> String {
    JsonPrinter::new(false).print(value)
}

/// Converts a Value to JSON with 2-space indentation, one member per line.
pub fn to_json_pretty(value: &Value) -> String {
    JsonPrinter::new(true).print(value)
}
