//! JSONPath queries and in-place updates over JSON-like values.
//!
//! A path is parsed once into an [`Expr`] and can then be evaluated any
//! number of times, from any thread:
//!
//! ```
//! use jsonpath_engine::{Value, parse};
//! use serde_json::json;
//!
//! let data = Value::from(json!({"book": [
//!     {"title": "X", "price": 5},
//!     {"title": "Y", "price": 20}
//! ]}));
//! let x = parse("$..book[?(@.price < 10)].title").unwrap();
//! assert_eq!(x.get(&data), vec![&Value::from("X")]);
//! ```
//!
//! The same expression drives [`Expr::set`], [`Expr::del`],
//! [`Expr::modify`] and [`Expr::remove`]. User containers take part through
//! the [`Keyed`] and [`Indexed`] traits, and serde types through [`Record`].
pub mod ast;
pub mod encode;
pub mod error;
pub mod evaluator;
pub mod mutator;
pub mod output;
pub mod parser;
pub mod record;
pub mod script;
pub mod value;
pub mod walk;

#[cfg(feature = "cli")]
pub mod cli;

pub use ast::{Equation, Expr, Fragment, Operand, Operator};
pub use error::{AssignError, MutationError, ParseError};
pub use output::{to_json, to_json_pretty};
pub use parser::{parse, parse_bytes};
pub use record::Record;
pub use script::Script;
pub use value::{Indexed, Keyed, Map, Step, Value};
pub use walk::walk;
