//! # Path Expression Model
//!
//! The typed building blocks of a compiled path and of the filter scripts
//! embedded in it.
//!
//! - **[fragment]** - Fragments (`$`, `.name`, `[n]`, `..`, `[a:b:c]`, ...) and [`Expr`]
//! - **[operators]** - Script operators with precedence and arity
//! - **[equation]** - Filter equations and their terminal operands
//!
//! ## Grammar
//!
//! ```text
//! Path     := Root? Segment*
//! Segment  := '.' Name | '.' '*' | '..' | '[' Bracketed ']'
//! Bracketed:= '*' | Nth | Slice | Quoted (',' Quoted | ',' Nth)* | '?' Filter
//! Filter   := '(' Equation ')'
//! ```
//!
//! Every fragment renders back to text that parses to the same fragment.
pub mod equation;
pub mod fragment;
pub mod operators;

pub use equation::{Equation, Form, FormArg, Operand};
pub use fragment::{Expr, Fragment, MAX_END, Slice, UnionKey};
pub use operators::Operator;
