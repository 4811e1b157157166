use regex::Regex;

use super::{Expr, Fragment, Operator};
use crate::script::Script;

/// A terminal value inside a filter equation.
#[derive(Debug, Clone)]
pub enum Operand {
    Null,
    /// The absence of a value, distinct from `Null`.
    Nothing,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Operand>),
    Regex(Regex),
    /// An embedded path, resolved per candidate element.
    Path(Expr),
}

impl PartialEq for Operand {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Operand::Null, Operand::Null) => true,
            (Operand::Nothing, Operand::Nothing) => true,
            (Operand::Bool(a), Operand::Bool(b)) => a == b,
            (Operand::Int(a), Operand::Int(b)) => a == b,
            (Operand::Float(a), Operand::Float(b)) => a == b,
            (Operand::String(a), Operand::String(b)) => a == b,
            (Operand::List(a), Operand::List(b)) => a == b,
            (Operand::Regex(a), Operand::Regex(b)) => a.as_str() == b.as_str(),
            (Operand::Path(a), Operand::Path(b)) => a == b,
            _ => false,
        }
    }
}

impl From<bool> for Operand {
    fn from(b: bool) -> Self {
        Operand::Bool(b)
    }
}

impl From<i64> for Operand {
    fn from(n: i64) -> Self {
        Operand::Int(n)
    }
}

impl From<i32> for Operand {
    fn from(n: i32) -> Self {
        Operand::Int(i64::from(n))
    }
}

impl From<f64> for Operand {
    fn from(n: f64) -> Self {
        Operand::Float(n)
    }
}

impl From<&str> for Operand {
    fn from(s: &str) -> Self {
        Operand::String(s.to_string())
    }
}

impl From<String> for Operand {
    fn from(s: String) -> Self {
        Operand::String(s)
    }
}

impl From<Expr> for Operand {
    fn from(x: Expr) -> Self {
        Operand::Path(x)
    }
}

impl From<Regex> for Operand {
    fn from(rx: Regex) -> Self {
        Operand::Regex(rx)
    }
}

impl From<Vec<Operand>> for Operand {
    fn from(list: Vec<Operand>) -> Self {
        Operand::List(list)
    }
}

/// Tree form of a filter predicate, compiled into a [`Script`] before use.
///
/// # Examples
///
/// ```
/// use jsonpath_engine::ast::{Equation, Expr, Operator};
///
/// let eq = Equation::binary(
///     Operator::LessThan,
///     Equation::value(Expr::at().child("price")),
///     Equation::value(10),
/// );
/// assert_eq!(eq.script().to_string(), "(@.price < 10)");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Equation {
    Value(Operand),
    Op {
        op: Operator,
        left: Box<Equation>,
        right: Option<Box<Equation>>,
    },
}

impl Equation {
    pub fn value(v: impl Into<Operand>) -> Self {
        Equation::Value(v.into())
    }

    pub fn unary(op: Operator, left: Equation) -> Self {
        Equation::Op {
            op,
            left: Box::new(left),
            right: None,
        }
    }

    pub fn binary(op: Operator, left: Equation, right: Equation) -> Self {
        Equation::Op {
            op,
            left: Box::new(left),
            right: Some(Box::new(right)),
        }
    }

    /// Compiles the equation into a flat script.
    pub fn script(&self) -> Script {
        Script::from_equation(self)
    }

    /// Compiles the equation into a filter fragment.
    pub fn filter(&self) -> Fragment {
        Fragment::Filter(self.script())
    }
}

/// One argument of an inspected [`Form`].
#[derive(Debug, Clone, PartialEq)]
pub enum FormArg {
    Form(Box<Form>),
    Operand(Operand),
}

/// One operator of a compiled script with its arguments, as produced by
/// [`Script::inspect`].
#[derive(Debug, Clone, PartialEq)]
pub struct Form {
    pub op: Operator,
    pub left: Option<FormArg>,
    pub right: Option<FormArg>,
}
