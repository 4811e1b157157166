//! Compiled filter scripts.
//!
//! An [`Equation`] tree is flattened into a template with every operator
//! placed before its operands. Evaluating a candidate copies the template
//! into a scratch stack, resolves embedded paths against the candidate,
//! then sweeps the stack from the top down, replacing each operator and
//! its operands with the result.
//!
//! # Examples
//!
//! ```
//! use jsonpath_engine::{Script, Value};
//! use serde_json::json;
//!
//! let script = Script::parse("(@.price < 10 && @.tag == 'sale')").unwrap();
//! assert!(script.matches(&Value::from(json!({"price": 5, "tag": "sale"}))));
//! assert!(!script.matches(&Value::from(json!({"price": 15, "tag": "sale"}))));
//! ```

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};

use crate::ast::{Equation, Form, FormArg, Fragment, Operand, Operator};
use crate::encode::{append_float, append_string};
use crate::error::ParseError;
use crate::parser;
use crate::value::{Step, Value};

#[derive(Debug, Clone, PartialEq)]
enum Slot {
    Op(Operator),
    Operand(Operand),
}

/// A filter predicate in flat template form.
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    template: Vec<Slot>,
}

impl Script {
    /// Flattens an equation tree. A binary operator missing its right
    /// operand gets `null`.
    pub fn from_equation(eq: &Equation) -> Script {
        let mut template = Vec::new();
        compile(eq, &mut template);
        Script { template }
    }

    /// Parses a standalone script such as `(@.a == 1)`.
    pub fn parse(text: &str) -> Result<Script, ParseError> {
        parser::parse_script(text)
    }

    /// True if the script holds for `value` itself, with `value` also
    /// serving as the root for `$` paths.
    pub fn matches(&self, value: &Value) -> bool {
        self.eval(value, value).is_true()
    }

    /// Children of `data` the script selects, in iteration order. `$` paths
    /// inside the script are resolved against `root`. Scalars have no
    /// children and select nothing.
    pub fn select<'a>(&self, data: &'a Value, root: &'a Value) -> Vec<&'a Value> {
        data.children()
            .into_iter()
            .filter(|v| self.eval(v, root).is_true())
            .collect()
    }

    /// Like [`Script::select`] but pairs each selected child with the step
    /// that reaches it.
    pub fn select_entries<'a>(&self, data: &'a Value, root: &'a Value) -> Vec<(Step, &'a Value)> {
        data.entries()
            .into_iter()
            .filter(|(_, v)| self.eval(v, root).is_true())
            .collect()
    }

    /// Nested view of the template.
    pub fn inspect(&self) -> FormArg {
        let mut pos = 0;
        build_form(&self.template, &mut pos)
    }

    /// Appends the script in parenthesized form, `(@.x == 1)`.
    pub fn append_to(&self, buf: &mut String) {
        buf.push('(');
        let mut pos = 0;
        self.append_slot(buf, &mut pos);
        buf.push(')');
    }

    fn append_slot(&self, buf: &mut String, pos: &mut usize) {
        let Some(slot) = self.template.get(*pos) else {
            buf.push_str("null");
            return;
        };
        *pos += 1;
        let op = match slot {
            Slot::Operand(o) => {
                append_operand(buf, o);
                return;
            }
            Slot::Op(op) => *op,
        };
        match op {
            Operator::Not => {
                buf.push('!');
                self.append_child(buf, pos, op, false);
            }
            Operator::Length | Operator::Count => {
                buf.push_str(op.name());
                buf.push('(');
                self.append_slot(buf, pos);
                buf.push(')');
            }
            Operator::Match | Operator::Search => {
                buf.push_str(op.name());
                buf.push('(');
                self.append_slot(buf, pos);
                buf.push_str(", ");
                self.append_slot(buf, pos);
                buf.push(')');
            }
            _ => {
                self.append_child(buf, pos, op, false);
                buf.push(' ');
                buf.push_str(op.name());
                buf.push(' ');
                self.append_child(buf, pos, op, true);
            }
        }
    }

    fn append_child(&self, buf: &mut String, pos: &mut usize, parent: Operator, right: bool) {
        let wrap = match self.template.get(*pos) {
            Some(Slot::Op(child)) => needs_parens(*child, parent, right),
            _ => false,
        };
        if wrap {
            buf.push('(');
            self.append_slot(buf, pos);
            buf.push(')');
        } else {
            self.append_slot(buf, pos);
        }
    }

    fn eval<'s>(&'s self, elem: &'s Value, root: &'s Value) -> Term<'s> {
        let mut stack: Vec<Term<'s>> = Vec::with_capacity(self.template.len());
        for (i, slot) in self.template.iter().enumerate() {
            let term = match slot {
                Slot::Op(op) => Term::Op(*op),
                Slot::Operand(Operand::Path(x)) => {
                    let target = match x.fragments().first() {
                        Some(Fragment::Root) => root,
                        _ => elem,
                    };
                    let wants_list =
                        i > 0 && matches!(self.template[i - 1], Slot::Op(op) if op.gets_left());
                    if wants_list {
                        Term::Matches(x.get(target))
                    } else {
                        x.first(target).map_or(Term::Nothing, Term::from_value)
                    }
                }
                Slot::Operand(o) => Term::from_operand(o),
            };
            stack.push(term);
        }
        for i in (0..stack.len()).rev() {
            let Term::Op(op) = &stack[i] else {
                continue;
            };
            let op = *op;
            let end = (i + 1 + op.arity()).min(stack.len());
            let mut args = stack.drain(i + 1..end);
            let left = args.next().unwrap_or(Term::Nothing);
            let right = args.next().unwrap_or(Term::Nothing);
            drop(args);
            stack[i] = evaluate(op, left, right);
        }
        stack.into_iter().next().unwrap_or(Term::Nothing)
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = String::new();
        self.append_to(&mut buf);
        f.write_str(&buf)
    }
}

fn compile(eq: &Equation, out: &mut Vec<Slot>) {
    match eq {
        Equation::Value(v) => out.push(Slot::Operand(v.clone())),
        Equation::Op { op, left, right } => {
            out.push(Slot::Op(*op));
            compile(left, out);
            if op.arity() == 2 {
                match right {
                    Some(r) => compile(r, out),
                    None => out.push(Slot::Operand(Operand::Null)),
                }
            }
        }
    }
}

fn build_form(template: &[Slot], pos: &mut usize) -> FormArg {
    let Some(slot) = template.get(*pos) else {
        return FormArg::Operand(Operand::Null);
    };
    *pos += 1;
    match slot {
        Slot::Operand(o) => FormArg::Operand(o.clone()),
        Slot::Op(op) => {
            let left = Some(build_form(template, pos));
            let right = if op.arity() == 2 {
                Some(build_form(template, pos))
            } else {
                None
            };
            FormArg::Form(Box::new(Form {
                op: *op,
                left,
                right,
            }))
        }
    }
}

fn needs_parens(child: Operator, parent: Operator, right: bool) -> bool {
    if child.is_function() || child == Operator::Not || parent.is_function() {
        return false;
    }
    child.precedence() > parent.precedence() || (right && child.precedence() == parent.precedence())
}

fn append_operand(buf: &mut String, o: &Operand) {
    match o {
        Operand::Null => buf.push_str("null"),
        Operand::Nothing => buf.push_str("Nothing"),
        Operand::Bool(b) => buf.push_str(if *b { "true" } else { "false" }),
        Operand::Int(n) => buf.push_str(&n.to_string()),
        Operand::Float(f) => append_float(buf, *f),
        Operand::String(s) => append_string(buf, s, '\''),
        Operand::List(items) => {
            buf.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    buf.push(',');
                }
                append_operand(buf, item);
            }
            buf.push(']');
        }
        Operand::Regex(rx) => append_regex(buf, rx.as_str()),
        Operand::Path(x) => x.append_to(buf),
    }
}

fn append_regex(buf: &mut String, src: &str) {
    buf.push('/');
    let mut chars = src.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                buf.push('\\');
                if let Some(next) = chars.next() {
                    buf.push(next);
                }
            }
            '/' => buf.push_str("\\/"),
            _ => buf.push(c),
        }
    }
    buf.push('/');
}

// ============================================================================
// Evaluation
// ============================================================================

/// A slot of the scratch stack.
#[derive(Debug, Clone)]
enum Term<'s> {
    Op(Operator),
    Nothing,
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Cow<'s, str>),
    /// A container from the data
    Value(&'s Value),
    List(&'s [Operand]),
    /// Every match of a path, for `count`
    Matches(Vec<&'s Value>),
    Regex(&'s Regex),
}

impl<'s> Term<'s> {
    fn from_value(v: &'s Value) -> Term<'s> {
        match v {
            Value::Null => Term::Null,
            Value::Boolean(b) => Term::Bool(*b),
            Value::Integer(n) => Term::Int(*n),
            Value::Float(f) => Term::Float(*f),
            Value::String(s) => Term::Str(Cow::Borrowed(s)),
            _ => Term::Value(v),
        }
    }

    fn from_operand(o: &'s Operand) -> Term<'s> {
        match o {
            Operand::Null => Term::Null,
            Operand::Nothing | Operand::Path(_) => Term::Nothing,
            Operand::Bool(b) => Term::Bool(*b),
            Operand::Int(n) => Term::Int(*n),
            Operand::Float(f) => Term::Float(*f),
            Operand::String(s) => Term::Str(Cow::Borrowed(s)),
            Operand::List(items) => Term::List(items),
            Operand::Regex(rx) => Term::Regex(rx),
        }
    }

    fn is_true(&self) -> bool {
        matches!(self, Term::Bool(true))
    }

    fn len(&self) -> Option<usize> {
        match self {
            Term::Str(s) => Some(s.len()),
            Term::List(items) => Some(items.len()),
            Term::Matches(items) => Some(items.len()),
            Term::Value(v) => v.container_len(),
            _ => None,
        }
    }
}

fn evaluate<'s>(op: Operator, left: Term<'s>, right: Term<'s>) -> Term<'s> {
    match op {
        Operator::Equal => Term::Bool(equal(&left, &right)),
        Operator::NotEqual => Term::Bool(!equal(&left, &right)),
        Operator::LessThan => Term::Bool(compare(&left, &right) == Some(Ordering::Less)),
        Operator::GreaterThan => Term::Bool(compare(&left, &right) == Some(Ordering::Greater)),
        Operator::LessEqual => Term::Bool(matches!(
            compare(&left, &right),
            Some(Ordering::Less | Ordering::Equal)
        )),
        Operator::GreaterEqual => Term::Bool(matches!(
            compare(&left, &right),
            Some(Ordering::Greater | Ordering::Equal)
        )),
        Operator::And => Term::Bool(left.is_true() && right.is_true()),
        Operator::Or => Term::Bool(left.is_true() || right.is_true()),
        Operator::Not => Term::Bool(!left.is_true()),
        Operator::Add | Operator::Subtract | Operator::Multiply | Operator::Divide => {
            arithmetic(op, left, right)
        }
        Operator::In => Term::Bool(match &right {
            Term::List(items) => items
                .iter()
                .any(|o| equal(&left, &Term::from_operand(o))),
            Term::Value(v) if matches!(v, Value::Array(_) | Value::Indexed(_)) => v
                .children()
                .into_iter()
                .any(|c| equal(&left, &Term::from_value(c))),
            _ => false,
        }),
        Operator::Empty => match (left.len(), right) {
            (Some(n), Term::Bool(want)) => Term::Bool((n == 0) == want),
            _ => Term::Bool(false),
        },
        Operator::Has | Operator::Exists => match right {
            Term::Bool(want) => Term::Bool(want == !matches!(left, Term::Nothing)),
            _ => Term::Bool(false),
        },
        Operator::Regex => Term::Bool(match (&left, &right) {
            (Term::Str(s), Term::Regex(rx)) => rx.is_match(s),
            (Term::Str(s), Term::Str(p)) => Regex::new(p).is_ok_and(|rx| rx.is_match(s)),
            _ => false,
        }),
        Operator::Length => left
            .len()
            .and_then(|n| i64::try_from(n).ok())
            .map_or(Term::Nothing, Term::Int),
        Operator::Count => match left {
            Term::Matches(items) => i64::try_from(items.len()).map_or(Term::Nothing, Term::Int),
            _ => Term::Nothing,
        },
        Operator::Match | Operator::Search => {
            let pattern = match &right {
                Term::Str(p) => &**p,
                Term::Regex(rx) => rx.as_str(),
                _ => return Term::Nothing,
            };
            let Term::Str(s) = &left else {
                return Term::Nothing;
            };
            if pattern.is_empty() {
                return Term::Nothing;
            }
            let rx = if op == Operator::Match {
                Regex::new(&anchor(pattern))
            } else {
                Regex::new(pattern)
            };
            rx.map_or(Term::Nothing, |rx| Term::Bool(rx.is_match(s)))
        }
    }
}

fn anchor(pattern: &str) -> String {
    if pattern.starts_with('^') && pattern.ends_with('$') {
        pattern.to_string()
    } else {
        format!("^(?:{})$", pattern)
    }
}

fn equal(a: &Term, b: &Term) -> bool {
    match (a, b) {
        (Term::Null, Term::Null) => true,
        (Term::Bool(x), Term::Bool(y)) => x == y,
        (Term::Int(x), Term::Int(y)) => x == y,
        (Term::Float(x), Term::Float(y)) => x == y,
        (Term::Int(_), Term::Float(_)) | (Term::Float(_), Term::Int(_)) => {
            compare_numbers(a, b) == Some(Ordering::Equal)
        }
        (Term::Str(x), Term::Str(y)) => x == y,
        (Term::Value(x), Term::Value(y)) => x == y,
        (Term::List(x), Term::List(y)) => {
            x.len() == y.len()
                && x.iter()
                    .zip(y.iter())
                    .all(|(p, q)| equal(&Term::from_operand(p), &Term::from_operand(q)))
        }
        (Term::Value(v), Term::List(items)) | (Term::List(items), Term::Value(v)) => {
            let children = v.children();
            matches!(v, Value::Array(_) | Value::Indexed(_))
                && children.len() == items.len()
                && children
                    .into_iter()
                    .zip(items.iter())
                    .all(|(c, o)| equal(&Term::from_value(c), &Term::from_operand(o)))
        }
        (Term::Regex(x), Term::Regex(y)) => x.as_str() == y.as_str(),
        _ => false,
    }
}

fn compare(a: &Term, b: &Term) -> Option<Ordering> {
    match (a, b) {
        (Term::Str(x), Term::Str(y)) => Some(x.cmp(y)),
        _ => compare_numbers(a, b),
    }
}

fn compare_numbers(a: &Term, b: &Term) -> Option<Ordering> {
    match (a, b) {
        (Term::Int(x), Term::Int(y)) => Some(x.cmp(y)),
        (Term::Float(x), Term::Float(y)) => x.partial_cmp(y),
        (Term::Int(x), Term::Float(y)) => compare_mixed(*x, *y),
        (Term::Float(x), Term::Int(y)) => compare_mixed(*y, *x).map(Ordering::reverse),
        _ => None,
    }
}

fn compare_mixed(i: i64, f: f64) -> Option<Ordering> {
    if let Some(fd) = Decimal::from_f64(f) {
        return Some(Decimal::from(i).cmp(&fd));
    }
    (i as f64).partial_cmp(&f)
}

fn arithmetic<'s>(op: Operator, left: Term<'s>, right: Term<'s>) -> Term<'s> {
    match (left, right) {
        (Term::Int(x), Term::Int(y)) => {
            let r = match op {
                Operator::Add => x.checked_add(y),
                Operator::Subtract => x.checked_sub(y),
                Operator::Multiply => x.checked_mul(y),
                _ => x.checked_div(y),
            };
            r.map_or(Term::Nothing, Term::Int)
        }
        (Term::Float(x), Term::Float(y)) => float_arithmetic(op, x, y),
        (Term::Int(x), Term::Float(y)) => {
            mixed_arithmetic(op, x as f64, y, Some(Decimal::from(x)), Decimal::from_f64(y))
        }
        (Term::Float(x), Term::Int(y)) => {
            mixed_arithmetic(op, x, y as f64, Decimal::from_f64(x), Some(Decimal::from(y)))
        }
        (Term::Str(x), Term::Str(y)) if op == Operator::Add => {
            Term::Str(Cow::Owned(format!("{}{}", x, y)))
        }
        _ => Term::Nothing,
    }
}

fn mixed_arithmetic<'s>(
    op: Operator,
    x: f64,
    y: f64,
    dx: Option<Decimal>,
    dy: Option<Decimal>,
) -> Term<'s> {
    if let (Some(dx), Some(dy)) = (dx, dy) {
        let r = match op {
            Operator::Add => dx.checked_add(dy),
            Operator::Subtract => dx.checked_sub(dy),
            Operator::Multiply => dx.checked_mul(dy),
            _ => dx.checked_div(dy),
        };
        if let Some(f) = r.and_then(|r| r.to_f64()) {
            return Term::Float(f);
        }
    }
    float_arithmetic(op, x, y)
}

fn float_arithmetic<'s>(op: Operator, x: f64, y: f64) -> Term<'s> {
    match op {
        Operator::Add => Term::Float(x + y),
        Operator::Subtract => Term::Float(x - y),
        Operator::Multiply => Term::Float(x * y),
        _ if y == 0.0 => Term::Nothing,
        _ => Term::Float(x / y),
    }
}
