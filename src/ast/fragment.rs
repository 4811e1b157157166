use std::fmt;
use std::str::FromStr;

use crate::encode::append_string;
use crate::error::ParseError;
use crate::parser::{self, is_token_byte};
use crate::script::Script;

/// End bound used when a slice leaves its end open.
pub const MAX_END: i64 = 2147483647;

/// A `[start:end:step]` range over an ordered container.
///
/// The end is exclusive. Negative bounds count from the end of the
/// container and are resolved at evaluation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slice {
    pub start: i64,
    pub end: i64,
    pub step: i64,
}

impl Default for Slice {
    fn default() -> Self {
        Slice {
            start: 0,
            end: MAX_END,
            step: 1,
        }
    }
}

impl Slice {
    pub fn new(start: i64, end: i64, step: i64) -> Self {
        Slice { start, end, step }
    }

    /// Positions selected in a container of `len` elements, in selection
    /// order. A zero step selects nothing.
    pub fn indices(&self, len: usize) -> Vec<usize> {
        let step = self.step;
        let Ok(len) = i64::try_from(len) else {
            return Vec::new();
        };
        if step == 0 {
            return Vec::new();
        }
        let mut start = self.start;
        if start < 0 {
            start = (len + start).max(0);
        }
        let mut end = self.end;
        if end < 0 {
            end += len;
        }
        if len <= start {
            return Vec::new();
        }
        if len < end {
            end = len;
        }
        let mut out = Vec::new();
        let mut i = start;
        if 0 < step {
            while i < end {
                out.push(i as usize);
                match i.checked_add(step) {
                    Some(next) => i = next,
                    None => break,
                }
            }
        } else {
            end = end.max(-1);
            while end < i {
                out.push(i as usize);
                match i.checked_add(step) {
                    Some(next) => i = next,
                    None => break,
                }
            }
        }
        out
    }
}

/// A member of a union fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnionKey {
    Key(String),
    Index(i64),
}

impl From<&str> for UnionKey {
    fn from(s: &str) -> Self {
        UnionKey::Key(s.to_string())
    }
}

impl From<String> for UnionKey {
    fn from(s: String) -> Self {
        UnionKey::Key(s)
    }
}

impl From<i64> for UnionKey {
    fn from(i: i64) -> Self {
        UnionKey::Index(i)
    }
}

/// One step of a compiled path.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    /// `$`, the data the expression was evaluated against
    Root,
    /// `@`, the current value
    At,
    /// Rendering marker; forces the following fragments into bracket form
    Bracket,
    /// `.name` or `['name']`
    Child(String),
    /// `[n]`, negative counts from the end
    Nth(i64),
    /// `.*` or `[*]`
    Wildcard,
    /// `..`
    Descent,
    /// `[start:end:step]`
    Slice(Slice),
    /// `['a',0,...]`
    Union(Vec<UnionKey>),
    /// `[?(...)]`
    Filter(Script),
}

impl Fragment {
    /// Variant name used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Fragment::Root => "Root",
            Fragment::At => "At",
            Fragment::Bracket => "Bracket",
            Fragment::Child(_) => "Child",
            Fragment::Nth(_) => "Nth",
            Fragment::Wildcard => "Wildcard",
            Fragment::Descent => "Descent",
            Fragment::Slice(_) => "Slice",
            Fragment::Union(_) => "Union",
            Fragment::Filter(_) => "Filter",
        }
    }

    /// Appends the textual form of the fragment. `bracket` forces bracket
    /// form and `first` drops the leading `.` of dotted forms.
    pub fn append_to(&self, buf: &mut String, bracket: bool, first: bool) {
        match self {
            Fragment::Root => buf.push('$'),
            Fragment::At => buf.push('@'),
            Fragment::Bracket => {}
            Fragment::Child(name) => {
                if bracket || !is_bare_name(name) {
                    buf.push('[');
                    append_string(buf, name, '\'');
                    buf.push(']');
                } else {
                    if !first {
                        buf.push('.');
                    }
                    buf.push_str(name);
                }
            }
            Fragment::Nth(i) => {
                buf.push('[');
                buf.push_str(&i.to_string());
                buf.push(']');
            }
            Fragment::Wildcard => {
                if bracket {
                    buf.push_str("[*]");
                } else if first {
                    buf.push('*');
                } else {
                    buf.push_str(".*");
                }
            }
            Fragment::Descent => buf.push_str(".."),
            Fragment::Slice(s) => {
                buf.push('[');
                if s.start != 0 {
                    buf.push_str(&s.start.to_string());
                }
                buf.push(':');
                if s.end != MAX_END {
                    buf.push_str(&s.end.to_string());
                }
                if s.step != 1 {
                    buf.push(':');
                    buf.push_str(&s.step.to_string());
                }
                buf.push(']');
            }
            Fragment::Union(keys) => {
                buf.push('[');
                for (i, key) in keys.iter().enumerate() {
                    if i > 0 {
                        buf.push(',');
                    }
                    match key {
                        UnionKey::Key(k) => append_string(buf, k, '\''),
                        UnionKey::Index(n) => buf.push_str(&n.to_string()),
                    }
                }
                buf.push(']');
            }
            Fragment::Filter(script) => {
                buf.push_str("[?");
                script.append_to(buf);
                buf.push(']');
            }
        }
    }
}

fn is_bare_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(is_token_byte)
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = String::new();
        self.append_to(&mut buf, false, false);
        f.write_str(&buf)
    }
}

/// A compiled path expression: an ordered list of fragments.
///
/// Built by parsing or with the builder methods. An expression is never
/// changed by evaluation, so one value can be shared across threads.
///
/// # Examples
///
/// ```
/// use jsonpath_engine::Expr;
///
/// let x = Expr::root().child("store").child("book").wildcard().child("author");
/// assert_eq!(x.to_string(), "$.store.book.*.author");
///
/// let parsed: Expr = "$.store.book[*].author".parse().unwrap();
/// assert_eq!(parsed.len(), 5);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Expr {
    fragments: Vec<Fragment>,
}

impl Expr {
    pub fn new() -> Self {
        Expr::default()
    }

    /// Starts an expression with `$`.
    pub fn root() -> Self {
        Expr {
            fragments: vec![Fragment::Root],
        }
    }

    /// Starts an expression with `@`.
    pub fn at() -> Self {
        Expr {
            fragments: vec![Fragment::At],
        }
    }

    /// Starts an expression rendered in bracket form.
    pub fn bracket() -> Self {
        Expr {
            fragments: vec![Fragment::Bracket],
        }
    }

    pub fn push(mut self, fragment: Fragment) -> Self {
        self.fragments.push(fragment);
        self
    }

    pub fn child(self, key: impl Into<String>) -> Self {
        self.push(Fragment::Child(key.into()))
    }

    pub fn nth(self, index: i64) -> Self {
        self.push(Fragment::Nth(index))
    }

    pub fn wildcard(self) -> Self {
        self.push(Fragment::Wildcard)
    }

    pub fn descent(self) -> Self {
        self.push(Fragment::Descent)
    }

    pub fn slice(self, start: i64, end: i64, step: i64) -> Self {
        self.push(Fragment::Slice(Slice::new(start, end, step)))
    }

    pub fn union<K: Into<UnionKey>>(self, keys: impl IntoIterator<Item = K>) -> Self {
        self.push(Fragment::Union(keys.into_iter().map(Into::into).collect()))
    }

    pub fn filter(self, script: Script) -> Self {
        self.push(Fragment::Filter(script))
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// The first `n` fragments as a new expression.
    pub fn prefix(&self, n: usize) -> Expr {
        Expr {
            fragments: self.fragments[..n.min(self.fragments.len())].to_vec(),
        }
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.fragments.truncate(len);
    }

    pub(crate) fn push_mut(&mut self, fragment: Fragment) {
        self.fragments.push(fragment);
    }

    /// Appends the canonical textual form, which parses back to an
    /// expression with the same rendering.
    pub fn append_to(&self, buf: &mut String) {
        let start = buf.len();
        let mut bracket = false;
        let mut after_descent = false;
        for frag in &self.fragments {
            let first = buf.len() == start || after_descent;
            frag.append_to(buf, bracket, first);
            match frag {
                Fragment::Bracket => bracket = true,
                Fragment::Descent => after_descent = true,
                _ => after_descent = false,
            }
        }
    }
}

impl From<Vec<Fragment>> for Expr {
    fn from(fragments: Vec<Fragment>) -> Self {
        Expr { fragments }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = String::new();
        self.append_to(&mut buf);
        f.write_str(&buf)
    }
}

impl FromStr for Expr {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parser::parse(s)
    }
}
