//! Byte-cursor parser for path expressions and filter scripts.
//!
//! Bytes are classified by two 256-entry tables: one marks bytes allowed in
//! a bare name, the other marks bytes that may start an operator (`o`) or a
//! value (`v`) inside a filter equation.

use log::debug;
use regex::Regex;

use crate::ast::{Equation, Expr, Fragment, Operand, Operator, Slice, UnionKey};
use crate::error::ParseError;
use crate::script::Script;

const TOKEN_MAP: &[u8] = concat!(
    //0123456789abcdef0123456789abcdef
    "................................", // 0x00
    "...o.o..........oooooooooooo...o", // 0x20
    ".oooooooooooooooooooooooooo...oo", // 0x40
    ".oooooooooooooooooooooooooooooo.", // 0x60
    "oooooooooooooooooooooooooooooooo", // 0x80
    "oooooooooooooooooooooooooooooooo", // 0xa0
    "oooooooooooooooooooooooooooooooo", // 0xc0
    "oooooooooooooooooooooooooooooooo", // 0xe0
)
.as_bytes();

const EQ_MAP: &[u8] = concat!(
    //0123456789abcdef0123456789abcdef
    "................................", // 0x00
    ".ov.v.ovv.oo.o.ovvvvvvvvvv..ooo.", // 0x20
    "v...............................", // 0x40
    ".....ov.oo....v.....v.......o.o.", // 0x60
    "................................", // 0x80
    "................................", // 0xa0
    "................................", // 0xc0
    "................................", // 0xe0
)
.as_bytes();

/// True if `b` may appear in a bare (dotted) child name.
pub(crate) fn is_token_byte(b: u8) -> bool {
    TOKEN_MAP[b as usize] == b'o'
}

type Result<T> = std::result::Result<T, ParseError>;

/// Parses a path expression.
///
/// # Examples
///
/// ```
/// use jsonpath_engine::parser::parse;
///
/// let x = parse("$.a[0]['b c']").unwrap();
/// assert_eq!(x.to_string(), "$.a[0]['b c']");
///
/// let err = parse("$.a[").unwrap_err();
/// assert_eq!(err.to_string(), "not terminated at 5 in $.a[");
/// ```
pub fn parse(text: &str) -> Result<Expr> {
    parse_bytes(text.as_bytes())
}

/// Parses a path expression from raw bytes.
pub fn parse_bytes(buf: &[u8]) -> Result<Expr> {
    let mut p = Parser::new(buf);
    let x = p.read_expr()?;
    if p.pos < buf.len() {
        return Err(p.error("parse error"));
    }
    debug!("parsed path {}", x);
    Ok(x)
}

/// Parses a standalone filter script such as `(@.x > 1)`. The enclosing
/// parentheses are optional.
pub fn parse_script(text: &str) -> Result<Script> {
    let mut p = Parser::new(text.as_bytes());
    let eq = p.read_equation()?;
    if p.next_non_space().is_some() {
        return Err(p.error("parse error"));
    }
    let script = eq.script();
    debug!("parsed script {}", script);
    Ok(script)
}

struct Parser<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Parser { buf, pos: 0 }
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            message: message.into(),
            offset: self.pos + 1,
            snippet: String::from_utf8_lossy(self.buf).into_owned(),
        }
    }

    fn not_terminated(&self) -> ParseError {
        self.error("not terminated")
    }

    fn peek(&self) -> Option<u8> {
        self.buf.get(self.pos).copied()
    }

    fn next_byte(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    /// Consumes spaces and the byte after them.
    fn skip_space(&mut self) -> Option<u8> {
        while let Some(b) = self.next_byte() {
            if b != b' ' {
                return Some(b);
            }
        }
        None
    }

    /// Moves past spaces and returns the next byte without consuming it.
    fn next_non_space(&mut self) -> Option<u8> {
        while self.peek() == Some(b' ') {
            self.pos += 1;
        }
        self.peek()
    }

    fn skip_digits(&mut self) {
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
    }

    fn text(&self, start: usize) -> String {
        String::from_utf8_lossy(&self.buf[start..self.pos]).into_owned()
    }

    // ========================================================================
    // Paths
    // ========================================================================

    fn read_expr(&mut self) -> Result<Expr> {
        let mut fragments = Vec::new();
        let mut first = true;
        let mut last_descent = false;
        while let Some(frag) = self.next_frag(first, last_descent)? {
            first = false;
            last_descent = matches!(frag, Fragment::Descent);
            fragments.push(frag);
        }
        Ok(Expr::from(fragments))
    }

    fn next_frag(&mut self, first: bool, last_descent: bool) -> Result<Option<Fragment>> {
        let Some(b) = self.peek() else {
            return Ok(None);
        };
        match b {
            b'$' if first => {
                self.pos += 1;
                Ok(Some(Fragment::Root))
            }
            b'@' if first => {
                self.pos += 1;
                Ok(Some(Fragment::At))
            }
            b'.' => {
                self.pos += 1;
                self.after_dot().map(Some)
            }
            b'*' => {
                self.pos += 1;
                Ok(Some(Fragment::Wildcard))
            }
            b'[' => {
                self.pos += 1;
                self.after_bracket().map(Some)
            }
            _ if is_token_byte(b) && (first || last_descent) => Ok(Some(self.read_name())),
            _ => Ok(None),
        }
    }

    fn after_dot(&mut self) -> Result<Fragment> {
        let Some(b) = self.peek() else {
            return Err(self.not_terminated());
        };
        match b {
            b'*' => {
                self.pos += 1;
                Ok(Fragment::Wildcard)
            }
            b'.' => {
                self.pos += 1;
                Ok(Fragment::Descent)
            }
            _ if !is_token_byte(b) => {
                self.pos += 1;
                Err(self.error(format!(
                    "an expression fragment can not start with a '{}'",
                    char::from(b)
                )))
            }
            _ => Ok(self.read_name()),
        }
    }

    fn read_name(&mut self) -> Fragment {
        let start = self.pos;
        while self.peek().is_some_and(is_token_byte) {
            self.pos += 1;
        }
        Fragment::Child(self.text(start))
    }

    fn after_bracket(&mut self) -> Result<Fragment> {
        if self.pos >= self.buf.len() {
            return Err(self.not_terminated());
        }
        match self.skip_space() {
            Some(b'*') => {
                if self.skip_space() != Some(b']') {
                    return Err(self.not_terminated());
                }
                Ok(Fragment::Wildcard)
            }
            Some(quote @ (b'\'' | b'"')) => {
                let name = self.read_str(quote)?;
                match self.skip_space() {
                    Some(b']') => Ok(Fragment::Child(name)),
                    Some(b',') => self.read_union(UnionKey::Key(name)),
                    _ => Err(self.error("invalid bracket fragment")),
                }
            }
            Some(b':') => self.read_slice(0),
            Some(b'?') => self.read_filter(),
            Some(b'(') => Err(self.error("script fragments are not supported")),
            Some(b @ (b'-' | b'0'..=b'9')) => {
                let (i, mut next) = self.read_int(b)?;
                loop {
                    return match next {
                        Some(b' ') => {
                            next = self.skip_space();
                            continue;
                        }
                        Some(b']') => Ok(Fragment::Nth(i)),
                        Some(b',') => self.read_union(UnionKey::Index(i)),
                        Some(b':') => self.read_slice(i),
                        _ => Err(self.error("invalid bracket fragment")),
                    };
                }
            }
            _ => Err(self.error("parse error")),
        }
    }

    /// Reads an integer whose first byte has been consumed. Returns the
    /// value and the (consumed) byte that ended it.
    fn read_int(&mut self, first: u8) -> Result<(i64, Option<u8>)> {
        let neg = first == b'-';
        let mut b = if neg { self.next_byte() } else { Some(first) };
        let mut n: i64 = 0;
        let mut digits = 0;
        // Negative values accumulate downward so i64::MIN is reachable.
        while let Some(d @ b'0'..=b'9') = b {
            let digit = i64::from(d - b'0');
            n = n
                .checked_mul(10)
                .and_then(|n| if neg { n.checked_sub(digit) } else { n.checked_add(digit) })
                .ok_or_else(|| self.error("integer overflow"))?;
            digits += 1;
            b = self.next_byte();
        }
        if digits == 0 {
            return Err(self.error("expected a number"));
        }
        Ok((n, b))
    }

    fn read_slice(&mut self, start: i64) -> Result<Fragment> {
        let mut slice = Slice {
            start,
            ..Slice::default()
        };
        let Some(b) = self.peek() else {
            return Err(self.not_terminated());
        };
        if b == b']' {
            self.pos += 1;
            return Ok(Fragment::Slice(slice));
        }
        let mut b = self.skip_space();
        if b == Some(b':') {
            let Some(nb) = self.next_byte() else {
                return Err(self.not_terminated());
            };
            b = Some(nb);
            if nb != b']' {
                (slice.step, b) = self.read_int(nb)?;
            }
        } else if let Some(first) = b {
            (slice.end, b) = self.read_int(first)?;
            if b == Some(b':') {
                let Some(nb) = self.next_byte() else {
                    return Err(self.not_terminated());
                };
                b = Some(nb);
                if nb != b']' {
                    (slice.step, b) = self.read_int(nb)?;
                }
            }
        }
        if b != Some(b']') {
            return Err(self.error("invalid slice syntax"));
        }
        Ok(Fragment::Slice(slice))
    }

    fn read_union(&mut self, first: UnionKey) -> Result<Fragment> {
        if self.pos >= self.buf.len() {
            return Err(self.not_terminated());
        }
        let mut keys = vec![first];
        loop {
            let next = match self.skip_space() {
                Some(quote @ (b'\'' | b'"')) => {
                    keys.push(UnionKey::Key(self.read_str(quote)?));
                    self.skip_space()
                }
                Some(b @ (b'-' | b'0'..=b'9')) => {
                    let (i, mut next) = self.read_int(b)?;
                    if next == Some(b' ') {
                        next = self.skip_space();
                    }
                    keys.push(UnionKey::Index(i));
                    next
                }
                _ => return Err(self.error("invalid union syntax")),
            };
            match next {
                Some(b',') => continue,
                Some(b']') => return Ok(Fragment::Union(keys)),
                _ => return Err(self.error("invalid union syntax")),
            }
        }
    }

    // ========================================================================
    // Strings and regular expressions
    // ========================================================================

    /// Reads a quoted string whose opening quote has been consumed.
    fn read_str(&mut self, term: u8) -> Result<String> {
        let mut out = Vec::new();
        loop {
            let Some(b) = self.next_byte() else {
                return Err(self.not_terminated());
            };
            if b == term {
                break;
            }
            if b == b'\\' {
                self.read_escape(&mut out)?;
            } else {
                out.push(b);
            }
        }
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    fn read_escape(&mut self, out: &mut Vec<u8>) -> Result<()> {
        let Some(b) = self.next_byte() else {
            return Err(self.not_terminated());
        };
        match b {
            b'b' => out.push(0x08),
            b't' => out.push(b'\t'),
            b'n' => out.push(b'\n'),
            b'f' => out.push(0x0c),
            b'r' => out.push(b'\r'),
            b'"' | b'\'' | b'/' | b'\\' => out.push(b),
            b'x' => {
                let hi = self.read_hex()?;
                let lo = self.read_hex()?;
                out.push((hi << 4) | lo);
            }
            b'u' | b'U' => {
                let c = self.read_unicode_escape()?;
                let mut tmp = [0u8; 4];
                out.extend_from_slice(c.encode_utf8(&mut tmp).as_bytes());
            }
            _ => {
                return Err(self.error(format!(
                    "0x{:02x} ({}) is not a valid escaped character",
                    b,
                    char::from(b)
                )));
            }
        }
        Ok(())
    }

    fn read_hex4(&mut self) -> Result<u32> {
        let mut r = 0u32;
        for _ in 0..4 {
            r = (r << 4) | u32::from(self.read_hex()?);
        }
        Ok(r)
    }

    /// Reads the four hex digits after `\u`, joining a following low
    /// surrogate escape into one character.
    fn read_unicode_escape(&mut self) -> Result<char> {
        let r = self.read_hex4()?;
        if (0xd800..0xdc00).contains(&r) && self.buf[self.pos..].starts_with(b"\\u") {
            let mark = self.pos;
            self.pos += 2;
            let lo = self.read_hex4()?;
            if (0xdc00..0xe000).contains(&lo) {
                let joined = 0x10000 + ((r - 0xd800) << 10) + (lo - 0xdc00);
                return Ok(char::from_u32(joined).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
            self.pos = mark;
        }
        Ok(char::from_u32(r).unwrap_or(char::REPLACEMENT_CHARACTER))
    }

    fn read_hex(&mut self) -> Result<u8> {
        let Some(b) = self.next_byte() else {
            return Err(self.not_terminated());
        };
        match b {
            b'0'..=b'9' => Ok(b - b'0'),
            b'a'..=b'f' => Ok(b - b'a' + 10),
            b'A'..=b'F' => Ok(b - b'A' + 10),
            _ => Err(self.error(format!(
                "0x{:02x} ({}) is not a valid hexadecimal character",
                b,
                char::from(b)
            ))),
        }
    }

    /// Reads a `/.../` literal whose opening slash has been consumed. `\/`
    /// stands for a slash; every other escape is kept for the regex engine.
    fn read_regex(&mut self) -> Result<Regex> {
        let mut src = Vec::new();
        loop {
            let Some(b) = self.next_byte() else {
                return Err(self.not_terminated());
            };
            match b {
                b'/' => break,
                b'\\' => match self.next_byte() {
                    Some(b'/') => src.push(b'/'),
                    Some(next) => src.extend_from_slice(&[b'\\', next]),
                    None => return Err(self.not_terminated()),
                },
                _ => src.push(b),
            }
        }
        let src = String::from_utf8_lossy(&src);
        Regex::new(&src).map_err(|e| self.error(e.to_string()))
    }

    // ========================================================================
    // Filter equations
    // ========================================================================

    fn read_filter(&mut self) -> Result<Fragment> {
        let Some(b) = self.peek() else {
            return Err(self.not_terminated());
        };
        if b == b'(' {
            self.pos += 1;
        }
        let eq = self.read_equation()?;
        if self.peek() != Some(b']') {
            return Err(self.not_terminated());
        }
        self.pos += 1;
        Ok(Fragment::Filter(eq.script()))
    }

    /// Reads operands and operators up to a closing `)` (consumed) or `]`
    /// (left in place), then folds them by precedence.
    fn read_equation(&mut self) -> Result<Equation> {
        let Some(b) = self.next_non_space() else {
            return Err(self.not_terminated());
        };
        let bare_value = !matches!(b, b'!' | b'l' | b'c' | b'm' | b's');
        let left = self.read_eq_value()?;
        let bare_value = bare_value && matches!(left, Equation::Value(_));
        let mut operands = vec![left];
        let mut ops = Vec::new();
        if bare_value {
            match self.read_eq_op()? {
                Some(op) => {
                    ops.push(op);
                    operands.push(self.read_eq_value()?);
                }
                None => {
                    ops.push(Operator::Exists);
                    operands.push(Equation::value(true));
                }
            }
        }
        loop {
            match self.next_non_space() {
                None => break,
                Some(b')') => {
                    self.pos += 1;
                    break;
                }
                Some(b']') => break,
                Some(_) => {}
            }
            let Some(op) = self.read_eq_op()? else {
                return Err(self.error("expected an operation"));
            };
            ops.push(op);
            operands.push(self.read_eq_value()?);
        }
        Ok(fold_operations(operands, ops))
    }

    fn read_eq_value(&mut self) -> Result<Equation> {
        let Some(b) = self.next_non_space() else {
            return Err(self.error("expected a value"));
        };
        match b {
            b'-' | b'0'..=b'9' => {
                self.pos += 1;
                self.read_num().map(Equation::Value)
            }
            b'\'' | b'"' => {
                self.pos += 1;
                Ok(Equation::value(self.read_str(b)?))
            }
            b'n' => {
                self.read_eq_token("null")?;
                Ok(Equation::Value(Operand::Null))
            }
            b'N' => {
                self.read_eq_token("Nothing")?;
                Ok(Equation::Value(Operand::Nothing))
            }
            b't' => {
                self.read_eq_token("true")?;
                Ok(Equation::value(true))
            }
            b'f' => {
                self.read_eq_token("false")?;
                Ok(Equation::value(false))
            }
            b'@' | b'$' => Ok(Equation::value(self.read_expr()?)),
            b'(' => {
                self.pos += 1;
                self.read_equation()
            }
            b'[' => Ok(Equation::Value(Operand::List(self.read_eq_list()?))),
            b'/' => {
                self.pos += 1;
                Ok(Equation::value(self.read_regex()?))
            }
            b'!' => {
                self.pos += 1;
                Ok(Equation::unary(Operator::Not, self.read_eq_value()?))
            }
            b'l' => self.read_func(Operator::Length),
            b'c' => self.read_func(Operator::Count),
            b'm' => self.read_func(Operator::Match),
            b's' => self.read_func(Operator::Search),
            _ => Err(self.error("expected a value")),
        }
    }

    fn read_func(&mut self, op: Operator) -> Result<Equation> {
        let name = op.name().as_bytes();
        let rest = &self.buf[self.pos..];
        if !(rest.starts_with(name) && rest.get(name.len()) == Some(&b'(')) {
            return Err(self.error(format!("expected a {} function", op.name())));
        }
        self.pos += name.len() + 1;
        let left = self.read_eq_value()?;
        let mut right = None;
        let mut b = self.next_non_space();
        if b == Some(b',') {
            self.pos += 1;
            right = Some(Box::new(self.read_eq_value()?));
            b = self.next_non_space();
        }
        if b != Some(b')') {
            return Err(self.not_terminated());
        }
        self.pos += 1;
        Ok(Equation::Op {
            op,
            left: Box::new(left),
            right,
        })
    }

    fn read_eq_token(&mut self, token: &str) -> Result<()> {
        for t in token.bytes() {
            if self.peek() != Some(t) {
                return Err(self.error(format!("expected {}", token)));
            }
            self.pos += 1;
        }
        Ok(())
    }

    fn read_eq_list(&mut self) -> Result<Vec<Operand>> {
        self.pos += 1;
        let mut list = Vec::new();
        if self.next_non_space() == Some(b']') {
            self.pos += 1;
            return Ok(list);
        }
        loop {
            match self.read_eq_value()? {
                Equation::Value(v) => list.push(v),
                Equation::Op { .. } => return Err(self.error("expected a list value")),
            }
            match self.skip_space() {
                Some(b',') => {}
                Some(b']') => return Ok(list),
                Some(_) => return Err(self.error("expected a comma")),
                None => return Err(self.not_terminated()),
            }
        }
    }

    /// Reads a number whose first byte (sign or digit) has been consumed.
    fn read_num(&mut self) -> Result<Operand> {
        let start = self.pos - 1;
        self.skip_digits();
        let mut is_float = false;
        if self.peek() == Some(b'.') {
            is_float = true;
            self.pos += 1;
            self.skip_digits();
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            is_float = true;
            self.pos += 1;
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            if !matches!(self.peek(), Some(b'0'..=b'9')) {
                return Err(self.error("expected a number"));
            }
            self.skip_digits();
        }
        let text = self.text(start);
        if is_float {
            text.parse::<f64>()
                .map(Operand::Float)
                .map_err(|e| self.error(e.to_string()))
        } else {
            text.parse::<i64>()
                .map(Operand::Int)
                .map_err(|e| self.error(e.to_string()))
        }
    }

    /// Reads the longest run of operator bytes that names an operator.
    /// Returns `None` at the end of an equation or when no operator starts
    /// at the cursor.
    fn read_eq_op(&mut self) -> Result<Option<Operator>> {
        let Some(mut b) = self.next_non_space() else {
            return Ok(None);
        };
        if matches!(b, b']' | b')' | b'(') {
            return Ok(None);
        }
        let mut token = Vec::new();
        loop {
            let accept = if token.is_empty() {
                EQ_MAP[b as usize] == b'o'
            } else {
                Operator::continues(&token, b) || (token == b"=" && b == b'~')
            };
            if !accept {
                break;
            }
            token.push(b);
            self.pos += 1;
            match self.peek() {
                Some(next) => b = next,
                None => return Err(self.error("equation not terminated")),
            }
        }
        if token.is_empty() {
            return Ok(None);
        }
        let name = String::from_utf8_lossy(&token);
        match Operator::from_name(&name) {
            Some(op) if op.arity() == 2 && !op.is_function() => Ok(Some(op)),
            _ => Err(self.error(format!("'{}' is not a valid operation", name))),
        }
    }
}

/// Combines `operands[0] ops[0] operands[1] ...` into a tree. Tighter
/// operators are joined first; equal precedence joins left to right.
fn fold_operations(mut operands: Vec<Equation>, mut ops: Vec<Operator>) -> Equation {
    while !ops.is_empty() && operands.len() > 1 {
        let mut at = 0;
        for (i, op) in ops.iter().enumerate() {
            if op.precedence() < ops[at].precedence() {
                at = i;
            }
        }
        let op = ops.remove(at);
        let right = operands.remove(at + 1);
        let left = std::mem::replace(&mut operands[at], Equation::Value(Operand::Null));
        operands[at] = Equation::binary(op, left, right);
    }
    operands
        .into_iter()
        .next()
        .unwrap_or(Equation::Value(Operand::Null))
}
