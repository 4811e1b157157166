//! Read-only evaluation of path expressions.
//!
//! Evaluation runs on an explicit stack instead of recursion so that
//! descent over deep data can not exhaust the call stack. The stack holds
//! values still to be processed and fragment markers. A marker on top of
//! the stack names the fragment to apply to the value beneath it; two
//! markers in a row mean the values of the upper level are used up.

use crate::ast::{Expr, Fragment, UnionKey};
use crate::value::{Step, Value};

#[derive(Debug, Clone, Copy)]
enum Entry<'a> {
    Value(&'a Value),
    /// Fragment index, and for a descent whether the value's children have
    /// already been queued.
    Frag(usize, bool),
}

impl Expr {
    /// Every value the expression selects, depth-first and in source order
    /// within each container.
    ///
    /// # Examples
    ///
    /// ```
    /// use jsonpath_engine::{Expr, Value};
    /// use serde_json::json;
    ///
    /// let data = Value::from(json!({"store": {"book": [{"author": "A"}, {"author": "B"}]}}));
    /// let x: Expr = "$.store.book[*].author".parse().unwrap();
    /// assert_eq!(x.get(&data), vec![&Value::from("A"), &Value::from("B")]);
    /// ```
    pub fn get<'a>(&self, data: &'a Value) -> Vec<&'a Value> {
        let mut found = Vec::new();
        self.traverse(data, |v| {
            found.push(v);
            false
        });
        found
    }

    /// The first value [`Expr::get`] would return. A matched `null` is
    /// `Some(&Value::Null)`, distinct from no match.
    pub fn first<'a>(&self, data: &'a Value) -> Option<&'a Value> {
        let mut found = None;
        self.traverse(data, |v| {
            found = Some(v);
            true
        });
        found
    }

    /// True if the expression selects anything.
    pub fn has(&self, data: &Value) -> bool {
        let mut found = false;
        self.traverse(data, |_| {
            found = true;
            true
        });
        found
    }

    /// Runs the expression, handing each selected value to `record` until it
    /// returns true.
    fn traverse<'a>(&self, data: &'a Value, mut record: impl FnMut(&'a Value) -> bool) {
        let frags = self.fragments();
        if frags.is_empty() {
            return;
        }
        let last = frags.len() - 1;
        let mut stack: Vec<Entry<'a>> = Vec::with_capacity(64);
        stack.push(Entry::Value(data));
        stack.push(Entry::Frag(0, false));

        while stack.len() > 1 {
            let n = stack.len();
            let Entry::Frag(fi, expanded) = stack[n - 1] else {
                break;
            };
            let prev = match stack[n - 2] {
                Entry::Frag(..) => {
                    stack.pop();
                    continue;
                }
                Entry::Value(v) => v,
            };
            stack[n - 2] = Entry::Frag(fi, expanded);
            stack.pop();

            let is_last = fi == last;
            let stop = match &frags[fi] {
                Fragment::Root => emit_one(data, is_last, &mut stack, &mut record),
                Fragment::At | Fragment::Bracket => {
                    emit_one(prev, is_last, &mut stack, &mut record)
                }
                Fragment::Child(key) => emit(
                    prev.get_key(key).into_iter().collect(),
                    is_last,
                    &mut stack,
                    &mut record,
                ),
                Fragment::Nth(i) => emit(
                    prev.get_index(*i).into_iter().collect(),
                    is_last,
                    &mut stack,
                    &mut record,
                ),
                Fragment::Wildcard => emit(prev.children(), is_last, &mut stack, &mut record),
                Fragment::Union(keys) => emit(union_members(prev, keys), is_last, &mut stack, &mut record),
                Fragment::Slice(slice) => {
                    let selected = match prev {
                        Value::Array(_) | Value::Indexed(_) => slice
                            .indices(prev.container_len().unwrap_or(0))
                            .into_iter()
                            .filter_map(|i| prev.step(&Step::Index(i)))
                            .collect(),
                        _ => Vec::new(),
                    };
                    emit(selected, is_last, &mut stack, &mut record)
                }
                Fragment::Filter(script) => {
                    emit(script.select(prev, data), is_last, &mut stack, &mut record)
                }
                Fragment::Descent => {
                    if is_last {
                        if record(prev) {
                            return;
                        }
                        for child in prev.children().into_iter().rev() {
                            stack.push(Entry::Value(child));
                            stack.push(Entry::Frag(fi, false));
                        }
                    } else if !expanded {
                        for child in prev.children().into_iter().rev() {
                            if child.is_container() {
                                stack.push(Entry::Value(child));
                                stack.push(Entry::Frag(fi, false));
                            }
                        }
                        stack.push(Entry::Value(prev));
                        stack.push(Entry::Frag(fi, true));
                    } else {
                        stack.push(Entry::Value(prev));
                    }
                    false
                }
            };
            if stop {
                return;
            }
            if fi < last && matches!(stack.last(), Some(Entry::Value(_))) {
                stack.push(Entry::Frag(fi + 1, false));
            }
        }
    }
}

pub(crate) fn union_members<'a>(value: &'a Value, keys: &[UnionKey]) -> Vec<&'a Value> {
    keys.iter()
        .filter_map(|key| match key {
            UnionKey::Key(k) => value.get_key(k),
            UnionKey::Index(i) => value.get_index(*i),
        })
        .collect()
}

/// Records `values` when the fragment is the last one, otherwise queues the
/// containers among them so they are popped in order. Returns true when the
/// recorder asked to stop.
fn emit<'a>(
    values: Vec<&'a Value>,
    is_last: bool,
    stack: &mut Vec<Entry<'a>>,
    record: &mut impl FnMut(&'a Value) -> bool,
) -> bool {
    if is_last {
        return values.into_iter().any(|v| record(v));
    }
    stack.extend(
        values
            .into_iter()
            .rev()
            .filter(|v| v.is_container())
            .map(Entry::Value),
    );
    false
}

fn emit_one<'a>(
    value: &'a Value,
    is_last: bool,
    stack: &mut Vec<Entry<'a>>,
    record: &mut impl FnMut(&'a Value) -> bool,
) -> bool {
    if is_last {
        return record(value);
    }
    stack.push(Entry::Value(value));
    false
}
