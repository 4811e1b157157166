//! In-place mutation through path expressions.
//!
//! The traversal mirrors the evaluator but its stack carries locations
//! (step lists from the root) instead of borrowed values, so the data can
//! be borrowed mutably whenever the last fragment is reached. Descent
//! visits descendants before the value itself so that shrinking an array
//! never invalidates a location still waiting on the stack. The `_one`
//! variants therefore act on the deepest match under a descent, which is
//! not always the match [`Expr::first`] returns.

use log::debug;

use crate::ast::{Expr, Fragment, UnionKey};
use crate::error::{AssignError, MutationError};
use crate::value::{Map, Step, Value, normalize_index};

enum Slot {
    Loc(Vec<Step>),
    /// Fragment index and whether a descent has queued its children.
    Frag(usize, bool),
}

enum Action<'f> {
    Set(Value),
    Delete,
    Remove,
    Modify(&'f mut dyn FnMut(&Value) -> Option<Value>),
}

impl Action<'_> {
    fn name(&self) -> &'static str {
        match self {
            Action::Set(_) => "set",
            Action::Delete => "delete",
            Action::Remove => "remove",
            Action::Modify(_) => "modify",
        }
    }

    fn allows(&self, terminal: &Fragment) -> bool {
        match self {
            Action::Set(_) => matches!(
                terminal,
                Fragment::Child(_) | Fragment::Nth(_) | Fragment::Wildcard | Fragment::Union(_)
            ),
            Action::Delete => matches!(
                terminal,
                Fragment::Child(_)
                    | Fragment::Nth(_)
                    | Fragment::Slice(_)
                    | Fragment::Union(_)
                    | Fragment::Wildcard
            ),
            Action::Remove => matches!(
                terminal,
                Fragment::Child(_)
                    | Fragment::Nth(_)
                    | Fragment::Slice(_)
                    | Fragment::Union(_)
                    | Fragment::Wildcard
                    | Fragment::Filter(_)
            ),
            Action::Modify(_) => !matches!(terminal, Fragment::Descent),
        }
    }

    /// Set and delete reject out of bounds indexes; modify and remove skip
    /// them.
    fn strict(&self) -> bool {
        matches!(self, Action::Set(_) | Action::Delete)
    }
}

impl Expr {
    /// Writes `value` at every location the expression selects, creating
    /// missing intermediate objects and arrays when the following fragment
    /// makes the shape clear.
    ///
    /// # Examples
    ///
    /// ```
    /// use jsonpath_engine::{Expr, Value};
    /// use serde_json::json;
    ///
    /// let mut data = Value::from(json!({}));
    /// let x: Expr = "$.m.k".parse().unwrap();
    /// x.set(&mut data, Value::from(7)).unwrap();
    /// assert_eq!(data, Value::from(json!({"m": {"k": 7}})));
    /// ```
    pub fn set(&self, data: &mut Value, value: Value) -> Result<(), MutationError> {
        self.mutate(data, Action::Set(value), false)
    }

    /// Like [`Expr::set`] but stops after the first write. Under a descent
    /// the first write is at the deepest match.
    pub fn set_one(&self, data: &mut Value, value: Value) -> Result<(), MutationError> {
        self.mutate(data, Action::Set(value), true)
    }

    /// Deletes every selected location. Arrays shrink.
    pub fn del(&self, data: &mut Value) -> Result<(), MutationError> {
        self.mutate(data, Action::Delete, false)
    }

    /// Deletes the first selected location, deepest first under a descent.
    pub fn del_one(&self, data: &mut Value) -> Result<(), MutationError> {
        self.mutate(data, Action::Delete, true)
    }

    /// Calls `f` with every selected value and stores what it returns.
    /// `None` leaves the value unchanged.
    pub fn modify(
        &self,
        data: &mut Value,
        mut f: impl FnMut(&Value) -> Option<Value>,
    ) -> Result<(), MutationError> {
        self.mutate(data, Action::Modify(&mut f), false)
    }

    /// Like [`Expr::modify`] but stops after the first changed value.
    ///
    /// Descendants are visited before their ancestors, so `$..n` on
    /// `{"n":1,"x":{"n":2}}` changes `x.n` while [`Expr::first`] returns the
    /// outer `n`.
    pub fn modify_one(
        &self,
        data: &mut Value,
        mut f: impl FnMut(&Value) -> Option<Value>,
    ) -> Result<(), MutationError> {
        self.mutate(data, Action::Modify(&mut f), true)
    }

    /// Removes every selected element. Unlike [`Expr::del`] a filter may end
    /// the expression and out of bounds indexes are ignored.
    pub fn remove(&self, data: &mut Value) -> Result<(), MutationError> {
        self.mutate(data, Action::Remove, false)
    }

    /// Removes the first selected element, deepest first under a descent.
    pub fn remove_one(&self, data: &mut Value) -> Result<(), MutationError> {
        self.mutate(data, Action::Remove, true)
    }

    fn mutate(&self, data: &mut Value, mut action: Action<'_>, one: bool) -> Result<(), MutationError> {
        let op = action.name();
        let frags = self.fragments();
        let Some(terminal) = frags.last() else {
            return Err(MutationError::EmptyExpression { op });
        };
        if !action.allows(terminal) {
            return Err(MutationError::IllegalTerminal {
                op,
                fragment: terminal.kind_name(),
            });
        }
        debug!("{} {}", op, self);

        let last = frags.len() - 1;
        let mut stack = vec![Slot::Loc(Vec::new()), Slot::Frag(0, false)];
        while stack.len() > 1 {
            let n = stack.len();
            let Slot::Frag(fi, expanded) = stack[n - 1] else {
                break;
            };
            if matches!(stack[n - 2], Slot::Frag(..)) {
                stack.pop();
                continue;
            }
            let Slot::Loc(loc) = std::mem::replace(&mut stack[n - 2], Slot::Frag(fi, expanded)) else {
                break;
            };
            stack.pop();

            if fi == last {
                if self.apply(data, &loc, fi, &mut action, one)? && one {
                    return Ok(());
                }
                continue;
            }
            self.advance(data, loc, fi, expanded, &action, &mut stack)?;
            if matches!(stack.last(), Some(Slot::Loc(_))) {
                stack.push(Slot::Frag(fi + 1, false));
            }
        }
        Ok(())
    }

    /// Queues the locations reached by a fragment that is not the last.
    fn advance(
        &self,
        data: &mut Value,
        loc: Vec<Step>,
        fi: usize,
        expanded: bool,
        action: &Action<'_>,
        stack: &mut Vec<Slot>,
    ) -> Result<(), MutationError> {
        let frag = &self.fragments()[fi];
        match frag {
            Fragment::Root => stack.push(Slot::Loc(Vec::new())),
            Fragment::At | Fragment::Bracket => stack.push(Slot::Loc(loc)),
            Fragment::Child(_) | Fragment::Nth(_) => self.follow(data, loc, fi, action, stack)?,
            Fragment::Descent if expanded => stack.push(Slot::Loc(loc)),
            Fragment::Descent => {
                let Some(prev) = data.pointer(&loc) else {
                    return Ok(());
                };
                let children: Vec<Step> = prev
                    .entries()
                    .into_iter()
                    .filter(|(_, v)| v.is_container())
                    .map(|(step, _)| step)
                    .collect();
                stack.push(Slot::Loc(loc.clone()));
                stack.push(Slot::Frag(fi, true));
                for step in children.into_iter().rev() {
                    stack.push(Slot::Loc(join(&loc, step)));
                    stack.push(Slot::Frag(fi, false));
                }
            }
            _ => {
                let root: &Value = data;
                let Some(prev) = root.pointer(&loc) else {
                    return Ok(());
                };
                let steps: Vec<Step> = selected_entries(root, prev, frag)
                    .into_iter()
                    .filter(|(_, v)| v.is_container())
                    .map(|(step, _)| step)
                    .collect();
                for step in steps.into_iter().rev() {
                    stack.push(Slot::Loc(join(&loc, step)));
                }
            }
        }
        Ok(())
    }

    /// Steps through a Child or Nth fragment. When setting, a missing member
    /// is added as a container shaped for the next fragment; a present
    /// scalar, null included, can not be followed.
    fn follow(
        &self,
        data: &mut Value,
        loc: Vec<Step>,
        fi: usize,
        action: &Action<'_>,
        stack: &mut Vec<Slot>,
    ) -> Result<(), MutationError> {
        enum Next {
            Follow,
            Create,
            Blocked(&'static str),
        }

        let setting = matches!(action, Action::Set(_));

        let Some(prev) = data.pointer(&loc) else {
            return Ok(());
        };
        let (step, child) = match &self.fragments()[fi] {
            Fragment::Child(key) if is_keyed(prev) => (Step::Key(key.clone()), prev.get_key(key)),
            Fragment::Nth(i) if is_ordered(prev) => {
                match normalize_index(*i, prev.container_len().unwrap_or(0)) {
                    Some(ix) => (Step::Index(ix), prev.step(&Step::Index(ix))),
                    None if action.strict() => {
                        return Err(MutationError::OutOfBounds {
                            path: self.prefix(fi + 1).to_string(),
                        });
                    }
                    None => return Ok(()),
                }
            }
            _ => return Ok(()),
        };
        let next = match child {
            Some(v) if v.is_container() => Next::Follow,
            Some(v) => Next::Blocked(v.type_name()),
            None => Next::Create,
        };
        match next {
            Next::Follow => {}
            Next::Blocked(kind) => {
                if setting {
                    return Err(MutationError::CannotFollow {
                        kind,
                        path: self.prefix(fi + 1).to_string(),
                    });
                }
                return Ok(());
            }
            Next::Create if !setting => return Ok(()),
            Next::Create => {
                let fresh = self.deduce(fi)?;
                debug!("adding {} at {}", fresh.type_name(), self.prefix(fi + 1));
                let Some(parent) = data.pointer_mut(&loc) else {
                    return Ok(());
                };
                write_child(parent, &step, fresh)
                    .map_err(|source| self.not_assignable("set", fi, source))?;
            }
        }
        stack.push(Slot::Loc(join(&loc, step)));
        Ok(())
    }

    /// The container to create for a missing member at fragment `fi`.
    fn deduce(&self, fi: usize) -> Result<Value, MutationError> {
        let path = self.prefix(fi + 1).to_string();
        match self.fragments().get(fi + 1) {
            Some(Fragment::Child(_)) => Ok(Value::Object(Map::new())),
            Some(Fragment::Nth(n)) => match usize::try_from(*n) {
                Ok(n) => Ok(Value::Array(vec![Value::Null; n.saturating_add(1)])),
                Err(_) => Err(MutationError::NegativeLength { path }),
            },
            _ => Err(MutationError::CannotDeduce { path }),
        }
    }

    /// Performs the action for the last fragment at `loc`. Returns true if
    /// anything changed.
    fn apply(
        &self,
        data: &mut Value,
        loc: &[Step],
        fi: usize,
        action: &mut Action<'_>,
        one: bool,
    ) -> Result<bool, MutationError> {
        let frag = &self.fragments()[fi];
        let op = action.name();

        if let Fragment::Root | Fragment::At | Fragment::Bracket = frag {
            let Action::Modify(f) = action else {
                return Ok(false);
            };
            let at: &[Step] = if matches!(frag, Fragment::Root) { &[] } else { loc };
            let Some(target) = data.pointer_mut(at) else {
                return Ok(false);
            };
            return Ok(match f(&*target) {
                Some(new) => {
                    *target = new;
                    true
                }
                None => false,
            });
        }

        let steps: Vec<Step> = {
            let root: &Value = data;
            let Some(prev) = root.pointer(loc) else {
                return Ok(false);
            };
            let setting = matches!(action, Action::Set(_));
            match frag {
                Fragment::Child(key) if setting => {
                    if is_keyed(prev) {
                        vec![Step::Key(key.clone())]
                    } else {
                        Vec::new()
                    }
                }
                Fragment::Nth(i) if is_ordered(prev) => {
                    match normalize_index(*i, prev.container_len().unwrap_or(0)) {
                        Some(ix) => vec![Step::Index(ix)],
                        None if action.strict() => {
                            return Err(MutationError::OutOfBounds {
                                path: self.prefix(fi + 1).to_string(),
                            });
                        }
                        None => Vec::new(),
                    }
                }
                Fragment::Union(keys) if setting => keys
                    .iter()
                    .filter_map(|key| match key {
                        UnionKey::Key(k) if is_keyed(prev) => Some(Step::Key(k.clone())),
                        UnionKey::Index(i) if is_ordered(prev) => {
                            normalize_index(*i, prev.container_len().unwrap_or(0)).map(Step::Index)
                        }
                        _ => None,
                    })
                    .collect(),
                _ => selected_entries(root, prev, frag)
                    .into_iter()
                    .map(|(step, _)| step)
                    .collect(),
            }
        };

        let Some(parent) = data.pointer_mut(loc) else {
            return Ok(false);
        };
        match action {
            Action::Set(value) => {
                let mut changed = false;
                for step in steps {
                    write_child(parent, &step, value.clone())
                        .map_err(|source| self.not_assignable(op, fi, source))?;
                    changed = true;
                    if one {
                        break;
                    }
                }
                Ok(changed)
            }
            Action::Delete | Action::Remove => {
                let mut steps = steps;
                if one {
                    steps.truncate(1);
                }
                remove_children(parent, steps).map_err(|source| self.not_assignable(op, fi, source))
            }
            Action::Modify(f) => {
                let mut changed = false;
                for step in steps {
                    let Some(current) = parent.step(&step) else {
                        continue;
                    };
                    if let Some(new) = f(current) {
                        write_child(parent, &step, new)
                            .map_err(|source| self.not_assignable(op, fi, source))?;
                        changed = true;
                        if one {
                            break;
                        }
                    }
                }
                Ok(changed)
            }
        }
    }

    fn not_assignable(&self, op: &'static str, fi: usize, source: AssignError) -> MutationError {
        MutationError::NotAssignable {
            op,
            path: self.prefix(fi + 1).to_string(),
            source,
        }
    }
}

fn is_keyed(v: &Value) -> bool {
    matches!(v, Value::Object(_) | Value::Keyed(_))
}

fn is_ordered(v: &Value) -> bool {
    matches!(v, Value::Array(_) | Value::Indexed(_))
}

fn join(loc: &[Step], step: Step) -> Vec<Step> {
    let mut next = Vec::with_capacity(loc.len() + 1);
    next.extend_from_slice(loc);
    next.push(step);
    next
}

/// Existing children of `prev` a fragment selects, in selection order.
fn selected_entries<'a>(root: &'a Value, prev: &'a Value, frag: &Fragment) -> Vec<(Step, &'a Value)> {
    let len = prev.container_len().unwrap_or(0);
    let at_index = move |ix: usize| prev.step(&Step::Index(ix)).map(|v| (Step::Index(ix), v));
    match frag {
        Fragment::Child(key) => prev
            .get_key(key)
            .map(|v| (Step::Key(key.clone()), v))
            .into_iter()
            .collect(),
        Fragment::Nth(i) if is_ordered(prev) => {
            normalize_index(*i, len).and_then(at_index).into_iter().collect()
        }
        Fragment::Wildcard => prev.entries(),
        Fragment::Union(keys) => keys
            .iter()
            .filter_map(|key| match key {
                UnionKey::Key(k) => prev.get_key(k).map(|v| (Step::Key(k.clone()), v)),
                UnionKey::Index(i) if is_ordered(prev) => normalize_index(*i, len).and_then(at_index),
                UnionKey::Index(_) => None,
            })
            .collect(),
        Fragment::Slice(slice) if is_ordered(prev) => slice
            .indices(len)
            .into_iter()
            .filter_map(at_index)
            .collect(),
        Fragment::Filter(script) => script.select_entries(prev, root),
        _ => Vec::new(),
    }
}

fn write_child(parent: &mut Value, step: &Step, value: Value) -> Result<(), AssignError> {
    match (parent, step) {
        (Value::Object(obj), Step::Key(k)) => {
            obj.insert(k.clone(), value);
            Ok(())
        }
        (Value::Keyed(keyed), Step::Key(k)) => keyed.set_value_for_key(k, value),
        (Value::Array(arr), Step::Index(i)) => match arr.get_mut(*i) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(AssignError::new(i.to_string(), value.type_name())),
        },
        (Value::Indexed(ix), Step::Index(i)) => ix.set_value_at_index(*i, value),
        (_, Step::Key(k)) => Err(AssignError::new(k.clone(), value.type_name())),
        (_, Step::Index(i)) => Err(AssignError::new(i.to_string(), value.type_name())),
    }
}

fn remove_children(parent: &mut Value, steps: Vec<Step>) -> Result<bool, AssignError> {
    let mut changed = false;
    let mut indexes = Vec::new();
    for step in steps {
        match (&mut *parent, step) {
            (Value::Object(obj), Step::Key(k)) => changed |= obj.shift_remove(&k).is_some(),
            (Value::Keyed(keyed), Step::Key(k)) => {
                changed |= keyed.remove_value_for_key(&k).is_some()
            }
            (_, Step::Index(i)) => indexes.push(i),
            _ => {}
        }
    }
    indexes.sort_unstable_by(|a, b| b.cmp(a));
    indexes.dedup();
    for i in indexes {
        match &mut *parent {
            Value::Array(arr) if i < arr.len() => {
                arr.remove(i);
                changed = true;
            }
            Value::Indexed(ix) if i < ix.size() => {
                ix.remove_value_at_index(i)?;
                changed = true;
            }
            _ => {}
        }
    }
    Ok(changed)
}
