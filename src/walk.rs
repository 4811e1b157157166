//! Depth-first enumeration of every node with its path.

use log::trace;

use crate::ast::{Expr, Fragment};
use crate::value::{Step, Value};

/// Calls `cb` with the path and value of every node under `data`, parents
/// before children and containers in iteration order. With `just_leaves`
/// only non-container values are reported.
///
/// The path passed to `cb` is a shared buffer rewritten between calls;
/// clone it to keep it.
///
/// # Examples
///
/// ```
/// use jsonpath_engine::{Value, walk};
/// use serde_json::json;
///
/// let data = Value::from(json!({"a": [1, {"b": 2}]}));
/// let mut paths = Vec::new();
/// walk(&data, |path, _| paths.push(path.to_string()), true);
/// assert_eq!(paths, vec!["$.a[0]", "$.a[1].b"]);
/// ```
pub fn walk(data: &Value, mut cb: impl FnMut(&Expr, &Value), just_leaves: bool) {
    trace!("walking a {}", data.type_name());
    let mut path = Expr::root();
    // Each entry is the path depth of the node's parent, the step to it
    // and the node.
    let mut stack: Vec<(usize, Option<Step>, &Value)> = vec![(1, None, data)];
    while let Some((depth, step, value)) = stack.pop() {
        path.truncate(depth);
        match step {
            Some(Step::Key(k)) => path.push_mut(Fragment::Child(k)),
            Some(Step::Index(i)) => path.push_mut(Fragment::Nth(i64::try_from(i).unwrap_or(i64::MAX))),
            None => {}
        }
        let is_container = value.is_container();
        if !is_container || !just_leaves {
            cb(&path, value);
        }
        if is_container {
            let depth = path.len();
            for (step, child) in value.entries().into_iter().rev() {
                stack.push((depth, Some(step), child));
            }
        }
    }
}
