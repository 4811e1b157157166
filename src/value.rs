use std::fmt;

use indexmap::IndexMap;

use crate::error::AssignError;

/// Insertion-ordered map backing [`Value::Object`].
pub type Map = IndexMap<String, Value>;

/// A user container addressed by string keys.
///
/// The order returned by [`Keyed::keys`] is the order wildcards, descent,
/// filters and the walker visit the container in.
pub trait Keyed: fmt::Debug + Send + Sync {
    fn value_for_key(&self, key: &str) -> Option<&Value>;

    fn value_for_key_mut(&mut self, key: &str) -> Option<&mut Value>;

    fn set_value_for_key(&mut self, key: &str, value: Value) -> Result<(), AssignError>;

    fn remove_value_for_key(&mut self, key: &str) -> Option<Value>;

    fn keys(&self) -> Vec<String>;

    fn clone_keyed(&self) -> Box<dyn Keyed>;
}

/// A user container addressed by position.
pub trait Indexed: fmt::Debug + Send + Sync {
    fn value_at_index(&self, index: usize) -> Option<&Value>;

    fn value_at_index_mut(&mut self, index: usize) -> Option<&mut Value>;

    fn set_value_at_index(&mut self, index: usize, value: Value) -> Result<(), AssignError>;

    fn size(&self) -> usize;

    fn clone_indexed(&self) -> Box<dyn Indexed>;

    /// Removes the element at `index`. Containers that can not shrink keep
    /// their size and hold `Null` in the vacated slot.
    fn remove_value_at_index(&mut self, index: usize) -> Result<(), AssignError> {
        self.set_value_at_index(index, Value::Null)
    }
}

/// A value a path expression can traverse.
///
/// Native JSON shapes are represented directly. User containers plug in
/// through the [`Keyed`] and [`Indexed`] capabilities; anything serde can
/// serialize can be adapted with [`crate::Record`].
///
/// # Examples
///
/// ```
/// use jsonpath_engine::Value;
/// use serde_json::json;
///
/// let value = Value::from(json!({"a": [1, 2.5, "x"]}));
/// assert_eq!(value.get_key("a").and_then(|a| a.get_index(-1)), Some(&Value::from("x")));
/// ```
#[derive(Debug, Default)]
pub enum Value {
    /// JSON null
    #[default]
    Null,

    /// JSON boolean
    Boolean(bool),

    /// Integer number (kept apart from floats)
    Integer(i64),

    /// Floating-point number
    Float(f64),

    /// UTF-8 string
    String(String),

    /// Ordered sequence
    Array(Vec<Value>),

    /// Keyed collection in insertion order
    Object(Map),

    /// User keyed container
    Keyed(Box<dyn Keyed>),

    /// User indexed container
    Indexed(Box<dyn Indexed>),
}

/// One step from a container to a child.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Step {
    Key(String),
    Index(usize),
}

/// Resolves a possibly negative index against `len`.
pub fn normalize_index(index: i64, len: usize) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let i = if index < 0 { len + index } else { index };
    if (0..len).contains(&i) {
        usize::try_from(i).ok()
    } else {
        None
    }
}

impl Value {
    /// Name of the value kind, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "bool",
            Value::Integer(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Keyed(_) => "keyed",
            Value::Indexed(_) => "indexed",
        }
    }

    /// True for values that can have children.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            Value::Array(_) | Value::Object(_) | Value::Keyed(_) | Value::Indexed(_)
        )
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Get as float, widening integers
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Number of children of a container, `None` for scalars.
    pub fn container_len(&self) -> Option<usize> {
        match self {
            Value::Array(arr) => Some(arr.len()),
            Value::Object(obj) => Some(obj.len()),
            Value::Keyed(k) => Some(k.keys().len()),
            Value::Indexed(ix) => Some(ix.size()),
            _ => None,
        }
    }

    /// Keyed lookup on objects and keyed containers.
    pub fn get_key(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(obj) => obj.get(key),
            Value::Keyed(k) => k.value_for_key(key),
            _ => None,
        }
    }

    pub fn get_key_mut(&mut self, key: &str) -> Option<&mut Value> {
        match self {
            Value::Object(obj) => obj.get_mut(key),
            Value::Keyed(k) => k.value_for_key_mut(key),
            _ => None,
        }
    }

    /// Positional lookup on arrays and indexed containers. Negative
    /// indexes count from the end.
    pub fn get_index(&self, index: i64) -> Option<&Value> {
        match self {
            Value::Array(arr) => normalize_index(index, arr.len()).and_then(|i| arr.get(i)),
            Value::Indexed(ix) => {
                normalize_index(index, ix.size()).and_then(|i| ix.value_at_index(i))
            }
            _ => None,
        }
    }

    pub fn get_index_mut(&mut self, index: i64) -> Option<&mut Value> {
        match self {
            Value::Array(arr) => normalize_index(index, arr.len()).and_then(|i| arr.get_mut(i)),
            Value::Indexed(ix) => {
                normalize_index(index, ix.size()).and_then(|i| ix.value_at_index_mut(i))
            }
            _ => None,
        }
    }

    /// Immediate children in iteration order.
    pub fn children(&self) -> Vec<&Value> {
        match self {
            Value::Array(arr) => arr.iter().collect(),
            Value::Object(obj) => obj.values().collect(),
            Value::Keyed(k) => k
                .keys()
                .iter()
                .filter_map(|key| k.value_for_key(key))
                .collect(),
            Value::Indexed(ix) => (0..ix.size()).filter_map(|i| ix.value_at_index(i)).collect(),
            _ => Vec::new(),
        }
    }

    /// Immediate children paired with the step that reaches them.
    pub fn entries(&self) -> Vec<(Step, &Value)> {
        match self {
            Value::Array(arr) => arr
                .iter()
                .enumerate()
                .map(|(i, v)| (Step::Index(i), v))
                .collect(),
            Value::Object(obj) => obj
                .iter()
                .map(|(k, v)| (Step::Key(k.clone()), v))
                .collect(),
            Value::Keyed(k) => k
                .keys()
                .into_iter()
                .filter_map(|key| k.value_for_key(&key).map(|v| (Step::Key(key.clone()), v)))
                .collect(),
            Value::Indexed(ix) => (0..ix.size())
                .filter_map(|i| ix.value_at_index(i).map(|v| (Step::Index(i), v)))
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn step(&self, step: &Step) -> Option<&Value> {
        match (self, step) {
            (Value::Array(arr), Step::Index(i)) => arr.get(*i),
            (Value::Indexed(ix), Step::Index(i)) => ix.value_at_index(*i),
            (_, Step::Key(key)) => self.get_key(key),
            _ => None,
        }
    }

    pub fn step_mut(&mut self, step: &Step) -> Option<&mut Value> {
        match (self, step) {
            (Value::Array(arr), Step::Index(i)) => arr.get_mut(*i),
            (Value::Indexed(ix), Step::Index(i)) => ix.value_at_index_mut(*i),
            (value, Step::Key(key)) => value.get_key_mut(key),
            _ => None,
        }
    }

    /// Follows a sequence of steps from this value.
    pub fn pointer(&self, steps: &[Step]) -> Option<&Value> {
        steps.iter().try_fold(self, |v, s| v.step(s))
    }

    pub fn pointer_mut(&mut self, steps: &[Step]) -> Option<&mut Value> {
        steps.iter().try_fold(self, |v, s| v.step_mut(s))
    }

    /// Converts to a `serde_json::Value`. User containers are copied
    /// through their capabilities; non-finite floats become null.
    pub fn to_json_value(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Integer(i) => serde_json::Value::Number((*i).into()),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(_) | Value::Indexed(_) => serde_json::Value::Array(
                self.children().into_iter().map(Value::to_json_value).collect(),
            ),
            Value::Object(_) | Value::Keyed(_) => serde_json::Value::Object(
                self.entries()
                    .into_iter()
                    .filter_map(|(step, v)| match step {
                        Step::Key(k) => Some((k, v.to_json_value())),
                        Step::Index(_) => None,
                    })
                    .collect(),
            ),
        }
    }
}

impl Clone for Value {
    fn clone(&self) -> Self {
        match self {
            Value::Null => Value::Null,
            Value::Boolean(b) => Value::Boolean(*b),
            Value::Integer(n) => Value::Integer(*n),
            Value::Float(n) => Value::Float(*n),
            Value::String(s) => Value::String(s.clone()),
            Value::Array(arr) => Value::Array(arr.clone()),
            Value::Object(obj) => Value::Object(obj.clone()),
            Value::Keyed(k) => Value::Keyed(k.clone_keyed()),
            Value::Indexed(ix) => Value::Indexed(ix.clone_indexed()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Keyed(a), Value::Keyed(b)) => {
                let keys = a.keys();
                keys.len() == b.keys().len()
                    && keys
                        .iter()
                        .all(|k| a.value_for_key(k) == b.value_for_key(k))
            }
            (Value::Indexed(a), Value::Indexed(b)) => {
                a.size() == b.size()
                    && (0..a.size()).all(|i| a.value_at_index(i) == b.value_at_index(i))
            }
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::output::to_json(self))
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => n.as_f64().map_or(Value::Null, Value::Float),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(arr) => {
                Value::Array(arr.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(obj) => {
                Value::Object(obj.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(arr: Vec<Value>) -> Self {
        Value::Array(arr)
    }
}

impl From<Map> for Value {
    fn from(obj: Map) -> Self {
        Value::Object(obj)
    }
}
