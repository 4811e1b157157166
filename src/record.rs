//! Field access on arbitrary serde types.
//!
//! A [`Record`] holds the serialized fields of a struct and exposes them
//! through [`Keyed`]. Field names are the serialized names, so serde
//! `rename` attributes apply. Lookups try the exact name first, then an
//! ASCII case-insensitive match. Nested structs become records too.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::AssignError;
use crate::value::{Keyed, Map, Value};

/// A struct-like value adapted for path traversal.
///
/// Only serialized names are known. A field declared as
/// `#[serde(rename = "t")] title` is reached as `$.t`, never as `$.title`.
///
/// # Examples
///
/// ```
/// use jsonpath_engine::{Expr, Record, Value};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Book {
///     title: String,
///     price: f64,
/// }
///
/// let book = Book { title: "Dune".into(), price: 9.5 };
/// let mut data = Value::from(Record::from_serialize(&book).unwrap());
/// let x: Expr = "$.Price".parse().unwrap();
/// x.set(&mut data, Value::from(7.25)).unwrap();
///
/// let Value::Keyed(keyed) = &data else { unreachable!() };
/// assert_eq!(keyed.value_for_key("price"), Some(&Value::Float(7.25)));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Map,
}

impl Record {
    /// Captures the fields of `value`, which must serialize to a map.
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Record, serde_json::Error> {
        match serde_json::to_value(value)? {
            serde_json::Value::Object(obj) => Ok(Record::from_json_map(obj)),
            other => Err(serde::ser::Error::custom(format!(
                "expected a record, found {}",
                Value::from(other).type_name()
            ))),
        }
    }

    /// Rebuilds a `T` from the current fields.
    pub fn into_deserialize<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.to_json_value())
    }

    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.fields
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json_value()))
                .collect(),
        )
    }

    fn from_json_map(obj: serde_json::Map<String, serde_json::Value>) -> Record {
        Record {
            fields: obj
                .into_iter()
                .map(|(k, v)| (k, record_value(v)))
                .collect(),
        }
    }

    fn field_index(&self, key: &str) -> Option<usize> {
        self.fields.get_index_of(key).or_else(|| {
            self.fields
                .keys()
                .position(|k| k.eq_ignore_ascii_case(key))
        })
    }
}

fn record_value(v: serde_json::Value) -> Value {
    match v {
        serde_json::Value::Object(obj) => Value::Keyed(Box::new(Record::from_json_map(obj))),
        serde_json::Value::Array(arr) => Value::Array(arr.into_iter().map(record_value).collect()),
        other => Value::from(other),
    }
}

/// True if a field currently holding `current` may be given `new`.
fn accepts(current: &Value, new: &Value) -> bool {
    match (current, new) {
        (Value::Null, _) | (_, Value::Null) => true,
        (Value::Float(_), Value::Integer(_)) => true,
        (Value::Array(_) | Value::Indexed(_), Value::Array(_) | Value::Indexed(_)) => true,
        (Value::Object(_) | Value::Keyed(_), Value::Object(_) | Value::Keyed(_)) => true,
        _ => std::mem::discriminant(current) == std::mem::discriminant(new),
    }
}

impl Keyed for Record {
    fn value_for_key(&self, key: &str) -> Option<&Value> {
        self.field_index(key)
            .and_then(|i| self.fields.get_index(i))
            .map(|(_, v)| v)
    }

    fn value_for_key_mut(&mut self, key: &str) -> Option<&mut Value> {
        let i = self.field_index(key)?;
        self.fields.get_index_mut(i).map(|(_, v)| v)
    }

    fn set_value_for_key(&mut self, key: &str, value: Value) -> Result<(), AssignError> {
        let Some(slot) = self.value_for_key_mut(key) else {
            return Err(AssignError::new(key, value.type_name()));
        };
        if !accepts(slot, &value) {
            return Err(AssignError::new(key, value.type_name()));
        }
        *slot = value;
        Ok(())
    }

    /// Fields can not be dropped from a record; the field is cleared to
    /// `null` instead.
    fn remove_value_for_key(&mut self, key: &str) -> Option<Value> {
        self.value_for_key_mut(key)
            .map(|slot| std::mem::take(slot))
    }

    fn keys(&self) -> Vec<String> {
        self.fields.keys().cloned().collect()
    }

    fn clone_keyed(&self) -> Box<dyn Keyed> {
        Box::new(self.clone())
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Keyed(Box::new(record))
    }
}
