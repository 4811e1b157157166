// tests/mutate_tests.rs

use jsonpath_engine::{AssignError, Expr, Fragment, Indexed, MutationError, Value, parse};
use serde_json::json;

fn doc(v: serde_json::Value) -> Value {
    Value::from(v)
}

fn path(text: &str) -> Expr {
    parse(text).unwrap()
}

fn set(text: &str, data: serde_json::Value, value: serde_json::Value) -> Value {
    let mut data = doc(data);
    path(text).set(&mut data, doc(value)).unwrap();
    data
}

fn del(text: &str, data: serde_json::Value) -> Value {
    let mut data = doc(data);
    path(text).del(&mut data).unwrap();
    data
}

fn remove(text: &str, data: serde_json::Value) -> Value {
    let mut data = doc(data);
    path(text).remove(&mut data).unwrap();
    data
}

fn add_ten(v: &Value) -> Option<Value> {
    v.as_int().map(|n| Value::from(n + 10))
}

/// Fixed-size ordered container; removal leaves a null behind.
#[derive(Debug, Clone)]
struct Slots {
    items: Vec<Value>,
}

impl Indexed for Slots {
    fn value_at_index(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    fn value_at_index_mut(&mut self, index: usize) -> Option<&mut Value> {
        self.items.get_mut(index)
    }

    fn set_value_at_index(&mut self, index: usize, value: Value) -> Result<(), AssignError> {
        match self.items.get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(AssignError::new(index.to_string(), value.type_name())),
        }
    }

    fn size(&self) -> usize {
        self.items.len()
    }

    fn clone_indexed(&self) -> Box<dyn Indexed> {
        Box::new(self.clone())
    }
}

// ============================================================================
// Set
// ============================================================================

#[test]
fn test_set_creates_intermediate_object() {
    assert_eq!(set("$.m.k", json!({}), json!(7)), doc(json!({"m": {"k": 7}})));
}

#[test]
fn test_set_existing_then_first() {
    let mut data = doc(json!({"a": {"b": 1}, "c": [1, 2]}));
    for (text, value) in [("$.a.b", json!("x")), ("$.c[1]", json!(false)), ("$.c[-2]", json!(null))] {
        let x = path(text);
        x.set(&mut data, doc(value.clone())).unwrap();
        assert_eq!(x.first(&data), Some(&doc(value)));
    }
    assert_eq!(data, doc(json!({"a": {"b": "x"}, "c": [null, false]})));
}

#[test]
fn test_set_creates_padded_array() {
    assert_eq!(
        set("$.a[2]", json!({}), json!(1)),
        doc(json!({"a": [null, null, 1]}))
    );
    assert_eq!(
        set("$.a[1].b", json!({"a": [null, {}]}), json!(1)),
        doc(json!({"a": [null, {"b": 1}]}))
    );
}

#[test]
fn test_set_through_padding_is_rejected() {
    let mut data = doc(json!({}));
    let err = path("$.a[2].b").set(&mut data, Value::from(1)).unwrap_err();
    assert_eq!(
        err,
        MutationError::CannotFollow {
            kind: "null",
            path: "$.a[2]".into()
        }
    );
}

#[test]
fn test_set_through_null_member_is_rejected() {
    let mut data = doc(json!({"a": null}));
    let err = path("$.a.b").set(&mut data, Value::from(1)).unwrap_err();
    assert_eq!(
        err,
        MutationError::CannotFollow {
            kind: "null",
            path: "$.a".into()
        }
    );
    assert_eq!(err.to_string(), "can not follow a null at '$.a'");
    assert_eq!(data, doc(json!({"a": null})));
}

#[test]
fn test_set_adds_key() {
    assert_eq!(
        set("$.a.z", json!({"a": {"y": 1}}), json!(2)),
        doc(json!({"a": {"y": 1, "z": 2}}))
    );
}

#[test]
fn test_set_wildcard_and_union() {
    assert_eq!(set("$.a[*]", json!({"a": [1, 2]}), json!(0)), doc(json!({"a": [0, 0]})));
    assert_eq!(
        set("$.o.*", json!({"o": {"x": 1, "y": 2}}), json!(0)),
        doc(json!({"o": {"x": 0, "y": 0}}))
    );
    assert_eq!(
        set("$['a','b']", json!({"a": 1}), json!(5)),
        doc(json!({"a": 5, "b": 5}))
    );
    assert_eq!(
        set("$.a[0,-1]", json!({"a": [1, 2, 3]}), json!(9)),
        doc(json!({"a": [9, 2, 9]}))
    );
}

#[test]
fn test_set_through_filter() {
    assert_eq!(
        set(
            "$.items[?(@.n > 1)].flag",
            json!({"items": [{"n": 1}, {"n": 2}, {"n": 3}]}),
            json!(true)
        ),
        doc(json!({"items": [{"n": 1}, {"n": 2, "flag": true}, {"n": 3, "flag": true}]}))
    );
}

#[test]
fn test_set_through_descent() {
    assert_eq!(
        set("$..x", json!({"x": 1, "y": {"x": 2}, "z": 3}), json!(0)),
        doc(json!({"x": 0, "y": {"x": 0}, "z": 3}))
    );
}

#[test]
fn test_set_one() {
    let mut data = doc(json!({"a": [1, 2, 3]}));
    path("$.a[*]").set_one(&mut data, Value::from(0)).unwrap();
    assert_eq!(data, doc(json!({"a": [0, 2, 3]})));
}

#[test]
fn test_set_slice_step_zero_does_nothing() {
    let mut data = doc(json!({"a": [{"v": 1}, {"v": 2}]}));
    path("$.a[0:2:0].v").set(&mut data, Value::from(0)).unwrap();
    assert_eq!(data, doc(json!({"a": [{"v": 1}, {"v": 2}]})));
}

#[test]
fn test_set_whole_root_is_rejected() {
    let mut data = doc(json!({"a": 1}));
    let err = path("$").set(&mut data, Value::from(1)).unwrap_err();
    assert_eq!(
        err,
        MutationError::IllegalTerminal {
            op: "set",
            fragment: "Root"
        }
    );
}

// ============================================================================
// Set errors
// ============================================================================

#[test]
fn test_empty_expression() {
    let mut data = doc(json!({}));
    let err = Expr::new().set(&mut data, Value::Null).unwrap_err();
    assert_eq!(err, MutationError::EmptyExpression { op: "set" });
    assert_eq!(err.to_string(), "can not set with an empty expression");

    let err = Expr::new().del(&mut data).unwrap_err();
    assert_eq!(err.to_string(), "can not delete with an empty expression");
}

#[test]
fn test_illegal_terminals() {
    let mut data = doc(json!({"a": [1, 2]}));
    let err = path("$.a[0:1]").set(&mut data, Value::Null).unwrap_err();
    assert_eq!(err.to_string(), "can not set with an expression ending with a Slice");

    let err = path("$..").set(&mut data, Value::Null).unwrap_err();
    assert_eq!(err.to_string(), "can not set with an expression ending with a Descent");

    let err = path("$.a[?(@ > 1)]").del(&mut data).unwrap_err();
    assert_eq!(err.to_string(), "can not delete with an expression ending with a Filter");

    let err = path("$..").remove(&mut data).unwrap_err();
    assert_eq!(err.to_string(), "can not remove with an expression ending with a Descent");

    let err = path("$..").modify(&mut data, |_| None).unwrap_err();
    assert_eq!(err.to_string(), "can not modify with an expression ending with a Descent");

    assert_eq!(data, doc(json!({"a": [1, 2]})));
}

#[test]
fn test_cannot_follow_scalar() {
    let mut data = doc(json!({"a": 1}));
    let err = path("$.a.b").set(&mut data, Value::from(2)).unwrap_err();
    assert_eq!(
        err,
        MutationError::CannotFollow {
            kind: "int",
            path: "$.a".into()
        }
    );
    assert_eq!(err.to_string(), "can not follow a int at '$.a'");
}

#[test]
fn test_cannot_deduce() {
    let mut data = doc(json!({}));
    let err = path("$.a.*").set(&mut data, Value::from(2)).unwrap_err();
    assert_eq!(err, MutationError::CannotDeduce { path: "$.a".into() });
    assert_eq!(err.to_string(), "can not deduce what element to add at '$.a'");
}

#[test]
fn test_negative_length() {
    let mut data = doc(json!({}));
    let err = path("$.a[-1]").set(&mut data, Value::from(2)).unwrap_err();
    assert_eq!(err, MutationError::NegativeLength { path: "$.a".into() });
    assert_eq!(
        err.to_string(),
        "can not deduce the length of the array to add at '$.a'"
    );
}

#[test]
fn test_out_of_bounds() {
    let mut data = doc(json!({"a": [1]}));
    let err = path("$.a[5]").set(&mut data, Value::from(2)).unwrap_err();
    assert_eq!(err, MutationError::OutOfBounds { path: "$.a[5]".into() });
    assert_eq!(
        err.to_string(),
        "can not follow out of bounds array index at '$.a[5]'"
    );

    let err = path("$.a[3].b").set(&mut data, Value::from(2)).unwrap_err();
    assert_eq!(err, MutationError::OutOfBounds { path: "$.a[3]".into() });
}

// ============================================================================
// Del
// ============================================================================

#[test]
fn test_del_array_element_shrinks() {
    assert_eq!(del("$.a[1]", json!({"a": [10, 20, 30]})), doc(json!({"a": [10, 30]})));
    assert_eq!(del("$.a[-1]", json!({"a": [10, 20, 30]})), doc(json!({"a": [10, 20]})));
}

#[test]
fn test_del_then_has_is_false() {
    let mut data = doc(json!({"a": {"b": 1, "c": 2}, "d": [1]}));
    for text in ["$.a.b", "$.d[0]", "$['a']"] {
        let x = path(text);
        assert!(x.has(&data));
        x.del(&mut data).unwrap();
        assert!(!x.has(&data), "{} still present", text);
    }
    assert_eq!(data, doc(json!({"d": []})));
}

#[test]
fn test_del_missing_key_is_ok() {
    assert_eq!(del("$.a.x", json!({"a": {"b": 1}})), doc(json!({"a": {"b": 1}})));
    assert_eq!(del("$.x.y", json!({"a": 1})), doc(json!({"a": 1})));
}

#[test]
fn test_del_slice_and_union() {
    assert_eq!(del("$.a[0:2]", json!({"a": [1, 2, 3]})), doc(json!({"a": [3]})));
    assert_eq!(del("$.a[::2]", json!({"a": [0, 1, 2, 3, 4]})), doc(json!({"a": [1, 3]})));
    assert_eq!(del("$.a[0,2,0]", json!({"a": [1, 2, 3]})), doc(json!({"a": [2]})));
    assert_eq!(del("$['x','z']", json!({"x": 1, "y": 2, "z": 3})), doc(json!({"y": 2})));
}

#[test]
fn test_del_slice_step_zero_does_nothing() {
    assert_eq!(del("$.a[0:3:0]", json!({"a": [1, 2, 3]})), doc(json!({"a": [1, 2, 3]})));
}

#[test]
fn test_del_wildcard() {
    assert_eq!(del("$.o.*", json!({"o": {"x": 1, "y": 2}})), doc(json!({"o": {}})));
    assert_eq!(del("$.a[*]", json!({"a": [1, 2, 3]})), doc(json!({"a": []})));
}

#[test]
fn test_del_one() {
    let mut data = doc(json!({"a": [1, 2, 3]}));
    path("$.a[*]").del_one(&mut data).unwrap();
    assert_eq!(data, doc(json!({"a": [2, 3]})));
}

#[test]
fn test_del_out_of_bounds_is_error() {
    let mut data = doc(json!({"a": [1]}));
    let err = path("$.a[4]").del(&mut data).unwrap_err();
    assert_eq!(err, MutationError::OutOfBounds { path: "$.a[4]".into() });
}

#[test]
fn test_del_out_of_bounds_mid_path_is_error() {
    let mut data = doc(json!({"a": [1]}));
    let err = path("$.a[5].b").del(&mut data).unwrap_err();
    assert_eq!(err, MutationError::OutOfBounds { path: "$.a[5]".into() });
    assert_eq!(
        err.to_string(),
        "can not follow out of bounds array index at '$.a[5]'"
    );
    assert_eq!(data, doc(json!({"a": [1]})));

    path("$.a[5].b").remove(&mut data).unwrap();
    path("$.a[5].b").modify(&mut data, add_ten).unwrap();
    assert_eq!(data, doc(json!({"a": [1]})));
}

#[test]
fn test_del_through_descent() {
    assert_eq!(
        del("$..x", json!({"x": 1, "y": {"x": 2, "z": [{"x": 3}]}})),
        doc(json!({"y": {"z": [{}]}}))
    );
}

#[test]
fn test_del_through_descent_in_arrays() {
    assert_eq!(
        del("$..[0]", json!({"a": [[1, 2], [3, 4]]})),
        doc(json!({"a": [[4]]}))
    );
}

#[test]
fn test_del_from_fixed_size_container() {
    let mut data = Value::Indexed(Box::new(Slots {
        items: vec![Value::from(1), Value::from(2)],
    }));
    path("$[0]").del(&mut data).unwrap();
    assert_eq!(data.get_index(0), Some(&Value::Null));
    assert_eq!(data.get_index(1), Some(&Value::from(2)));
}

// ============================================================================
// Modify
// ============================================================================

#[test]
fn test_modify_descent() {
    let mut data = doc(json!({"x": {"n": 1}, "y": [{"n": 2}]}));
    path("$..n").modify(&mut data, add_ten).unwrap();
    assert_eq!(data, doc(json!({"x": {"n": 11}, "y": [{"n": 12}]})));
}

#[test]
fn test_modify_skips_unchanged() {
    let mut data = doc(json!({"a": [1, "x", 2]}));
    let mut seen = 0;
    path("$.a[*]")
        .modify(&mut data, |v| {
            seen += 1;
            add_ten(v)
        })
        .unwrap();
    assert_eq!(seen, 3);
    assert_eq!(data, doc(json!({"a": [11, "x", 12]})));
}

#[test]
fn test_modify_one() {
    let mut data = doc(json!({"a": ["x", 1, 2]}));
    path("$.a[*]").modify_one(&mut data, add_ten).unwrap();
    assert_eq!(data, doc(json!({"a": ["x", 11, 2]})));
}

#[test]
fn test_modify_one_under_descent_picks_deepest() {
    let mut data = doc(json!({"n": 1, "x": {"n": 2}}));
    let x = path("$..n");
    assert_eq!(x.first(&data), Some(&Value::from(1)));
    x.modify_one(&mut data, add_ten).unwrap();
    assert_eq!(data, doc(json!({"n": 1, "x": {"n": 12}})));
}

#[test]
fn test_modify_root() {
    let mut data = doc(json!({"a": 1}));
    path("$").modify(&mut data, |_| Some(Value::from("replaced"))).unwrap();
    assert_eq!(data, Value::from("replaced"));
}

#[test]
fn test_modify_filter_terminal() {
    let mut data = doc(json!({"a": [1, 5, 9]}));
    path("$.a[?(@ > 3)]").modify(&mut data, add_ten).unwrap();
    assert_eq!(data, doc(json!({"a": [1, 15, 19]})));
}

#[test]
fn test_modify_out_of_bounds_is_skipped() {
    let mut data = doc(json!({"a": [1]}));
    path("$.a[7]").modify(&mut data, add_ten).unwrap();
    assert_eq!(data, doc(json!({"a": [1]})));
}

#[test]
fn test_modify_never_creates() {
    let mut data = doc(json!({}));
    path("$.a.b").modify(&mut data, |_| Some(Value::from(1))).unwrap();
    assert_eq!(data, doc(json!({})));
}

// ============================================================================
// Remove
// ============================================================================

#[test]
fn test_remove_by_filter() {
    assert_eq!(remove("$.a[?(@ > 1)]", json!({"a": [1, 2, 3]})), doc(json!({"a": [1]})));
    assert_eq!(
        remove("$[?(@.off == true)]", json!({"x": {"off": true}, "y": {"off": false}})),
        doc(json!({"y": {"off": false}}))
    );
}

#[test]
fn test_remove_one() {
    let mut data = doc(json!({"a": [1, 2, 3]}));
    path("$.a[?(@ > 1)]").remove_one(&mut data).unwrap();
    assert_eq!(data, doc(json!({"a": [1, 3]})));
}

#[test]
fn test_remove_out_of_bounds_is_ok() {
    assert_eq!(remove("$.a[9]", json!({"a": [1]})), doc(json!({"a": [1]})));
}

#[test]
fn test_remove_keys_and_indexes() {
    assert_eq!(remove("$.a.b", json!({"a": {"b": 1, "c": 2}})), doc(json!({"a": {"c": 2}})));
    assert_eq!(remove("$.a[-1]", json!({"a": [1, 2]})), doc(json!({"a": [1]})));
}

// ============================================================================
// Long paths
// ============================================================================

#[test]
fn test_very_long_paths() {
    let mut x = Expr::root();
    for _ in 0..70_000 {
        x = x.push(Fragment::Bracket);
    }
    let x = x.child("a");
    let mut data = doc(json!({"a": 1}));
    x.set(&mut data, Value::from(2)).unwrap();
    assert_eq!(data, doc(json!({"a": 2})));
    x.modify(&mut data, add_ten).unwrap();
    assert_eq!(data, doc(json!({"a": 12})));

    let x = path(&format!("${}x", "..".repeat(70_000)));
    assert_eq!(x.len(), 70_002);
    let mut data = doc(json!({"x": 1, "y": 2}));
    x.del(&mut data).unwrap();
    assert_eq!(data, doc(json!({"y": 2})));
    x.remove(&mut data).unwrap();
    assert_eq!(data, doc(json!({"y": 2})));
}
