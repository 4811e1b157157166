// tests/walk_tests.rs

use jsonpath_engine::{Value, parse, walk};
use serde_json::json;

fn collect(data: &Value, just_leaves: bool) -> Vec<(String, Value)> {
    let mut out = Vec::new();
    walk(data, |path, value| out.push((path.to_string(), value.clone())), just_leaves);
    out
}

fn paths(data: &Value, just_leaves: bool) -> Vec<String> {
    collect(data, just_leaves).into_iter().map(|(p, _)| p).collect()
}

#[test]
fn test_walk_all_nodes_pre_order() {
    let data = Value::from(json!({"a": [1, {"b": 2}], "c": "x"}));
    assert_eq!(
        paths(&data, false),
        vec!["$", "$.a", "$.a[0]", "$.a[1]", "$.a[1].b", "$.c"]
    );
}

#[test]
fn test_walk_leaves_only() {
    let data = Value::from(json!({"a": [1, {"b": 2}], "c": "x", "e": {}}));
    assert_eq!(paths(&data, true), vec!["$.a[0]", "$.a[1].b", "$.c"]);
}

#[test]
fn test_walk_scalar_root() {
    let data = Value::from(5);
    let found = collect(&data, true);
    assert_eq!(found, vec![("$".to_string(), Value::from(5))]);
}

#[test]
fn test_walk_quotes_odd_keys() {
    let data = Value::from(json!({"a b": 1, "": 2, "it's": 3}));
    assert_eq!(paths(&data, true), vec!["$['a b']", "$['']", r"$['it\'s']"]);
}

#[test]
fn test_walk_paths_select_their_values() {
    let data = Value::from(json!({
        "store": {"book": [{"title": "A", "tags": ["x"]}, {"title": "B"}]},
        "odd key": [null, true, 1.5]
    }));
    for (text, value) in collect(&data, false) {
        let x = parse(&text).unwrap();
        assert_eq!(x.first(&data), Some(&value), "walk path {}", text);
    }
}
