// tests/script_tests.rs

use jsonpath_engine::ast::{Form, FormArg};
use jsonpath_engine::{Equation, Expr, Operand, Operator, Script, Step, Value, parse};
use serde_json::json;

fn script(text: &str) -> Script {
    Script::parse(text).unwrap()
}

fn holds(text: &str, data: serde_json::Value) -> bool {
    script(text).matches(&Value::from(data))
}

// ============================================================================
// Parsing and rendering
// ============================================================================

#[test]
fn test_render_adds_parens() {
    assert_eq!(script("@.x > 1").to_string(), "(@.x > 1)");
    assert_eq!(script("(@.x > 1)").to_string(), "(@.x > 1)");
}

#[test]
fn test_render_round_trip() {
    let scripts = [
        "(@.x == 'a b')",
        "(@.a + @.b * 2 == 7)",
        "((@.a + 1) * 2 == 4)",
        "(@.price < 10 && @.tag != 'x' || @.free == true)",
        "(!(@.x < 1))",
        "(length(@.name) >= 3)",
        "(count(@.items.*) == 2)",
        "(match(@.code, 'A[0-9]+'))",
        "(search(@.code, 'A'))",
        "(@.c in ['red',2,null])",
        "(@.tags empty false)",
        "(@.x exists true)",
        "(@.y has false)",
        "(@.n == Nothing)",
        "(@.p ~= /a\\/b/)",
        "(@.v == $.target)",
        "(@.f == 1.5)",
    ];
    for text in scripts {
        let rendered = script(text).to_string();
        assert_eq!(rendered, text);
        assert_eq!(script(&rendered).to_string(), rendered);
    }
}

#[test]
fn test_render_alternate_regex_operator() {
    assert_eq!(script("@.name =~ /oh/").to_string(), "(@.name ~= /oh/)");
}

#[test]
fn test_precedence_from_equation() {
    let one = || Equation::value(1);
    let eq = Equation::binary(
        Operator::Multiply,
        Equation::binary(Operator::Add, one(), Equation::value(2)),
        Equation::value(3),
    );
    assert_eq!(eq.script().to_string(), "((1 + 2) * 3)");
    assert_eq!(eq.script(), script("(1 + 2) * 3"));

    let eq = Equation::binary(
        Operator::Subtract,
        one(),
        Equation::binary(Operator::Subtract, Equation::value(2), Equation::value(3)),
    );
    assert_eq!(eq.script().to_string(), "(1 - (2 - 3))");
}

#[test]
fn test_missing_right_operand_is_null() {
    let eq = Equation::Op {
        op: Operator::Equal,
        left: Box::new(Equation::value(Expr::at().child("x"))),
        right: None,
    };
    assert_eq!(eq.script().to_string(), "(@.x == null)");
}

#[test]
fn test_inspect() {
    let FormArg::Form(form) = script("1 + 2 * 3").inspect() else {
        panic!("expected a form");
    };
    assert_eq!(form.op, Operator::Add);
    assert_eq!(form.left, Some(FormArg::Operand(Operand::Int(1))));
    assert_eq!(
        form.right,
        Some(FormArg::Form(Box::new(Form {
            op: Operator::Multiply,
            left: Some(FormArg::Operand(Operand::Int(2))),
            right: Some(FormArg::Operand(Operand::Int(3))),
        })))
    );
}

#[test]
fn test_inspect_path_operand() {
    let FormArg::Form(form) = script("@.a > 1").inspect() else {
        panic!("expected a form");
    };
    assert_eq!(form.op, Operator::GreaterThan);
    assert_eq!(
        form.left,
        Some(FormArg::Operand(Operand::Path(parse("@.a").unwrap())))
    );
}

#[test]
fn test_logical_precedence() {
    let FormArg::Form(form) = script("@.a == 1 || @.b == 2 && @.c == 3").inspect() else {
        panic!("expected a form");
    };
    // && and || share a precedence and join left to right
    assert_eq!(form.op, Operator::And);
}

#[test]
fn test_script_errors() {
    assert_eq!(
        Script::parse("@.x ~ 1").unwrap_err().message,
        "'~' is not a valid operation"
    );
    assert_eq!(
        Script::parse("@.x == 1 2").unwrap_err().message,
        "expected an operation"
    );
    assert_eq!(Script::parse("@.x == 'abc").unwrap_err().message, "not terminated");
    assert_eq!(
        Script::parse("@.x in [1, !@.y]").unwrap_err().message,
        "expected a list value"
    );
    assert!(Script::parse("lenth(@.x)").is_err());
}

// ============================================================================
// Comparison
// ============================================================================

#[test]
fn test_equality() {
    assert!(holds("@.a == 1", json!({"a": 1})));
    assert!(holds("@.a == 1.0", json!({"a": 1})));
    assert!(holds("@.s == 'x'", json!({"s": "x"})));
    assert!(holds("@.n == null", json!({"n": null})));
    assert!(holds("@.b == true", json!({"b": true})));
    assert!(!holds("@.a == '1'", json!({"a": 1})));
    assert!(holds("@.a != '1'", json!({"a": 1})));
}

#[test]
fn test_list_equality() {
    assert!(holds("@.a == [1,2]", json!({"a": [1, 2]})));
    assert!(!holds("@.a == [1,2]", json!({"a": [2, 1]})));
    assert!(holds("[1,'x'] == [1,'x']", json!({})));
}

#[test]
fn test_ordering() {
    assert!(holds("@.s < 'b'", json!({"s": "a"})));
    assert!(holds("@.n >= 2.5", json!({"n": 3})));
    assert!(holds("@.n <= 3", json!({"n": 3})));
    assert!(!holds("@.s < 1", json!({"s": "a"})));
    assert!(!holds("@.s >= 1", json!({"s": "a"})));
    assert!(holds("!(@.s < 1)", json!({"s": "a"})));
}

#[test]
fn test_nothing() {
    assert!(!holds("@.x == Nothing", json!({})));
    assert!(!holds("@.x == null", json!({})));
    assert!(holds("@.x != 1", json!({})));
    assert!(holds("@.x exists false", json!({})));
    assert!(holds("@.x has false", json!({})));
    assert!(!holds("@.x has true", json!({})));
    assert!(holds("@.x has true", json!({"x": null})));
}

#[test]
fn test_bare_path_means_exists() {
    assert!(holds("@.x", json!({"x": false})));
    assert!(!holds("@.x", json!({})));
}

#[test]
fn test_in() {
    assert!(holds("@.c in ['red','blue']", json!({"c": "blue"})));
    assert!(!holds("@.c in ['red','blue']", json!({"c": "green"})));
    assert!(holds("@.n in [1,2.5]", json!({"n": 2.5})));
    assert!(holds("@.c in $.allowed", json!({"c": 2, "allowed": [1, 2]})));
    assert!(!holds("@.c in []", json!({"c": 1})));
}

#[test]
fn test_empty() {
    assert!(holds("@.t empty true", json!({"t": []})));
    assert!(holds("@.t empty true", json!({"t": ""})));
    assert!(holds("@.t empty true", json!({"t": {}})));
    assert!(holds("@.t empty false", json!({"t": [1]})));
    assert!(!holds("@.t empty true", json!({"t": 0})));
}

// ============================================================================
// Logic and arithmetic
// ============================================================================

#[test]
fn test_and_or_not() {
    let data = json!({"a": 1, "b": 2});
    assert!(holds("@.a == 1 && @.b == 2", data.clone()));
    assert!(!holds("@.a == 1 && @.b == 3", data.clone()));
    assert!(holds("@.a == 9 || @.b == 2", data.clone()));
    assert!(holds("!(@.a == 9)", data.clone()));
    assert!(!holds("!(@.a == 1)", data.clone()));
    // not of a non-boolean is true
    assert!(holds("!@.a", data));
}

#[test]
fn test_arithmetic() {
    let data = json!({"a": 3, "b": 4, "f": 1.5});
    assert!(holds("@.a + @.b == 7", data.clone()));
    assert!(holds("@.a * 2 + 1 == 7", data.clone()));
    assert!(holds("1 + @.a * 2 == 7", data.clone()));
    assert!(holds("(1 + @.a) * 2 == 8", data.clone()));
    assert!(holds("@.b - @.a - 1 == 0", data.clone()));
    assert!(holds("@.b / 3 == 1", data.clone()));
    assert!(holds("@.f + 0.5 == 2", data.clone()));
    assert!(holds("@.f * @.a == 4.5", data.clone()));
    assert!(holds("0.1 + 0.2 == 0.30000000000000004", data));
}

#[test]
fn test_arithmetic_failures_are_nothing() {
    let data = json!({"a": 1, "s": "x", "big": i64::MAX});
    assert!(holds("(@.a / 0) exists false", data.clone()));
    assert!(holds("(@.big + 1) exists false", data.clone()));
    assert!(holds("(@.s * 2) exists false", data.clone()));
    assert!(holds("(@.missing + 1) exists false", data));
}

#[test]
fn test_string_concat() {
    assert!(holds(
        "@.f + ' ' + @.l == 'John Smith'",
        json!({"f": "John", "l": "Smith"})
    ));
}

// ============================================================================
// Regex and functions
// ============================================================================

#[test]
fn test_regex_operator() {
    assert!(holds("@.name ~= /^J.*n$/", json!({"name": "John"})));
    assert!(holds("@.name =~ 'oh'", json!({"name": "John"})));
    assert!(!holds("@.name ~= /^x/", json!({"name": "John"})));
    assert!(!holds("@.n ~= /1/", json!({"n": 1})));
}

#[test]
fn test_regex_escaped_slash() {
    let s = script("@.p ~= /a\\/b/");
    assert!(s.matches(&Value::from(json!({"p": "xa/by"}))));
    assert_eq!(s.to_string(), "(@.p ~= /a\\/b/)");
}

#[test]
fn test_length() {
    assert!(holds("length(@.name) == 4", json!({"name": "John"})));
    assert!(holds("length(@.a) == 3", json!({"a": [1, 2, 3]})));
    assert!(holds("length(@.o) == 1", json!({"o": {"k": 1}})));
    assert!(holds("length(@.n) exists false", json!({"n": 5})));
}

#[test]
fn test_count() {
    let data = json!({"items": [{"k": 1}, {"k": 2}, {"j": 3}]});
    assert!(holds("count(@.items[*]) == 3", data.clone()));
    assert!(holds("count(@.items[*].k) == 2", data.clone()));
    assert!(holds("count(@.nope) == 0", data));
}

#[test]
fn test_match_is_anchored() {
    assert!(holds("match(@.c, 'A[0-9]+')", json!({"c": "A12"})));
    assert!(!holds("match(@.c, 'A[0-9]+')", json!({"c": "xA12"})));
    assert!(holds("match(@.c, 'a|b')", json!({"c": "b"})));
    assert!(!holds("match(@.c, 'a|b')", json!({"c": "ab"})));
    assert!(holds("match(@.c, /^A.$/)", json!({"c": "Ab"})));
}

#[test]
fn test_search_is_unanchored() {
    assert!(holds("search(@.c, 'A[0-9]')", json!({"c": "xA12"})));
    assert!(!holds("search(@.c, 'B')", json!({"c": "xA12"})));
}

#[test]
fn test_match_bad_input_is_nothing() {
    assert!(holds("match(@.c, '') exists false", json!({"c": "x"})));
    assert!(holds("match(@.c, 'x') exists false", json!({"c": 1})));
    assert!(holds("search(@.c, '(') exists false", json!({"c": "x"})));
}

// ============================================================================
// Selection
// ============================================================================

#[test]
fn test_select_children() {
    let data = Value::from(json!([{"n": 1}, {"n": 5}, {"n": 9}]));
    let s = script("@.n > 2");
    let selected = s.select(&data, &data);
    assert_eq!(selected.len(), 2);
    assert_eq!(selected[0], &Value::from(json!({"n": 5})));

    let entries = s.select_entries(&data, &data);
    let steps: Vec<Step> = entries.into_iter().map(|(step, _)| step).collect();
    assert_eq!(steps, vec![Step::Index(1), Step::Index(2)]);
}

#[test]
fn test_select_uses_root() {
    let root = Value::from(json!({"limit": 2, "xs": [1, 2, 3]}));
    let xs = parse("$.xs").unwrap().first(&root).unwrap().clone();
    let s = script("@ >= $.limit");
    assert_eq!(s.select(&xs, &root), vec![&Value::from(2), &Value::from(3)]);
}

#[test]
fn test_select_on_scalar() {
    let data = Value::from(7);
    assert!(script("@ > 1").select(&data, &data).is_empty());
}
