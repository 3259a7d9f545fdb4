#![allow(
    clippy::unwrap_used,
    reason = "test code uses unwrap for concise assertions"
)]

use aml_ir::builder::{
    array, binary, boolean, default, field, for_list, ident, if_then, index, int, interpolation,
    null, number, part, path, record, root, schema, select, slice, string, text, union,
};
use aml_ir::{BinaryOp, Position};
use aml_value::{EvalErrorKind, Kind};
use pretty_assertions::assert_eq;

use super::*;
use crate::Evaluator;

fn eval(expr: &Expr) -> Value {
    Evaluator::new().evaluate(expr).unwrap().unwrap()
}

#[test]
fn literals() {
    assert_eq!(eval(&null()), Value::Null);
    assert_eq!(eval(&boolean(true)), Value::Bool(true));
    assert_eq!(eval(&number("2Ki")), Value::int(2048));
    assert_eq!(eval(&string("hi")), Value::string("hi"));
}

#[test]
fn interpolation_renders_each_part() {
    let expr = interpolation(vec![
        text("port "),
        part(int(80)),
        text(" open: "),
        part(boolean(true)),
        text(" "),
        part(array(vec![int(1), int(2)])),
    ]);
    assert_eq!(eval(&expr), Value::string("port 80 open: true [1,2]"));
}

#[test]
fn interpolation_propagates_undefined() {
    let expr = interpolation(vec![text("x="), part(ident("missing"))]);
    assert_eq!(eval(&expr), Value::missing("missing"));
}

#[test]
fn list_comprehensions_splice_into_arrays() {
    let expr = array(vec![
        int(0),
        for_list(None, Some("v"), array(vec![int(1), int(2)]), ident("v")),
        if_then(boolean(false), int(9), None),
        int(3),
    ]);
    assert_eq!(eval(&expr).to_string(), "[0, 1, 2, 3]");
}

#[test]
fn arrays_in_schema_mode_are_array_schemas() {
    let evaluator = Evaluator::new();
    let value = evaluator
        .evaluate_schema(&array(vec![ident("int")]))
        .unwrap();
    let schema = value.as_schema().unwrap();
    assert_eq!(schema.kind, Kind::Array);
    assert!(aml_value::merge(&value, &Value::array(vec![Value::int(1)])).is_ok());
    assert!(aml_value::merge(&value, &Value::array(vec![Value::string("x")])).is_err());
}

#[test]
fn scalars_stay_concrete_in_schema_mode() {
    let evaluator = Evaluator::new();
    assert_eq!(evaluator.evaluate_schema(&int(5)).unwrap(), Value::int(5));
}

#[test]
fn selectors_and_paths() {
    let doc = record(vec![
        field("svc", record(vec![field("port", int(80))])),
        field("port", path("svc.port")),
        field("gone", select(ident("svc"), "host")),
    ]);
    let value = eval(&doc);
    let fields = value.as_object().unwrap();
    assert_eq!(fields.get("port"), Some(&Value::int(80)));
    assert_eq!(fields.get("gone"), Some(&Value::missing("host")));
}

#[test]
fn document_selector_sees_later_fields() {
    let doc = record(vec![
        field("a", select(root(), "b")),
        field("b", int(2)),
        field("c", select(root(), "nope")),
    ]);
    let value = eval(&doc);
    let fields = value.as_object().unwrap();
    assert_eq!(fields.get("a"), Some(&Value::int(2)));
    assert!(fields.get("c").unwrap().is_undefined());
}

#[test]
fn index_and_slice() {
    let items = array(vec![int(1), int(2), int(3)]);
    assert_eq!(eval(&index(items.clone(), int(1))), Value::int(2));
    assert_eq!(
        eval(&slice(items, Some(int(1)), None)).to_string(),
        "[2, 3]"
    );
    let err = Evaluator::new()
        .evaluate(&index(array(vec![]), int(0)))
        .unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::IndexOutOfBounds { .. }));
}

#[test]
fn and_or_short_circuit() {
    // the right side would fail if it were evaluated
    let failing = index(array(vec![]), int(0));
    assert_eq!(
        eval(&binary(BinaryOp::And, boolean(false), failing.clone())),
        Value::Bool(false)
    );
    assert_eq!(
        eval(&binary(BinaryOp::Or, boolean(true), failing)),
        Value::Bool(true)
    );
}

#[test]
fn operators_propagate_undefined() {
    let expr = binary(BinaryOp::Add, ident("missing"), int(1));
    assert!(eval(&expr).is_undefined());
}

#[test]
fn defaults_resolve_at_the_top() {
    assert_eq!(eval(&default(int(3))), Value::int(3));
    let typed = union(ident("string"), default(string("x")));
    assert_eq!(eval(&typed), Value::string("x"));
}

#[test]
fn defaults_stay_schemas_until_resolved() {
    let evaluator = Evaluator::new();
    let value = evaluate(&default(int(3)), evaluator.scope()).unwrap().unwrap();
    let schema = value.as_schema().unwrap();
    assert_eq!(schema.default_value(), Some(Value::int(3)));
    assert!(aml_value::merge(&value, &Value::int(4)).is_ok());
}

#[test]
fn schema_wrapper_makes_records_contracts() {
    let evaluator = Evaluator::new();
    let value = evaluator
        .evaluate(&schema(record(vec![field("a", ident("int"))])))
        .unwrap()
        .unwrap();
    assert_eq!(value.kind(), Kind::Schema);
    assert_eq!(value.target_kind(), Kind::Object);
}

#[test]
fn errors_collect_positions() {
    let failing = aml_ir::builder::at(&index(array(vec![]), int(0)), Position::new(3, 7));
    let doc = record(vec![field("a", failing)]);
    let err = Evaluator::new().evaluate(&doc).unwrap_err();
    assert_eq!(err.positions, vec![Position::new(3, 7)]);
}
