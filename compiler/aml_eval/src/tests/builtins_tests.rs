#![allow(
    clippy::unwrap_used,
    reason = "test code uses unwrap for concise assertions"
)]

use aml_ir::builder::{binary, ident, int, number, string};
use aml_ir::BinaryOp;
use aml_value::{merge, EvalErrorKind, Kind, Value};

use crate::builtins::builtins;
use crate::Evaluator;

fn builtin(name: &str) -> Value {
    builtins().remove(name).unwrap()
}

#[test]
fn core_type_schemas_check_their_kind() {
    for (name, ok, bad) in [
        ("string", Value::string("x"), Value::int(1)),
        ("number", Value::number("1.5").unwrap(), Value::Bool(true)),
        ("float", Value::number("1.5").unwrap(), Value::Null),
        ("int", Value::int(3), Value::number("1.5").unwrap()),
        ("bool", Value::Bool(false), Value::string("false")),
        ("array", Value::array(vec![Value::int(1)]), Value::int(1)),
    ] {
        let schema = builtin(name);
        assert!(merge(&schema, &ok).is_ok(), "{name} rejected {ok}");
        assert!(merge(&schema, &bad).is_err(), "{name} accepted {bad}");
    }
}

#[test]
fn any_accepts_everything() {
    let any = builtin("any");
    for value in [Value::Null, Value::int(1), Value::empty_object()] {
        assert_eq!(merge(&any, &value).unwrap(), value);
    }
}

#[test]
fn object_is_open() {
    let object = builtin("object");
    let value = Value::object_from([("anything", Value::int(1))]);
    assert_eq!(merge(&object, &value).unwrap(), value);
    let err = merge(&object, &Value::int(1)).unwrap_err();
    assert!(matches!(
        err.kind,
        EvalErrorKind::TypeMismatch { expected: Kind::Object, .. }
    ));
}

#[test]
fn std_exposes_loop_sentinels() {
    let std = builtin("std");
    let fields = std.as_object().unwrap();
    assert!(fields.get("skip").unwrap().is_skip());
    assert!(fields.get("break").unwrap().is_break());
}

#[test]
fn constraints_on_builtins() {
    let evaluator = Evaluator::new();
    let port = evaluator
        .evaluate_schema(&binary(BinaryOp::LtEq, ident("int"), int(65535)))
        .unwrap();
    assert!(merge(&port, &Value::int(80)).is_ok());
    let err = merge(&port, &Value::int(70000)).unwrap_err();
    assert_eq!(err.message(), "70000 does not satisfy <= 65535");

    let named = evaluator
        .evaluate_schema(&binary(BinaryOp::Match, ident("string"), string("^[a-z]+$")))
        .unwrap();
    assert!(merge(&named, &Value::string("web")).is_ok());
    assert!(merge(&named, &Value::string("Web")).is_err());
}

#[test]
fn suffixed_numbers_compare_numerically() {
    let value = Evaluator::new()
        .evaluate(&binary(BinaryOp::Eq, number("2Ki"), int(2048)))
        .unwrap()
        .unwrap();
    assert_eq!(value, Value::Bool(true));
}
