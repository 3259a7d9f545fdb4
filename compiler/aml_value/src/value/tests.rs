#![allow(
    clippy::unwrap_used,
    reason = "test code uses unwrap for concise assertions"
)]

use pretty_assertions::assert_eq;

use super::*;
use crate::schema::{StaticContract, TypeSchema};

#[test]
fn kinds() {
    assert_eq!(Value::Null.kind(), Kind::Null);
    assert_eq!(Value::int(1).kind(), Kind::Number);
    assert_eq!(Value::string("a").kind(), Kind::String);
    assert_eq!(Value::skip().kind(), Kind::Undefined);
    assert_eq!(Value::break_loop().kind(), Kind::Undefined);
    assert_eq!(Value::schema(TypeSchema::int()).kind(), Kind::Schema);
    assert_eq!(Value::schema(TypeSchema::int()).target_kind(), Kind::Number);
}

#[test]
fn numbers_compare_numerically() {
    assert_eq!(Value::number("2Ki").unwrap(), Value::int(2048));
    assert_eq!(Value::number("1.0").unwrap(), Value::int(1));
    assert_ne!(Value::int(1), Value::string("1"));
}

#[test]
fn objects_compare_structurally_ignoring_order() {
    let a = Value::object_from([("x", Value::int(1)), ("y", Value::Bool(true))]);
    let b = Value::object_from([("y", Value::Bool(true)), ("x", Value::int(1))]);
    assert_eq!(a, b);
}

#[test]
fn display_is_compact() {
    let value = Value::object_from([
        ("name", Value::string("web")),
        ("ports", Value::array(vec![Value::int(80), Value::int(443)])),
    ]);
    assert_eq!(value.to_string(), r#"{name: "web", ports: [80, 443]}"#);
}

#[test]
fn truthiness() {
    assert!(Value::Bool(true).is_truthy());
    assert!(!Value::Null.is_truthy());
    assert!(!Value::int(0).is_truthy());
    assert!(Value::string("x").is_truthy());
    assert!(!Value::array(Vec::new()).is_truthy());
    assert!(!Value::missing("a").is_truthy());
}

#[test]
fn contains_undefined_looks_inside() {
    let nested = Value::object_from([("a", Value::array(vec![Value::circular("b")]))]);
    assert!(nested.contains_undefined());
    assert!(!Value::object_from([("a", Value::int(1))]).contains_undefined());
}

#[test]
fn native_conversion() {
    let value = Value::object_from([
        ("replicas", Value::number("2Ki").unwrap()),
        ("ratio", Value::number("0.5").unwrap()),
        ("tags", Value::array(vec![Value::string("a"), Value::Null])),
    ]);
    assert_eq!(
        value.to_native().unwrap().to_json().unwrap(),
        r#"{"replicas":2048,"ratio":0.5,"tags":["a",null]}"#
    );
}

#[test]
fn native_conversion_of_undefined_explains_itself() {
    let err = Value::missing("port").to_native().unwrap_err();
    assert_eq!(
        err.to_string(),
        "value is undefined (missing key port), caused by missing key or circular reference"
    );
}

#[test]
fn schema_converts_through_default() {
    let schema = Value::schema(TypeSchema::int().with_default(Value::int(3)));
    assert_eq!(schema.to_native().unwrap(), NativeValue::Int(3));
    assert!(Value::schema(TypeSchema::int()).to_native().is_err());
}

#[test]
fn schema_values_display_as_their_schema() {
    let schema = TypeSchema::int().with_default(Value::int(3));
    assert_eq!(Value::schema(schema.clone()).to_string(), schema.to_string());
}

#[test]
fn container_schemas_convert_to_completed_containers() {
    let replicas = Value::schema(TypeSchema::int().with_default(Value::int(1)));
    let object = Value::schema(TypeSchema::object(
        StaticContract::new("deploy").field("replicas", replicas).build(),
    ));
    assert_eq!(object.to_native().unwrap().to_json().unwrap(), r#"{"replicas":1}"#);

    let list = Value::schema(TypeSchema::array(vec![Value::schema(TypeSchema::int())]));
    assert_eq!(list.to_native().unwrap(), NativeValue::Array(Vec::new()));
}

#[test]
fn resolve_defaults_replaces_nested_schemas() {
    let value = Value::object_from([
        ("a", Value::schema(TypeSchema::int().with_default(Value::int(1)))),
        ("b", Value::array(vec![Value::schema(TypeSchema::int())])),
    ]);
    let resolved = value.resolve_defaults().unwrap();
    assert_eq!(resolved.as_object().unwrap()["a"], Value::int(1));
    assert!(matches!(resolved.as_object().unwrap()["b"].as_array().unwrap()[0], Value::Schema(_)));
}

#[test]
fn interpolation_text() {
    assert_eq!(Value::number("2k").unwrap().to_text().unwrap(), "2000");
    assert_eq!(Value::string("x").to_text().unwrap(), "x");
    assert_eq!(
        Value::array(vec![Value::int(1)]).to_text().unwrap(),
        "[1]"
    );
}
