#![allow(
    clippy::unwrap_used,
    reason = "test code uses unwrap for concise assertions"
)]

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;
use crate::errors::EvalErrorKind;
use crate::schema::TypeSchema;

#[test]
fn objects_union_keys() {
    let left = Value::object_from([("a", Value::int(1))]);
    let right = Value::object_from([("b", Value::int(2)), ("a", Value::int(1))]);
    let merged = merge(&left, &right).unwrap();
    assert_eq!(
        merged.as_object().unwrap().keys().collect::<Vec<_>>(),
        vec!["a", "b"]
    );
}

#[test]
fn conflicting_scalars_name_the_key() {
    let left = Value::object_from([("a", Value::int(1)), ("b", Value::Bool(true))]);
    let right = Value::object_from([("a", Value::int(2)), ("b", Value::string("x"))]);
    let err = merge(&left, &right).unwrap_err();
    let EvalErrorKind::Multiple(errors) = &err.kind else {
        panic!("expected both keys to fail, got {err}");
    };
    assert_eq!(errors.len(), 2);
    assert_eq!(
        errors[0].to_string(),
        "invalid value for a: conflicting values 1 and 2"
    );
}

#[test]
fn undefined_wins() {
    let merged = merge(&Value::int(1), &Value::missing("x")).unwrap();
    assert!(merged.is_undefined());
    let merged = merge(&Value::circular("y"), &Value::int(1)).unwrap();
    assert_eq!(format!("{merged:?}"), "undefined(circular reference to y)");
}

#[test]
fn arrays_concatenate() {
    let merged = merge(
        &Value::array(vec![Value::int(1)]),
        &Value::array(vec![Value::int(2)]),
    )
    .unwrap();
    assert_eq!(merged, Value::array(vec![Value::int(1), Value::int(2)]));
}

#[test]
fn schema_checks_data_from_either_side() {
    let int = Value::schema(TypeSchema::int());
    assert_eq!(merge(&int, &Value::int(3)).unwrap(), Value::int(3));
    assert_eq!(merge(&Value::int(3), &int).unwrap(), Value::int(3));
    assert!(merge(&int, &Value::number("1.5").unwrap()).is_err());
}

#[test]
fn kind_mismatch() {
    let err = merge(&Value::int(1), &Value::empty_object()).unwrap_err();
    assert_eq!(err.to_string(), "can not merge number with object");
}

#[test]
fn overlay_replaces_leaves_and_keeps_siblings() {
    let base = Value::object_from([
        ("replicas", Value::int(3)),
        (
            "image",
            Value::object_from([("name", Value::string("nginx")), ("tag", Value::string("1"))]),
        ),
    ]);
    let top = Value::object_from([
        ("replicas", Value::int(5)),
        ("image", Value::object_from([("tag", Value::string("2"))])),
    ]);
    let layered = overlay(&base, &top);
    assert_eq!(
        layered,
        Value::object_from([
            ("replicas", Value::int(5)),
            (
                "image",
                Value::object_from([("name", Value::string("nginx")), ("tag", Value::string("2"))]),
            ),
        ])
    );
}

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|n| Value::int(i64::from(n))),
        "[a-z]{0,6}".prop_map(Value::string),
    ]
}

proptest! {
    #[test]
    fn disjoint_objects_merge_in_either_order(
        left in prop::collection::btree_map("[a-m]{1,3}", scalar(), 0..6),
        right in prop::collection::btree_map("[n-z]{1,3}", scalar(), 0..6),
    ) {
        let l = Value::object_from(left);
        let r = Value::object_from(right);
        prop_assert_eq!(merge(&l, &r).unwrap(), merge(&r, &l).unwrap());
    }

    #[test]
    fn merge_with_self_is_identity(value in scalar()) {
        prop_assert_eq!(merge(&value, &value).unwrap(), value);
    }
}
