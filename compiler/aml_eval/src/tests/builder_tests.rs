#![allow(
    clippy::unwrap_used,
    reason = "test code uses unwrap for concise assertions"
)]

use aml_ir::builder::{
    add, args, array, call, default, documented, field, function, ident, int, lambda, profiles,
    record, root, select, string, structure, union,
};
use aml_value::{merge, CallArgument, EvalErrorKind, ExecContext, NativeValue, Value};
use pretty_assertions::assert_eq;

use crate::{init_tracing, Evaluator};

fn service_document() -> aml_ir::StructRef {
    structure(vec![
        args(record(vec![
            documented(
                field("replicas", union(ident("int"), default(int(1)))),
                &["Number of copies."],
            ),
            field("name", ident("string")),
        ])),
        profiles(record(vec![field(
            "prod",
            record(vec![field("replicas", int(3))]),
        )])),
        field("service", ident("name")),
        field("replicas", ident("replicas")),
    ])
}

fn named(entries: &[(&str, Value)]) -> CallArgument {
    CallArgument::named(Value::object_from(
        entries.iter().map(|(k, v)| (*k, v.clone())),
    ))
}

#[test]
fn documents_see_their_arguments_unscoped() {
    let evaluator = Evaluator::new();
    let value = evaluator
        .evaluate_document(
            &service_document(),
            vec![named(&[("name", Value::string("web"))])],
        )
        .unwrap();
    assert_eq!(value.to_string(), "{service: \"web\", replicas: 1}");
}

#[test]
fn documents_accept_profiles() {
    let evaluator = Evaluator::new();
    let value = evaluator
        .evaluate_document(
            &service_document(),
            vec![named(&[
                ("name", Value::string("web")),
                ("profiles", Value::array(vec![Value::string("prod")])),
            ])],
        )
        .unwrap();
    assert_eq!(value.to_string(), "{service: \"web\", replicas: 3}");
}

#[test]
fn documents_reject_bad_arguments() {
    let err = Evaluator::new()
        .evaluate_document(&service_document(), vec![])
        .unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::InvalidArguments { .. }));
    assert_eq!(
        err.message(),
        "invalid arguments: missing required key name in args"
    );
}

#[test]
fn describe_args_exports_the_argument_schema() {
    let evaluator = Evaluator::new();
    let description = evaluator
        .describe_args(&service_document())
        .unwrap()
        .unwrap();
    assert_eq!(description.path, "args");
    let replicas = &description.fields[0];
    assert_eq!(replicas.name, "replicas");
    assert_eq!(replicas.description, "Number of copies.");
    assert_eq!(replicas.field_type.default, Some(NativeValue::Int(1)));

    let json = serde_json::to_value(&description).unwrap();
    assert_eq!(json["fields"][1]["name"], "name");
    assert_eq!(json["fields"][1]["type"]["kind"], "string");

    let plain = structure(vec![field("a", int(1))]);
    assert!(evaluator.describe_args(&plain).unwrap().is_none());
}

#[test]
fn builtins_can_be_disabled() {
    let evaluator = Evaluator::builder().builtins(false).build();
    let value = evaluator.evaluate(&ident("int")).unwrap().unwrap();
    assert_eq!(value, Value::missing("int"));
}

#[test]
fn allow_new_keys_opens_record_schemas() {
    let closed = Evaluator::new();
    let open = Evaluator::builder().allow_new_keys(true).build();
    let schema = record(vec![field("a", ident("int"))]);
    let data = Value::object_from([("a", Value::int(1)), ("b", Value::int(2))]);

    let closed_schema = closed.evaluate_schema(&schema).unwrap();
    let err = merge(&closed_schema, &data).unwrap_err();
    assert_eq!(err.message(), "unknown field b");

    let open_schema = open.evaluate_schema(&schema).unwrap();
    assert_eq!(merge(&open_schema, &data).unwrap(), data);
}

#[test]
fn schemas_keep_resolving_dollar_against_their_own_document() {
    let evaluator = Evaluator::new();
    let schema = evaluator
        .evaluate_schema(&record(vec![
            field("name", ident("string")),
            field("label", select(root(), "name")),
        ]))
        .unwrap();
    let data = Value::object_from([("name", Value::string("one"))]);
    let before = merge(&schema, &data).unwrap_err();
    assert!(before.message().contains("label"), "{before}");

    evaluator
        .evaluate(&record(vec![field("name", string("two"))]))
        .unwrap();
    let after = merge(&schema, &data).unwrap_err();
    assert_eq!(after.message(), before.message());
}

#[test]
fn functions_outlive_their_evaluator() {
    let value = Evaluator::new()
        .evaluate(&record(vec![
            field("base", int(40)),
            field("plus_base", lambda(&["x"], add(ident("x"), ident("base")))),
        ]))
        .unwrap()
        .unwrap();
    let plus_base = value.as_object().unwrap().get("plus_base").unwrap().clone();
    drop(value);
    let out = aml_value::call(
        &plus_base,
        &ExecContext::new(),
        vec![CallArgument::positional(Value::int(2))],
    )
    .unwrap();
    assert_eq!(out, Some(Value::int(42)));
}

#[test]
fn cancelled_context_stops_calls() {
    let context = ExecContext::new();
    let evaluator = Evaluator::builder().context(context.clone()).build();
    let doc = record(vec![
        field("f", function(vec![field("return", int(1))])),
        field("out", call(ident("f"), vec![])),
    ]);
    assert!(evaluator.evaluate(&doc).is_ok());

    context.cancel();
    let err = evaluator.evaluate(&doc).unwrap_err();
    assert_eq!(err.message(), "context is closed");
}

#[test]
fn evaluate_resolves_defaults_but_keeps_schemas() {
    let evaluator = Evaluator::new();
    let value = evaluator
        .evaluate(&record(vec![
            field("port", union(ident("int"), default(int(80)))),
            field("kind", ident("string")),
            field("tags", array(vec![default(string("a"))])),
        ]))
        .unwrap()
        .unwrap();
    let fields = value.as_object().unwrap();
    assert_eq!(fields.get("port"), Some(&Value::int(80)));
    assert!(fields.get("kind").unwrap().as_schema().is_some());
    assert_eq!(fields.get("tags").unwrap().to_string(), "[\"a\"]");
}

#[test]
fn init_tracing_is_idempotent() {
    init_tracing();
    init_tracing();
}
