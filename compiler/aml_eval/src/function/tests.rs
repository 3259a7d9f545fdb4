#![allow(
    clippy::unwrap_used,
    reason = "test code uses unwrap for concise assertions"
)]

use std::sync::atomic::Ordering;

use aml_ir::builder::{
    add, arg, args, binary, call, default, field, function, function_def, ident, if_then, int,
    lambda, named, path, profiles, record, string, structure, union,
};
use aml_ir::{BinaryOp, FunctionDef};
use aml_value::EvalErrorKind;
use pretty_assertions::assert_eq;

use super::*;
use crate::Evaluator;

/// `add: function { args: {a: int, b: int | *10}, return: args.a + args.b }`
fn adder() -> aml_ir::ExprRef {
    function(vec![
        args(record(vec![
            field("a", ident("int")),
            field("b", union(ident("int"), default(int(10)))),
        ])),
        field("return", add(path("args.a"), path("args.b"))),
    ])
}

fn run(calls: aml_ir::ExprRef) -> EvalResult<Value> {
    let doc = record(vec![field("add", adder()), field("out", calls)]);
    let value = Evaluator::new().evaluate(&doc)?.unwrap();
    Ok(value.as_object().unwrap().get("out").unwrap().clone())
}

#[test]
fn positional_arguments_bind_in_declaration_order() {
    let out = run(call(ident("add"), vec![arg(int(1)), arg(int(2))])).unwrap();
    assert_eq!(out, Value::int(3));
}

#[test]
fn named_arguments_and_defaults() {
    let out = run(call(ident("add"), vec![named("a", int(5))])).unwrap();
    assert_eq!(out, Value::int(15));
}

#[test]
fn too_many_positional_arguments() {
    let err = run(call(ident("add"), vec![arg(int(1)), arg(int(2)), arg(int(3))])).unwrap_err();
    assert!(
        matches!(err.kind, EvalErrorKind::TooManyArguments { expected: 2, got: 3 }),
        "{err}"
    );
}

#[test]
fn bad_arguments_are_invalid_arguments() {
    let err = run(call(ident("add"), vec![named("a", string("one"))])).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::InvalidArguments { .. }), "{err}");

    let err = run(call(ident("add"), vec![named("c", int(1))])).unwrap_err();
    assert!(err.to_string().contains("unknown field c in args"), "{err}");
}

#[test]
fn return_type_is_checked() {
    let def = FunctionDef {
        return_type: Some(ident("string")),
        ..FunctionDef::new(structure(vec![field("return", int(1))]))
    };
    let err = run(call(function_def(def), vec![])).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::InvalidReturnValue { .. }), "{err}");
}

#[test]
fn missing_return_is_absent() {
    let f = function(vec![field("value", int(1))]);
    let doc = record(vec![field("out", call(f, vec![]))]);
    let value = Evaluator::new().evaluate(&doc).unwrap().unwrap();
    assert_eq!(value, Value::empty_object());
}

#[test]
fn methods_receive_self() {
    let doc = record(vec![
        field(
            "counter",
            record(vec![
                field("start", int(40)),
                field(
                    "next",
                    function(vec![field("return", add(path("self.start"), int(2)))]),
                ),
            ]),
        ),
        field("out", call(path("counter.next"), vec![])),
    ]);
    let value = Evaluator::new().evaluate(&doc).unwrap().unwrap();
    assert_eq!(value.as_object().unwrap().get("out"), Some(&Value::int(42)));
}

#[test]
fn profiles_layer_beneath_explicit_arguments() {
    let deploy = function(vec![
        args(record(vec![
            field("replicas", union(ident("int"), default(int(1)))),
            field("region", union(ident("string"), default(string("eu")))),
        ])),
        profiles(record(vec![
            field("prod", record(vec![field("replicas", int(3))])),
            field("us", record(vec![field("region", string("us")), field("replicas", int(4))])),
        ])),
        field("return", ident("args")),
    ]);
    let doc = |call_args| {
        record(vec![
            field("deploy", deploy.clone()),
            field("out", call(ident("deploy"), call_args)),
        ])
    };
    let out = |call_args| {
        let value = Evaluator::new().evaluate(&doc(call_args)).unwrap().unwrap();
        value.as_object().unwrap().get("out").unwrap().to_string()
    };
    let names = |names: &[&str]| {
        aml_ir::builder::array(names.iter().map(|n| string(*n)).collect())
    };

    assert_eq!(out(vec![]), "{replicas: 1, region: \"eu\"}");
    assert_eq!(
        out(vec![named("profiles", names(&["prod"]))]),
        "{region: \"eu\", replicas: 3}"
    );
    assert_eq!(
        out(vec![named("profiles", names(&["prod", "us"]))]),
        "{replicas: 4, region: \"us\"}"
    );
    assert_eq!(
        out(vec![named("profiles", names(&["prod", "staging?"])), named("replicas", int(5))]),
        "{region: \"eu\", replicas: 5}"
    );

    let err = Evaluator::new()
        .evaluate(&doc(vec![named("profiles", names(&["staging"]))]))
        .unwrap_err();
    assert!(err.to_string().contains("profile not found: staging"), "{err}");
}

#[test]
fn functions_close_over_their_definition() {
    let doc = record(vec![
        field("base", int(100)),
        field("f", function(vec![field("return", ident("base"))])),
        field(
            "inner",
            record(vec![
                field("base", int(1)),
                field("out", call(ident("f"), vec![])),
            ]),
        ),
    ]);
    let value = Evaluator::new().evaluate(&doc).unwrap().unwrap();
    assert_eq!(
        value.as_object().unwrap().get("inner").unwrap().to_string(),
        "{base: 1, out: 100}"
    );
}

#[test]
fn lambdas_bind_parameters() {
    let doc = record(vec![
        field("double", lambda(&["x"], add(ident("x"), ident("x")))),
        field("out", call(ident("double"), vec![arg(int(21))])),
        field("unbound", call(ident("double"), vec![])),
    ]);
    let value = Evaluator::new().evaluate(&doc).unwrap().unwrap();
    let fields = value.as_object().unwrap();
    assert_eq!(fields.get("out"), Some(&Value::int(42)));
    assert!(fields.get("unbound").unwrap().is_undefined());
}

#[test]
fn calling_a_non_function_fails() {
    let out = run(call(ident("nothing"), vec![])).unwrap();
    assert!(out.is_undefined());
    let err = run(call(int(1), vec![])).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::NotCallable { .. }), "{err}");
}

#[test]
fn unbounded_recursion_hits_the_call_depth() {
    let doc = record(vec![
        field("f", function(vec![field("return", call(ident("f"), vec![]))])),
        field("out", call(ident("f"), vec![])),
    ]);
    let err = Evaluator::new().evaluate(&doc).unwrap_err();
    assert!(
        matches!(err.kind, EvalErrorKind::MaxCallDepthExceeded { limit: 100 }),
        "{err}"
    );
}

/// `r: {f: lambda n: if n < limit then r.f(n + 1) else n, u: missing}`
///
/// `u` keeps `r` from being cached, so every `r.f` is a fresh closure.
fn recreated_recursion(limit: i64) -> aml_ir::ExprRef {
    let step = call(path("r.f"), vec![arg(add(ident("n"), int(1)))]);
    let body = if_then(binary(BinaryOp::Lt, ident("n"), int(limit)), step, Some(ident("n")));
    record(vec![
        field(
            "r",
            record(vec![
                field("f", lambda(&["n"], body)),
                field("u", ident("missing")),
            ]),
        ),
        field("out", call(path("r.f"), vec![arg(int(0))])),
    ])
}

#[test]
fn recreated_closures_share_the_call_depth() {
    let err = Evaluator::new()
        .evaluate(&recreated_recursion(500))
        .unwrap_err();
    assert!(
        matches!(err.kind, EvalErrorKind::MaxCallDepthExceeded { limit: 100 }),
        "{err}"
    );
}

#[test]
fn call_depth_unwinds_after_each_evaluation() {
    let evaluator = Evaluator::new();
    for _ in 0..3 {
        let value = evaluator.evaluate(&recreated_recursion(50)).unwrap().unwrap();
        assert_eq!(value.as_object().unwrap().get("out"), Some(&Value::int(50)));
        assert_eq!(evaluator.context().call_depth().load(Ordering::SeqCst), 0);
    }
}

#[test]
fn call_depth_guard_releases_on_drop() {
    let context = ExecContext::new();
    let depth = context.call_depth();
    {
        let _outer = guard::CallDepthGuard::enter(depth).unwrap();
        assert_eq!(depth.load(Ordering::SeqCst), 1);
    }
    assert_eq!(depth.load(Ordering::SeqCst), 0);

    depth.store(crate::MAX_CALL_DEPTH, Ordering::SeqCst);
    assert!(guard::CallDepthGuard::enter(depth).is_err());
    assert_eq!(depth.load(Ordering::SeqCst), crate::MAX_CALL_DEPTH);
    assert_eq!(context.fork().call_depth().load(Ordering::SeqCst), 0);
}
