#![allow(
    clippy::unwrap_used,
    reason = "test code uses unwrap for concise assertions"
)]

use aml_ir::builder::{
    add, array, binary, boolean, computed, embed, field, for_list, for_merge, ident, if_then, int,
    record, select, string,
};
use aml_ir::BinaryOp;
use aml_value::{EvalErrorKind, ExecContext, Value};
use pretty_assertions::assert_eq;

use crate::Evaluator;

fn eval(expr: &aml_ir::Expr) -> Value {
    Evaluator::new().evaluate(expr).unwrap().unwrap()
}

fn pairs() -> aml_ir::ExprRef {
    record(vec![field("a", int(1)), field("b", int(2))])
}

#[test]
fn merge_form_unifies_emitted_objects() {
    let expr = for_merge(
        Some("k"),
        Some("v"),
        pairs(),
        record(vec![computed(ident("k"), add(ident("v"), int(1)))]),
    );
    assert_eq!(eval(&expr).to_string(), "{a: 2, b: 3}");
}

#[test]
fn merge_form_sees_earlier_iterations() {
    let expr = for_merge(
        Some("k"),
        Some("v"),
        pairs(),
        record(vec![computed(
            ident("k"),
            if_then(
                binary(BinaryOp::Eq, ident("k"), string("b")),
                add(ident("a"), ident("v")),
                Some(ident("v")),
            ),
        )]),
    );
    assert_eq!(eval(&expr).to_string(), "{a: 1, b: 3}");
}

#[test]
fn list_form_collects_values() {
    let expr = for_list(Some("i"), Some("v"), array(vec![int(10), int(20)]), ident("i"));
    assert_eq!(eval(&expr).to_string(), "[0, 1]");
}

#[test]
fn scalars_iterate_once() {
    let expr = for_list(Some("i"), Some("v"), string("x"), ident("v"));
    assert_eq!(eval(&expr).to_string(), "[\"x\"]");
}

#[test]
fn skip_and_break_sentinels() {
    let numbers = array(vec![int(1), int(2), int(3), int(4)]);
    let skip_two = for_list(
        None,
        Some("v"),
        numbers.clone(),
        if_then(
            binary(BinaryOp::Eq, ident("v"), int(2)),
            select(ident("std"), "skip"),
            Some(ident("v")),
        ),
    );
    assert_eq!(eval(&skip_two).to_string(), "[1, 3, 4]");

    let stop_at_three = for_list(
        None,
        Some("v"),
        numbers,
        if_then(
            binary(BinaryOp::Eq, ident("v"), int(3)),
            select(ident("std"), "break"),
            Some(ident("v")),
        ),
    );
    assert_eq!(eval(&stop_at_three).to_string(), "[1, 2]");
}

#[test]
fn absent_bodies_are_dropped() {
    let expr = for_list(
        None,
        Some("v"),
        array(vec![int(1), int(2)]),
        if_then(binary(BinaryOp::Gt, ident("v"), int(1)), ident("v"), None),
    );
    assert_eq!(eval(&expr).to_string(), "[2]");
}

#[test]
fn undefined_collection_propagates() {
    let expr = for_list(None, Some("v"), ident("missing"), ident("v"));
    assert!(eval(&expr).is_undefined());
}

#[test]
fn undefined_condition_propagates() {
    let expr = if_then(ident("missing"), int(1), Some(int(2)));
    assert!(eval(&expr).is_undefined());
}

#[test]
fn comprehension_in_record_position() {
    let doc = record(vec![
        field("name", string("web")),
        embed(if_then(boolean(true), record(vec![field("debug", boolean(true))]), None)),
        embed(if_then(boolean(false), record(vec![field("trace", boolean(true))]), None)),
    ]);
    assert_eq!(eval(&doc).to_string(), "{name: \"web\", debug: true}");
}

#[test]
fn cancelled_context_aborts_loops() {
    let context = ExecContext::new();
    let evaluator = Evaluator::builder().context(context.clone()).build();
    context.cancel();
    let expr = for_list(None, Some("v"), array(vec![int(1)]), ident("v"));
    let err = evaluator.evaluate(&expr).unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::ContextCancelled { .. }));
    assert_eq!(err.message(), "aborting loop");
}
