//! Property-based tests for record evaluation.
//!
//! Generates small expression trees and checks that
//! 1. records with disjoint keys embed into each other in either order, and
//! 2. an undefined operand anywhere in an operator chain yields undefined.

#![allow(clippy::unwrap_used, reason = "Tests can panic")]
#![allow(
    clippy::redundant_closure_for_method_calls,
    reason = "Proptest macros generate code with these patterns"
)]

use aml_eval::Evaluator;
use aml_ir::builder::{binary, boolean, embed, field, ident, int, record, string};
use aml_ir::{BinaryOp, ExprRef, Field};
use proptest::prelude::*;

const OPERATORS: [BinaryOp; 12] = [
    BinaryOp::Add,
    BinaryOp::Sub,
    BinaryOp::Mul,
    BinaryOp::Div,
    BinaryOp::Eq,
    BinaryOp::NotEq,
    BinaryOp::Lt,
    BinaryOp::LtEq,
    BinaryOp::Gt,
    BinaryOp::GtEq,
    BinaryOp::Match,
    BinaryOp::Intersect,
];

fn literal() -> impl Strategy<Value = ExprRef> {
    prop_oneof![
        any::<i32>().prop_map(|n| int(i64::from(n))),
        any::<bool>().prop_map(boolean),
        "[a-z]{0,6}".prop_map(string),
    ]
}

fn fields(keys: &'static str) -> impl Strategy<Value = Vec<Field>> {
    prop::collection::btree_map(keys, literal(), 0..5).prop_map(|entries| {
        entries
            .into_iter()
            .map(|(key, value)| field(key, value))
            .collect()
    })
}

proptest! {
    #[test]
    fn disjoint_records_embed_in_either_order(
        left in fields("[a-m]{1,3}"),
        right in fields("[n-z]{1,3}"),
    ) {
        let evaluator = Evaluator::new();
        let forward = record(vec![embed(record(left.clone())), embed(record(right.clone()))]);
        let backward = record(vec![embed(record(right)), embed(record(left))]);
        let forward = evaluator.evaluate(&forward).unwrap().unwrap();
        let backward = evaluator.evaluate(&backward).unwrap().unwrap();
        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn undefined_operands_yield_undefined(
        ops in prop::collection::vec(prop::sample::select(OPERATORS.to_vec()), 1..4),
        operand in literal(),
        undefined_first in any::<bool>(),
    ) {
        let mut expr = if undefined_first { ident("missing") } else { operand.clone() };
        for (i, op) in ops.iter().enumerate() {
            let right = if i == 0 && !undefined_first { ident("missing") } else { operand.clone() };
            expr = binary(*op, expr, right);
        }
        let value = Evaluator::new().evaluate(&expr).unwrap().unwrap();
        prop_assert!(value.is_undefined(), "got {}", value);
    }
}
