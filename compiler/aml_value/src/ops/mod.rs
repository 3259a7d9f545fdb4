//! The operator protocol.
//!
//! Every dispatch function checks for an undefined operand first and hands
//! it back unchanged. Operators a kind does not support fail with
//! "unsupported operation"; that failure is never retried.
//!
//! Operators applied to a schema build schemas instead of computing values:
//! comparisons add constraints (`int > 10`), `|` builds alternates and
//! `&`/`&&` unify.

mod access;
mod arith;
mod compare;

use aml_ir::{BinaryOp, UnaryOp};

pub use access::{default_of, index, keys, length, lookup, slice};
pub(crate) use compare::is_match;

use crate::errors::{integer_overflow, operand_kind_mismatch, unsupported_operation, EvalResult};
use crate::kind::Kind;
use crate::merge::merge;
use crate::schema::{Constraint, TypeSchema};
use crate::value::{Number, NumberRepr, Value};

/// Evaluate a binary operator over two already-evaluated operands.
///
/// `&&` and `||` are also available lazily through [`and`] and [`or`].
pub fn binary(left: &Value, op: BinaryOp, right: &Value) -> EvalResult {
    if left.is_undefined() {
        return Ok(left.clone());
    }
    if right.is_undefined() {
        return Ok(right.clone());
    }
    match op {
        BinaryOp::And => and(left, || Ok(right.clone())),
        BinaryOp::Or => or(left, || Ok(right.clone())),
        BinaryOp::Union => Ok(Value::schema(TypeSchema::or(
            &TypeSchema::from_value(left)?,
            &TypeSchema::from_value(right)?,
        ))),
        BinaryOp::Intersect => merge(left, right),
        _ if op.is_constraint()
            && (matches!(left, Value::Schema(_)) || matches!(right, Value::Schema(_))) =>
        {
            constrain(left, op, right)
        }
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => {
            arith::arithmetic(left, op, right)
        }
        BinaryOp::Eq => Ok(Value::Bool(left == right)),
        BinaryOp::NotEq => Ok(Value::Bool(left != right)),
        BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
            compare::ordering(left, op, right)
        }
        BinaryOp::Match | BinaryOp::NotMatch => compare::regex_match(left, op, right),
    }
}

/// Short-circuit `&&`: `right` is produced only when `left` does not decide.
pub fn and(left: &Value, right: impl FnOnce() -> EvalResult) -> EvalResult {
    match left {
        Value::Undefined(_) | Value::Bool(false) => Ok(left.clone()),
        Value::Bool(true) => expect_bool(BinaryOp::And, right()?),
        Value::Schema(_) => {
            let right = right()?;
            if right.is_undefined() {
                return Ok(right);
            }
            merge(left, &right)
        }
        other => Err(unsupported_operation(BinaryOp::And.as_symbol(), other.kind())),
    }
}

/// Short-circuit `||`: `right` is produced only when `left` does not decide.
pub fn or(left: &Value, right: impl FnOnce() -> EvalResult) -> EvalResult {
    match left {
        Value::Undefined(_) | Value::Bool(true) => Ok(left.clone()),
        Value::Bool(false) => expect_bool(BinaryOp::Or, right()?),
        Value::Schema(schema) => {
            let right = right()?;
            if right.is_undefined() {
                return Ok(right);
            }
            Ok(Value::schema(TypeSchema::or(
                schema,
                &TypeSchema::from_value(&right)?,
            )))
        }
        other => Err(unsupported_operation(BinaryOp::Or.as_symbol(), other.kind())),
    }
}

fn expect_bool(op: BinaryOp, value: Value) -> EvalResult {
    match value {
        Value::Bool(_) | Value::Undefined(_) => Ok(value),
        other => Err(operand_kind_mismatch(op, Kind::Bool, other.kind())),
    }
}

/// A comparison with a schema on one side becomes a constraint on that schema.
fn constrain(left: &Value, op: BinaryOp, right: &Value) -> EvalResult {
    match (left, right) {
        (Value::Schema(_), Value::Schema(_)) => {
            Err(unsupported_operation(op.as_symbol(), Kind::Schema))
        }
        (Value::Schema(schema), operand) => Ok(Value::schema(
            schema.with_constraint(Constraint::compare(op, operand.clone())),
        )),
        (operand, Value::Schema(schema)) => match op.flipped() {
            Some(flipped) => Ok(Value::schema(
                schema.with_constraint(Constraint::compare(flipped, operand.clone())),
            )),
            None => Err(unsupported_operation(op.as_symbol(), operand.kind())),
        },
        (l, _) => Err(unsupported_operation(op.as_symbol(), l.kind())),
    }
}

/// Evaluate a unary operator.
pub fn unary(op: UnaryOp, operand: &Value) -> EvalResult {
    match (op, operand) {
        (_, Value::Undefined(_)) => Ok(operand.clone()),
        (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (UnaryOp::Neg, Value::Number(n)) => {
            let negated = match n.repr()? {
                NumberRepr::Int(i) => NumberRepr::Int(
                    i.checked_neg()
                        .ok_or_else(|| integer_overflow("negation"))?,
                ),
                NumberRepr::Float(f) => NumberRepr::Float(-f),
            };
            Ok(Value::Number(Number::from_repr(negated)?))
        }
        (op, other) => Err(unsupported_operation(op.as_symbol(), other.kind())),
    }
}
