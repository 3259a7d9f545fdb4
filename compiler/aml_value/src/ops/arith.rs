//! Arithmetic: numbers, string and array concatenation.

use aml_ir::BinaryOp;

use crate::errors::{
    division_by_zero, integer_overflow, operand_kind_mismatch, unsupported_operation, EvalResult,
};
use crate::value::{Number, NumberRepr, Value};

pub(super) fn arithmetic(left: &Value, op: BinaryOp, right: &Value) -> EvalResult {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => number_op(a, op, b),
        (Value::String(a), Value::String(b)) if op == BinaryOp::Add => {
            Ok(Value::string(format!("{}{}", &**a, &**b)))
        }
        (Value::Array(a), Value::Array(b)) if op == BinaryOp::Add => {
            Ok(Value::array(a.iter().chain(b.iter()).cloned().collect()))
        }
        (l, r) if l.kind() != r.kind() => Err(operand_kind_mismatch(op, l.kind(), r.kind())),
        (l, _) => Err(unsupported_operation(op.as_symbol(), l.kind())),
    }
}

fn number_op(a: &Number, op: BinaryOp, b: &Number) -> EvalResult {
    let repr = match (a.repr()?, b.repr()?) {
        (NumberRepr::Int(x), NumberRepr::Int(y)) => int_op(x, op, y)?,
        (x, y) => float_op(x.as_f64(), op, y.as_f64())?,
    };
    Ok(Value::Number(Number::from_repr(repr)?))
}

/// Exact division stays integral; anything else falls back to float.
#[allow(clippy::cast_precision_loss, reason = "inexact division yields a float")]
fn int_op(x: i64, op: BinaryOp, y: i64) -> EvalResult<NumberRepr> {
    let checked = match op {
        BinaryOp::Add => x.checked_add(y),
        BinaryOp::Sub => x.checked_sub(y),
        BinaryOp::Mul => x.checked_mul(y),
        BinaryOp::Div => {
            if y == 0 {
                return Err(division_by_zero());
            }
            if x.checked_rem(y) != Some(0) {
                return Ok(NumberRepr::Float(x as f64 / y as f64));
            }
            x.checked_div(y)
        }
        _ => return Err(unsupported_operation(op.as_symbol(), crate::Kind::Number)),
    };
    checked
        .map(NumberRepr::Int)
        .ok_or_else(|| integer_overflow(op.as_symbol()))
}

fn float_op(x: f64, op: BinaryOp, y: f64) -> EvalResult<NumberRepr> {
    Ok(NumberRepr::Float(match op {
        BinaryOp::Add => x + y,
        BinaryOp::Sub => x - y,
        BinaryOp::Mul => x * y,
        BinaryOp::Div => {
            if y == 0.0 {
                return Err(division_by_zero());
            }
            x / y
        }
        _ => return Err(unsupported_operation(op.as_symbol(), crate::Kind::Number)),
    }))
}
