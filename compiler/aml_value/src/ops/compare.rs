//! Ordering comparisons and regular-expression matching.

use std::cmp::Ordering;

use aml_ir::BinaryOp;
use regex::Regex;

use crate::errors::{invalid_regex, operand_kind_mismatch, unsupported_operation, EvalResult};
use crate::value::Value;

pub(super) fn ordering(left: &Value, op: BinaryOp, right: &Value) -> EvalResult {
    let ordering = match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.compare(b)?,
        (Value::String(a), Value::String(b)) => Some((**a).cmp(&**b)),
        (l, r) if l.kind() != r.kind() => {
            return Err(operand_kind_mismatch(op, l.kind(), r.kind()))
        }
        (l, _) => return Err(unsupported_operation(op.as_symbol(), l.kind())),
    };
    let holds = ordering.is_some_and(|o| match op {
        BinaryOp::Lt => o == Ordering::Less,
        BinaryOp::LtEq => o != Ordering::Greater,
        BinaryOp::Gt => o == Ordering::Greater,
        BinaryOp::GtEq => o != Ordering::Less,
        _ => false,
    });
    Ok(Value::Bool(holds))
}

/// `text =~ pattern` / `text !~ pattern`.
pub(super) fn regex_match(left: &Value, op: BinaryOp, right: &Value) -> EvalResult {
    match (left, right) {
        (Value::String(text), Value::String(pattern)) => {
            let matched = is_match(pattern, text)?;
            Ok(Value::Bool(matched == (op == BinaryOp::Match)))
        }
        (Value::String(_), r) => Err(operand_kind_mismatch(op, crate::Kind::String, r.kind())),
        (l, _) => Err(unsupported_operation(op.as_symbol(), l.kind())),
    }
}

pub(crate) fn is_match(pattern: &str, text: &str) -> EvalResult<bool> {
    let regex = Regex::new(pattern).map_err(|e| invalid_regex(pattern, e.to_string()))?;
    Ok(regex.is_match(text))
}
