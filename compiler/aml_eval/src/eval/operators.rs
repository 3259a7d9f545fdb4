//! Operator and access nodes.

use aml_ir::{BinaryOp, Expr, ExprKind};
use aml_value::{ops, EvalResult, TypeSchema, Value};

use super::evaluate_value;
use crate::scope::{LookupSource, Scope, ScopeOptions};

/// `base.key`. `$.key` resolves a single key of the document lazily.
pub(super) fn select(base: &Expr, key: &str, scope: &Scope) -> EvalResult<Value> {
    if matches!(&base.kind, ExprKind::Ident(name) if name == "$") {
        return scope.document_get(key);
    }
    let base = evaluate_value(base, scope)?;
    Ok(ops::lookup(&base, key)?.unwrap_or_else(|| Value::missing(key)))
}

/// Binary operators; `&&` and `||` only evaluate the right side when needed.
pub(super) fn binary(op: BinaryOp, left: &Expr, right: &Expr, scope: &Scope) -> EvalResult<Value> {
    let left = evaluate_value(left, scope)?;
    match op {
        BinaryOp::And => ops::and(&left, || evaluate_value(right, scope)),
        BinaryOp::Or => ops::or(&left, || evaluate_value(right, scope)),
        _ => {
            let right = evaluate_value(right, scope)?;
            ops::binary(&left, op, &right)
        }
    }
}

/// `*value`: a schema of the value's kind defaulting to it.
///
/// The value itself is evaluated as data. In default mode the marker is
/// transparent.
pub(super) fn default(inner: &Expr, scope: &Scope) -> EvalResult<Value> {
    let frame = scope.push(LookupSource::Empty, ScopeOptions::new().default_mode(true))?;
    let value = evaluate_value(inner, &frame)?;
    if value.is_undefined() || value.as_schema().is_some() || scope.is_default_mode() {
        return Ok(value);
    }
    let kind = value.kind();
    Ok(Value::schema(TypeSchema::new(kind).with_default(value)))
}
