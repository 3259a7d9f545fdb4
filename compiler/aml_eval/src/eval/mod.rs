//! Expression evaluation.
//!
//! [`evaluate`] maps one node to a value in a scope. `Ok(None)` is an
//! absent value (an `if` without `else` whose condition is false, a call
//! whose body was not ok); it is distinct from undefined, which is a value.
//!
//! Records, comprehensions and calls live in their own modules; this module
//! dispatches and handles literals, names and access.

mod call;
mod operators;

use aml_ir::{Expr, ExprKind, ExprRef, InterpolationPart};
use aml_stack::ensure_sufficient_stack;
use aml_value::{ops, EvalResult, TypeSchema, Value};

use crate::comprehension::{evaluate_for, evaluate_if};
use crate::record::evaluate_record;
use crate::scope::{LookupSource, Scope, ScopeOptions};

/// Evaluate an expression in `scope`.
pub fn evaluate(expr: &Expr, scope: &Scope) -> EvalResult<Option<Value>> {
    ensure_sufficient_stack(|| evaluate_inner(expr, scope)).map_err(|e| e.at(&expr.pos))
}

/// Evaluate an expression as a type description.
///
/// Records become contracts and arrays become array schemas, however deep.
pub fn evaluate_schema(expr: &Expr, scope: &Scope) -> EvalResult<Value> {
    evaluate_schema_at(expr, scope, None)
}

fn evaluate_schema_at(expr: &Expr, scope: &Scope, segment: Option<&str>) -> EvalResult<Value> {
    let mut options = ScopeOptions::new().schema(true).default_mode(false);
    if let Some(segment) = segment {
        options = options.path(segment);
    }
    let frame = scope.push(LookupSource::Empty, options)?;
    evaluate_value(expr, &frame)
}

/// Like [`evaluate`], but an absent value is undefined.
pub(crate) fn evaluate_value(expr: &Expr, scope: &Scope) -> EvalResult<Value> {
    Ok(evaluate(expr, scope)?.unwrap_or_else(|| Value::unresolved("empty expression")))
}

/// Evaluate the value of the field `key`, naming nested records after it.
pub(crate) fn evaluate_field(expr: &Expr, scope: &Scope, key: &str) -> EvalResult<Option<Value>> {
    match &expr.kind {
        ExprKind::Record(record) => evaluate_record(record, scope, Some(key))
            .map(Some)
            .map_err(|e| e.at(&expr.pos)),
        ExprKind::Schema(inner) => evaluate_schema_at(inner, scope, Some(key))
            .map(Some)
            .map_err(|e| e.at(&expr.pos)),
        _ => evaluate(expr, scope),
    }
}

fn evaluate_inner(expr: &Expr, scope: &Scope) -> EvalResult<Option<Value>> {
    let value = match &expr.kind {
        ExprKind::Null => Value::Null,
        ExprKind::Bool(b) => Value::Bool(*b),
        ExprKind::Number(literal) => Value::number(literal)?,
        ExprKind::String(s) => Value::string(s),
        ExprKind::Interpolation(parts) => interpolate(parts, scope)?,
        ExprKind::Array(items) => evaluate_array(items, scope)?,
        ExprKind::Record(record) => evaluate_record(record, scope, None)?,

        ExprKind::Ident(name) => scope
            .get(name)?
            .unwrap_or_else(|| Value::missing(name)),
        ExprKind::Selector { base, key } => operators::select(base, key, scope)?,
        ExprKind::Index { base, index } => {
            let base = evaluate_value(base, scope)?;
            let index = evaluate_value(index, scope)?;
            ops::index(&base, &index)?
        }
        ExprKind::Slice { base, start, end } => {
            let base = evaluate_value(base, scope)?;
            let start = start.as_ref().map(|e| evaluate_value(e, scope)).transpose()?;
            let end = end.as_ref().map(|e| evaluate_value(e, scope)).transpose()?;
            ops::slice(&base, start.as_ref(), end.as_ref())?
        }

        ExprKind::Binary { op, left, right } => operators::binary(*op, left, right, scope)?,
        ExprKind::Unary { op, operand } => ops::unary(*op, &evaluate_value(operand, scope)?)?,
        ExprKind::Call { func, args } => return call::evaluate_call(func, args, scope),

        ExprKind::If(if_expr) => return evaluate_if(if_expr, scope),
        ExprKind::For(for_expr) => evaluate_for(for_expr, scope)?,

        ExprKind::Default(inner) => operators::default(inner, scope)?,
        ExprKind::Schema(inner) => evaluate_schema(inner, scope)?,
        ExprKind::Function(def) => call::function_value(def, scope),
        ExprKind::Lambda(def) => call::lambda_value(def, scope),
    };
    Ok(Some(value))
}

fn interpolate(parts: &[InterpolationPart], scope: &Scope) -> EvalResult<Value> {
    let mut text = String::new();
    for part in parts {
        match part {
            InterpolationPart::Text(s) => text.push_str(s),
            InterpolationPart::Expr(expr) => {
                let value = evaluate_value(expr, scope)?;
                if value.is_undefined() {
                    return Ok(value);
                }
                text.push_str(&value.to_text().map_err(|e| e.at(&expr.pos))?);
            }
        }
    }
    Ok(Value::string(text))
}

/// List-form `for` items splice into the array; absent items are dropped.
fn evaluate_array(items: &[ExprRef], scope: &Scope) -> EvalResult<Value> {
    let mut values = Vec::with_capacity(items.len());
    for item in items {
        let splice = matches!(&item.kind, ExprKind::For(f) if !f.merge);
        match evaluate(item, scope)? {
            Some(Value::Array(spliced)) if splice => values.extend(spliced.iter().cloned()),
            Some(value) => values.push(value),
            None => {}
        }
    }
    if scope.is_schema() {
        return Ok(Value::schema(TypeSchema::array(values)));
    }
    Ok(Value::array(values))
}

#[cfg(test)]
mod tests;
