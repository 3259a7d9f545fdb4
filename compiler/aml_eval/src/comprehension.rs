//! `if` and `for` comprehensions.
//!
//! A `for` in merge form unifies every emitted object into one object and
//! sees the accumulated result as its innermost scope; in list form it
//! collects the emitted values into an array. Bodies may return the
//! `std.skip` and `std.break` sentinels to drop an iteration or end the loop.

use aml_ir::{ForExpr, IfExpr};
use aml_value::{
    merge, unsupported_operation, CancelPoint, EvalError, EvalResult, Value,
};
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::eval::{evaluate, evaluate_value};
use crate::scope::{LookupSource, Scope, ScopeOptions};

/// `if cond { ... } else { ... }`. No `else` and a false condition is absent.
pub(crate) fn evaluate_if(expr: &IfExpr, scope: &Scope) -> EvalResult<Option<Value>> {
    let condition = evaluate_value(&expr.condition, scope)?;
    if condition.is_undefined() {
        return Ok(Some(condition));
    }
    if condition.is_truthy() {
        evaluate(&expr.then_branch, scope)
    } else {
        match &expr.else_branch {
            Some(branch) => evaluate(branch, scope),
            None => Ok(None),
        }
    }
}

/// `for k, v in collection { ... }`.
#[tracing::instrument(level = "debug", skip_all, fields(merge = expr.merge))]
pub(crate) fn evaluate_for(expr: &ForExpr, scope: &Scope) -> EvalResult<Value> {
    let collection = evaluate_value(&expr.collection, scope)?;
    if collection.is_undefined() {
        return Ok(collection);
    }
    let pairs = iteration_pairs(&collection)?;
    let context = scope.context();

    let mut merged = Value::empty_object();
    let mut items: Vec<Value> = Vec::new();
    for (key, value) in pairs {
        context.check(CancelPoint::Loop)?;

        let mut bindings = FxHashMap::default();
        if let Some(name) = &expr.key {
            bindings.insert(name.clone(), key);
        }
        if let Some(name) = &expr.value {
            bindings.insert(name.clone(), value);
        }
        let frame = if expr.merge {
            scope
                .push(LookupSource::Data(merged.clone()), ScopeOptions::new())?
                .push(LookupSource::Bindings(bindings), ScopeOptions::new())?
        } else {
            scope.push(LookupSource::Bindings(bindings), ScopeOptions::new())?
        };

        let Some(result) = evaluate(&expr.body, &frame)? else {
            continue;
        };
        if result.is_skip() {
            trace!("skip");
            continue;
        }
        if result.is_break() {
            trace!("break");
            break;
        }
        if result.is_undefined() {
            return Ok(result);
        }
        if expr.merge {
            merged = merge(&merged, &result)?;
        } else {
            items.push(result);
        }
    }

    if expr.merge {
        Ok(merged)
    } else {
        Ok(Value::array(items))
    }
}

/// `(key, value)` pairs: object entries, array elements by index, or a
/// single scalar at index 0.
fn iteration_pairs(collection: &Value) -> EvalResult<Vec<(Value, Value)>> {
    match collection {
        Value::Object(fields) => Ok(fields
            .iter()
            .map(|(k, v)| (Value::string(k), v.clone()))
            .collect()),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| Ok((index_value(i)?, item.clone())))
            .collect(),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {
            Ok(vec![(Value::int(0), collection.clone())])
        }
        other => Err(unsupported_operation("for", other.kind())),
    }
}

fn index_value(index: usize) -> EvalResult<Value> {
    i64::try_from(index)
        .map(Value::int)
        .map_err(|_| EvalError::new("collection too large to iterate"))
}

#[cfg(test)]
mod tests;
