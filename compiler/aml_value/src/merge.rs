//! Unification of two values.
//!
//! Merge is how a record combines the contributions of its fields and how a
//! schema validates data:
//!
//! - undefined on either side wins (propagation)
//! - schema with schema is an AND of the two
//! - schema with data checks and completes the data
//! - objects union their keys, merging overlapping keys recursively
//! - arrays concatenate
//! - equal scalars merge to themselves, anything else conflicts

use crate::errors::{conflict, merge_kind_mismatch, schema_violation, EvalError, EvalResult};
use crate::value::{ObjectMap, Value};

pub fn merge(left: &Value, right: &Value) -> EvalResult {
    match (left, right) {
        (Value::Undefined(_), _) => Ok(left.clone()),
        (_, Value::Undefined(_)) => Ok(right.clone()),
        (Value::Schema(a), Value::Schema(b)) => Ok(Value::schema(a.and(b)?)),
        (Value::Schema(schema), data) | (data, Value::Schema(schema)) => schema.check(data),
        (Value::Object(a), Value::Object(b)) => merge_objects(a, b),
        (Value::Array(a), Value::Array(b)) => {
            Ok(Value::array(a.iter().chain(b.iter()).cloned().collect()))
        }
        (Value::Func(a), Value::Func(b)) if std::rc::Rc::ptr_eq(a, b) => Ok(left.clone()),
        (a, b) if a.kind() == b.kind() && a.kind().is_simple() => {
            if a == b {
                Ok(left.clone())
            } else {
                Err(conflict(a.to_string(), b.to_string()))
            }
        }
        (a, b) => Err(merge_kind_mismatch(a.kind(), b.kind())),
    }
}

/// Key union; `left`'s keys keep their order, new keys from `right` follow.
///
/// Failures at independent keys are collected and joined.
fn merge_objects(left: &ObjectMap, right: &ObjectMap) -> EvalResult {
    let mut fields = left.clone();
    let mut errors: Vec<EvalError> = Vec::new();
    for (key, value) in right {
        match fields.get(key) {
            Some(existing) => match merge(existing, value) {
                Ok(merged) => {
                    fields.insert(key.clone(), merged);
                }
                Err(err) => errors.push(schema_violation(key, "", err)),
            },
            None => {
                fields.insert(key.clone(), value.clone());
            }
        }
    }
    if errors.is_empty() {
        Ok(Value::object(fields))
    } else {
        Err(EvalError::join(errors))
    }
}

/// Deep overlay: `top` replaces `base`, except that two objects overlay key by key.
///
/// Used to layer call profiles beneath explicit arguments, where the later
/// layer must win instead of conflicting.
pub fn overlay(base: &Value, top: &Value) -> Value {
    match (base, top) {
        (Value::Object(b), Value::Object(t)) => {
            let mut fields = b.to_owned_inner();
            for (key, value) in t.iter() {
                let layered = match fields.get(key) {
                    Some(existing) => overlay(existing, value),
                    None => value.clone(),
                };
                fields.insert(key.clone(), layered);
            }
            Value::object(fields)
        }
        (_, top) => top.clone(),
    }
}

#[cfg(test)]
mod tests;
