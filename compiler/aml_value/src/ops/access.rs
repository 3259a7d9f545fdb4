//! Lookup, indexing, slicing and length.

use crate::errors::{index_out_of_bounds, unsupported_operation, EvalResult};
use crate::value::Value;

/// Keyed lookup. `None` means the key is absent; undefined propagates.
pub fn lookup(value: &Value, key: &str) -> EvalResult<Option<Value>> {
    match value {
        Value::Undefined(_) => Ok(Some(value.clone())),
        Value::Object(fields) => Ok(fields.get(key).cloned()),
        Value::Schema(schema) => schema.lookup(key),
        other => Err(unsupported_operation("lookup", other.kind())),
    }
}

/// Keys of an object or object schema. Undefined has no keys.
pub fn keys(value: &Value) -> EvalResult<Vec<String>> {
    match value {
        Value::Undefined(_) => Ok(Vec::new()),
        Value::Object(fields) => Ok(fields.keys().cloned().collect()),
        Value::Schema(schema) => schema.keys(),
        other => Err(unsupported_operation("keys", other.kind())),
    }
}

/// `base[index]`. Objects index by key; a missing key is undefined.
pub fn index(base: &Value, index: &Value) -> EvalResult {
    match (base, index) {
        (Value::Undefined(_), _) => Ok(base.clone()),
        (_, Value::Undefined(_)) => Ok(index.clone()),
        (Value::Array(items), Value::Number(n)) => {
            let i = n.to_i64()?;
            position(i, items.len()).map(|i| items[i].clone())
        }
        (Value::String(s), Value::Number(n)) => {
            let i = n.to_i64()?;
            let chars: Vec<char> = s.chars().collect();
            position(i, chars.len()).map(|i| Value::string(chars[i].to_string()))
        }
        (Value::Object(_) | Value::Schema(_), Value::String(key)) => {
            Ok(lookup(base, key)?.unwrap_or_else(|| Value::missing(key)))
        }
        (Value::Array(_) | Value::String(_), other) => {
            Err(unsupported_operation("index", other.kind()))
        }
        (other, _) => Err(unsupported_operation("index", other.kind())),
    }
}

fn position(index: i64, len: usize) -> EvalResult<usize> {
    usize::try_from(index)
        .ok()
        .filter(|i| *i < len)
        .ok_or_else(|| index_out_of_bounds(index, len))
}

/// `base[start:end]` over arrays and strings (by character).
pub fn slice(base: &Value, start: Option<&Value>, end: Option<&Value>) -> EvalResult {
    if base.is_undefined() {
        return Ok(base.clone());
    }
    for bound in [start, end].into_iter().flatten() {
        if bound.is_undefined() {
            return Ok(bound.clone());
        }
    }
    match base {
        Value::Array(items) => {
            let (from, to) = bounds(start, end, items.len())?;
            Ok(Value::array(items[from..to].to_vec()))
        }
        Value::String(s) => {
            let chars: Vec<char> = s.chars().collect();
            let (from, to) = bounds(start, end, chars.len())?;
            Ok(Value::string(chars[from..to].iter().collect::<String>()))
        }
        other => Err(unsupported_operation("slice", other.kind())),
    }
}

fn bounds(start: Option<&Value>, end: Option<&Value>, len: usize) -> EvalResult<(usize, usize)> {
    let resolve = |bound: Option<&Value>, default: usize| -> EvalResult<usize> {
        match bound {
            None => Ok(default),
            Some(Value::Number(n)) => {
                let i = n.to_i64()?;
                usize::try_from(i)
                    .ok()
                    .filter(|i| *i <= len)
                    .ok_or_else(|| index_out_of_bounds(i, len))
            }
            Some(other) => Err(unsupported_operation("slice", other.kind())),
        }
    };
    let from = resolve(start, 0)?;
    let to = resolve(end, len)?;
    if from > to {
        return Err(index_out_of_bounds(i64::try_from(from).unwrap_or(i64::MAX), to));
    }
    Ok((from, to))
}

/// Number of elements, characters or keys.
pub fn length(value: &Value) -> EvalResult {
    let len = match value {
        Value::Undefined(_) => return Ok(value.clone()),
        Value::Array(items) => items.len(),
        Value::String(s) => s.chars().count(),
        Value::Object(fields) => fields.len(),
        other => return Err(unsupported_operation("length", other.kind())),
    };
    Ok(Value::int(i64::try_from(len).unwrap_or(i64::MAX)))
}

/// Default of a schema; any other value is its own default.
pub fn default_of(value: &Value) -> Option<Value> {
    match value {
        Value::Schema(schema) => schema.default_value(),
        Value::Undefined(_) => None,
        other => Some(other.clone()),
    }
}
