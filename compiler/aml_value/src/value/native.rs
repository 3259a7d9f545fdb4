//! Conversion to the language-independent output form.

use indexmap::IndexMap;
use serde::Serialize;

use super::{number::NumberRepr, Value};
use crate::errors::{no_default, undefined_value, unsupported_operation, EvalError, EvalResult};
use crate::kind::Kind;

/// Plain data: what documents are written out as and what hashing sees.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NativeValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<NativeValue>),
    Map(IndexMap<String, NativeValue>),
}

impl NativeValue {
    pub fn to_json(&self) -> EvalResult<String> {
        serde_json::to_string(self).map_err(|e| EvalError::new(e.to_string()))
    }
}

impl Value {
    /// Convert to plain data.
    ///
    /// Schemas convert through their default. Object and array schemas
    /// without one convert to their completed empty container. Undefined,
    /// functions and other schemas without a default are errors.
    pub fn to_native(&self) -> EvalResult<NativeValue> {
        Ok(match self {
            Value::Null => NativeValue::Null,
            Value::Bool(b) => NativeValue::Bool(*b),
            Value::Number(n) => match n.repr()? {
                NumberRepr::Int(i) => NativeValue::Int(i),
                NumberRepr::Float(f) => NativeValue::Float(f),
            },
            Value::String(s) => NativeValue::String(s.to_string()),
            Value::Array(items) => {
                NativeValue::Array(items.iter().map(Value::to_native).collect::<EvalResult<_>>()?)
            }
            Value::Object(fields) => NativeValue::Map(
                fields
                    .iter()
                    .map(|(key, value)| Ok((key.clone(), value.to_native()?)))
                    .collect::<EvalResult<_>>()?,
            ),
            Value::Schema(schema) => match schema.implicit_default() {
                Some(default) => default.to_native()?,
                None => return Err(no_default(schema.kind)),
            },
            Value::Func(_) => return Err(unsupported_operation("native conversion", Kind::Func)),
            Value::Undefined(reason) => return Err(undefined_value(reason.to_string())),
        })
    }
}
