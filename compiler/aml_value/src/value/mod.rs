//! Runtime values.
//!
//! All composite payloads go through factory methods on `Value`; the
//! [`Heap`] constructor is private to this module.
//!
//! ```text
//! let s = Value::string("hello");
//! let n = Value::number("2Ki")?;
//! let o = Value::object_from([("a", Value::int(1))]);
//! ```
//!
//! Undefined is a variant, not an `Option`: operators hand it back unchanged
//! so unresolved branches can be detected without raising errors.

mod heap;
mod native;
mod number;
mod undefined;

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

pub use heap::Heap;
pub use native::NativeValue;
pub use number::{Number, NumberRepr};
pub use undefined::Undefined;

use crate::callable::Callable;
use crate::errors::{unsupported_operation, EvalResult};
use crate::kind::Kind;
use crate::schema::TypeSchema;

/// Insertion-ordered object fields.
pub type ObjectMap = IndexMap<String, Value, FxBuildHasher>;

/// Runtime value.
#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Number(Number),
    String(Heap<str>),
    Array(Heap<Vec<Value>>),
    Object(Heap<ObjectMap>),
    Func(Rc<dyn Callable>),
    Schema(Heap<TypeSchema>),
    Undefined(Undefined),
}

// Factory methods

impl Value {
    #[inline]
    pub fn string(s: impl AsRef<str>) -> Self {
        Value::String(Heap::from_ref(s.as_ref()))
    }

    #[inline]
    pub fn int(n: i64) -> Self {
        Value::Number(Number::from_i64(n))
    }

    /// Parse a number literal, suffixes included.
    pub fn number(literal: &str) -> EvalResult<Self> {
        Number::parse(literal).map(Value::Number)
    }

    #[inline]
    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Heap::new(items))
    }

    #[inline]
    pub fn object(fields: ObjectMap) -> Self {
        Value::Object(Heap::new(fields))
    }

    pub fn empty_object() -> Self {
        Self::object(ObjectMap::default())
    }

    pub fn object_from<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Self::object(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    #[inline]
    pub fn schema(schema: TypeSchema) -> Self {
        Value::Schema(Heap::new(schema))
    }

    #[inline]
    pub fn func(callable: Rc<dyn Callable>) -> Self {
        Value::Func(callable)
    }

    pub fn missing(key: &str) -> Self {
        Value::Undefined(Undefined::MissingKey(key.to_string()))
    }

    pub fn circular(key: &str) -> Self {
        Value::Undefined(Undefined::Circular(key.to_string()))
    }

    pub fn unresolved(what: impl Into<String>) -> Self {
        Value::Undefined(Undefined::Unresolved(what.into()))
    }

    /// Loop sentinel dropping the current iteration.
    pub fn skip() -> Self {
        Value::Undefined(Undefined::Skip)
    }

    /// Loop sentinel ending the loop.
    pub fn break_loop() -> Self {
        Value::Undefined(Undefined::Break)
    }
}

// Accessors

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Null,
            Value::Bool(_) => Kind::Bool,
            Value::Number(_) => Kind::Number,
            Value::String(_) => Kind::String,
            Value::Array(_) => Kind::Array,
            Value::Object(_) => Kind::Object,
            Value::Func(_) => Kind::Func,
            Value::Schema(_) => Kind::Schema,
            Value::Undefined(_) => Kind::Undefined,
        }
    }

    /// The kind a value of this shape produces: a schema's target kind, or
    /// the value's own kind.
    pub fn target_kind(&self) -> Kind {
        match self {
            Value::Schema(schema) => schema.kind,
            other => other.kind(),
        }
    }

    #[inline]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined(_))
    }

    #[inline]
    pub fn is_skip(&self) -> bool {
        matches!(self, Value::Undefined(Undefined::Skip))
    }

    #[inline]
    pub fn is_break(&self) -> bool {
        matches!(self, Value::Undefined(Undefined::Break))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(&**s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectMap> {
        match self {
            Value::Object(fields) => Some(&**fields),
            _ => None,
        }
    }

    pub fn as_schema(&self) -> Option<&TypeSchema> {
        match self {
            Value::Schema(schema) => Some(&**schema),
            _ => None,
        }
    }

    pub fn as_func(&self) -> Option<&Rc<dyn Callable>> {
        match self {
            Value::Func(func) => Some(func),
            _ => None,
        }
    }

    /// Truthiness for `if` and `!`.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Null | Value::Undefined(_) => false,
            Value::Number(n) => n.to_f64().is_ok_and(|f| f != 0.0),
            Value::String(s) => !s.is_empty(),
            Value::Array(items) => !items.is_empty(),
            Value::Object(fields) => !fields.is_empty(),
            Value::Func(_) | Value::Schema(_) => true,
        }
    }

    /// Undefined anywhere inside arrays and objects.
    pub fn contains_undefined(&self) -> bool {
        match self {
            Value::Undefined(_) => true,
            Value::Array(items) => items.iter().any(Value::contains_undefined),
            Value::Object(fields) => fields.values().any(Value::contains_undefined),
            _ => false,
        }
    }

    /// Text used by string interpolation: strings verbatim, composites as JSON.
    pub fn to_text(&self) -> EvalResult<String> {
        match self {
            Value::String(s) => Ok(s.to_string()),
            Value::Number(n) => Ok(match n.repr()? {
                NumberRepr::Int(i) => i.to_string(),
                NumberRepr::Float(f) => f.to_string(),
            }),
            Value::Bool(b) => Ok(b.to_string()),
            Value::Null => Ok("null".to_string()),
            Value::Array(_) | Value::Object(_) | Value::Schema(_) => self.to_native()?.to_json(),
            Value::Func(_) | Value::Undefined(_) => {
                Err(unsupported_operation("string conversion", self.kind()))
            }
        }
    }

    /// Replace every schema that carries a default with that default.
    ///
    /// Schemas without a default are left in place.
    pub fn resolve_defaults(&self) -> EvalResult<Value> {
        Ok(match self {
            Value::Array(items) => Value::array(
                items
                    .iter()
                    .map(Value::resolve_defaults)
                    .collect::<EvalResult<_>>()?,
            ),
            Value::Object(fields) => Value::object(
                fields
                    .iter()
                    .map(|(k, v)| Ok((k.clone(), v.resolve_defaults()?)))
                    .collect::<EvalResult<_>>()?,
            ),
            Value::Schema(schema) => match schema.default_value() {
                Some(default) => default.resolve_defaults()?,
                None => self.clone(),
            },
            other => other.clone(),
        })
    }
}

impl PartialEq for Value {
    /// Structural equality; numbers compare numerically, functions by identity.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => {
                a.len() == b.len() && a.iter().all(|(k, v)| b.get(k) == Some(v))
            }
            (Value::Func(a), Value::Func(b)) => Rc::ptr_eq(a, b),
            (Value::Schema(a), Value::Schema(b)) => Heap::ptr_eq(a, b),
            (Value::Undefined(a), Value::Undefined(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "{:?}", &**s),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Object(fields) => {
                f.write_str("{")?;
                for (i, (key, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
            Value::Func(_) => f.write_str("<function>"),
            Value::Schema(schema) => write!(f, "{}", &**schema),
            Value::Undefined(_) => f.write_str("undefined"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined(reason) => write!(f, "undefined({reason})"),
            Value::Func(func) => write!(f, "{func:?}"),
            other => write!(f, "{other}"),
        }
    }
}

#[cfg(test)]
mod tests;
