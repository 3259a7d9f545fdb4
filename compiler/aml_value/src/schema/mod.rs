//! Schemas: values that describe, validate and complete other values.
//!
//! Merging data into a [`TypeSchema`] ("checkType") either yields a value of
//! the target kind that satisfies every constraint with every required key
//! present, or fails with a typed error. Schemas are immutable; every
//! builder method returns a new schema.

mod array;
mod constraint;
mod contract;
mod describe;

use std::fmt;

use tracing::trace;

pub use array::ArrayContract;
pub use constraint::Constraint;
pub use contract::{
    merge_object, pattern_matches, AndContract, Contract, ContractField, ObjectContract,
    StaticContract,
};
pub use describe::{
    describe_field_type, describe_object, FieldDescription, FieldType, ObjectDescription,
};

use crate::errors::{
    merge_kind_mismatch, type_mismatch, unmatched_type, unsupported_operation, EvalError,
    EvalResult,
};
use crate::kind::Kind;
use crate::merge::overlay;
use crate::value::Value;

/// A schema value.
#[derive(Clone, Debug)]
pub struct TypeSchema {
    /// Target kind; `Union` accepts every kind.
    pub kind: Kind,
    pub object: Option<ObjectContract>,
    pub array: Option<ArrayContract>,
    pub constraints: Vec<Constraint>,
    /// Union alternatives, tried in order.
    pub alternates: Vec<TypeSchema>,
    pub default: Option<Value>,
}

impl TypeSchema {
    pub fn new(kind: Kind) -> Self {
        TypeSchema {
            kind,
            object: None,
            array: None,
            constraints: Vec::new(),
            alternates: Vec::new(),
            default: None,
        }
    }

    /// Accepts any value.
    pub fn any() -> Self {
        Self::new(Kind::Union)
    }

    /// A number representable as an integer.
    pub fn int() -> Self {
        Self::new(Kind::Number).with_constraint(Constraint::Integer)
    }

    pub fn object(contract: ObjectContract) -> Self {
        Self::new(Kind::Object).with_object(contract)
    }

    pub fn array(items: Vec<Value>) -> Self {
        Self::new(Kind::Array).with_array(ArrayContract::new(items))
    }

    /// A schema accepting exactly `value`.
    pub fn literal(value: &Value) -> Self {
        Self::new(value.kind()).with_constraint(Constraint::compare(
            aml_ir::BinaryOp::Eq,
            value.clone(),
        ))
    }

    /// Schemas stay schemas; data becomes a literal schema.
    pub fn from_value(value: &Value) -> EvalResult<Self> {
        match value {
            Value::Schema(schema) => Ok((**schema).clone()),
            Value::Func(_) | Value::Undefined(_) => {
                Err(unsupported_operation("schema conversion", value.kind()))
            }
            data => Ok(Self::literal(data)),
        }
    }

    #[must_use]
    pub fn with_constraint(&self, constraint: Constraint) -> Self {
        let mut schema = self.clone();
        if schema.is_or_node() {
            schema.alternates = schema
                .alternates
                .iter()
                .map(|alt| alt.with_constraint(constraint.clone()))
                .collect();
        } else {
            schema.constraints.push(constraint);
        }
        schema
    }

    #[must_use]
    pub fn with_default(&self, default: Value) -> Self {
        let mut schema = self.clone();
        schema.default = Some(default);
        schema
    }

    #[must_use]
    pub fn with_object(mut self, contract: ObjectContract) -> Self {
        self.object = Some(contract);
        self
    }

    #[must_use]
    pub fn with_array(mut self, contract: ArrayContract) -> Self {
        self.array = Some(contract);
        self
    }

    /// A pure union: nothing but alternatives.
    pub fn is_or_node(&self) -> bool {
        !self.alternates.is_empty()
            && self.object.is_none()
            && self.array.is_none()
            && self.constraints.is_empty()
            && self.default.is_none()
    }

    fn flattened(&self) -> Vec<TypeSchema> {
        if self.is_or_node() {
            self.alternates.clone()
        } else {
            vec![self.clone()]
        }
    }

    /// `left | right`: alternates concatenate.
    pub fn or(left: &TypeSchema, right: &TypeSchema) -> TypeSchema {
        let mut alternates = left.flattened();
        alternates.extend(right.flattened());
        let kind = match alternates.first() {
            Some(first) if alternates.iter().all(|alt| alt.kind == first.kind) => first.kind,
            _ => Kind::Union,
        };
        TypeSchema {
            alternates,
            ..TypeSchema::new(kind)
        }
    }

    /// `self & other`: both must accept a value.
    ///
    /// A union on either side distributes over its alternatives; alternatives
    /// that cannot combine are dropped.
    pub fn and(&self, other: &TypeSchema) -> EvalResult<TypeSchema> {
        if self.is_or_node() {
            return distribute(&self.alternates, other);
        }
        if other.is_or_node() {
            return distribute(&other.alternates, self);
        }
        let kind = match (self.kind, other.kind) {
            (Kind::Union, k) | (k, Kind::Union) => k,
            (a, b) if a == b => a,
            (a, b) => return Err(merge_kind_mismatch(a, b)),
        };
        let object = match (&self.object, &other.object) {
            (Some(a), Some(b)) => Some(AndContract::combine(a, b)),
            (a, b) => a.clone().or_else(|| b.clone()),
        };
        let array = match (&self.array, &other.array) {
            (Some(a), Some(b)) => Some(a.and(b)),
            (a, b) => a.clone().or_else(|| b.clone()),
        };
        Ok(TypeSchema {
            kind,
            object,
            array,
            constraints: self
                .constraints
                .iter()
                .chain(&other.constraints)
                .cloned()
                .collect(),
            alternates: self
                .alternates
                .iter()
                .chain(&other.alternates)
                .cloned()
                .collect(),
            default: other.default.clone().or_else(|| self.default.clone()),
        })
    }

    /// Merge `value` into this schema.
    pub fn check(&self, value: &Value) -> EvalResult {
        match value {
            Value::Undefined(_) => return Ok(value.clone()),
            Value::Schema(other) => return Ok(Value::schema(self.and(other)?)),
            _ => {}
        }
        if self.is_or_node() {
            return self.check_alternates(value, Vec::new());
        }
        match self.check_direct(value) {
            Ok(result) => Ok(result),
            Err(err) if self.alternates.is_empty() || err.is_fatal() => Err(err),
            Err(err) => self.check_alternates(value, vec![err]),
        }
    }

    fn check_direct(&self, value: &Value) -> EvalResult {
        let kind = value.kind();
        if self.kind != Kind::Union && self.kind != kind {
            return Err(type_mismatch(self.kind, kind, value.to_string()));
        }
        let mut result = value.clone();
        if let Some(contract) = &self.object {
            result = merge_object(contract.as_ref(), &result)?;
        }
        if let Some(array) = &self.array {
            result = array.check(&result)?;
        }
        for constraint in &self.constraints {
            constraint.check(&result)?;
        }
        if let Some(default) = &self.default {
            if !kind.is_simple() {
                result = overlay(default, &result);
            }
        }
        Ok(result)
    }

    fn check_alternates(&self, value: &Value, mut failures: Vec<EvalError>) -> EvalResult {
        for alternate in &self.alternates {
            match alternate.check(value) {
                Ok(result) => return Ok(result),
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => failures.push(err),
            }
        }
        trace!(value = %value, alternates = self.alternates.len(), "no alternate matched");
        Err(unmatched_type(value.to_string(), failures))
    }

    /// The author-specified default: explicit, else from the first alternate carrying one.
    pub fn default_value(&self) -> Option<Value> {
        self.default
            .clone()
            .or_else(|| self.alternates.iter().find_map(TypeSchema::default_value))
    }

    /// Like [`default_value`](Self::default_value), but object and array
    /// schemas without one default to an empty container (completed by the
    /// schema when possible).
    pub fn implicit_default(&self) -> Option<Value> {
        if let Some(default) = self.default_value() {
            return Some(default);
        }
        let empty = match self.kind {
            Kind::Object => Value::empty_object(),
            Kind::Array => Value::array(Vec::new()),
            _ => return None,
        };
        Some(self.check(&empty).unwrap_or(empty))
    }

    /// Schema of a key of an object schema.
    pub fn lookup(&self, key: &str) -> EvalResult<Option<Value>> {
        if let Some(contract) = &self.object {
            return match contract.lookup_field(key)? {
                Some(schema) => Ok(Some(schema)),
                None => contract.lookup_match(key),
            };
        }
        for alternate in &self.alternates {
            if let Some(found) = alternate.lookup(key)? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    pub fn keys(&self) -> EvalResult<Vec<String>> {
        match &self.object {
            Some(contract) => contract.all_keys(),
            None => Ok(Vec::new()),
        }
    }
}

fn distribute(alternates: &[TypeSchema], other: &TypeSchema) -> EvalResult<TypeSchema> {
    let mut combined = Vec::new();
    let mut errors = Vec::new();
    for alternate in alternates {
        match alternate.and(other) {
            Ok(schema) => combined.push(schema),
            Err(err) => errors.push(err),
        }
    }
    match combined.len() {
        0 => Err(EvalError::join(errors)),
        1 => Ok(combined.remove(0)),
        _ => Ok(combined
            .iter()
            .skip(1)
            .fold(combined[0].clone(), |acc, alt| TypeSchema::or(&acc, alt))),
    }
}

impl fmt::Display for TypeSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_or_node() {
            for (i, alternate) in self.alternates.iter().enumerate() {
                if i > 0 {
                    f.write_str(" | ")?;
                }
                write!(f, "{alternate}")?;
            }
            return Ok(());
        }
        match self.kind {
            Kind::Union => f.write_str("any")?,
            kind => write!(f, "{kind}")?,
        }
        for constraint in &self.constraints {
            write!(f, " & {constraint}")?;
        }
        if let Some(default) = &self.default {
            write!(f, " | *{default}")?;
        }
        Ok(())
    }
}
