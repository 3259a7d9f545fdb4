//! Object contracts: the lazy, per-key description of an object schema.
//!
//! The evaluator implements [`Contract`] for record schemas so field schemas
//! are only evaluated when a key asks for them. This module provides the
//! merge of data into a contract, the AND of two contracts, and a static
//! contract for schemas assembled in code.

use std::fmt;
use std::rc::Rc;

use tracing::trace;

use crate::errors::{
    missing_required_keys, schema_violation, type_mismatch, unknown_field, unsupported_operation,
    EvalError, EvalResult,
};
use crate::kind::Kind;
use crate::merge::merge;
use crate::ops::{default_of, is_match};
use crate::value::{ObjectMap, Value};

/// Field-level view of an object schema.
pub trait Contract: fmt::Debug {
    /// Dotted display path of the object this contract describes.
    fn path(&self) -> String;

    fn allow_new_keys(&self) -> bool;

    /// Schema for an exact key. Pattern fields never answer here.
    fn lookup_field(&self, key: &str) -> EvalResult<Option<Value>>;

    /// Schema from every pattern field matching `key`.
    fn lookup_match(&self, key: &str) -> EvalResult<Option<Value>>;

    fn required_keys(&self) -> EvalResult<Vec<String>>;

    fn all_keys(&self) -> EvalResult<Vec<String>>;

    /// Every field, for description export.
    fn fields(&self) -> EvalResult<Vec<ContractField>>;
}

/// Shared contract handle.
pub type ObjectContract = Rc<dyn Contract>;

/// One described field of a contract.
#[derive(Clone, Debug)]
pub struct ContractField {
    /// The key, or the pattern text for pattern fields.
    pub key: String,
    pub schema: Value,
    pub optional: bool,
    pub pattern: bool,
    pub description: String,
}

/// Schema governing `key`: exact field first, then patterns.
fn governing_schema(contract: &dyn Contract, key: &str) -> EvalResult<Option<Value>> {
    match contract.lookup_field(key)? {
        Some(schema) => Ok(Some(schema)),
        None => contract.lookup_match(key),
    }
}

/// Unify an object with a contract.
///
/// Every incoming key is merged with its governing schema; unknown keys fail
/// unless the contract is open. Missing required keys are filled from their
/// defaults, placed before the incoming keys, or reported together.
pub fn merge_object(contract: &dyn Contract, value: &Value) -> EvalResult {
    let Value::Object(incoming) = value else {
        return Err(type_mismatch(Kind::Object, value.kind(), value.to_string()));
    };
    let path = contract.path();
    trace!(path = %path, keys = incoming.len(), "merging object into contract");

    let mut fields = ObjectMap::default();
    let mut errors: Vec<EvalError> = Vec::new();
    let mut missing: Vec<String> = Vec::new();

    for key in contract.required_keys()? {
        if incoming.contains_key(&key) || fields.contains_key(&key) {
            continue;
        }
        match governing_schema(contract, &key)?.as_ref().and_then(default_of) {
            Some(default) => {
                fields.insert(key, default);
            }
            None => missing.push(key),
        }
    }

    for (key, item) in incoming.iter() {
        match governing_schema(contract, key)? {
            Some(schema) => match merge(&schema, item) {
                Ok(merged) => {
                    fields.insert(key.clone(), merged);
                }
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => errors.push(schema_violation(key, &path, err)),
            },
            None if contract.allow_new_keys() => {
                fields.insert(key.clone(), item.clone());
            }
            None => errors.push(unknown_field(key, &path)),
        }
    }

    if !missing.is_empty() {
        errors.push(missing_required_keys(missing, &path));
    }
    if errors.is_empty() {
        Ok(Value::object(fields))
    } else {
        Err(EvalError::join(errors))
    }
}

/// Does a match-field pattern select `key`?
///
/// String patterns are regular expressions; schema patterns must accept the
/// key as a string value.
pub fn pattern_matches(pattern: &Value, key: &str) -> EvalResult<bool> {
    match pattern {
        Value::String(regex) => is_match(regex, key),
        Value::Schema(schema) => Ok(schema.check(&Value::string(key)).is_ok()),
        Value::Undefined(_) => Ok(false),
        other => Err(unsupported_operation("match", other.kind())),
    }
}

fn merge_answers(left: Option<Value>, right: Option<Value>) -> EvalResult<Option<Value>> {
    Ok(match (left, right) {
        (Some(l), Some(r)) => Some(merge(&l, &r)?),
        (l, None) => l,
        (None, r) => r,
    })
}

fn union_keys(mut left: Vec<String>, right: Vec<String>) -> Vec<String> {
    for key in right {
        if !left.contains(&key) {
            left.push(key);
        }
    }
    left
}

/// AND of two object contracts: every answer is the union of both sides.
#[derive(Debug)]
pub struct AndContract {
    left: ObjectContract,
    right: ObjectContract,
}

impl AndContract {
    pub fn combine(left: &ObjectContract, right: &ObjectContract) -> ObjectContract {
        Rc::new(AndContract {
            left: Rc::clone(left),
            right: Rc::clone(right),
        })
    }
}

impl Contract for AndContract {
    fn path(&self) -> String {
        self.left.path()
    }

    fn allow_new_keys(&self) -> bool {
        self.left.allow_new_keys() && self.right.allow_new_keys()
    }

    fn lookup_field(&self, key: &str) -> EvalResult<Option<Value>> {
        merge_answers(self.left.lookup_field(key)?, self.right.lookup_field(key)?)
    }

    fn lookup_match(&self, key: &str) -> EvalResult<Option<Value>> {
        merge_answers(self.left.lookup_match(key)?, self.right.lookup_match(key)?)
    }

    fn required_keys(&self) -> EvalResult<Vec<String>> {
        Ok(union_keys(self.left.required_keys()?, self.right.required_keys()?))
    }

    fn all_keys(&self) -> EvalResult<Vec<String>> {
        Ok(union_keys(self.left.all_keys()?, self.right.all_keys()?))
    }

    fn fields(&self) -> EvalResult<Vec<ContractField>> {
        let mut fields = self.left.fields()?;
        for field in self.right.fields()? {
            match fields
                .iter_mut()
                .find(|f| f.key == field.key && f.pattern == field.pattern)
            {
                Some(existing) => {
                    existing.schema = merge(&existing.schema, &field.schema)?;
                    existing.optional &= field.optional;
                    if existing.description.is_empty() {
                        existing.description = field.description;
                    }
                }
                None => fields.push(field),
            }
        }
        Ok(fields)
    }
}

/// A contract assembled in code, e.g. by built-ins or an argument binder.
#[derive(Debug, Default)]
pub struct StaticContract {
    path: String,
    fields: Vec<ContractField>,
    allow_new_keys: bool,
}

impl StaticContract {
    pub fn new(path: impl Into<String>) -> Self {
        StaticContract {
            path: path.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn field(self, key: impl Into<String>, schema: Value) -> Self {
        self.push(key.into(), schema, false, false)
    }

    #[must_use]
    pub fn optional(self, key: impl Into<String>, schema: Value) -> Self {
        self.push(key.into(), schema, true, false)
    }

    /// A pattern field; `pattern` is a regular expression over keys.
    #[must_use]
    pub fn pattern(self, pattern: impl Into<String>, schema: Value) -> Self {
        self.push(pattern.into(), schema, true, true)
    }

    #[must_use]
    pub fn open(mut self) -> Self {
        self.allow_new_keys = true;
        self
    }

    #[must_use]
    pub fn describe(mut self, description: &str) -> Self {
        if let Some(last) = self.fields.last_mut() {
            last.description = description.to_string();
        }
        self
    }

    pub fn build(self) -> ObjectContract {
        Rc::new(self)
    }

    fn push(mut self, key: String, schema: Value, optional: bool, pattern: bool) -> Self {
        self.fields.push(ContractField {
            key,
            schema,
            optional,
            pattern,
            description: String::new(),
        });
        self
    }
}

impl Contract for StaticContract {
    fn path(&self) -> String {
        self.path.clone()
    }

    fn allow_new_keys(&self) -> bool {
        self.allow_new_keys
    }

    fn lookup_field(&self, key: &str) -> EvalResult<Option<Value>> {
        let mut answer = None;
        for field in self.fields.iter().filter(|f| !f.pattern && f.key == key) {
            answer = merge_answers(answer, Some(field.schema.clone()))?;
        }
        Ok(answer)
    }

    fn lookup_match(&self, key: &str) -> EvalResult<Option<Value>> {
        let mut answer = None;
        for field in self.fields.iter().filter(|f| f.pattern) {
            if is_match(&field.key, key)? {
                answer = merge_answers(answer, Some(field.schema.clone()))?;
            }
        }
        Ok(answer)
    }

    fn required_keys(&self) -> EvalResult<Vec<String>> {
        Ok(self
            .fields
            .iter()
            .filter(|f| !f.pattern && !f.optional)
            .fold(Vec::new(), |keys, f| union_keys(keys, vec![f.key.clone()])))
    }

    fn all_keys(&self) -> EvalResult<Vec<String>> {
        Ok(self
            .fields
            .iter()
            .filter(|f| !f.pattern)
            .fold(Vec::new(), |keys, f| union_keys(keys, vec![f.key.clone()])))
    }

    fn fields(&self) -> EvalResult<Vec<ContractField>> {
        Ok(self.fields.clone())
    }
}
