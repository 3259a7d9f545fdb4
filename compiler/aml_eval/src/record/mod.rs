//! Records and their fields.
//!
//! A record is evaluated by pushing a frame whose [`LookupSource`] is the
//! record itself. Sibling references resolve lazily through that frame, one
//! key at a time. In data mode the record then folds every field's
//! contribution into one object; in schema mode it becomes an object schema
//! whose [`RecordContract`] evaluates field schemas on demand.
//!
//! # Undefined keys
//!
//! A computed key or embedded value that is undefined while answering a
//! lookup excludes its field for that key, and the lookup is retried
//! without it. So does an embedded value that needed the key it was asked
//! for. Such a field producing that key later is a cycle.

mod contract;

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use rustc_hash::FxHashSet;
use tracing::debug;

use aml_ir::{ExprRef, Field, FieldKind, Key, StructRef};
use aml_value::schema::{pattern_matches, ObjectContract};
use aml_value::{
    cycle_detected, key_undefined, merge, ops, schema_violation, type_mismatch,
    unsupported_operation, EvalError, EvalResult, Kind, ObjectMap, TypeSchema, Value,
};

pub(crate) use contract::RecordContract;

use crate::eval::{evaluate, evaluate_field};
use crate::scope::{LookupSource, Scope, ScopeOptions};

/// Evaluate a record in `scope`'s mode.
///
/// `segment` names the key the record is the value of; anonymous records
/// keep the enclosing display path.
pub(crate) fn evaluate_record(
    record: &StructRef,
    scope: &Scope,
    segment: Option<&str>,
) -> EvalResult<Value> {
    let source = Rc::new(RecordSource::new(Arc::clone(record)));
    let options = segment.map_or_else(ScopeOptions::new, |s| ScopeOptions::new().path(s));
    let frame = scope.push(LookupSource::Record(Rc::clone(&source)), options)?;
    source.materialize(&frame)
}

/// A record as the lookup source of its own frame.
#[derive(Debug)]
pub struct RecordSource {
    record: StructRef,
    /// `(field index, key)` pairs excluded because the field's key or
    /// embedded value was undefined while answering `key`.
    rejected: RefCell<FxHashSet<(usize, String)>>,
}

/// Which fields answer a keyed query.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) enum Query {
    /// Name resolution: local bindings answer too.
    Scope,
    /// Object keys only.
    Field,
}

enum Attempt {
    Answered(Option<Value>),
    Rejected(usize),
}

impl RecordSource {
    pub fn new(record: StructRef) -> Self {
        RecordSource {
            record,
            rejected: RefCell::default(),
        }
    }

    pub(crate) fn record(&self) -> &StructRef {
        &self.record
    }

    /// Resolve a name from inside the record.
    pub(crate) fn lookup(&self, scope: &Scope, key: &str) -> EvalResult<Option<Value>> {
        self.lookup_with(scope, key, Query::Scope)
    }

    pub(crate) fn lookup_with(
        &self,
        scope: &Scope,
        key: &str,
        query: Query,
    ) -> EvalResult<Option<Value>> {
        loop {
            match self.try_lookup(scope, key, query)? {
                Attempt::Answered(value) => return Ok(value),
                Attempt::Rejected(index) => {
                    debug!(key, field = index, "field key is undefined, retrying without it");
                    self.rejected.borrow_mut().insert((index, key.to_string()));
                }
            }
        }
    }

    fn is_rejected(&self, index: usize, key: &str) -> bool {
        self.rejected.borrow().contains(&(index, key.to_string()))
    }

    fn try_lookup(&self, scope: &Scope, key: &str, query: Query) -> EvalResult<Attempt> {
        let mut answer: Option<Value> = None;
        for (index, field) in self.record.fields.iter().enumerate() {
            let contribution = match &field.kind {
                FieldKind::KeyValue(kv) => match &kv.key {
                    Key::Name(name) if name == key => {
                        evaluate_field(&kv.value, scope, key).map_err(|e| e.at(&field.pos))?
                    }
                    Key::Name(_) | Key::Match(_) => None,
                    Key::Computed(expr) => {
                        if self.is_rejected(index, key) {
                            continue;
                        }
                        match computed_key(expr, scope).map_err(|e| e.at(&field.pos))? {
                            Err(_) => return Ok(Attempt::Rejected(index)),
                            Ok(name) if name == key => evaluate_field(&kv.value, scope, key)
                                .map_err(|e| e.at(&field.pos))?,
                            Ok(_) => None,
                        }
                    }
                },
                FieldKind::Local { name, value } if query == Query::Scope && name == key => {
                    evaluate(value, scope).map_err(|e| e.at(&field.pos))?
                }
                FieldKind::Embedded(expr) => {
                    if self.is_rejected(index, key) {
                        continue;
                    }
                    let (value, circular) =
                        scope.watch_circular(key, || evaluate(expr, scope));
                    match value.map_err(|e| e.at(&field.pos))? {
                        _ if circular => return Ok(Attempt::Rejected(index)),
                        None => None,
                        Some(value) if value.is_undefined() => {
                            return Ok(Attempt::Rejected(index))
                        }
                        Some(value) => embedded_answer(&value, key, query, scope.is_schema())
                            .map_err(|e| e.at(&field.pos))?,
                    }
                }
                FieldKind::Local { .. } | FieldKind::Args(_) | FieldKind::Profiles(_) => None,
            };
            if let Some(value) = contribution {
                answer = Some(match answer {
                    Some(previous) => merge(&previous, &value).map_err(|e| e.at(&field.pos))?,
                    None => value,
                });
            }
        }
        Ok(Attempt::Answered(answer))
    }

    /// The whole record: folded data, or a contract-backed schema.
    pub(crate) fn materialize(self: &Rc<Self>, scope: &Scope) -> EvalResult<Value> {
        if scope.is_schema() {
            let contract: ObjectContract = Rc::new(RecordContract::new(Rc::clone(self), scope));
            return Ok(Value::schema(TypeSchema::object(contract)));
        }
        self.fold(scope)
    }

    /// Unify every field's contribution into one value.
    ///
    /// Independent field failures are collected and reported together.
    #[tracing::instrument(level = "debug", skip_all, fields(path = %scope.path()))]
    fn fold(&self, scope: &Scope) -> EvalResult<Value> {
        let mut result: Option<Value> = None;
        let mut errors: Vec<EvalError> = Vec::new();
        for (index, field) in self.record.fields.iter().enumerate() {
            let merged = self
                .contribution(index, field, scope)
                .and_then(|contribution| match (&result, contribution) {
                    (_, None) => Ok(None),
                    (None, Some(value)) => Ok(Some(value)),
                    (Some(previous), Some(value)) => merge(previous, &value).map(Some),
                });
            match merged {
                Ok(Some(value)) => result = Some(value),
                Ok(None) => {}
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => errors.push(err.at(&field.pos)),
            }
        }
        if !errors.is_empty() {
            return Err(EvalError::join(errors));
        }
        let value = result.unwrap_or_else(Value::empty_object);
        self.apply_match_fields(value, scope)
    }

    fn contribution(&self, index: usize, field: &Field, scope: &Scope) -> EvalResult<Option<Value>> {
        match &field.kind {
            FieldKind::KeyValue(kv) => {
                let key = match &kv.key {
                    Key::Name(name) => name.clone(),
                    Key::Computed(expr) => match computed_key(expr, scope)? {
                        Ok(key) if self.is_rejected(index, &key) => {
                            return Err(cycle_detected(&key))
                        }
                        Ok(key) => key,
                        Err(reason) => return Err(key_undefined(&reason)),
                    },
                    Key::Match(_) => return Ok(None),
                };
                Ok(evaluate_field(&kv.value, scope, &key)?
                    .map(|value| Value::object_from([(key, value)])))
            }
            FieldKind::Embedded(expr) => {
                let Some(value) = evaluate(expr, scope)? else {
                    return Ok(None);
                };
                if let Value::Object(fields) = &value {
                    if let Some(key) = fields.keys().find(|key| self.is_rejected(index, key)) {
                        return Err(cycle_detected(key));
                    }
                }
                Ok(Some(value))
            }
            FieldKind::Local { .. } | FieldKind::Args(_) | FieldKind::Profiles(_) => Ok(None),
        }
    }

    /// Merge every match field into each produced key its pattern selects.
    fn apply_match_fields(&self, value: Value, scope: &Scope) -> EvalResult<Value> {
        let Value::Object(fields) = &value else {
            return Ok(value);
        };
        let mut fields: ObjectMap = fields.to_owned_inner();
        let mut errors: Vec<EvalError> = Vec::new();
        for field in &self.record.fields {
            let FieldKind::KeyValue(kv) = &field.kind else {
                continue;
            };
            let Key::Match(pattern) = &kv.key else {
                continue;
            };
            let Some(pattern) = evaluate(pattern, scope)? else {
                continue;
            };
            let mut constraint: Option<Option<Value>> = None;
            for (key, current) in &mut fields {
                if !pattern_matches(&pattern, key).map_err(|e| e.at(&field.pos))? {
                    continue;
                }
                if constraint.is_none() {
                    constraint = Some(evaluate(&kv.value, scope).map_err(|e| e.at(&field.pos))?);
                }
                let Some(Some(schema)) = &constraint else {
                    continue;
                };
                match merge(schema, current) {
                    Ok(merged) => *current = merged,
                    Err(err) if err.is_fatal() => return Err(err),
                    Err(err) => errors.push(schema_violation(key, &scope.path(), err).at(&field.pos)),
                }
            }
        }
        if errors.is_empty() {
            Ok(Value::object(fields))
        } else {
            Err(EvalError::join(errors))
        }
    }
}

/// Evaluate a computed key. `Err` carries the reason it is undefined.
pub(crate) fn computed_key(expr: &ExprRef, scope: &Scope) -> EvalResult<Result<String, String>> {
    match evaluate(expr, scope)? {
        None => Ok(Err("key produced no value".to_string())),
        Some(Value::Undefined(reason)) => Ok(Err(reason.to_string())),
        Some(Value::String(key)) => Ok(Ok(key.to_string())),
        Some(number @ Value::Number(_)) => number.to_text().map(Ok),
        Some(other) => Err(unsupported_operation("computed key", other.kind())),
    }
}

/// What an embedded value says about `key`.
fn embedded_answer(
    value: &Value,
    key: &str,
    query: Query,
    schema_mode: bool,
) -> EvalResult<Option<Value>> {
    match value {
        Value::Object(fields) => Ok(fields.get(key).cloned()),
        Value::Schema(schema) => match (&schema.object, query) {
            (Some(contract), Query::Field) => contract.lookup_field(key),
            (Some(_), Query::Scope) => ops::lookup(value, key),
            (None, _) if matches!(schema.kind, Kind::Object | Kind::Union) => Ok(None),
            (None, _) => Err(type_mismatch(Kind::Object, schema.kind, value.to_string())),
        },
        other if schema_mode => Err(type_mismatch(Kind::Object, other.kind(), other.to_string())),
        _ => Ok(None),
    }
}
