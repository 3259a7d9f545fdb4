//! Record schemas as lazy object contracts.

use std::rc::Rc;

use aml_ir::{Field, FieldKind, Key};
use aml_value::schema::{pattern_matches, Contract, ContractField};
use aml_value::{merge, type_mismatch, EvalResult, Kind, Value};

use super::{computed_key, Query, RecordSource};
use crate::eval::{evaluate, evaluate_field};
use crate::scope::Scope;

/// The contract of a record evaluated in schema mode.
///
/// Field schemas are evaluated in the record's own frame, on demand.
#[derive(Debug)]
pub(crate) struct RecordContract {
    source: Rc<RecordSource>,
    scope: Scope,
    path: String,
    allow_new_keys: bool,
}

impl RecordContract {
    pub(crate) fn new(source: Rc<RecordSource>, scope: &Scope) -> Self {
        RecordContract {
            source,
            scope: scope.clone(),
            path: scope.path(),
            allow_new_keys: scope.allow_new_keys(),
        }
    }

    fn keys(&self, include_optional: bool) -> EvalResult<Vec<String>> {
        let scope = &self.scope;
        let mut keys: Vec<String> = Vec::new();
        let mut add = |key: String| {
            if !keys.contains(&key) {
                keys.push(key);
            }
        };
        for field in &self.source.record().fields {
            match &field.kind {
                FieldKind::KeyValue(kv) if kv.optional && !include_optional => {}
                FieldKind::KeyValue(kv) => match &kv.key {
                    Key::Name(name) => add(name.clone()),
                    Key::Computed(expr) => {
                        if let Ok(key) = computed_key(expr, scope).map_err(|e| e.at(&field.pos))? {
                            add(key);
                        }
                    }
                    Key::Match(_) => {}
                },
                FieldKind::Embedded(expr) => {
                    let embedded = match evaluate(expr, scope).map_err(|e| e.at(&field.pos))? {
                        Some(Value::Object(fields)) => fields.keys().cloned().collect(),
                        Some(Value::Schema(schema)) => match &schema.object {
                            Some(contract) if include_optional => contract.all_keys()?,
                            Some(contract) => contract.required_keys()?,
                            None => Vec::new(),
                        },
                        _ => Vec::new(),
                    };
                    embedded.into_iter().for_each(&mut add);
                }
                FieldKind::Local { .. } | FieldKind::Args(_) | FieldKind::Profiles(_) => {}
            }
        }
        Ok(keys)
    }

    fn field_entries(&self, field: &Field, scope: &Scope) -> EvalResult<Vec<ContractField>> {
        let description = field.comments.description();
        let entry = |key: String, schema: Value, optional: bool, pattern: bool| ContractField {
            key,
            schema,
            optional,
            pattern,
            description: description.clone(),
        };
        match &field.kind {
            FieldKind::KeyValue(kv) => {
                let (key, pattern) = match &kv.key {
                    Key::Name(name) => (name.clone(), false),
                    Key::Computed(expr) => match computed_key(expr, scope)? {
                        Ok(key) => (key, false),
                        Err(_) => return Ok(Vec::new()),
                    },
                    Key::Match(expr) => match evaluate(expr, scope)? {
                        Some(Value::String(text)) => (text.to_string(), true),
                        Some(other) => (other.to_string(), true),
                        None => return Ok(Vec::new()),
                    },
                };
                let Some(schema) = evaluate_field(&kv.value, scope, &key)? else {
                    return Ok(Vec::new());
                };
                Ok(vec![entry(key, schema, kv.optional || pattern, pattern)])
            }
            FieldKind::Embedded(expr) => match evaluate(expr, scope)? {
                Some(Value::Schema(schema)) => match &schema.object {
                    Some(contract) => contract.fields(),
                    None if matches!(schema.kind, Kind::Object | Kind::Union) => Ok(Vec::new()),
                    None => Err(type_mismatch(Kind::Object, schema.kind, schema.to_string())),
                },
                Some(Value::Object(fields)) => Ok(fields
                    .iter()
                    .map(|(key, value)| entry(key.clone(), value.clone(), false, false))
                    .collect()),
                Some(other) if !other.is_undefined() => {
                    Err(type_mismatch(Kind::Object, other.kind(), other.to_string()))
                }
                _ => Ok(Vec::new()),
            },
            FieldKind::Local { .. } | FieldKind::Args(_) | FieldKind::Profiles(_) => {
                Ok(Vec::new())
            }
        }
    }
}

impl Contract for RecordContract {
    fn path(&self) -> String {
        self.path.clone()
    }

    fn allow_new_keys(&self) -> bool {
        self.allow_new_keys
    }

    fn lookup_field(&self, key: &str) -> EvalResult<Option<Value>> {
        self.source.lookup_with(&self.scope, key, Query::Field)
    }

    fn lookup_match(&self, key: &str) -> EvalResult<Option<Value>> {
        let scope = &self.scope;
        let mut answer: Option<Value> = None;
        for field in &self.source.record().fields {
            let found = match &field.kind {
                FieldKind::KeyValue(kv) => {
                    let Key::Match(pattern) = &kv.key else {
                        continue;
                    };
                    let Some(pattern) = evaluate(pattern, scope)? else {
                        continue;
                    };
                    if !pattern_matches(&pattern, key).map_err(|e| e.at(&field.pos))? {
                        continue;
                    }
                    evaluate(&kv.value, scope).map_err(|e| e.at(&field.pos))?
                }
                FieldKind::Embedded(expr) => match evaluate(expr, scope)? {
                    Some(Value::Schema(schema)) => match &schema.object {
                        Some(contract) => contract.lookup_match(key)?,
                        None => None,
                    },
                    _ => None,
                },
                _ => continue,
            };
            if let Some(value) = found {
                answer = Some(match answer {
                    Some(previous) => merge(&previous, &value)?,
                    None => value,
                });
            }
        }
        Ok(answer)
    }

    fn required_keys(&self) -> EvalResult<Vec<String>> {
        self.keys(false)
    }

    fn all_keys(&self) -> EvalResult<Vec<String>> {
        self.keys(true)
    }

    fn fields(&self) -> EvalResult<Vec<ContractField>> {
        let scope = &self.scope;
        let mut fields = Vec::new();
        for field in &self.source.record().fields {
            fields.extend(self.field_entries(field, scope).map_err(|e| e.at(&field.pos))?);
        }
        Ok(fields)
    }
}
