//! Schema description export.
//!
//! Walks a schema into a plain, serializable tree for argument help and
//! JSON-Schema-like summaries. Object contracts already visited (by path)
//! become references, which keeps self-referential schemas finite.

use rustc_hash::FxHashSet;
use serde::Serialize;

use super::{ObjectContract, TypeSchema};
use crate::errors::{unsupported_operation, EvalResult};
use crate::kind::Kind;
use crate::value::{NativeValue, Value};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ObjectDescription {
    pub path: String,
    /// Set when this object was already described elsewhere in the tree.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    pub allow_new_keys: bool,
    pub fields: Vec<FieldDescription>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FieldDescription {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub optional: bool,
    pub pattern: bool,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FieldType {
    pub kind: Kind,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<NativeValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object: Option<ObjectDescription>,
    /// Alternatives every element must match.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<FieldType>,
    /// Further alternatives from array schemas combined with `&`; an
    /// element must also match one of each.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub and_items: Vec<Vec<FieldType>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alternates: Vec<FieldType>,
}

impl FieldType {
    fn of_kind(kind: Kind) -> Self {
        FieldType {
            kind,
            constraints: Vec::new(),
            default: None,
            object: None,
            items: Vec::new(),
            and_items: Vec::new(),
            alternates: Vec::new(),
        }
    }
}

/// Describe the fields of an object schema (or a plain object).
pub fn describe_object(value: &Value) -> EvalResult<ObjectDescription> {
    Describer::default().object(value)
}

/// Describe any schema or value as a field type.
pub fn describe_field_type(value: &Value) -> EvalResult<FieldType> {
    Describer::default().field_type(value)
}

#[derive(Default)]
struct Describer {
    visited: FxHashSet<String>,
}

impl Describer {
    fn object(&mut self, value: &Value) -> EvalResult<ObjectDescription> {
        match value {
            Value::Schema(schema) => match object_contract(schema) {
                Some(contract) => self.contract(&contract),
                None => Ok(empty_description(schema.kind == Kind::Union)),
            },
            Value::Object(fields) => Ok(ObjectDescription {
                path: String::new(),
                reference: None,
                allow_new_keys: false,
                fields: fields
                    .iter()
                    .map(|(name, item)| {
                        Ok(FieldDescription {
                            name: name.clone(),
                            description: String::new(),
                            optional: false,
                            pattern: false,
                            field_type: self.field_type(item)?,
                        })
                    })
                    .collect::<EvalResult<_>>()?,
            }),
            Value::Undefined(_) => Ok(empty_description(false)),
            other => Err(unsupported_operation("describe", other.kind())),
        }
    }

    fn contract(&mut self, contract: &ObjectContract) -> EvalResult<ObjectDescription> {
        let path = contract.path();
        if !path.is_empty() && !self.visited.insert(path.clone()) {
            return Ok(ObjectDescription {
                reference: Some(path.clone()),
                path,
                allow_new_keys: contract.allow_new_keys(),
                fields: Vec::new(),
            });
        }
        let mut fields = Vec::new();
        for field in contract.fields()? {
            fields.push(FieldDescription {
                field_type: self.field_type(&field.schema)?,
                name: field.key,
                description: field.description,
                optional: field.optional,
                pattern: field.pattern,
            });
        }
        Ok(ObjectDescription {
            path,
            reference: None,
            allow_new_keys: contract.allow_new_keys(),
            fields,
        })
    }

    fn field_type(&mut self, value: &Value) -> EvalResult<FieldType> {
        let Value::Schema(schema) = value else {
            let mut described = FieldType::of_kind(value.kind());
            described.default = value.to_native().ok();
            if let Value::Object(_) = value {
                described.object = Some(self.object(value)?);
            }
            return Ok(described);
        };
        let mut described = FieldType::of_kind(schema.kind);
        described.constraints = schema.constraints.iter().map(ToString::to_string).collect();
        described.default = schema
            .default_value()
            .and_then(|default| default.to_native().ok());
        if let Some(contract) = &schema.object {
            described.object = Some(self.contract(contract)?);
        }
        if let Some(array) = &schema.array {
            let mut layers = array.layers();
            if let Some(first) = layers.next() {
                described.items = self.field_types(first)?;
            }
            for layer in layers {
                let layer = self.field_types(layer)?;
                described.and_items.push(layer);
            }
        }
        for alternate in &schema.alternates {
            let alternate = Value::schema(alternate.clone());
            described.alternates.push(self.field_type(&alternate)?);
        }
        Ok(described)
    }
}

impl Describer {
    fn field_types(&mut self, values: &[Value]) -> EvalResult<Vec<FieldType>> {
        values.iter().map(|value| self.field_type(value)).collect()
    }
}

/// The object contract of a schema, looking through a union.
fn object_contract(schema: &TypeSchema) -> Option<ObjectContract> {
    schema
        .object
        .clone()
        .or_else(|| schema.alternates.iter().find_map(object_contract))
}

fn empty_description(allow_new_keys: bool) -> ObjectDescription {
    ObjectDescription {
        path: String::new(),
        reference: None,
        allow_new_keys,
        fields: Vec::new(),
    }
}
