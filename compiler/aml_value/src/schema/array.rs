//! Array contracts.

use std::rc::Rc;

use crate::errors::{schema_violation, type_mismatch, unmatched_type, EvalError, EvalResult};
use crate::kind::Kind;
use crate::merge::merge;
use crate::value::Value;

/// Element schemas of an array schema.
///
/// Each layer is an ordered list of alternatives: every element must unify
/// with at least one of them. An empty layer accepts any element. Two array
/// schemas combined with AND stack their layers.
#[derive(Clone, Debug)]
pub struct ArrayContract {
    layers: Vec<Rc<[Value]>>,
}

impl ArrayContract {
    pub fn new(items: Vec<Value>) -> Self {
        ArrayContract {
            layers: vec![Rc::from(items)],
        }
    }

    /// The element alternatives of each layer, outermost first.
    pub fn layers(&self) -> impl Iterator<Item = &[Value]> {
        self.layers.iter().map(|layer| &layer[..])
    }

    #[must_use]
    pub fn and(&self, other: &ArrayContract) -> ArrayContract {
        ArrayContract {
            layers: self.layers.iter().chain(&other.layers).cloned().collect(),
        }
    }

    pub fn check(&self, value: &Value) -> EvalResult {
        let Value::Array(elements) = value else {
            return Err(type_mismatch(Kind::Array, value.kind(), value.to_string()));
        };
        let mut result: Vec<Value> = elements.to_owned_inner();
        for layer in &self.layers {
            if layer.is_empty() {
                continue;
            }
            let mut errors: Vec<EvalError> = Vec::new();
            for (i, element) in result.iter_mut().enumerate() {
                match check_element(layer, element) {
                    Ok(checked) => *element = checked,
                    Err(err) => errors.push(schema_violation(&format!("[{i}]"), "", err)),
                }
            }
            if !errors.is_empty() {
                return Err(EvalError::join(errors));
            }
        }
        Ok(Value::array(result))
    }
}

/// The first alternative that accepts `element` wins.
fn check_element(alternatives: &[Value], element: &Value) -> EvalResult {
    let mut failures = Vec::new();
    for alternative in alternatives {
        match merge(alternative, element) {
            Ok(value) => return Ok(value),
            Err(err) => failures.push(err),
        }
    }
    if failures.len() == 1 {
        if let Some(err) = failures.pop() {
            return Err(err);
        }
    }
    Err(unmatched_type(element.to_string(), failures))
}
