//! Records and their fields.

use std::sync::Arc;

use super::ExprRef;
use crate::{Comments, Position};

/// An ordered list of declarative fields.
///
/// Evaluates to an object in data mode and to an object schema in schema mode.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Struct {
    pub fields: Vec<Field>,
    pub pos: Position,
    pub comments: Comments,
}

impl Struct {
    pub fn new(fields: Vec<Field>) -> Self {
        Struct {
            fields,
            pos: Position::DUMMY,
            comments: Comments::default(),
        }
    }

    /// The `args` definition field, if this record is a function body.
    pub fn args_field(&self) -> Option<&ExprRef> {
        self.fields.iter().find_map(|field| match &field.kind {
            FieldKind::Args(expr) => Some(expr),
            _ => None,
        })
    }

    /// The `profiles` definition field, if this record is a function body.
    pub fn profiles_field(&self) -> Option<&ExprRef> {
        self.fields.iter().find_map(|field| match &field.kind {
            FieldKind::Profiles(expr) => Some(expr),
            _ => None,
        })
    }
}

/// Shared record handle.
pub type StructRef = Arc<Struct>;

/// A single declaration inside a record.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub kind: FieldKind,
    pub pos: Position,
    pub comments: Comments,
}

#[derive(Clone, Debug, PartialEq)]
pub enum FieldKind {
    /// `key: value`, `(expr): value`, `match pattern: value`.
    KeyValue(KeyValue),
    /// `let name = value`: visible to siblings, never emitted.
    Local { name: String, value: ExprRef },
    /// A splice of another value's keys, including `for`/`if` comprehensions.
    Embedded(ExprRef),
    /// The argument schema of a function body.
    Args(ExprRef),
    /// Named argument overlays of a function body.
    Profiles(ExprRef),
}

#[derive(Clone, Debug, PartialEq)]
pub struct KeyValue {
    pub key: Key,
    pub value: ExprRef,
    /// `key?: value` in a schema: the key may be absent.
    pub optional: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Key {
    Name(String),
    Computed(ExprRef),
    /// A pattern selecting keys; never answers exact-key lookups.
    Match(ExprRef),
}
