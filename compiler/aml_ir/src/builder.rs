//! Terse constructors for expression trees.
//!
//! Front ends lower their syntax trees through these helpers; tests use them
//! to write documents without a parser. Every node gets [`Position::DUMMY`]
//! unless built with [`at`].

use std::sync::Arc;

use crate::ast::{
    BinaryOp, CallArg, Expr, ExprKind, ExprRef, Field, FieldKind, ForExpr, FunctionDef, IfExpr,
    InterpolationPart, Key, KeyValue, LambdaDef, Struct, StructRef, UnaryOp,
};
use crate::{Comments, Position};

#[inline]
fn node(kind: ExprKind) -> ExprRef {
    Arc::new(Expr::new(kind, Position::DUMMY))
}

/// Rebuild `expr` with a position.
pub fn at(expr: &ExprRef, pos: Position) -> ExprRef {
    Arc::new(Expr {
        kind: expr.kind.clone(),
        pos,
        comments: expr.comments.clone(),
    })
}

// Literals

pub fn null() -> ExprRef {
    node(ExprKind::Null)
}

pub fn boolean(value: bool) -> ExprRef {
    node(ExprKind::Bool(value))
}

pub fn number(literal: impl Into<String>) -> ExprRef {
    node(ExprKind::Number(literal.into()))
}

pub fn int(value: i64) -> ExprRef {
    number(value.to_string())
}

pub fn string(value: impl Into<String>) -> ExprRef {
    node(ExprKind::String(value.into()))
}

pub fn interpolation(parts: Vec<InterpolationPart>) -> ExprRef {
    node(ExprKind::Interpolation(parts))
}

pub fn text(value: impl Into<String>) -> InterpolationPart {
    InterpolationPart::Text(value.into())
}

pub fn part(expr: ExprRef) -> InterpolationPart {
    InterpolationPart::Expr(expr)
}

pub fn array(items: Vec<ExprRef>) -> ExprRef {
    node(ExprKind::Array(items))
}

pub fn record(fields: Vec<Field>) -> ExprRef {
    node(ExprKind::Record(structure(fields)))
}

pub fn structure(fields: Vec<Field>) -> StructRef {
    Arc::new(Struct::new(fields))
}

// Names and access

pub fn ident(name: impl Into<String>) -> ExprRef {
    node(ExprKind::Ident(name.into()))
}

/// The `$` identifier.
pub fn root() -> ExprRef {
    ident("$")
}

pub fn select(base: ExprRef, key: impl Into<String>) -> ExprRef {
    node(ExprKind::Selector {
        base,
        key: key.into(),
    })
}

/// `a.b.c` from a dotted path.
pub fn path(dotted: &str) -> ExprRef {
    let mut segments = dotted.split('.');
    let first = segments.next().unwrap_or_default();
    segments.fold(ident(first), select)
}

pub fn index(base: ExprRef, index: ExprRef) -> ExprRef {
    node(ExprKind::Index { base, index })
}

pub fn slice(base: ExprRef, start: Option<ExprRef>, end: Option<ExprRef>) -> ExprRef {
    node(ExprKind::Slice { base, start, end })
}

// Operators

pub fn binary(op: BinaryOp, left: ExprRef, right: ExprRef) -> ExprRef {
    node(ExprKind::Binary { op, left, right })
}

pub fn unary(op: UnaryOp, operand: ExprRef) -> ExprRef {
    node(ExprKind::Unary { op, operand })
}

pub fn add(left: ExprRef, right: ExprRef) -> ExprRef {
    binary(BinaryOp::Add, left, right)
}

pub fn union(left: ExprRef, right: ExprRef) -> ExprRef {
    binary(BinaryOp::Union, left, right)
}

pub fn call(func: ExprRef, args: Vec<CallArg>) -> ExprRef {
    node(ExprKind::Call { func, args })
}

pub fn arg(value: ExprRef) -> CallArg {
    CallArg { name: None, value }
}

pub fn named(name: impl Into<String>, value: ExprRef) -> CallArg {
    CallArg {
        name: Some(name.into()),
        value,
    }
}

// Comprehensions

pub fn if_then(condition: ExprRef, then_branch: ExprRef, else_branch: Option<ExprRef>) -> ExprRef {
    node(ExprKind::If(IfExpr {
        condition,
        then_branch,
        else_branch,
    }))
}

/// `for` collecting into an array.
pub fn for_list(
    key: Option<&str>,
    value: Option<&str>,
    collection: ExprRef,
    body: ExprRef,
) -> ExprRef {
    for_expr(key, value, collection, body, false)
}

/// `for` in declaration position, unifying the emitted objects.
pub fn for_merge(
    key: Option<&str>,
    value: Option<&str>,
    collection: ExprRef,
    body: ExprRef,
) -> ExprRef {
    for_expr(key, value, collection, body, true)
}

fn for_expr(
    key: Option<&str>,
    value: Option<&str>,
    collection: ExprRef,
    body: ExprRef,
    merge: bool,
) -> ExprRef {
    node(ExprKind::For(ForExpr {
        key: key.map(str::to_string),
        value: value.map(str::to_string),
        collection,
        body,
        merge,
    }))
}

// Schemas and functions

pub fn default(value: ExprRef) -> ExprRef {
    node(ExprKind::Default(value))
}

pub fn schema(value: ExprRef) -> ExprRef {
    node(ExprKind::Schema(value))
}

/// A function whose body is `fields`; the result is the body's `return` key.
pub fn function(fields: Vec<Field>) -> ExprRef {
    function_def(FunctionDef::new(structure(fields)))
}

pub fn function_def(def: FunctionDef) -> ExprRef {
    node(ExprKind::Function(Arc::new(def)))
}

pub fn lambda(params: &[&str], body: ExprRef) -> ExprRef {
    node(ExprKind::Lambda(Arc::new(LambdaDef {
        params: params.iter().map(|p| (*p).to_string()).collect(),
        body,
        pos: Position::DUMMY,
    })))
}

// Fields

fn make_field(kind: FieldKind) -> Field {
    Field {
        kind,
        pos: Position::DUMMY,
        comments: Comments::default(),
    }
}

pub fn field(name: impl Into<String>, value: ExprRef) -> Field {
    key_value(Key::Name(name.into()), value, false)
}

pub fn optional(name: impl Into<String>, value: ExprRef) -> Field {
    key_value(Key::Name(name.into()), value, true)
}

pub fn computed(key: ExprRef, value: ExprRef) -> Field {
    key_value(Key::Computed(key), value, false)
}

pub fn match_field(pattern: ExprRef, value: ExprRef) -> Field {
    key_value(Key::Match(pattern), value, true)
}

fn key_value(key: Key, value: ExprRef, optional: bool) -> Field {
    make_field(FieldKind::KeyValue(KeyValue {
        key,
        value,
        optional,
    }))
}

pub fn local(name: impl Into<String>, value: ExprRef) -> Field {
    make_field(FieldKind::Local {
        name: name.into(),
        value,
    })
}

pub fn embed(value: ExprRef) -> Field {
    make_field(FieldKind::Embedded(value))
}

pub fn args(schema: ExprRef) -> Field {
    make_field(FieldKind::Args(schema))
}

pub fn profiles(overlays: ExprRef) -> Field {
    make_field(FieldKind::Profiles(overlays))
}

/// Attach leading comment lines to a field.
pub fn documented(mut field: Field, lines: &[&str]) -> Field {
    field.comments = Comments::new(lines.iter().copied());
    field
}
