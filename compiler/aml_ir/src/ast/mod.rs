//! Expression tree nodes.

mod function;
mod operators;
mod record;

use std::sync::Arc;

pub use function::{CallArg, FunctionDef, LambdaDef};
pub use operators::{BinaryOp, UnaryOp};
pub use record::{Field, FieldKind, Key, KeyValue, Struct, StructRef};

use crate::{Comments, Position};

/// Shared expression handle.
pub type ExprRef = Arc<Expr>;

/// Expression node.
#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub pos: Position,
    pub comments: Comments,
}

impl Expr {
    #[inline]
    pub fn new(kind: ExprKind, pos: Position) -> Self {
        Expr {
            kind,
            pos,
            comments: Comments::default(),
        }
    }

    #[must_use]
    pub fn with_comments(mut self, comments: Comments) -> Self {
        self.comments = comments;
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    // Literals
    Null,
    Bool(bool),
    /// Decimal literal as written, suffixes included (`2Ki`, `1.5k`).
    Number(String),
    String(String),
    Interpolation(Vec<InterpolationPart>),
    Array(Vec<ExprRef>),
    Record(StructRef),

    // Names and access
    /// An identifier; `$` names the document currently being built.
    Ident(String),
    Selector {
        base: ExprRef,
        key: String,
    },
    Index {
        base: ExprRef,
        index: ExprRef,
    },
    Slice {
        base: ExprRef,
        start: Option<ExprRef>,
        end: Option<ExprRef>,
    },

    // Operators
    Binary {
        op: BinaryOp,
        left: ExprRef,
        right: ExprRef,
    },
    Unary {
        op: UnaryOp,
        operand: ExprRef,
    },
    Call {
        func: ExprRef,
        args: Vec<CallArg>,
    },

    // Comprehensions
    If(IfExpr),
    For(ForExpr),

    /// `*expr`: the default of a schema.
    Default(ExprRef),
    /// `schema expr`: evaluate `expr` as a type description.
    Schema(ExprRef),
    Function(Arc<FunctionDef>),
    Lambda(Arc<LambdaDef>),
}

#[derive(Clone, Debug, PartialEq)]
pub enum InterpolationPart {
    Text(String),
    Expr(ExprRef),
}

/// `if cond { ... } else { ... }`.
#[derive(Clone, Debug, PartialEq)]
pub struct IfExpr {
    pub condition: ExprRef,
    pub then_branch: ExprRef,
    pub else_branch: Option<ExprRef>,
}

/// `for k, v in collection { ... }`.
///
/// In merge form the emitted objects are unified into one object; otherwise
/// the emitted values are collected into an array.
#[derive(Clone, Debug, PartialEq)]
pub struct ForExpr {
    pub key: Option<String>,
    pub value: Option<String>,
    pub collection: ExprRef,
    pub body: ExprRef,
    pub merge: bool,
}
