//! AML IR - the expression tree consumed by the evaluator.
//!
//! This crate contains the node types produced by the (external) front end:
//! - Positions for diagnostics
//! - Leading comments (used as schema field descriptions)
//! - Operators
//! - Expression, record, field, comprehension and function nodes
//!
//! # Design Philosophy
//!
//! - **Shared, not copied**: child nodes are `Arc<Expr>` so closures and lazy
//!   record contracts can retain the subtrees they need after evaluation.
//! - **No syntax**: the tree carries no token or layout information beyond
//!   positions and comments.
//!
//! The [`builder`] module offers terse constructors used by front ends and tests.

pub mod ast;
pub mod builder;
mod comment;
mod position;

pub use ast::{
    BinaryOp, CallArg, Expr, ExprKind, ExprRef, Field, FieldKind, ForExpr, FunctionDef, IfExpr,
    InterpolationPart, Key, KeyValue, LambdaDef, Struct, StructRef, UnaryOp,
};
pub use comment::Comments;
pub use position::Position;
