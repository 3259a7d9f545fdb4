//! Function, lambda and call nodes.

use super::{ExprRef, StructRef};
use crate::{Comments, Position};

/// `function { args: {...}, profiles: {...}, return: ... }`.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionDef {
    pub body: StructRef,
    /// Schema the result must unify with.
    pub return_type: Option<ExprRef>,
    /// Return the whole body value instead of its `return` key.
    pub returns_body: bool,
    /// Bind each argument by name directly in the body scope.
    pub unscoped_args: bool,
    pub pos: Position,
    pub comments: Comments,
}

impl FunctionDef {
    pub fn new(body: StructRef) -> Self {
        FunctionDef {
            body,
            return_type: None,
            returns_body: false,
            unscoped_args: false,
            pos: Position::DUMMY,
            comments: Comments::default(),
        }
    }
}

/// `lambda a, b: expr`.
#[derive(Clone, Debug, PartialEq)]
pub struct LambdaDef {
    pub params: Vec<String>,
    pub body: ExprRef,
    pub pos: Position,
}

/// One argument at a call site. Named arguments are gathered into a single
/// object argument by the evaluator.
#[derive(Clone, Debug, PartialEq)]
pub struct CallArg {
    pub name: Option<String>,
    pub value: ExprRef,
}
