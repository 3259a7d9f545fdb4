//! Constraint checkers attached to a schema.

use std::fmt;

use aml_ir::BinaryOp;

use crate::errors::{constraint_violation, EvalResult};
use crate::ops;
use crate::value::Value;

/// A predicate every value accepted by a schema must satisfy.
#[derive(Clone, Debug)]
pub enum Constraint {
    /// `value <op> operand`, e.g. `> 10` or `=~ "^web-"`.
    Compare { op: BinaryOp, operand: Value },
    /// The number must be representable as an integer.
    Integer,
}

impl Constraint {
    pub fn compare(op: BinaryOp, operand: Value) -> Self {
        Constraint::Compare { op, operand }
    }

    /// Check `value`. An undefined verdict passes: it cannot be decided yet.
    pub fn check(&self, value: &Value) -> EvalResult<()> {
        let holds = match self {
            Constraint::Compare { op, operand } => match ops::binary(value, *op, operand)? {
                Value::Bool(b) => b,
                Value::Undefined(_) => true,
                _ => false,
            },
            Constraint::Integer => value.as_number().is_some_and(|n| n.is_integer()),
        };
        if holds {
            Ok(())
        } else {
            Err(constraint_violation(self.to_string(), value.to_string()))
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Compare { op, operand } => write!(f, "{op} {operand}"),
            Constraint::Integer => f.write_str("int"),
        }
    }
}
