//! The call capability.
//!
//! Function values are implemented by the evaluator; this crate only defines
//! the seam so values, schemas and built-ins can hold and invoke them.

use std::fmt;

use crate::context::ExecContext;
use crate::errors::{not_callable, EvalResult};
use crate::value::Value;

/// One supplied argument.
#[derive(Clone, Debug, PartialEq)]
pub struct CallArgument {
    /// Bound to the next declared argument name.
    pub positional: bool,
    /// The object a method was selected from.
    pub self_arg: bool,
    pub value: Value,
}

impl CallArgument {
    pub fn positional(value: Value) -> Self {
        CallArgument {
            positional: true,
            self_arg: false,
            value,
        }
    }

    /// An object of named arguments.
    pub fn named(value: Value) -> Self {
        CallArgument {
            positional: false,
            self_arg: false,
            value,
        }
    }

    pub fn self_value(value: Value) -> Self {
        CallArgument {
            positional: false,
            self_arg: true,
            value,
        }
    }
}

/// A callable value.
///
/// `Ok(None)` means the call produced nothing (the body was not ok), which
/// callers treat like an excluded field rather than an error.
pub trait Callable: fmt::Debug {
    fn call(&self, ctx: &ExecContext, args: Vec<CallArgument>) -> EvalResult<Option<Value>>;

    /// Declared argument names, in positional order.
    fn arg_names(&self) -> EvalResult<Vec<String>> {
        Ok(Vec::new())
    }

    /// The schema arguments are unified with, if declared.
    fn args_schema(&self) -> EvalResult<Option<Value>> {
        Ok(None)
    }
}

/// Call `value` if it is a function. Undefined propagates.
pub fn call(value: &Value, ctx: &ExecContext, args: Vec<CallArgument>) -> EvalResult<Option<Value>> {
    match value {
        Value::Undefined(_) => Ok(Some(value.clone())),
        Value::Func(func) => func.call(ctx, args),
        other => Err(not_callable(other.kind())),
    }
}
