//! Call sites and function values.

use std::rc::Rc;
use std::sync::Arc;

use aml_ir::{CallArg, Expr, ExprKind, FunctionDef, LambdaDef};
use aml_value::{call, ops, CallArgument, EvalResult, ObjectMap, Value};

use super::evaluate_value;
use crate::function::{Function, Lambda};
use crate::scope::Scope;

pub(super) fn function_value(def: &Arc<FunctionDef>, scope: &Scope) -> Value {
    Value::func(Rc::new(Function::new(Arc::clone(def), scope)))
}

pub(super) fn lambda_value(def: &Arc<LambdaDef>, scope: &Scope) -> Value {
    Value::func(Rc::new(Lambda::new(Arc::clone(def), scope)))
}

/// `f(a, b, name: c)`.
///
/// Named arguments are gathered into one object argument. A callee selected
/// from an object (`obj.method(...)`) receives that object as `self`.
#[tracing::instrument(level = "trace", skip_all)]
pub(super) fn evaluate_call(
    func: &Expr,
    args: &[CallArg],
    scope: &Scope,
) -> EvalResult<Option<Value>> {
    let (callee, receiver) = match &func.kind {
        ExprKind::Selector { base, key } if !is_document(base) => {
            let receiver = evaluate_value(base, scope)?;
            let callee = ops::lookup(&receiver, key)?.unwrap_or_else(|| Value::missing(key));
            (callee, Some(receiver))
        }
        _ => (evaluate_value(func, scope)?, None),
    };
    if callee.is_undefined() {
        return Ok(Some(callee));
    }

    let mut arguments = Vec::with_capacity(args.len() + 1);
    let mut named = ObjectMap::default();
    for arg in args {
        let value = evaluate_value(&arg.value, scope)?;
        if value.is_undefined() {
            return Ok(Some(value));
        }
        match &arg.name {
            Some(name) => {
                named.insert(name.clone(), value);
            }
            None => arguments.push(CallArgument::positional(value)),
        }
    }
    if !named.is_empty() {
        arguments.push(CallArgument::named(Value::object(named)));
    }
    if let Some(receiver) = receiver {
        arguments.push(CallArgument::self_value(receiver));
    }
    call(&callee, &scope.context(), arguments)
}

fn is_document(expr: &Expr) -> bool {
    matches!(&expr.kind, ExprKind::Ident(name) if name == "$")
}
