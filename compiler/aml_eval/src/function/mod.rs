//! Function and lambda values.
//!
//! A function closes over the frame it was defined in and evaluates its body
//! record in a fresh frame rooted there on every call:
//!
//! 1. positional arguments bind to the declared argument names in order,
//!    named arguments bind by name, a method receiver binds as `self`
//! 2. requested profiles overlay each other in order, and the explicit
//!    arguments overlay the result
//! 3. the combined arguments unify with the `args` schema
//!    (failure: invalid arguments)
//! 4. the body is evaluated with `args` and `self` bound; its `return` key
//!    (or the whole body) is the result
//! 5. a declared return type unifies with the result
//!    (failure: invalid return value)

mod guard;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use aml_ir::{FunctionDef, LambdaDef};
use aml_value::{
    invalid_arguments, invalid_return_value, merge, ops, overlay, too_many_arguments,
    type_mismatch, unknown_profile, CallArgument, Callable, CancelPoint, EvalResult, ExecContext,
    Kind, ObjectMap, Value,
};

use guard::CallDepthGuard;

use crate::eval::{evaluate, evaluate_schema, evaluate_value};
use crate::record::RecordSource;
use crate::scope::{LookupSource, Scope, ScopeOptions};

/// Name of the named argument selecting profiles.
const PROFILES_ARG: &str = "profiles";

/// A `function { ... }` value.
pub struct Function {
    def: Arc<FunctionDef>,
    scope: Scope,
    /// Argument schema, evaluated on first use.
    args_schema: RefCell<Option<Option<Value>>>,
}

impl Function {
    pub(crate) fn new(def: Arc<FunctionDef>, scope: &Scope) -> Self {
        Function {
            def,
            scope: scope.clone(),
            args_schema: RefCell::new(None),
        }
    }

    fn schema(&self) -> EvalResult<Option<Value>> {
        if let Some(schema) = self.args_schema.borrow().as_ref() {
            return Ok(schema.clone());
        }
        let schema = match self.def.body.args_field() {
            Some(expr) => {
                let frame = self.scope.push(
                    LookupSource::Empty,
                    ScopeOptions::new().schema(true).default_mode(false).path("args"),
                )?;
                Some(evaluate_value(expr, &frame)?)
            }
            None => None,
        };
        *self.args_schema.borrow_mut() = Some(schema.clone());
        Ok(schema)
    }

    /// The declared profiles, as data.
    fn profiles(&self, scope: &Scope) -> EvalResult<Value> {
        let Some(expr) = self.def.body.profiles_field() else {
            return Ok(Value::empty_object());
        };
        let frame = scope.push(
            LookupSource::Empty,
            ScopeOptions::new().default_mode(true).path(PROFILES_ARG),
        )?;
        evaluate_value(expr, &frame)
    }

    /// Layer the requested profiles beneath `explicit`.
    fn apply_profiles(&self, scope: &Scope, requested: &Value, explicit: Value) -> EvalResult<Value> {
        let Some(names) = requested.as_array() else {
            return Err(type_mismatch(Kind::Array, requested.kind(), requested.to_string()));
        };
        let declared = self.profiles(scope)?;
        let mut base = Value::empty_object();
        for name in names {
            let Some(name) = name.as_str() else {
                return Err(type_mismatch(Kind::String, name.kind(), name.to_string()));
            };
            let (name, optional) = match name.strip_suffix('?') {
                Some(stripped) => (stripped, true),
                None => (name, false),
            };
            match ops::lookup(&declared, name)? {
                Some(profile) if !profile.is_undefined() => {
                    trace!(profile = name, "applying profile");
                    base = overlay(&base, &profile);
                }
                _ if optional => debug!(profile = name, "optional profile not declared"),
                _ => return Err(unknown_profile(name)),
            }
        }
        Ok(overlay(&base, &explicit))
    }

    /// Bind the supplied arguments by name.
    fn bind(
        &self,
        names: &[String],
        args: Vec<CallArgument>,
    ) -> EvalResult<(ObjectMap, Option<Value>)> {
        let mut bound = ObjectMap::default();
        let mut receiver = None;
        let mut positional = names.iter();
        let supplied = args.iter().filter(|a| a.positional).count();
        for arg in args {
            if arg.self_arg {
                receiver = Some(arg.value);
            } else if arg.positional {
                let Some(name) = positional.next() else {
                    return Err(too_many_arguments(names.len(), supplied));
                };
                bind_one(&mut bound, name, arg.value)?;
            } else if let Value::Object(fields) = &arg.value {
                for (name, value) in fields.iter() {
                    bind_one(&mut bound, name, value.clone())?;
                }
            } else {
                return Err(type_mismatch(Kind::Object, arg.value.kind(), arg.value.to_string()));
            }
        }
        Ok((bound, receiver))
    }
}

fn bind_one(bound: &mut ObjectMap, name: &str, value: Value) -> EvalResult<()> {
    let value = match bound.get(name) {
        Some(existing) => merge(existing, &value)?,
        None => value,
    };
    bound.insert(name.to_string(), value);
    Ok(())
}

impl Callable for Function {
    #[tracing::instrument(level = "debug", skip_all)]
    fn call(&self, ctx: &ExecContext, args: Vec<CallArgument>) -> EvalResult<Option<Value>> {
        ctx.check(CancelPoint::Call)?;
        let _depth = CallDepthGuard::enter(ctx.call_depth())?;
        let scope = &self.scope;

        let schema = self.schema()?;
        let names = match &schema {
            Some(schema) => ops::keys(schema)?,
            None => Vec::new(),
        };
        let (mut bound, receiver) = self.bind(&names, args)?;

        let requested = if self.def.body.profiles_field().is_some() {
            bound.shift_remove(PROFILES_ARG)
        } else {
            None
        };
        let explicit = Value::object(bound);
        let combined = match &requested {
            Some(requested) => self
                .apply_profiles(scope, requested, explicit)
                .map_err(invalid_arguments)?,
            None => explicit,
        };
        let validated = match &schema {
            Some(schema) => merge(schema, &combined).map_err(invalid_arguments)?,
            None => combined,
        };

        let mut bindings = FxHashMap::default();
        bindings.insert("args".to_string(), validated.clone());
        if let Some(receiver) = receiver {
            bindings.insert("self".to_string(), receiver);
        }
        let mut frame = scope.push(
            LookupSource::Bindings(bindings),
            ScopeOptions::new()
                .call()
                .schema(false)
                .default_mode(false)
                .context(ctx.clone()),
        )?;
        if self.def.unscoped_args {
            frame = frame.push(LookupSource::Data(validated), ScopeOptions::new())?;
        }

        let body = Rc::new(RecordSource::new(Arc::clone(&self.def.body)));
        let body_frame = frame.push(LookupSource::Record(Rc::clone(&body)), ScopeOptions::new())?;
        let result = if self.def.returns_body {
            Some(body.materialize(&body_frame)?)
        } else {
            body_frame.get_local("return")?
        };

        match (&self.def.return_type, result) {
            (Some(return_type), Some(result)) if !result.is_undefined() => {
                let expected = evaluate_schema(return_type, &frame)?;
                merge(&expected, &result)
                    .map(Some)
                    .map_err(invalid_return_value)
            }
            (_, result) => Ok(result),
        }
    }

    fn arg_names(&self) -> EvalResult<Vec<String>> {
        match self.schema()? {
            Some(schema) => ops::keys(&schema),
            None => Ok(Vec::new()),
        }
    }

    fn args_schema(&self) -> EvalResult<Option<Value>> {
        self.schema()
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("returns_body", &self.def.returns_body)
            .field("pos", &self.def.pos)
            .finish_non_exhaustive()
    }
}

/// A `lambda a, b: expr` value.
pub struct Lambda {
    def: Arc<LambdaDef>,
    scope: Scope,
}

impl Lambda {
    pub(crate) fn new(def: Arc<LambdaDef>, scope: &Scope) -> Self {
        Lambda {
            def,
            scope: scope.clone(),
        }
    }
}

impl Callable for Lambda {
    fn call(&self, ctx: &ExecContext, args: Vec<CallArgument>) -> EvalResult<Option<Value>> {
        ctx.check(CancelPoint::Call)?;
        let _depth = CallDepthGuard::enter(ctx.call_depth())?;

        let mut bindings = FxHashMap::default();
        let mut params = self.def.params.iter();
        let supplied = args.iter().filter(|a| a.positional).count();
        for arg in args {
            if arg.self_arg {
                bindings.insert("self".to_string(), arg.value);
            } else if arg.positional {
                let Some(param) = params.next() else {
                    return Err(too_many_arguments(self.def.params.len(), supplied));
                };
                bindings.insert(param.clone(), arg.value);
            } else if let Value::Object(fields) = &arg.value {
                for (name, value) in fields.iter() {
                    bindings.insert(name.clone(), value.clone());
                }
            }
        }
        for missing in params {
            bindings.insert(missing.clone(), Value::missing(missing));
        }

        let frame = self.scope.push(
            LookupSource::Bindings(bindings),
            ScopeOptions::new().call().context(ctx.clone()),
        )?;
        evaluate(&self.def.body, &frame)
    }

    fn arg_names(&self) -> EvalResult<Vec<String>> {
        Ok(self.def.params.clone())
    }
}

impl fmt::Debug for Lambda {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lambda")
            .field("params", &self.def.params)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
