//! `EvaluatorBuilder` and the `Evaluator` entry point.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use aml_ir::{Expr, FunctionDef, StructRef};
use aml_value::schema::{describe_object, ObjectDescription};
use aml_value::{CallArgument, Callable, EvalResult, ExecContext, Value};

use crate::builtins::builtins;
use crate::eval::{evaluate, evaluate_schema};
use crate::function::Function;
use crate::scope::Scope;

/// Builder for [`Evaluator`].
///
/// ```text
/// let evaluator = Evaluator::builder().context(ctx).allow_new_keys(true).build();
/// ```
#[must_use]
pub struct EvaluatorBuilder {
    context: ExecContext,
    builtins: bool,
    allow_new_keys: bool,
}

impl EvaluatorBuilder {
    pub fn new() -> Self {
        EvaluatorBuilder {
            context: ExecContext::new(),
            builtins: true,
            allow_new_keys: false,
        }
    }

    /// Use a shared context, e.g. to cancel from another thread.
    ///
    /// The evaluator forks it: cancelling still reaches the evaluator, but
    /// call depth is counted per evaluator.
    pub fn context(mut self, context: ExecContext) -> Self {
        self.context = context;
        self
    }

    /// Bind the core type schemas and `std` in the root frame.
    pub fn builtins(mut self, enabled: bool) -> Self {
        self.builtins = enabled;
        self
    }

    /// Record schemas accept unknown keys unless a frame says otherwise.
    pub fn allow_new_keys(mut self, allow: bool) -> Self {
        self.allow_new_keys = allow;
        self
    }

    pub fn build(self) -> Evaluator {
        let bindings = if self.builtins {
            builtins()
        } else {
            FxHashMap::default()
        };
        debug!(
            builtins = self.builtins,
            allow_new_keys = self.allow_new_keys,
            "evaluator created"
        );
        Evaluator {
            root: Scope::new_root(self.context.fork(), bindings, self.allow_new_keys),
        }
    }
}

impl Default for EvaluatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Evaluates expression trees against one root scope.
///
/// Values that hold functions or record schemas keep the frames they were
/// evaluated in, and stay usable after the evaluator is dropped.
pub struct Evaluator {
    root: Scope,
}

impl Evaluator {
    /// An evaluator with builtins and default options.
    pub fn new() -> Self {
        EvaluatorBuilder::new().build()
    }

    pub fn builder() -> EvaluatorBuilder {
        EvaluatorBuilder::new()
    }

    /// The root frame, for pushing custom lookup sources.
    pub fn scope(&self) -> &Scope {
        &self.root
    }

    pub fn context(&self) -> ExecContext {
        self.root.context()
    }

    /// Evaluate `expr` as data, resolving remaining defaults.
    pub fn evaluate(&self, expr: &Expr) -> EvalResult<Option<Value>> {
        evaluate(expr, &self.root)?
            .map(|value| value.resolve_defaults())
            .transpose()
    }

    /// Evaluate `expr` as a type description.
    pub fn evaluate_schema(&self, expr: &Expr) -> EvalResult<Value> {
        evaluate_schema(expr, &self.root)
    }

    /// Evaluate a document: a top-level record invoked like a function
    /// whose arguments are visible by name in its body.
    #[tracing::instrument(level = "debug", skip_all, fields(args = args.len()))]
    pub fn evaluate_document(
        &self,
        document: &StructRef,
        args: Vec<CallArgument>,
    ) -> EvalResult<Value> {
        let function = self.document_function(document);
        let value = function
            .call(&self.context(), args)?
            .unwrap_or_else(Value::empty_object);
        value.resolve_defaults()
    }

    /// Describe the `args` block of a document, if it declares one.
    pub fn describe_args(&self, document: &StructRef) -> EvalResult<Option<ObjectDescription>> {
        match self.document_function(document).args_schema()? {
            Some(schema) => describe_object(&schema).map(Some),
            None => Ok(None),
        }
    }

    fn document_function(&self, document: &StructRef) -> Function {
        let def = FunctionDef {
            returns_body: true,
            unscoped_args: true,
            pos: document.pos.clone(),
            comments: document.comments.clone(),
            ..FunctionDef::new(Arc::clone(document))
        };
        Function::new(Arc::new(def), &self.root)
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}
