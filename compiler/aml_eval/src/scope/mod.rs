//! The scope chain.
//!
//! Frames are reference counted and hold their parent, so a child keeps its
//! chain alive and closures hold the frame they were defined in. A frame is
//! immutable once pushed apart from its per-key cache.
//!
//! # Resolution
//!
//! `get(key)` checks the frame's cache, then its [`LookupSource`], then the
//! parent. An undefined local answer still defers to the parent, and is only
//! returned when no ancestor has something better. Record answers are
//! cached once they contain no undefined anywhere.
//!
//! A key looked up again while it is being resolved in the same frame
//! answers `undefined` (circular) instead of recursing.
//!
//! # Lifetime
//!
//! [`Scope::push`] returns a [`ScopeGuard`]. Dropping it closes the frame:
//! cached answers are released and later lookups are computed again. Cached
//! closures would otherwise keep their own frame alive.
//!
//! # `$`
//!
//! The outermost record frame pushed onto a chain is that chain's document;
//! `$` names it, so a document can refer to itself while it is still being
//! built.

mod options;

use std::cell::{Cell, RefCell};
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;

use aml_value::{max_scope_depth_exceeded, ops, EvalResult, ExecContext, Value};

pub use options::ScopeOptions;

use crate::record::RecordSource;
use crate::MAX_SCOPE_DEPTH;

/// Where a frame answers names from.
#[derive(Debug)]
pub enum LookupSource {
    /// Answers nothing; used to switch modes or extend the path.
    Empty,
    /// The fields of a record evaluated in this frame.
    Record(Rc<RecordSource>),
    /// The keys of an already evaluated object.
    Data(Value),
    /// Names bound by a call, an iteration or the root.
    Bindings(FxHashMap<String, Value>),
}

#[derive(Clone, Debug)]
enum Slot {
    InProgress,
    Done(Value),
}

#[derive(Debug)]
struct Frame {
    parent: Option<Scope>,
    source: LookupSource,
    cache: RefCell<FxHashMap<String, Slot>>,
    /// Keys that answered circular while in progress.
    circular: RefCell<FxHashSet<String>>,
    /// Answers are cached only while open.
    open: Cell<bool>,
    /// The outermost record frame of its chain.
    is_document: bool,
    /// `$` is being materialized from this frame.
    materializing: Cell<bool>,
    schema: bool,
    default_mode: bool,
    allow_new_keys: bool,
    in_call: bool,
    path: String,
    depth: usize,
    /// Record frames on the chain, this one included.
    records: usize,
    context: ExecContext,
}

/// Handle to a frame of the chain.
#[derive(Clone)]
pub struct Scope {
    frame: Rc<Frame>,
}

impl Scope {
    /// A fresh chain whose root frame binds `bindings`.
    pub fn root(context: ExecContext, bindings: FxHashMap<String, Value>) -> Self {
        Self::new_root(context, bindings, false)
    }

    pub(crate) fn new_root(
        context: ExecContext,
        bindings: FxHashMap<String, Value>,
        allow_new_keys: bool,
    ) -> Self {
        let frame = Frame {
            parent: None,
            source: LookupSource::Bindings(bindings),
            cache: RefCell::default(),
            circular: RefCell::default(),
            open: Cell::new(true),
            is_document: false,
            materializing: Cell::new(false),
            schema: false,
            default_mode: false,
            allow_new_keys,
            in_call: false,
            path: String::new(),
            depth: 0,
            records: 0,
            context,
        };
        Scope {
            frame: Rc::new(frame),
        }
    }

    /// Push a child frame, open until the returned guard drops.
    pub fn push(&self, source: LookupSource, options: ScopeOptions) -> EvalResult<ScopeGuard> {
        let parent = &self.frame;
        let depth = parent.depth + 1;
        if depth > MAX_SCOPE_DEPTH {
            return Err(max_scope_depth_exceeded(MAX_SCOPE_DEPTH));
        }
        let is_record = matches!(source, LookupSource::Record(_));
        let frame = Frame {
            parent: Some(self.clone()),
            cache: RefCell::default(),
            circular: RefCell::default(),
            open: Cell::new(true),
            is_document: is_record && parent.records == 0,
            materializing: Cell::new(false),
            schema: options.schema.unwrap_or(parent.schema),
            default_mode: options.default_mode.unwrap_or(parent.default_mode),
            allow_new_keys: options.allow_new_keys.unwrap_or(parent.allow_new_keys),
            in_call: options.call || parent.in_call,
            path: options.child_path(&parent.path),
            depth,
            records: parent.records + usize::from(is_record),
            context: options
                .context
                .unwrap_or_else(|| parent.context.clone()),
            source,
        };
        Ok(ScopeGuard {
            scope: Scope {
                frame: Rc::new(frame),
            },
        })
    }

    /// Resolve `key` here or in an ancestor. `$` names the document.
    pub fn get(&self, key: &str) -> EvalResult<Option<Value>> {
        if key == "$" {
            return self.document_value().map(Some);
        }
        let local = self.get_local(key)?;
        if local.as_ref().is_some_and(|value| !value.is_undefined()) {
            return Ok(local);
        }
        let Some(parent) = &self.frame.parent else {
            return Ok(local);
        };
        match parent.get(key)? {
            Some(found) if !found.is_undefined() || local.is_none() => Ok(Some(found)),
            _ => Ok(local),
        }
    }

    /// Resolve `key` in this frame only.
    pub fn get_local(&self, key: &str) -> EvalResult<Option<Value>> {
        let frame = &self.frame;
        match frame.cache.borrow().get(key) {
            Some(Slot::Done(value)) => {
                trace!(key, path = %frame.path, "cache hit");
                return Ok(Some(value.clone()));
            }
            Some(Slot::InProgress) => {
                trace!(key, path = %frame.path, "re-entrant lookup");
                frame.circular.borrow_mut().insert(key.to_string());
                return Ok(Some(Value::circular(key)));
            }
            None => {}
        }

        let resolved = {
            let _resolving = Resolving::enter(frame, key);
            self.resolve(key)?
        };
        if let (LookupSource::Record(_), Some(value)) = (&frame.source, &resolved) {
            if frame.open.get() && !value.contains_undefined() {
                frame
                    .cache
                    .borrow_mut()
                    .insert(key.to_string(), Slot::Done(value.clone()));
            }
        }
        Ok(resolved)
    }

    fn resolve(&self, key: &str) -> EvalResult<Option<Value>> {
        match &self.frame.source {
            LookupSource::Empty => Ok(None),
            LookupSource::Data(value @ (Value::Object(_) | Value::Schema(_))) => {
                ops::lookup(value, key)
            }
            LookupSource::Data(_) => Ok(None),
            LookupSource::Bindings(names) => Ok(names.get(key).cloned()),
            LookupSource::Record(record) => record.lookup(self, key),
        }
    }

    /// Run `f` and report whether `key` answered circular in this frame
    /// meanwhile.
    pub(crate) fn watch_circular<T>(&self, key: &str, f: impl FnOnce() -> T) -> (T, bool) {
        let circular = &self.frame.circular;
        let outer = circular.borrow_mut().remove(key);
        let result = f();
        let hit = circular.borrow_mut().remove(key);
        if outer {
            circular.borrow_mut().insert(key.to_string());
        }
        (result, hit)
    }

    /// The whole value of this frame: a folded record, the data, or the bindings.
    pub(crate) fn materialize(&self) -> EvalResult<Value> {
        match &self.frame.source {
            LookupSource::Empty => Ok(Value::empty_object()),
            LookupSource::Record(record) => record.materialize(self),
            LookupSource::Data(value) => Ok(value.clone()),
            LookupSource::Bindings(names) => Ok(Value::object_from(
                names.iter().map(|(k, v)| (k.clone(), v.clone())),
            )),
        }
    }

    /// The outermost record frame of this chain, if one was pushed.
    pub fn document(&self) -> Option<Scope> {
        if self.frame.records == 0 {
            return None;
        }
        let mut current = Some(self);
        while let Some(scope) = current {
            if scope.frame.is_document {
                return Some(scope.clone());
            }
            current = scope.frame.parent.as_ref();
        }
        None
    }

    /// `$`: the whole document, guarded against re-entry.
    fn document_value(&self) -> EvalResult<Value> {
        let Some(document) = self.document() else {
            return Ok(Value::unresolved("$"));
        };
        let materializing = &document.frame.materializing;
        if materializing.replace(true) {
            return Ok(Value::circular("$"));
        }
        let result = document.materialize();
        materializing.set(false);
        result
    }

    /// `$.key`: a single key of the document, resolved lazily.
    pub(crate) fn document_get(&self, key: &str) -> EvalResult<Value> {
        match self.document() {
            Some(document) => Ok(document
                .get_local(key)?
                .unwrap_or_else(|| Value::missing(key))),
            None => Ok(Value::unresolved("$")),
        }
    }

    pub fn parent(&self) -> Option<Scope> {
        self.frame.parent.clone()
    }

    /// Records evaluate to contracts and arrays to array schemas here.
    pub fn is_schema(&self) -> bool {
        self.frame.schema && !self.frame.default_mode
    }

    pub fn is_default_mode(&self) -> bool {
        self.frame.default_mode
    }

    pub fn allow_new_keys(&self) -> bool {
        self.frame.allow_new_keys
    }

    /// Inside a function call.
    pub fn in_call(&self) -> bool {
        self.frame.in_call
    }

    /// Dotted display path.
    pub fn path(&self) -> String {
        self.frame.path.clone()
    }

    pub fn depth(&self) -> usize {
        self.frame.depth
    }

    pub fn context(&self) -> ExecContext {
        self.frame.context.clone()
    }

    /// Stop caching and release cached answers.
    fn close(&self) {
        self.frame.open.set(false);
        self.frame
            .cache
            .borrow_mut()
            .retain(|_, slot| matches!(slot, Slot::InProgress));
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("path", &self.frame.path)
            .field("depth", &self.frame.depth)
            .field("schema", &self.frame.schema)
            .finish_non_exhaustive()
    }
}

/// A pushed frame that closes when dropped.
///
/// Values that captured the frame keep it alive afterwards; lookups through
/// a closed frame still work but are no longer cached.
#[must_use]
pub struct ScopeGuard {
    scope: Scope,
}

impl Deref for ScopeGuard {
    type Target = Scope;

    fn deref(&self) -> &Scope {
        &self.scope
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        self.scope.close();
    }
}

impl fmt::Debug for ScopeGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.scope.fmt(f)
    }
}

/// Marks a key as being resolved for as long as it lives.
struct Resolving<'a> {
    frame: &'a Frame,
    key: &'a str,
}

impl<'a> Resolving<'a> {
    fn enter(frame: &'a Frame, key: &'a str) -> Self {
        frame
            .cache
            .borrow_mut()
            .insert(key.to_string(), Slot::InProgress);
        Resolving { frame, key }
    }
}

impl Drop for Resolving<'_> {
    fn drop(&mut self) {
        let mut cache = self.frame.cache.borrow_mut();
        if matches!(cache.get(self.key), Some(Slot::InProgress)) {
            cache.remove(self.key);
        }
        self.frame.circular.borrow_mut().remove(self.key);
    }
}
