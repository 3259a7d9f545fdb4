//! Per-push scope options.

use aml_value::ExecContext;

/// Options for [`Scope::push`](super::Scope::push).
///
/// Unset options inherit from the parent frame.
///
/// ```text
/// let frame = scope.push(source, ScopeOptions::new().schema(true).path("args"))?;
/// ```
#[must_use]
#[derive(Clone, Debug, Default)]
pub struct ScopeOptions {
    pub(super) schema: Option<bool>,
    pub(super) allow_new_keys: Option<bool>,
    pub(super) default_mode: Option<bool>,
    pub(super) call: bool,
    pub(super) path: Option<String>,
    pub(super) context: Option<ExecContext>,
}

impl ScopeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate records as contracts and arrays as array schemas.
    pub fn schema(mut self, enabled: bool) -> Self {
        self.schema = Some(enabled);
        self
    }

    /// Contracts built under this frame accept unknown keys.
    pub fn allow_new_keys(mut self, allow: bool) -> Self {
        self.allow_new_keys = Some(allow);
        self
    }

    /// Suppress schema behaviors: records fold to data and `*v` is just `v`.
    pub fn default_mode(mut self, enabled: bool) -> Self {
        self.default_mode = Some(enabled);
        self
    }

    /// Mark the frame as the entry of a function call.
    pub fn call(mut self) -> Self {
        self.call = true;
        self
    }

    /// Append a segment to the display path.
    ///
    /// An empty segment detaches the frame from its parent's path.
    pub fn path(mut self, segment: impl Into<String>) -> Self {
        self.path = Some(segment.into());
        self
    }

    /// Override the execution context.
    pub fn context(mut self, context: ExecContext) -> Self {
        self.context = Some(context);
        self
    }

    pub(super) fn child_path(&self, parent: &str) -> String {
        match self.path.as_deref() {
            None => parent.to_string(),
            Some("") => String::new(),
            Some(segment) if parent.is_empty() => segment.to_string(),
            Some(segment) => format!("{parent}.{segment}"),
        }
    }
}
