//! Cooperative cancellation and call depth.
//!
//! Evaluation itself is single-threaded; the only cross-thread interaction is
//! another thread flipping the cancel flag. The evaluator checks it before
//! every function call and every comprehension iteration.
//!
//! The context also counts the function calls currently nested inside each
//! other. Function values are closures that may be re-created on every
//! lookup, so the count lives here rather than on the function.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::{context_cancelled, EvalError};

/// Where a cancelled context was noticed.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum CancelPoint {
    Call,
    Loop,
}

impl CancelPoint {
    pub const fn message(self) -> &'static str {
        match self {
            Self::Call => "context is closed",
            Self::Loop => "aborting loop",
        }
    }
}

/// Execution context threaded through every scope push.
///
/// Clones share the same cancel flag and call-depth counter.
#[derive(Clone, Debug, Default)]
pub struct ExecContext {
    cancelled: Arc<AtomicBool>,
    calls: Arc<AtomicUsize>,
}

impl ExecContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// A context cancelled together with this one that counts its calls
    /// separately.
    #[must_use]
    pub fn fork(&self) -> Self {
        ExecContext {
            cancelled: Arc::clone(&self.cancelled),
            calls: Arc::default(),
        }
    }

    /// Function calls in progress under this context.
    pub fn call_depth(&self) -> &AtomicUsize {
        &self.calls
    }

    /// Request cancellation. Safe to call from any thread.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Fail if cancelled.
    #[inline]
    pub fn check(&self, point: CancelPoint) -> Result<(), EvalError> {
        if self.is_cancelled() {
            tracing::warn!(reason = point.message(), "evaluation cancelled");
            return Err(context_cancelled(point));
        }
        Ok(())
    }
}
