//! Call depth accounting along the dynamic call chain.

use std::sync::atomic::{AtomicUsize, Ordering};

use aml_value::{max_call_depth_exceeded, EvalResult};

use crate::MAX_CALL_DEPTH;

/// Holds one level of call depth until dropped.
///
/// The counter comes from the caller's [`aml_value::ExecContext`], so it
/// counts nested calls of any function, including closures created anew on
/// every lookup.
pub(super) struct CallDepthGuard<'a> {
    depth: &'a AtomicUsize,
}

impl<'a> CallDepthGuard<'a> {
    pub(super) fn enter(depth: &'a AtomicUsize) -> EvalResult<Self> {
        let previous = depth.fetch_add(1, Ordering::SeqCst);
        if previous >= MAX_CALL_DEPTH {
            depth.fetch_sub(1, Ordering::SeqCst);
            tracing::debug!(limit = MAX_CALL_DEPTH, "call depth exceeded");
            return Err(max_call_depth_exceeded(MAX_CALL_DEPTH));
        }
        Ok(CallDepthGuard { depth })
    }
}

impl Drop for CallDepthGuard<'_> {
    fn drop(&mut self) {
        self.depth.fetch_sub(1, Ordering::SeqCst);
    }
}
