//! The undefined marker.

use std::fmt;

/// Why a value could not be resolved.
///
/// Every variant has kind `undefined`, so the loop sentinels propagate through
/// operators exactly like a missing key would.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Undefined {
    MissingKey(String),
    /// A key was looked up while it was still being resolved.
    Circular(String),
    /// Anything else that has no value yet (an unresolved function, `$` outside a document).
    Unresolved(String),
    /// Loop sentinel: drop the current iteration.
    Skip,
    /// Loop sentinel: stop the loop.
    Break,
}

impl fmt::Display for Undefined {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingKey(key) => write!(f, "missing key {key}"),
            Self::Circular(key) => write!(f, "circular reference to {key}"),
            Self::Unresolved(what) => write!(f, "unresolved {what}"),
            Self::Skip => f.write_str("skip"),
            Self::Break => f.write_str("break"),
        }
    }
}
