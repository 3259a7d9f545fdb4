//! AML evaluator: the scope chain, record and comprehension evaluation, and
//! function calls.
//!
//! # Architecture
//!
//! - [`Scope`]: reference-counted frames with per-key memoization, cycle
//!   detection and `$`
//! - [`evaluate`] / [`evaluate_schema`]: one expression in data or schema mode
//! - records fold their fields in data mode and become lazy contracts in
//!   schema mode
//! - functions close over their defining frame and validate arguments,
//!   profiles and return values against schemas
//! - [`Evaluator`]: root frame with builtins, document evaluation and
//!   argument description
//!
//! Values and unification live in `aml_value`; this crate only decides what
//! to evaluate and in which frame.

mod builder;
mod builtins;
mod comprehension;
mod eval;
mod function;
mod record;
mod scope;

use std::sync::Once;

pub use builder::{Evaluator, EvaluatorBuilder};
pub use eval::{evaluate, evaluate_schema};
pub use function::{Function, Lambda};
pub use record::RecordSource;
pub use scope::{LookupSource, Scope, ScopeGuard, ScopeOptions};

/// Frames a single chain may hold.
pub const MAX_SCOPE_DEPTH: usize = 100;

/// Function calls nested inside each other in one evaluation.
pub const MAX_CALL_DEPTH: usize = 100;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times.
/// Enable with `RUST_LOG=aml_eval=debug` or `RUST_LOG=aml_eval=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}

#[cfg(test)]
mod tests;
