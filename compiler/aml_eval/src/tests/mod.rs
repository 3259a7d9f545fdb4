//! Test modules relocated from implementation files.
//!
//! Tests that exercise the evaluator through its public entry points rather
//! than a single module live here.

mod builder_tests;
mod builtins_tests;
