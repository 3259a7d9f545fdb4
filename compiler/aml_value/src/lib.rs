//! AML values: the value/kind algebra, the operator protocol and the schema
//! unification engine.
//!
//! # Layers
//!
//! - [`Value`] and [`Kind`]: the closed set of runtime values, with
//!   undefined as a first-class variant
//! - [`ops`]: arithmetic, comparison, boolean, regex, access operators
//! - [`merge`](merge::merge): unification of two values
//! - [`schema`]: `TypeSchema`, constraints, object/array contracts, defaults,
//!   union alternates and the description export
//! - [`Callable`] and [`Contract`](schema::Contract): the seams the evaluator
//!   implements for functions and lazily described record schemas

mod callable;
mod context;
mod errors;
mod kind;
pub mod merge;
pub mod ops;
pub mod schema;
mod value;

pub use callable::{call, CallArgument, Callable};
pub use context::{CancelPoint, ExecContext};
pub use errors::*;
pub use kind::Kind;
pub use merge::{merge, overlay};
pub use schema::TypeSchema;
pub use value::{Heap, NativeValue, Number, NumberRepr, ObjectMap, Undefined, Value};
