//! Names bound in the root frame.

use rustc_hash::FxHashMap;

use aml_value::schema::StaticContract;
use aml_value::{Kind, TypeSchema, Value};

/// The core type schemas and the `std` helpers.
pub(crate) fn builtins() -> FxHashMap<String, Value> {
    let number = Value::schema(TypeSchema::new(Kind::Number));
    let entries = [
        ("string", Value::schema(TypeSchema::new(Kind::String))),
        ("number", number.clone()),
        ("float", number),
        ("int", Value::schema(TypeSchema::int())),
        ("bool", Value::schema(TypeSchema::new(Kind::Bool))),
        (
            "object",
            Value::schema(TypeSchema::object(StaticContract::new("").open().build())),
        ),
        ("array", Value::schema(TypeSchema::array(Vec::new()))),
        ("any", Value::schema(TypeSchema::any())),
        (
            "std",
            Value::object_from([("skip", Value::skip()), ("break", Value::break_loop())]),
        ),
    ];
    entries
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}
