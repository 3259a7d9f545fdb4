//! The closed set of value kinds.

use std::fmt;

use serde::Serialize;

/// Kind of a value.
///
/// `Union` never describes a concrete value; it is the target kind of schemas
/// that accept any kind (`any`, or an or-schema over different kinds).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
    Func,
    Schema,
    Union,
    Undefined,
}

impl Kind {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
            Self::Func => "func",
            Self::Schema => "schema",
            Self::Union => "union",
            Self::Undefined => "undefined",
        }
    }

    /// Scalars: a default never layers beneath them, it is only a fallback.
    pub const fn is_simple(self) -> bool {
        matches!(self, Self::Null | Self::Bool | Self::Number | Self::String)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
