//! Error types for evaluation and unification.
//!
//! `EvalErrorKind` is the typed category; factory functions (e.g.
//! [`unknown_field`]) are the public constructors. Undefined is never an
//! error: it is a value and flows through every operator silently.
//!
//! Errors pick up source positions as they unwind through the evaluator, so
//! the rendered message reads `message: innermost <- ... <- outermost`.

use std::fmt;

use aml_ir::{BinaryOp, Position};
use thiserror::Error;

use crate::context::CancelPoint;
use crate::kind::Kind;

/// Result of evaluation.
pub type EvalResult<T = crate::Value> = Result<T, EvalError>;

/// Typed error category.
#[derive(Clone, Debug, Error)]
pub enum EvalErrorKind {
    // Lookup
    #[error("key not found: {key}")]
    KeyNotFound { key: String },
    #[error("key is undefined: {key}")]
    KeyUndefined { key: String },
    #[error("cycle detected in key {key}")]
    CycleDetected { key: String },

    // Contracts
    #[error("unknown field {key}{}", in_path(.path))]
    UnknownField { key: String, path: String },
    #[error("missing required {}{}", key_list(.keys), in_path(.path))]
    MissingRequiredKeys { keys: Vec<String>, path: String },
    #[error("invalid value for {key}{}: {cause}", in_path(.path))]
    SchemaViolation {
        key: String,
        path: String,
        cause: Box<EvalError>,
    },
    #[error("expected {expected}, got {got} ({value})")]
    TypeMismatch {
        expected: Kind,
        got: Kind,
        value: String,
    },
    #[error("{value} does not match any alternative: {}", join_messages(.failures))]
    UnmatchedType {
        value: String,
        failures: Vec<EvalError>,
    },
    #[error("{value} does not satisfy {constraint}")]
    ConstraintViolation { constraint: String, value: String },
    #[error("conflicting values {left} and {right}")]
    Conflict { left: String, right: String },
    #[error("can not merge {left} with {right}")]
    MergeKindMismatch { left: Kind, right: Kind },

    // Function boundary
    #[error("invalid arguments: {cause}")]
    InvalidArguments { cause: Box<EvalError> },
    #[error("invalid return value: {cause}")]
    InvalidReturnValue { cause: Box<EvalError> },
    #[error("too many positional arguments: expected at most {expected}, got {got}")]
    TooManyArguments { expected: usize, got: usize },
    #[error("profile not found: {name}")]
    UnknownProfile { name: String },
    #[error("{kind} is not callable")]
    NotCallable { kind: Kind },

    // Resource guards
    #[error("exceeded max call depth of {limit}")]
    MaxCallDepthExceeded { limit: usize },
    #[error("exceeded max scope depth of {limit}")]
    MaxScopeDepthExceeded { limit: usize },
    #[error("{}", cancel_message(.point))]
    ContextCancelled { point: CancelPoint },

    // Operators
    #[error("unsupported operation {op} for kind {kind}")]
    UnsupportedOperation { op: String, kind: Kind },
    #[error("operator {op} requires operands of the same kind, got {left} and {right}")]
    OperandKindMismatch { op: BinaryOp, left: Kind, right: Kind },
    #[error("division by zero")]
    DivisionByZero,
    #[error("integer overflow in {operation}")]
    IntegerOverflow { operation: String },
    #[error("invalid number {literal}: {reason}")]
    InvalidNumber { literal: String, reason: String },
    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: i64, len: usize },
    #[error("invalid regular expression {pattern}: {message}")]
    InvalidRegex { pattern: String, message: String },

    // Conversion
    #[error("value is undefined ({reason}), caused by missing key or circular reference")]
    UndefinedValue { reason: String },
    #[error("schema of kind {kind} has no default value")]
    NoDefault { kind: Kind },

    /// Independent failures collected from one record.
    #[error("{}", join_messages(.0))]
    Multiple(Vec<EvalError>),

    #[error("{message}")]
    Custom { message: String },
}

fn in_path(path: &str) -> String {
    if path.is_empty() {
        String::new()
    } else {
        format!(" in {path}")
    }
}

fn key_list(keys: &[String]) -> String {
    let noun = if keys.len() == 1 { "key" } else { "keys" };
    format!("{noun} {}", keys.join(", "))
}

fn cancel_message(point: &CancelPoint) -> &'static str {
    point.message()
}

fn join_messages(errors: &[EvalError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Evaluation error.
#[derive(Clone, Debug)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    /// Positions collected while unwinding, innermost first.
    pub positions: Vec<Position>,
}

impl EvalError {
    /// Create an error with just a message.
    ///
    /// Prefer the factory functions when a structured kind exists.
    pub fn new(message: impl Into<String>) -> Self {
        Self::from_kind(EvalErrorKind::Custom {
            message: message.into(),
        })
    }

    #[inline]
    pub fn from_kind(kind: EvalErrorKind) -> Self {
        Self {
            kind,
            positions: Vec::new(),
        }
    }

    /// Record the position of the node this error is unwinding through.
    ///
    /// Synthesized positions and repeats of the last position are skipped.
    #[must_use]
    pub fn at(mut self, pos: &Position) -> Self {
        if !pos.is_dummy() && self.positions.last() != Some(pos) {
            self.positions.push(pos.clone());
        }
        self
    }

    /// Combine independent errors. A single error is returned unchanged.
    pub fn join(mut errors: Vec<EvalError>) -> Self {
        if errors.len() == 1 {
            if let Some(error) = errors.pop() {
                return error;
            }
        }
        Self::from_kind(EvalErrorKind::Multiple(errors))
    }

    /// The message without positions.
    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    /// Errors that abort the whole evaluation instead of a single field.
    pub fn is_fatal(&self) -> bool {
        match &self.kind {
            EvalErrorKind::MaxCallDepthExceeded { .. }
            | EvalErrorKind::MaxScopeDepthExceeded { .. }
            | EvalErrorKind::ContextCancelled { .. } => true,
            EvalErrorKind::SchemaViolation { cause, .. }
            | EvalErrorKind::InvalidArguments { cause }
            | EvalErrorKind::InvalidReturnValue { cause } => cause.is_fatal(),
            EvalErrorKind::Multiple(errors) => errors.iter().any(EvalError::is_fatal),
            _ => false,
        }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        for (i, pos) in self.positions.iter().enumerate() {
            if i == 0 {
                write!(f, ": {pos}")?;
            } else {
                write!(f, " <- {pos}")?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for EvalError {}

impl PartialEq for EvalError {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}

// Lookup

#[cold]
pub fn key_not_found(key: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::KeyNotFound {
        key: key.to_string(),
    })
}

#[cold]
pub fn key_undefined(key: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::KeyUndefined {
        key: key.to_string(),
    })
}

#[cold]
pub fn cycle_detected(key: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::CycleDetected {
        key: key.to_string(),
    })
}

// Contracts

#[cold]
pub fn unknown_field(key: &str, path: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnknownField {
        key: key.to_string(),
        path: path.to_string(),
    })
}

#[cold]
pub fn missing_required_keys(keys: Vec<String>, path: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::MissingRequiredKeys {
        keys,
        path: path.to_string(),
    })
}

#[cold]
pub fn schema_violation(key: &str, path: &str, cause: EvalError) -> EvalError {
    EvalError::from_kind(EvalErrorKind::SchemaViolation {
        key: key.to_string(),
        path: path.to_string(),
        cause: Box::new(cause),
    })
}

#[cold]
pub fn type_mismatch(expected: Kind, got: Kind, value: String) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TypeMismatch {
        expected,
        got,
        value,
    })
}

/// All alternatives of a union rejected a value. Duplicate failures are dropped.
#[cold]
pub fn unmatched_type(value: String, failures: Vec<EvalError>) -> EvalError {
    let mut unique: Vec<EvalError> = Vec::with_capacity(failures.len());
    for failure in failures {
        if !unique.contains(&failure) {
            unique.push(failure);
        }
    }
    EvalError::from_kind(EvalErrorKind::UnmatchedType {
        value,
        failures: unique,
    })
}

#[cold]
pub fn constraint_violation(constraint: String, value: String) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ConstraintViolation { constraint, value })
}

#[cold]
pub fn conflict(left: String, right: String) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Conflict { left, right })
}

#[cold]
pub fn merge_kind_mismatch(left: Kind, right: Kind) -> EvalError {
    EvalError::from_kind(EvalErrorKind::MergeKindMismatch { left, right })
}

// Function boundary

#[cold]
pub fn invalid_arguments(cause: EvalError) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidArguments {
        cause: Box::new(cause),
    })
}

#[cold]
pub fn invalid_return_value(cause: EvalError) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidReturnValue {
        cause: Box::new(cause),
    })
}

#[cold]
pub fn too_many_arguments(expected: usize, got: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TooManyArguments { expected, got })
}

#[cold]
pub fn unknown_profile(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnknownProfile {
        name: name.to_string(),
    })
}

#[cold]
pub fn not_callable(kind: Kind) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotCallable { kind })
}

// Resource guards

#[cold]
pub fn max_call_depth_exceeded(limit: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::MaxCallDepthExceeded { limit })
}

#[cold]
pub fn max_scope_depth_exceeded(limit: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::MaxScopeDepthExceeded { limit })
}

#[cold]
pub fn context_cancelled(point: CancelPoint) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ContextCancelled { point })
}

// Operators

#[cold]
pub fn unsupported_operation(op: &str, kind: Kind) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnsupportedOperation {
        op: op.to_string(),
        kind,
    })
}

#[cold]
pub fn operand_kind_mismatch(op: BinaryOp, left: Kind, right: Kind) -> EvalError {
    EvalError::from_kind(EvalErrorKind::OperandKindMismatch { op, left, right })
}

#[cold]
pub fn division_by_zero() -> EvalError {
    EvalError::from_kind(EvalErrorKind::DivisionByZero)
}

#[cold]
pub fn integer_overflow(operation: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IntegerOverflow {
        operation: operation.to_string(),
    })
}

#[cold]
pub fn invalid_number(literal: &str, reason: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidNumber {
        literal: literal.to_string(),
        reason: reason.into(),
    })
}

#[cold]
pub fn index_out_of_bounds(index: i64, len: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IndexOutOfBounds { index, len })
}

#[cold]
pub fn invalid_regex(pattern: &str, message: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidRegex {
        pattern: pattern.to_string(),
        message: message.into(),
    })
}

// Conversion

#[cold]
pub fn undefined_value(reason: String) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedValue { reason })
}

#[cold]
pub fn no_default(kind: Kind) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NoDefault { kind })
}

#[cfg(test)]
mod tests;
