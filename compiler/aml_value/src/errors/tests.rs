use pretty_assertions::assert_eq;

use super::*;

#[test]
fn position_chain_renders_innermost_first() {
    let err = key_not_found("port")
        .at(&Position::in_file("app.acl", 4, 9))
        .at(&Position::in_file("app.acl", 4, 9))
        .at(&Position::DUMMY)
        .at(&Position::in_file("app.acl", 1, 1));
    assert_eq!(err.positions.len(), 2);
    assert_eq!(
        err.to_string(),
        "key not found: port: app.acl:4:9 <- app.acl:1:1"
    );
}

#[test]
fn missing_keys_message() {
    let err = missing_required_keys(vec!["b".to_string()], "config");
    assert_eq!(err.to_string(), "missing required key b in config");
    let err = missing_required_keys(vec!["a".to_string(), "b".to_string()], "");
    assert_eq!(err.to_string(), "missing required keys a, b");
}

#[test]
fn join_single_error_is_identity() {
    let err = EvalError::join(vec![division_by_zero()]);
    assert!(matches!(err.kind, EvalErrorKind::DivisionByZero));

    let err = EvalError::join(vec![division_by_zero(), unknown_field("x", "")]);
    assert_eq!(err.to_string(), "division by zero; unknown field x");
}

#[test]
fn unmatched_type_deduplicates_failures() {
    let failure = type_mismatch(Kind::String, Kind::Bool, "true".to_string());
    let err = unmatched_type("true".to_string(), vec![failure.clone(), failure]);
    let EvalErrorKind::UnmatchedType { failures, .. } = &err.kind else {
        panic!("expected unmatched type, got {err:?}");
    };
    assert_eq!(failures.len(), 1);
}

#[test]
fn fatal_errors_survive_wrapping() {
    let err = invalid_arguments(schema_violation("n", "", max_call_depth_exceeded(100)));
    assert!(err.is_fatal());
    assert!(!unknown_field("x", "").is_fatal());
    assert_eq!(
        context_cancelled(CancelPoint::Loop).to_string(),
        "aborting loop"
    );
}
