#![allow(
    clippy::unwrap_used,
    reason = "test code uses unwrap for concise assertions"
)]

use super::*;

fn int(literal: &str) -> i64 {
    Number::parse(literal).unwrap().to_i64().unwrap()
}

#[test]
fn binary_suffixes() {
    assert_eq!(int("2Ki"), 2048);
    assert_eq!(int("2ki"), 2048);
    assert_eq!(int("1Mi"), 1_048_576);
    assert_eq!(int("3Gi"), 3 * 1_073_741_824);
}

#[test]
fn decimal_suffixes() {
    assert_eq!(int("5k"), 5_000);
    assert_eq!(int("2M"), 2_000_000);
    assert_eq!(int("1.5k"), 1_500);
    assert_eq!(int("1G"), 1_000_000_000);
}

#[test]
fn radix_and_separators() {
    assert_eq!(int("0x1F"), 31);
    assert_eq!(int("0o17"), 15);
    assert_eq!(int("0b101"), 5);
    assert_eq!(int("1_000_000"), 1_000_000);
    assert_eq!(int("-42"), -42);
}

#[test]
fn floats_stay_floats() {
    let n = Number::parse("2.5").unwrap();
    assert!(!n.is_integer());
    assert!((n.to_f64().unwrap() - 2.5).abs() < f64::EPSILON);
    assert!(n.to_i64().is_err());
    assert_eq!(Number::parse("1e3").unwrap().repr().unwrap(), NumberRepr::Float(1000.0));
}

#[test]
fn literal_is_preserved() {
    assert_eq!(Number::parse("2Ki").unwrap().literal(), "2Ki");
    assert_eq!(Number::parse("2Ki").unwrap(), Number::from_i64(2048));
}

#[test]
fn rejects_garbage() {
    for literal in ["", "-", "abc", "1.2.3", "0xZZ", "inf", "12q"] {
        assert!(Number::parse(literal).is_err(), "{literal} should not parse");
    }
}

#[test]
fn overflow_is_an_error() {
    assert!(Number::parse("9223372036854775807Ki").is_err());
}

#[test]
fn integral_float_results_collapse() {
    assert_eq!(Number::from_f64(3.0).unwrap().literal(), "3");
    assert!(Number::from_f64(f64::INFINITY).is_err());
}
