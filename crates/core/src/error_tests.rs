// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for error display formatting.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;

#[test]
fn test_activity_not_found_display() {
    let err = Error::ActivityNotFound("act-1".to_string());
    assert_eq!(err.to_string(), "activity not found: act-1");
}

#[test]
fn test_invalid_type_includes_hint() {
    let err = Error::InvalidActivityType("bogus".to_string());
    let msg = err.to_string();
    assert!(msg.contains("bogus"));
    assert!(msg.contains("hint:"));
    assert!(msg.contains("income, expense, transfer"));
}

#[test]
fn test_invalid_category_includes_hint() {
    let err = Error::InvalidCategory("snacks".to_string());
    let msg = err.to_string();
    assert!(msg.contains("snacks"));
    assert!(msg.contains("hint:"));
}

#[test]
fn test_invalid_amount_display() {
    let err = Error::InvalidAmount(-5.0);
    let msg = err.to_string();
    assert!(msg.contains("-5"));
    assert!(msg.contains("non-negative finite"));
}

#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::other("disk full");
    let err: Error = io_err.into();
    assert!(matches!(err, Error::Io(_)));
    assert!(err.to_string().contains("disk full"));
}

#[test]
fn test_json_error_conversion() {
    let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
    let err: Error = json_err.into();
    assert!(matches!(err, Error::Json(_)));
}
