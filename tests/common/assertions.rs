//! Common assertion helpers for test output validation
//!
//! Provides predicates for validating jerjerrod command output and error
//! messages.

#![allow(dead_code)]

use predicates::prelude::*;

/// Creates a predicate that checks for the "no such project" error
pub fn project_not_found(name: &str) -> impl Predicate<str> {
    predicates::str::contains(format!("No project {name}"))
}

/// Creates a predicate that checks for config error messages
pub fn config_error() -> impl Predicate<str> {
    predicates::str::contains("config line")
}

/// Creates a predicate that checks output lists exactly these names, one per
/// line
pub fn lists_names(names: &[&str]) -> impl Predicate<str> {
    let expected: String = names.iter().map(|name| format!("{name}\n")).collect();
    predicates::str::diff(expected)
}

/// Creates a predicate that checks a summary stat line
pub fn has_stat(label: &str, value: &str) -> impl Predicate<str> {
    predicates::str::contains(format!("{label}: {value}"))
}
