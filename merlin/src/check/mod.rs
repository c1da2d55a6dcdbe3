//! Check primitives.
//!
//! Each primitive takes resolved values plus an optional caller message and
//! returns `Err(CheckError)` on failure. The caller's message wins over the
//! default description when present. Primitives never catch producer
//! errors; those propagate through the case body unchanged.

use std::any::Any;
use std::cmp::Ordering;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};

use thiserror::Error;

use crate::value::{Kind, Value};

/// Failure raised by a check or by caller-supplied code inside a case body.
#[derive(Debug, Error)]
pub enum CheckError {
    /// Resolved values did not satisfy the requested relation.
    #[error("{0}")]
    Mismatch(String),
    /// A caller-supplied producer function failed.
    #[error("producer failed: {0}")]
    Producer(String),
    /// The `before` hook failed; producers were never invoked.
    #[error("setup hook failed: {0}")]
    Setup(String),
    /// A network fetch inside a check failed.
    #[error("request failed: {0}")]
    Network(String),
    /// A match pattern did not compile.
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
    /// Stub for a check body that is not written yet.
    #[error("not yet implemented")]
    Unimplemented,
    /// Marker for a branch the test author considers impossible.
    #[error("entered unreachable test code")]
    Unreachable,
}

/// Build a mismatch error from the caller's message or a default
/// description.
fn mismatch(message: Option<&str>, default: impl FnOnce() -> String) -> CheckError {
    match message {
        Some(text) => CheckError::Mismatch(text.to_string()),
        None => CheckError::Mismatch(default()),
    }
}

/// Fail unless `cond` holds.
pub(crate) fn ensure(
    cond: bool,
    message: Option<&str>,
    default: impl FnOnce() -> String,
) -> Result<(), CheckError> {
    if cond {
        Ok(())
    } else {
        Err(mismatch(message, default))
    }
}

/// Equality check, loose or strict.
pub fn assert_equal(
    actual: &Value,
    expected: &Value,
    strict: bool,
    message: Option<&str>,
) -> Result<(), CheckError> {
    let equal = if strict {
        actual.strict_eq(expected)
    } else {
        actual.loose_eq(expected)
    };
    let mode = if strict { "strictly " } else { "" };
    ensure(equal, message, || {
        format!("expected {actual} to {mode}equal {expected}")
    })
}

/// Inequality check (loose).
pub fn assert_not_equal(
    actual: &Value,
    unexpected: &Value,
    message: Option<&str>,
) -> Result<(), CheckError> {
    ensure(!actual.loose_eq(unexpected), message, || {
        format!("expected {actual} to not equal {unexpected}")
    })
}

/// Kind check used by the runtime-type predicates.
pub fn assert_kind(value: &Value, kind: Kind, message: Option<&str>) -> Result<(), CheckError> {
    ensure(value.kind() == kind, message, || {
        format!("expected a {kind} value, got {} ({value})", value.kind())
    })
}

/// Both resolved values have the same runtime kind.
pub fn assert_same_kind(
    actual: &Value,
    expected: &Value,
    message: Option<&str>,
) -> Result<(), CheckError> {
    ensure(actual.kind() == expected.kind(), message, || {
        format!(
            "expected an instance of {}, got {} ({actual})",
            expected.kind(),
            actual.kind()
        )
    })
}

/// List containment: every element of `contains` (a list, or a single
/// value) must be loosely present in `value`.
pub fn assert_list_contains(
    value: &Value,
    contains: &Value,
    message: Option<&str>,
) -> Result<(), CheckError> {
    let Value::List(items) = value else {
        return Err(mismatch(message, || {
            format!("expected a list value, got {} ({value})", value.kind())
        }));
    };
    let missing: Vec<&Value> = match contains {
        Value::List(wanted) => wanted
            .iter()
            .filter(|w| !items.iter().any(|item| item.loose_eq(w)))
            .collect(),
        single => {
            if items.iter().any(|item| item.loose_eq(single)) {
                Vec::new()
            } else {
                vec![single]
            }
        }
    };
    ensure(missing.is_empty(), message, || {
        let listing: Vec<String> = missing.iter().map(|v| v.to_string()).collect();
        format!("expected {value} to contain {}", listing.join(", "))
    })
}

/// Substring containment. Both sides must resolve to strings.
pub fn assert_string_contains(
    value: &Value,
    contains: &Value,
    message: Option<&str>,
) -> Result<(), CheckError> {
    let (Value::Str(haystack), Value::Str(needle)) = (value, contains) else {
        return Err(mismatch(message, || {
            format!(
                "string containment needs two strings, got {} and {}",
                value.kind(),
                contains.kind()
            )
        }));
    };
    ensure(haystack.contains(needle.as_ref()), message, || {
        format!("expected {value} to contain {contains}")
    })
}

/// Regex match over a resolved string value.
pub fn assert_match(value: &Value, pattern: &str, message: Option<&str>) -> Result<(), CheckError> {
    let regex = regex::Regex::new(pattern)?;
    let Value::Str(text) = value else {
        return Err(mismatch(message, || {
            format!("expected a string to match /{pattern}/, got {} ({value})", value.kind())
        }));
    };
    ensure(regex.is_match(text), message, || {
        format!("expected {value} to match /{pattern}/")
    })
}

/// Length equality across strings, lists, and maps.
pub fn assert_same_length(
    actual: &Value,
    expected: &Value,
    message: Option<&str>,
) -> Result<(), CheckError> {
    match (actual.length(), expected.length()) {
        (Some(a), Some(b)) => ensure(a == b, message, || {
            format!("expected length {b}, got {a} ({actual})")
        }),
        _ => Err(mismatch(message, || {
            format!(
                "length comparison needs strings, lists, or maps, got {} and {}",
                actual.kind(),
                expected.kind()
            )
        })),
    }
}

/// Property coverage: every key of `value` must appear in `contains`.
///
/// Keys present in `value` but absent from `contains` are printed as a
/// diagnostic line before the check fails. The reverse direction passes.
pub fn assert_properties(
    value: &Value,
    contains: &Value,
    message: Option<&str>,
) -> Result<(), CheckError> {
    let (Value::Map(actual), Value::Map(expected)) = (value, contains) else {
        return Err(mismatch(message, || {
            format!(
                "property check needs two maps, got {} and {}",
                value.kind(),
                contains.kind()
            )
        }));
    };
    let missing: Vec<&str> = actual
        .keys()
        .filter(|key| !expected.contains_key(*key))
        .map(String::as_str)
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    println!("missing properties: {}", missing.join(", "));
    Err(mismatch(message, || {
        format!("value has properties absent from the expectation: {}", missing.join(", "))
    }))
}

/// Requirement for the ordering checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderingRequirement {
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
}

impl OrderingRequirement {
    fn admits(self, ordering: Ordering) -> bool {
        match self {
            OrderingRequirement::Greater => ordering == Ordering::Greater,
            OrderingRequirement::GreaterOrEqual => ordering != Ordering::Less,
            OrderingRequirement::Less => ordering == Ordering::Less,
            OrderingRequirement::LessOrEqual => ordering != Ordering::Greater,
        }
    }
}

impl fmt::Display for OrderingRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            OrderingRequirement::Greater => ">",
            OrderingRequirement::GreaterOrEqual => ">=",
            OrderingRequirement::Less => "<",
            OrderingRequirement::LessOrEqual => "<=",
        };
        f.write_str(symbol)
    }
}

/// Ordering check across the numeric family and strings.
pub fn assert_ordering(
    actual: &Value,
    expected: &Value,
    requirement: OrderingRequirement,
    message: Option<&str>,
) -> Result<(), CheckError> {
    let Some(ordering) = actual.compare(expected) else {
        return Err(mismatch(message, || {
            format!(
                "cannot order {} against {} ({actual} vs {expected})",
                actual.kind(),
                expected.kind()
            )
        }));
    };
    ensure(requirement.admits(ordering), message, || {
        format!("expected {actual} {requirement} {expected}")
    })
}

/// Failure injection: the action must return an error or panic. When
/// `expected` is set, the failure text must contain it.
pub fn assert_throws(
    action: impl FnOnce() -> Result<(), CheckError>,
    expected: Option<&str>,
    message: Option<&str>,
) -> Result<(), CheckError> {
    let failure = match catch_unwind(AssertUnwindSafe(action)) {
        Ok(Ok(())) => {
            return Err(mismatch(message, || {
                "expected the action to raise, but it completed".to_string()
            }));
        }
        Ok(Err(error)) => error.to_string(),
        Err(payload) => panic_message(payload.as_ref()),
    };
    match expected {
        Some(fragment) => ensure(failure.contains(fragment), message, || {
            format!("expected a failure containing {fragment:?}, got: {failure}")
        }),
        None => Ok(()),
    }
}

/// Unconditional failure.
pub fn fail(message: Option<&str>) -> Result<(), CheckError> {
    Err(mismatch(message, || "forced failure".to_string()))
}

/// Marker for a check body that is not written yet.
pub fn not_implemented() -> Result<(), CheckError> {
    Err(CheckError::Unimplemented)
}

/// Marker for a branch the test author considers impossible.
pub fn not_reachable() -> Result<(), CheckError> {
    Err(CheckError::Unreachable)
}

/// Extract a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else {
        "panicked".to_string()
    }
}
