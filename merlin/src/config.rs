//! Configuration records for check registration.
//!
//! Every suite operation takes a label plus one of these records. The
//! records are closed: all fields are explicit, and the cross-cutting
//! [`CaseOptions`] defaults are documented on the type. Producers are
//! plain `FnOnce` closures; the suite resolves them sequentially in
//! declaration order (`expect` fully resolved before `to_be`), which is
//! part of each operation's contract, not an accident.

use std::fmt;
use std::time::Duration;

use crate::check::CheckError;
use crate::value::Value;

/// Zero-argument closure producing a value for a check.
pub type Producer = Box<dyn FnOnce() -> Result<Value, CheckError> + Send + 'static>;

/// Setup hook run before any producer. A failing hook fails the case and
/// suppresses producer evaluation.
pub type Hook = Box<dyn FnOnce() -> Result<(), CheckError> + Send + 'static>;

/// Zero-argument action for failure-injection checks.
pub type Action = Box<dyn FnOnce() -> Result<(), CheckError> + Send + 'static>;

/// Producer returning a fixed value.
pub fn value<T: Into<Value>>(v: T) -> Producer {
    let v = v.into();
    Box::new(move || Ok(v))
}

/// Producer from an infallible closure.
pub fn produce<F, T>(f: F) -> Producer
where
    F: FnOnce() -> T + Send + 'static,
    T: Into<Value>,
{
    Box::new(move || Ok(f().into()))
}

/// Producer from a fallible closure. The error propagates unchanged as a
/// case failure.
pub fn try_produce<F, T, E>(f: F) -> Producer
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Into<Value>,
    E: fmt::Display,
{
    Box::new(move || {
        f().map(Into::into)
            .map_err(|e| CheckError::Producer(e.to_string()))
    })
}

/// Setup hook from an infallible closure.
pub fn hook<F>(f: F) -> Hook
where
    F: FnOnce() + Send + 'static,
{
    Box::new(move || {
        f();
        Ok(())
    })
}

/// Setup hook from a fallible closure.
pub fn try_hook<F, E>(f: F) -> Hook
where
    F: FnOnce() -> Result<(), E> + Send + 'static,
    E: fmt::Display,
{
    Box::new(move || f().map_err(|e| CheckError::Setup(e.to_string())))
}

/// Action for `test_throws` from a fallible closure.
pub fn attempt<F, E>(f: F) -> Action
where
    F: FnOnce() -> Result<(), E> + Send + 'static,
    E: fmt::Display,
{
    Box::new(move || f().map_err(|e| CheckError::Producer(e.to_string())))
}

/// Action that is expected to panic.
pub fn attempt_panicking<F>(f: F) -> Action
where
    F: FnOnce() + Send + 'static,
{
    Box::new(move || {
        f();
        Ok(())
    })
}

/// Cross-cutting options attached to every registered case.
///
/// Defaults: nothing ignored, no `only` restriction, no custom message,
/// all three sanitization flags on, no setup hook. The sanitize flags are
/// forwarded verbatim to the scheduler; the suite never interprets them.
pub struct CaseOptions {
    /// Skip this case's execution entirely (decided at registration time).
    pub ignore: bool,
    /// Restrict execution to flagged cases; policy belongs to the
    /// scheduler.
    pub only: bool,
    /// Failure text overriding the default mismatch description.
    pub message: Option<String>,
    /// Request leaked-async-op detection from the scheduler.
    pub sanitize_ops: bool,
    /// Request leaked-resource detection from the scheduler.
    pub sanitize_resources: bool,
    /// Request unexpected-exit detection from the scheduler.
    pub sanitize_exit: bool,
    /// Setup hook executed before any producer.
    pub before: Option<Hook>,
}

impl CaseOptions {
    /// Options with the documented defaults.
    pub fn new() -> Self {
        CaseOptions {
            ignore: false,
            only: false,
            message: None,
            sanitize_ops: true,
            sanitize_resources: true,
            sanitize_exit: true,
            before: None,
        }
    }

    /// Options carrying just a failure message.
    ///
    /// Shorthand for the common case of customizing only `message`.
    pub fn with_message(text: impl Into<String>) -> Self {
        CaseOptions {
            message: Some(text.into()),
            ..CaseOptions::new()
        }
    }
}

impl Default for CaseOptions {
    fn default() -> Self {
        CaseOptions::new()
    }
}

/// Equality check: `expect` against `to_be`, loose unless `strict`.
pub struct EqualConfig {
    pub expect: Producer,
    pub to_be: Producer,
    pub strict: bool,
    pub options: CaseOptions,
}

/// Inequality check: `expect` must not loosely equal `not_be`.
pub struct NotEqualConfig {
    pub expect: Producer,
    pub not_be: Producer,
    pub options: CaseOptions,
}

/// One element of a batch equality registration.
pub struct EqualCase {
    pub label: String,
    pub config: EqualConfig,
}

/// Single-producer check (predicates).
pub struct ValueConfig {
    pub value: Producer,
    pub options: CaseOptions,
}

/// Two-producer check where both sides resolve before comparison
/// (ordering, length, instance checks).
pub struct PairConfig {
    pub expect: Producer,
    pub to_be: Producer,
    pub options: CaseOptions,
}

/// Containment and property checks: `value` resolves first, then
/// `contains`.
pub struct ContainsConfig {
    pub value: Producer,
    pub contains: Producer,
    pub options: CaseOptions,
}

/// Regex match over a resolved string value.
pub struct MatchConfig {
    pub value: Producer,
    pub pattern: String,
    pub options: CaseOptions,
}

/// How to decode a fetched response body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyKind {
    /// UTF-8 text, compared as a string value.
    Text,
    /// JSON, decoded into a structural value.
    Json,
}

/// Request knobs for the network equality check.
#[derive(Default)]
pub struct RequestOptions {
    /// Overall request timeout; the client default applies when unset.
    pub timeout: Option<Duration>,
    /// Extra request headers.
    pub headers: Vec<(String, String)>,
}

/// Network equality check: one GET, body decoded per `kind`, compared
/// loosely against the resolved `to_be`.
pub struct FetchConfig {
    pub url: String,
    pub kind: BodyKind,
    pub to_be: Producer,
    pub request: RequestOptions,
    pub options: CaseOptions,
}

/// Failure-injection check: the action must raise. When `contains` is
/// set, the failure text must contain it.
pub struct ThrowsConfig {
    pub action: Action,
    pub contains: Option<String>,
    pub options: CaseOptions,
}
