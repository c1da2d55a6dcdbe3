//! The assertion façade.
//!
//! [`Merlin`] translates named check requests into case registrations:
//! one call, one case. Each case body runs the optional `before` hook,
//! resolves producers sequentially in declaration order, and forwards the
//! resolved values to a check primitive. The façade never catches
//! producer errors and never interprets the cross-cutting flags; those
//! ride on the [`TestCase`] for the scheduler to honor.

use parking_lot::Mutex;

use crate::check::{self, CheckError, OrderingRequirement};
use crate::config::{
    BodyKind, CaseOptions, ContainsConfig, EqualCase, EqualConfig, FetchConfig, MatchConfig,
    NotEqualConfig, PairConfig, RequestOptions, ThrowsConfig, ValueConfig,
};
use crate::runner::{Runner, RunnerConfig, SanitizeFlags, TestBody, TestCase, TestSummary};
use crate::value::{Kind, Value};

/// Declarative test suite: named checks over config records.
pub struct Merlin {
    cases: Mutex<Vec<TestCase>>,
}

impl Merlin {
    /// Create an empty suite.
    pub fn new() -> Self {
        Merlin {
            cases: Mutex::new(Vec::new()),
        }
    }

    /// Number of registered cases awaiting a run.
    pub fn case_count(&self) -> usize {
        self.cases.lock().len()
    }

    /// Drain the registered cases, e.g. to hand them to an external
    /// scheduler.
    pub fn take_cases(&self) -> Vec<TestCase> {
        std::mem::take(&mut *self.cases.lock())
    }

    /// Run all registered cases with the default runner config.
    pub fn run(&self) -> TestSummary {
        self.run_with(RunnerConfig::default())
    }

    /// Run all registered cases with a custom runner config.
    pub fn run_with(&self, config: RunnerConfig) -> TestSummary {
        Runner::with_config(config).run(self.take_cases())
    }

    /// Register one case. The `before` hook is spliced ahead of the check
    /// body; its failure fails the case and suppresses the check.
    fn register<F>(&self, label: &str, options: CaseOptions, check: F)
    where
        F: FnOnce() -> Result<(), CheckError> + Send + 'static,
    {
        let CaseOptions {
            ignore,
            only,
            message: _,
            sanitize_ops,
            sanitize_resources,
            sanitize_exit,
            before,
        } = options;
        let body: TestBody = Box::new(move || {
            if let Some(setup) = before {
                setup()?;
            }
            check()
        });
        self.cases.lock().push(TestCase {
            name: label.to_string(),
            body,
            ignore,
            only,
            sanitize: SanitizeFlags {
                ops: sanitize_ops,
                resources: sanitize_resources,
                exit: sanitize_exit,
            },
        });
    }

    /// Single-producer registration used by the predicates.
    fn register_value_check<F>(&self, label: &str, config: ValueConfig, check: F)
    where
        F: FnOnce(&Value, Option<&str>) -> Result<(), CheckError> + Send + 'static,
    {
        let ValueConfig { value, options } = config;
        let message = options.message.clone();
        self.register(label, options, move || {
            let resolved = value()?;
            check(&resolved, message.as_deref())
        });
    }

    /// Two-producer registration for the ordering checks.
    fn register_ordering(&self, label: &str, config: PairConfig, requirement: OrderingRequirement) {
        let PairConfig {
            expect,
            to_be,
            options,
        } = config;
        let message = options.message.clone();
        self.register(label, options, move || {
            let actual = expect()?;
            let expected = to_be()?;
            check::assert_ordering(&actual, &expected, requirement, message.as_deref())
        });
    }

    /// Evaluate whether two values are equal: loosely by default, strictly
    /// when `strict` is set.
    pub fn test_equal(&self, label: &str, config: EqualConfig) {
        let EqualConfig {
            expect,
            to_be,
            strict,
            options,
        } = config;
        let message = options.message.clone();
        self.register(label, options, move || {
            let actual = expect()?;
            let expected = to_be()?;
            check::assert_equal(&actual, &expected, strict, message.as_deref())
        });
    }

    /// Expect the two values to be strictly equal.
    pub fn test_same(&self, label: &str, config: PairConfig) {
        let PairConfig {
            expect,
            to_be,
            options,
        } = config;
        self.test_equal(
            label,
            EqualConfig {
                expect,
                to_be,
                strict: true,
                options,
            },
        );
    }

    /// Float equality; dispatches exactly like `test_equal`.
    pub fn test_float(&self, label: &str, config: EqualConfig) {
        self.test_equal(label, config);
    }

    /// Evaluate whether two values are not loosely equal.
    pub fn test_not_equal(&self, label: &str, config: NotEqualConfig) {
        let NotEqualConfig {
            expect,
            not_be,
            options,
        } = config;
        let message = options.message.clone();
        self.register(label, options, move || {
            let actual = expect()?;
            let unexpected = not_be()?;
            check::assert_not_equal(&actual, &unexpected, message.as_deref())
        });
    }

    /// Evaluate multiple equality cases. Registration order is preserved;
    /// execution order belongs to the scheduler.
    pub fn eval_equals(&self, cases: Vec<EqualCase>) {
        for case in cases {
            self.test_equal(&case.label, case.config);
        }
    }

    /// Fetch `url` once at run time, decode the body per `kind`, and
    /// compare it loosely against the resolved `to_be`. Network failures
    /// propagate as producer failures.
    pub fn fetch_equal(&self, label: &str, config: FetchConfig) {
        let FetchConfig {
            url,
            kind,
            to_be,
            request,
            options,
        } = config;
        let message = options.message.clone();
        self.register(label, options, move || {
            let body = fetch_body(&url, kind, &request)?;
            let expected = to_be()?;
            check::assert_equal(&body, &expected, false, message.as_deref())
        });
    }

    /// Evaluate whether the resolved list contains the resolved data.
    pub fn array_contains(&self, label: &str, config: ContainsConfig) {
        let ContainsConfig {
            value,
            contains,
            options,
        } = config;
        let message = options.message.clone();
        self.register(label, options, move || {
            let haystack = value()?;
            let wanted = contains()?;
            check::assert_list_contains(&haystack, &wanted, message.as_deref())
        });
    }

    /// Evaluate whether the resolved string contains the resolved data.
    pub fn string_contains(&self, label: &str, config: ContainsConfig) {
        let ContainsConfig {
            value,
            contains,
            options,
        } = config;
        let message = options.message.clone();
        self.register(label, options, move || {
            let haystack = value()?;
            let needle = contains()?;
            check::assert_string_contains(&haystack, &needle, message.as_deref())
        });
    }

    /// Evaluate whether the data is null.
    pub fn be_null(&self, label: &str, config: ValueConfig) {
        self.register_value_check(label, config, |resolved, message| {
            check::assert_kind(resolved, Kind::Null, message)
        });
    }

    /// Evaluate whether the data is falsy.
    pub fn be_falsy(&self, label: &str, config: ValueConfig) {
        self.register_value_check(label, config, |resolved, message| {
            check::ensure(!resolved.is_truthy(), message, || {
                format!("expected a falsy value, got {resolved}")
            })
        });
    }

    /// Evaluate whether the data is truthy.
    pub fn be_truthy(&self, label: &str, config: ValueConfig) {
        self.register_value_check(label, config, |resolved, message| {
            check::ensure(resolved.is_truthy(), message, || {
                format!("expected a truthy value, got {resolved}")
            })
        });
    }

    /// Evaluate whether the data is a wide integer.
    pub fn is_bigint(&self, label: &str, config: ValueConfig) {
        self.register_value_check(label, config, |resolved, message| {
            check::assert_kind(resolved, Kind::BigInt, message)
        });
    }

    /// Evaluate whether the data is numeric zero.
    pub fn is_zero(&self, label: &str, config: ValueConfig) {
        self.register_value_check(label, config, |resolved, message| {
            check::ensure(
                resolved.as_f64().is_some_and(|n| n == 0.0),
                message,
                || format!("expected zero, got {resolved}"),
            )
        });
    }

    /// Evaluate whether the data is NaN.
    pub fn is_nan(&self, label: &str, config: ValueConfig) {
        self.register_value_check(label, config, |resolved, message| {
            check::ensure(
                matches!(resolved, Value::Float(f) if f.is_nan()),
                message,
                || format!("expected NaN, got {resolved}"),
            )
        });
    }

    /// Evaluate whether the data is a function.
    pub fn is_function(&self, label: &str, config: ValueConfig) {
        self.register_value_check(label, config, |resolved, message| {
            check::assert_kind(resolved, Kind::Func, message)
        });
    }

    /// Evaluate whether the data is a symbol.
    pub fn is_symbol(&self, label: &str, config: ValueConfig) {
        self.register_value_check(label, config, |resolved, message| {
            check::assert_kind(resolved, Kind::Symbol, message)
        });
    }

    /// Evaluate whether the data is undefined.
    pub fn is_undefined(&self, label: &str, config: ValueConfig) {
        self.register_value_check(label, config, |resolved, message| {
            check::assert_kind(resolved, Kind::Undefined, message)
        });
    }

    /// Evaluate whether the data is a string.
    pub fn is_string(&self, label: &str, config: ValueConfig) {
        self.register_value_check(label, config, |resolved, message| {
            check::assert_kind(resolved, Kind::Str, message)
        });
    }

    /// Evaluate whether the data is a machine or floating-point number.
    /// Wide integers have their own predicate.
    pub fn is_number(&self, label: &str, config: ValueConfig) {
        self.register_value_check(label, config, |resolved, message| {
            check::ensure(
                matches!(resolved.kind(), Kind::Int | Kind::Float),
                message,
                || format!("expected a number, got {} ({resolved})", resolved.kind()),
            )
        });
    }

    /// Evaluate whether the data is empty: `""`, `[]`, or `{}`.
    pub fn is_empty(&self, label: &str, config: ValueConfig) {
        self.register_value_check(label, config, |resolved, message| {
            check::ensure(resolved.is_empty(), message, || {
                format!("expected an empty value, got {resolved}")
            })
        });
    }

    /// Expect the first value to be greater.
    pub fn test_greater(&self, label: &str, config: PairConfig) {
        self.register_ordering(label, config, OrderingRequirement::Greater);
    }

    /// Expect the first value to be greater or equal.
    pub fn test_greater_or_equal(&self, label: &str, config: PairConfig) {
        self.register_ordering(label, config, OrderingRequirement::GreaterOrEqual);
    }

    /// Expect the first value to be less.
    pub fn test_less(&self, label: &str, config: PairConfig) {
        self.register_ordering(label, config, OrderingRequirement::Less);
    }

    /// Expect the first value to be less or equal.
    pub fn test_less_or_equal(&self, label: &str, config: PairConfig) {
        self.register_ordering(label, config, OrderingRequirement::LessOrEqual);
    }

    /// Expect both values to share a runtime kind.
    pub fn test_instance_of(&self, label: &str, config: PairConfig) {
        let PairConfig {
            expect,
            to_be,
            options,
        } = config;
        let message = options.message.clone();
        self.register(label, options, move || {
            let actual = expect()?;
            let expected = to_be()?;
            check::assert_same_kind(&actual, &expected, message.as_deref())
        });
    }

    /// Expect both values to have the same length.
    pub fn same_length(&self, label: &str, config: PairConfig) {
        let PairConfig {
            expect,
            to_be,
            options,
        } = config;
        let message = options.message.clone();
        self.register(label, options, move || {
            let actual = expect()?;
            let expected = to_be()?;
            check::assert_same_length(&actual, &expected, message.as_deref())
        });
    }

    /// Expect the resolved string to match a regex pattern.
    pub fn test_match(&self, label: &str, config: MatchConfig) {
        let MatchConfig {
            value,
            pattern,
            options,
        } = config;
        let message = options.message.clone();
        self.register(label, options, move || {
            let resolved = value()?;
            check::assert_match(&resolved, &pattern, message.as_deref())
        });
    }

    /// Expect every property of the resolved value to appear in the
    /// resolved expectation. Missing keys are printed before the failure.
    pub fn have_property(&self, label: &str, config: ContainsConfig) {
        let ContainsConfig {
            value,
            contains,
            options,
        } = config;
        let message = options.message.clone();
        self.register(label, options, move || {
            let actual = value()?;
            let expected = contains()?;
            check::assert_properties(&actual, &expected, message.as_deref())
        });
    }

    /// Expect the action to raise (error or panic), optionally with a
    /// failure text containing `contains`.
    pub fn test_throws(&self, label: &str, config: ThrowsConfig) {
        let ThrowsConfig {
            action,
            contains,
            options,
        } = config;
        let message = options.message.clone();
        self.register(label, options, move || {
            check::assert_throws(action, contains.as_deref(), message.as_deref())
        });
    }

    /// Register a case that always fails.
    pub fn force_fail(&self, label: &str, options: CaseOptions) {
        let message = options.message.clone();
        self.register(label, options, move || check::fail(message.as_deref()));
    }

    /// Stub a case whose body is not written yet.
    pub fn unimplemented(&self, label: &str, options: CaseOptions) {
        self.register(label, options, check::not_implemented);
    }

    /// Mark a case the author considers impossible to reach.
    pub fn unreachable(&self, label: &str, options: CaseOptions) {
        self.register(label, options, check::not_reachable);
    }
}

impl Default for Merlin {
    fn default() -> Self {
        Merlin::new()
    }
}

/// Perform the single GET of the network equality check and decode the
/// body.
fn fetch_body(url: &str, kind: BodyKind, request: &RequestOptions) -> Result<Value, CheckError> {
    let mut builder = reqwest::blocking::Client::builder();
    if let Some(timeout) = request.timeout {
        builder = builder.timeout(timeout);
    }
    let client = builder.build().map_err(network_error)?;
    let mut get = client.get(url);
    for (name, value) in &request.headers {
        get = get.header(name, value);
    }
    let response = get.send().map_err(network_error)?;
    match kind {
        BodyKind::Text => Ok(Value::string(response.text().map_err(network_error)?)),
        BodyKind::Json => {
            let json: serde_json::Value = response.json().map_err(network_error)?;
            Ok(Value::from(json))
        }
    }
}

fn network_error(error: reqwest::Error) -> CheckError {
    CheckError::Network(error.to_string())
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
