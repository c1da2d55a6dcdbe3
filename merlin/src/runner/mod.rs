//! In-process case scheduler.
//!
//! The suite hands registered [`TestCase`]s to a [`Runner`], which decides
//! which cases execute (`ignore`, `only`, name filter), runs each body
//! under `catch_unwind` so a panicking case is a failure rather than a
//! crash, and aggregates a [`TestSummary`].
//!
//! The sanitize flags on a case are carried through untouched; this
//! scheduler surfaces them in trace output but does not implement leak
//! detection.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Instant;

use rayon::prelude::*;

use crate::check::{panic_message, CheckError};

mod result;

pub use result::{TestOutcome, TestResult, TestSummary};

/// Boxed case body. Returning `Err` fails the case.
pub type TestBody = Box<dyn FnOnce() -> Result<(), CheckError> + Send + 'static>;

/// Post-case leak-detection requests, forwarded verbatim from the case
/// options. Enforcement belongs to the host environment.
#[derive(Clone, Copy, Debug)]
pub struct SanitizeFlags {
    pub ops: bool,
    pub resources: bool,
    pub exit: bool,
}

impl SanitizeFlags {
    pub fn all_enabled(self) -> bool {
        self.ops && self.resources && self.exit
    }
}

impl Default for SanitizeFlags {
    fn default() -> Self {
        SanitizeFlags {
            ops: true,
            resources: true,
            exit: true,
        }
    }
}

/// A registered case, ready for scheduling.
pub struct TestCase {
    /// Case label (uniqueness is not enforced).
    pub name: String,
    /// The check body, including any setup hook.
    pub body: TestBody,
    /// Never execute the body; report the case as skipped.
    pub ignore: bool,
    /// Restrict the run to flagged cases.
    pub only: bool,
    /// Leak-detection requests, carried through untouched.
    pub sanitize: SanitizeFlags,
}

/// Configuration for the runner.
#[derive(Clone, Debug)]
pub struct RunnerConfig {
    /// Filter cases by name pattern (substring match).
    pub filter: Option<String>,
    /// Enable verbose output when the summary is printed.
    pub verbose: bool,
    /// Run cases in parallel.
    pub parallel: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        RunnerConfig {
            filter: None,
            verbose: false,
            parallel: true,
        }
    }
}

/// Case runner.
pub struct Runner {
    config: RunnerConfig,
}

impl Runner {
    /// Create a runner with default config.
    pub fn new() -> Self {
        Runner {
            config: RunnerConfig::default(),
        }
    }

    /// Create a runner with custom config.
    pub fn with_config(config: RunnerConfig) -> Self {
        Runner { config }
    }

    /// Run a batch of cases and aggregate the results.
    ///
    /// If any case is flagged `only`, all non-flagged cases are suppressed
    /// and counted as filtered out. Result order matches registration
    /// order even under parallel execution.
    pub fn run(&self, cases: Vec<TestCase>) -> TestSummary {
        let start = Instant::now();
        let mut summary = TestSummary::new();

        let restricted = cases.iter().any(|case| case.only);
        let mut selected = Vec::new();
        for case in cases {
            let matches_filter = self
                .config
                .filter
                .as_ref()
                .is_none_or(|pattern| case.name.contains(pattern.as_str()));
            if (restricted && !case.only) || !matches_filter {
                summary.filtered_out += 1;
                continue;
            }
            selected.push(case);
        }

        let results = if self.config.parallel {
            run_batch_parallel(selected)
        } else {
            selected.into_iter().map(run_case).collect()
        };

        for result in results {
            summary.add_result(result);
        }
        summary.duration = start.elapsed();
        summary
    }
}

impl Default for Runner {
    fn default() -> Self {
        Runner::new()
    }
}

/// Run cases on a dedicated rayon pool, preserving order.
///
/// Pool creation failure degrades to sequential execution.
fn run_batch_parallel(cases: Vec<TestCase>) -> Vec<TestResult> {
    match rayon::ThreadPoolBuilder::new().build() {
        Ok(pool) => pool.install(|| cases.into_par_iter().map(run_case).collect()),
        Err(e) => {
            tracing::warn!("failed to create thread pool ({e}), running sequentially");
            cases.into_iter().map(run_case).collect()
        }
    }
}

/// Execute one case body, converting errors and panics into outcomes.
fn run_case(case: TestCase) -> TestResult {
    if case.ignore {
        return TestResult::skipped(case.name, "ignored");
    }
    if !case.sanitize.all_enabled() {
        tracing::debug!(
            case = %case.name,
            ops = case.sanitize.ops,
            resources = case.sanitize.resources,
            exit = case.sanitize.exit,
            "sanitizers partially disabled"
        );
    }

    let name = case.name;
    let start = Instant::now();
    match catch_unwind(AssertUnwindSafe(case.body)) {
        Ok(Ok(())) => TestResult::passed(name, start.elapsed()),
        Ok(Err(error)) => TestResult::failed(name, error.to_string(), start.elapsed()),
        Err(payload) => TestResult::failed(name, panic_message(payload.as_ref()), start.elapsed()),
    }
}
