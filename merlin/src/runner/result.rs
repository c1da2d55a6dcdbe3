//! Case result types.

use std::time::Duration;

/// Outcome of a single case.
#[derive(Clone, Debug)]
pub enum TestOutcome {
    /// Case passed.
    Passed,
    /// Case failed with an error message.
    Failed(String),
    /// Case was skipped with a reason.
    Skipped(String),
}

impl TestOutcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, TestOutcome::Passed)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, TestOutcome::Failed(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, TestOutcome::Skipped(_))
    }
}

/// Result of running a single case.
#[derive(Clone, Debug)]
pub struct TestResult {
    /// Case label.
    pub name: String,
    /// Outcome of the case.
    pub outcome: TestOutcome,
    /// Time taken to run the case body.
    pub duration: Duration,
}

impl TestResult {
    /// Create a passed result.
    pub fn passed(name: impl Into<String>, duration: Duration) -> Self {
        TestResult {
            name: name.into(),
            outcome: TestOutcome::Passed,
            duration,
        }
    }

    /// Create a failed result.
    #[cold]
    pub fn failed(name: impl Into<String>, error: String, duration: Duration) -> Self {
        TestResult {
            name: name.into(),
            outcome: TestOutcome::Failed(error),
            duration,
        }
    }

    /// Create a skipped result.
    #[cold]
    pub fn skipped(name: impl Into<String>, reason: impl Into<String>) -> Self {
        TestResult {
            name: name.into(),
            outcome: TestOutcome::Skipped(reason.into()),
            duration: Duration::ZERO,
        }
    }
}

/// Aggregated results for a whole run.
#[derive(Clone, Debug, Default)]
pub struct TestSummary {
    /// Individual case results, in registration order.
    pub results: Vec<TestResult>,
    /// Number of cases that passed.
    pub passed: usize,
    /// Number of cases that failed.
    pub failed: usize,
    /// Number of cases that were skipped (`ignore`).
    pub skipped: usize,
    /// Cases excluded by `only` restriction or name filter.
    pub filtered_out: usize,
    /// Wall time for the whole run.
    pub duration: Duration,
}

impl TestSummary {
    pub fn new() -> Self {
        TestSummary::default()
    }

    pub fn add_result(&mut self, result: TestResult) {
        match &result.outcome {
            TestOutcome::Passed => self.passed += 1,
            TestOutcome::Failed(_) => self.failed += 1,
            TestOutcome::Skipped(_) => self.skipped += 1,
        }
        self.results.push(result);
    }

    /// Number of cases that were considered (passed, failed, or skipped).
    pub fn total(&self) -> usize {
        self.passed + self.failed + self.skipped
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// Exit code: 0 = all pass, 1 = failures, 2 = no cases found.
    pub fn exit_code(&self) -> i32 {
        if self.total() == 0 && self.filtered_out == 0 {
            2
        } else {
            i32::from(self.has_failures())
        }
    }
}
