//! Merlin - declarative testing over config records
//!
//! Checks are registered by name against a [`Merlin`] suite: one call,
//! one case, each taking a label plus a config record of producer
//! closures. Producers resolve lazily at run time, in declaration order,
//! and the resolved values flow into a shared set of check primitives.
//!
//! # Architecture
//!
//! ```text
//! Merlin::test_equal(label, config)
//!     │
//!     ▼
//! TestCase (body = before hook + producers + check)
//!     │
//!     ▼
//! Runner::run() ──► TestSummary ──► print_summary()
//! ```
//!
//! The scheduler runs cases in parallel by default, honors `ignore`,
//! `only`, and name filters, and turns panics into failures.

pub mod check;
pub mod config;
pub mod report;
pub mod runner;
pub mod suite;
pub mod value;

// Re-exports for convenience
pub use check::{CheckError, OrderingRequirement};
pub use config::{
    BodyKind, CaseOptions, ContainsConfig, EqualCase, EqualConfig, FetchConfig, MatchConfig,
    NotEqualConfig, PairConfig, RequestOptions, ThrowsConfig, ValueConfig,
};
pub use report::print_summary;
pub use runner::{
    Runner, RunnerConfig, SanitizeFlags, TestCase, TestOutcome, TestResult, TestSummary,
};
pub use suite::Merlin;
pub use value::{Kind, Value};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Call this once at startup. Safe to call multiple times.
/// Enable with `RUST_LOG=merlin=debug` or `RUST_LOG=merlin=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
