//! Maven - declarative benchmarking over config records
//!
//! Benchmarks are registered by name against a [`Maven`] instance, run
//! sequentially with per-run wall timing, and reported through pure
//! renderers or timestamped file exports.
//!
//! ```text
//! Maven::bench(config)
//!     │
//!     ▼
//! run_bench() ──► Vec<BenchResult> ──► result() / emit()
//! ```

use std::time::Instant;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

pub mod report;
pub mod result;

pub use report::{emit, emit_to, render_markdown, render_table, EmitOptions, TableRenderer};
pub use result::{BenchResult, Threshold, ThresholdBand};

/// Benchmark body, called once per step.
pub type BenchFn = Box<dyn FnMut() + Send + 'static>;

/// One benchmark registration.
pub struct BenchConfig {
    /// Benchmark name; re-registering a name replaces the earlier entry.
    pub name: String,
    /// Number of measured runs. Zero is clamped to one.
    pub steps: u32,
    /// The body to measure.
    pub action: BenchFn,
}

/// Options for [`Maven::run_bench`].
#[derive(Clone, Copy, Debug)]
pub struct RunOptions {
    /// Suppress per-benchmark progress lines.
    pub silent: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        RunOptions { silent: true }
    }
}

struct BenchCase {
    name: String,
    steps: u32,
    action: BenchFn,
}

#[derive(Default)]
struct Registry {
    cases: Vec<BenchCase>,
    thresholds: FxHashMap<String, Threshold>,
    results: Vec<BenchResult>,
}

/// Declarative benchmark suite.
pub struct Maven {
    registry: Mutex<Registry>,
}

impl Maven {
    /// Create an empty suite.
    pub fn new() -> Self {
        Maven {
            registry: Mutex::new(Registry::default()),
        }
    }

    /// Register a benchmark. Each registration also gets the standard
    /// threshold entry under its name; a name collision replaces both.
    pub fn bench(&self, config: BenchConfig) {
        let BenchConfig { name, steps, action } = config;
        let case = BenchCase {
            name: name.clone(),
            steps: steps.max(1),
            action,
        };

        let mut registry = self.registry.lock();
        match registry.cases.iter_mut().find(|c| c.name == name) {
            Some(existing) => {
                tracing::debug!(name = %name, "replacing benchmark registration");
                *existing = case;
            }
            None => registry.cases.push(case),
        }
        registry.thresholds.insert(name, Threshold::default());
    }

    /// Run every registered benchmark sequentially, in registration
    /// order, and return the measurements. Results are also retained for
    /// [`Maven::result`] and [`Maven::emit`].
    ///
    /// The registry lock is not held while actions run, so an action may
    /// call back into the same instance.
    pub fn run_bench(&self, options: RunOptions) -> Vec<BenchResult> {
        let mut cases = std::mem::take(&mut self.registry.lock().cases);
        let mut results = Vec::with_capacity(cases.len());

        for case in &mut cases {
            if !options.silent {
                println!("running {} ({} steps)", case.name, case.steps);
            }
            results.push(measure(case));
            if !options.silent {
                let latest = &results[results.len() - 1];
                println!(
                    "  done in {:.2}ms (mean {:.2}ms)",
                    latest.total.as_secs_f64() * 1000.0,
                    latest.mean.as_secs_f64() * 1000.0
                );
            }
        }

        let mut registry = self.registry.lock();
        let added_during_run = std::mem::replace(&mut registry.cases, cases);
        for case in added_during_run {
            match registry.cases.iter_mut().find(|c| c.name == case.name) {
                Some(existing) => *existing = case,
                None => registry.cases.push(case),
            }
        }
        registry.results = results.clone();
        results
    }

    /// Measurements from the most recent run.
    pub fn results(&self) -> Vec<BenchResult> {
        self.registry.lock().results.clone()
    }

    /// Build a table renderer over a snapshot of the threshold map.
    /// `graph_bars` is the bar width given to the slowest benchmark.
    /// The renderer never prints.
    pub fn result(&self, graph_bars: u32) -> TableRenderer {
        TableRenderer::new(self.registry.lock().thresholds.clone(), graph_bars)
    }

    /// Export the most recent run to timestamped files.
    pub fn emit(&self, options: &EmitOptions) -> std::io::Result<Vec<std::path::PathBuf>> {
        report::emit(&self.registry.lock().results, options)
    }
}

impl Default for Maven {
    fn default() -> Self {
        Maven::new()
    }
}

/// Time one case: `steps` runs, each individually clocked.
fn measure(case: &mut BenchCase) -> BenchResult {
    let mut runs = Vec::with_capacity(case.steps as usize);
    for _ in 0..case.steps {
        let start = Instant::now();
        (case.action)();
        runs.push(start.elapsed());
    }

    let total: std::time::Duration = runs.iter().sum();
    BenchResult {
        name: case.name.clone(),
        steps: case.steps,
        total,
        mean: total / case.steps,
        min: runs.iter().copied().min().unwrap_or_default(),
        max: runs.iter().copied().max().unwrap_or_default(),
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
