//! Measurement results and threshold classification.

use std::time::Duration;

use serde::{Serialize, Serializer};

/// Timing for one completed benchmark.
#[derive(Clone, Debug, Serialize)]
pub struct BenchResult {
    /// Benchmark name.
    pub name: String,
    /// Number of measured runs.
    pub steps: u32,
    /// Wall time across all runs.
    #[serde(serialize_with = "as_millis")]
    pub total: Duration,
    /// Mean time per run.
    #[serde(serialize_with = "as_millis")]
    pub mean: Duration,
    /// Fastest single run.
    #[serde(serialize_with = "as_millis")]
    pub min: Duration,
    /// Slowest single run.
    #[serde(serialize_with = "as_millis")]
    pub max: Duration,
}

impl BenchResult {
    /// Mean time as a percentage of `slowest`, the largest mean in the
    /// batch. The slowest benchmark reads 100.
    pub fn percent_of(&self, slowest: Duration) -> f64 {
        if slowest.is_zero() {
            return 100.0;
        }
        self.mean.as_secs_f64() / slowest.as_secs_f64() * 100.0
    }
}

/// Durations are exported as fractional milliseconds.
fn as_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64() * 1000.0)
}

/// Percentage cutoffs for coloring a benchmark against the slowest mean
/// in its batch.
#[derive(Clone, Copy, Debug)]
pub struct Threshold {
    /// At or below this percentage, the benchmark reads green.
    pub green: f64,
    /// At or below this percentage, yellow. Above it, red.
    pub yellow: f64,
}

impl Threshold {
    pub fn band(self, percent: f64) -> ThresholdBand {
        if percent <= self.green {
            ThresholdBand::Green
        } else if percent <= self.yellow {
            ThresholdBand::Yellow
        } else {
            ThresholdBand::Red
        }
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Threshold {
            green: 70.0,
            yellow: 90.0,
        }
    }
}

/// Classification of a benchmark relative to the slowest in its batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThresholdBand {
    Green,
    Yellow,
    Red,
}
