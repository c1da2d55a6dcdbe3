//! Rendering and export of benchmark results.
//!
//! Renderers return strings and never print; the caller decides where
//! the output goes.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use colored::Colorize;
use rustc_hash::FxHashMap;

use crate::result::{BenchResult, Threshold, ThresholdBand};

/// Options for [`emit`].
pub struct EmitOptions {
    /// File name prefix; a millisecond timestamp is appended.
    pub file_name: String,
    /// Report title.
    pub title: String,
    /// Paragraph printed under the title.
    pub description: Option<String>,
    /// Also write the raw results as JSON.
    pub json: bool,
    /// Output directory.
    pub dir: PathBuf,
}

impl Default for EmitOptions {
    fn default() -> Self {
        EmitOptions {
            file_name: "bench".to_string(),
            title: "Benchmark Results".to_string(),
            description: None,
            json: false,
            dir: PathBuf::from("."),
        }
    }
}

/// Table renderer carrying a snapshot of the threshold map.
///
/// Splitting the snapshot from rendering lets callers render the same
/// result set repeatedly without re-locking the registry.
pub struct TableRenderer {
    thresholds: FxHashMap<String, Threshold>,
    graph_bars: u32,
}

impl TableRenderer {
    pub fn new(thresholds: FxHashMap<String, Threshold>, graph_bars: u32) -> Self {
        TableRenderer {
            thresholds,
            graph_bars,
        }
    }

    /// Produce the colorized table. Never prints.
    pub fn render(&self, results: &[BenchResult]) -> String {
        render_table(results, &self.thresholds, self.graph_bars)
    }
}

fn format_millis(duration: Duration) -> String {
    format!("{:.2}ms", duration.as_secs_f64() * 1000.0)
}

/// Largest mean in the batch; the reference point for percentages.
fn slowest_mean(results: &[BenchResult]) -> Duration {
    results
        .iter()
        .map(|r| r.mean)
        .max()
        .unwrap_or(Duration::ZERO)
}

/// Render a console table of results. The mean column is colored by the
/// benchmark's threshold band; `graph_bars` is the bar width of the
/// slowest benchmark, with faster rows scaled down proportionally.
/// Zero disables the graph column.
pub fn render_table(
    results: &[BenchResult],
    thresholds: &FxHashMap<String, Threshold>,
    graph_bars: u32,
) -> String {
    if results.is_empty() {
        return "no benchmarks to report\n".to_string();
    }

    let slowest = slowest_mean(results);
    let name_width = results
        .iter()
        .map(|r| r.name.len())
        .max()
        .unwrap_or(0)
        .max("benchmark".len());

    let mut out = String::new();
    out.push_str(&format!(
        "{:<name_width$}  {:>6}  {:>12}  {:>12}  {:>12}  {:>12}\n",
        "benchmark", "steps", "total", "mean", "min", "max"
    ));

    for result in results {
        let percent = result.percent_of(slowest);
        let threshold = thresholds.get(&result.name).copied().unwrap_or_default();
        let mean = format!("{:>12}", format_millis(result.mean));
        let mean = match threshold.band(percent) {
            ThresholdBand::Green => mean.green(),
            ThresholdBand::Yellow => mean.yellow(),
            ThresholdBand::Red => mean.red(),
        };

        out.push_str(&format!(
            "{:<name_width$}  {:>6}  {:>12}  {mean}  {:>12}  {:>12}",
            result.name,
            result.steps,
            format_millis(result.total),
            format_millis(result.min),
            format_millis(result.max)
        ));

        if graph_bars > 0 {
            #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let bar_length = (percent / 100.0 * f64::from(graph_bars)).round() as usize;
            out.push_str(&format!("  {} {percent:.0}%", "=".repeat(bar_length)));
        }
        out.push('\n');
    }
    out
}

/// Render results as a markdown report: title, optional description
/// paragraph, generation timestamp, and the results table.
pub fn render_markdown(
    results: &[BenchResult],
    title: &str,
    description: Option<&str>,
) -> String {
    let mut out = String::new();
    out.push_str(&format!("# {title}\n\n"));
    if let Some(description) = description {
        out.push_str(&format!("{description}\n\n"));
    }
    out.push_str(&format!(
        "Generated {}.\n\n",
        chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
    ));
    out.push_str("| Name | Steps | Total (ms) | Mean (ms) | Min (ms) | Max (ms) |\n");
    out.push_str("| --- | ---: | ---: | ---: | ---: | ---: |\n");
    for result in results {
        out.push_str(&format!(
            "| {} | {} | {:.2} | {:.2} | {:.2} | {:.2} |\n",
            result.name,
            result.steps,
            result.total.as_secs_f64() * 1000.0,
            result.mean.as_secs_f64() * 1000.0,
            result.min.as_secs_f64() * 1000.0,
            result.max.as_secs_f64() * 1000.0
        ));
    }
    out
}

/// Write results to timestamped files and return the paths written.
///
/// A markdown report is always written; a JSON dump is added when
/// `options.json` is set. Both share the `<prefix>-<epoch millis>`
/// stem.
pub fn emit(results: &[BenchResult], options: &EmitOptions) -> io::Result<Vec<PathBuf>> {
    let stem = format!("{}-{}", options.file_name, chrono::Utc::now().timestamp_millis());
    let mut written = Vec::new();

    let markdown_path = options.dir.join(format!("{stem}.md"));
    let markdown = render_markdown(results, &options.title, options.description.as_deref());
    std::fs::write(&markdown_path, markdown)?;
    tracing::debug!(path = %markdown_path.display(), "wrote markdown report");
    written.push(markdown_path);

    if options.json {
        let json = serde_json::to_string_pretty(results).map_err(io::Error::other)?;
        let json_path = options.dir.join(format!("{stem}.json"));
        std::fs::write(&json_path, json)?;
        tracing::debug!(path = %json_path.display(), "wrote json report");
        written.push(json_path);
    }
    Ok(written)
}

/// Emit into an explicit directory, keeping the other defaults.
pub fn emit_to(results: &[BenchResult], dir: &Path, json: bool) -> io::Result<Vec<PathBuf>> {
    emit(
        results,
        &EmitOptions {
            json,
            dir: dir.to_path_buf(),
            ..EmitOptions::default()
        },
    )
}
