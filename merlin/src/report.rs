//! Console reporting for run summaries.

use colored::Colorize;

use crate::runner::{TestOutcome, TestSummary};

/// Print a summary of case results, with optional verbose output.
///
/// Passing and skipped cases are listed only in verbose mode; failures
/// always print with their message.
pub fn print_summary(summary: &TestSummary, verbose: bool) {
    for result in &summary.results {
        let status = match &result.outcome {
            TestOutcome::Passed => {
                if verbose {
                    format!("  {}: {} ({:.2?})", "PASS".green(), result.name, result.duration)
                } else {
                    continue;
                }
            }
            TestOutcome::Failed(msg) => {
                format!("  {}: {} - {}", "FAIL".red(), result.name, msg)
            }
            TestOutcome::Skipped(reason) => {
                if verbose {
                    format!("  {}: {} - {}", "SKIP".yellow(), result.name, reason)
                } else {
                    continue;
                }
            }
        };
        println!("{status}");
    }

    println!();
    println!("Test Summary:");
    println!(
        "  {} passed, {} failed, {} skipped ({} total, {} filtered out)",
        summary.passed,
        summary.failed,
        summary.skipped,
        summary.total(),
        summary.filtered_out
    );
    println!("  Completed in {:.2?}", summary.duration);

    println!();
    if summary.has_failures() {
        println!("{}", "FAILED".red());
    } else if summary.total() == 0 && summary.filtered_out == 0 {
        println!("{}", "NO TESTS FOUND".yellow());
    } else {
        println!("{}", "OK".green());
    }
}
