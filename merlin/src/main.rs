//! Merlin CLI
//!
//! Thin launcher around the host test runner. Suites written with
//! [`merlin::Merlin`] live inside ordinary test functions, so `merlin
//! start` simply delegates to `cargo test`, forwarding any extra
//! arguments.

use std::process::Command;

use colored::Colorize;

fn main() {
    merlin::init_tracing();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];

    match command.as_str() {
        "start" | "test" => {
            run_host_tests(&args[2..]);
        }
        "help" | "--help" | "-h" => {
            print_usage();
        }
        "version" | "--version" | "-v" => {
            println!("Merlin {}", env!("CARGO_PKG_VERSION"));
            println!("Declarative testing over config records");
            match Command::new("cargo").arg("--version").output() {
                Ok(output) => {
                    print!("host runner: {}", String::from_utf8_lossy(&output.stdout));
                }
                Err(_) => println!("host runner: cargo (not found)"),
            }
        }
        _ => {
            eprintln!("{} unknown command '{command}'", "error:".red());
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

/// Delegate to `cargo test`, forwarding extra arguments verbatim, and
/// exit with the child's status code.
fn run_host_tests(extra: &[String]) {
    let status = Command::new("cargo").arg("test").args(extra).status();
    match status {
        Ok(status) => {
            std::process::exit(status.code().unwrap_or(1));
        }
        Err(e) => {
            eprintln!("{} failed to launch cargo: {e}", "error:".red());
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!("Merlin (declarative testing over config records)");
    println!();
    println!("Usage: merlin <command> [options]");
    println!();
    println!("Commands:");
    println!("  start [args...]   Run the project's tests via cargo test");
    println!("  test [args...]    Alias for start");
    println!("  help              Show this help message");
    println!("  version           Show version information");
    println!();
    println!("Examples:");
    println!("  merlin start");
    println!("  merlin start my_suite -- --nocapture");
    println!("  merlin test --package merlin");
}
