use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use pretty_assertions::assert_eq;

use super::{BenchConfig, Maven, RunOptions};

fn noop_bench(name: &str, steps: u32) -> BenchConfig {
    BenchConfig {
        name: name.to_string(),
        steps,
        action: Box::new(|| {}),
    }
}

#[test]
fn body_runs_once_per_step() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&calls);

    let maven = Maven::new();
    maven.bench(BenchConfig {
        name: "counted".to_string(),
        steps: 7,
        action: Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }),
    });

    let results = maven.run_bench(RunOptions::default());
    assert_eq!(calls.load(Ordering::SeqCst), 7);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].steps, 7);
    assert!(results[0].min <= results[0].mean);
    assert!(results[0].mean <= results[0].max);
}

#[test]
fn zero_steps_is_clamped_to_one() {
    let maven = Maven::new();
    maven.bench(noop_bench("clamped", 0));

    let results = maven.run_bench(RunOptions::default());
    assert_eq!(results[0].steps, 1);
}

#[test]
fn name_collision_replaces_the_registration() {
    let first = Arc::new(AtomicU32::new(0));
    let second = Arc::new(AtomicU32::new(0));
    let (a, b) = (Arc::clone(&first), Arc::clone(&second));

    let maven = Maven::new();
    maven.bench(BenchConfig {
        name: "shared".to_string(),
        steps: 1,
        action: Box::new(move || {
            a.fetch_add(1, Ordering::SeqCst);
        }),
    });
    maven.bench(BenchConfig {
        name: "shared".to_string(),
        steps: 3,
        action: Box::new(move || {
            b.fetch_add(1, Ordering::SeqCst);
        }),
    });

    let results = maven.run_bench(RunOptions::default());
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].steps, 3);
    assert_eq!(first.load(Ordering::SeqCst), 0);
    assert_eq!(second.load(Ordering::SeqCst), 3);
}

#[test]
fn results_are_retained_for_rendering() {
    let maven = Maven::new();
    maven.bench(noop_bench("render_me", 2));
    maven.run_bench(RunOptions::default());

    assert_eq!(maven.results().len(), 1);
    let table = maven.result(3).render(&maven.results());
    assert!(table.contains("render_me"));
}

#[test]
fn action_may_use_the_same_instance() {
    let maven = Arc::new(Maven::new());
    let inner = Arc::clone(&maven);
    maven.bench(BenchConfig {
        name: "reentrant".to_string(),
        steps: 2,
        action: Box::new(move || {
            // Reads back through the registry mid-run.
            let _ = inner.results();
        }),
    });

    let results = maven.run_bench(RunOptions::default());
    assert_eq!(results.len(), 1);
    assert_eq!(maven.results().len(), 1);
}

#[test]
fn registration_during_a_run_is_kept() {
    let maven = Arc::new(Maven::new());
    let inner = Arc::clone(&maven);
    maven.bench(BenchConfig {
        name: "registrar".to_string(),
        steps: 1,
        action: Box::new(move || {
            inner.bench(BenchConfig {
                name: "late".to_string(),
                steps: 1,
                action: Box::new(|| {}),
            });
        }),
    });

    maven.run_bench(RunOptions::default());
    // The case registered mid-run survives for the next batch.
    let names: Vec<String> = maven
        .run_bench(RunOptions::default())
        .into_iter()
        .map(|r| r.name)
        .collect();
    assert!(names.contains(&"registrar".to_string()));
    assert!(names.contains(&"late".to_string()));
}

#[test]
fn run_order_matches_registration_order() {
    let maven = Maven::new();
    maven.bench(noop_bench("first", 1));
    maven.bench(noop_bench("second", 1));
    maven.bench(noop_bench("third", 1));

    let names: Vec<String> = maven
        .run_bench(RunOptions::default())
        .into_iter()
        .map(|r| r.name)
        .collect();
    assert_eq!(names, vec!["first", "second", "third"]);
}

#[test]
fn emit_uses_the_retained_results() {
    let dir = tempfile::tempdir().unwrap();
    let maven = Maven::new();
    maven.bench(noop_bench("persisted", 1));
    maven.run_bench(RunOptions::default());

    let written = maven
        .emit(&super::EmitOptions {
            json: true,
            dir: dir.path().to_path_buf(),
            ..super::EmitOptions::default()
        })
        .unwrap();
    assert_eq!(written.len(), 2);
    assert!(std::fs::read_to_string(&written[0]).unwrap().contains("persisted"));
}
