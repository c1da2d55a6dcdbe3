use std::io::{Read as _, Write as _};
use std::net::TcpListener;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;
use pretty_assertions::assert_eq;

use super::Merlin;
use crate::config::{
    self, BodyKind, CaseOptions, ContainsConfig, EqualCase, EqualConfig, FetchConfig, MatchConfig,
    NotEqualConfig, PairConfig, RequestOptions, ThrowsConfig, ValueConfig,
};
use crate::runner::{RunnerConfig, TestOutcome};
use crate::value::Value;

fn sequential() -> RunnerConfig {
    RunnerConfig {
        parallel: false,
        ..RunnerConfig::default()
    }
}

fn failure_message(outcome: &TestOutcome) -> &str {
    let TestOutcome::Failed(message) = outcome else {
        panic!("expected a failure, got {outcome:?}");
    };
    message
}

#[test]
fn loose_equality_coerces_numeric_strings() {
    let suite = Merlin::new();
    suite.test_equal(
        "one equals \"1\"",
        EqualConfig {
            expect: config::value(1),
            to_be: config::value("1"),
            strict: false,
            options: CaseOptions::new(),
        },
    );
    let summary = suite.run();
    assert_eq!(summary.passed, 1);
}

#[test]
fn strict_equality_rejects_the_same_coercion() {
    let suite = Merlin::new();
    suite.test_same(
        "one is not \"1\"",
        PairConfig {
            expect: config::value(1),
            to_be: config::value("1"),
            options: CaseOptions::new(),
        },
    );
    let summary = suite.run();
    assert_eq!(summary.failed, 1);
}

#[test]
fn ignored_case_never_invokes_its_producers() {
    let touched = Arc::new(AtomicBool::new(false));
    let seen = Arc::clone(&touched);

    let suite = Merlin::new();
    suite.test_equal(
        "ignored",
        EqualConfig {
            expect: config::produce(move || {
                seen.store(true, Ordering::SeqCst);
                1
            }),
            to_be: config::value(1),
            strict: false,
            options: CaseOptions {
                ignore: true,
                ..CaseOptions::new()
            },
        },
    );

    let summary = suite.run();
    assert_eq!(summary.skipped, 1);
    assert!(!touched.load(Ordering::SeqCst));
}

#[test]
fn before_hook_runs_ahead_of_producers() {
    let trace = Arc::new(Mutex::new(Vec::new()));
    let (t1, t2, t3) = (Arc::clone(&trace), Arc::clone(&trace), Arc::clone(&trace));

    let suite = Merlin::new();
    suite.test_equal(
        "ordering",
        EqualConfig {
            expect: config::produce(move || {
                t2.lock().push("expect");
                7
            }),
            to_be: config::produce(move || {
                t3.lock().push("to_be");
                7
            }),
            strict: false,
            options: CaseOptions {
                before: Some(config::hook(move || t1.lock().push("before"))),
                ..CaseOptions::new()
            },
        },
    );

    let summary = suite.run_with(sequential());
    assert_eq!(summary.passed, 1);
    assert_eq!(*trace.lock(), vec!["before", "expect", "to_be"]);
}

#[test]
fn failing_hook_suppresses_producers() {
    let touched = Arc::new(AtomicBool::new(false));
    let seen = Arc::clone(&touched);

    let suite = Merlin::new();
    suite.test_equal(
        "hook fails",
        EqualConfig {
            expect: config::produce(move || {
                seen.store(true, Ordering::SeqCst);
                1
            }),
            to_be: config::value(1),
            strict: false,
            options: CaseOptions {
                before: Some(config::try_hook(|| Err("database offline"))),
                ..CaseOptions::new()
            },
        },
    );

    let summary = suite.run();
    assert_eq!(summary.failed, 1);
    let message = failure_message(&summary.results[0].outcome);
    assert!(message.contains("setup hook failed"));
    assert!(message.contains("database offline"));
    assert!(!touched.load(Ordering::SeqCst));
}

#[test]
fn custom_message_overrides_the_default() {
    let suite = Merlin::new();
    suite.test_equal(
        "mismatch",
        EqualConfig {
            expect: config::value(1),
            to_be: config::value(2),
            strict: false,
            options: CaseOptions::with_message("numbers drifted apart"),
        },
    );
    let summary = suite.run();
    assert_eq!(failure_message(&summary.results[0].outcome), "numbers drifted apart");
}

#[test]
fn eval_equals_registers_a_batch() {
    let suite = Merlin::new();
    suite.eval_equals(vec![
        EqualCase {
            label: "first".to_string(),
            config: EqualConfig {
                expect: config::value(1),
                to_be: config::value(1),
                strict: false,
                options: CaseOptions::new(),
            },
        },
        EqualCase {
            label: "second".to_string(),
            config: EqualConfig {
                expect: config::value("a"),
                to_be: config::value("b"),
                strict: false,
                options: CaseOptions::new(),
            },
        },
    ]);

    let summary = suite.run_with(sequential());
    assert_eq!(summary.total(), 2);
    assert_eq!(summary.passed, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.results[0].name, "first");
}

#[test]
fn not_equal_fails_on_loose_match() {
    let suite = Merlin::new();
    suite.test_not_equal(
        "coerced values still count as equal",
        NotEqualConfig {
            expect: config::value(1),
            not_be: config::value("1"),
            options: CaseOptions::new(),
        },
    );
    let summary = suite.run();
    assert_eq!(summary.failed, 1);
}

#[test]
fn containment_checks() {
    let suite = Merlin::new();
    suite.array_contains(
        "subset is present",
        ContainsConfig {
            value: config::value(vec![1, 2, 3, 4]),
            contains: config::value(vec![2, 4]),
            options: CaseOptions::new(),
        },
    );
    suite.string_contains(
        "substring is present",
        ContainsConfig {
            value: config::value("wizards and mavens"),
            contains: config::value("maven"),
            options: CaseOptions::new(),
        },
    );
    suite.array_contains(
        "missing element",
        ContainsConfig {
            value: config::value(vec![1, 2]),
            contains: config::value(9),
            options: CaseOptions::new(),
        },
    );

    let summary = suite.run_with(sequential());
    assert_eq!(summary.passed, 2);
    assert_eq!(summary.failed, 1);
    assert!(failure_message(&summary.results[2].outcome).contains("to contain 9"));
}

#[test]
fn predicates_cover_the_runtime_kinds() {
    let suite = Merlin::new();
    suite.be_null("null", ValueConfig {
        value: Box::new(|| Ok(Value::Null)),
        options: CaseOptions::new(),
    });
    suite.be_truthy("non-empty string", ValueConfig {
        value: config::value("yes"),
        options: CaseOptions::new(),
    });
    suite.be_falsy("zero", ValueConfig {
        value: config::value(0),
        options: CaseOptions::new(),
    });
    suite.is_zero("float zero", ValueConfig {
        value: config::value(0.0),
        options: CaseOptions::new(),
    });
    suite.is_nan("not a number", ValueConfig {
        value: config::value(f64::NAN),
        options: CaseOptions::new(),
    });
    suite.is_bigint("wide integer", ValueConfig {
        value: config::value(10_i128.pow(20)),
        options: CaseOptions::new(),
    });
    suite.is_string("text", ValueConfig {
        value: config::value("text"),
        options: CaseOptions::new(),
    });
    suite.is_number("plain number", ValueConfig {
        value: config::value(42),
        options: CaseOptions::new(),
    });
    suite.is_empty("empty list", ValueConfig {
        value: config::value(Vec::<i64>::new()),
        options: CaseOptions::new(),
    });
    suite.is_undefined("undefined", ValueConfig {
        value: config::value(()),
        options: CaseOptions::new(),
    });

    let summary = suite.run_with(sequential());
    assert_eq!(summary.passed, summary.total());
}

#[test]
fn number_predicate_excludes_wide_integers() {
    let suite = Merlin::new();
    suite.is_number("wide integer is not a plain number", ValueConfig {
        value: config::value(10_i128.pow(20)),
        options: CaseOptions::new(),
    });
    let summary = suite.run();
    assert_eq!(summary.failed, 1);
}

#[test]
fn ordering_checks() {
    let suite = Merlin::new();
    suite.test_greater("5 > 3", PairConfig {
        expect: config::value(5),
        to_be: config::value(3),
        options: CaseOptions::new(),
    });
    suite.test_less_or_equal("3 <= 3", PairConfig {
        expect: config::value(3),
        to_be: config::value(3),
        options: CaseOptions::new(),
    });
    suite.test_less("5 < 3 fails", PairConfig {
        expect: config::value(5),
        to_be: config::value(3),
        options: CaseOptions::new(),
    });

    let summary = suite.run_with(sequential());
    assert_eq!(summary.passed, 2);
    assert_eq!(summary.failed, 1);
}

#[test]
fn instance_and_length_checks() {
    let suite = Merlin::new();
    suite.test_instance_of("both strings", PairConfig {
        expect: config::value("a"),
        to_be: config::value("b"),
        options: CaseOptions::new(),
    });
    suite.same_length("same element count", PairConfig {
        expect: config::value(vec![1, 2, 3]),
        to_be: config::value(vec![4, 5, 6]),
        options: CaseOptions::new(),
    });

    let summary = suite.run_with(sequential());
    assert_eq!(summary.passed, 2);
}

#[test]
fn regex_match_check() {
    let suite = Merlin::new();
    suite.test_match("hex color", MatchConfig {
        value: config::value("#1f77b4"),
        pattern: r"^#[0-9a-f]{6}$".to_string(),
        options: CaseOptions::new(),
    });
    suite.test_match("broken pattern", MatchConfig {
        value: config::value("anything"),
        pattern: "(".to_string(),
        options: CaseOptions::new(),
    });

    let summary = suite.run_with(sequential());
    assert_eq!(summary.passed, 1);
    assert!(failure_message(&summary.results[1].outcome).contains("invalid pattern"));
}

#[test]
fn property_check_is_directional() {
    let subset = || {
        Box::new(|| {
            Ok(Value::map_of([("id", Value::from(1)), ("name", Value::from("merlin"))]))
        }) as crate::config::Producer
    };
    let superset = || {
        Box::new(|| {
            Ok(Value::map_of([
                ("id", Value::from(1)),
                ("name", Value::from("merlin")),
                ("role", Value::from("wizard")),
            ]))
        }) as crate::config::Producer
    };

    let suite = Merlin::new();
    suite.have_property("all properties are expected", ContainsConfig {
        value: subset(),
        contains: superset(),
        options: CaseOptions::new(),
    });
    suite.have_property("extra property is flagged", ContainsConfig {
        value: superset(),
        contains: subset(),
        options: CaseOptions::new(),
    });

    let summary = suite.run_with(sequential());
    assert_eq!(summary.passed, 1);
    assert!(failure_message(&summary.results[1].outcome).contains("role"));
}

#[test]
fn throws_check_accepts_errors_and_panics() {
    let suite = Merlin::new();
    suite.test_throws("error with fragment", ThrowsConfig {
        action: config::attempt(|| Err("disk full")),
        contains: Some("disk".to_string()),
        options: CaseOptions::new(),
    });
    suite.test_throws("panic counts as a raise", ThrowsConfig {
        action: config::attempt_panicking(|| panic!("boom")),
        contains: None,
        options: CaseOptions::new(),
    });
    suite.test_throws("completing action fails the check", ThrowsConfig {
        action: config::attempt(|| Ok::<(), &str>(())),
        contains: None,
        options: CaseOptions::new(),
    });

    let summary = suite.run_with(sequential());
    assert_eq!(summary.passed, 2);
    assert_eq!(summary.failed, 1);
}

#[test]
fn stub_registrations() {
    let suite = Merlin::new();
    suite.force_fail("always fails", CaseOptions::new());
    suite.unimplemented("not written yet", CaseOptions::new());
    suite.unreachable("impossible", CaseOptions::new());

    let summary = suite.run_with(sequential());
    assert_eq!(summary.failed, 3);
    assert_eq!(failure_message(&summary.results[0].outcome), "forced failure");
    assert_eq!(failure_message(&summary.results[1].outcome), "not yet implemented");
    assert_eq!(
        failure_message(&summary.results[2].outcome),
        "entered unreachable test code"
    );
}

#[test]
fn take_cases_drains_the_registry() {
    let suite = Merlin::new();
    suite.force_fail("pending", CaseOptions::new());
    assert_eq!(suite.case_count(), 1);

    let cases = suite.take_cases();
    assert_eq!(cases.len(), 1);
    assert_eq!(suite.case_count(), 0);
}

/// One-shot HTTP stub on a loopback port.
fn serve_once(body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut buffer = [0_u8; 1024];
        let _ = stream.read(&mut buffer).unwrap();
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).unwrap();
    });
    format!("http://127.0.0.1:{port}/")
}

#[test]
fn fetch_equal_compares_a_text_body() {
    let url = serve_once("ok");

    let suite = Merlin::new();
    suite.fetch_equal("health endpoint", FetchConfig {
        url,
        kind: BodyKind::Text,
        to_be: config::value("ok"),
        request: RequestOptions::default(),
        options: CaseOptions::new(),
    });

    let summary = suite.run();
    assert_eq!(summary.passed, 1, "{:?}", summary.results[0].outcome);
}

#[test]
fn fetch_equal_mismatch_uses_the_supplied_message() {
    let url = serve_once("ok");

    let suite = Merlin::new();
    suite.fetch_equal("health endpoint", FetchConfig {
        url,
        kind: BodyKind::Text,
        to_be: config::value("no"),
        request: RequestOptions::default(),
        options: CaseOptions::with_message("bodies differ"),
    });

    let summary = suite.run();
    assert_eq!(failure_message(&summary.results[0].outcome), "bodies differ");
}

#[test]
fn fetch_equal_decodes_a_json_body() {
    let url = serve_once(r#"{"status":"up","checks":2}"#);

    let suite = Merlin::new();
    suite.fetch_equal("status document", FetchConfig {
        url,
        kind: BodyKind::Json,
        to_be: Box::new(|| {
            Ok(Value::map_of([
                ("status", Value::from("up")),
                ("checks", Value::from(2)),
            ]))
        }),
        request: RequestOptions::default(),
        options: CaseOptions::new(),
    });

    let summary = suite.run();
    assert_eq!(summary.passed, 1, "{:?}", summary.results[0].outcome);
}

#[test]
fn fetch_equal_reports_connection_failures() {
    // Port 9 (discard) is almost never listening on loopback.
    let suite = Merlin::new();
    suite.fetch_equal("unreachable endpoint", FetchConfig {
        url: "http://127.0.0.1:9/".to_string(),
        kind: BodyKind::Text,
        to_be: config::value("ok"),
        request: RequestOptions {
            timeout: Some(std::time::Duration::from_millis(500)),
            ..RequestOptions::default()
        },
        options: CaseOptions::new(),
    });

    let summary = suite.run();
    assert_eq!(summary.failed, 1);
    assert!(failure_message(&summary.results[0].outcome).contains("request failed"));
}
