//! End-to-end evaluation properties: one verdict per request, correct
//! classification, deadline enforcement, artifact isolation and cleanup.

use std::env;
use std::fs;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};
use testbox::{evaluate, ExecutionRequest, Outcome};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn have_tool(path: &str) -> bool {
    Path::new(path).exists()
}

/// Temp-dir entries whose name contains `marker`.
fn leftover_areas(marker: &str) -> Vec<String> {
    let Ok(entries) = fs::read_dir(env::temp_dir()) else {
        return Vec::new();
    };
    entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.contains(marker))
        .collect()
}

const LUA_PASS: &str = "local function add(a, b) return a + b end\nassert(add(1, 2) == 3)\n";
const LUA_FAIL: &str = "local function add(a, b) return a + b end\nassert(add(1, 2) == 4)\n";
const LUA_LOOP: &str = "while true do end\n";

#[test]
fn lua_sample_with_true_assertion_passes() {
    init_logging();
    let result = evaluate(&ExecutionRequest::new(LUA_PASS, "lua")).unwrap();
    assert!(result.passed);
    assert_eq!(result.outcome, Outcome::Passed);
}

#[test]
fn lua_sample_with_false_assertion_fails_as_assertion_failure() {
    init_logging();
    let result = evaluate(&ExecutionRequest::new(LUA_FAIL, "lua")).unwrap();
    assert!(!result.passed);
    match &result.outcome {
        Outcome::Failed(reason) => assert!(
            reason.starts_with("assertion failed"),
            "unexpected reason: {reason}"
        ),
        other => panic!("expected assertion failure, got {other:?}"),
    }
}

#[test]
fn lua_infinite_loop_times_out_within_the_grace_window() {
    init_logging();
    let request = ExecutionRequest::new(LUA_LOOP, "lua").with_timeout(Duration::from_secs(1));
    let started = Instant::now();
    let result = evaluate(&request).unwrap();
    let elapsed = started.elapsed();

    assert_eq!(result.outcome, Outcome::TimedOut);
    assert!(!result.passed);
    // timeout (1s) + grace (1s) + scheduling slack, never indefinite.
    assert!(elapsed < Duration::from_secs(5), "took {elapsed:?}");
}

#[test]
fn unknown_language_is_rejected_without_artifacts() {
    init_logging();
    let request = ExecutionRequest::new("anything", "unknown").with_task_id("unsupported-marker");
    let result = evaluate(&request).unwrap();

    assert!(!result.passed);
    assert_eq!(
        result.outcome,
        Outcome::Failed("Unsupported language unknown".to_string())
    );
    assert!(
        leftover_areas("unsupported-marker").is_empty(),
        "no work area may be created for an unsupported language"
    );
}

#[test]
fn lua_stdin_read_fails_immediately_instead_of_blocking() {
    init_logging();
    let request =
        ExecutionRequest::new("local line = io.read()\n", "lua").with_timeout(Duration::from_secs(5));
    let started = Instant::now();
    let result = evaluate(&request).unwrap();

    assert!(
        matches!(result.outcome, Outcome::Failed(_)),
        "expected immediate failure, got {:?}",
        result.outcome
    );
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[test]
fn concurrent_requests_with_the_same_task_id_stay_independent() {
    init_logging();
    let passing = thread::spawn(|| {
        let request = ExecutionRequest::new(LUA_PASS, "lua").with_task_id("shared-task");
        evaluate(&request).unwrap()
    });
    let failing = thread::spawn(|| {
        let request = ExecutionRequest::new(LUA_FAIL, "lua").with_task_id("shared-task");
        evaluate(&request).unwrap()
    });

    let passing = passing.join().unwrap();
    let failing = failing.join().unwrap();

    assert!(passing.passed);
    assert!(!failing.passed);
    assert!(matches!(failing.outcome, Outcome::Failed(_)));
    assert!(leftover_areas("shared-task").is_empty());
}

#[test]
fn metadata_passes_through_unchanged() {
    init_logging();
    let request = ExecutionRequest::new(LUA_PASS, "lua")
        .with_task_id("Meta/1")
        .with_completion_id(7);
    let result = evaluate(&request).unwrap();

    assert_eq!(result.task_id.as_deref(), Some("Meta/1"));
    assert_eq!(result.completion_id, Some(7));
}

#[test]
fn work_area_is_gone_after_evaluation() {
    init_logging();
    for code in [LUA_PASS, LUA_FAIL] {
        let request = ExecutionRequest::new(code, "lua").with_task_id("cleanup-marker");
        let _ = evaluate(&request).unwrap();
    }
    assert!(
        leftover_areas("cleanup-marker").is_empty(),
        "work areas must be removed when the worker exits"
    );
}

#[test]
fn killed_worker_leaves_no_process_behind() {
    init_logging();
    let request = ExecutionRequest::new(LUA_LOOP, "lua")
        .with_task_id("kill-marker")
        .with_timeout(Duration::from_millis(200));
    let _ = evaluate(&request).unwrap();
    // The orchestrator reaps the worker before returning; by now any
    // leftover would be a zombie child of this test process, which a
    // second evaluation would not be able to confuse with its own.
    let again = evaluate(&ExecutionRequest::new(LUA_PASS, "lua")).unwrap();
    assert!(again.passed);
}

mod python {
    use super::*;
    use testbox::judge::languages::python::PYTHON_BIN;

    const PY_PASS: &str = "def add(a, b):\n    return a + b\n\nassert add(1, 2) == 3\n";
    const PY_FAIL: &str = "def add(a, b):\n    return a + b\n\nassert add(1, 2) == 4\n";

    #[test]
    fn passing_sample_passes() {
        init_logging();
        if !have_tool(PYTHON_BIN) {
            eprintln!("skipping: {PYTHON_BIN} not available");
            return;
        }
        let result = evaluate(&ExecutionRequest::new(PY_PASS, "python")).unwrap();
        assert!(result.passed, "got {:?}", result.outcome);
    }

    #[test]
    fn failing_assertion_reports_interpreter_stderr() {
        init_logging();
        if !have_tool(PYTHON_BIN) {
            eprintln!("skipping: {PYTHON_BIN} not available");
            return;
        }
        let result = evaluate(&ExecutionRequest::new(PY_FAIL, "python")).unwrap();
        match &result.outcome {
            Outcome::Failed(reason) => assert!(
                reason.contains("AssertionError"),
                "unexpected reason: {reason}"
            ),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    // Detaches a child that outlives the sample; the parent exits 0
    // immediately.
    const PY_DAEMON: &str = "
import os, sys, time
if os.fork() == 0:
    os.setsid()
    for fd in range(3):
        try:
            os.close(fd)
        except OSError:
            pass
    time.sleep(15)
    os._exit(0)
sys.exit(0)
";

    #[test]
    fn lingering_grandchild_does_not_delay_the_verdict() {
        init_logging();
        if !have_tool(PYTHON_BIN) {
            eprintln!("skipping: {PYTHON_BIN} not available");
            return;
        }
        let request =
            ExecutionRequest::new(PY_DAEMON, "python").with_timeout(Duration::from_secs(1));
        let started = Instant::now();
        let result = evaluate(&request).unwrap();

        // The grandchild sleeps far past the deadline window; it must not
        // hold the status pipe (or the verdict) open.
        assert!(result.passed, "got {:?}", result.outcome);
        assert!(
            started.elapsed() < Duration::from_secs(6),
            "took {:?}",
            started.elapsed()
        );
    }

    #[test]
    fn sleeping_sample_times_out() {
        init_logging();
        if !have_tool(PYTHON_BIN) {
            eprintln!("skipping: {PYTHON_BIN} not available");
            return;
        }
        let request = ExecutionRequest::new("import time\ntime.sleep(30)\n", "python")
            .with_timeout(Duration::from_secs(1));
        let started = Instant::now();
        let result = evaluate(&request).unwrap();
        assert_eq!(result.outcome, Outcome::TimedOut);
        assert!(started.elapsed() < Duration::from_secs(6));
    }
}

mod cpp {
    use super::*;
    use testbox::judge::languages::cpp::COMPILER_BIN;

    const CPP_PASS: &str = "#include <cassert>\n\
        int add(int a, int b) { return a + b; }\n\
        int main() { assert(add(1, 2) == 3); }\n";
    const CPP_BROKEN: &str = "int main( {\n";

    #[test]
    fn passing_sample_compiles_and_passes() {
        init_logging();
        if !have_tool(COMPILER_BIN) {
            eprintln!("skipping: {COMPILER_BIN} not available");
            return;
        }
        let request =
            ExecutionRequest::new(CPP_PASS, "cpp").with_timeout(Duration::from_secs(30));
        let result = evaluate(&request).unwrap();
        assert!(result.passed, "got {:?}", result.outcome);
    }

    #[test]
    fn syntax_error_reports_compile_failure() {
        init_logging();
        if !have_tool(COMPILER_BIN) {
            eprintln!("skipping: {COMPILER_BIN} not available");
            return;
        }
        let request =
            ExecutionRequest::new(CPP_BROKEN, "cpp").with_timeout(Duration::from_secs(30));
        let result = evaluate(&request).unwrap();
        match &result.outcome {
            Outcome::Failed(reason) => assert!(
                reason.starts_with("failed to compile"),
                "unexpected reason: {reason}"
            ),
            other => panic!("expected compile failure, got {other:?}"),
        }
    }
}
