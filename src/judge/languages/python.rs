/// Compile-free launch: write the sample to disk and hand it to the
/// external interpreter under a subprocess deadline. Assertions are always
/// live in this runtime, so no extra flag is needed.
use crate::config::types::Outcome;
use crate::exec::subprocess::{failure_reason, run_with_deadline, RunStatus};
use crate::judge::adapter::LanguageAdapter;
use crate::safety::workspace::WorkArea;
use std::path::Path;
use std::time::Duration;

pub const PYTHON_BIN: &str = "/usr/bin/python3";

#[derive(Debug, Clone, Default)]
pub struct PythonAdapter;

fn launch_command(source: &Path) -> Vec<String> {
    vec![
        PYTHON_BIN.to_string(),
        "-B".to_string(),
        source.to_string_lossy().to_string(),
    ]
}

impl LanguageAdapter for PythonAdapter {
    fn language(&self) -> &'static str {
        "python"
    }

    fn evaluate(&self, test_code: &str, workarea: &WorkArea, timeout: Duration) -> Outcome {
        let source = match workarea.write_source("py", test_code) {
            Ok(path) => path,
            Err(err) => return Outcome::failed(err.to_string()),
        };

        match run_with_deadline(&launch_command(&source), workarea.dir(), timeout) {
            Ok(RunStatus::Exited { code: Some(0), .. }) => Outcome::Passed,
            Ok(RunStatus::Exited { stderr, .. }) => {
                Outcome::failed(failure_reason(&stderr, "interpreter exited abnormally"))
            }
            Ok(RunStatus::TimedOut) => Outcome::TimedOut,
            Err(err) => Outcome::failed(err.to_string()),
        }
    }
}
