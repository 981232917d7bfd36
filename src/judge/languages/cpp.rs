/// Compile-then-run: write the sample, invoke the external compiler, then
/// the built executable, each stage bounded by the request timeout.
use crate::config::types::Outcome;
use crate::exec::subprocess::{failure_reason, run_with_deadline, RunStatus};
use crate::judge::adapter::LanguageAdapter;
use crate::safety::workspace::WorkArea;
use std::path::Path;
use std::time::Duration;

pub const COMPILER_BIN: &str = "/usr/bin/g++";

#[derive(Debug, Clone, Default)]
pub struct CppAdapter;

fn compile_command(source: &Path, binary: &Path) -> Vec<String> {
    vec![
        COMPILER_BIN.to_string(),
        "-std=c++17".to_string(),
        "-O2".to_string(),
        "-pipe".to_string(),
        "-o".to_string(),
        binary.to_string_lossy().to_string(),
        source.to_string_lossy().to_string(),
    ]
}

impl LanguageAdapter for CppAdapter {
    fn language(&self) -> &'static str {
        "cpp"
    }

    fn evaluate(&self, test_code: &str, workarea: &WorkArea, timeout: Duration) -> Outcome {
        let source = match workarea.write_source("cpp", test_code) {
            Ok(path) => path,
            Err(err) => return Outcome::failed(err.to_string()),
        };
        let binary = workarea.binary_path();

        match run_with_deadline(&compile_command(&source, &binary), workarea.dir(), timeout) {
            Ok(RunStatus::Exited { code: Some(0), .. }) => {}
            Ok(RunStatus::Exited { stderr, .. }) => {
                return Outcome::failed(format!(
                    "failed to compile: {}",
                    failure_reason(&stderr, "compiler exited abnormally")
                ));
            }
            Ok(RunStatus::TimedOut) => return Outcome::TimedOut,
            Err(err) => return Outcome::failed(err.to_string()),
        }

        let run_argv = vec![binary.to_string_lossy().to_string()];
        match run_with_deadline(&run_argv, workarea.dir(), timeout) {
            Ok(RunStatus::Exited { code: Some(0), .. }) => Outcome::Passed,
            Ok(RunStatus::Exited { stderr, .. }) => {
                Outcome::failed(failure_reason(&stderr, "program exited abnormally"))
            }
            Ok(RunStatus::TimedOut) => Outcome::TimedOut,
            Err(err) => Outcome::failed(err.to_string()),
        }
    }
}
