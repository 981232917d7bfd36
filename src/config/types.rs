/// Core types for the testbox evaluation harness
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Default per-sample execution budget.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Extra wall time the orchestrator grants the worker beyond the request
/// timeout before force-killing it. The inner per-language guard is the
/// precise cancellation path; this covers workers that cannot honor it.
pub const OUTER_GRACE: Duration = Duration::from_secs(1);

/// Upper bound on failure diagnostics carried in an outcome token.
pub const DIAGNOSTIC_LIMIT: usize = 4096;

/// One sample to evaluate. Immutable once submitted.
///
/// `language` stays a plain string so unrecognized values flow through the
/// unsupported-language result path instead of failing construction.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExecutionRequest {
    /// Benchmark task identifier, echoed into the result and used to stem
    /// on-disk artifact names.
    pub task_id: Option<String>,
    /// Sample body including its embedded test assertions.
    pub test_code: String,
    /// Language tag: `lua`, `python`/`py`, or `cpp`/`c++`/`cxx`/`cc`.
    pub language: String,
    /// Wall-clock budget for the sample itself.
    pub timeout: Duration,
    /// Caller-side correlation id, echoed into the result.
    pub completion_id: Option<i64>,
}

impl ExecutionRequest {
    pub fn new(test_code: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            task_id: None,
            test_code: test_code.into(),
            language: language.into(),
            timeout: DEFAULT_TIMEOUT,
            completion_id: None,
        }
    }

    pub fn with_task_id(mut self, task_id: impl Into<String>) -> Self {
        self.task_id = Some(task_id.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_completion_id(mut self, completion_id: i64) -> Self {
        self.completion_id = Some(completion_id);
        self
    }
}

/// The outcome token a worker deposits exactly once on its status pipe.
/// Absence of a token after the outer deadline reads as `TimedOut`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Passed,
    Failed(String),
    TimedOut,
}

impl Outcome {
    /// Build a failure token with a bounded diagnostic.
    pub fn failed(reason: impl Into<String>) -> Self {
        Outcome::Failed(truncate_diagnostic(&reason.into()))
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, Outcome::Passed)
    }
}

/// Final per-request verdict record. Constructed once, never mutated.
/// Invariant: `passed == (outcome == Passed)`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EvalResult {
    pub passed: bool,
    pub outcome: Outcome,
    pub completion_id: Option<i64>,
    pub task_id: Option<String>,
}

/// Bound a diagnostic string so oversized compiler or interpreter output
/// never bloats an outcome token.
pub fn truncate_diagnostic(text: &str) -> String {
    if text.len() <= DIAGNOSTIC_LIMIT {
        return text.to_string();
    }
    let mut end = DIAGNOSTIC_LIMIT;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... [truncated]", &text[..end])
}

#[derive(Error, Debug)]
pub enum SandboxError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Process error: {0}")]
    Process(String),

    #[error("Workspace error: {0}")]
    Workspace(String),
}

pub type Result<T> = std::result::Result<T, SandboxError>;
