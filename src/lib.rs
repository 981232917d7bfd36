//! testbox: a process-isolated correctness harness for machine-generated
//! code samples.
//!
//! Each call to [`evaluate`] runs one untrusted sample against its
//! embedded test assertions in a freshly forked worker process and
//! reports a pass/fail/timeout verdict. The worker owns a private
//! ephemeral work area, deposits exactly one outcome token on a status
//! pipe, and is force-killed if it overruns the outer deadline.
//!
//! # Architecture
//!
//! - [`core::orchestrator`]: public entry point, outer deadline, kill
//!   backstop, result normalization
//! - [`core`] worker: fork-per-evaluation isolation boundary and the
//!   single-slot status pipe
//! - [`judge`]: per-language execution strategies (in-process Lua,
//!   launched Python, compiled C++) and their registry
//! - [`runtime`]: guards for the in-process path: time limit, I/O
//!   containment, privilege reduction
//! - [`exec::subprocess`]: deadline-bounded subprocess runner for the
//!   compiled/launched paths
//! - [`safety::workspace`]: per-evaluation work area and artifact naming
//! - [`verdict::report`]: outcome-token to final-record mapping
//!
//! # Safety model
//!
//! The in-process guards are best-effort damage reduction against
//! destructive or runaway low-capability generated code; they are NOT a
//! security boundary against a deliberate escape attempt. Run the whole
//! harness inside a real trust boundary (separate account, container,
//! VM) before feeding it anything adversarial.
//!
//! # Example
//!
//! ```no_run
//! use testbox::{evaluate, ExecutionRequest};
//!
//! let request = ExecutionRequest::new(
//!     "local function add(a, b) return a + b end\nassert(add(1, 2) == 3)",
//!     "lua",
//! );
//! let result = evaluate(&request)?;
//! assert!(result.passed);
//! # Ok::<(), testbox::SandboxError>(())
//! ```

pub mod config;
pub mod core;
pub mod exec;
pub mod judge;
pub mod runtime;
pub mod safety;
pub mod verdict;

pub use crate::config::types::{
    EvalResult, ExecutionRequest, Outcome, Result, SandboxError, DEFAULT_TIMEOUT, OUTER_GRACE,
};
pub use crate::core::orchestrator::evaluate;
