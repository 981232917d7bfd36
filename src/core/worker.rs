/// The isolation boundary: every evaluation runs in a freshly forked
/// process so a destructive or runaway sample cannot corrupt the
/// orchestrator's memory, descriptors or working directory, and a hard
/// kill reclaims everything at once. The worker deposits exactly one
/// JSON-encoded outcome token on its status pipe and exits without
/// unwinding into the parent's stack.
use crate::config::types::{ExecutionRequest, Outcome, Result, SandboxError};
use crate::judge::registry;
use crate::safety::workspace::WorkArea;
use nix::fcntl::OFlag;
use nix::unistd::{fork, pipe2, setpgid, ForkResult, Pid};
use std::fs::File;
use std::io::{Read, Write};
use std::os::fd::OwnedFd;
use std::panic::{self, AssertUnwindSafe};

/// One forked worker plus the read half of its status pipe.
pub(crate) struct WorkerHandle {
    pub pid: Pid,
    pub status: OwnedFd,
}

/// Fork the evaluation worker. The child never returns from this call.
pub(crate) fn spawn(request: &ExecutionRequest) -> Result<WorkerHandle> {
    // Close-on-exec: the worker writes the token from its own process, so
    // compiler/runtime subprocesses must never inherit the write end. A
    // lingering grandchild holding it would keep the pipe open past the
    // worker's exit and block the orchestrator's read.
    let (status_read, status_write) = pipe2(OFlag::O_CLOEXEC)
        .map_err(|e| SandboxError::Process(format!("pipe(status): {e}")))?;

    match unsafe { fork() }.map_err(|e| SandboxError::Process(format!("fork(worker): {e}")))? {
        ForkResult::Child => {
            drop(status_read);
            worker_main(request, status_write);
        }
        ForkResult::Parent { child } => {
            drop(status_write);
            Ok(WorkerHandle {
                pid: child,
                status: status_read,
            })
        }
    }
}

/// Child entrypoint: run the evaluation, write the token, exit.
fn worker_main(request: &ExecutionRequest, status: OwnedFd) -> ! {
    // Own process group, so the orchestrator's kill also reaches any
    // compiler or runtime subprocess the strategy spawned.
    let _ = setpgid(Pid::from_raw(0), Pid::from_raw(0));

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| run_evaluation(request)))
        .unwrap_or_else(|_| Outcome::failed("worker panicked while evaluating sample"));

    let mut file = File::from(status);
    match serde_json::to_vec(&outcome) {
        Ok(payload) => {
            let _ = file.write_all(&payload);
            let _ = file.flush();
        }
        Err(err) => log::warn!("failed to encode outcome token: {err}"),
    }

    // exit() skips destructors: the work area is already gone and none
    // of the parent's state may be torn down from here.
    std::process::exit(0);
}

/// Resolve the strategy and run it inside a private work area. Total: any
/// failure mode becomes an outcome token.
fn run_evaluation(request: &ExecutionRequest) -> Outcome {
    let Some(adapter) = registry::adapter_for(&request.language) else {
        // No work area, no file, no subprocess for unknown languages.
        return Outcome::failed(format!("Unsupported language {}", request.language));
    };

    let workarea = match WorkArea::enter(request.task_id.as_deref()) {
        Ok(area) => area,
        Err(err) => return Outcome::failed(format!("workspace setup failed: {err}")),
    };
    log::debug!(
        "worker evaluating {} sample in {}",
        adapter.language(),
        workarea.dir().display()
    );

    let outcome = adapter.evaluate(&request.test_code, &workarea, request.timeout);

    // Restore cwd and delete the area before the token is written.
    drop(workarea);
    outcome
}

/// Read the deposited token once the worker is known to have stopped.
/// `None` means the worker died without reporting.
pub(crate) fn read_outcome(status: OwnedFd) -> Option<Outcome> {
    let mut file = File::from(status);
    let mut payload = Vec::new();
    if file.read_to_end(&mut payload).is_err() || payload.is_empty() {
        return None;
    }
    match serde_json::from_slice(&payload) {
        Ok(outcome) => Some(outcome),
        Err(err) => {
            log::warn!("undecodable outcome token: {err}");
            None
        }
    }
}
