/// Public entry point. Spawns the isolation boundary, waits with the
/// outer deadline, force-kills on overrun, and normalizes the result.
use crate::config::types::{EvalResult, ExecutionRequest, Outcome, Result, OUTER_GRACE};
use crate::core::worker::{self, WorkerHandle};
use crate::verdict::report;
use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Evaluate one sample in a dedicated worker process.
///
/// Total for well-formed requests: compile errors, runtime faults,
/// assertion failures, unsupported languages and timeouts all come back
/// as ordinary [`EvalResult`] values. The only propagated error is
/// failure to create the worker itself, when no evaluation could begin.
/// On return, no worker process survives and its work area is gone.
///
/// The inner per-language guard is expected to fire first and report a
/// precise diagnostic; the outer deadline (`timeout + OUTER_GRACE`) is a
/// backstop against a worker that cannot honor its own guard, such as a
/// wedged subprocess.
pub fn evaluate(request: &ExecutionRequest) -> Result<EvalResult> {
    let WorkerHandle { pid, status } = worker::spawn(request)?;
    log::debug!(
        "spawned worker {pid} for task {:?} ({})",
        request.task_id,
        request.language
    );

    wait_with_deadline(pid, request.timeout + OUTER_GRACE);

    // Read only after the worker has stopped or been killed. No token
    // after the deadline resolves to a timeout rather than staying
    // ambiguous.
    let outcome = worker::read_outcome(status).unwrap_or(Outcome::TimedOut);
    Ok(report::finalize(outcome, request))
}

/// Block until the worker stops, force-killing its process group once the
/// deadline elapses. Guarantees the worker is reaped before returning.
fn wait_with_deadline(pid: Pid, limit: Duration) {
    let started = Instant::now();
    loop {
        match waitpid(pid, Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) => {
                if started.elapsed() >= limit {
                    log::debug!("worker {pid} overran its deadline; killing");
                    kill_worker_group(pid);
                    reap(pid);
                    return;
                }
                thread::sleep(POLL_INTERVAL);
            }
            Ok(WaitStatus::Exited(..)) | Ok(WaitStatus::Signaled(..)) => return,
            Ok(_) => thread::sleep(POLL_INTERVAL),
            Err(Errno::EINTR) => continue,
            Err(err) => {
                log::warn!("waitpid({pid}) failed: {err}");
                return;
            }
        }
    }
}

/// Unconditional SIGKILL: the whole group first so compiler/runtime
/// subprocesses die with the worker, single-pid fallback if the group
/// signal is refused.
fn kill_worker_group(pid: Pid) {
    let rc = unsafe { libc::kill(-pid.as_raw(), libc::SIGKILL) };
    if rc != 0 {
        log::warn!(
            "group SIGKILL for worker {pid} failed ({}), killing pid directly",
            std::io::Error::last_os_error()
        );
        if let Err(err) = kill(pid, Signal::SIGKILL) {
            log::warn!("SIGKILL worker {pid} failed: {err}");
        }
    }
}

fn reap(pid: Pid) {
    loop {
        match waitpid(pid, None) {
            Ok(_) => return,
            Err(Errno::EINTR) => continue,
            Err(err) => {
                log::warn!("failed to reap worker {pid}: {err}");
                return;
            }
        }
    }
}
