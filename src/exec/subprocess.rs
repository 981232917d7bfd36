/// Deadline-bounded subprocess execution for the compiled/launched
/// language paths. Stderr is collected on a thread with a hard byte cap
/// and a wait bounded by the remaining budget; the child is killed
/// outright when the wall-clock budget runs out.
use crate::config::types::{Result, SandboxError};
use std::io::Read;
use std::path::Path;
use std::process::{ChildStderr, Command, Stdio};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// Hard cap on captured stderr; diagnostics are bounded again upstream.
const STDERR_CAPTURE_LIMIT: usize = 64 * 1024;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug)]
pub enum RunStatus {
    /// `code` is `None` when the child was terminated by a signal.
    Exited { code: Option<i32>, stderr: String },
    TimedOut,
}

/// Turn a nonzero exit into a failure reason, falling back when the
/// toolchain produced no stderr text.
pub fn failure_reason(stderr: &str, fallback: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Capped stderr capture running on its own thread. A grandchild that
/// inherited the stderr pipe can keep the stream open after the child
/// exits, so the final wait is bounded and the captured bytes stay
/// readable regardless.
struct StderrCollector {
    captured: Arc<Mutex<Vec<u8>>>,
    done: mpsc::Receiver<()>,
}

impl StderrCollector {
    fn spawn(mut stream: ChildStderr) -> Self {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let (done_tx, done) = mpsc::channel();
        let out_ref = Arc::clone(&captured);
        thread::spawn(move || {
            let mut buf = [0u8; 4096];
            loop {
                match stream.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => {
                        let mut out = out_ref.lock().unwrap_or_else(|e| e.into_inner());
                        if out.len() + n > STDERR_CAPTURE_LIMIT {
                            let remaining = STDERR_CAPTURE_LIMIT.saturating_sub(out.len());
                            out.extend_from_slice(&buf[..remaining]);
                            break;
                        }
                        out.extend_from_slice(&buf[..n]);
                    }
                    Err(_) => break,
                }
            }
            let _ = done_tx.send(());
        });
        Self { captured, done }
    }

    /// Wait up to `wait` for end-of-stream, then take whatever arrived.
    fn finish(self, wait: Duration) -> String {
        let _ = self.done.recv_timeout(wait);
        let out = self.captured.lock().unwrap_or_else(|e| e.into_inner());
        String::from_utf8_lossy(&out).into_owned()
    }
}

/// Run `argv` inside `workdir` with stdin and stdout discarded, bounded by
/// `limit`. Spawn failure (missing toolchain, bad path) errs; everything
/// after a successful spawn resolves to a `RunStatus`.
pub fn run_with_deadline(argv: &[String], workdir: &Path, limit: Duration) -> Result<RunStatus> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| SandboxError::Config("empty command".to_string()))?;

    let mut child = Command::new(program)
        .args(args)
        .current_dir(workdir)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| SandboxError::Process(format!("failed to spawn {program}: {e}")))?;

    let stderr_collector = child.stderr.take().map(StderrCollector::spawn);

    let started = Instant::now();
    let exit_status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break Some(status),
            Ok(None) => {
                if started.elapsed() >= limit {
                    if let Err(e) = child.kill() {
                        log::warn!("failed to kill overdue subprocess {program}: {e}");
                    }
                    let _ = child.wait();
                    break None;
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(e) => {
                return Err(SandboxError::Process(format!("failed to wait on {program}: {e}")))
            }
        }
    };

    let stderr = stderr_collector
        .map(|collector| collector.finish(limit.saturating_sub(started.elapsed())))
        .unwrap_or_default();

    match exit_status {
        Some(status) => Ok(RunStatus::Exited {
            code: status.code(),
            stderr,
        }),
        None => Ok(RunStatus::TimedOut),
    }
}
