/// Scoped wall-clock deadline for one guarded in-process region.
///
/// Arming installs an instruction-count VM hook that checks the deadline
/// and raises a distinguished cancellation error on expiry, unwinding
/// exactly one interpreter call stack. Dropping the guard removes the
/// hook on every exit path, so no hook outlives the guarded region.
/// Meaningful for single-threaded in-process execution only; the
/// orchestrator's process kill remains the backstop for native code the
/// hook can never interrupt.
use mlua::{HookTriggers, Lua, VmState};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Instructions between deadline checks: coarse enough to stay cheap,
/// fine enough to land within a few milliseconds of the deadline.
const HOOK_INTERVAL: u32 = 4096;

/// The guard's own cancellation fault.
#[derive(Debug, Error)]
#[error("time limit exceeded")]
pub struct DeadlineExceeded;

pub struct TimeLimit<'a> {
    lua: &'a Lua,
}

impl<'a> TimeLimit<'a> {
    pub fn arm(lua: &'a Lua, limit: Duration) -> Self {
        let deadline = Instant::now() + limit;
        lua.set_hook(
            HookTriggers::new().every_nth_instruction(HOOK_INTERVAL),
            move |_, _| {
                if Instant::now() >= deadline {
                    Err(mlua::Error::external(DeadlineExceeded))
                } else {
                    Ok(VmState::Continue)
                }
            },
        );
        Self { lua }
    }
}

impl Drop for TimeLimit<'_> {
    fn drop(&mut self) {
        self.lua.remove_hook();
    }
}

/// True when `err` is the guard's own cancellation fault rather than an
/// ordinary runtime failure.
pub fn is_deadline(err: &mlua::Error) -> bool {
    match err {
        mlua::Error::CallbackError { cause, .. } => is_deadline(cause),
        mlua::Error::WithContext { cause, .. } => is_deadline(cause),
        mlua::Error::ExternalError(inner) => inner.downcast_ref::<DeadlineExceeded>().is_some(),
        _ => false,
    }
}
