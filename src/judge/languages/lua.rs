/// In-process guarded execution: the sample runs inside an embedded
/// interpreter owned by the worker, under privilege reduction, I/O
/// containment and the scoped time limit.
use crate::config::types::Outcome;
use crate::judge::adapter::LanguageAdapter;
use crate::runtime::containment::{self, SharedSink, WriteOnlySink};
use crate::runtime::privileges;
use crate::runtime::time_limit::{self, TimeLimit};
use crate::safety::workspace::WorkArea;
use mlua::Lua;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct LuaAdapter;

fn classify_failure(err: &mlua::Error) -> Outcome {
    let text = err.to_string();
    if text.contains("assertion failed") {
        return Outcome::failed("assertion failed");
    }
    Outcome::failed(text)
}

impl LanguageAdapter for LuaAdapter {
    fn language(&self) -> &'static str {
        "lua"
    }

    fn evaluate(&self, test_code: &str, _workarea: &WorkArea, timeout: Duration) -> Outcome {
        // Fresh interpreter state per evaluation; nothing leaks between
        // samples even when a worker process is reused in tests.
        let lua = Lua::new();
        let sink: SharedSink = Arc::new(Mutex::new(WriteOnlySink::new()));

        if let Err(err) = privileges::reduce(&lua) {
            return Outcome::failed(format!("sandbox setup failed: {err}"));
        }
        if let Err(err) = containment::contain_io(&lua, &sink) {
            return Outcome::failed(format!("sandbox setup failed: {err}"));
        }

        let result = {
            let _guard = TimeLimit::arm(&lua, timeout);
            lua.load(test_code).set_name("sample").exec()
        };

        match result {
            Ok(()) => Outcome::Passed,
            Err(err) if time_limit::is_deadline(&err) => Outcome::TimedOut,
            Err(err) => classify_failure(&err),
        }
    }
}
