/// Best-effort privilege reduction for in-process execution: a fixed list
/// of destructive interpreter operations is removed from the sandboxed
/// state before untrusted code runs.
///
/// This is damage reduction for runaway generated code, not a security
/// boundary; a genuine trust boundary (separate account, container, VM)
/// belongs to the deployment layer.
use mlua::{Lua, Table, Value};

/// Process spawning, interpreter exit, and filesystem mutation.
const REVOKED_OS: &[&str] = &["execute", "exit", "remove", "rename", "tmpname"];

/// Spawn-capable and filesystem-mutating I/O entry points. Read/write of
/// the standard streams is handled separately by containment.
const REVOKED_IO: &[&str] = &["popen", "open", "output", "input", "tmpfile"];

/// Direct file loading shortcuts and the debugger table.
const REVOKED_GLOBALS: &[&str] = &["dofile", "loadfile", "debug"];

/// Modules considered unsafe for a sandboxed benchmark run.
const BLOCKED_MODULES: &[&str] = &["debug", "ffi", "io", "os", "lfs", "posix", "socket"];

/// Apply the reduction to a freshly created interpreter state.
pub fn reduce(lua: &Lua) -> mlua::Result<()> {
    let globals = lua.globals();

    if let Ok(os_table) = globals.get::<Table>("os") {
        for name in REVOKED_OS {
            os_table.set(*name, Value::Nil)?;
        }
    }

    if let Ok(io_table) = globals.get::<Table>("io") {
        for name in REVOKED_IO {
            io_table.set(*name, Value::Nil)?;
        }
    }

    for name in REVOKED_GLOBALS {
        globals.set(*name, Value::Nil)?;
    }

    // Native-library loading would bypass the require stub below.
    if let Ok(package) = globals.get::<Table>("package") {
        package.set("loadlib", Value::Nil)?;
    }

    // `require` keeps resolving ordinary modules but refuses the blocked
    // list outright.
    if let Ok(original) = globals.get::<mlua::Function>("require") {
        let require = lua.create_function(move |_, name: String| {
            if BLOCKED_MODULES.contains(&name.as_str()) {
                return Err(mlua::Error::RuntimeError(format!(
                    "module '{name}' is disabled in the sandbox"
                )));
            }
            original.call::<Value>(name)
        })?;
        globals.set("require", require)?;
    }

    Ok(())
}
