/// Standard-stream containment for in-process execution. The sample's
/// `print`/`io.write` land in a write-only sink; every read attempt fails
/// immediately instead of blocking on input that will never arrive.
use mlua::{Lua, Table, Value, Variadic};
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Raised for any read attempt against the contained streams.
#[derive(Debug, Error)]
#[error("read from contained standard input")]
pub struct ContainedInput;

/// Accepts writes, refuses reads. Captured bytes are discarded; only a
/// running count is kept so containment stays observable in tests.
#[derive(Debug, Default)]
pub struct WriteOnlySink {
    written: usize,
}

impl WriteOnlySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bytes_written(&self) -> usize {
        self.written
    }

    /// The "can this be read" check: always false.
    pub fn readable(&self) -> bool {
        false
    }

    pub fn read(&self) -> io::Result<Vec<u8>> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "stream is write-only",
        ))
    }
}

impl Write for WriteOnlySink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.written += buf.len();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub type SharedSink = Arc<Mutex<WriteOnlySink>>;

fn display(value: &Value) -> String {
    value
        .to_string()
        .unwrap_or_else(|_| format!("<{}>", value.type_name()))
}

fn sink_write(sink: &SharedSink, text: &str) {
    if let Ok(mut sink) = sink.lock() {
        let _ = sink.write_all(text.as_bytes());
    }
}

/// A stand-in for the standard file handles: `write` lands in the sink
/// and chains like a real file, `read`/`lines` raise, `flush`/`close` are
/// no-ops.
fn contained_handle(lua: &Lua, sink: &SharedSink) -> mlua::Result<Table> {
    let handle = lua.create_table()?;

    let write_sink = Arc::clone(sink);
    let write = lua.create_function(move |_, (this, args): (Table, Variadic<Value>)| {
        for value in args.iter() {
            sink_write(&write_sink, &display(value));
        }
        Ok(this)
    })?;
    handle.set("write", write)?;

    let read = lua.create_function(|_, _args: Variadic<Value>| -> mlua::Result<()> {
        Err(mlua::Error::external(ContainedInput))
    })?;
    handle.set("read", read.clone())?;
    handle.set("lines", read)?;

    let noop = lua.create_function(|_, _args: Variadic<Value>| Ok(()))?;
    handle.set("flush", noop.clone())?;
    handle.set("close", noop)?;

    Ok(handle)
}

/// Rebind the interpreter's standard I/O onto `sink` for the duration of
/// the evaluation: the `print`/`io.write`/`io.read`/`io.lines` functions
/// and the `io.stdout`/`io.stderr`/`io.stdin` handles, so handle-method
/// calls cannot reach the worker's real streams either.
pub fn contain_io(lua: &Lua, sink: &SharedSink) -> mlua::Result<()> {
    let globals = lua.globals();

    let print_sink = Arc::clone(sink);
    let print = lua.create_function(move |_, args: Variadic<Value>| {
        let mut line = String::new();
        for (i, value) in args.iter().enumerate() {
            if i > 0 {
                line.push('\t');
            }
            line.push_str(&display(value));
        }
        line.push('\n');
        sink_write(&print_sink, &line);
        Ok(())
    })?;
    globals.set("print", print)?;

    if let Ok(io_table) = globals.get::<Table>("io") {
        let write_sink = Arc::clone(sink);
        let write = lua.create_function(move |_, args: Variadic<Value>| {
            for value in args.iter() {
                sink_write(&write_sink, &display(value));
            }
            Ok(())
        })?;
        io_table.set("write", write)?;

        let read = lua.create_function(|_, _args: Variadic<Value>| -> mlua::Result<()> {
            Err(mlua::Error::external(ContainedInput))
        })?;
        io_table.set("read", read.clone())?;
        io_table.set("lines", read)?;

        let handle = contained_handle(lua, sink)?;
        io_table.set("stdout", handle.clone())?;
        io_table.set("stderr", handle.clone())?;
        io_table.set("stdin", handle)?;
    }

    Ok(())
}
