use crate::judge::adapter::LanguageAdapter;
use crate::judge::languages::{cpp::CppAdapter, lua::LuaAdapter, python::PythonAdapter};

/// Resolve a request's language tag to its execution strategy. `None`
/// surfaces as the unsupported-language failure, with no file written and
/// no subprocess spawned.
pub fn adapter_for(language: &str) -> Option<Box<dyn LanguageAdapter>> {
    match language {
        "lua" => Some(Box::new(LuaAdapter)),
        "python" | "py" => Some(Box::new(PythonAdapter)),
        "cpp" | "c++" | "cxx" | "cc" => Some(Box::new(CppAdapter)),
        _ => None,
    }
}
