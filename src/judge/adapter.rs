use crate::config::types::Outcome;
use crate::safety::workspace::WorkArea;
use std::time::Duration;

/// Per-language execution strategy: resolve one sample to exactly one
/// terminal outcome. Implementations never raise past this seam; every
/// fault while running untrusted code becomes a `Failed` token.
pub trait LanguageAdapter: Send + Sync {
    fn language(&self) -> &'static str;

    fn evaluate(&self, test_code: &str, workarea: &WorkArea, timeout: Duration) -> Outcome;
}
